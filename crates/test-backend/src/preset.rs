use movli_model::ErrorKind;
use tokio::sync::oneshot;

/// How the fake backend answers one request.
#[derive(Debug)]
pub enum Preset<T> {
    /// Succeed with the given value.
    Ok(T),
    /// Fail with the given kind.
    Fail(ErrorKind),
    /// Stay pending until the paired [`Gate`] is opened.
    Held(oneshot::Receiver<Result<T, ErrorKind>>),
}

/// Holds a scripted request open until the test decides its outcome.
///
/// Dropping the gate without opening it fails the request with
/// [`ErrorKind::Network`].
#[derive(Debug)]
pub struct Gate<T> {
    tx: oneshot::Sender<Result<T, ErrorKind>>,
}

impl<T> Gate<T> {
    pub(crate) fn new() -> (Self, Preset<T>) {
        let (tx, rx) = oneshot::channel();
        (Self { tx }, Preset::Held(rx))
    }

    /// Lets the request succeed with `value`.
    #[inline]
    pub fn succeed(self, value: T) {
        self.tx.send(Ok(value)).ok();
    }

    /// Lets the request fail with `kind`.
    #[inline]
    pub fn fail(self, kind: ErrorKind) {
        self.tx.send(Err(kind)).ok();
    }
}
