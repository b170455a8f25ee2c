//! Local fakes of the backend and the identity provider for testing.

mod preset;
mod tokens;

use std::collections::VecDeque;
use std::error::Error as StdError;
use std::fmt::{self, Display, Formatter};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use movli_model::{BackendError, ChatBackend, ErrorKind, Message};
use tokio::time::sleep;

pub use preset::*;
pub use tokens::*;

#[derive(Debug)]
pub struct Error {
    message: &'static str,
    kind: ErrorKind,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.kind)
    }
}

impl StdError for Error {}

impl BackendError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

#[derive(Default)]
struct Script {
    history: VecDeque<Preset<Vec<Message>>>,
    replies: VecDeque<Preset<String>>,
}

#[derive(Default)]
struct Inner {
    script: Mutex<Script>,
    prompts: Mutex<Vec<String>>,
    history_calls: AtomicUsize,
    delay: Mutex<Option<Duration>>,
}

/// A scripted chat backend.
///
/// Each request pops the next preset from its queue. An empty history
/// queue answers with an empty history; an empty reply queue fails the
/// request, the same way a backend without a reply would.
///
/// Clones share the script and the counters.
#[derive(Clone, Default)]
pub struct FakeBackend {
    inner: Arc<Inner>,
}

impl FakeBackend {
    #[inline]
    pub fn push_history(&self, messages: Vec<Message>) {
        self.script().history.push_back(Preset::Ok(messages));
    }

    #[inline]
    pub fn push_history_failure(&self, kind: ErrorKind) {
        self.script().history.push_back(Preset::Fail(kind));
    }

    /// Queues a history request that stays pending until the returned
    /// gate is opened.
    #[inline]
    pub fn hold_history(&self) -> Gate<Vec<Message>> {
        let (gate, preset) = Gate::new();
        self.script().history.push_back(preset);
        gate
    }

    #[inline]
    pub fn push_reply<S: Into<String>>(&self, reply: S) {
        self.script().replies.push_back(Preset::Ok(reply.into()));
    }

    #[inline]
    pub fn push_reply_failure(&self, kind: ErrorKind) {
        self.script().replies.push_back(Preset::Fail(kind));
    }

    #[inline]
    pub fn hold_reply(&self) -> Gate<String> {
        let (gate, preset) = Gate::new();
        self.script().replies.push_back(preset);
        gate
    }

    /// Delays every response by `duration`.
    #[inline]
    pub fn set_delay(&self, duration: Duration) {
        *self.inner.delay.lock().unwrap() = Some(duration);
    }

    /// Number of history requests received so far.
    #[inline]
    pub fn history_calls(&self) -> usize {
        self.inner.history_calls.load(Ordering::SeqCst)
    }

    /// Prompts received so far, in arrival order.
    #[inline]
    pub fn prompts(&self) -> Vec<String> {
        self.inner.prompts.lock().unwrap().clone()
    }

    fn script(&self) -> std::sync::MutexGuard<'_, Script> {
        self.inner.script.lock().unwrap()
    }

    fn delay(&self) -> Option<Duration> {
        *self.inner.delay.lock().unwrap()
    }
}

async fn resolve<T>(
    preset: Option<Preset<T>>,
    delay: Option<Duration>,
    on_empty: Result<T, Error>,
) -> Result<T, Error> {
    if let Some(delay) = delay {
        sleep(delay).await;
    }
    match preset {
        None => on_empty,
        Some(Preset::Ok(value)) => Ok(value),
        Some(Preset::Fail(kind)) => Err(Error {
            message: "scripted failure",
            kind,
        }),
        Some(Preset::Held(rx)) => match rx.await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(kind)) => Err(Error {
                message: "scripted failure",
                kind,
            }),
            Err(_) => Err(Error {
                message: "gate dropped",
                kind: ErrorKind::Network,
            }),
        },
    }
}

impl ChatBackend for FakeBackend {
    type Error = crate::Error;

    fn fetch_history(
        &self,
    ) -> impl Future<Output = Result<Vec<Message>, Self::Error>> + Send + 'static
    {
        self.inner.history_calls.fetch_add(1, Ordering::SeqCst);
        let preset = self.script().history.pop_front();
        resolve(preset, self.delay(), Ok(vec![]))
    }

    fn send_prompt(
        &self,
        prompt: &str,
    ) -> impl Future<Output = Result<String, Self::Error>> + Send + 'static {
        self.inner.prompts.lock().unwrap().push(prompt.to_owned());
        let preset = self.script().replies.pop_front();
        let on_empty = Err(Error {
            message: "no scripted reply",
            kind: ErrorKind::Network,
        });
        resolve(preset, self.delay(), on_empty)
    }
}
