use std::pin::Pin;
use std::sync::Arc;

use movli_model::{BackendError, ChatBackend, Message};
use tracing::Instrument;

pub(crate) type BackendResult<T> = Result<T, Box<dyn BackendError>>;
pub(crate) type BoxedBackendFuture<T> =
    Pin<Box<dyn Future<Output = BackendResult<T>> + Send>>;
type FetchHistoryFn =
    Arc<dyn Fn() -> BoxedBackendFuture<Vec<Message>> + Send + Sync>;
type SendPromptFn =
    Arc<dyn Fn(&str) -> BoxedBackendFuture<String> + Send + Sync>;

/// A type-erased wrapper around a chat backend, so that the controller
/// state doesn't need a generic parameter.
#[derive(Clone)]
pub struct BackendClient {
    fetch_history_fn: FetchHistoryFn,
    send_prompt_fn: SendPromptFn,
}

impl BackendClient {
    pub fn new<B: ChatBackend + 'static>(backend: B) -> Self {
        let backend = Arc::new(backend);

        let fetch_history_fn: FetchHistoryFn = {
            let backend = Arc::clone(&backend);
            Arc::new(move || -> BoxedBackendFuture<Vec<Message>> {
                let fut = backend.fetch_history();
                Box::pin(
                    async move {
                        trace!("requesting history");
                        fut.await.map_err(erase::<B>)
                    }
                    .instrument(trace_span!("fetch history")),
                )
            })
        };

        let send_prompt_fn: SendPromptFn =
            Arc::new(move |prompt: &str| -> BoxedBackendFuture<String> {
                let fut = backend.send_prompt(prompt);
                Box::pin(
                    async move {
                        trace!("waiting for reply");
                        fut.await.map_err(erase::<B>)
                    }
                    .instrument(trace_span!("send prompt")),
                )
            });

        Self {
            fetch_history_fn,
            send_prompt_fn,
        }
    }

    /// Starts a history request. The returned future doesn't borrow
    /// `self`.
    #[inline]
    pub fn fetch_history(&self) -> BoxedBackendFuture<Vec<Message>> {
        (self.fetch_history_fn)()
    }

    #[inline]
    pub fn send_prompt(&self, prompt: &str) -> BoxedBackendFuture<String> {
        (self.send_prompt_fn)(prompt)
    }
}

fn erase<B: ChatBackend>(err: B::Error) -> Box<dyn BackendError> {
    error!("got an error: {err}");
    Box::new(err)
}
