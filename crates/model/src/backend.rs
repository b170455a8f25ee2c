use std::error::Error;

use crate::error::ErrorKind;
use crate::message::Message;

/// The error type for a chat backend.
pub trait BackendError: Error + Send + Sync + 'static {
    /// Returns the kind of this error.
    fn kind(&self) -> ErrorKind;
}

/// The remote service that keeps chat history and answers prompts on
/// behalf of the signed-in user.
///
/// Once created, a backend should behave like a stateless object: the
/// futures it returns must not borrow from it, and it may be dropped at
/// any time.
pub trait ChatBackend: Send + Sync {
    /// The error type that may be returned by the backend.
    type Error: BackendError;

    /// Fetches the ordered chat history of the current identity.
    ///
    /// Implementations must map the backend's wire records onto
    /// [`Message`] without reordering them.
    fn fetch_history(
        &self,
    ) -> impl Future<Output = Result<Vec<Message>, Self::Error>> + Send + 'static;

    /// Sends a prompt and resolves to the assistant's reply text.
    fn send_prompt(
        &self,
        prompt: &str,
    ) -> impl Future<Output = Result<String, Self::Error>> + Send + 'static;
}
