//! HTTP access to the movli backend.
//!
//! Every call goes through the [`Gateway`], which attaches a bearer
//! credential for the signed-in identity. [`HttpBackend`] builds the chat
//! endpoints on top of it and maps the backend's wire records onto the
//! shared [`movli_model::Message`] type.

#[macro_use]
extern crate tracing;

mod config;
mod gateway;
mod proto;

use std::error::Error as StdError;
use std::fmt::{self, Display};
use std::sync::Arc;

use movli_model::{
    BackendError, ChatBackend, ErrorKind, Message, TokenProvider,
};

pub use config::{ApiConfig, ApiConfigBuilder};
pub use gateway::{ApiRequest, Gateway};
use proto::{CHAT_PATH, ChatReply, ChatRequest, HISTORY_PATH, HistoryRecord};

/// Error type for [`Gateway`] and [`HttpBackend`].
#[derive(Debug)]
pub struct Error {
    message: String,
    kind: ErrorKind,
    status: Option<u16>,
}

impl Error {
    fn new(message: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            message: message.into(),
            kind,
            status: None,
        }
    }

    fn rejected(status: u16) -> Self {
        Self {
            message: format!("backend responded with status {status}"),
            kind: ErrorKind::Rejected,
            status: Some(status),
        }
    }

    /// Returns the HTTP status if the backend rejected the request.
    #[inline]
    pub fn status(&self) -> Option<u16> {
        self.status
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl StdError for Error {}

impl BackendError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

/// The chat endpoints of the movli backend.
#[derive(Clone)]
pub struct HttpBackend {
    gateway: Gateway,
}

impl HttpBackend {
    /// Creates a backend that authenticates through `tokens`.
    #[inline]
    pub fn new(config: ApiConfig, tokens: Arc<dyn TokenProvider>) -> Self {
        Self {
            gateway: Gateway::new(config, tokens),
        }
    }
}

impl ChatBackend for HttpBackend {
    type Error = Error;

    fn fetch_history(
        &self,
    ) -> impl Future<Output = Result<Vec<Message>, Self::Error>> + Send + 'static
    {
        let resp_fut = self
            .gateway
            .send_json::<Vec<HistoryRecord>>(ApiRequest::get(HISTORY_PATH));
        async move {
            let records = resp_fut.await?;
            debug!(count = records.len(), "fetched chat history");
            Ok(proto::map_history(records))
        }
    }

    fn send_prompt(
        &self,
        prompt: &str,
    ) -> impl Future<Output = Result<String, Self::Error>> + Send + 'static {
        let req = ApiRequest::post(CHAT_PATH).with_json(&ChatRequest { prompt });
        let gateway = self.gateway.clone();
        async move {
            let reply: ChatReply = gateway.send_json(req?).await?;
            Ok(reply.reply)
        }
    }
}

#[cfg(test)]
mod tests {
    use mockito::Matcher;
    use movli_model::Identity;
    use movli_test_backend::FakeTokenProvider;
    use serde_json::json;

    use super::*;

    fn backend(url: &str) -> HttpBackend {
        let tokens = FakeTokenProvider::signed_in(Identity::new("alice"));
        let config = ApiConfigBuilder::new().with_base_url(url).build();
        HttpBackend::new(config, Arc::new(tokens))
    }

    #[tokio::test]
    async fn test_fetch_history() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/chat/history")
            .match_header("authorization", "Bearer token-alice-1")
            .with_header("content-type", "application/json")
            .with_body(
                json!([
                    { "role": "user", "content": "hi" },
                    { "role": "bot", "content": "hello" },
                ])
                .to_string(),
            )
            .create_async()
            .await;

        let history = backend(&server.url()).fetch_history().await.unwrap();
        assert_eq!(
            history,
            vec![Message::user("hi"), Message::assistant("hello")]
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_history_with_unknown_role() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/chat/history")
            .with_body(r#"[{"role":"narrator","content":"..."}]"#)
            .create_async()
            .await;

        let err = backend(&server.url()).fetch_history().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidResponse);
    }

    #[tokio::test]
    async fn test_send_prompt() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/chat")
            .match_header("authorization", "Bearer token-alice-1")
            .match_body(Matcher::Json(json!({ "prompt": "recommend a comedy" })))
            .with_body(r#"{"reply":"Try Airplane!"}"#)
            .create_async()
            .await;

        let reply = backend(&server.url())
            .send_prompt("recommend a comedy")
            .await
            .unwrap();
        assert_eq!(reply, "Try Airplane!");
        mock.assert_async().await;
    }
}
