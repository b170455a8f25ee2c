use std::sync::Arc;

use movli_model::{ErrorKind, TokenProvider};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::Instrument;

use crate::{ApiConfig, Error};

/// Describes an outbound call before credentials are attached.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiRequest {
    method: Method,
    path: String,
    body: Option<Value>,
}

impl ApiRequest {
    /// A `GET` request for `path`.
    #[inline]
    pub fn get<S: Into<String>>(path: S) -> Self {
        Self::new(Method::GET, path)
    }

    /// A `POST` request for `path`, without a body yet.
    #[inline]
    pub fn post<S: Into<String>>(path: S) -> Self {
        Self::new(Method::POST, path)
    }

    #[inline]
    pub fn new<S: Into<String>>(method: Method, path: S) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
        }
    }

    /// Attaches a JSON body.
    pub fn with_json<B: Serialize>(mut self, body: &B) -> Result<Self, Error> {
        let body = serde_json::to_value(body).map_err(|err| {
            Error::new(
                format!("cannot encode request body: {err}"),
                ErrorKind::InvalidRequest,
            )
        })?;
        self.body = Some(body);
        Ok(self)
    }
}

/// Wraps the HTTP client so that every call carries a freshly minted
/// bearer credential for whoever is signed in at dispatch time.
///
/// Nothing is cached between calls: the identity is looked up and a new
/// token is minted for every request. Without an identity the call goes
/// out unauthenticated and the backend decides what to do with it.
/// Failures are reported, never retried.
#[derive(Clone)]
pub struct Gateway {
    client: Client,
    config: Arc<ApiConfig>,
    tokens: Arc<dyn TokenProvider>,
}

impl Gateway {
    #[inline]
    pub fn new(config: ApiConfig, tokens: Arc<dyn TokenProvider>) -> Self {
        Self::with_client(Client::new(), config, tokens)
    }

    /// Creates a gateway on top of an existing client.
    #[inline]
    pub fn with_client(
        client: Client,
        config: ApiConfig,
        tokens: Arc<dyn TokenProvider>,
    ) -> Self {
        Self {
            client,
            config: Arc::new(config),
            tokens,
        }
    }

    /// Sends `req` and returns the response if its status is a success.
    pub fn dispatch(
        &self,
        req: ApiRequest,
    ) -> impl Future<Output = Result<Response, Error>> + Send + 'static {
        let client = self.client.clone();
        let config = Arc::clone(&self.config);
        let tokens = Arc::clone(&self.tokens);
        let span = debug_span!("gateway", method = %req.method, path = %req.path);

        async move {
            let mut builder = client
                .request(req.method, config.url(&req.path))
                .timeout(config.timeout);
            if let Some(body) = &req.body {
                builder = builder.json(body);
            }
            let builder = authorize(tokens.as_ref(), builder).await?;

            let resp = builder.send().await.map_err(|err| {
                warn!("request failed: {err}");
                Error::new(format!("{err}"), ErrorKind::Network)
            })?;

            let status = resp.status();
            if !status.is_success() {
                warn!(status = status.as_u16(), "backend rejected the request");
                return Err(Error::rejected(status.as_u16()));
            }
            trace!(status = status.as_u16(), "got a response");
            Ok(resp)
        }
        .instrument(span)
    }

    /// Sends `req` and decodes the JSON response body.
    pub fn send_json<T: DeserializeOwned + Send + 'static>(
        &self,
        req: ApiRequest,
    ) -> impl Future<Output = Result<T, Error>> + Send + 'static {
        let resp_fut = self.dispatch(req);
        async move {
            let body = resp_fut
                .await?
                .bytes()
                .await
                .map_err(|err| Error::new(format!("{err}"), ErrorKind::Network))?;
            serde_json::from_slice(&body).map_err(|err| {
                warn!("cannot decode response: {err}");
                Error::new(
                    format!("cannot decode response: {err}"),
                    ErrorKind::InvalidResponse,
                )
            })
        }
    }
}

/// Attaches a bearer credential to `builder` if someone is signed in.
async fn authorize(
    tokens: &dyn TokenProvider,
    builder: RequestBuilder,
) -> Result<RequestBuilder, Error> {
    let Some(identity) = tokens.current_identity() else {
        debug!("no identity, dispatching unauthenticated");
        return Ok(builder);
    };
    match tokens.mint_token(&identity).await {
        Ok(token) => {
            trace!(uid = %identity.uid, "attached a fresh credential");
            Ok(builder.bearer_auth(token))
        }
        Err(err) => {
            warn!(uid = %identity.uid, "cannot mint credential: {err}");
            Err(Error::new(format!("{err}"), ErrorKind::Auth))
        }
    }
}
