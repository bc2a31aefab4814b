use crate::Result;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use std::fmt;
use std::time::Duration;
use tracing::{debug, instrument, trace};

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpError {
    /// The request never completed: refused, reset, timed out, TLS failure...
    NoResponse(String),
    /// A response arrived with a non 2xx status.
    Status(u16),
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpError::NoResponse(reason) => write!(f, "no response: {reason}"),
            HttpError::Status(status) => write!(f, "request failed with status code {status}"),
        }
    }
}

impl std::error::Error for HttpError {}

#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, url: &str, timeout: Duration) -> core::result::Result<HttpResponse, HttpError>;
    async fn head(&self, url: &str, timeout: Duration) -> core::result::Result<u16, HttpError>;
}

// region:        --- Reqwest transport

pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        debug!("HTTP Client created: {:?}", client);
        Ok(Self { client })
    }

    async fn send(request: RequestBuilder) -> core::result::Result<reqwest::Response, HttpError> {
        let res = request
            .send()
            .await
            .map_err(|err| HttpError::NoResponse(err.to_string()))?;
        trace!("Receive with status: {}", res.status());

        if !res.status().is_success() {
            return Err(HttpError::Status(res.status().as_u16()));
        }
        Ok(res)
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    #[instrument(name = "GET", level = "debug", skip_all, fields(url = url))]
    async fn get(&self, url: &str, timeout: Duration) -> core::result::Result<HttpResponse, HttpError> {
        let res = Self::send(self.client.get(url).timeout(timeout)).await?;
        let status = res.status().as_u16();
        let body = res
            .text()
            .await
            .map_err(|err| HttpError::NoResponse(err.to_string()))?;
        Ok(HttpResponse { status, body })
    }

    #[instrument(name = "HEAD", level = "debug", skip_all, fields(url = url))]
    async fn head(&self, url: &str, timeout: Duration) -> core::result::Result<u16, HttpError> {
        let res = Self::send(self.client.head(url).timeout(timeout)).await?;
        Ok(res.status().as_u16())
    }
}

// endregion:     --- Reqwest transport
