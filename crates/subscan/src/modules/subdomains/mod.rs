pub mod crtsh;
pub mod rapid7;

use super::Module;
use crate::http::{HttpError, HttpTransport};
use crate::model::SourceTag;
use crate::retry::{retry, RetryObserver, RetryPolicy};
use async_trait::async_trait;
use std::collections::HashSet;
use std::fmt;
use std::time::Duration;
use tracing::{debug, instrument, trace, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    Http(HttpError),
    /// The body did not have the shape the source is expected to return.
    Shape(String),
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::Http(err) => write!(f, "{err}"),
            SourceError::Shape(reason) => write!(f, "unexpected response shape: {reason}"),
        }
    }
}

impl std::error::Error for SourceError {}

/// Settings shared by every source request of a scan.
pub struct FetchContext<'a> {
    pub policy: RetryPolicy,
    pub timeout: Duration,
    pub observer: &'a dyn RetryObserver,
}

#[async_trait]
pub trait SubdomainModule: Module + Send + Sync {
    fn tag(&self) -> SourceTag;

    fn url(&self, domain: &str) -> String;

    /// Extract raw names from a response body.
    fn parse(&self, body: &str) -> Result<Vec<String>, SourceError>;

    /// One retried GET, then parse and normalize. A body of the wrong shape
    /// yields an empty list; only transport failures are errors.
    #[instrument(name = "enumerate", level = "debug", fields(module = %self.name()), skip_all)]
    async fn enumerate(
        &self,
        http: &dyn HttpTransport,
        domain: &str,
        ctx: &FetchContext<'_>,
    ) -> Result<Vec<String>, SourceError> {
        let url = self.url(domain);
        let label = self.name();
        let res = retry(ctx.policy, &label, ctx.observer, || http.get(&url, ctx.timeout))
            .await
            .map_err(SourceError::Http)?;

        let names = match self.parse(&res.body) {
            Ok(names) => names,
            Err(err) => {
                warn!("{}: {}, ignoring response", label, err);
                return Ok(Vec::new());
            }
        };

        let subdomains = normalize(names, domain);
        debug!("{} collected", subdomains.len());
        Ok(subdomains)
    }
}

// region:        --- Name normalization

/// Lowercase, drop wildcard and out of scope names, dedup keeping first occurrence.
pub fn normalize<I>(names: I, domain: &str) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    names
        .into_iter()
        .map(|name| name.trim().trim_end_matches('.').to_lowercase())
        .filter(|name| !name.is_empty())
        .filter(|name| !name.contains('*'))
        .filter(|name| in_scope(name, domain))
        .filter(|name| seen.insert(name.clone()))
        .inspect(|name| trace!("Collecting: {:?}", name))
        .collect()
}

/// `name` is the domain itself or one of its subdomains, on a label boundary.
pub fn in_scope(name: &str, domain: &str) -> bool {
    match name.strip_suffix(domain) {
        Some("") => true,
        Some(prefix) => prefix.ends_with('.'),
        None => false,
    }
}

// endregion:     --- Name normalization

// region:        --- Tests


// endregion:     --- Tests
