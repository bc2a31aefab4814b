use crate::config::{Config, ScanOptions};
use crate::dns::{DnsTransport, HickoryTransport};
use crate::http::{HttpTransport, ReqwestTransport};
use crate::model::{Candidate, SourceTag, VerificationRecord};
use crate::modules::subdomains::{FetchContext, SubdomainModule};
use crate::modules::{self, Module};
use crate::retry::{RetryObserver, TracingObserver};
use crate::subdomains::aggregate;
use crate::verify::Verifier;
use crate::{Error, Result};
use futures::{future, stream, StreamExt};
use lazy_regex::regex_is_match;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Entry point of the pipeline: fetch, aggregate, verify.
///
/// A scanner holds no state between scans; the transports are shared read-only
/// by every verification in flight.
pub struct Scanner {
    config: Arc<Config>,
    http: Arc<dyn HttpTransport>,
    dns: Arc<dyn DnsTransport>,
    observer: Arc<dyn RetryObserver>,
}

// region:        --- Constructors

impl Scanner {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let http = ReqwestTransport::new(config.timeout)?;
        let dns = HickoryTransport::new(&config.dns_servers, config.timeout);
        Ok(Self::with_transports(config, Arc::new(http), Arc::new(dns)))
    }

    pub fn with_transports(
        config: Config,
        http: Arc<dyn HttpTransport>,
        dns: Arc<dyn DnsTransport>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            http,
            dns,
            observer: Arc::new(TracingObserver),
        }
    }

    /// Replace the retry progress reporter (defaults to [`TracingObserver`]).
    pub fn with_observer(mut self, observer: Arc<dyn RetryObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn default_options(&self) -> ScanOptions {
        ScanOptions::from(self.config.as_ref())
    }
}

// endregion:     --- Constructors

// region:        --- Scan main function

impl Scanner {
    pub async fn scan(&self, domain: &str) -> Result<Vec<VerificationRecord>> {
        self.scan_with(domain, self.default_options()).await
    }

    /// Only invalid input is an error. Network failures end up as empty
    /// source contributions or inside the returned records.
    #[instrument(name = "scan", level = "info", skip_all, fields(domain = domain))]
    pub async fn scan_with(&self, domain: &str, options: ScanOptions) -> Result<Vec<VerificationRecord>> {
        let domain = normalize_domain(domain)?;
        options.validate()?;
        info!("Starting subdomain scan for {}", domain);

        let sources = self.fetch_sources(&domain, &options).await;
        let candidates = aggregate(sources);
        info!("Discovered {} unique subdomains", candidates.len());

        if options.brute_force {
            brute_force(&options);
        }

        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let verifier = Verifier::new(
            self.http.clone(),
            self.dns.clone(),
            self.observer.clone(),
            &self.config,
            &options,
        );
        let records = verify_all(&verifier, candidates, options.concurrency).await;

        let alive = records.iter().filter(|record| record.is_alive).count();
        info!("Verification complete for {}: {}/{} alive", domain, alive, records.len());
        Ok(records)
    }
}

// endregion:     --- Scan main function

// region:        --- Scan subfunctions

impl Scanner {
    /// Every source is fetched concurrently; results come back in fetch order.
    #[instrument(name = "sources", level = "info", skip_all)]
    async fn fetch_sources(&self, domain: &str, options: &ScanOptions) -> Vec<(SourceTag, Vec<String>)> {
        let ctx = FetchContext {
            policy: self.config.source_backoff.policy(options.retries),
            timeout: options.timeout,
            observer: self.observer.as_ref(),
        };
        let modules = modules::subdomains_modules(&self.config);

        future::join_all(modules.iter().map(|module| fetch_source(module.as_ref(), self.http.as_ref(), domain, &ctx)))
            .await
    }
}

async fn fetch_source(
    module: &dyn SubdomainModule,
    http: &dyn HttpTransport,
    domain: &str,
    ctx: &FetchContext<'_>,
) -> (SourceTag, Vec<String>) {
    match module.enumerate(http, domain, ctx).await {
        Ok(subdomains) => {
            info!("{}: {} subdomains", module.name(), subdomains.len());
            (module.tag(), subdomains)
        }
        Err(err) => {
            error!("{}: {}", module.name(), err);
            (module.tag(), Vec::new())
        }
    }
}

/// Verify every candidate with at most `concurrency` verifications in flight.
/// Yields exactly one record per candidate, in completion order.
#[instrument(name = "verify_all", level = "info", skip_all, fields(count = candidates.len()))]
pub async fn verify_all(
    verifier: &Verifier,
    candidates: Vec<Candidate>,
    concurrency: usize,
) -> Vec<VerificationRecord> {
    stream::iter(candidates.into_iter())
        .map(|candidate| verifier.verify(candidate))
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await
}

fn brute_force(options: &ScanOptions) {
    if let Some(wordlist) = &options.wordlist {
        if !wordlist.is_file() {
            warn!("Wordlist {:?} not found", wordlist);
        }
    }
    warn!("Brute force scanning is not yet implemented. Skipping...");
}

/// Trimmed, lowercased, without trailing dot.
pub fn normalize_domain(domain: &str) -> Result<String> {
    let normalized = domain.trim().trim_end_matches('.').to_lowercase();
    debug!("Normalized target: {:?}", normalized);

    if regex_is_match!(r"^[a-z0-9_-]+(\.[a-z0-9_-]+)*$", &normalized) {
        Ok(normalized)
    } else {
        Err(Error::InvalidDomain(domain.to_string()))
    }
}

// endregion:     --- Scan subfunctions

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_valid_domains() {
        assert_eq!(normalize_domain(" Example.COM. ").unwrap(), "example.com");
        assert_eq!(normalize_domain("sub-1.example.co.uk").unwrap(), "sub-1.example.co.uk");
    }

    #[test]
    fn rejects_invalid_domains() {
        for domain in ["", "  ", "exa mple.com", "*.example.com", "example..com", "https://example.com", ".example.com"] {
            assert!(
                matches!(normalize_domain(domain), Err(Error::InvalidDomain(_))),
                "{domain:?} should be rejected"
            );
        }
    }
}
