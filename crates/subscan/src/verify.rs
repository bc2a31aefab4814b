use crate::config::{Config, ScanOptions};
use crate::dns::DnsTransport;
use crate::http::{HttpError, HttpTransport};
use crate::model::{Candidate, VerificationRecord};
use crate::retry::{retry, RetryObserver, RetryPolicy};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

/// Liveness probes get a single retry whatever the scan retry count is.
pub const PROBE_RETRIES: u32 = 1;

/// Resolves a candidate then probes it over HTTPS, falling back to HTTP.
/// Every failure ends up in the record, nothing is propagated.
#[derive(Clone)]
pub struct Verifier {
    http: Arc<dyn HttpTransport>,
    dns: Arc<dyn DnsTransport>,
    observer: Arc<dyn RetryObserver>,
    dns_policy: RetryPolicy,
    probe_policy: RetryPolicy,
    timeout: Duration,
}

impl Verifier {
    pub fn new(
        http: Arc<dyn HttpTransport>,
        dns: Arc<dyn DnsTransport>,
        observer: Arc<dyn RetryObserver>,
        config: &Config,
        options: &ScanOptions,
    ) -> Self {
        Self {
            http,
            dns,
            observer,
            dns_policy: config.dns_backoff.policy(options.retries),
            probe_policy: config.probe_backoff.policy(PROBE_RETRIES),
            timeout: options.timeout,
        }
    }

    #[instrument(name = "verify", level = "debug", skip_all, fields(host = %candidate.hostname))]
    pub async fn verify(&self, candidate: Candidate) -> VerificationRecord {
        let Candidate { hostname, source } = candidate;

        // a failed resolution does not stop the probe, the name may still answer
        let (resolved_ips, error) = match self.resolve(&hostname).await {
            Ok(ips) => (ips, None),
            Err(err) => {
                debug!("{}", err);
                (Vec::new(), Some(err))
            }
        };

        let is_alive = self.probe(&hostname).await;
        debug!("Verified {} => alive: {}", hostname, is_alive);

        VerificationRecord {
            subdomain: hostname,
            is_alive,
            resolved_ips,
            source,
            error,
        }
    }

    async fn resolve(&self, hostname: &str) -> Result<Vec<std::net::Ipv4Addr>, String> {
        let label = format!("resolve {hostname}");
        retry(self.dns_policy, &label, self.observer.as_ref(), || {
            self.dns.resolve_a(hostname)
        })
        .await
        .map_err(|err| format!("DNS resolution failed for {hostname}: {err}"))
    }

    async fn probe(&self, hostname: &str) -> bool {
        let label = format!("probe {hostname}");
        retry(self.probe_policy, &label, self.observer.as_ref(), || {
            self.probe_once(hostname)
        })
        .await
        .is_ok()
    }

    /// HTTPS then HTTP, as one attempt. Any response, whatever its status,
    /// means something is listening.
    async fn probe_once(&self, hostname: &str) -> Result<(), HttpError> {
        match self.head(&format!("https://{hostname}")).await {
            Ok(()) => Ok(()),
            Err(_) => self.head(&format!("http://{hostname}")).await,
        }
    }

    async fn head(&self, url: &str) -> Result<(), HttpError> {
        match self.http.head(url, self.timeout).await {
            Ok(_) | Err(HttpError::Status(_)) => Ok(()),
            Err(err) => Err(err),
        }
    }
}
