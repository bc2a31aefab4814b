use async_trait::async_trait;
use hickory_resolver::config::{
    LookupIpStrategy, NameServerConfigGroup, ResolverConfig, ResolverOpts,
};
use hickory_resolver::error::{ResolveError, ResolveErrorKind};
use hickory_resolver::TokioAsyncResolver;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;
use tracing::{debug, trace};

const DNS_PORT: u16 = 53;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DnsError {
    NoSuchName(String),
    Timeout(String),
    ServerFailure(String),
}

impl fmt::Display for DnsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DnsError::NoSuchName(name) => write!(f, "no A record found for {name}"),
            DnsError::Timeout(name) => write!(f, "timed out resolving {name}"),
            DnsError::ServerFailure(reason) => write!(f, "server failure: {reason}"),
        }
    }
}

impl std::error::Error for DnsError {}

#[async_trait]
pub trait DnsTransport: Send + Sync {
    async fn resolve_a(&self, hostname: &str) -> core::result::Result<Vec<Ipv4Addr>, DnsError>;
}

// region:        --- Hickory transport

pub struct HickoryTransport {
    resolver: TokioAsyncResolver,
}

impl HickoryTransport {
    /// `timeout` is fixed for the life of the resolver; per-scan timeouts only
    /// apply to HTTP requests.
    pub fn new(nameservers: &[IpAddr], timeout: Duration) -> Self {
        let opts = resolver_opts(timeout);
        debug!("DNS resolver options: {:?}", opts);

        let config = if nameservers.is_empty() {
            ResolverConfig::default()
        } else {
            let group = NameServerConfigGroup::from_ips_clear(nameservers, DNS_PORT, true);
            ResolverConfig::from_parts(None, vec![], group)
        };

        let resolver = TokioAsyncResolver::tokio(config, opts);
        debug!("DNS resolver created: {:?}", resolver);
        Self { resolver }
    }
}

#[async_trait]
impl DnsTransport for HickoryTransport {
    async fn resolve_a(&self, hostname: &str) -> core::result::Result<Vec<Ipv4Addr>, DnsError> {
        let lookup = self
            .resolver
            .lookup_ip(hostname)
            .await
            .map_err(|err| classify(hostname, err))?;
        trace!("{:?}", lookup);

        let ips: Vec<Ipv4Addr> = lookup
            .iter()
            .filter_map(|ip| match ip {
                IpAddr::V4(ip) => Some(ip),
                IpAddr::V6(_) => None,
            })
            .collect();

        if ips.is_empty() {
            return Err(DnsError::NoSuchName(hostname.to_string()));
        }
        Ok(ips)
    }
}

/// Uncached so every scan, and every retry, asks the nameservers again.
fn resolver_opts(timeout: Duration) -> ResolverOpts {
    let mut opts = ResolverOpts::default();
    opts.timeout = timeout;
    opts.ip_strategy = LookupIpStrategy::Ipv4Only;
    opts.cache_size = 0;
    opts
}

fn classify(name: &str, err: ResolveError) -> DnsError {
    match err.kind() {
        ResolveErrorKind::NoRecordsFound { .. } => DnsError::NoSuchName(name.to_string()),
        ResolveErrorKind::Timeout => DnsError::Timeout(name.to_string()),
        _ => DnsError::ServerFailure(err.to_string()),
    }
}

// endregion:     --- Hickory transport
