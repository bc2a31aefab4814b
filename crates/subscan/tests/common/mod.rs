#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use subscan::dns::{DnsError, DnsTransport};
use subscan::http::{HttpError, HttpResponse, HttpTransport};
use subscan::{Backoff, Config};

pub const CRTSH_URL: &str = "https://crt.sh";
pub const RAPID7_URL: &str = "https://sonar.omnisint.io";

/// Default config with every backoff shrunk to nothing.
pub fn test_config() -> Config {
    Config {
        crtsh_url: CRTSH_URL.to_string(),
        rapid7_url: RAPID7_URL.to_string(),
        source_backoff: Backoff::from_millis(0, 0),
        dns_backoff: Backoff::from_millis(0, 0),
        probe_backoff: Backoff::from_millis(0, 0),
        ..Config::default()
    }
}

/// Hosts between their first DNS lookup and their final HEAD probe, i.e.
/// verifications in flight. Shared by [`MockDns`] and [`MockHttp`].
#[derive(Default)]
pub struct VerificationGauge {
    active: Mutex<HashSet<String>>,
    pub max: AtomicUsize,
}

impl VerificationGauge {
    fn enter(&self, hostname: &str) {
        let mut active = self.active.lock().unwrap();
        if active.insert(hostname.to_string()) {
            self.max.fetch_max(active.len(), Ordering::SeqCst);
        }
    }

    fn leave(&self, url: &str) {
        let hostname = url.split("://").nth(1).unwrap_or(url);
        self.active.lock().unwrap().remove(hostname);
    }

    pub fn active(&self) -> usize {
        self.active.lock().unwrap().len()
    }
}

type GetHandler = Box<dyn Fn(&str) -> Result<HttpResponse, HttpError> + Send + Sync>;
type HeadHandler = Box<dyn Fn(&str) -> Result<u16, HttpError> + Send + Sync>;

pub struct MockHttp {
    get: GetHandler,
    head: HeadHandler,
    pub gets: Mutex<HashMap<String, usize>>,
    pub heads: Mutex<Vec<String>>,
    head_delay: Duration,
    gauge: Option<Arc<VerificationGauge>>,
}

impl MockHttp {
    pub fn new<G, H>(get: G, head: H) -> Self
    where
        G: Fn(&str) -> Result<HttpResponse, HttpError> + Send + Sync + 'static,
        H: Fn(&str) -> Result<u16, HttpError> + Send + Sync + 'static,
    {
        Self {
            get: Box::new(get),
            head: Box::new(head),
            gets: Mutex::new(HashMap::new()),
            heads: Mutex::new(Vec::new()),
            head_delay: Duration::ZERO,
            gauge: None,
        }
    }

    /// Hold every HEAD for `delay`, then mark the host as verified on `gauge`.
    /// Only meaningful when the probe ends on the first HEAD (always answering).
    pub fn with_probe_gauge(mut self, delay: Duration, gauge: Arc<VerificationGauge>) -> Self {
        self.head_delay = delay;
        self.gauge = Some(gauge);
        self
    }

    /// GET calls whose url starts with `prefix`.
    pub fn get_count(&self, prefix: &str) -> usize {
        self.gets
            .lock()
            .unwrap()
            .iter()
            .filter(|(url, _)| url.starts_with(prefix))
            .map(|(_, count)| count)
            .sum()
    }

    pub fn head_calls(&self) -> Vec<String> {
        self.heads.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpTransport for MockHttp {
    async fn get(&self, url: &str, _timeout: Duration) -> Result<HttpResponse, HttpError> {
        *self.gets.lock().unwrap().entry(url.to_string()).or_default() += 1;
        (self.get)(url)
    }

    async fn head(&self, url: &str, _timeout: Duration) -> Result<u16, HttpError> {
        self.heads.lock().unwrap().push(url.to_string());
        if !self.head_delay.is_zero() {
            tokio::time::sleep(self.head_delay).await;
        }
        if let Some(gauge) = &self.gauge {
            gauge.leave(url);
        }
        (self.head)(url)
    }
}

pub fn json(body: &str) -> Result<HttpResponse, HttpError> {
    Ok(HttpResponse {
        status: 200,
        body: body.to_string(),
    })
}

/// Serve `crtsh` and `rapid7` bodies on their respective endpoints.
pub fn sources(crtsh: &'static str, rapid7: &'static str) -> impl Fn(&str) -> Result<HttpResponse, HttpError> {
    move |url| {
        if url.starts_with(CRTSH_URL) {
            json(crtsh)
        } else if url.starts_with(RAPID7_URL) {
            json(rapid7)
        } else {
            Err(HttpError::NoResponse(format!("unknown endpoint {url}")))
        }
    }
}

type ResolveHandler = Box<dyn Fn(&str) -> Result<Vec<Ipv4Addr>, DnsError> + Send + Sync>;

pub struct MockDns {
    resolve: ResolveHandler,
    delay: Duration,
    pub calls: Mutex<HashMap<String, usize>>,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    gauge: Option<Arc<VerificationGauge>>,
}

impl MockDns {
    pub fn new<R>(resolve: R) -> Self
    where
        R: Fn(&str) -> Result<Vec<Ipv4Addr>, DnsError> + Send + Sync + 'static,
    {
        Self {
            resolve: Box::new(resolve),
            delay: Duration::ZERO,
            calls: Mutex::new(HashMap::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            gauge: None,
        }
    }

    /// Mark every looked up host as in flight on `gauge`.
    pub fn with_gauge(mut self, gauge: Arc<VerificationGauge>) -> Self {
        self.gauge = Some(gauge);
        self
    }

    /// Hold every lookup for `delay` so overlapping verifications can be observed.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls_for(&self, hostname: &str) -> usize {
        self.calls.lock().unwrap().get(hostname).copied().unwrap_or(0)
    }
}

#[async_trait]
impl DnsTransport for MockDns {
    async fn resolve_a(&self, hostname: &str) -> Result<Vec<Ipv4Addr>, DnsError> {
        *self.calls.lock().unwrap().entry(hostname.to_string()).or_default() += 1;
        if let Some(gauge) = &self.gauge {
            gauge.enter(hostname);
        }

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        (self.resolve)(hostname)
    }
}

pub fn resolves_to(ip: Ipv4Addr) -> impl Fn(&str) -> Result<Vec<Ipv4Addr>, DnsError> {
    move |_| Ok(vec![ip])
}

pub fn shared<T>(value: T) -> Arc<T> {
    Arc::new(value)
}
