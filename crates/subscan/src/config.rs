use crate::retry::RetryPolicy;
use crate::{Error, Result};
use std::env;
use std::net::IpAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::Level;

// region:        --- Defaults

const DEFAULT_TIMEOUT_MS: u64 = 5000;
const DEFAULT_RETRIES: u32 = 3;
const DEFAULT_THREADS: usize = 10;
const DEFAULT_DNS_SERVERS: &[&str] = &["1.1.1.1", "1.0.0.1"];
const DEFAULT_CRTSH_URL: &str = "https://crt.sh";
const DEFAULT_RAPID7_URL: &str = "https://sonar.omnisint.io";

// endregion:     --- Defaults

/// Lower and upper bound of the wait between two attempts of a retried operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    pub min: Duration,
    pub max: Duration,
}

impl Backoff {
    pub const fn from_millis(min: u64, max: u64) -> Self {
        Self {
            min: Duration::from_millis(min),
            max: Duration::from_millis(max),
        }
    }

    pub fn policy(&self, retries: u32) -> RetryPolicy {
        RetryPolicy::new(retries, self.min, self.max)
    }
}

/// Process wide settings, built once at start and never mutated afterward.
#[derive(Debug, Clone)]
pub struct Config {
    pub timeout: Duration,
    pub retries: u32,
    pub concurrency: usize,
    pub dns_servers: Vec<IpAddr>,
    pub crtsh_url: String,
    pub rapid7_url: String,
    pub brute_force: bool,
    pub log_level: Level,
    pub source_backoff: Backoff,
    pub dns_backoff: Backoff,
    pub probe_backoff: Backoff,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            retries: DEFAULT_RETRIES,
            concurrency: DEFAULT_THREADS,
            dns_servers: DEFAULT_DNS_SERVERS
                .iter()
                .filter_map(|ip| ip.parse().ok())
                .collect(),
            crtsh_url: DEFAULT_CRTSH_URL.to_string(),
            rapid7_url: DEFAULT_RAPID7_URL.to_string(),
            brute_force: false,
            log_level: Level::INFO,
            source_backoff: Backoff::from_millis(500, 3000),
            dns_backoff: Backoff::from_millis(500, 3000),
            probe_backoff: Backoff::from_millis(500, 2000),
        }
    }
}

impl Config {
    /// Build the config from the process environment, falling back to defaults
    /// for every unset variable.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(ms) = parse_var(&lookup, "DEFAULT_TIMEOUT")? {
            config.timeout = Duration::from_millis(ms);
        }
        if let Some(retries) = parse_var(&lookup, "DEFAULT_RETRIES")? {
            config.retries = retries;
        }
        if let Some(threads) = parse_var(&lookup, "DEFAULT_THREADS")? {
            config.concurrency = threads;
        }
        if let Some(servers) = lookup("DNS_SERVERS") {
            config.dns_servers = servers
                .split(',')
                .map(str::trim)
                .filter(|server| !server.is_empty())
                .map(|server| {
                    server
                        .parse::<IpAddr>()
                        .map_err(|_| Error::Config(format!("DNS_SERVERS: invalid address {server:?}")))
                })
                .collect::<Result<_>>()?;
        }
        if let Some(url) = lookup("CRTSH_API_URL") {
            config.crtsh_url = url;
        }
        if let Some(url) = lookup("RAPID7_API_URL") {
            config.rapid7_url = url;
        }
        if let Some(flag) = lookup("ENABLE_BRUTE_FORCE") {
            config.brute_force = flag == "true";
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            config.log_level = match level.as_str() {
                "debug" => Level::DEBUG,
                "info" => Level::INFO,
                "warn" => Level::WARN,
                "error" => Level::ERROR,
                other => return Err(Error::Config(format!("LOG_LEVEL: unknown level {other:?}"))),
            };
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.timeout.is_zero() {
            return Err(Error::Config("DEFAULT_TIMEOUT must be positive".into()));
        }
        if self.concurrency == 0 {
            return Err(Error::Config("DEFAULT_THREADS must be positive".into()));
        }
        if self.dns_servers.is_empty() {
            return Err(Error::Config("DNS_SERVERS must not be empty".into()));
        }
        for backoff in [&self.source_backoff, &self.dns_backoff, &self.probe_backoff] {
            if backoff.min > backoff.max {
                return Err(Error::Config(format!("backoff min above max: {backoff:?}")));
            }
        }
        Ok(())
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| Error::Config(format!("{key}: cannot parse {raw:?}"))),
        None => Ok(None),
    }
}

// region:        --- Scan options

/// Per-scan settings. Every field defaults from the [`Config`].
#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub concurrency: usize,
    pub timeout: Duration,
    pub retries: u32,
    pub brute_force: bool,
    pub wordlist: Option<PathBuf>,
}

impl From<&Config> for ScanOptions {
    fn from(config: &Config) -> Self {
        Self {
            concurrency: config.concurrency,
            timeout: config.timeout,
            retries: config.retries,
            brute_force: config.brute_force,
            wordlist: None,
        }
    }
}

impl ScanOptions {
    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(Error::InvalidOptions("concurrency must be positive".into()));
        }
        if self.timeout.is_zero() {
            return Err(Error::InvalidOptions("timeout must be positive".into()));
        }
        Ok(())
    }
}

// endregion:     --- Scan options

// region:        --- Tests

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_set() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert_eq!(config.timeout, Duration::from_millis(5000));
        assert_eq!(config.retries, 3);
        assert_eq!(config.concurrency, 10);
        assert_eq!(config.dns_servers.len(), 2);
        assert_eq!(config.crtsh_url, "https://crt.sh");
        assert!(!config.brute_force);
    }

    #[test]
    fn reads_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("DEFAULT_TIMEOUT", "1500"),
            ("DEFAULT_RETRIES", "0"),
            ("DNS_SERVERS", "9.9.9.9, 8.8.8.8"),
            ("ENABLE_BRUTE_FORCE", "true"),
            ("LOG_LEVEL", "debug"),
        ]))
        .unwrap();
        assert_eq!(config.timeout, Duration::from_millis(1500));
        assert_eq!(config.retries, 0);
        assert_eq!(config.dns_servers, vec!["9.9.9.9".parse::<IpAddr>().unwrap(), "8.8.8.8".parse().unwrap()]);
        assert!(config.brute_force);
        assert_eq!(config.log_level, Level::DEBUG);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(Config::from_lookup(lookup_from(&[("DEFAULT_RETRIES", "-1")])).is_err());
        assert!(Config::from_lookup(lookup_from(&[("DEFAULT_THREADS", "0")])).is_err());
        assert!(Config::from_lookup(lookup_from(&[("DNS_SERVERS", "not-an-ip")])).is_err());
        assert!(Config::from_lookup(lookup_from(&[("LOG_LEVEL", "loud")])).is_err());
    }

    #[test]
    fn scan_options_validation() {
        let config = Config::default();
        let mut options = ScanOptions::from(&config);
        assert!(options.validate().is_ok());

        options.concurrency = 0;
        assert!(matches!(options.validate(), Err(Error::InvalidOptions(_))));
    }
}

// endregion:     --- Tests
