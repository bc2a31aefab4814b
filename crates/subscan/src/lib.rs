//! Passive subdomain discovery and verification.
//!
//! Candidate hostnames are collected from certificate transparency logs and a
//! passive DNS dataset, deduplicated, then each one is resolved and probed over
//! HTTP(S) with a bounded number of verifications in flight.

pub mod config;
pub mod dns;
mod error;
pub mod http;
pub mod model;
pub mod modules;
pub mod retry;
pub mod scan;
pub mod subdomains;
pub mod verify;

pub use config::{Backoff, Config, ScanOptions};
pub use error::{Error, Result};
pub use model::{Candidate, SourceTag, VerificationRecord};
pub use scan::Scanner;
