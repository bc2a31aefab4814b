use crate::Result;
use serde::Serialize;
use serde_json::to_string_pretty;
use std::fmt::{self, Write as FmtWrite};
use std::fs::{self, File};
use std::io::Write;
use std::net::Ipv4Addr;
use std::path::Path;

// region:        --- Models

/// Which data source produced a hostname first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceTag {
    CertLog,
    PassiveDns,
    // reserved for wordlist enumeration
    BruteForce,
}

impl fmt::Display for SourceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            SourceTag::CertLog => "cert-log",
            SourceTag::PassiveDns => "passive-dns",
            SourceTag::BruteForce => "brute-force",
        };
        f.write_str(tag)
    }
}

/// A hostname found by a source, before verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub hostname: String,
    pub source: SourceTag,
}

/// Outcome of verifying one candidate. Built once by the verifier, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationRecord {
    pub subdomain: String,
    pub is_alive: bool,
    pub resolved_ips: Vec<Ipv4Addr>,
    pub source: SourceTag,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// endregion:     --- Models

// region:        --- Exporting utils

pub fn ensure_dir(dir: &Path) -> Result<bool> {
    if dir.is_dir() {
        Ok(false)
    } else {
        fs::create_dir_all(dir)?;
        Ok(true)
    }
}

pub fn export_to_json(result: &[VerificationRecord], path: &Path) -> Result<()> {
    let json = to_string_pretty(result)?;
    let mut file = File::create(path)?;
    file.write_all(json.as_bytes())?;
    Ok(())
}

pub fn render_markdown(result: &[VerificationRecord], target: &str) -> Result<String> {
    let (alive, dead): (Vec<_>, Vec<_>) = result.iter().partition(|record| record.is_alive);

    let mut md_content = String::new();
    writeln!(&mut md_content, "# Subdomains of `{}`", target)?;
    writeln!(&mut md_content)?;
    writeln!(
        &mut md_content,
        "{} subdomains verified, {} alive.",
        result.len(),
        alive.len()
    )?;

    writeln!(&mut md_content)?;
    writeln!(&mut md_content, "## Alive")?;
    writeln!(&mut md_content)?;
    if alive.is_empty() {
        writeln!(&mut md_content, "No live subdomain found")?;
    }
    for record in alive {
        writeln!(
            &mut md_content,
            "- **{}** ({}) {}",
            record.subdomain,
            record.source,
            join_ips(&record.resolved_ips)
        )?;
    }

    writeln!(&mut md_content)?;
    writeln!(&mut md_content, "## Not responding")?;
    writeln!(&mut md_content)?;
    for record in dead {
        write!(&mut md_content, "- {} ({})", record.subdomain, record.source)?;
        match &record.error {
            Some(error) => writeln!(&mut md_content, ": {}", error)?,
            None => writeln!(&mut md_content, " {}", join_ips(&record.resolved_ips))?,
        }
    }

    Ok(md_content)
}

pub fn export_to_markdown(result: &[VerificationRecord], target: &str, path: &Path) -> Result<()> {
    let md_content = render_markdown(result, target)?;
    let mut file = File::create(path)?;
    file.write_all(md_content.as_bytes())?;
    Ok(())
}

fn join_ips(ips: &[Ipv4Addr]) -> String {
    ips.iter()
        .map(|ip| ip.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

// endregion:     --- Exporting utils

// region:        --- Tests


// endregion:     --- Tests
