use super::{SourceError, SubdomainModule};
use crate::model::SourceTag;
use crate::modules::Module;
use serde::Deserialize;

// region:        --- Module info

pub struct CrtSh {
    base_url: String,
}

impl CrtSh {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl Module for CrtSh {
    fn name(&self) -> String {
        "subdomains/crtsh".to_string()
    }

    fn description(&self) -> String {
        "Use crt.sh certificate transparency logs to find subdomains".to_string()
    }
}

// endregion:     --- Module info

#[derive(Debug, Deserialize)]
pub struct CrtShEntry {
    #[serde(default)]
    pub name_value: Option<String>,
}

impl SubdomainModule for CrtSh {
    fn tag(&self) -> SourceTag {
        SourceTag::CertLog
    }

    fn url(&self, domain: &str) -> String {
        format!("{}/?q=%25.{}&output=json", self.base_url, domain)
    }

    fn parse(&self, body: &str) -> Result<Vec<String>, SourceError> {
        let entries: Vec<CrtShEntry> =
            serde_json::from_str(body).map_err(|err| SourceError::Shape(err.to_string()))?;

        // one certificate may cover several names
        Ok(entries
            .into_iter()
            .filter_map(|entry| entry.name_value)
            .flat_map(|name_value| {
                name_value
                    .split('\n')
                    .map(|name| name.to_string())
                    .collect::<Vec<String>>()
            })
            .collect())
    }
}
