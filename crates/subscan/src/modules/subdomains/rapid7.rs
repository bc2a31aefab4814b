use super::{SourceError, SubdomainModule};
use crate::model::SourceTag;
use crate::modules::Module;

// region:        --- Module info

pub struct Rapid7 {
    base_url: String,
}

impl Rapid7 {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl Module for Rapid7 {
    fn name(&self) -> String {
        "subdomains/rapid7".to_string()
    }

    fn description(&self) -> String {
        "Use the Project Sonar passive DNS dataset to find subdomains".to_string()
    }
}

// endregion:     --- Module info

impl SubdomainModule for Rapid7 {
    fn tag(&self) -> SourceTag {
        SourceTag::PassiveDns
    }

    fn url(&self, domain: &str) -> String {
        format!("{}/subdomains/{}", self.base_url, domain)
    }

    fn parse(&self, body: &str) -> Result<Vec<String>, SourceError> {
        serde_json::from_str(body).map_err(|err| SourceError::Shape(err.to_string()))
    }
}
