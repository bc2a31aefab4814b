pub mod subdomains;

use self::subdomains::crtsh::CrtSh;
use self::subdomains::rapid7::Rapid7;
use self::subdomains::SubdomainModule;
use crate::config::Config;

pub trait Module {
    fn name(&self) -> String;
    fn description(&self) -> String;
}

/// Sources in fetch order. The first one to report a hostname gives it its tag.
pub fn subdomains_modules(config: &Config) -> Vec<Box<dyn SubdomainModule>> {
    vec![
        Box::new(CrtSh::new(&config.crtsh_url)),
        Box::new(Rapid7::new(&config.rapid7_url)),
    ]
}

pub fn display_all(config: &Config) {
    println!("\nSubdomains modules");
    for module in subdomains_modules(config) {
        println!("- {:25}{:12}{}", module.name(), module.tag().to_string(), module.description());
    }
}
