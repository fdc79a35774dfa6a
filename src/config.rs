use std::time::Duration;

use derive_builder::Builder;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const BASE_URL_VAR: &str = "RETAIL_API_URL";
pub const TIMEOUT_VAR: &str = "RETAIL_API_TIMEOUT_SECS";

/// Where the retail API lives and how long to wait for it
#[derive(Clone, Debug, PartialEq, Builder)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct Config {
    #[builder(setter(custom), field(build = "self.base_url_build()"))]
    pub base_url: String,
    #[builder(default = "Duration::from_secs(DEFAULT_TIMEOUT_SECS)")]
    pub timeout: Duration,
    #[builder(setter(into), default = "self.default_user_agent()")]
    pub user_agent: String,
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
    /// Joins an endpoint path onto the base url
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

impl ConfigBuilder {
    pub fn base_url<S: Into<String>>(&mut self, url: S) -> &mut Self {
        self.base_url = Some(url.into());
        self
    }
    fn base_url_build(&self) -> String {
        self.base_url
            .clone()
            .unwrap_or(String::from(DEFAULT_BASE_URL))
            .trim()
            .trim_end_matches('/')
            .to_string()
    }
    fn default_user_agent(&self) -> String {
        format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
    }
    fn validate(&self) -> core::result::Result<(), String> {
        let url = self.base_url_build();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(format!("base url '{url}' must start with http:// or https://"));
        }
        if self.timeout.is_some_and(|t| t.is_zero()) {
            return Err(String::from("timeout must be greater than zero"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn defaults_are_local_host_and_ten_seconds() -> Result<()> {
        let config = Config::builder().build()?;
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert!(config.user_agent.starts_with("retail-desk/"));
        Ok(())
    }
    #[test]
    fn base_url_is_trimmed() -> Result<()> {
        let config = Config::builder()
            .base_url(" https://shop.example.com/ ")
            .build()?;
        assert_eq!(config.base_url, "https://shop.example.com");
        assert_eq!(config.url("/estoque"), "https://shop.example.com/estoque");
        assert_eq!(config.url("estoque_log/"), "https://shop.example.com/estoque_log/");
        Ok(())
    }
    #[test]
    fn rejects_bad_values() {
        assert!(Config::builder().base_url("localhost:5000").build().is_err());
        assert!(Config::builder()
            .timeout(Duration::from_secs(0))
            .build()
            .is_err());
    }
}
