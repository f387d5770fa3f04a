use serde::Deserialize;
use std::fs::File;

#[derive(Deserialize, Debug)]
pub struct StoreConfig {
    pub base_dir: String,
    pub filename: String,
}

#[derive(Deserialize, Debug, PartialEq)]
pub struct TrackerConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_issue_page_size")]
    pub issue_page_size: u32,
    #[serde(default = "default_issue_type")]
    pub default_issue_type: String,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_issue_page_size() -> u32 {
    50
}

fn default_issue_type() -> String {
    "Story".to_string()
}

impl Default for TrackerConfig {
    fn default() -> Self {
        TrackerConfig {
            timeout_secs: default_timeout_secs(),
            issue_page_size: default_issue_page_size(),
            default_issue_type: default_issue_type(),
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct Config {
    pub store: StoreConfig,
    #[serde(default)]
    pub tracker: TrackerConfig,
}

impl Config {
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        let data = serde_yaml::from_reader(file)?;

        Ok(data)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("could not load config from file: {0}")]
    LoadError(#[from] std::io::Error),
    #[error("could not parse config: {0}")]
    ParseError(#[from] serde_yaml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_tmp_file(s: &str) -> tempfile::NamedTempFile {
        let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
        write!(tmp, "{}", s).expect("write yaml");

        tmp
    }

    #[test]
    fn gateway_config() {
        let yaml = r#"
            store:
                base_dir: /var/lib/gateway/
                filename: tenants.json
            tracker:
                timeout_secs: 10
                issue_page_size: 25
            "#;
        let tmp = write_tmp_file(yaml);
        let config = Config::from_file(tmp.path()).expect("load config");
        assert_eq!(config.store.base_dir, "/var/lib/gateway/");
        assert_eq!(config.store.filename, "tenants.json");
        assert_eq!(config.tracker.timeout_secs, 10);
        assert_eq!(config.tracker.issue_page_size, 25);
        assert_eq!(config.tracker.default_issue_type, "Story");
    }

    #[test]
    fn tracker_section_is_optional() {
        let yaml = r#"
            store:
                base_dir: /var/lib/gateway/
                filename: tenants.json
            "#;
        let tmp = write_tmp_file(yaml);
        let config = Config::from_file(tmp.path()).expect("load config");
        assert_eq!(config.tracker, TrackerConfig::default());
    }
}
