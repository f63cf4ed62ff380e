//! Runtime configuration read from the environment.

use std::path::PathBuf;

/// Remote store URL.
pub const REMOTE_URL_VAR: &str = "LEARNFLOW_REMOTE_URL";
/// API key sent with every remote request.
pub const REMOTE_KEY_VAR: &str = "LEARNFLOW_REMOTE_KEY";
/// Override for the cache directory.
pub const DATA_DIR_VAR: &str = "LEARNFLOW_DATA_DIR";

/// Connection details for the remote store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    pub url: String,
    pub api_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// `None` runs fully offline.
    pub remote: Option<RemoteConfig>,
    pub data_dir: PathBuf,
}

impl Config {
    /// Read configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// The remote is only configured when both the URL and the key are set
    /// and non-blank.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_blank = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let remote = match (non_blank(REMOTE_URL_VAR), non_blank(REMOTE_KEY_VAR)) {
            (Some(url), Some(api_key)) => Some(RemoteConfig {
                url: url.trim().trim_end_matches('/').to_string(),
                api_key: api_key.trim().to_string(),
            }),
            _ => None,
        };

        let data_dir = non_blank(DATA_DIR_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);

        Self { remote, data_dir }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("learnflow")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn remote_needs_url_and_key() {
        let config = Config::from_lookup(lookup(&[(REMOTE_URL_VAR, "https://db.example.com")]));
        assert_eq!(config.remote, None);

        let config = Config::from_lookup(lookup(&[
            (REMOTE_URL_VAR, "https://db.example.com/"),
            (REMOTE_KEY_VAR, " secret "),
        ]));
        assert_eq!(
            config.remote,
            Some(RemoteConfig {
                url: "https://db.example.com".into(),
                api_key: "secret".into(),
            })
        );
    }

    #[test]
    fn data_dir_override() {
        let config = Config::from_lookup(lookup(&[(DATA_DIR_VAR, "/tmp/learnflow-test")]));
        assert_eq!(config.data_dir, PathBuf::from("/tmp/learnflow-test"));

        let config = Config::from_lookup(lookup(&[(DATA_DIR_VAR, "  ")]));
        assert!(config.data_dir.ends_with("learnflow"));
    }
}
