use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// What to do with the partner of `created_at` / `updated_at` when only one
/// of the two is present on an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum PairPolicy {
    /// Rewrite both keys, adding the absent one as an invalid date.
    #[default]
    Both,
    /// Rewrite only the keys that exist.
    PresentOnly,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NormalizerConfig {
    pub pair_policy: PairPolicy,
    /// Fail on timestamp fields that are not epoch-second numbers instead of
    /// silently producing invalid dates.
    pub strict: bool,
}

impl NormalizerConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn with_pair_policy(mut self, pair_policy: PairPolicy) -> Self {
        self.pair_policy = pair_policy;
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_mirror_browser_behavior() {
        let config = NormalizerConfig::default();
        assert_eq!(config.pair_policy, PairPolicy::Both);
        assert!(!config.strict);
    }

    #[test]
    fn loads_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "pair_policy": "present-only" }}"#).unwrap();

        let config = NormalizerConfig::load(file.path()).unwrap();
        assert_eq!(config.pair_policy, PairPolicy::PresentOnly);
        assert!(!config.strict);
    }

    #[test]
    fn rejects_unknown_keys() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "fields": ["deleted_at"] }}"#).unwrap();

        let err = NormalizerConfig::load(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("unknown field"));
    }

    #[test]
    fn missing_file_names_path() {
        let err = NormalizerConfig::load("/nonexistent/respnorm.json").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/respnorm.json"));
    }
}
