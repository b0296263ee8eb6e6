//! attestline.toml configuration.

use std::path::Path;

use anyhow::{Context, Result};
use attestline_framing::{DemuxConfig, LateHeadPolicy, TruncationPolicy};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    #[serde(default)]
    pub demux: DemuxConfig,
}

impl CliConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: CliConfig = toml::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }

    /// Load `path` if given, otherwise defaults; then apply flag overrides.
    pub fn resolve(path: Option<&Path>, strict: bool, reject_late_head: bool) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        if strict {
            config.demux.truncation = TruncationPolicy::Strict;
        }
        if reject_late_head {
            config.demux.late_head = LateHeadPolicy::Reject;
        }
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_renders_demux_table() {
        let s = CliConfig::default().to_toml_string().unwrap();
        assert!(s.contains("[demux]"));
        assert!(s.contains(r#"truncation = "lenient""#));
        assert!(s.contains(r#"late_head = "ignore""#));
    }

    #[test]
    fn flags_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("attestline.toml");
        std::fs::write(&path, "[demux]\nlate_head = \"reject\"\n").unwrap();

        let config = CliConfig::resolve(Some(&path), true, false).unwrap();
        assert_eq!(config.demux.truncation, TruncationPolicy::Strict);
        assert_eq!(config.demux.late_head, LateHeadPolicy::Reject);
    }

    #[test]
    fn missing_demux_table_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("attestline.toml");
        std::fs::write(&path, "").unwrap();

        let config = CliConfig::resolve(Some(&path), false, false).unwrap();
        assert_eq!(config.demux, DemuxConfig::default());
    }
}
