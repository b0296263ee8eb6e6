//! Demultiplexer configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// What to do when the transport ends without sending a terminal chunk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TruncationPolicy {
    /// End the body stream cleanly. The trailer callback never fires.
    #[default]
    Lenient,
    /// Yield [`FramingError::Truncated`](crate::FramingError::Truncated).
    Strict,
}

/// What to do with a head on any chunk after the first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LateHeadPolicy {
    /// Drop the late head and keep streaming.
    #[default]
    Ignore,
    /// Yield [`FramingError::UnexpectedHead`](crate::FramingError::UnexpectedHead).
    Reject,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemuxConfig {
    pub truncation: TruncationPolicy,
    pub late_head: LateHeadPolicy,
}

impl DemuxConfig {
    /// Fail on truncation and on late heads.
    pub fn strict() -> Self {
        Self {
            truncation: TruncationPolicy::Strict,
            late_head: LateHeadPolicy::Reject,
        }
    }

    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_lenient() {
        let config = DemuxConfig::default();
        assert_eq!(config.truncation, TruncationPolicy::Lenient);
        assert_eq!(config.late_head, LateHeadPolicy::Ignore);
    }

    #[test]
    fn parse_empty() {
        let config = DemuxConfig::from_toml_str("").unwrap();
        assert_eq!(config, DemuxConfig::default());
    }

    #[test]
    fn parse_partial() {
        let config = DemuxConfig::from_toml_str(r#"truncation = "strict""#).unwrap();
        assert_eq!(config.truncation, TruncationPolicy::Strict);
        assert_eq!(config.late_head, LateHeadPolicy::Ignore);
    }

    #[test]
    fn parse_rejects_unknown_policy() {
        assert!(DemuxConfig::from_toml_str(r#"late_head = "panic""#).is_err());
    }

    #[test]
    fn toml_round_trip() {
        let original = DemuxConfig::strict();
        let s = original.to_toml_string().unwrap();
        assert!(s.contains(r#"truncation = "strict""#));
        assert_eq!(DemuxConfig::from_toml_str(&s).unwrap(), original);
    }

    #[test]
    fn from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("demux.toml");
        std::fs::write(&path, "late_head = \"reject\"\n").unwrap();

        let config = DemuxConfig::from_file(&path).unwrap();
        assert_eq!(config.late_head, LateHeadPolicy::Reject);
    }
}
