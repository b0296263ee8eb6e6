//! Recorded chunk fixtures.
//!
//! A fixture is a TOML file with one `[[chunk]]` table per transport chunk:
//!
//! ```toml
//! [[chunk]]
//! status = 200
//! headers = [["content-type", "application/octet-stream"]]
//! payload = "ab"
//!
//! [[chunk]]
//! payload = "cd"
//! complete = true
//! trailers = [["x-status", "ok"]]
//! ```
//!
//! A chunk carries a head iff it has a `status`. Headers and trailers are
//! arrays of pairs so order and duplicates survive.

use std::path::Path;

use anyhow::{bail, Context, Result};
use attestline_framing::{Chunk, HeaderMap, ResponseHead, Trailers};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Fixture {
    #[serde(default, rename = "chunk")]
    pub chunks: Vec<ChunkRecord>,
}

#[derive(Debug, Deserialize)]
pub struct ChunkRecord {
    pub status: Option<u16>,
    #[serde(default)]
    pub headers: Vec<(String, String)>,
    pub payload: Option<String>,
    #[serde(default)]
    pub complete: bool,
    pub trailers: Option<Vec<(String, String)>>,
}

impl Fixture {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading fixture {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("parsing fixture {}", path.display()))
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn into_chunks(self) -> Result<Vec<Chunk>> {
        self.chunks
            .into_iter()
            .enumerate()
            .map(|(i, record)| record.into_chunk().with_context(|| format!("chunk {}", i + 1)))
            .collect()
    }
}

impl ChunkRecord {
    fn into_chunk(self) -> Result<Chunk> {
        let mut chunk = Chunk::empty();

        match self.status {
            Some(status) => {
                let headers: HeaderMap = self.headers.into_iter().collect();
                chunk = chunk.with_head(ResponseHead::new(status, headers));
            }
            None if !self.headers.is_empty() => bail!("headers given without a status"),
            None => {}
        }

        if let Some(payload) = self.payload {
            chunk = chunk.with_payload(payload);
        }

        if self.complete {
            let trailers = self
                .trailers
                .map(|pairs| Trailers::new(pairs.into_iter().collect()));
            chunk = chunk.completing(trailers);
        } else if self.trailers.is_some() {
            bail!("trailers given on a chunk that is not complete");
        }

        Ok(chunk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_two_chunk_fixture() {
        let fixture = Fixture::from_toml_str(
            r#"
[[chunk]]
status = 200
headers = [["content-type", "text/plain"], ["x-node", "a"]]
payload = "ab"

[[chunk]]
payload = "cd"
complete = true
trailers = [["x-status", "ok"]]
"#,
        )
        .unwrap();

        let chunks = fixture.into_chunks().unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].shape().to_string(), "head+payload");
        assert_eq!(chunks[1].shape().to_string(), "payload+complete+trailers");
        assert_eq!(
            chunks[1].trailers().and_then(|t| t.get("x-status")),
            Some("ok")
        );
    }

    #[test]
    fn empty_fixture_has_no_chunks() {
        let fixture = Fixture::from_toml_str("").unwrap();
        assert!(fixture.into_chunks().unwrap().is_empty());
    }

    #[test]
    fn headers_without_status_rejected() {
        let fixture = Fixture::from_toml_str(
            r#"
[[chunk]]
headers = [["a", "b"]]
"#,
        )
        .unwrap();
        let err = fixture.into_chunks().unwrap_err();
        assert!(format!("{err:#}").contains("headers given without a status"));
    }

    #[test]
    fn trailers_require_complete() {
        let fixture = Fixture::from_toml_str(
            r#"
[[chunk]]
payload = "x"
trailers = [["x-status", "ok"]]
"#,
        )
        .unwrap();
        let err = fixture.into_chunks().unwrap_err();
        assert!(format!("{err:#}").contains("chunk 1"));
    }

    #[test]
    fn from_file_reports_path() {
        let err = Fixture::from_file(Path::new("/nonexistent/fixture.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/fixture.toml"));
    }
}
