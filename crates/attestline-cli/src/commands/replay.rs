//! `attestline replay` — run a recorded chunk fixture through the
//! demultiplexer and report what a client would have seen.

use std::path::Path;

use anyhow::{bail, Result};
use attestline_framing::{Chunk, DemuxConfig, Error, ResponseParts};
use futures_util::StreamExt;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::CliConfig;
use crate::fixture::Fixture;

/// What the consumer observed.
#[derive(Debug, Default, Serialize)]
pub struct Report {
    pub config: DemuxConfig,
    pub chunks_seen: u64,
    pub status: Option<u16>,
    pub headers: Vec<(String, String)>,
    pub payloads: usize,
    pub body: String,
    pub trailers: Option<Vec<(String, String)>>,
    pub completed: bool,
    pub error: Option<String>,
}

pub fn replay(
    fixture: &Path,
    config: Option<&Path>,
    strict: bool,
    reject_late_head: bool,
    format: &str,
) -> Result<()> {
    let config = CliConfig::resolve(config, strict, reject_late_head)?;
    let chunks = Fixture::from_file(fixture)?.into_chunks()?;
    info!(chunks = chunks.len(), fixture = %fixture.display(), "replaying fixture");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let report = runtime.block_on(run(chunks, config.demux));

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        _ => print!("{}", format_report(&report)),
    }

    if let Some(error) = &report.error {
        bail!("replay failed: {error}");
    }
    Ok(())
}

/// Drive the demultiplexer over `chunks` to completion.
pub async fn run(chunks: Vec<Chunk>, config: DemuxConfig) -> Report {
    let source = futures_util::stream::iter(chunks.into_iter().map(Ok::<_, Error>));
    let mut parts = ResponseParts::new(source, config);
    let mut report = Report {
        config: *parts.body.config(),
        ..Report::default()
    };
    let mut body = Vec::new();

    while let Some(item) = parts.body.next().await {
        match item {
            Ok(bytes) => {
                debug!(len = bytes.len(), "payload");
                report.payloads += 1;
                body.extend_from_slice(&bytes);
            }
            Err(e) => {
                report.error = Some(e.to_string());
                break;
            }
        }
    }
    report.chunks_seen = parts.body.chunks_seen();
    report.body = String::from_utf8_lossy(&body).into_owned();

    // The body has ended, so each callback has either fired or been
    // released; neither receiver can still be pending.
    if let Ok(head) = parts.head.try_recv() {
        report.status = Some(head.status);
        report.headers = head.headers.into_pairs();
    }
    if let Ok(trailers) = parts.trailers.try_recv() {
        report.completed = true;
        report.trailers = trailers.map(|t| t.headers.into_pairs());
    }

    report
}

pub fn format_report(report: &Report) -> String {
    let mut out = format!(
        "policy:   truncation={:?} late_head={:?}\n",
        report.config.truncation, report.config.late_head
    );
    match report.status {
        Some(status) => out.push_str(&format!("head:     {status}\n")),
        None => out.push_str("head:     (none)\n"),
    }
    for (name, value) in &report.headers {
        out.push_str(&format!("  {name}: {value}\n"));
    }
    out.push_str(&format!(
        "body:     {} bytes in {} payload(s) from {} chunk(s)\n",
        report.body.len(),
        report.payloads,
        report.chunks_seen
    ));
    if !report.body.is_empty() {
        out.push_str(&format!("  {}\n", report.body));
    }
    match (&report.trailers, report.completed) {
        (Some(trailers), _) => {
            out.push_str("trailers:\n");
            for (name, value) in trailers {
                out.push_str(&format!("  {name}: {value}\n"));
            }
        }
        (None, true) => out.push_str("trailers: (none)\n"),
        (None, false) => out.push_str("trailers: (not received)\n"),
    }
    if let Some(error) = &report.error {
        out.push_str(&format!("error:    {error}\n"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use attestline_framing::{HeaderMap, ResponseHead, Trailers};

    fn trailers() -> Trailers {
        let mut headers = HeaderMap::new();
        headers.insert("x-status", "ok");
        Trailers::new(headers)
    }

    #[tokio::test]
    async fn run_complete_response() {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", "text/plain");
        let chunks = vec![
            Chunk::head(ResponseHead::new(200, headers)).with_payload("ab"),
            Chunk::data("cd").completing(Some(trailers())),
        ];

        let report = run(chunks, DemuxConfig::default()).await;

        assert_eq!(report.status, Some(200));
        assert_eq!(report.headers, vec![("content-type".into(), "text/plain".into())]);
        assert_eq!(report.body, "abcd");
        assert_eq!(report.payloads, 2);
        assert_eq!(report.chunks_seen, 2);
        assert!(report.completed);
        assert_eq!(report.trailers, Some(vec![("x-status".into(), "ok".into())]));
        assert!(report.error.is_none());
    }

    #[tokio::test]
    async fn run_truncated_lenient_and_strict() {
        let chunks = || vec![Chunk::data("x")];

        let lenient = run(chunks(), DemuxConfig::default()).await;
        assert_eq!(lenient.config, DemuxConfig::default());
        assert!(!lenient.completed);
        assert!(lenient.error.is_none());
        assert_eq!(lenient.body, "x");

        let strict = run(chunks(), DemuxConfig::strict()).await;
        assert_eq!(strict.config, DemuxConfig::strict());
        assert!(!strict.completed);
        assert_eq!(
            strict.error.as_deref(),
            Some("response stream ended after 1 chunk(s) without a terminal chunk")
        );
    }

    #[test]
    fn format_report_text() {
        let report = Report {
            chunks_seen: 3,
            status: None,
            payloads: 1,
            body: "x".into(),
            completed: true,
            ..Report::default()
        };
        let text = format_report(&report);
        assert!(text.starts_with("policy:   truncation=Lenient late_head=Ignore\n"));
        assert!(text.contains("head:     (none)"));
        assert!(text.contains("body:     1 bytes in 1 payload(s) from 3 chunk(s)"));
        assert!(text.contains("trailers: (none)"));
    }
}
