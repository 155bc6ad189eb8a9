use serde::Serialize;
use std::io::Write as _;
use std::sync::Arc;

use super::OutputFormatter;

const SCHEMA: &str = "burstr.ndjson.v1";

pub(crate) struct JsonOutput;

impl OutputFormatter for JsonOutput {
    fn print_header(&self, _cfg: &burstr_core::runner::RunConfig) {}

    fn rate(&self) -> Option<burstr_core::runner::RateFn> {
        Some(Arc::new(move |s: burstr_core::runner::RateSample| {
            let line = build_rate_line(&s);
            emit_json_line(&line);
        }))
    }

    fn print_summary(&self, summary: &burstr_core::runner::RunSummary) -> anyhow::Result<()> {
        let line = build_summary_line(summary);
        emit_json_line(&line);
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct JsonRateLine {
    pub kind: &'static str,
    pub schema: &'static str,
    pub tick: u64,
    pub elapsed_secs: f64,
    pub requests_per_sec: u64,
}

fn build_rate_line(s: &burstr_core::runner::RateSample) -> JsonRateLine {
    JsonRateLine {
        kind: "rate",
        schema: SCHEMA,
        tick: s.tick,
        elapsed_secs: s.elapsed.as_secs_f64(),
        requests_per_sec: s.rate,
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct JsonSummaryLine {
    pub kind: &'static str,
    pub schema: &'static str,
    pub elapsed_secs: f64,
    pub workers: u64,
    pub aborted_workers: u64,
    pub targets: Vec<JsonTargetSummary>,
    pub totals: JsonTotals,
}

#[derive(Debug, Serialize)]
pub(crate) struct JsonTargetSummary {
    pub url: String,
    pub requests: u64,
    pub failed: u64,
    /// Latencies in seconds; absent when no attempt succeeded.
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub avg: Option<f64>,
}

#[derive(Debug, Serialize, Default)]
pub(crate) struct JsonTotals {
    pub attempts_total: u64,
    pub failed_total: u64,
}

fn build_summary_line(summary: &burstr_core::runner::RunSummary) -> JsonSummaryLine {
    let targets = summary
        .targets
        .iter()
        .map(|t| {
            let has_samples = t.has_samples();
            JsonTargetSummary {
                url: t.url.clone(),
                requests: t.requests,
                failed: t.failed,
                min: has_samples.then_some(t.min),
                max: has_samples.then_some(t.max),
                avg: has_samples.then_some(t.avg),
            }
        })
        .collect();

    JsonSummaryLine {
        kind: "summary",
        schema: SCHEMA,
        elapsed_secs: summary.elapsed.as_secs_f64(),
        workers: summary.workers,
        aborted_workers: summary.aborted_workers,
        targets,
        totals: JsonTotals {
            attempts_total: summary.attempts_total(),
            failed_total: summary.failed_total(),
        },
    }
}

fn emit_json_line<T: Serialize>(line: &T) {
    let mut out = std::io::stdout().lock();
    if serde_json::to_writer(&mut out, line).is_ok() {
        let _ = writeln!(out);
        let _ = out.flush();
    }
}
