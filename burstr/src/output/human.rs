use std::fmt::Write as _;
use std::io::Write as _;
use std::sync::Arc;

use super::OutputFormatter;

pub(crate) struct HumanReadableOutput;

impl OutputFormatter for HumanReadableOutput {
    fn print_header(&self, cfg: &burstr_core::runner::RunConfig) {
        println!("targets: {}", cfg.targets.len());
        for t in &cfg.targets {
            println!("  {t}");
        }
        println!(
            "requests={} launch_delay={} timeout={}",
            cfg.requests,
            humantime::format_duration(cfg.effective_launch_delay().unwrap_or_default()),
            humantime::format_duration(cfg.timeout)
        );
        println!();
    }

    fn rate(&self) -> Option<burstr_core::runner::RateFn> {
        Some(Arc::new(|s: burstr_core::runner::RateSample| {
            tracing::info!("rate: {} req/s", s.rate);
        }))
    }

    fn print_summary(&self, summary: &burstr_core::runner::RunSummary) -> anyhow::Result<()> {
        let mut out = std::io::stdout().lock();
        out.write_all(render(summary).as_bytes())?;
        out.flush()?;
        Ok(())
    }
}

pub(crate) fn render(summary: &burstr_core::runner::RunSummary) -> String {
    let mut out = String::from(" \n");
    for t in &summary.targets {
        writeln!(&mut out, "{t}").ok();
    }
    out
}
