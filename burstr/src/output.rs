use crate::cli::OutputFormat;

mod human;
mod json;

pub(crate) trait OutputFormatter: Send + Sync {
    fn print_header(&self, cfg: &burstr_core::runner::RunConfig);
    fn rate(&self) -> Option<burstr_core::runner::RateFn>;
    fn print_summary(&self, summary: &burstr_core::runner::RunSummary) -> anyhow::Result<()>;
}

pub(crate) fn formatter(format: OutputFormat) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::HumanReadable => Box::new(human::HumanReadableOutput),
        OutputFormat::Json => Box::new(json::JsonOutput),
    }
}
