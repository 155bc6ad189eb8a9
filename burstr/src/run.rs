use anyhow::Context as _;

use crate::cli::Cli;
use crate::exit_codes::ExitCode;
use crate::output;
use crate::run_error::RunError;

pub async fn run(cli: Cli) -> Result<ExitCode, RunError> {
    let cfg = cli.run_config();
    cfg.validate()?;

    let out = output::formatter(cli.output);
    out.print_header(&cfg);

    let summary = burstr_core::runner::run_http(&cfg, out.rate()).await?;

    tracing::debug!(
        workers = summary.workers,
        attempts = summary.attempts_total(),
        failed = summary.failed_total(),
        elapsed = ?summary.elapsed,
        "run finished"
    );

    out.print_summary(&summary)
        .context("failed to print summary")
        .map_err(RunError::RuntimeError)?;

    Ok(ExitCode::Success)
}
