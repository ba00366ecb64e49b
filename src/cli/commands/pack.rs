//! Pack command implementation.

use crate::cli::{Args, RuntimeConfig};
use crate::config::PackConfig;
use crate::dispatch::Dispatcher;
use crate::error::{CliError, DispatchError, Error, Result};
use crate::pack::PackContext;

/// Execute pack command
pub(super) async fn execute_pack(args: &Args, config: &RuntimeConfig) -> Result<i32> {
    let cwd = std::env::current_dir()?;
    let pack_config = PackConfig::load(args.cfg.as_deref(), &cwd)?;
    let request = args
        .to_request(&pack_config)
        .map_err(DispatchError::UnsupportedFormat)?;

    let ctx = PackContext::from_config(&pack_config);
    log::debug!(
        "Packing '{}' {} from {} into {}",
        request.name,
        request.version,
        ctx.env_dir().display(),
        ctx.output_dir().display()
    );

    // Packers write through blocking std::fs; keep them off the async workers.
    let result = tokio::task::spawn_blocking(move || Dispatcher::default().dispatch(&ctx, &request))
        .await
        .map_err(|e| CliError::ExecutionFailed {
            command: "pack".to_string(),
            reason: format!("pack task failed: {e}"),
        })?;

    let output = config.output();
    match result {
        Ok(outcome) => {
            for warning in &outcome.warnings {
                let _ = output.validation_warning(warning);
            }
            let _ = output.artifact_summary(&outcome.artifact);
            Ok(0)
        }
        Err(failure) => {
            for warning in &failure.warnings {
                let _ = output.validation_warning(warning);
            }
            Err(Error::Dispatch(failure.error))
        }
    }
}
