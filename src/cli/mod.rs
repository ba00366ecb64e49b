//! Command line interface for tt_pack.

mod args;
pub mod commands;
mod output;

pub use args::{Args, RuntimeConfig};
pub use commands::execute_command;
pub use output::OutputManager;

use crate::error::{CliError, Result};

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = match Args::parse_args() {
        Ok(args) => args,
        Err(e) if e.use_stderr() => {
            let rendered = e.render().to_string();
            let reason = rendered
                .lines()
                .next()
                .map(|line| line.trim_start_matches("error: ").to_string())
                .unwrap_or_else(|| e.kind().to_string());
            return Err(CliError::InvalidArguments { reason }.into());
        }
        Err(e) => {
            // --help
            let _ = e.print();
            return Ok(0);
        }
    };
    execute_command(args).await
}
