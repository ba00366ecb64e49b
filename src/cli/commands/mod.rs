//! Command execution.

mod pack;

use crate::cli::{Args, RuntimeConfig};
use crate::error::Result;

use pack::execute_pack;

/// Execute the pack command described by `args`, returning the exit code
pub async fn execute_command(args: Args) -> Result<i32> {
    let config = RuntimeConfig::from(&args);
    execute_pack(&args, &config).await
}
