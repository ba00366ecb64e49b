//! tt_pack - packs a Tarantool environment into a tarball, RPM or Debian package.

use std::process;
use tt_pack::cli::{self, OutputManager};

#[tokio::main]
async fn main() {
    env_logger::init();

    match cli::run().await {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            // Fatal errors are never quiet
            let output = OutputManager::new(false);
            output.error(&e.to_string());
            output.suggestions(&e.recovery_suggestions());
            process::exit(1);
        }
    }
}
