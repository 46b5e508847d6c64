use std::env;
use std::io;

use tracing_subscriber::EnvFilter;

/// Environment variable overriding the log filter
const LOG_ENV: &str = "HFSDISK_LOG";

/// Install the stderr log subscriber. `HFSDISK_LOG` takes an `EnvFilter`
/// directive and wins over `-v`.
pub(crate) fn init(verbosity: u64) {
  let default = match verbosity {
    0 => "warn",
    1 => "info",
    _ => "debug",
  };
  let filter = match env::var(LOG_ENV) {
    Ok(directive) if !directive.trim().is_empty() => EnvFilter::new(directive),
    _ => EnvFilter::new(default),
  };

  // Only fails when a subscriber is already installed
  let _ = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(io::stderr)
    .without_time()
    .with_target(verbosity > 2)
    .try_init();
}
