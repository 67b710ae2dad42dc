//! Logging initialization.

use scriptvault_util::log::{init, LogConfig};
use scriptvault_util::LogLevel;

/// Initialize logging to stderr so stdout stays clean for command output.
///
/// `--verbose` forces debug level; `RUST_LOG` still wins over both.
pub fn init_logging(verbose: bool, level: LogLevel) {
    let level = if verbose { LogLevel::Debug } else { level };
    init(LogConfig {
        print: true,
        level,
        include_location: verbose,
    });
}
