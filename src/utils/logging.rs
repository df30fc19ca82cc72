//! Process-wide logger setup.

use log::LevelFilter;

/// Installs `env_logger`. `RUST_LOG` still wins; otherwise `info`, or `debug`
/// when `debug` is set. Safe to call more than once.
pub fn init_logging(debug: bool) {
    let level = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp_secs()
        .try_init();
}
