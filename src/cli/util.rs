//! Process-level setup shared by the entry point.

use tracing_subscriber::EnvFilter;

/// Environment variable holding tracing directives, e.g. `debug` or
/// `tokenline=trace`. Logging stays off when it is unset.
pub const LOG_ENV_VAR: &str = "TOKENLINE_LOG";

/// Install a stderr subscriber when `TOKENLINE_LOG` is set.
///
/// The host shows whatever the statusline writes, so nothing is logged by
/// default.
pub fn init_logging() {
    let Ok(directives) = std::env::var(LOG_ENV_VAR) else {
        return;
    };
    let filter = EnvFilter::try_new(&directives).unwrap_or_else(|_| EnvFilter::new("debug"));
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .without_time()
        .try_init();
}

/// Force colors on, since the host pipes stdout rather than a TTY, unless
/// `--no-color` or `NO_COLOR` asks otherwise.
pub fn configure_color(no_color: bool) {
    if no_color || std::env::var_os("NO_COLOR").is_some() {
        colored::control::set_override(false);
    } else {
        colored::control::set_override(true);
    }
}
