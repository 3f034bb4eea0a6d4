use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "PROPDASH_LOG";

pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "propdash=debug,warn"
    } else {
        "propdash=info,warn"
    }
}

/// Installs the global subscriber. Safe to call more than once; later calls
/// are ignored.
pub fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
