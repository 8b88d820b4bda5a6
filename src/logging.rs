//! Diagnostic logging.
//!
//! Everything goes to stderr so command output on stdout stays clean.
//! `RUST_LOG` wins when set; otherwise `--verbose` selects `debug` and the
//! default is `warn`.

use tracing_subscriber::EnvFilter;

fn filter_directive(env: Option<&str>, verbose: bool) -> String {
    match env.map(str::trim) {
        Some(directive) if !directive.is_empty() => directive.to_string(),
        _ if verbose => "debug".to_string(),
        _ => "warn".to_string(),
    }
}

/// Install the global subscriber. Safe to call more than once; later
/// calls are ignored.
pub fn init(verbose: bool) {
    let env = std::env::var("RUST_LOG").ok();
    let directive = filter_directive(env.as_deref(), verbose);
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
