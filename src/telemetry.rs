//! Logging initialization.
//!
//! Controlled by `GATEHOUSE_LOG`:
//! - unset → compact human-readable events to stderr
//! - `"json"` → JSON events to stderr (for log shippers)
//! - `"off"` → no-op (logging disabled, zero overhead)
//!
//! Level filtering follows `RUST_LOG` when set, defaulting to `info`.
//!
//! Everything goes to stderr on purpose: during a push the git client relays
//! the server's stderr to the pushing user as `remote:` lines, so stderr is
//! simultaneously the operator log and the only channel a hook has to talk
//! to the person pushing. Timestamps are left out of the human-readable
//! format because git already prefixes every relayed line.

use tracing_subscriber::EnvFilter;

/// Initialize logging based on `GATEHOUSE_LOG`.
pub fn init() {
    match std::env::var("GATEHOUSE_LOG").ok().as_deref() {
        Some("off") => {}
        Some("json") => init_json(),
        _ => init_compact(),
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

fn init_compact() {
    use tracing_subscriber::layer::SubscriberExt as _;
    use tracing_subscriber::util::SubscriberInitExt as _;

    tracing_subscriber::registry()
        .with(env_filter())
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .without_time()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

/// JSON events to stderr via tracing-subscriber's JSON formatter.
fn init_json() {
    use tracing_subscriber::layer::SubscriberExt as _;
    use tracing_subscriber::util::SubscriberInitExt as _;

    tracing_subscriber::registry()
        .with(env_filter())
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr),
        )
        .init();
}
