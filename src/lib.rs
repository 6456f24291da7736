// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod config;
pub mod generate;
pub mod ingest;
pub mod notify;
pub mod pipeline;
pub mod prompt;
pub mod sections;

pub use crate::config::{BriefingConfig, Credentials};
pub use crate::pipeline::{run_once, BriefingOutcome, Collaborators, RunReport};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global tracing subscriber.
/// `RUST_LOG` overrides the default filter; `BRIEFING_LOG_JSON=1` switches to JSON lines.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("news_briefing=info,warn"));
    let json = std::env::var("BRIEFING_LOG_JSON")
        .ok()
        .is_some_and(|v| v == "1");

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer().compact()).init();
    }
}
