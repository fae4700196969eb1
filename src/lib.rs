use tracing_subscriber::EnvFilter;

pub mod aggregate;
pub mod catalog;
pub mod client;
pub mod error;
pub mod metrics;
pub mod model;
pub mod screens;
pub mod table;

pub use error::{AppError, AppResult};

/// Install the global tracing subscriber (stdout, env-filtered).
///
/// The filter honours `SITEDESK_LOG` and defaults to `sitedesk=info`.
/// Safe to call more than once; later calls are no-ops.
pub fn init_logging() {
    let filter =
        EnvFilter::try_from_env("SITEDESK_LOG").unwrap_or_else(|_| EnvFilter::new("sitedesk=info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
