pub mod config;
pub mod db;
pub mod display;
pub mod ids;
pub mod models;
pub mod platform;
pub mod sample;
pub mod validation;

use tracing_subscriber::EnvFilter;

pub use db::{DatabaseError, PatientRepository, RepositoryError, Store, Subscription, VisitRepository};
pub use sample::{DataSource, SampleCatalog};

/// Install the global `tracing` subscriber. `RUST_LOG` wins over the
/// built-in filter. Calling this more than once is harmless.
pub fn init_tracing() {
    let installed = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .try_init()
        .is_ok();

    if installed {
        tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);
    }
}
