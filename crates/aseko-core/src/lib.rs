//! Reactive polling core for the Aseko bridge.
//!
//! The [`Coordinator`] owns an [`AsekoClient`](aseko_api::AsekoClient),
//! refreshes every paired unit on a fixed cadence and exposes the latest
//! unit map through a `watch` channel. Hosts subscribe with
//! [`Coordinator::subscribe`] and map units to entities with
//! [`EntityDiscovery`].
//!
//! ```no_run
//! use aseko_core::{Coordinator, CoordinatorConfig};
//! use secrecy::SecretString;
//!
//! # async fn run() -> Result<(), aseko_core::CoreError> {
//! let config = CoordinatorConfig::new(SecretString::from("api-key".to_string()));
//! let coordinator = Coordinator::new(config)?;
//! coordinator.start().await?;
//!
//! for (serial, unit) in coordinator.units().iter() {
//!     println!("{serial}: online={}", unit.online);
//! }
//!
//! coordinator.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod coordinator;
pub mod entity;
pub mod error;
pub mod setup;
pub mod store;
pub mod stream;

pub use config::{CoordinatorConfig, DEFAULT_SCAN_INTERVAL, DEFAULT_TIMEOUT};
pub use coordinator::{Coordinator, RefreshState, RefreshStatus};
pub use entity::{DeviceInfo, Entity, EntityDiscovery, EntityReading, EntityState};
pub use error::CoreError;
pub use setup::{AccountIdentity, ENTRY_TITLE, fallback_unique_id, validate_account, verify_reauth};
pub use store::{UnitMap, UnitStore};
pub use stream::{UnitStream, UnitUpdate, UnitWatchStream};

pub use aseko_api::{API_BASE_URL, Severity, StatusMessage, UnitSnapshot};
