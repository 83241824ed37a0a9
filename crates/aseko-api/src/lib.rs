// aseko-api: Async Rust client for the Aseko pool controller cloud API

pub mod aggregate;
pub mod client;
pub mod error;
pub mod transport;
pub mod types;
pub mod unit;

pub use aggregate::aggregate_units;
pub use client::{AsekoClient, PAGE_LIMIT};
pub use error::{Error, ErrorKind};
pub use transport::{API_BASE_URL, CLIENT_NAME, CLIENT_VERSION, TransportConfig};
pub use types::{Severity, StatusMessage};
pub use unit::UnitSnapshot;
