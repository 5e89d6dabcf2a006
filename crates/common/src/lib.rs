pub mod config;
pub mod error;
pub mod types;

pub use config::{ConfigError, NetworkConfig};
pub use error::{OnionetError, Result};
pub use types::{NodeId, UserId};
