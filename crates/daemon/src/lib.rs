/// Onionet daemon library
///
/// HTTP bindings for the simulated onion-routing network: the node
/// registry, relay nodes, and user services, plus the client used for
/// inter-service calls.

pub mod api;
pub mod client;

pub use api::{RegistryService, RelayService, UserService};
pub use client::NetClient;
