// === PUBLIC CONTRACT ===
// Other modules consume the feed through the contract module
pub mod contract;

// Re-export the public contract components
pub use contract::{client, error, model};

// === MODULE CONFIG ===
pub mod config;
pub use config::FeedConfig;

// === DOMAIN ===
pub mod domain;
pub use domain::service::{FeedService, ServiceConfig};

// === GATEWAYS ===
// In-process implementations of the contract traits plus local adapters
pub mod gateways;

// === PRESENTATION STATE ===
pub mod state;
pub use state::FeedState;
