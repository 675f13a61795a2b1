//! # Ministry
//!
//! Staff portal backend for the Ministry of Health: two hospitals (Los-Santos
//! and Las-Venturas), their leaders, deputies and supervisors, and the
//! records those ranks keep about each other.
//!
//! ## Features
//!
//! - **Sessions**: base64 JSON tokens in the `auth_token` cookie, optionally signed
//! - **Ranks**: per-role permissions checked on every mutation
//! - **Records**: points, warnings and the Antiblat registry
//! - **Prices**: a service catalog changed through reviewed requests
//! - **Tasks**: tasks for leadership with reviewed submissions
//!
//! ## Modules
//!
//! - [`store`]: In-memory registry of every collection
//! - [`auth`]: Passwords, tokens, session extractors and permissions
//! - [`config`]: TOML configuration with environment overrides
//! - [`api`]: REST API server with Axum
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ministry::store::{Actor, PriceChange, Store};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Store::seeded();
//!     let minister = Actor::new(4, "minister", "Елена Смирнова");
//!
//!     let mut registry = store.write().await;
//!     let requests = registry.prices.propose(
//!         &[PriceChange { service_id: 1, new_price: 65000 }],
//!         &minister,
//!     )?;
//!
//!     println!("Opened {} price request(s)", requests.len());
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod store;

// Re-export top-level types for convenience
pub use store::{
    Actor, Entity, Hospital, HospitalScope, Registry, Role, Store, StoreError, StoreResult,
};

pub use auth::{Permission, SessionClaims, TokenCodec, TokenError};

pub use api::{build_router, serve, ApiError, AppState};

pub use config::{ApiConfig, AuthConfig, Config, ConfigError, LoggingConfig};
