//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (YAML)
//!     → loader.rs (parse & deserialize into schema.rs types)
//!     → validation.rs (semantic checks)
//!     → model.rs Configuration (validated, immutable)
//!     → CLI retry policy applied
//!     → shared via Arc with the forwarding engine
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; only rotation cursors move
//! - No global instance: the engine receives it at construction
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod model;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use model::Configuration;
pub use schema::{HostEntry, ServiceEntry, YamlConfig};
pub use validation::ValidationError;
