pub mod errors;
pub mod serialization;

pub use errors::{AppError, ConfigError, DomainError, DomainResult};
pub use serialization::{from_json, to_json, to_json_pretty};
