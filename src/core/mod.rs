pub mod config;
pub mod error;
pub mod types;

pub use error::{MagnateError, Result};
pub use types::{AgentId, BuildingId, CompanyId, Money, Tick, Vec2};
