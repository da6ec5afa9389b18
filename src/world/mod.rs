pub mod agent;
pub mod building;
pub mod company;
pub mod snapshot;

pub use agent::{Agent, AgentActionKind, AgentStatus, PendingAction, SkillSet};
pub use building::{Building, BuildingKind};
pub use company::{Company, CompanyStatus, OrgType};
pub use snapshot::{GameStatus, WorldSnapshot};
