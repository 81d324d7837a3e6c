//! Capability agents: text completion, image description, ticket CRUD.

pub mod text;
pub mod ticket;
pub mod vision;

pub use text::TextAgent;
pub use ticket::{TicketAction, TicketAgent, TicketOutcome};
pub use vision::VisionAgent;
