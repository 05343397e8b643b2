//! Event-sourcing mechanics shared by domain modules.
//!
//! Nothing here knows about customers: commands, events, envelopes and replay
//! are generic over the aggregate.

pub mod command;
pub mod envelope;
pub mod event;
pub mod handler;
pub mod replay;

pub use command::Command;
pub use envelope::EventEnvelope;
pub use event::Event;
pub use handler::execute;
pub use replay::{ReplayError, StreamCursor, ordered_payloads};
