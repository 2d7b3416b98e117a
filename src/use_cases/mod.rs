// Use cases layer: interaction transitions and the session loop that drives them.

pub mod grab;
pub mod hand;
pub mod highlight;
pub mod invariants;
pub mod remote;
pub mod session;
pub mod snap;
#[cfg(test)]
pub(crate) mod test_support;
pub mod throw;
pub mod tick;
pub mod types;
pub mod world;

pub use session::{SessionHandle, SessionSettings, session_task, spawn_session};
pub use types::{SessionEvent, SessionUpdate};
pub use world::{InteractionWorld, WorldSettings};
