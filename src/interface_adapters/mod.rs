// Interface adapters: physics and replication hosts plus the wire protocol.

pub mod bridge;
pub mod physics;
pub mod protocol;
