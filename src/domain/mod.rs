// Domain layer: interaction records, handles, timers and the ports they talk through.

pub mod arena;
pub mod entity;
pub mod errors;
pub mod events;
pub mod hand;
pub mod ids;
pub mod input;
pub mod observers;
pub mod pose;
pub mod ports;
pub mod replication;
pub mod snapzone;
pub mod timer;
pub mod tuning;

pub use arena::Arena;
pub use entity::{
    Constrained, EntityDesc, EntityFlags, EntityState, GrabDesc, Grabbable, Interactable,
    PhysicsBody, Snappable, ThrownMarker, Throwable, Useable,
};
pub use errors::{ConfigError, InvariantViolation, ReplicationError};
pub use events::InteractionEvent;
pub use hand::{GrabPoint, HandDesc, HandSide};
pub use ids::{ArenaId, EntityId, HandId, ParticipantId, ZoneId};
pub use input::{InputAction, InputEvent, InputHand, PressKind};
pub use observers::{Observers, SubscriptionId};
pub use pose::{Motion, Pose, RotationLimits};
pub use ports::{
    AttachedJoint, BodyId, ColliderId, CollisionLayer, JointAnchor, JointId, JointSpec,
    PhysicsHost, ReplicationBridge,
};
pub use replication::{NetId, ReplicatedField, ReplicationUpdate};
pub use snapzone::{Snapzone, SnapzoneDesc, TriggerContact};
pub use timer::{ListenerId, Timer, TimerStep};
pub use tuning::InteractionTuning;
