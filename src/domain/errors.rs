// Domain-level errors for scene setup, replication and consistency checks.

use super::hand::HandSide;
use super::ids::{EntityId, HandId, ParticipantId, ZoneId};
use super::replication::NetId;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("`{entity}` is {capability} but has no grabbable component")]
    MissingGrabbable {
        entity: String,
        capability: &'static str,
    },
    #[error("`{entity}` is {capability} but has no rigid body collider")]
    MissingRigidbodyCollider {
        entity: String,
        capability: &'static str,
    },
    #[error("`{entity}` is constrained in place and cannot also be snappable")]
    ConstrainedSnappable { entity: String },
    #[error("`{entity}` has rotation limits with a minimum above the maximum")]
    InvalidRotationLimits { entity: String },
    #[error("`{entity}` has invalid hold duration {seconds}")]
    InvalidHoldDuration { entity: String, seconds: f32 },
    #[error("{owner} already has a {side:?} hand")]
    DuplicateHand {
        owner: ParticipantId,
        side: HandSide,
    },
    #[error("zone `{zone}` presnap target {entity} is missing or not snappable")]
    InvalidPresnapTarget { zone: String, entity: EntityId },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplicationError {
    #[error("replicated target {0:?} does not resolve")]
    UnresolvedTarget(NetId),
    #[error("replicated field on {target:?} references {reference:?} which does not resolve")]
    UnresolvedReference { target: NetId, reference: NetId },
    #[error("field `{field}` cannot be applied to {target:?}")]
    FieldMismatch { target: NetId, field: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("{entity} highlight flag disagrees with its highlight target")]
    HighlightFlag { entity: EntityId },
    #[error("{entity} and {hand} disagree on the highlight link")]
    HighlightLink { entity: EntityId, hand: HandId },
    #[error("{entity} grabbed flag disagrees with its grab parent")]
    GrabbedFlag { entity: EntityId },
    #[error("{hand} grabbing flag disagrees with its grabbed object")]
    GrabbingFlag { hand: HandId },
    #[error("{entity} and {hand} disagree on the grab link")]
    GrabLink { entity: EntityId, hand: HandId },
    #[error("{entity} snapped flag disagrees with its snap parent")]
    SnappedFlag { entity: EntityId },
    #[error("{entity} and {zone} disagree on the snap link")]
    SnapLink { entity: EntityId, zone: ZoneId },
    #[error("{zone} highlighting flag disagrees with its highlight target")]
    ZoneHighlightFlag { zone: ZoneId },
    #[error("{entity} and {zone} disagree on the snap candidacy")]
    SnapCandidate { entity: EntityId, zone: ZoneId },
    #[error("{entity} is a snap candidate but nothing holds it")]
    UnheldCandidate { entity: EntityId },
    #[error("{entity} is both grabbed and snapped")]
    GrabbedAndSnapped { entity: EntityId },
    #[error("{entity} is highlighted while grabbed or snapped")]
    HighlightedWhileHeld { entity: EntityId },
    #[error("{entity} holds a joint its state does not justify")]
    OrphanedJoint { entity: EntityId },
}
