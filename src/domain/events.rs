use super::ids::{EntityId, HandId, ParticipantId, ZoneId};
use super::ports::JointAnchor;

/// Notifications fired by interaction transitions, in the order they happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionEvent {
    Initialized { entity: EntityId },
    HighlightBegin { entity: EntityId, hand: HandId },
    HighlightEnd { entity: EntityId, hand: HandId },
    GrabBegin { entity: EntityId, hand: HandId },
    GrabEnd { entity: EntityId, hand: HandId },
    Interact { entity: EntityId, hand: HandId },
    UseBegin { entity: EntityId, hand: HandId },
    UseEnd { entity: EntityId, hand: HandId },
    // Zone-side highlight of a grabbed object hovering over an idle zone.
    ZoneHighlightBegin { entity: EntityId, zone: ZoneId },
    ZoneHighlightEnd { entity: EntityId, zone: ZoneId },
    SnapBegin { entity: EntityId, zone: ZoneId },
    SnapEnd { entity: EntityId, zone: ZoneId },
    Thrown { entity: EntityId, hand: HandId },
    JointConnected { entity: EntityId, anchor: JointAnchor },
    JointReleased { entity: EntityId, anchor: JointAnchor },
    OwnerChanged { entity: EntityId, owner: Option<ParticipantId> },
}

impl InteractionEvent {
    pub fn entity(&self) -> EntityId {
        match *self {
            Self::Initialized { entity }
            | Self::HighlightBegin { entity, .. }
            | Self::HighlightEnd { entity, .. }
            | Self::GrabBegin { entity, .. }
            | Self::GrabEnd { entity, .. }
            | Self::Interact { entity, .. }
            | Self::UseBegin { entity, .. }
            | Self::UseEnd { entity, .. }
            | Self::ZoneHighlightBegin { entity, .. }
            | Self::ZoneHighlightEnd { entity, .. }
            | Self::SnapBegin { entity, .. }
            | Self::SnapEnd { entity, .. }
            | Self::Thrown { entity, .. }
            | Self::JointConnected { entity, .. }
            | Self::JointReleased { entity, .. }
            | Self::OwnerChanged { entity, .. } => entity,
        }
    }

    pub fn zone(&self) -> Option<ZoneId> {
        match *self {
            Self::ZoneHighlightBegin { zone, .. }
            | Self::ZoneHighlightEnd { zone, .. }
            | Self::SnapBegin { zone, .. }
            | Self::SnapEnd { zone, .. } => Some(zone),
            _ => None,
        }
    }
}
