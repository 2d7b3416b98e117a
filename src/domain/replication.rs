// Replicated field model. One update carries exactly one field of one record.

use super::ids::{EntityId, HandId, ParticipantId, ZoneId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NetId {
    Entity(EntityId),
    Hand(HandId),
    Zone(ZoneId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplicatedField {
    // Entity fields.
    Owner(Option<ParticipantId>),
    HighlightTarget(Option<HandId>),
    GrabParent(Option<HandId>),
    SnapTarget(Option<ZoneId>),
    SnapParent(Option<ZoneId>),
    EnableInteract(bool),
    // Hand fields.
    HandHighlight(Option<EntityId>),
    HandGrabbed(Option<EntityId>),
    // Zone fields.
    ZoneSnapped(Option<EntityId>),
    ZoneHighlight(Option<EntityId>),
}

impl ReplicatedField {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Owner(_) => "owner",
            Self::HighlightTarget(_) => "highlight_target",
            Self::GrabParent(_) => "grab_parent",
            Self::SnapTarget(_) => "snap_target",
            Self::SnapParent(_) => "snap_parent",
            Self::EnableInteract(_) => "enable_interact",
            Self::HandHighlight(_) => "hand_highlight",
            Self::HandGrabbed(_) => "hand_grabbed",
            Self::ZoneSnapped(_) => "zone_snapped",
            Self::ZoneHighlight(_) => "zone_highlight",
        }
    }

    /// The record this field references, if any.
    pub fn reference(&self) -> Option<NetId> {
        match *self {
            Self::HighlightTarget(hand) | Self::GrabParent(hand) => hand.map(NetId::Hand),
            Self::SnapTarget(zone) | Self::SnapParent(zone) => zone.map(NetId::Zone),
            Self::HandHighlight(entity)
            | Self::HandGrabbed(entity)
            | Self::ZoneSnapped(entity)
            | Self::ZoneHighlight(entity) => entity.map(NetId::Entity),
            Self::Owner(_) | Self::EnableInteract(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplicationUpdate {
    pub target: NetId,
    pub field: ReplicatedField,
}

impl ReplicationUpdate {
    pub fn entity(entity: EntityId, field: ReplicatedField) -> Self {
        Self {
            target: NetId::Entity(entity),
            field,
        }
    }

    pub fn hand(hand: HandId, field: ReplicatedField) -> Self {
        Self {
            target: NetId::Hand(hand),
            field,
        }
    }

    pub fn zone(zone: ZoneId, field: ReplicatedField) -> Self {
        Self {
            target: NetId::Zone(zone),
            field,
        }
    }
}
