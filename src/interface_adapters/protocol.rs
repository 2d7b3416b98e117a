// Wire protocol DTOs and conversions for replication messages.
// The transport that carries these strings lives outside this crate.

use crate::domain::{
    EntityId, HandId, NetId, ParticipantId, ReplicatedField, ReplicationUpdate, ZoneId,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Messages exchanged between participants' replication bridges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ReplicationMessage {
    // One replicated field of one record.
    Update(ReplicationUpdateDto),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplicationUpdateDto {
    pub target: NetIdDto,
    pub field: FieldDto,
}

/// Arena handle in its raw packed form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum NetIdDto {
    Entity(u64),
    Hand(u64),
    Zone(u64),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", content = "value", rename_all = "snake_case")]
pub enum FieldDto {
    Owner(Option<u32>),
    HighlightTarget(Option<u64>),
    GrabParent(Option<u64>),
    SnapTarget(Option<u64>),
    SnapParent(Option<u64>),
    EnableInteract(bool),
    HandHighlight(Option<u64>),
    HandGrabbed(Option<u64>),
    ZoneSnapped(Option<u64>),
    ZoneHighlight(Option<u64>),
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed replication message: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("replication message carries a nil {0} handle")]
    NilHandle(&'static str),
}

impl From<NetId> for NetIdDto {
    fn from(id: NetId) -> Self {
        match id {
            NetId::Entity(id) => NetIdDto::Entity(id.as_u64()),
            NetId::Hand(id) => NetIdDto::Hand(id.as_u64()),
            NetId::Zone(id) => NetIdDto::Zone(id.as_u64()),
        }
    }
}

impl TryFrom<NetIdDto> for NetId {
    type Error = ProtocolError;

    fn try_from(id: NetIdDto) -> Result<Self, Self::Error> {
        match id {
            NetIdDto::Entity(raw) => entity(raw).map(NetId::Entity),
            NetIdDto::Hand(raw) => hand(raw).map(NetId::Hand),
            NetIdDto::Zone(raw) => zone(raw).map(NetId::Zone),
        }
    }
}

fn entity(raw: u64) -> Result<EntityId, ProtocolError> {
    let id = EntityId::from_u64(raw);
    if id.is_nil() {
        return Err(ProtocolError::NilHandle("entity"));
    }
    Ok(id)
}

fn hand(raw: u64) -> Result<HandId, ProtocolError> {
    let id = HandId::from_u64(raw);
    if id.is_nil() {
        return Err(ProtocolError::NilHandle("hand"));
    }
    Ok(id)
}

fn zone(raw: u64) -> Result<ZoneId, ProtocolError> {
    let id = ZoneId::from_u64(raw);
    if id.is_nil() {
        return Err(ProtocolError::NilHandle("zone"));
    }
    Ok(id)
}

impl From<ReplicatedField> for FieldDto {
    fn from(field: ReplicatedField) -> Self {
        match field {
            ReplicatedField::Owner(owner) => FieldDto::Owner(owner.map(|p| p.0)),
            ReplicatedField::HighlightTarget(hand) => {
                FieldDto::HighlightTarget(hand.map(HandId::as_u64))
            }
            ReplicatedField::GrabParent(hand) => FieldDto::GrabParent(hand.map(HandId::as_u64)),
            ReplicatedField::SnapTarget(zone) => FieldDto::SnapTarget(zone.map(ZoneId::as_u64)),
            ReplicatedField::SnapParent(zone) => FieldDto::SnapParent(zone.map(ZoneId::as_u64)),
            ReplicatedField::EnableInteract(enabled) => FieldDto::EnableInteract(enabled),
            ReplicatedField::HandHighlight(entity) => {
                FieldDto::HandHighlight(entity.map(EntityId::as_u64))
            }
            ReplicatedField::HandGrabbed(entity) => {
                FieldDto::HandGrabbed(entity.map(EntityId::as_u64))
            }
            ReplicatedField::ZoneSnapped(entity) => {
                FieldDto::ZoneSnapped(entity.map(EntityId::as_u64))
            }
            ReplicatedField::ZoneHighlight(entity) => {
                FieldDto::ZoneHighlight(entity.map(EntityId::as_u64))
            }
        }
    }
}

impl TryFrom<FieldDto> for ReplicatedField {
    type Error = ProtocolError;

    fn try_from(field: FieldDto) -> Result<Self, Self::Error> {
        Ok(match field {
            FieldDto::Owner(owner) => ReplicatedField::Owner(owner.map(ParticipantId)),
            FieldDto::HighlightTarget(raw) => {
                ReplicatedField::HighlightTarget(raw.map(hand).transpose()?)
            }
            FieldDto::GrabParent(raw) => ReplicatedField::GrabParent(raw.map(hand).transpose()?),
            FieldDto::SnapTarget(raw) => ReplicatedField::SnapTarget(raw.map(zone).transpose()?),
            FieldDto::SnapParent(raw) => ReplicatedField::SnapParent(raw.map(zone).transpose()?),
            FieldDto::EnableInteract(enabled) => ReplicatedField::EnableInteract(enabled),
            FieldDto::HandHighlight(raw) => {
                ReplicatedField::HandHighlight(raw.map(entity).transpose()?)
            }
            FieldDto::HandGrabbed(raw) => ReplicatedField::HandGrabbed(raw.map(entity).transpose()?),
            FieldDto::ZoneSnapped(raw) => ReplicatedField::ZoneSnapped(raw.map(entity).transpose()?),
            FieldDto::ZoneHighlight(raw) => {
                ReplicatedField::ZoneHighlight(raw.map(entity).transpose()?)
            }
        })
    }
}

impl From<ReplicationUpdate> for ReplicationMessage {
    fn from(update: ReplicationUpdate) -> Self {
        ReplicationMessage::Update(ReplicationUpdateDto {
            target: update.target.into(),
            field: update.field.into(),
        })
    }
}

impl TryFrom<ReplicationMessage> for ReplicationUpdate {
    type Error = ProtocolError;

    fn try_from(message: ReplicationMessage) -> Result<Self, Self::Error> {
        let ReplicationMessage::Update(dto) = message;
        Ok(ReplicationUpdate {
            target: dto.target.try_into()?,
            field: dto.field.try_into()?,
        })
    }
}

/// Parses one inbound JSON message into a domain update.
pub fn decode_update(text: &str) -> Result<ReplicationUpdate, ProtocolError> {
    let message: ReplicationMessage = serde_json::from_str(text)?;
    message.try_into()
}
