// Use-case level inputs/outputs for the interaction session loop.

use crate::domain::{
    EntityId, HandId, InputEvent, InteractionEvent, JointId, Motion, ParticipantId, Pose,
    ReplicationUpdate, TriggerContact, ZoneId,
};

/// Everything the session drains at the start of a frame.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    Input(InputEvent),
    HandTrigger {
        hand: HandId,
        entity: EntityId,
        entered: bool,
    },
    ZoneTrigger {
        zone: ZoneId,
        contact: TriggerContact,
        entered: bool,
    },
    Collision {
        entity: EntityId,
    },
    JointBroken {
        joint: JointId,
    },
    Tracking {
        hand: HandId,
        pose: Pose,
        motion: Motion,
    },
    Remote(ReplicationUpdate),
    ParticipantJoined(ParticipantId),
    ParticipantLeft(ParticipantId),
    Teardown,
}

/// Interaction events fired during one frame.
#[derive(Debug, Clone)]
pub struct SessionUpdate {
    pub tick: u64,
    pub events: Vec<InteractionEvent>,
}
