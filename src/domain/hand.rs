use super::ids::{EntityId, HandId, ParticipantId};
use super::pose::{Motion, Pose};
use super::ports::ColliderId;
use super::timer::Timer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandSide {
    Left,
    Right,
    /// Keyboard/mouse stand-in used outside VR.
    Debug,
}

/// A hand's grab volume and its interaction state.
#[derive(Debug)]
pub struct GrabPoint {
    pub id: HandId,
    pub side: HandSide,
    pub owner: ParticipantId,
    pub disabled: bool,
    pub trigger: ColliderId,
    pub body_collider: Option<ColliderId>,
    pub highlight_target: Option<EntityId>,
    /// Snapped entity inside the volume. Snapped entities are never highlighted.
    pub snapped_contact: Option<EntityId>,
    pub grabbed_object: Option<EntityId>,
    pub grabbing: bool,
    pub hold_grab: bool,
    pub hold_target: Option<EntityId>,
    pub hold_timer: Timer,
    pub pose: Pose,
    pub motion: Motion,
}

impl GrabPoint {
    /// Entity a grab press would act on.
    pub fn touched(&self) -> Option<EntityId> {
        self.highlight_target.or(self.snapped_contact)
    }

    pub fn is_idle(&self) -> bool {
        !self.grabbing
            && !self.hold_grab
            && self.grabbed_object.is_none()
            && self.highlight_target.is_none()
            && self.snapped_contact.is_none()
            && self.hold_target.is_none()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct HandDesc {
    pub side: HandSide,
    pub owner: ParticipantId,
    pub trigger: ColliderId,
    pub body_collider: Option<ColliderId>,
}

impl HandDesc {
    pub fn new(side: HandSide, owner: ParticipantId, trigger: ColliderId) -> Self {
        Self {
            side,
            owner,
            trigger,
            body_collider: None,
        }
    }

    pub fn with_body_collider(mut self, collider: ColliderId) -> Self {
        self.body_collider = Some(collider);
        self
    }

    pub fn build(self, id: HandId) -> GrabPoint {
        GrabPoint {
            id,
            side: self.side,
            owner: self.owner,
            disabled: false,
            trigger: self.trigger,
            body_collider: self.body_collider,
            highlight_target: None,
            snapped_contact: None,
            grabbed_object: None,
            grabbing: false,
            hold_grab: false,
            hold_target: None,
            hold_timer: Timer::default(),
            pose: Pose::IDENTITY,
            motion: Motion::default(),
        }
    }
}
