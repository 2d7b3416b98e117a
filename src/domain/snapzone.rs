use super::events::InteractionEvent;
use super::ids::{EntityId, HandId, ZoneId};
use super::observers::Observers;
use super::pose::Pose;
use super::ports::ColliderId;
use super::timer::Timer;
use super::tuning::InteractionTuning;
use tracing::warn;

/// What entered or left a zone's proximity volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerContact {
    Hand(HandId),
    Entity(EntityId),
}

#[derive(Debug)]
pub struct Snapzone {
    pub id: ZoneId,
    pub name: String,
    pub trigger: ColliderId,
    pub target_pose: Pose,
    pub snapped_object: Option<EntityId>,
    /// Grabbed object hovering over this zone.
    pub highlight_target: Option<EntityId>,
    /// Occupied or transitioning. Blocks new contests.
    pub snapping: bool,
    pub highlighting: bool,
    pub lerp_timer: Timer,
    pub lerp_from: Pose,
    pub presnap: Option<EntityId>,
    pub observers: Observers<InteractionEvent>,
}

impl Snapzone {
    pub fn is_idle(&self) -> bool {
        !self.snapping && self.snapped_object.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct SnapzoneDesc {
    pub name: String,
    pub trigger: ColliderId,
    pub pose: Pose,
    pub target: Option<Pose>,
    pub presnap: Option<EntityId>,
}

impl SnapzoneDesc {
    pub fn new(name: impl Into<String>, trigger: ColliderId, pose: Pose) -> Self {
        Self {
            name: name.into(),
            trigger,
            pose,
            target: None,
            presnap: None,
        }
    }

    pub fn target(mut self, target: Pose) -> Self {
        self.target = Some(target);
        self
    }

    pub fn presnap(mut self, entity: EntityId) -> Self {
        self.presnap = Some(entity);
        self
    }

    pub fn build(self, id: ZoneId, tuning: &InteractionTuning) -> Snapzone {
        let target_pose = match self.target {
            Some(target) => target,
            None => {
                warn!(zone = %self.name, "snapzone has no target pose, using its own pose");
                self.pose
            }
        };

        Snapzone {
            id,
            name: self.name,
            trigger: self.trigger,
            target_pose,
            snapped_object: None,
            highlight_target: None,
            snapping: false,
            highlighting: false,
            lerp_timer: Timer::new(tuning.snap_lerp_seconds),
            lerp_from: Pose::IDENTITY,
            presnap: self.presnap,
            observers: Observers::default(),
        }
    }
}
