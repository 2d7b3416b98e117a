// Interactable entity record, composed from optional capability components.

use super::errors::ConfigError;
use super::events::InteractionEvent;
use super::ids::{EntityId, HandId, ParticipantId, ZoneId};
use super::observers::Observers;
use super::pose::{Pose, RotationLimits};
use super::ports::{AttachedJoint, BodyId, ColliderId, JointAnchor};
use super::timer::Timer;
use super::tuning::InteractionTuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityFlags {
    pub enable_interact: bool,
    pub highlighted: bool,
    /// Can be highlighted but never grabbed.
    pub highlight_only: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct Grabbable {
    pub grabbed: bool,
    pub grab_parent: Option<HandId>,
    pub hold_seconds: f32,
    pub grip_offset: Pose,
    /// Rotate into the grip orientation instead of keeping the pickup orientation.
    pub use_target_rotation: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Snappable {
    pub snapped: bool,
    /// Zone the object hovers over while held (candidate, not committed).
    pub snap_target: Option<ZoneId>,
    pub snap_parent: Option<ZoneId>,
}

/// Grabbed in place, like a valve or a wheel: the body keeps its zero position and only
/// turns toward the hand, within the limits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Constrained {
    pub zero: Pose,
    pub limits: RotationLimits,
}

impl Constrained {
    pub fn new(zero: Pose, limits: RotationLimits) -> Self {
        Self { zero, limits }
    }

    /// Pose the body takes while a hand at `hand` holds it.
    pub fn follow(&self, hand: Pose) -> Pose {
        let local = self.zero.rotation.inverse() * hand.rotation;
        Pose {
            position: self.zero.position,
            rotation: (self.zero.rotation * self.limits.clamp(local)).normalize(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PhysicsBody {
    pub body: BodyId,
    pub collider: ColliderId,
    /// Off while the body rests in a zone.
    pub uses_gravity: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrownMarker {
    pub hand: HandId,
    pub thrower: ParticipantId,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Throwable {
    pub thrown: Option<ThrownMarker>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Useable {
    pub in_use: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityState {
    Idle,
    Highlighted,
    Grabbed,
    /// Held over an idle zone that has claimed it as its candidate.
    SnapPending,
    Snapped,
}

#[derive(Debug)]
pub struct Interactable {
    pub id: EntityId,
    pub name: String,
    pub trigger: ColliderId,
    pub flags: EntityFlags,
    pub owner: Option<ParticipantId>,
    pub highlight_target: Option<HandId>,
    pub initialized: bool,
    pub grabbable: Option<Grabbable>,
    pub snappable: Option<Snappable>,
    pub constrained: Option<Constrained>,
    pub physics: Option<PhysicsBody>,
    pub throwable: Option<Throwable>,
    pub useable: Option<Useable>,
    pub hand_lerp: Timer,
    /// Pose the hand lerp started from.
    pub lerp_from: Pose,
    pub joint: Option<AttachedJoint>,
    /// Joint to create on the next physics tick.
    pub pending_joint: Option<JointAnchor>,
    pub observers: Observers<InteractionEvent>,
}

impl Interactable {
    pub fn is_grabbed(&self) -> bool {
        self.grabbable.is_some_and(|g| g.grabbed)
    }

    pub fn grab_parent(&self) -> Option<HandId> {
        self.grabbable.and_then(|g| g.grab_parent)
    }

    pub fn is_snapped(&self) -> bool {
        self.snappable.is_some_and(|s| s.snapped)
    }

    pub fn snap_parent(&self) -> Option<ZoneId> {
        self.snappable.and_then(|s| s.snap_parent)
    }

    pub fn snap_target(&self) -> Option<ZoneId> {
        self.snappable.and_then(|s| s.snap_target)
    }

    pub fn is_highlighted(&self) -> bool {
        self.flags.highlighted
    }

    /// Entities without a grabbable fire a single interact instead of being carried.
    pub fn is_one_shot(&self) -> bool {
        self.grabbable.is_none()
    }

    pub fn thrown(&self) -> Option<ThrownMarker> {
        self.throwable.and_then(|t| t.thrown)
    }

    pub fn hold_seconds(&self) -> f32 {
        self.grabbable.map(|g| g.hold_seconds).unwrap_or(0.0)
    }

    pub fn state(&self) -> EntityState {
        if self.is_snapped() {
            EntityState::Snapped
        } else if self.is_grabbed() {
            if self.snap_target().is_some() {
                EntityState::SnapPending
            } else {
                EntityState::Grabbed
            }
        } else if self.is_highlighted() {
            EntityState::Highlighted
        } else {
            EntityState::Idle
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GrabDesc {
    /// `None` uses the tuning default.
    pub hold_seconds: Option<f32>,
    pub grip_offset: Pose,
    pub use_target_rotation: bool,
}

impl Default for GrabDesc {
    fn default() -> Self {
        Self {
            hold_seconds: None,
            grip_offset: Pose::IDENTITY,
            use_target_rotation: true,
        }
    }
}

impl GrabDesc {
    pub fn hold(seconds: f32) -> Self {
        Self {
            hold_seconds: Some(seconds),
            ..Self::default()
        }
    }
}

/// Spawn description for an interactable entity.
#[derive(Debug, Clone)]
pub struct EntityDesc {
    pub name: String,
    pub trigger: ColliderId,
    pub grab: Option<GrabDesc>,
    pub body: Option<PhysicsBody>,
    pub snappable: bool,
    pub constrained: Option<Constrained>,
    pub throwable: bool,
    pub useable: bool,
    pub highlight_only: bool,
    pub enable_interact: bool,
}

impl EntityDesc {
    pub fn new(name: impl Into<String>, trigger: ColliderId) -> Self {
        Self {
            name: name.into(),
            trigger,
            grab: None,
            body: None,
            snappable: false,
            constrained: None,
            throwable: false,
            useable: false,
            highlight_only: false,
            enable_interact: true,
        }
    }

    pub fn grabbable(mut self, grab: GrabDesc) -> Self {
        self.grab = Some(grab);
        self
    }

    pub fn with_body(mut self, body: BodyId, collider: ColliderId) -> Self {
        self.body = Some(PhysicsBody {
            body,
            collider,
            uses_gravity: true,
        });
        self
    }

    pub fn snappable(mut self) -> Self {
        self.snappable = true;
        self
    }

    pub fn constrained(mut self, constraint: Constrained) -> Self {
        self.constrained = Some(constraint);
        self
    }

    pub fn throwable(mut self) -> Self {
        self.throwable = true;
        self
    }

    pub fn useable(mut self) -> Self {
        self.useable = true;
        self
    }

    pub fn highlight_only(mut self) -> Self {
        self.highlight_only = true;
        self
    }

    pub fn begin_disabled(mut self) -> Self {
        self.enable_interact = false;
        self
    }

    /// Validates capability dependencies and builds the record.
    pub fn build(
        self,
        id: EntityId,
        tuning: &InteractionTuning,
    ) -> Result<Interactable, ConfigError> {
        let needs_grab = [
            (self.snappable, "snappable"),
            (self.constrained.is_some(), "constrained"),
            (self.throwable, "throwable"),
            (self.useable, "useable"),
        ];
        for (wanted, capability) in needs_grab {
            if wanted && self.grab.is_none() {
                return Err(ConfigError::MissingGrabbable {
                    entity: self.name,
                    capability,
                });
            }
        }

        if let Some(constraint) = self.constrained {
            if self.snappable {
                return Err(ConfigError::ConstrainedSnappable { entity: self.name });
            }
            if !constraint.limits.is_valid() {
                return Err(ConfigError::InvalidRotationLimits { entity: self.name });
            }
        }

        let needs_body = [(self.snappable, "snappable"), (self.throwable, "throwable")];
        for (wanted, capability) in needs_body {
            if wanted && self.body.is_none() {
                return Err(ConfigError::MissingRigidbodyCollider {
                    entity: self.name,
                    capability,
                });
            }
        }

        let grabbable = match self.grab {
            Some(grab) => {
                let seconds = grab.hold_seconds.unwrap_or(tuning.default_hold_seconds);
                if !seconds.is_finite() || seconds < 0.0 {
                    return Err(ConfigError::InvalidHoldDuration {
                        entity: self.name,
                        seconds,
                    });
                }
                Some(Grabbable {
                    grabbed: false,
                    grab_parent: None,
                    hold_seconds: seconds,
                    grip_offset: grab.grip_offset,
                    use_target_rotation: grab.use_target_rotation,
                })
            }
            None => None,
        };

        Ok(Interactable {
            id,
            name: self.name,
            trigger: self.trigger,
            flags: EntityFlags {
                enable_interact: self.enable_interact,
                highlighted: false,
                highlight_only: self.highlight_only,
            },
            owner: None,
            highlight_target: None,
            initialized: false,
            grabbable,
            snappable: self.snappable.then(Snappable::default),
            constrained: self.constrained,
            physics: self.body,
            throwable: self.throwable.then(Throwable::default),
            useable: self.useable.then(Useable::default),
            hand_lerp: Timer::new(tuning.hand_lerp_seconds),
            lerp_from: Pose::IDENTITY,
            joint: None,
            pending_joint: None,
            observers: Observers::default(),
        })
    }
}
