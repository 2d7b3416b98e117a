use super::ids::{HandId, ZoneId};
use super::pose::{Motion, Pose, RotationLimits};
use super::replication::ReplicationUpdate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColliderId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JointId(pub u64);

/// What an entity's single joint slot is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JointAnchor {
    Hand(HandId),
    Zone(ZoneId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttachedJoint {
    pub id: JointId,
    pub anchor: JointAnchor,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointSpec {
    pub body: BodyId,
    pub anchor: JointAnchor,
    /// Anchor pose the body is held at.
    pub anchor_pose: Pose,
    /// `None` means unbreakable.
    pub break_force: Option<f32>,
    pub locked_rotation: bool,
    /// Swing allowed around `anchor_pose`; only constrained grabs set it.
    pub rotation_limits: Option<RotationLimits>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionLayer {
    Interactable,
    Thrown,
}

// Port for the rigid-body host. Simulation itself stays outside this crate.
pub trait PhysicsHost: Send {
    fn body_pose(&self, body: BodyId) -> Option<Pose>;
    fn set_body_pose(&mut self, body: BodyId, pose: Pose);
    fn set_velocity(&mut self, body: BodyId, motion: Motion);
    fn set_gravity(&mut self, body: BodyId, enabled: bool);
    fn create_joint(&mut self, spec: &JointSpec) -> Option<JointId>;
    fn destroy_joint(&mut self, joint: JointId);
    fn set_collision_ignored(&mut self, a: ColliderId, b: ColliderId, ignored: bool);
    fn set_layer(&mut self, collider: ColliderId, layer: CollisionLayer);
    fn overlaps(&self, a: ColliderId, b: ColliderId) -> bool;
}

// Port for the replication transport. Delivery is the transport's concern.
pub trait ReplicationBridge: Send {
    fn broadcast(&mut self, update: ReplicationUpdate);
}
