// In-memory physics host for single-player scenes and tests.
//
// No simulation: it records what the interaction core asks for and answers overlap queries
// from an explicit overlap table that the caller maintains.

use crate::domain::{
    BodyId, ColliderId, CollisionLayer, JointId, JointSpec, Motion, PhysicsHost, Pose,
};
use std::collections::{HashMap, HashSet};
use tracing::trace;

#[derive(Debug, Default)]
pub struct InMemoryPhysics {
    poses: HashMap<BodyId, Pose>,
    velocities: HashMap<BodyId, Motion>,
    gravity_off: HashSet<BodyId>,
    joints: HashMap<JointId, JointSpec>,
    next_joint: u64,
    last_joint: Option<JointSpec>,
    ignored: HashSet<(ColliderId, ColliderId)>,
    layers: HashMap<ColliderId, CollisionLayer>,
    overlaps: HashSet<(ColliderId, ColliderId)>,
}

fn pair(a: ColliderId, b: ColliderId) -> (ColliderId, ColliderId) {
    if a.0 <= b.0 { (a, b) } else { (b, a) }
}

impl InMemoryPhysics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_body(&mut self, body: BodyId, pose: Pose) {
        self.poses.insert(body, pose);
    }

    pub fn set_overlap(&mut self, a: ColliderId, b: ColliderId, overlapping: bool) {
        if overlapping {
            self.overlaps.insert(pair(a, b));
        } else {
            self.overlaps.remove(&pair(a, b));
        }
    }

    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    pub fn joint(&self, joint: JointId) -> Option<&JointSpec> {
        self.joints.get(&joint)
    }

    pub fn last_joint_spec(&self) -> Option<JointSpec> {
        self.last_joint
    }

    /// Drops a joint as if it snapped under load. The caller reports it to the world.
    pub fn break_joint(&mut self, joint: JointId) -> Option<JointSpec> {
        self.joints.remove(&joint)
    }

    pub fn is_ignored(&self, a: ColliderId, b: ColliderId) -> bool {
        self.ignored.contains(&pair(a, b))
    }

    pub fn layer(&self, collider: ColliderId) -> Option<CollisionLayer> {
        self.layers.get(&collider).copied()
    }

    pub fn velocity(&self, body: BodyId) -> Option<Motion> {
        self.velocities.get(&body).copied()
    }

    pub fn uses_gravity(&self, body: BodyId) -> bool {
        !self.gravity_off.contains(&body)
    }
}

impl PhysicsHost for InMemoryPhysics {
    fn body_pose(&self, body: BodyId) -> Option<Pose> {
        self.poses.get(&body).copied()
    }

    fn set_body_pose(&mut self, body: BodyId, pose: Pose) {
        self.poses.insert(body, pose);
    }

    fn set_velocity(&mut self, body: BodyId, motion: Motion) {
        self.velocities.insert(body, motion);
    }

    fn set_gravity(&mut self, body: BodyId, enabled: bool) {
        if enabled {
            self.gravity_off.remove(&body);
        } else {
            self.gravity_off.insert(body);
        }
    }

    fn create_joint(&mut self, spec: &JointSpec) -> Option<JointId> {
        self.next_joint += 1;
        let id = JointId(self.next_joint);
        self.joints.insert(id, *spec);
        self.last_joint = Some(*spec);
        trace!(joint = id.0, ?spec.anchor, "joint created");
        Some(id)
    }

    fn destroy_joint(&mut self, joint: JointId) {
        self.joints.remove(&joint);
    }

    fn set_collision_ignored(&mut self, a: ColliderId, b: ColliderId, ignored: bool) {
        if ignored {
            self.ignored.insert(pair(a, b));
        } else {
            self.ignored.remove(&pair(a, b));
        }
    }

    fn set_layer(&mut self, collider: ColliderId, layer: CollisionLayer) {
        self.layers.insert(collider, layer);
    }

    fn overlaps(&self, a: ColliderId, b: ColliderId) -> bool {
        self.overlaps.contains(&pair(a, b))
    }
}
