// Frame and physics ticks: timers, attachment lerps, joints and the consistency repair pass.

use super::world::InteractionWorld;
use crate::domain::{
    AttachedJoint, EntityId, HandId, InteractionEvent, Interactable, JointAnchor, JointId,
    JointSpec, PhysicsHost, Pose, ReplicationBridge, ZoneId,
};
use tracing::{debug, warn};

impl<P, B> InteractionWorld<P, B>
where
    P: PhysicsHost,
    B: ReplicationBridge,
{
    /// Runs after queued events are drained: hold timers, hand lerps, zone lerps, repair.
    pub fn frame_tick(&mut self, dt: f32) {
        if self.is_torn_down() {
            return;
        }

        for hand in self.hands.ids() {
            let finished = self
                .hands
                .get_mut(hand)
                .and_then(|h| h.hold_timer.tick(dt))
                .is_some_and(|step| step.finished);
            if finished {
                self.complete_hold(hand);
            }
        }

        for entity in self.entities.ids() {
            self.advance_hand_lerp(entity, dt);
            self.follow_constraint(entity);
        }

        for zone in self.zones.ids() {
            self.advance_zone_lerp(zone, dt);
        }

        self.repair_highlights();
    }

    fn advance_hand_lerp(&mut self, entity: EntityId, dt: f32) {
        let Some(e) = self.entities.get_mut(entity) else {
            return;
        };
        let Some(step) = e.hand_lerp.tick(dt) else {
            return;
        };
        let (Some(hand), Some(grabbable)) = (e.grab_parent(), e.grabbable) else {
            return;
        };
        let Some(h) = self.hands.get(hand) else {
            return;
        };

        let target = match e.constrained {
            Some(constraint) => constraint.follow(h.pose),
            None => {
                let mut target = h.pose.transform(grabbable.grip_offset);
                if !grabbable.use_target_rotation {
                    target.rotation = e.lerp_from.rotation;
                }
                target
            }
        };
        if let Some(body) = e.physics {
            self.physics
                .set_body_pose(body.body, e.lerp_from.lerp(target, step.progress));
        }
        if step.finished {
            e.pending_joint = Some(JointAnchor::Hand(hand));
        }
    }

    // After the lerp, a constrained body keeps turning with the hand that holds it locally.
    fn follow_constraint(&mut self, entity: EntityId) {
        let Some(e) = self.entities.get(entity) else {
            return;
        };
        let (Some(constraint), Some(body), Some(hand)) = (e.constrained, e.physics, e.grab_parent())
        else {
            return;
        };
        if e.hand_lerp.is_running() {
            return;
        }
        let Some(h) = self.hands.get(hand).filter(|h| h.owner == self.settings.local) else {
            return;
        };
        let pose = constraint.follow(h.pose);
        self.physics.set_body_pose(body.body, pose);
    }

    fn advance_zone_lerp(&mut self, zone: ZoneId, dt: f32) {
        let Some(z) = self.zones.get_mut(zone) else {
            return;
        };
        let Some(step) = z.lerp_timer.tick(dt) else {
            return;
        };
        let Some(entity) = z.snapped_object else {
            return;
        };
        let pose = z.lerp_from.lerp(z.target_pose, step.progress);

        let Some(e) = self.entities.get_mut(entity) else {
            return;
        };
        if let Some(body) = e.physics {
            self.physics.set_body_pose(body.body, pose);
        }
        if step.finished {
            e.pending_joint = Some(JointAnchor::Zone(zone));
        }
    }

    /// Creates requested joints that the logical state still justifies, then sweeps orphans.
    pub fn physics_tick(&mut self) {
        if self.is_torn_down() {
            return;
        }

        for entity in self.entities.ids() {
            let pending = self
                .entities
                .get_mut(entity)
                .and_then(|e| e.pending_joint.take());
            if let Some(anchor) = pending {
                self.connect_joint(entity, anchor);
            }

            let orphaned = self
                .entities
                .get(entity)
                .and_then(|e| e.joint.filter(|joint| !self.joint_agrees(e, joint.anchor)));
            if orphaned.is_some() {
                debug!(entity = %entity, "sweeping orphaned joint");
                self.destroy_joint(entity);
            }
        }
    }

    fn connect_joint(&mut self, entity: EntityId, anchor: JointAnchor) {
        let Some(e) = self.entities.get(entity) else {
            return;
        };
        if e.joint.is_some() || !self.joint_agrees(e, anchor) {
            return;
        }
        let Some(body) = e.physics else {
            return;
        };

        let spec = match anchor {
            JointAnchor::Hand(hand) => {
                let Some(grabbable) = e.grabbable else {
                    return;
                };
                let hand_pose = self.hands.get(hand).map(|h| h.pose).unwrap_or_default();
                let break_force = Some(self.settings.tuning.hand_joint_break_force);
                match e.constrained {
                    Some(constraint) => JointSpec {
                        body: body.body,
                        anchor,
                        anchor_pose: constraint.zero,
                        break_force,
                        locked_rotation: false,
                        rotation_limits: Some(constraint.limits),
                    },
                    None => JointSpec {
                        body: body.body,
                        anchor,
                        anchor_pose: hand_pose.transform(grabbable.grip_offset),
                        break_force,
                        locked_rotation: grabbable.use_target_rotation,
                        rotation_limits: None,
                    },
                }
            }
            JointAnchor::Zone(zone) => JointSpec {
                body: body.body,
                anchor,
                anchor_pose: self
                    .zones
                    .get(zone)
                    .map(|z| z.target_pose)
                    .unwrap_or(Pose::IDENTITY),
                break_force: None,
                locked_rotation: true,
                rotation_limits: None,
            },
        };

        match self.physics.create_joint(&spec) {
            Some(id) => {
                if let Some(e) = self.entities.get_mut(entity) {
                    e.joint = Some(AttachedJoint { id, anchor });
                }
                self.emit(InteractionEvent::JointConnected { entity, anchor });
            }
            None => warn!(entity = %entity, ?anchor, "physics host refused joint"),
        }
    }

    /// A joint may exist only while the entity is still held by, or snapped into, its anchor.
    pub(crate) fn joint_agrees(&self, entity: &Interactable, anchor: JointAnchor) -> bool {
        match anchor {
            JointAnchor::Hand(hand) => {
                entity.grab_parent() == Some(hand) && self.hands.contains(hand)
            }
            JointAnchor::Zone(zone) => {
                entity.snap_parent() == Some(zone) && self.zones.contains(zone)
            }
        }
    }

    pub(crate) fn destroy_joint(&mut self, entity: EntityId) {
        let Some(joint) = self.entities.get_mut(entity).and_then(|e| e.joint.take()) else {
            return;
        };
        self.physics.destroy_joint(joint.id);
        self.emit(InteractionEvent::JointReleased {
            entity,
            anchor: joint.anchor,
        });
    }

    /// The host broke a joint under load. A broken hand joint drops the object.
    pub fn on_joint_broken(&mut self, joint: JointId) -> bool {
        let found = self.entities.iter().find_map(|(id, e)| {
            e.joint
                .filter(|attached| attached.id == joint)
                .map(|attached| (id, attached.anchor))
        });
        let Some((entity, anchor)) = found else {
            return false;
        };

        if let Some(e) = self.entities.get_mut(entity) {
            e.joint = None;
        }
        self.emit(InteractionEvent::JointReleased { entity, anchor });

        match anchor {
            JointAnchor::Hand(hand) => {
                if !self.request_grab(entity, hand, false, true) {
                    debug!(entity = %entity, hand = %hand, "broken joint on a grab we do not own");
                }
            }
            JointAnchor::Zone(zone) => {
                warn!(entity = %entity, zone = %zone, "zone joint broke");
            }
        }
        true
    }

    /// Repairs highlight links that drifted out of agreement with each other or with physics.
    pub(crate) fn repair_highlights(&mut self) {
        let local = self.settings.local;

        for entity in self.entities.ids() {
            let Some(e) = self.entities.get(entity) else {
                continue;
            };
            let Some(hand) = e.highlight_target else {
                continue;
            };
            let Some(h) = self.hands.get(hand) else {
                self.set_entity_highlight(entity, None);
                continue;
            };
            if h.owner != local {
                continue;
            }

            let pointer_agrees = h.highlight_target == Some(entity);
            let held = e.is_grabbed() || e.is_snapped();
            let pending_hold = h.hold_grab && h.hold_target == Some(entity);
            let overlapping = self.physics.overlaps(h.trigger, e.trigger);
            if !pointer_agrees || held || (!overlapping && !pending_hold) {
                debug!(entity = %entity, hand = %hand, "repairing highlight");
                self.force_clear_highlight(entity, hand);
            }
        }

        for hand in self.hands.ids() {
            self.repair_hand(hand);
        }
    }

    fn force_clear_highlight(&mut self, entity: EntityId, hand: HandId) {
        self.set_entity_highlight(entity, None);
        if self
            .hands
            .get(hand)
            .is_some_and(|h| h.highlight_target == Some(entity))
        {
            self.set_hand_highlight(hand, None);
        }
        self.emit(InteractionEvent::HighlightEnd { entity, hand });
    }

    fn repair_hand(&mut self, hand: HandId) {
        let Some(h) = self.hands.get(hand) else {
            return;
        };
        if h.owner != self.settings.local {
            return;
        }

        let stale_highlight = h.highlight_target.filter(|entity| {
            self.entities
                .get(*entity)
                .is_none_or(|e| e.highlight_target != Some(hand))
        });
        let stale_contact = h.snapped_contact.filter(|entity| {
            self.entities.get(*entity).is_none_or(|e| {
                !e.is_snapped() || !self.physics.overlaps(h.trigger, e.trigger)
            })
        });
        let stale_grab = h
            .grabbed_object
            .filter(|entity| !self.entities.contains(*entity));

        if stale_highlight.is_some() {
            self.set_hand_highlight(hand, None);
        }
        if stale_grab.is_some() {
            self.set_hand_grabbed(hand, None);
        }
        if let Some(h) = self.hands.get_mut(hand) {
            if stale_contact.is_some() {
                h.snapped_contact = None;
            }
            if h.hold_target.is_some_and(|entity| !self.entities.contains(entity)) {
                h.hold_target = None;
                h.hold_grab = false;
                h.hold_timer.stop();
            }
        }
    }
}
