// Grab requests and the grab/release transition.

use super::world::InteractionWorld;
use crate::domain::{
    EntityId, HandId, InteractionEvent, JointAnchor, PhysicsHost, ReplicationBridge,
};
use tracing::{debug, info};

impl<P, B> InteractionWorld<P, B>
where
    P: PhysicsHost,
    B: ReplicationBridge,
{
    /// Asks to grab (`grab = true`) or release an entity with a hand.
    ///
    /// The first hand to claim an entity keeps it until that same hand lets go. `force`
    /// bypasses a disabled entity, so a hand can always drop what it holds.
    pub fn request_grab(&mut self, entity: EntityId, hand: HandId, grab: bool, force: bool) -> bool {
        let (Some(e), Some(h)) = (self.entities.get(entity), self.hands.get(hand)) else {
            return false;
        };
        if !e.initialized || (!e.flags.enable_interact && !force) || !self.has_authority(e, h) {
            return false;
        }

        if e.is_one_shot() {
            if !grab {
                return false;
            }
            self.clear_entity_highlight(entity);
            self.emit(InteractionEvent::Interact { entity, hand });
            info!(entity = %entity, hand = %hand, "interacted");
            return true;
        }
        if e.flags.highlight_only {
            return false;
        }

        if grab {
            if e.grab_parent().is_some() || h.grabbing {
                return false;
            }
            if e.owner.is_none() {
                self.set_owner(entity, Some(self.settings.local));
            }
            self.apply_grab(entity, hand, true, true);
        } else {
            if e.grab_parent() != Some(hand) {
                return false;
            }
            let owned_locally = e.owner == Some(self.settings.local);
            self.apply_grab(entity, hand, false, true);
            if owned_locally {
                self.set_owner(entity, None);
            }
        }
        true
    }

    /// The grab transition itself. Callers have already checked legality.
    pub(crate) fn apply_grab(&mut self, entity: EntityId, hand: HandId, grab: bool, allow_throw: bool) {
        if grab {
            self.attach_to_hand(entity, hand);
        } else {
            self.detach_from_hand(entity, hand, allow_throw);
        }
    }

    fn attach_to_hand(&mut self, entity: EntityId, hand: HandId) {
        if let Some(zone) = self.entities.get(entity).and_then(|e| e.snap_parent()) {
            self.apply_snap(Some(hand), entity, zone, false);
        }
        self.clear_snap_candidate(entity);
        self.remove_thrown_marker(entity);
        self.clear_entity_highlight(entity);
        if let Some(previous) = self.hands.get(hand).and_then(|h| h.highlight_target) {
            self.clear_highlight(previous, hand);
        }
        self.destroy_joint(entity);

        self.set_grab_parent(entity, Some(hand));
        self.set_hand_grabbed(hand, Some(entity));

        let Some(h) = self.hands.get_mut(hand) else {
            return;
        };
        h.snapped_contact = None;
        h.hold_grab = false;
        h.hold_target = None;
        h.hold_timer.stop();
        let hand_collider = h.body_collider;

        let Some(e) = self.entities.get_mut(entity) else {
            return;
        };
        if let (Some(body), Some(hand_collider)) = (e.physics, hand_collider) {
            self.physics
                .set_collision_ignored(body.collider, hand_collider, true);
        }
        e.lerp_from = e
            .physics
            .and_then(|body| self.physics.body_pose(body.body))
            .unwrap_or_default();
        e.pending_joint = None;
        e.hand_lerp.start();

        self.emit(InteractionEvent::GrabBegin { entity, hand });
        info!(entity = %entity, hand = %hand, "grabbed");
    }

    fn detach_from_hand(&mut self, entity: EntityId, hand: HandId, allow_throw: bool) {
        self.set_grab_parent(entity, None);
        self.set_hand_grabbed(hand, None);
        self.clear_snap_candidate(entity);

        if let Some(e) = self.entities.get_mut(entity) {
            e.hand_lerp.stop();
            if e.pending_joint == Some(JointAnchor::Hand(hand)) {
                e.pending_joint = None;
            }
        }
        self.destroy_joint(entity);

        let throwable = self
            .entities
            .get(entity)
            .is_some_and(|e| e.throwable.is_some() && e.physics.is_some());
        if allow_throw && self.settings.vr_active && throwable {
            self.throw(entity, hand);
        } else {
            self.set_hand_collision(entity, hand, false);
        }

        let was_in_use = self
            .entities
            .get_mut(entity)
            .and_then(|e| e.useable.as_mut())
            .is_some_and(|useable| std::mem::replace(&mut useable.in_use, false));
        if was_in_use {
            self.emit(InteractionEvent::UseEnd { entity, hand });
        }

        self.emit(InteractionEvent::GrabEnd { entity, hand });
        info!(entity = %entity, hand = %hand, "released");

        // Still inside the hand volume: offer it straight back as a candidate.
        let overlapping = match (self.entities.get(entity), self.hands.get(hand)) {
            (Some(e), Some(h)) => self.physics.overlaps(h.trigger, e.trigger),
            _ => false,
        };
        if overlapping && self.request_highlight(entity, hand, true) {
            debug!(entity = %entity, hand = %hand, "re-highlighted after release");
        }
    }

    pub(crate) fn set_hand_collision(&mut self, entity: EntityId, hand: HandId, ignored: bool) {
        let body = self.entities.get(entity).and_then(|e| e.physics);
        let hand_collider = self.hands.get(hand).and_then(|h| h.body_collider);
        if let (Some(body), Some(hand_collider)) = (body, hand_collider) {
            self.physics
                .set_collision_ignored(body.collider, hand_collider, ignored);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::{
        EntityState, InteractionEvent, PressKind, ReplicatedField, ReplicationUpdate,
    };
    use crate::use_cases::test_support::{LOCAL, REMOTE, SceneBuilder};

    #[test]
    fn when_unowned_entity_is_grabbed_then_local_participant_claims_it_first() {
        let mut scene = SceneBuilder::new().build();
        scene.touch(scene.right, scene.crate_id);
        scene.world.bridge_mut().drain();

        assert!(scene.world.request_grab(scene.crate_id, scene.right, true, false));

        let updates = scene.world.bridge_mut().drain();
        let owner_at = updates
            .iter()
            .position(|u| u.field == ReplicatedField::Owner(Some(LOCAL)))
            .expect("owner broadcast");
        let grab_at = updates
            .iter()
            .position(|u| u.field == ReplicatedField::GrabParent(Some(scene.right)))
            .expect("grab broadcast");
        assert!(owner_at < grab_at);
        assert_eq!(scene.world.entity(scene.crate_id).expect("crate").state(), EntityState::Grabbed);
    }

    #[test]
    fn when_entity_is_held_then_second_hand_cannot_take_it() {
        let mut scene = SceneBuilder::new().build();
        scene.touch(scene.right, scene.crate_id);
        scene.world.request_grab(scene.crate_id, scene.right, true, false);

        assert!(!scene.world.request_grab(scene.crate_id, scene.left, true, false));
        assert!(!scene.world.request_grab(scene.crate_id, scene.left, false, true));
        assert_eq!(
            scene.world.entity(scene.crate_id).expect("crate").grab_parent(),
            Some(scene.right)
        );
    }

    #[test]
    fn when_released_then_ownership_returns_to_nobody() {
        let mut scene = SceneBuilder::new().build();
        scene.touch(scene.right, scene.crate_id);
        scene.world.request_grab(scene.crate_id, scene.right, true, false);

        assert!(scene.world.request_grab(scene.crate_id, scene.right, false, false));

        let entity = scene.world.entity(scene.crate_id).expect("crate");
        assert_eq!(entity.owner, None);
        assert!(!entity.is_grabbed());
        assert!(!scene.world.hand(scene.right).expect("hand").grabbing);
    }

    #[test]
    fn when_released_inside_hand_volume_then_entity_is_highlighted_again() {
        let mut scene = SceneBuilder::new().build();
        scene.touch(scene.right, scene.crate_id);
        scene.world.request_grab(scene.crate_id, scene.right, true, false);

        scene.world.request_grab(scene.crate_id, scene.right, false, false);

        let entity = scene.world.entity(scene.crate_id).expect("crate");
        assert_eq!(entity.highlight_target, Some(scene.right));
        assert!(scene.world.check_invariants().is_ok());
    }

    #[test]
    fn when_one_shot_entity_is_grabbed_then_interact_fires_without_ownership() {
        let mut scene = SceneBuilder::new().build();
        scene.touch(scene.right, scene.lever_id);
        scene.world.drain_events();

        assert!(scene.world.request_grab(scene.lever_id, scene.right, true, false));

        let lever = scene.world.entity(scene.lever_id).expect("lever");
        assert_eq!(lever.owner, None);
        assert!(!lever.is_highlighted());
        let events = scene.world.drain_events();
        assert!(events.contains(&InteractionEvent::Interact {
            entity: scene.lever_id,
            hand: scene.right
        }));
    }

    #[test]
    fn when_remote_participant_owns_entity_then_grab_is_refused() {
        let mut scene = SceneBuilder::new().build();
        scene.world.set_owner(scene.crate_id, Some(REMOTE));

        assert!(!scene.world.request_grab(scene.crate_id, scene.right, true, true));
        assert!(!scene.world.entity(scene.crate_id).expect("crate").is_grabbed());
    }

    #[test]
    fn when_grabbed_then_hand_and_object_stop_colliding_until_release() {
        let mut scene = SceneBuilder::new().build();
        scene.touch(scene.right, scene.crate_id);
        scene.world.request_grab(scene.crate_id, scene.right, true, false);
        let (body, hand_body) = scene.colliders(scene.right, scene.crate_id);

        assert!(scene.world.physics().is_ignored(body, hand_body));

        scene.world.request_grab(scene.crate_id, scene.right, false, false);
        assert!(!scene.world.physics().is_ignored(body, hand_body));
    }

    #[test]
    fn when_disabled_entity_is_released_with_force_then_it_drops() {
        let mut scene = SceneBuilder::new().build();
        scene.touch(scene.right, scene.crate_id);
        scene.world.request_grab(scene.crate_id, scene.right, true, false);
        scene.world.set_interactable(scene.crate_id, false);

        assert!(!scene.world.request_grab(scene.crate_id, scene.right, false, false));
        assert!(scene.world.request_grab(scene.crate_id, scene.right, false, true));
        assert!(!scene.world.entity(scene.crate_id).expect("crate").is_grabbed());
    }

    #[test]
    fn when_entity_carries_a_stale_snap_target_then_grab_clears_it_and_release_stays_loose() {
        let mut scene = SceneBuilder::new().build();
        scene
            .world
            .apply_remote_update(ReplicationUpdate::entity(
                scene.crate_id,
                ReplicatedField::SnapTarget(Some(scene.zone)),
            ))
            .expect("snap target applies");

        scene.grab(scene.right, scene.crate_id);
        assert!(scene.world.entity(scene.crate_id).expect("crate").snap_target().is_none());
        assert!(scene.world.check_invariants().is_ok());

        assert!(scene.world.grab_query(scene.right, PressKind::Up));
        let entity = scene.world.entity(scene.crate_id).expect("crate");
        assert!(!entity.is_snapped());
        assert!(scene.world.zone(scene.zone).expect("zone").is_idle());
    }
}
