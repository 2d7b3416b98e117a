// Snapzone contests and the snap/unsnap transition.
//
// A held object hovering over an idle zone becomes that zone's candidate (`snap_target`).
// Nothing is committed until the hand lets go, a thrown object lands, or a presnap runs.

use super::world::InteractionWorld;
use crate::domain::{
    EntityId, HandId, InteractionEvent, JointAnchor, PhysicsHost, ReplicationBridge,
    TriggerContact, ZoneId,
};
use tracing::{debug, info};

impl<P, B> InteractionWorld<P, B>
where
    P: PhysicsHost,
    B: ReplicationBridge,
{
    /// Proximity between a hand (and what it holds) and a zone. Never commits a snap.
    pub fn snap_query(&mut self, hand: HandId, zone: ZoneId, entering: bool) -> bool {
        let Some(h) = self.hands.get(hand) else {
            return false;
        };
        let Some(entity) = h.grabbed_object.filter(|_| h.grabbing) else {
            return false;
        };
        let (Some(e), Some(z)) = (self.entities.get(entity), self.zones.get(zone)) else {
            return false;
        };
        if e.snappable.is_none() || !self.has_authority(e, h) {
            return false;
        }

        if !entering {
            if e.snap_target() != Some(zone) {
                return false;
            }
            self.clear_snap_candidate(entity);
            return true;
        }

        if !z.is_idle() || e.snap_target() == Some(zone) {
            return false;
        }
        if z.highlight_target.is_some_and(|other| other != entity) {
            return false;
        }

        self.clear_snap_candidate(entity);
        self.set_snap_target(entity, Some(zone));
        self.set_zone_highlight(zone, Some(entity));
        self.emit(InteractionEvent::ZoneHighlightBegin { entity, zone });
        debug!(entity = %entity, zone = %zone, "snap candidate");
        true
    }

    /// Drops an entity's pending candidacy, if any.
    pub(crate) fn clear_snap_candidate(&mut self, entity: EntityId) {
        let Some(zone) = self.entities.get(entity).and_then(|e| e.snap_target()) else {
            return;
        };
        self.set_snap_target(entity, None);
        if self
            .zones
            .get(zone)
            .is_some_and(|z| z.highlight_target == Some(entity))
        {
            self.set_zone_highlight(zone, None);
            self.emit(InteractionEvent::ZoneHighlightEnd { entity, zone });
        }
    }

    /// The single path that commits (`snapping = true`) or breaks a snap.
    pub fn commit_snap(
        &mut self,
        hand: Option<HandId>,
        entity: EntityId,
        zone: ZoneId,
        snapping: bool,
    ) -> bool {
        let (Some(e), Some(z)) = (self.entities.get(entity), self.zones.get(zone)) else {
            return false;
        };
        if e.snappable.is_none() || !e.initialized || !e.flags.enable_interact {
            return false;
        }
        let authorized = match hand.and_then(|h| self.hands.get(h)) {
            Some(h) => self.has_authority(e, h),
            None => hand.is_none() && self.entity_authority(e),
        };
        if !authorized {
            return false;
        }

        if snapping {
            if e.is_grabbed() || e.is_snapped() || z.snapping || z.snapped_object.is_some() {
                return false;
            }
        } else if e.snap_parent() != Some(zone) {
            return false;
        }

        self.apply_snap(hand, entity, zone, snapping);
        true
    }

    pub(crate) fn apply_snap(
        &mut self,
        hand: Option<HandId>,
        entity: EntityId,
        zone: ZoneId,
        snapping: bool,
    ) {
        if snapping {
            self.snap_into(hand, entity, zone);
        } else {
            self.unsnap_from(entity, zone);
        }
    }

    fn snap_into(&mut self, hand: Option<HandId>, entity: EntityId, zone: ZoneId) {
        self.clear_snap_candidate(entity);
        if let Some(other) = self.zones.get(zone).and_then(|z| z.highlight_target) {
            self.clear_snap_candidate(other);
        }
        self.clear_entity_highlight(entity);
        self.remove_thrown_marker(entity);
        self.destroy_joint(entity);

        self.set_snap_parent(entity, Some(zone));
        self.set_zone_snapped(zone, Some(entity));
        self.set_body_gravity(entity, false);

        let from = self
            .entities
            .get(entity)
            .and_then(|e| e.physics)
            .and_then(|body| self.physics.body_pose(body.body))
            .unwrap_or_default();
        if let Some(z) = self.zones.get_mut(zone) {
            z.lerp_from = from;
            z.lerp_timer.start();
        }

        self.emit(InteractionEvent::SnapBegin { entity, zone });
        info!(entity = %entity, zone = %zone, "snapped");

        // The releasing hand may still be touching it: keep it re-grabbable.
        let local = self.settings.local;
        let overlapping = match (
            hand.and_then(|h| self.hands.get(h)),
            self.entities.get(entity),
        ) {
            (Some(h), Some(e)) => h.owner == local && self.physics.overlaps(h.trigger, e.trigger),
            _ => false,
        };
        if let Some(h) = hand.filter(|_| overlapping).and_then(|h| self.hands.get_mut(h)) {
            if !h.grabbing && h.snapped_contact.is_none() {
                h.snapped_contact = Some(entity);
            }
        }
    }

    fn unsnap_from(&mut self, entity: EntityId, zone: ZoneId) {
        self.set_snap_parent(entity, None);
        self.set_zone_snapped(zone, None);
        self.set_body_gravity(entity, true);
        if let Some(z) = self.zones.get_mut(zone) {
            z.lerp_timer.stop();
        }
        if let Some(e) = self.entities.get_mut(entity) {
            if e.pending_joint == Some(JointAnchor::Zone(zone)) {
                e.pending_joint = None;
            }
        }
        if self
            .entities
            .get(entity)
            .and_then(|e| e.joint)
            .is_some_and(|joint| joint.anchor == JointAnchor::Zone(zone))
        {
            self.destroy_joint(entity);
        }
        for (_, hand) in self.hands.iter_mut() {
            if hand.snapped_contact == Some(entity) {
                hand.snapped_contact = None;
            }
        }

        self.emit(InteractionEvent::SnapEnd { entity, zone });
        info!(entity = %entity, zone = %zone, "unsnapped");
    }

    /// Something entered a zone's proximity volume.
    pub fn zone_trigger_enter(&mut self, zone: ZoneId, contact: TriggerContact) -> bool {
        match contact {
            TriggerContact::Hand(hand) => self.snap_query(hand, zone, true),
            TriggerContact::Entity(entity) => {
                let Some(e) = self.entities.get(entity) else {
                    return false;
                };
                if let Some(hand) = e.grab_parent() {
                    return self.snap_query(hand, zone, true);
                }
                let idle = self.zones.get(zone).is_some_and(|z| z.is_idle());
                if e.thrown().is_none() || e.snappable.is_none() || !idle {
                    return false;
                }
                // A refused commit keeps the marker for the next zone it lands in.
                self.commit_snap(None, entity, zone, true)
            }
        }
    }

    pub fn zone_trigger_exit(&mut self, zone: ZoneId, contact: TriggerContact) -> bool {
        let hand = match contact {
            TriggerContact::Hand(hand) => Some(hand),
            TriggerContact::Entity(entity) => self.entities.get(entity).and_then(|e| e.grab_parent()),
        };
        match hand {
            Some(hand) => self.snap_query(hand, zone, false),
            None => false,
        }
    }

    /// Places a zone's configured entity once that entity has finished initializing.
    pub(crate) fn try_presnap(&mut self, zone: ZoneId) -> bool {
        let Some(entity) = self.zones.get(zone).and_then(|z| z.presnap) else {
            return false;
        };
        let Some(e) = self.entities.get_mut(entity) else {
            return false;
        };
        if !e.initialized || e.is_snapped() || e.is_grabbed() {
            return false;
        }

        // Interaction may start disabled; placement bypasses it without replicating the flip.
        let was_enabled = e.flags.enable_interact;
        e.flags.enable_interact = true;
        let snapped = self.commit_snap(None, entity, zone, true);
        if let Some(e) = self.entities.get_mut(entity) {
            e.flags.enable_interact = was_enabled;
        }

        if snapped {
            debug!(entity = %entity, zone = %zone, "presnapped");
        }
        snapped
    }
}
