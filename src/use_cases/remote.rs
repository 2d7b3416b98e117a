// Replicated state arriving from other participants, late-joiner sync and participant exit.
//
// Remote updates are applied field by field with no authority checks. A paired field (the
// hand side of a grab, say) may arrive in a later message, so links can disagree briefly.

use super::world::InteractionWorld;
use crate::domain::{
    EntityId, HandId, InteractionEvent, NetId, ParticipantId, PhysicsHost, ReplicatedField,
    ReplicationBridge, ReplicationError, ReplicationUpdate, ZoneId,
};
use tracing::{info, warn};

impl<P, B> InteractionWorld<P, B>
where
    P: PhysicsHost,
    B: ReplicationBridge,
{
    pub fn apply_remote_update(&mut self, update: ReplicationUpdate) -> Result<(), ReplicationError> {
        self.try_apply_remote(update).inspect_err(|e| {
            warn!(error = %e, "dropping replicated update");
        })
    }

    fn try_apply_remote(&mut self, update: ReplicationUpdate) -> Result<(), ReplicationError> {
        if !self.resolves(update.target) {
            return Err(ReplicationError::UnresolvedTarget(update.target));
        }
        if let Some(reference) = update.field.reference().filter(|r| !self.resolves(*r)) {
            return Err(ReplicationError::UnresolvedReference {
                target: update.target,
                reference,
            });
        }

        let mismatch = ReplicationError::FieldMismatch {
            target: update.target,
            field: update.field.name(),
        };
        match update.target {
            NetId::Entity(id) => self.apply_remote_entity(id, update.field, mismatch),
            NetId::Hand(id) => self.apply_remote_hand(id, update.field, mismatch),
            NetId::Zone(id) => self.apply_remote_zone(id, update.field, mismatch),
        }
    }

    fn resolves(&self, id: NetId) -> bool {
        match id {
            NetId::Entity(id) => self.entities.contains(id),
            NetId::Hand(id) => self.hands.contains(id),
            NetId::Zone(id) => self.zones.contains(id),
        }
    }

    fn apply_remote_entity(
        &mut self,
        id: EntityId,
        field: ReplicatedField,
        mismatch: ReplicationError,
    ) -> Result<(), ReplicationError> {
        let e = self
            .entities
            .get_mut(id)
            .ok_or(ReplicationError::UnresolvedTarget(NetId::Entity(id)))?;

        match field {
            ReplicatedField::Owner(owner) => {
                if e.owner != owner {
                    e.owner = owner;
                    self.emit(InteractionEvent::OwnerChanged { entity: id, owner });
                }
            }
            ReplicatedField::EnableInteract(enabled) => e.flags.enable_interact = enabled,
            ReplicatedField::HighlightTarget(hand) => {
                let previous = std::mem::replace(&mut e.highlight_target, hand);
                e.flags.highlighted = hand.is_some();
                if previous != hand {
                    if let Some(old) = previous {
                        self.emit(InteractionEvent::HighlightEnd { entity: id, hand: old });
                    }
                    if let Some(new) = hand {
                        self.emit(InteractionEvent::HighlightBegin { entity: id, hand: new });
                    }
                }
            }
            ReplicatedField::GrabParent(hand) => {
                let grabbable = e.grabbable.as_mut().ok_or(mismatch)?;
                let previous = std::mem::replace(&mut grabbable.grab_parent, hand);
                grabbable.grabbed = hand.is_some();
                if previous == hand {
                    return Ok(());
                }
                e.pending_joint = None;
                match hand {
                    Some(_) => {
                        e.lerp_from = e
                            .physics
                            .and_then(|body| self.physics.body_pose(body.body))
                            .unwrap_or_default();
                        e.hand_lerp.start();
                    }
                    None => e.hand_lerp.stop(),
                }
                if let Some(old) = previous {
                    self.emit(InteractionEvent::GrabEnd { entity: id, hand: old });
                }
                if let Some(new) = hand {
                    self.emit(InteractionEvent::GrabBegin { entity: id, hand: new });
                }
            }
            ReplicatedField::SnapTarget(zone) => {
                let snappable = e.snappable.as_mut().ok_or(mismatch)?;
                snappable.snap_target = zone;
            }
            ReplicatedField::SnapParent(zone) => {
                let snappable = e.snappable.as_mut().ok_or(mismatch)?;
                let previous = std::mem::replace(&mut snappable.snap_parent, zone);
                snappable.snapped = zone.is_some();
                if previous == zone {
                    return Ok(());
                }
                self.set_body_gravity(id, zone.is_none());
                if let Some(old) = previous {
                    self.emit(InteractionEvent::SnapEnd { entity: id, zone: old });
                }
                if let Some(new) = zone {
                    self.emit(InteractionEvent::SnapBegin { entity: id, zone: new });
                }
            }
            _ => return Err(mismatch),
        }
        Ok(())
    }

    fn apply_remote_hand(
        &mut self,
        id: HandId,
        field: ReplicatedField,
        mismatch: ReplicationError,
    ) -> Result<(), ReplicationError> {
        let h = self
            .hands
            .get_mut(id)
            .ok_or(ReplicationError::UnresolvedTarget(NetId::Hand(id)))?;

        match field {
            ReplicatedField::HandHighlight(entity) => h.highlight_target = entity,
            ReplicatedField::HandGrabbed(entity) => {
                h.grabbed_object = entity;
                h.grabbing = entity.is_some();
            }
            _ => return Err(mismatch),
        }
        Ok(())
    }

    fn apply_remote_zone(
        &mut self,
        id: ZoneId,
        field: ReplicatedField,
        mismatch: ReplicationError,
    ) -> Result<(), ReplicationError> {
        let z = self
            .zones
            .get_mut(id)
            .ok_or(ReplicationError::UnresolvedTarget(NetId::Zone(id)))?;

        match field {
            ReplicatedField::ZoneSnapped(entity) => {
                let previous = std::mem::replace(&mut z.snapped_object, entity);
                z.snapping = entity.is_some();
                if previous == entity {
                    return Ok(());
                }
                match entity {
                    Some(entity) => {
                        z.lerp_from = self
                            .entities
                            .get(entity)
                            .and_then(|e| e.physics)
                            .and_then(|body| self.physics.body_pose(body.body))
                            .unwrap_or_default();
                        z.lerp_timer.start();
                    }
                    None => z.lerp_timer.stop(),
                }
            }
            ReplicatedField::ZoneHighlight(entity) => {
                z.highlight_target = entity;
                z.highlighting = entity.is_some();
            }
            _ => return Err(mismatch),
        }
        Ok(())
    }

    /// Every replicated field, for bringing a late joiner up to date.
    pub fn full_state(&self) -> Vec<ReplicationUpdate> {
        let mut updates = Vec::new();

        for (id, e) in self.entities.iter() {
            updates.push(ReplicationUpdate::entity(id, ReplicatedField::Owner(e.owner)));
            updates.push(ReplicationUpdate::entity(
                id,
                ReplicatedField::EnableInteract(e.flags.enable_interact),
            ));
            updates.push(ReplicationUpdate::entity(
                id,
                ReplicatedField::HighlightTarget(e.highlight_target),
            ));
            if let Some(grabbable) = e.grabbable {
                updates.push(ReplicationUpdate::entity(
                    id,
                    ReplicatedField::GrabParent(grabbable.grab_parent),
                ));
            }
            if let Some(snappable) = e.snappable {
                updates.push(ReplicationUpdate::entity(
                    id,
                    ReplicatedField::SnapTarget(snappable.snap_target),
                ));
                updates.push(ReplicationUpdate::entity(
                    id,
                    ReplicatedField::SnapParent(snappable.snap_parent),
                ));
            }
        }

        for (id, h) in self.hands.iter() {
            updates.push(ReplicationUpdate::hand(
                id,
                ReplicatedField::HandHighlight(h.highlight_target),
            ));
            updates.push(ReplicationUpdate::hand(
                id,
                ReplicatedField::HandGrabbed(h.grabbed_object),
            ));
        }

        for (id, z) in self.zones.iter() {
            updates.push(ReplicationUpdate::zone(
                id,
                ReplicatedField::ZoneSnapped(z.snapped_object),
            ));
            updates.push(ReplicationUpdate::zone(
                id,
                ReplicatedField::ZoneHighlight(z.highlight_target),
            ));
        }

        updates
    }

    /// Broadcasts [`InteractionWorld::full_state`] through the bridge.
    pub fn sync_late_joiner(&mut self, participant: ParticipantId) -> usize {
        let updates = self.full_state();
        let count = updates.len();
        for update in updates {
            self.replicate(update);
        }
        info!(%participant, fields = count, "late joiner synced");
        count
    }

    /// Every participant runs this locally, so nothing is broadcast. Returns entities freed.
    pub fn participant_left(&mut self, participant: ParticipantId) -> usize {
        let hands: Vec<HandId> = self
            .hands
            .iter()
            .filter(|(_, h)| h.owner == participant)
            .map(|(id, _)| id)
            .collect();
        let owned: Vec<EntityId> = self
            .entities
            .iter()
            .filter(|(_, e)| e.owner == Some(participant))
            .map(|(id, _)| id)
            .collect();

        for &entity in &owned {
            self.release_locally(entity);
        }

        for hand in hands {
            let Some(h) = self.hands.get_mut(hand) else {
                continue;
            };
            h.disabled = true;
            h.grabbing = false;
            h.hold_grab = false;
            h.hold_timer.stop();
            let highlighted = h.highlight_target.take();
            let grabbed = h.grabbed_object.take();
            h.hold_target = None;
            h.snapped_contact = None;

            for entity in highlighted.into_iter().chain(grabbed) {
                self.unlink_entity_from_hand(entity, hand);
            }
        }

        info!(%participant, released = owned.len(), "participant left");
        owned.len()
    }

    fn release_locally(&mut self, entity: EntityId) {
        let Some(e) = self.entities.get_mut(entity) else {
            return;
        };
        let owner = e.owner.take();
        let hand = e.grabbable.as_mut().and_then(|g| {
            g.grabbed = false;
            g.grab_parent.take()
        });
        e.hand_lerp.stop();
        e.pending_joint = None;
        self.drop_candidacy_locally(entity);
        if owner.is_some() {
            self.emit(InteractionEvent::OwnerChanged {
                entity,
                owner: None,
            });
        }

        if let Some(hand) = hand {
            if let Some(h) = self.hands.get_mut(hand) {
                if h.grabbed_object == Some(entity) {
                    h.grabbed_object = None;
                    h.grabbing = false;
                }
            }
            self.destroy_joint(entity);
            self.emit(InteractionEvent::GrabEnd { entity, hand });
        }
    }

    fn unlink_entity_from_hand(&mut self, entity: EntityId, hand: HandId) {
        let Some(e) = self.entities.get_mut(entity) else {
            return;
        };
        if e.highlight_target == Some(hand) {
            e.highlight_target = None;
            e.flags.highlighted = false;
            self.emit(InteractionEvent::HighlightEnd { entity, hand });
        }
        let Some(e) = self.entities.get_mut(entity) else {
            return;
        };
        if e.grab_parent() == Some(hand) {
            if let Some(grabbable) = e.grabbable.as_mut() {
                grabbable.grabbed = false;
                grabbable.grab_parent = None;
            }
            self.drop_candidacy_locally(entity);
            self.destroy_joint(entity);
            self.emit(InteractionEvent::GrabEnd { entity, hand });
        }
    }

    // Both sides of the candidacy, without replicating: either side may be all that arrived.
    fn drop_candidacy_locally(&mut self, entity: EntityId) {
        if let Some(snappable) = self.entities.get_mut(entity).and_then(|e| e.snappable.as_mut()) {
            snappable.snap_target = None;
        }
        let zones: Vec<ZoneId> = self
            .zones
            .iter()
            .filter(|(_, z)| z.highlight_target == Some(entity))
            .map(|(id, _)| id)
            .collect();
        for zone in zones {
            if let Some(z) = self.zones.get_mut(zone) {
                z.highlight_target = None;
                z.highlighting = false;
            }
            self.emit(InteractionEvent::ZoneHighlightEnd { entity, zone });
        }
    }
}
