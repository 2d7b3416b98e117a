// Interaction world: owns every record, the physics host and the replication bridge.
//
// Transitions live in sibling modules as further `impl` blocks. All of them run on the
// single simulation task, so state is mutated in place without locking.

use crate::domain::{
    Arena, ConfigError, EntityDesc, EntityId, GrabPoint, HandDesc, HandId, HandSide,
    InteractionEvent, InteractionTuning, Interactable, Motion, ParticipantId, PhysicsHost, Pose,
    ReplicatedField, ReplicationBridge, ReplicationUpdate, Snapzone, SnapzoneDesc,
    SubscriptionId, ZoneId,
};
use tracing::{debug, error, info};

#[derive(Debug, Clone, Copy)]
pub struct WorldSettings {
    pub local: ParticipantId,
    /// Throwing only happens with tracked controllers.
    pub vr_active: bool,
    pub tuning: InteractionTuning,
}

impl WorldSettings {
    pub fn new(local: ParticipantId) -> Self {
        Self {
            local,
            vr_active: false,
            tuning: InteractionTuning::default(),
        }
    }
}

pub struct InteractionWorld<P, B> {
    pub(crate) settings: WorldSettings,
    pub(crate) entities: Arena<EntityId, Interactable>,
    pub(crate) hands: Arena<HandId, GrabPoint>,
    pub(crate) zones: Arena<ZoneId, Snapzone>,
    pub(crate) physics: P,
    pub(crate) bridge: B,
    journal: Vec<InteractionEvent>,
    torn_down: bool,
}

impl<P, B> InteractionWorld<P, B>
where
    P: PhysicsHost,
    B: ReplicationBridge,
{
    pub fn new(settings: WorldSettings, physics: P, bridge: B) -> Self {
        Self {
            settings,
            entities: Arena::new(),
            hands: Arena::new(),
            zones: Arena::new(),
            physics,
            bridge,
            journal: Vec::new(),
            torn_down: false,
        }
    }

    // Accessors.

    pub fn local(&self) -> ParticipantId {
        self.settings.local
    }

    pub fn settings(&self) -> &WorldSettings {
        &self.settings
    }

    pub fn entity(&self, id: EntityId) -> Option<&Interactable> {
        self.entities.get(id)
    }

    pub fn hand(&self, id: HandId) -> Option<&GrabPoint> {
        self.hands.get(id)
    }

    pub fn zone(&self, id: ZoneId) -> Option<&Snapzone> {
        self.zones.get(id)
    }

    pub fn entity_ids(&self) -> Vec<EntityId> {
        self.entities.ids()
    }

    pub fn hand_by_side(&self, owner: ParticipantId, side: HandSide) -> Option<HandId> {
        self.hands
            .iter()
            .find(|(_, hand)| hand.owner == owner && hand.side == side)
            .map(|(id, _)| id)
    }

    pub fn physics(&self) -> &P {
        &self.physics
    }

    pub fn physics_mut(&mut self) -> &mut P {
        &mut self.physics
    }

    pub fn bridge(&self) -> &B {
        &self.bridge
    }

    pub fn bridge_mut(&mut self) -> &mut B {
        &mut self.bridge
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Takes every event fired since the last drain.
    pub fn drain_events(&mut self) -> Vec<InteractionEvent> {
        std::mem::take(&mut self.journal)
    }

    // Spawning.

    pub fn spawn_hand(&mut self, desc: HandDesc) -> Result<HandId, ConfigError> {
        if self.hand_by_side(desc.owner, desc.side).is_some() {
            let err = ConfigError::DuplicateHand {
                owner: desc.owner,
                side: desc.side,
            };
            error!(error = %err, "hand rejected");
            return Err(err);
        }

        let id = self.hands.insert_with(|id| desc.build(id));
        info!(hand = %id, side = ?desc.side, owner = %desc.owner, "hand spawned");
        Ok(id)
    }

    pub fn spawn_entity(&mut self, desc: EntityDesc) -> Result<EntityId, ConfigError> {
        let tuning = self.settings.tuning;
        let id = self
            .entities
            .try_insert_with(|id| desc.build(id, &tuning))
            .inspect_err(|e| error!(error = %e, "entity rejected"))?;

        if let Some(body) = self.entities.get(id).and_then(|e| e.physics) {
            self.physics
                .set_layer(body.collider, crate::domain::CollisionLayer::Interactable);
        }
        debug!(entity = %id, "entity spawned");
        Ok(id)
    }

    /// Marks network spawn as complete. Zones waiting to pre-place this entity do so now.
    pub fn initialize(&mut self, id: EntityId) -> bool {
        let Some(entity) = self.entities.get_mut(id) else {
            return false;
        };
        if entity.initialized {
            return false;
        }
        entity.initialized = true;
        self.emit(InteractionEvent::Initialized { entity: id });

        let waiting: Vec<ZoneId> = self
            .zones
            .iter()
            .filter(|(_, zone)| zone.presnap == Some(id))
            .map(|(zone_id, _)| zone_id)
            .collect();
        for zone in waiting {
            self.try_presnap(zone);
        }
        true
    }

    pub fn spawn_zone(&mut self, desc: SnapzoneDesc) -> Result<ZoneId, ConfigError> {
        if let Some(presnap) = desc.presnap {
            let snappable = self
                .entities
                .get(presnap)
                .is_some_and(|e| e.snappable.is_some());
            if !snappable {
                let err = ConfigError::InvalidPresnapTarget {
                    zone: desc.name,
                    entity: presnap,
                };
                error!(error = %err, "snapzone rejected");
                return Err(err);
            }
        }

        let tuning = self.settings.tuning;
        let id = self.zones.insert_with(|id| desc.build(id, &tuning));
        debug!(zone = %id, "snapzone spawned");
        self.try_presnap(id);
        Ok(id)
    }

    // Lifecycle.

    /// Returns an entity to its spawn state: interactable, unowned, free.
    pub fn reset_entity(&mut self, id: EntityId, clear_hands: bool) -> bool {
        let Some(entity) = self.entities.get(id) else {
            return false;
        };
        let grab_parent = entity.grab_parent();
        let snap_parent = entity.snap_parent();

        if let Some(hand) = grab_parent {
            self.apply_grab(id, hand, false, false);
        }
        if let Some(zone) = snap_parent {
            self.apply_snap(None, id, zone, false);
        }
        self.clear_snap_candidate(id);
        self.clear_entity_highlight(id);
        self.remove_thrown_marker(id);
        self.destroy_joint(id);
        self.set_enable_interact(id, true);
        self.set_owner(id, None);

        if let Some(entity) = self.entities.get_mut(id) {
            entity.hand_lerp.stop();
            entity.pending_joint = None;
            if let Some(useable) = entity.useable.as_mut() {
                useable.in_use = false;
            }
        }

        if clear_hands {
            let local = self.settings.local;
            let hands: Vec<HandId> = self
                .hands
                .iter()
                .filter(|(_, hand)| hand.owner == local)
                .map(|(id, _)| id)
                .collect();
            for hand in hands {
                self.clear_hand(hand);
            }
        }

        info!(entity = %id, "entity reset");
        true
    }

    /// Releases, unsnaps and removes an entity. Its timers, joint and observers go with it.
    pub fn despawn_entity(&mut self, id: EntityId) -> bool {
        if !self.reset_entity(id, false) {
            return false;
        }

        for (_, hand) in self.hands.iter_mut() {
            if hand.highlight_target == Some(id) {
                hand.highlight_target = None;
            }
            if hand.snapped_contact == Some(id) {
                hand.snapped_contact = None;
            }
            if hand.hold_target == Some(id) {
                hand.hold_target = None;
                hand.hold_grab = false;
                hand.hold_timer.stop();
            }
        }
        for (_, zone) in self.zones.iter_mut() {
            if zone.presnap == Some(id) {
                zone.presnap = None;
            }
        }

        self.entities.remove(id);
        info!(entity = %id, "entity despawned");
        true
    }

    /// Scene teardown. Destroys every joint and drops every record and listener; runs once.
    pub fn teardown(&mut self) -> bool {
        if self.torn_down {
            return false;
        }
        self.torn_down = true;

        for (_, entity) in self.entities.iter_mut() {
            if let Some(joint) = entity.joint.take() {
                self.physics.destroy_joint(joint.id);
            }
            entity.hand_lerp.configure(0.0, true);
            entity.observers.clear();
        }
        for (_, hand) in self.hands.iter_mut() {
            hand.hold_timer.configure(0.0, true);
        }
        for (_, zone) in self.zones.iter_mut() {
            zone.lerp_timer.configure(0.0, true);
            zone.observers.clear();
        }

        self.entities.clear();
        self.hands.clear();
        self.zones.clear();
        info!("interaction scene torn down");
        true
    }

    // Observers.

    pub fn subscribe(
        &mut self,
        entity: EntityId,
        callback: impl FnMut(&InteractionEvent) + Send + 'static,
    ) -> Option<SubscriptionId> {
        self.entities
            .get_mut(entity)
            .map(|e| e.observers.subscribe(callback))
    }

    pub fn subscribe_zone(
        &mut self,
        zone: ZoneId,
        callback: impl FnMut(&InteractionEvent) + Send + 'static,
    ) -> Option<SubscriptionId> {
        self.zones
            .get_mut(zone)
            .map(|z| z.observers.subscribe(callback))
    }

    pub fn unsubscribe(&mut self, entity: EntityId, subscription: SubscriptionId) -> bool {
        self.entities
            .get_mut(entity)
            .is_some_and(|e| e.observers.unsubscribe(subscription))
    }

    pub fn unsubscribe_zone(&mut self, zone: ZoneId, subscription: SubscriptionId) -> bool {
        self.zones
            .get_mut(zone)
            .is_some_and(|z| z.observers.unsubscribe(subscription))
    }

    // Direct controls.

    pub fn set_interactable(&mut self, id: EntityId, enabled: bool) -> bool {
        if !self.entities.contains(id) {
            return false;
        }
        self.set_enable_interact(id, enabled);
        true
    }

    pub fn set_hand_disabled(&mut self, id: HandId, disabled: bool) -> bool {
        let Some(hand) = self.hands.get_mut(id) else {
            return false;
        };
        hand.disabled = disabled;
        true
    }

    pub fn update_hand_tracking(&mut self, id: HandId, pose: Pose, motion: Motion) -> bool {
        let Some(hand) = self.hands.get_mut(id) else {
            return false;
        };
        hand.pose = pose;
        hand.motion = motion;
        true
    }

    // Internal helpers shared by the transition modules.

    pub(crate) fn emit(&mut self, event: InteractionEvent) {
        debug!(?event, "interaction event");
        if let Some(entity) = self.entities.get_mut(event.entity()) {
            entity.observers.emit(&event);
        }
        if let Some(zone) = event.zone().and_then(|z| self.zones.get_mut(z)) {
            zone.observers.emit(&event);
        }
        self.journal.push(event);
    }

    pub(crate) fn replicate(&mut self, update: ReplicationUpdate) {
        self.bridge.broadcast(update);
    }

    /// The local participant may drive `entity` through `hand`.
    pub(crate) fn has_authority(&self, entity: &Interactable, hand: &GrabPoint) -> bool {
        let local = self.settings.local;
        hand.owner == local && entity.owner.is_none_or(|owner| owner == local)
    }

    pub(crate) fn entity_authority(&self, entity: &Interactable) -> bool {
        entity.owner.is_none_or(|owner| owner == self.settings.local)
    }

    // Replicated setters. Each broadcasts only when the value actually changes.

    pub(crate) fn set_owner(&mut self, id: EntityId, owner: Option<ParticipantId>) {
        let Some(entity) = self.entities.get_mut(id) else {
            return;
        };
        if entity.owner == owner {
            return;
        }
        entity.owner = owner;
        self.replicate(ReplicationUpdate::entity(id, ReplicatedField::Owner(owner)));
        self.emit(InteractionEvent::OwnerChanged { entity: id, owner });
    }

    pub(crate) fn set_enable_interact(&mut self, id: EntityId, enabled: bool) {
        let Some(entity) = self.entities.get_mut(id) else {
            return;
        };
        if entity.flags.enable_interact == enabled {
            return;
        }
        entity.flags.enable_interact = enabled;
        self.replicate(ReplicationUpdate::entity(
            id,
            ReplicatedField::EnableInteract(enabled),
        ));
    }

    pub(crate) fn set_entity_highlight(&mut self, id: EntityId, hand: Option<HandId>) {
        let Some(entity) = self.entities.get_mut(id) else {
            return;
        };
        entity.flags.highlighted = hand.is_some();
        if entity.highlight_target == hand {
            return;
        }
        entity.highlight_target = hand;
        self.replicate(ReplicationUpdate::entity(
            id,
            ReplicatedField::HighlightTarget(hand),
        ));
    }

    pub(crate) fn set_hand_highlight(&mut self, id: HandId, entity: Option<EntityId>) {
        let Some(hand) = self.hands.get_mut(id) else {
            return;
        };
        if hand.highlight_target == entity {
            return;
        }
        hand.highlight_target = entity;
        self.replicate(ReplicationUpdate::hand(
            id,
            ReplicatedField::HandHighlight(entity),
        ));
    }

    pub(crate) fn set_body_gravity(&mut self, id: EntityId, enabled: bool) {
        let Some(body) = self.entities.get_mut(id).and_then(|e| e.physics.as_mut()) else {
            return;
        };
        if body.uses_gravity != enabled {
            body.uses_gravity = enabled;
            self.physics.set_gravity(body.body, enabled);
        }
    }

    pub(crate) fn set_grab_parent(&mut self, id: EntityId, hand: Option<HandId>) {
        let Some(grabbable) = self.entities.get_mut(id).and_then(|e| e.grabbable.as_mut()) else {
            return;
        };
        grabbable.grabbed = hand.is_some();
        if grabbable.grab_parent == hand {
            return;
        }
        grabbable.grab_parent = hand;
        self.replicate(ReplicationUpdate::entity(id, ReplicatedField::GrabParent(hand)));
    }

    pub(crate) fn set_hand_grabbed(&mut self, id: HandId, entity: Option<EntityId>) {
        let Some(hand) = self.hands.get_mut(id) else {
            return;
        };
        hand.grabbing = entity.is_some();
        if hand.grabbed_object == entity {
            return;
        }
        hand.grabbed_object = entity;
        self.replicate(ReplicationUpdate::hand(id, ReplicatedField::HandGrabbed(entity)));
    }

    pub(crate) fn set_snap_target(&mut self, id: EntityId, zone: Option<ZoneId>) {
        let Some(snappable) = self.entities.get_mut(id).and_then(|e| e.snappable.as_mut()) else {
            return;
        };
        if snappable.snap_target == zone {
            return;
        }
        snappable.snap_target = zone;
        self.replicate(ReplicationUpdate::entity(id, ReplicatedField::SnapTarget(zone)));
    }

    pub(crate) fn set_snap_parent(&mut self, id: EntityId, zone: Option<ZoneId>) {
        let Some(snappable) = self.entities.get_mut(id).and_then(|e| e.snappable.as_mut()) else {
            return;
        };
        snappable.snapped = zone.is_some();
        if snappable.snap_parent == zone {
            return;
        }
        snappable.snap_parent = zone;
        self.replicate(ReplicationUpdate::entity(id, ReplicatedField::SnapParent(zone)));
    }

    pub(crate) fn set_zone_snapped(&mut self, id: ZoneId, entity: Option<EntityId>) {
        let Some(zone) = self.zones.get_mut(id) else {
            return;
        };
        zone.snapping = entity.is_some();
        if zone.snapped_object == entity {
            return;
        }
        zone.snapped_object = entity;
        self.replicate(ReplicationUpdate::zone(id, ReplicatedField::ZoneSnapped(entity)));
    }

    pub(crate) fn set_zone_highlight(&mut self, id: ZoneId, entity: Option<EntityId>) {
        let Some(zone) = self.zones.get_mut(id) else {
            return;
        };
        zone.highlighting = entity.is_some();
        if zone.highlight_target == entity {
            return;
        }
        zone.highlight_target = entity;
        self.replicate(ReplicationUpdate::zone(
            id,
            ReplicatedField::ZoneHighlight(entity),
        ));
    }
}
