// Throw on VR release and the thrown marker that lives until the object lands.

use super::world::InteractionWorld;
use crate::domain::{
    CollisionLayer, EntityId, HandId, InteractionEvent, PhysicsHost, ReplicationBridge,
    ThrownMarker,
};
use tracing::{debug, info};

impl<P, B> InteractionWorld<P, B>
where
    P: PhysicsHost,
    B: ReplicationBridge,
{
    /// Hands the tracked hand velocity to a just-released body and marks it as in flight.
    pub(crate) fn throw(&mut self, entity: EntityId, hand: HandId) {
        let Some(motion) = self.hands.get(hand).map(|h| h.motion) else {
            return;
        };
        let scale = self.settings.tuning.throw_velocity_scale;
        let thrower = self.settings.local;
        let Some(e) = self.entities.get_mut(entity) else {
            return;
        };
        let (Some(body), Some(throwable)) = (e.physics, e.throwable.as_mut()) else {
            return;
        };

        throwable.thrown = Some(ThrownMarker { hand, thrower });
        self.physics.set_velocity(body.body, motion.scaled(scale));
        // The hand stays ignored until the marker goes, so the body clears the fingers.
        self.physics.set_layer(body.collider, CollisionLayer::Thrown);

        self.emit(InteractionEvent::Thrown { entity, hand });
        info!(entity = %entity, hand = %hand, "thrown");
    }

    /// Lands a thrown body: normal layer, collides with the throwing hand again.
    pub(crate) fn remove_thrown_marker(&mut self, entity: EntityId) -> bool {
        let Some(e) = self.entities.get_mut(entity) else {
            return false;
        };
        let Some(marker) = e.throwable.as_mut().and_then(|t| t.thrown.take()) else {
            return false;
        };
        if let Some(body) = e.physics {
            self.physics
                .set_layer(body.collider, CollisionLayer::Interactable);
        }
        self.set_hand_collision(entity, marker.hand, false);
        debug!(entity = %entity, "thrown marker removed");
        true
    }

    /// Physics reported a collision for the entity's body.
    pub fn on_collision(&mut self, entity: EntityId) -> bool {
        self.remove_thrown_marker(entity)
    }
}
