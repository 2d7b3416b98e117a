// Highlight relation between a hand and the entity it would act on.

use super::world::InteractionWorld;
use crate::domain::{EntityId, HandId, InteractionEvent, PhysicsHost, ReplicationBridge};
use tracing::debug;

impl<P, B> InteractionWorld<P, B>
where
    P: PhysicsHost,
    B: ReplicationBridge,
{
    /// Links or unlinks a hand and an entity as highlight partners. Illegal requests return `false`.
    pub fn request_highlight(&mut self, entity: EntityId, hand: HandId, on: bool) -> bool {
        let (Some(e), Some(h)) = (self.entities.get(entity), self.hands.get(hand)) else {
            return false;
        };
        if !e.initialized || !e.flags.enable_interact || !self.has_authority(e, h) {
            return false;
        }

        if !on {
            if e.highlight_target != Some(hand) {
                return false;
            }
            self.clear_highlight(entity, hand);
            return true;
        }

        if e.is_grabbed() || e.is_snapped() || e.highlight_target.is_some() {
            return false;
        }
        if h.grabbing || h.disabled {
            return false;
        }

        if let Some(previous) = h.highlight_target.filter(|prev| *prev != entity) {
            self.clear_highlight(previous, hand);
        }

        self.set_entity_highlight(entity, Some(hand));
        self.set_hand_highlight(hand, Some(entity));
        self.emit(InteractionEvent::HighlightBegin { entity, hand });
        debug!(entity = %entity, hand = %hand, "highlighted");
        true
    }

    /// Clears both sides of a highlight link, whichever side still points at the other.
    pub(crate) fn clear_highlight(&mut self, entity: EntityId, hand: HandId) {
        let entity_linked = self
            .entities
            .get(entity)
            .is_some_and(|e| e.highlight_target == Some(hand));
        let hand_linked = self
            .hands
            .get(hand)
            .is_some_and(|h| h.highlight_target == Some(entity));

        if entity_linked {
            self.set_entity_highlight(entity, None);
        }
        if hand_linked {
            self.set_hand_highlight(hand, None);
        }
        if entity_linked || hand_linked {
            self.emit(InteractionEvent::HighlightEnd { entity, hand });
        }
    }

    /// Clears whatever hand highlights `entity`.
    pub(crate) fn clear_entity_highlight(&mut self, entity: EntityId) {
        let Some(hand) = self.entities.get(entity).and_then(|e| e.highlight_target) else {
            return;
        };
        self.clear_highlight(entity, hand);
    }
}
