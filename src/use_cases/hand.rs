// Hand-side queries: button presses, hold-to-grab, and the hand volume's trigger contacts.

use super::world::InteractionWorld;
use crate::domain::{
    EntityId, HandId, HandSide, InputAction, InputEvent, InputHand, InteractionEvent, PhysicsHost,
    PressKind, ReplicationBridge,
};
use tracing::{debug, warn};

impl<P, B> InteractionWorld<P, B>
where
    P: PhysicsHost,
    B: ReplicationBridge,
{
    /// Routes a device event to the local hand it addresses.
    pub fn handle_input(&mut self, event: InputEvent) -> bool {
        let side = match event.hand {
            InputHand::Left => HandSide::Left,
            InputHand::Right => HandSide::Right,
            InputHand::None => HandSide::Debug,
        };
        let Some(hand) = self.hand_by_side(self.settings.local, side) else {
            warn!(?side, "input for a hand that is not bound");
            return false;
        };

        match event.action {
            InputAction::Grab => self.grab_query(hand, event.kind),
            InputAction::Use => self.use_query(hand, event.kind),
        }
    }

    pub fn grab_query(&mut self, hand: HandId, kind: PressKind) -> bool {
        match kind {
            PressKind::Down => self.grab_down(hand),
            PressKind::Up => self.grab_up(hand),
            PressKind::Press => {
                debug!(hand = %hand, "grab press has no binding");
                false
            }
        }
    }

    fn grab_down(&mut self, hand: HandId) -> bool {
        let Some(h) = self.hands.get(hand) else {
            return false;
        };
        if h.grabbing || h.disabled {
            return false;
        }
        let Some(target) = h.touched() else {
            return false;
        };
        let Some(e) = self.entities.get(target) else {
            return false;
        };
        if !e.flags.enable_interact {
            return false;
        }

        if e.is_one_shot() {
            return self.request_grab(target, hand, true, false);
        }
        if e.flags.highlight_only {
            return false;
        }

        let hold = e.hold_seconds();
        if hold <= 0.0 {
            return self.request_grab(target, hand, true, false);
        }

        let Some(h) = self.hands.get_mut(hand) else {
            return false;
        };
        h.hold_target = Some(target);
        h.hold_grab = true;
        h.hold_timer.configure(hold, false);
        h.hold_timer.start();
        debug!(hand = %hand, entity = %target, hold, "hold armed");
        true
    }

    fn grab_up(&mut self, hand: HandId) -> bool {
        let Some(h) = self.hands.get(hand) else {
            return false;
        };

        if let Some(held) = h.grabbed_object.filter(|_| h.grabbing) {
            let snap_target = self.entities.get(held).and_then(|e| e.snap_target());
            if !self.request_grab(held, hand, false, true) {
                return false;
            }
            if let Some(zone) = snap_target {
                self.commit_snap(Some(hand), held, zone, true);
            }
            return true;
        }

        self.cancel_hold(hand)
    }

    /// Stops a pending hold without grabbing.
    fn cancel_hold(&mut self, hand: HandId) -> bool {
        let Some(h) = self.hands.get_mut(hand) else {
            return false;
        };
        let was_pending = h.hold_grab || h.hold_target.is_some();
        h.hold_timer.stop();
        h.hold_grab = false;
        h.hold_target = None;
        if was_pending {
            debug!(hand = %hand, "hold cancelled");
        }
        was_pending
    }

    /// Hold timer finished: grab if the hand still touches the entity it started holding.
    pub(crate) fn complete_hold(&mut self, hand: HandId) -> bool {
        let Some(h) = self.hands.get_mut(hand) else {
            return false;
        };
        let target = h.hold_target.take();
        let still_touched = target.is_some() && target == h.touched();
        h.hold_grab = false;

        match target {
            Some(entity) if still_touched => self.request_grab(entity, hand, true, false),
            _ => false,
        }
    }

    /// Drops everything the hand holds, highlights or is waiting on. Safe to call repeatedly.
    pub fn clear_hand(&mut self, hand: HandId) -> bool {
        let Some(h) = self.hands.get(hand) else {
            return false;
        };
        let held = h.grabbed_object;
        let highlighted = h.highlight_target;

        if let Some(entity) = held {
            if !self.request_grab(entity, hand, false, true) {
                // Not ours to release through the normal path; unlink locally.
                self.apply_grab(entity, hand, false, false);
            }
        }
        if let Some(entity) = highlighted {
            self.clear_highlight(entity, hand);
        }
        // A release inside the volume re-highlights; clear that too.
        if let Some(entity) = self.hands.get(hand).and_then(|h| h.highlight_target) {
            self.clear_highlight(entity, hand);
        }

        self.cancel_hold(hand);
        if let Some(h) = self.hands.get_mut(hand) {
            h.snapped_contact = None;
        }
        true
    }

    /// An entity's trigger entered the hand volume.
    pub fn hand_trigger_enter(&mut self, hand: HandId, entity: EntityId) -> bool {
        let Some(e) = self.entities.get(entity) else {
            return false;
        };
        if e.is_snapped() {
            let local = self.settings.local;
            let Some(h) = self.hands.get_mut(hand).filter(|h| h.owner == local) else {
                return false;
            };
            if h.grabbing || h.snapped_contact.is_some() {
                return false;
            }
            h.snapped_contact = Some(entity);
            return true;
        }
        self.request_highlight(entity, hand, true)
    }

    /// An entity's trigger left the hand volume. A pending hold keeps its highlight.
    pub fn hand_trigger_exit(&mut self, hand: HandId, entity: EntityId) -> bool {
        let Some(h) = self.hands.get_mut(hand) else {
            return false;
        };
        if h.snapped_contact == Some(entity) {
            h.snapped_contact = None;
            return true;
        }
        if h.hold_grab && h.hold_target == Some(entity) {
            return false;
        }
        self.request_highlight(entity, hand, false)
    }

    /// Use button on a held useable object.
    pub fn use_query(&mut self, hand: HandId, kind: PressKind) -> bool {
        let Some(h) = self.hands.get(hand) else {
            return false;
        };
        let Some(entity) = h.grabbed_object.filter(|_| h.grabbing) else {
            return false;
        };
        let Some(useable) = self.entities.get_mut(entity).and_then(|e| e.useable.as_mut()) else {
            return false;
        };

        match kind {
            PressKind::Down if !useable.in_use => {
                useable.in_use = true;
                self.emit(InteractionEvent::UseBegin { entity, hand });
                true
            }
            PressKind::Up if useable.in_use => {
                useable.in_use = false;
                self.emit(InteractionEvent::UseEnd { entity, hand });
                true
            }
            _ => false,
        }
    }
}
