// Structural consistency checks across entities, hands and zones.

use super::world::InteractionWorld;
use crate::domain::{InvariantViolation, PhysicsHost, ReplicationBridge};

impl<P, B> InteractionWorld<P, B>
where
    P: PhysicsHost,
    B: ReplicationBridge,
{
    /// Reports the first broken structural invariant, for tests and diagnostics.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        for (entity, e) in self.entities.iter() {
            if e.flags.highlighted != e.highlight_target.is_some() {
                return Err(InvariantViolation::HighlightFlag { entity });
            }
            if let Some(hand) = e.highlight_target {
                if self.hands.get(hand).is_none_or(|h| h.highlight_target != Some(entity)) {
                    return Err(InvariantViolation::HighlightLink { entity, hand });
                }
            }

            if let Some(grabbable) = e.grabbable {
                if grabbable.grabbed != grabbable.grab_parent.is_some() {
                    return Err(InvariantViolation::GrabbedFlag { entity });
                }
                if let Some(hand) = grabbable.grab_parent {
                    let linked = self
                        .hands
                        .get(hand)
                        .is_some_and(|h| h.grabbing && h.grabbed_object == Some(entity));
                    if !linked {
                        return Err(InvariantViolation::GrabLink { entity, hand });
                    }
                }
            }

            if let Some(snappable) = e.snappable {
                if snappable.snapped != snappable.snap_parent.is_some() {
                    return Err(InvariantViolation::SnappedFlag { entity });
                }
                if let Some(zone) = snappable.snap_parent {
                    if self
                        .zones
                        .get(zone)
                        .is_none_or(|z| z.snapped_object != Some(entity))
                    {
                        return Err(InvariantViolation::SnapLink { entity, zone });
                    }
                }
                if let Some(zone) = snappable.snap_target {
                    if !e.is_grabbed() {
                        return Err(InvariantViolation::UnheldCandidate { entity });
                    }
                    if self
                        .zones
                        .get(zone)
                        .is_none_or(|z| z.highlight_target != Some(entity))
                    {
                        return Err(InvariantViolation::SnapCandidate { entity, zone });
                    }
                }
            }

            if e.is_grabbed() && e.is_snapped() {
                return Err(InvariantViolation::GrabbedAndSnapped { entity });
            }
            if (e.is_grabbed() || e.is_snapped()) && e.is_highlighted() {
                return Err(InvariantViolation::HighlightedWhileHeld { entity });
            }
            if e.joint.is_some_and(|joint| !self.joint_agrees(e, joint.anchor)) {
                return Err(InvariantViolation::OrphanedJoint { entity });
            }
        }

        for (hand, h) in self.hands.iter() {
            if let Some(entity) = h.highlight_target {
                if self
                    .entities
                    .get(entity)
                    .is_none_or(|e| e.highlight_target != Some(hand))
                {
                    return Err(InvariantViolation::HighlightLink { entity, hand });
                }
            }
            if h.grabbing != h.grabbed_object.is_some() {
                return Err(InvariantViolation::GrabbingFlag { hand });
            }
            if let Some(entity) = h.grabbed_object {
                if self
                    .entities
                    .get(entity)
                    .is_none_or(|e| e.grab_parent() != Some(hand))
                {
                    return Err(InvariantViolation::GrabLink { entity, hand });
                }
            }
        }

        for (zone, z) in self.zones.iter() {
            if let Some(entity) = z.snapped_object {
                if self
                    .entities
                    .get(entity)
                    .is_none_or(|e| e.snap_parent() != Some(zone))
                {
                    return Err(InvariantViolation::SnapLink { entity, zone });
                }
            }
            if z.highlighting != z.highlight_target.is_some() {
                return Err(InvariantViolation::ZoneHighlightFlag { zone });
            }
            if let Some(entity) = z.highlight_target {
                if self
                    .entities
                    .get(entity)
                    .is_none_or(|e| e.snap_target() != Some(zone))
                {
                    return Err(InvariantViolation::SnapCandidate { entity, zone });
                }
            }
        }

        Ok(())
    }
}
