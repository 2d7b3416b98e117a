/// Gameplay tuning for grabbing, snapping and throwing.
///
/// Keep this separate from runtime configuration (tick rates, channel sizes, etc.).

#[derive(Debug, Clone, Copy)]
pub struct InteractionTuning {
    /// Seconds an object takes to travel into the hand before the joint is made.
    pub hand_lerp_seconds: f32,

    /// Seconds an object takes to settle into a snapzone.
    pub snap_lerp_seconds: f32,

    /// Hold duration used when a grabbable does not set its own.
    pub default_hold_seconds: f32,

    /// Break force of the hand joint. Zone joints never break.
    pub hand_joint_break_force: f32,

    /// Multiplier applied to the hand velocity when an object is thrown.
    pub throw_velocity_scale: f32,
}

impl Default for InteractionTuning {
    fn default() -> Self {
        Self {
            hand_lerp_seconds: 0.4,
            snap_lerp_seconds: 2.0,
            default_hold_seconds: 0.3,
            hand_joint_break_force: 10_000.0,
            throw_velocity_scale: 1.0,
        }
    }
}
