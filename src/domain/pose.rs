use glam::{EulerRot, Quat, Vec3};

/// World-space position and orientation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Pose {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
        }
    }

    /// Linear position, spherical rotation.
    pub fn lerp(self, to: Pose, t: f32) -> Pose {
        let t = t.clamp(0.0, 1.0);
        Pose {
            position: self.position.lerp(to.position, t),
            rotation: self.rotation.slerp(to.rotation, t),
        }
    }

    /// Applies a local offset expressed in this pose's frame.
    pub fn transform(self, offset: Pose) -> Pose {
        Pose {
            position: self.position + self.rotation * offset.position,
            rotation: (self.rotation * offset.rotation).normalize(),
        }
    }
}

/// Per-axis rotation bounds in radians, as XYZ Euler angles relative to some zero orientation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationLimits {
    pub min: Vec3,
    pub max: Vec3,
}

impl RotationLimits {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Locks every axis except one, which may swing within `min..=max`.
    pub fn hinge(axis: Vec3, min: f32, max: f32) -> Self {
        Self {
            min: axis * min,
            max: axis * max,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min.cmple(self.max).all()
    }

    pub fn clamp(&self, local: Quat) -> Quat {
        let (x, y, z) = local.to_euler(EulerRot::XYZ);
        let clamped = Vec3::new(x, y, z).clamp(self.min, self.max);
        Quat::from_euler(EulerRot::XYZ, clamped.x, clamped.y, clamped.z)
    }
}

/// Tracked controller velocity, used for throws.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Motion {
    pub linear: Vec3,
    pub angular: Vec3,
}

impl Motion {
    pub fn scaled(self, factor: f32) -> Self {
        Self {
            linear: self.linear * factor,
            angular: self.angular * factor,
        }
    }
}
