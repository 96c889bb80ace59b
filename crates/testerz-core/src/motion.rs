use crate::constants::*;
use glam::Vec2;

/// Per-frame rotation deltas for one view's background.
///
/// Deltas are applied once per displayed frame, so the apparent speed follows
/// the display refresh rate rather than wall-clock time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionProfile {
    /// Base particle spin (x, y).
    pub particles: Vec2,
    /// Extra particle drift layered on top of the base spin.
    pub particles_drift: Vec2,
    /// Torus spin (x, y).
    pub torus: Vec2,
}

impl MotionProfile {
    /// Landing page: base spin plus an extra drift on the particle field.
    pub const LANDING: Self = Self {
        particles: Vec2::new(PARTICLE_SPIN, PARTICLE_SPIN),
        particles_drift: Vec2::new(LANDING_DRIFT_X, LANDING_DRIFT_Y),
        torus: Vec2::new(TORUS_SPIN_X, TORUS_SPIN_Y),
    };

    /// Auth page: base spin only.
    pub const AUTH: Self = Self {
        particles: Vec2::new(PARTICLE_SPIN, PARTICLE_SPIN),
        particles_drift: Vec2::ZERO,
        torus: Vec2::new(TORUS_SPIN_X, TORUS_SPIN_Y),
    };

    #[inline]
    pub fn particle_step(&self) -> Vec2 {
        self.particles + self.particles_drift
    }

    /// Look up a profile by the name used in page markup (`landing`, `auth`).
    pub fn named(name: &str) -> Option<Self> {
        match name {
            "landing" => Some(Self::LANDING),
            "auth" => Some(Self::AUTH),
            _ => None,
        }
    }
}

impl Default for MotionProfile {
    fn default() -> Self {
        Self::AUTH
    }
}
