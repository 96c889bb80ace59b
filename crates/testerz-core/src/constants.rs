use glam::Vec3;

// Visual tuning constants for the background scene shared by every page that mounts it.

// Particle field
pub const PARTICLE_COUNT: usize = 5000;
pub const PARTICLE_SPREAD: f32 = 15.0; // side of the sampling cube centred at the origin
pub const PARTICLE_SIZE: f32 = 0.005;
pub const PARTICLE_COLOR: u32 = 0x00ff8c;
pub const PARTICLE_OPACITY: f32 = 0.7;

// Wireframe torus
pub const TORUS_RADIUS: f32 = 3.0;
pub const TORUS_TUBE: f32 = 0.8;
pub const TORUS_RADIAL_SEGMENTS: u32 = 16;
pub const TORUS_TUBULAR_SEGMENTS: u32 = 100;
pub const TORUS_COLOR: u32 = 0xff00ff;
pub const TORUS_OPACITY: f32 = 0.2;

// Lighting
pub const AMBIENT_COLOR: u32 = 0x404040;
pub const POINT_LIGHT_COLOR: u32 = 0x00ff8c;
pub const POINT_LIGHT_INTENSITY: f32 = 1.0;
pub const POINT_LIGHT_RANGE: f32 = 100.0;
pub const POINT_LIGHT_POSITION: [f32; 3] = [0.0, 0.0, 5.0];

// Camera
pub const CAMERA_FOV_DEGREES: f32 = 75.0;
pub const CAMERA_NEAR: f32 = 0.1;
pub const CAMERA_FAR: f32 = 1000.0;
pub const CAMERA_Z: f32 = 7.0;

// Per-frame rotation deltas (radians per frame, not per second)
pub const PARTICLE_SPIN: f32 = 0.001;
pub const LANDING_DRIFT_X: f32 = 0.0002;
pub const LANDING_DRIFT_Y: f32 = 0.0005;
pub const TORUS_SPIN_X: f32 = 0.01;
pub const TORUS_SPIN_Y: f32 = 0.015;

// Frames between frame-interval log lines
pub const FRAME_STATS_INTERVAL: u32 = 300;

/// Convert a `0xRRGGBB` colour into `[0, 1]` components.
#[inline]
pub fn rgb(hex: u32) -> Vec3 {
    Vec3::new(
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    )
}

#[inline]
pub fn point_light_position() -> Vec3 {
    Vec3::from_array(POINT_LIGHT_POSITION)
}
