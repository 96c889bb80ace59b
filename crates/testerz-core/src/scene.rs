//! Scene graph for the animated background.
//!
//! The scene is deliberately flat: a handful of nodes (one particle field, one
//! wireframe torus, two lights) held in a small inline vector. Geometry is
//! generated on the CPU once and handed to the renderer as plain data.

use crate::constants::*;
use crate::motion::MotionProfile;
use glam::{EulerRot, Mat4, Vec2, Vec3};
use rand::Rng;
use smallvec::SmallVec;
use std::f32::consts::TAU;

/// Accumulated rotation about the x and y axes, wrapped into `[0, 2π)`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rotation {
    pub x: f32,
    pub y: f32,
}

impl Rotation {
    #[inline]
    pub fn advance(&mut self, delta: Vec2) {
        self.x = (self.x + delta.x).rem_euclid(TAU);
        self.y = (self.y + delta.y).rem_euclid(TAU);
    }

    /// Model matrix with x applied before y (intrinsic XYZ order).
    #[inline]
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_euler(EulerRot::XYZ, self.x, self.y, 0.0)
    }
}

/// Point material rendered with additive blending.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointsMaterial {
    pub color: Vec3,
    pub opacity: f32,
    pub size: f32,
}

impl PointsMaterial {
    /// Perspective attenuation factor for a drawing buffer `viewport_height` pixels tall.
    #[inline]
    pub fn attenuation_scale(&self, viewport_height: u32) -> f32 {
        self.size * viewport_height as f32 * 0.5
    }

    /// Sprite diameter in pixels at clip-space depth `w`, never below one pixel.
    #[inline]
    pub fn pixel_size(&self, viewport_height: u32, w: f32) -> f32 {
        (self.attenuation_scale(viewport_height) / w.max(1e-4)).max(1.0)
    }
}

#[derive(Clone, Debug)]
pub struct ParticleField {
    positions: Vec<Vec3>,
    pub material: PointsMaterial,
    pub rotation: Rotation,
}

impl ParticleField {
    /// Sample `count` points uniformly inside a cube of side `spread` centred at the origin.
    pub fn generate<R: Rng + ?Sized>(count: usize, spread: f32, rng: &mut R) -> Self {
        let mut coord = || (rng.gen::<f32>() - 0.5) * spread;
        let positions = (0..count)
            .map(|_| {
                let x = coord();
                let y = coord();
                let z = coord();
                Vec3::new(x, y, z)
            })
            .collect();
        Self {
            positions,
            material: PointsMaterial {
                color: rgb(PARTICLE_COLOR),
                opacity: PARTICLE_OPACITY,
                size: PARTICLE_SIZE,
            },
            rotation: Rotation::default(),
        }
    }

    #[inline]
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TorusVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

/// Torus surface laid out as a `(radial + 1) x (tubular + 1)` vertex grid, with a
/// line-list index buffer holding the three edges of every triangle.
#[derive(Clone, Debug)]
pub struct TorusGeometry {
    pub radius: f32,
    pub tube: f32,
    pub radial_segments: u32,
    pub tubular_segments: u32,
    pub vertices: Vec<TorusVertex>,
    pub line_indices: Vec<u32>,
}

impl TorusGeometry {
    pub fn new(radius: f32, tube: f32, radial_segments: u32, tubular_segments: u32) -> Self {
        let radial = radial_segments.max(2);
        let tubular = tubular_segments.max(3);
        let mut vertices = Vec::with_capacity(((radial + 1) * (tubular + 1)) as usize);
        for j in 0..=radial {
            let v = j as f32 / radial as f32 * TAU;
            for i in 0..=tubular {
                let u = i as f32 / tubular as f32 * TAU;
                let ring = radius + tube * v.cos();
                let position = Vec3::new(ring * u.cos(), ring * u.sin(), tube * v.sin());
                let center = Vec3::new(radius * u.cos(), radius * u.sin(), 0.0);
                let normal = (position - center).normalize_or_zero();
                vertices.push(TorusVertex {
                    position: position.to_array(),
                    normal: normal.to_array(),
                });
            }
        }

        let stride = tubular + 1;
        let mut line_indices = Vec::with_capacity((radial * tubular * 12) as usize);
        for j in 1..=radial {
            for i in 1..=tubular {
                let a = stride * j + i - 1;
                let b = stride * (j - 1) + i - 1;
                let c = stride * (j - 1) + i;
                let d = stride * j + i;
                for [p, q, r] in [[a, b, d], [b, c, d]] {
                    line_indices.extend_from_slice(&[p, q, q, r, r, p]);
                }
            }
        }

        Self {
            radius,
            tube,
            radial_segments: radial,
            tubular_segments: tubular,
            vertices,
            line_indices,
        }
    }
}

/// Translucent wireframe material lit by the scene lights.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WireframeMaterial {
    pub color: Vec3,
    pub opacity: f32,
}

#[derive(Clone, Debug)]
pub struct WireframeTorus {
    pub geometry: TorusGeometry,
    pub material: WireframeMaterial,
    pub rotation: Rotation,
}

impl WireframeTorus {
    pub fn background() -> Self {
        Self {
            geometry: TorusGeometry::new(
                TORUS_RADIUS,
                TORUS_TUBE,
                TORUS_RADIAL_SEGMENTS,
                TORUS_TUBULAR_SEGMENTS,
            ),
            material: WireframeMaterial {
                color: rgb(TORUS_COLOR),
                opacity: TORUS_OPACITY,
            },
            rotation: Rotation::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AmbientLight {
    pub color: Vec3,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointLight {
    pub color: Vec3,
    pub intensity: f32,
    pub range: f32,
    pub position: Vec3,
}

impl Default for AmbientLight {
    fn default() -> Self {
        Self {
            color: rgb(AMBIENT_COLOR),
        }
    }
}

impl Default for PointLight {
    fn default() -> Self {
        Self {
            color: rgb(POINT_LIGHT_COLOR),
            intensity: POINT_LIGHT_INTENSITY,
            range: POINT_LIGHT_RANGE,
            position: point_light_position(),
        }
    }
}

#[derive(Clone, Debug)]
pub enum SceneNode {
    Particles(ParticleField),
    Torus(WireframeTorus),
    Ambient(AmbientLight),
    Point(PointLight),
}

#[derive(Clone, Debug, Default)]
pub struct Scene {
    nodes: SmallVec<[SceneNode; 4]>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard background: particles, torus, ambient light and point light.
    pub fn background<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut scene = Self::new();
        scene.add(SceneNode::Particles(ParticleField::generate(
            PARTICLE_COUNT,
            PARTICLE_SPREAD,
            rng,
        )));
        scene.add(SceneNode::Torus(WireframeTorus::background()));
        scene.add(SceneNode::Ambient(AmbientLight::default()));
        scene.add(SceneNode::Point(PointLight::default()));
        scene
    }

    pub fn add(&mut self, node: SceneNode) {
        self.nodes.push(node);
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[SceneNode] {
        &self.nodes
    }

    pub fn particles(&self) -> Option<&ParticleField> {
        self.nodes.iter().find_map(|n| match n {
            SceneNode::Particles(p) => Some(p),
            _ => None,
        })
    }

    pub fn torus(&self) -> Option<&WireframeTorus> {
        self.nodes.iter().find_map(|n| match n {
            SceneNode::Torus(t) => Some(t),
            _ => None,
        })
    }

    pub fn ambient_light(&self) -> Option<&AmbientLight> {
        self.nodes.iter().find_map(|n| match n {
            SceneNode::Ambient(l) => Some(l),
            _ => None,
        })
    }

    pub fn point_light(&self) -> Option<&PointLight> {
        self.nodes.iter().find_map(|n| match n {
            SceneNode::Point(l) => Some(l),
            _ => None,
        })
    }

    /// Apply one frame of motion to every animated node.
    pub fn advance(&mut self, profile: &MotionProfile) {
        for node in self.nodes.iter_mut() {
            match node {
                SceneNode::Particles(p) => p.rotation.advance(profile.particle_step()),
                SceneNode::Torus(t) => t.rotation.advance(profile.torus),
                SceneNode::Ambient(_) | SceneNode::Point(_) => {}
            }
        }
    }
}
