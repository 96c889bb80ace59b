use crate::constants::MSAA_SAMPLES;
use glam::{Mat4, Vec3};
use testerz_core::{Camera, RendererOptions, Scene};
use web_sys as web;
use wgpu::util::DeviceExt;

mod helpers;

pub static SCENE_WGSL: &str = include_str!("../shaders/scene.wgsl");

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct SceneUniforms {
    view_proj: [[f32; 4]; 4],
    model: [[f32; 4]; 4],
    color: [f32; 4],
    ambient: [f32; 4],
    light_pos: [f32; 4],
    light_color: [f32; 4],
    point: [f32; 4],
}

const POINT_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];
const LINE_ATTRS: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

struct Geometry {
    particle_vb: wgpu::Buffer,
    particle_count: u32,
    torus_vb: wgpu::Buffer,
    torus_ib: wgpu::Buffer,
    torus_index_count: u32,
}

/// GPU side of the background: surface, two pipelines and the uploaded geometry.
pub struct SceneGpu {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    sample_count: u32,
    msaa: Option<(wgpu::Texture, wgpu::TextureView)>,

    points_pipeline: wgpu::RenderPipeline,
    lines_pipeline: wgpu::RenderPipeline,
    points_uniforms: wgpu::Buffer,
    lines_uniforms: wgpu::Buffer,
    points_bind_group: wgpu::BindGroup,
    lines_bind_group: wgpu::BindGroup,
    // Uploaded on the first frame; the scene's geometry never changes afterwards.
    geometry: Option<Geometry>,
}

impl SceneGpu {
    pub async fn new(
        canvas: web::HtmlCanvasElement,
        options: RendererOptions,
    ) -> anyhow::Result<Self> {
        let width = canvas.width().max(1);
        let height = canvas.height().max(1);

        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas))?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("No WebGPU adapter"))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    // Use default limits on web to avoid passing unknown fields to older WebGPU impls
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::MemoryUsage,
                    label: Some("scene_device"),
                },
                None,
            )
            .await
            .map_err(|e| anyhow::anyhow!(format!("request_device error: {:?}", e)))?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| {
                matches!(
                    f,
                    wgpu::TextureFormat::Bgra8Unorm | wgpu::TextureFormat::Rgba8Unorm
                )
            })
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| anyhow::anyhow!("surface reports no texture formats"))?;
        let alpha_mode = if options.transparent
            && caps
                .alpha_modes
                .contains(&wgpu::CompositeAlphaMode::PreMultiplied)
        {
            wgpu::CompositeAlphaMode::PreMultiplied
        } else {
            caps.alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto)
        };
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let sample_count = if options.antialias { MSAA_SAMPLES } else { 1 };
        let msaa = (sample_count > 1).then(|| {
            helpers::create_msaa_target(&device, width, height, format, sample_count)
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(SCENE_WGSL.into()),
        });
        let bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("scene_bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("scene_pl"),
            bind_group_layouts: &[&bgl],
            push_constant_ranges: &[],
        });

        let points_pipeline = helpers::make_scene_pipeline(
            &device,
            &layout,
            &shader,
            format,
            sample_count,
            &helpers::PipelineSpec {
                label: "points_pipeline",
                vs_entry: "vs_points",
                fs_entry: "fs_points",
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Instance,
                    attributes: &POINT_ATTRS,
                }],
                topology: wgpu::PrimitiveTopology::TriangleList,
                blend: helpers::ADDITIVE_BLENDING,
            },
        );
        let lines_pipeline = helpers::make_scene_pipeline(
            &device,
            &layout,
            &shader,
            format,
            sample_count,
            &helpers::PipelineSpec {
                label: "lines_pipeline",
                vs_entry: "vs_lines",
                fs_entry: "fs_lines",
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<testerz_core::TorusVertex>()
                        as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &LINE_ATTRS,
                }],
                topology: wgpu::PrimitiveTopology::LineList,
                blend: wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING,
            },
        );

        let make_uniforms = |label: &str| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size: std::mem::size_of::<SceneUniforms>() as wgpu::BufferAddress,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        };
        let points_uniforms = make_uniforms("points_uniforms");
        let lines_uniforms = make_uniforms("lines_uniforms");
        let make_bind_group = |label: &str, buffer: &wgpu::Buffer| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(label),
                layout: &bgl,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                }],
            })
        };
        let points_bind_group = make_bind_group("points_bg", &points_uniforms);
        let lines_bind_group = make_bind_group("lines_bg", &lines_uniforms);

        log::info!(
            "[gpu] surface {}x{} format={:?} alpha={:?} msaa={}",
            width,
            height,
            format,
            alpha_mode,
            sample_count
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            sample_count,
            msaa,
            points_pipeline,
            lines_pipeline,
            points_uniforms,
            lines_uniforms,
            points_bind_group,
            lines_bind_group,
            geometry: None,
        })
    }

    pub fn resize_if_needed(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        if width == self.config.width && height == self.config.height {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        if self.sample_count > 1 {
            if let Some((tex, _)) = self.msaa.take() {
                tex.destroy();
            }
            self.msaa = Some(helpers::create_msaa_target(
                &self.device,
                width,
                height,
                self.config.format,
                self.sample_count,
            ));
        }
    }

    fn upload_geometry(&mut self, scene: &Scene) {
        if self.geometry.is_some() {
            return;
        }
        let (Some(particles), Some(torus)) = (scene.particles(), scene.torus()) else {
            return;
        };
        let particle_vb = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("particle_vb"),
                contents: bytemuck::cast_slice(particles.positions()),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let torus_vb = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("torus_vb"),
                contents: bytemuck::cast_slice(&torus.geometry.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let torus_ib = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("torus_ib"),
                contents: bytemuck::cast_slice(&torus.geometry.line_indices),
                usage: wgpu::BufferUsages::INDEX,
            });
        self.geometry = Some(Geometry {
            particle_vb,
            particle_count: particles.len() as u32,
            torus_vb,
            torus_ib,
            torus_index_count: torus.geometry.line_indices.len() as u32,
        });
    }

    fn write_uniforms(&self, scene: &Scene, camera: &Camera) {
        let view_proj = camera.view_projection().to_cols_array_2d();
        let ambient = scene
            .ambient_light()
            .map(|l| l.color)
            .unwrap_or(Vec3::ZERO)
            .extend(0.0)
            .to_array();
        let (light_pos, light_color) = match scene.point_light() {
            Some(l) => (
                l.position.extend(l.range).to_array(),
                l.color.extend(l.intensity).to_array(),
            ),
            None => ([0.0, 0.0, 0.0, 1.0], [0.0; 4]),
        };
        let pack = |model: Mat4, color: Vec3, opacity: f32, point: [f32; 4]| SceneUniforms {
            view_proj,
            model: model.to_cols_array_2d(),
            color: color.extend(opacity).to_array(),
            ambient,
            light_pos,
            light_color,
            point,
        };
        if let Some(p) = scene.particles() {
            let (width, height) = (self.config.width, self.config.height);
            let point = [
                p.material.attenuation_scale(height),
                width as f32,
                height as f32,
                0.0,
            ];
            let u = pack(p.rotation.matrix(), p.material.color, p.material.opacity, point);
            self.queue
                .write_buffer(&self.points_uniforms, 0, bytemuck::bytes_of(&u));
        }
        if let Some(t) = scene.torus() {
            let u = pack(t.rotation.matrix(), t.material.color, t.material.opacity, [0.0; 4]);
            self.queue
                .write_buffer(&self.lines_uniforms, 0, bytemuck::bytes_of(&u));
        }
    }

    pub fn render(&mut self, scene: &Scene, camera: &Camera) -> Result<(), wgpu::SurfaceError> {
        self.upload_geometry(scene);
        self.write_uniforms(scene, camera);

        let frame = self.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("scene_encoder"),
            });
        {
            let (target, resolve_target, store) = match &self.msaa {
                Some((_, msaa_view)) => (msaa_view, Some(&view), wgpu::StoreOp::Discard),
                None => (&view, None, wgpu::StoreOp::Store),
            };
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            if let Some(g) = &self.geometry {
                if scene.particles().is_some() {
                    rpass.set_pipeline(&self.points_pipeline);
                    rpass.set_bind_group(0, &self.points_bind_group, &[]);
                    rpass.set_vertex_buffer(0, g.particle_vb.slice(..));
                    rpass.draw(0..6, 0..g.particle_count);
                }
                if scene.torus().is_some() {
                    rpass.set_pipeline(&self.lines_pipeline);
                    rpass.set_bind_group(0, &self.lines_bind_group, &[]);
                    rpass.set_vertex_buffer(0, g.torus_vb.slice(..));
                    rpass.set_index_buffer(g.torus_ib.slice(..), wgpu::IndexFormat::Uint32);
                    rpass.draw_indexed(0..g.torus_index_count, 0, 0..1);
                }
            }
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }

    /// Reconfigure after the surface was lost or went stale.
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    /// Free every GPU allocation now instead of waiting for garbage collection.
    pub fn destroy(self) {
        if let Some(g) = &self.geometry {
            g.particle_vb.destroy();
            g.torus_vb.destroy();
            g.torus_ib.destroy();
        }
        if let Some((tex, _)) = &self.msaa {
            tex.destroy();
        }
        self.points_uniforms.destroy();
        self.lines_uniforms.destroy();
        self.device.destroy();
        log::info!("[gpu] resources released");
    }
}
