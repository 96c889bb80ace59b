//! Browser implementation of the scene host: DOM mount point, canvas renderer
//! and the animation-frame scheduler.

use crate::constants::{MAX_DEVICE_PIXEL_RATIO, SURFACE_MARKER_ATTR};
use crate::frame::AnimationLoop;
use crate::render::SceneGpu;
use rand::rngs::{OsRng, StdRng};
use std::cell::RefCell;
use std::rc::Rc;
use testerz_core::{
    Camera, MountClaims, MountPoint, RendererOptions, Scene, SceneHost, SceneRenderer,
};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

thread_local! {
    // One claim set per page, shared by every host instance.
    static CLAIMS: MountClaims = MountClaims::default();
}

#[derive(Clone)]
pub struct WebHost {
    document: web::Document,
    claims: MountClaims,
}

impl WebHost {
    pub fn new(document: web::Document) -> Self {
        Self {
            document,
            claims: CLAIMS.with(MountClaims::clone),
        }
    }
}

impl SceneHost for WebHost {
    type Surface = web::HtmlCanvasElement;
    type Container = DomContainer;
    type Renderer = CanvasRenderer;
    type Loop = AnimationLoop;

    fn viewport(&self) -> (u32, u32) {
        crate::dom::viewport_size()
    }

    fn find_container(&self, id: &str) -> Option<DomContainer> {
        self.document.get_element_by_id(id).map(DomContainer)
    }

    fn create_renderer(&self, options: &RendererOptions) -> Option<CanvasRenderer> {
        CanvasRenderer::create(&self.document, *options)
    }

    fn claims(&self) -> &MountClaims {
        &self.claims
    }

    fn particle_rng(&self) -> StdRng {
        testerz_core::seed_particles(OsRng, js_sys::Date::now().to_bits())
    }

    fn start_loop(&self, frame: Box<dyn FnMut()>) -> AnimationLoop {
        AnimationLoop::start(frame)
    }
}

pub struct DomContainer(web::Element);

impl MountPoint for DomContainer {
    type Surface = web::HtmlCanvasElement;

    fn contains(&self, surface: &web::HtmlCanvasElement) -> bool {
        let node: &web::Node = surface.as_ref();
        self.0.contains(Some(node))
    }

    fn attach(&self, surface: &web::HtmlCanvasElement) {
        if let Err(e) = self.0.append_child(surface) {
            log::error!("[host] could not attach canvas to #{}: {:?}", self.0.id(), e);
        }
    }

    fn detach(&self, surface: &web::HtmlCanvasElement) {
        if let Err(e) = self.0.remove_child(surface) {
            log::error!("[host] could not detach canvas from #{}: {:?}", self.0.id(), e);
        }
    }
}

enum GpuSlot {
    Pending,
    Ready(SceneGpu),
    Failed,
    Disposed,
}

/// Canvas plus the WebGPU state rendering into it.
///
/// WebGPU setup is asynchronous, so frames rendered before it finishes are
/// skipped. If the renderer is disposed first, the late GPU state is destroyed
/// as soon as it arrives.
pub struct CanvasRenderer {
    canvas: web::HtmlCanvasElement,
    gpu: Rc<RefCell<GpuSlot>>,
}

impl CanvasRenderer {
    fn create(document: &web::Document, options: RendererOptions) -> Option<Self> {
        let canvas = document
            .create_element("canvas")
            .ok()?
            .dyn_into::<web::HtmlCanvasElement>()
            .ok()?;
        _ = canvas.set_attribute(SURFACE_MARKER_ATTR, "");
        let style = canvas.style();
        _ = style.set_property("display", "block");
        _ = style.set_property("pointer-events", "none");
        let renderer = Self {
            canvas,
            gpu: Rc::new(RefCell::new(GpuSlot::Pending)),
        };
        renderer.start_gpu(options);
        Some(renderer)
    }

    fn start_gpu(&self, options: RendererOptions) {
        let canvas = self.canvas.clone();
        let slot = self.gpu.clone();
        spawn_local(async move {
            let result = SceneGpu::new(canvas, options).await;
            let mut slot = slot.borrow_mut();
            let disposed = matches!(*slot, GpuSlot::Disposed);
            match result {
                Ok(gpu) if disposed => gpu.destroy(),
                Ok(gpu) => *slot = GpuSlot::Ready(gpu),
                Err(e) if disposed => {
                    log::debug!("[gpu] init finished after dispose: {:?}", e);
                }
                Err(e) => {
                    log::error!("WebGPU init error: {:?}", e);
                    *slot = GpuSlot::Failed;
                }
            }
        });
    }

    fn backing_size(width: u32, height: u32) -> (u32, u32) {
        let dpr = web::window()
            .map(|w| w.device_pixel_ratio())
            .unwrap_or(1.0)
            .clamp(1.0, MAX_DEVICE_PIXEL_RATIO);
        (
            ((width as f64 * dpr) as u32).max(1),
            ((height as f64 * dpr) as u32).max(1),
        )
    }
}

impl SceneRenderer for CanvasRenderer {
    type Surface = web::HtmlCanvasElement;

    fn surface(&self) -> &web::HtmlCanvasElement {
        &self.canvas
    }

    fn set_size(&mut self, width: u32, height: u32) {
        let (bw, bh) = Self::backing_size(width, height);
        self.canvas.set_width(bw);
        self.canvas.set_height(bh);
        let style = self.canvas.style();
        _ = style.set_property("width", &format!("{width}px"));
        _ = style.set_property("height", &format!("{height}px"));
        if let GpuSlot::Ready(gpu) = &mut *self.gpu.borrow_mut() {
            gpu.resize_if_needed(bw, bh);
        }
    }

    fn render(&mut self, scene: &Scene, camera: &Camera) {
        let mut slot = self.gpu.borrow_mut();
        let GpuSlot::Ready(gpu) = &mut *slot else {
            return;
        };
        gpu.resize_if_needed(self.canvas.width(), self.canvas.height());
        let out_of_memory = match gpu.render(scene, camera) {
            Ok(()) => false,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.reconfigure();
                false
            }
            Err(wgpu::SurfaceError::OutOfMemory) => true,
            Err(e) => {
                log::warn!("render error: {:?}", e);
                false
            }
        };
        if out_of_memory {
            log::error!("render error: out of GPU memory; stopping output");
            if let GpuSlot::Ready(gpu) = std::mem::replace(&mut *slot, GpuSlot::Failed) {
                gpu.destroy();
            }
        }
    }

    fn dispose(&mut self) {
        let previous = std::mem::replace(&mut *self.gpu.borrow_mut(), GpuSlot::Disposed);
        if let GpuSlot::Ready(gpu) = previous {
            gpu.destroy();
        }
        // Zero-size backing store so the browser can drop the canvas' swap chain too.
        self.canvas.set_width(0);
        self.canvas.set_height(0);
    }
}
