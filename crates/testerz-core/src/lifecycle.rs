//! Lifecycle of the animated background bound to a hosting view.
//!
//! A [`SceneLifecycle`] goes `Uninitialized -> Running -> TornDown`. The host
//! (browser DOM in production, fakes in tests) supplies the mount point, the
//! renderer and the frame scheduler through [`SceneHost`].
//!
//! [`BackgroundScene`] ties a lifecycle to its animation loop: the loop handle is
//! cancelled before the renderer is disposed, and dropping the handle tears the
//! whole thing down.

use crate::camera::Camera;
use crate::constants::FRAME_STATS_INTERVAL;
use crate::motion::MotionProfile;
use crate::scene::Scene;
use fnv::FnvHashSet;
use instant::Instant;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

/// A DOM-like element that can hold the renderer's output surface.
pub trait MountPoint {
    type Surface;
    fn contains(&self, surface: &Self::Surface) -> bool;
    fn attach(&self, surface: &Self::Surface);
    fn detach(&self, surface: &Self::Surface);
}

/// Draws a [`Scene`] into an output surface and owns the GPU resources behind it.
pub trait SceneRenderer {
    type Surface;
    fn surface(&self) -> &Self::Surface;
    fn set_size(&mut self, width: u32, height: u32);
    fn render(&mut self, scene: &Scene, camera: &Camera);
    /// Release native resources. Must tolerate being called more than once.
    fn dispose(&mut self);
}

/// Cancellation side of a repeating frame callback.
pub trait LoopHandle {
    fn cancel(&mut self);
}

pub trait SceneHost {
    type Surface;
    type Container: MountPoint<Surface = Self::Surface>;
    type Renderer: SceneRenderer<Surface = Self::Surface>;
    type Loop: LoopHandle;

    /// Current viewport size in CSS pixels.
    fn viewport(&self) -> (u32, u32);
    fn find_container(&self, id: &str) -> Option<Self::Container>;
    /// `None` when no output surface can be created at all.
    fn create_renderer(&self, options: &RendererOptions) -> Option<Self::Renderer>;
    /// Containers currently holding a live scene surface.
    fn claims(&self) -> &MountClaims;
    fn particle_rng(&self) -> StdRng;
    /// Invoke `frame` once per display refresh until the returned handle is cancelled.
    fn start_loop(&self, frame: Box<dyn FnMut()>) -> Self::Loop;
}

/// Particle generator seeded from `entropy`, or from `fallback_seed` when the source fails.
pub fn seed_particles<R: RngCore>(entropy: R, fallback_seed: u64) -> StdRng {
    StdRng::from_rng(entropy).unwrap_or_else(|e| {
        log::warn!("[scene] entropy source failed ({e}); using fallback particle seed");
        StdRng::seed_from_u64(fallback_seed)
    })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RendererOptions {
    pub antialias: bool,
    pub transparent: bool,
}

impl Default for RendererOptions {
    fn default() -> Self {
        Self {
            antialias: true,
            transparent: true,
        }
    }
}

/// Set of container ids that currently have a scene surface attached.
///
/// Cloning shares the underlying set, so every manager created from the same
/// host sees the same claims.
#[derive(Clone, Debug, Default)]
pub struct MountClaims(Rc<RefCell<FnvHashSet<String>>>);

impl MountClaims {
    /// Returns `false` if another manager already holds `id`.
    pub fn try_claim(&self, id: &str) -> bool {
        self.0.borrow_mut().insert(id.to_owned())
    }

    pub fn release(&self, id: &str) {
        self.0.borrow_mut().remove(id);
    }

    pub fn is_claimed(&self, id: &str) -> bool {
        self.0.borrow().contains(id)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecycleState {
    Uninitialized,
    Running,
    TornDown,
}

#[derive(Default)]
struct FrameStats {
    last: Option<Instant>,
    elapsed: Duration,
    frames: u32,
}

impl FrameStats {
    fn record(&mut self, container_id: &str) {
        let now = Instant::now();
        if let Some(last) = self.last.replace(now) {
            self.elapsed += now - last;
            self.frames += 1;
        }
        if self.frames >= FRAME_STATS_INTERVAL {
            let mean_ms = self.elapsed.as_secs_f64() * 1000.0 / self.frames as f64;
            log::debug!("[scene] #{container_id} mean frame interval {mean_ms:.2} ms");
            self.elapsed = Duration::ZERO;
            self.frames = 0;
        }
    }
}

pub struct SceneLifecycle<H: SceneHost> {
    host: H,
    state: LifecycleState,
    container_id: String,
    container: Option<H::Container>,
    claimed: bool,
    renderer: Option<H::Renderer>,
    scene: Scene,
    camera: Camera,
    profile: MotionProfile,
    frames: u64,
    stats: FrameStats,
}

impl<H: SceneHost> SceneLifecycle<H> {
    pub fn new(host: H) -> Self {
        let (w, h) = host.viewport();
        Self {
            host,
            state: LifecycleState::Uninitialized,
            container_id: String::new(),
            container: None,
            claimed: false,
            renderer: None,
            scene: Scene::new(),
            camera: Camera::background(w, h),
            profile: MotionProfile::default(),
            frames: 0,
            stats: FrameStats::default(),
        }
    }

    /// Build the scene, size the renderer to the viewport and attach its surface
    /// to `container_id`. A missing or already-claimed container leaves the
    /// renderer detached; both cases are logged, neither is an error.
    pub fn initialize(&mut self, container_id: &str, profile: MotionProfile) {
        if self.state != LifecycleState::Uninitialized {
            log::warn!(
                "[scene] initialize on #{container_id} ignored: manager is {:?}",
                self.state
            );
            return;
        }
        self.container_id = container_id.to_owned();
        self.profile = profile;

        let (w, h) = self.host.viewport();
        self.camera = Camera::background(w, h);
        let mut renderer = self.host.create_renderer(&RendererOptions::default());
        if let Some(renderer) = renderer.as_mut() {
            renderer.set_size(w, h);
        } else {
            log::error!("[scene] no renderer available for #{container_id}; animating without output");
        }

        let mut rng = self.host.particle_rng();
        self.scene = Scene::background(&mut rng);

        match (self.host.find_container(container_id), renderer.as_ref()) {
            (None, _) => {
                log::warn!("[scene] container #{container_id} not found; background stays detached");
            }
            (Some(_), None) => {}
            (Some(container), Some(renderer)) => {
                if self.host.claims().try_claim(container_id) {
                    container.attach(renderer.surface());
                    self.claimed = true;
                    self.container = Some(container);
                } else {
                    log::warn!(
                        "[scene] container #{container_id} already hosts a background; not attaching a second surface"
                    );
                }
            }
        }

        self.renderer = renderer;
        self.state = LifecycleState::Running;
        log::info!(
            "[scene] running in #{container_id} ({}x{}, {} nodes, attached={})",
            w,
            h,
            self.scene.len(),
            self.is_attached()
        );
    }

    /// Advance one frame and render it.
    pub fn tick(&mut self) {
        if self.state != LifecycleState::Running {
            return;
        }
        self.scene.advance(&self.profile);
        self.frames += 1;
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.render(&self.scene, &self.camera);
        }
        self.stats.record(&self.container_id);
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if self.state != LifecycleState::Running || width == 0 || height == 0 {
            return;
        }
        self.camera.set_viewport(width, height);
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.set_size(width, height);
        }
    }

    /// Detach the surface, release the container claim, dispose the renderer
    /// and clear the scene. Safe to call in any state, any number of times.
    pub fn teardown(&mut self) {
        if self.state != LifecycleState::Running {
            return;
        }
        if let Some(mut renderer) = self.renderer.take() {
            if let Some(container) = self.container.take() {
                if container.contains(renderer.surface()) {
                    container.detach(renderer.surface());
                }
            }
            renderer.dispose();
        }
        if self.claimed {
            self.host.claims().release(&self.container_id);
            self.claimed = false;
        }
        self.scene.clear();
        self.state = LifecycleState::TornDown;
        log::info!(
            "[scene] torn down #{} after {} frames",
            self.container_id,
            self.frames
        );
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn is_attached(&self) -> bool {
        self.container.is_some()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn container_id(&self) -> &str {
        &self.container_id
    }
}

/// A running background and the animation loop driving it.
pub struct BackgroundScene<H: SceneHost + 'static> {
    lifecycle: Rc<RefCell<SceneLifecycle<H>>>,
    frame_loop: Option<H::Loop>,
}

impl<H: SceneHost + 'static> BackgroundScene<H> {
    pub fn mount(host: H, container_id: &str, profile: MotionProfile) -> Self {
        let mut lifecycle = SceneLifecycle::new(host);
        lifecycle.initialize(container_id, profile);
        let lifecycle = Rc::new(RefCell::new(lifecycle));

        let weak = Rc::downgrade(&lifecycle);
        let frame: Box<dyn FnMut()> = Box::new(move || {
            if let Some(lc) = weak.upgrade() {
                if let Ok(mut lc) = lc.try_borrow_mut() {
                    lc.tick();
                }
            }
        });
        let frame_loop = lifecycle.borrow().host().start_loop(frame);
        Self {
            lifecycle,
            frame_loop: Some(frame_loop),
        }
    }

    /// Cancel the animation loop, then tear the scene down. Idempotent.
    ///
    /// If the lifecycle is busy (a frame is in progress) nothing is released
    /// yet; the loop keeps its handle so a later `unmount` or drop can finish.
    pub fn unmount(&mut self) {
        let Ok(mut lc) = self.lifecycle.try_borrow_mut() else {
            log::error!("[scene] unmount while a frame is in progress; teardown deferred");
            return;
        };
        if let Some(mut frame_loop) = self.frame_loop.take() {
            frame_loop.cancel();
        }
        lc.teardown();
    }

    pub fn resize(&self, width: u32, height: u32) {
        if let Ok(mut lc) = self.lifecycle.try_borrow_mut() {
            lc.resize(width, height);
        }
    }

    pub fn is_running(&self) -> bool {
        self.frame_loop.is_some()
    }

    pub fn lifecycle(&self) -> &Rc<RefCell<SceneLifecycle<H>>> {
        &self.lifecycle
    }
}

impl<H: SceneHost + 'static> Drop for BackgroundScene<H> {
    fn drop(&mut self) {
        self.unmount();
    }
}

/// The background owned by the current page.
///
/// Remembers the profile it was mounted with, so a page hidden and later restored
/// from the back/forward cache gets its background back via [`restore`](Self::restore).
pub struct PageBackground<H: SceneHost + 'static> {
    container_id: String,
    profile: Option<MotionProfile>,
    scene: Option<BackgroundScene<H>>,
}

impl<H: SceneHost + 'static> PageBackground<H> {
    pub fn new(container_id: &str) -> Self {
        Self {
            container_id: container_id.to_owned(),
            profile: None,
            scene: None,
        }
    }

    /// Mount with `profile`, replacing any scene already mounted.
    pub fn mount(&mut self, host: H, profile: MotionProfile) {
        // The old scene has to release its container before the new one claims it.
        self.hide();
        self.profile = Some(profile);
        self.scene = Some(BackgroundScene::mount(host, &self.container_id, profile));
    }

    /// Tear the scene down but keep the profile for [`restore`](Self::restore).
    pub fn hide(&mut self) {
        if let Some(mut scene) = self.scene.take() {
            scene.unmount();
        }
    }

    /// Remount after [`hide`](Self::hide). Returns `false` when a scene is
    /// already running or nothing was ever mounted.
    pub fn restore(&mut self, host: H) -> bool {
        if self.scene.is_some() {
            return false;
        }
        let Some(profile) = self.profile else {
            return false;
        };
        log::info!("[scene] restoring background in #{}", self.container_id);
        self.scene = Some(BackgroundScene::mount(host, &self.container_id, profile));
        true
    }

    /// Tear down and forget the profile.
    pub fn clear(&mut self) {
        self.hide();
        self.profile = None;
    }

    pub fn resize(&self, width: u32, height: u32) {
        if let Some(scene) = &self.scene {
            scene.resize(width, height);
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.scene.is_some()
    }

    pub fn profile(&self) -> Option<MotionProfile> {
        self.profile
    }
}
