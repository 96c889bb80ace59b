// Host-side tests for the background lifecycle, driven through an in-memory host.
// Surfaces are plain ids; the "DOM" is a map from container id to attached surfaces.

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use testerz_core::*;

const CONTAINER: &str = "canvas-container";

type Events = Rc<RefCell<Vec<String>>>;
type FrameSlot = Rc<RefCell<Option<Box<dyn FnMut()>>>>;

#[derive(Clone, Default)]
struct FakeDom {
    children: Rc<RefCell<HashMap<String, Vec<u32>>>>,
}

impl FakeDom {
    fn with_container(id: &str) -> Self {
        let dom = Self::default();
        dom.children.borrow_mut().insert(id.to_owned(), Vec::new());
        dom
    }

    fn surfaces_in(&self, id: &str) -> usize {
        self.children.borrow().get(id).map_or(0, Vec::len)
    }
}

struct FakeContainer {
    id: String,
    dom: FakeDom,
}

impl MountPoint for FakeContainer {
    type Surface = u32;

    fn contains(&self, surface: &u32) -> bool {
        self.dom
            .children
            .borrow()
            .get(&self.id)
            .is_some_and(|c| c.contains(surface))
    }

    fn attach(&self, surface: &u32) {
        if let Some(c) = self.dom.children.borrow_mut().get_mut(&self.id) {
            c.push(*surface);
        }
    }

    fn detach(&self, surface: &u32) {
        if let Some(c) = self.dom.children.borrow_mut().get_mut(&self.id) {
            c.retain(|s| s != surface);
        }
    }
}

struct FakeRenderer {
    surface: u32,
    events: Events,
    size: (u32, u32),
    rendered: Rc<Cell<u32>>,
}

impl SceneRenderer for FakeRenderer {
    type Surface = u32;

    fn surface(&self) -> &u32 {
        &self.surface
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.size = (width, height);
        self.events
            .borrow_mut()
            .push(format!("size:{}:{width}x{height}", self.surface));
    }

    fn render(&mut self, _scene: &Scene, _camera: &Camera) {
        self.rendered.set(self.rendered.get() + 1);
    }

    fn dispose(&mut self) {
        self.events
            .borrow_mut()
            .push(format!("dispose:{}", self.surface));
    }
}

struct FakeLoop {
    events: Events,
    slot: FrameSlot,
}

impl LoopHandle for FakeLoop {
    fn cancel(&mut self) {
        self.events.borrow_mut().push("cancel".to_owned());
        self.slot.borrow_mut().take();
    }
}

#[derive(Clone)]
struct FakeHost {
    dom: FakeDom,
    events: Events,
    claims: MountClaims,
    next_surface: Rc<Cell<u32>>,
    frame: FrameSlot,
    rendered: Rc<Cell<u32>>,
    renderer_available: bool,
    viewport: (u32, u32),
}

impl FakeHost {
    fn new(dom: FakeDom) -> Self {
        Self {
            dom,
            events: Events::default(),
            claims: MountClaims::default(),
            next_surface: Rc::new(Cell::new(1)),
            frame: FrameSlot::default(),
            rendered: Rc::new(Cell::new(0)),
            renderer_available: true,
            viewport: (1280, 720),
        }
    }

    /// Another host on the same page: same DOM, claims and event log, its own frame loop.
    fn sibling(&self) -> Self {
        Self {
            frame: FrameSlot::default(),
            ..self.clone()
        }
    }

    fn fire_frame(&self) -> bool {
        let callback = self.frame.borrow_mut().take();
        match callback {
            Some(mut cb) => {
                cb();
                *self.frame.borrow_mut() = Some(cb);
                true
            }
            None => false,
        }
    }

    fn events(&self) -> Vec<String> {
        self.events.borrow().clone()
    }

    fn count(&self, event: &str) -> usize {
        self.events.borrow().iter().filter(|e| e.starts_with(event)).count()
    }
}

impl SceneHost for FakeHost {
    type Surface = u32;
    type Container = FakeContainer;
    type Renderer = FakeRenderer;
    type Loop = FakeLoop;

    fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    fn find_container(&self, id: &str) -> Option<FakeContainer> {
        self.dom
            .children
            .borrow()
            .contains_key(id)
            .then(|| FakeContainer {
                id: id.to_owned(),
                dom: self.dom.clone(),
            })
    }

    fn create_renderer(&self, _options: &RendererOptions) -> Option<FakeRenderer> {
        if !self.renderer_available {
            return None;
        }
        let surface = self.next_surface.get();
        self.next_surface.set(surface + 1);
        self.events.borrow_mut().push(format!("create:{surface}"));
        Some(FakeRenderer {
            surface,
            events: self.events.clone(),
            size: (0, 0),
            rendered: self.rendered.clone(),
        })
    }

    fn claims(&self) -> &MountClaims {
        &self.claims
    }

    fn particle_rng(&self) -> StdRng {
        StdRng::seed_from_u64(7)
    }

    fn start_loop(&self, frame: Box<dyn FnMut()>) -> FakeLoop {
        *self.frame.borrow_mut() = Some(frame);
        FakeLoop {
            events: self.events.clone(),
            slot: self.frame.clone(),
        }
    }
}

#[test]
fn mount_attaches_one_surface_and_builds_the_scene() {
    let host = FakeHost::new(FakeDom::with_container(CONTAINER));
    let scene = BackgroundScene::mount(host.clone(), CONTAINER, MotionProfile::LANDING);

    assert_eq!(host.dom.surfaces_in(CONTAINER), 1);
    assert!(scene.is_running());
    let lc = scene.lifecycle().borrow();
    assert_eq!(lc.state(), LifecycleState::Running);
    assert!(lc.is_attached());
    assert_eq!(lc.scene().len(), 4);
    assert_eq!(lc.scene().particles().map(|p| p.len()), Some(PARTICLE_COUNT));
    assert!(host.claims.is_claimed(CONTAINER));
    assert!(host.events().contains(&"size:1:1280x720".to_owned()));
}

#[test]
fn each_frame_advances_and_renders() {
    let host = FakeHost::new(FakeDom::with_container(CONTAINER));
    let scene = BackgroundScene::mount(host.clone(), CONTAINER, MotionProfile::AUTH);

    for _ in 0..10 {
        assert!(host.fire_frame());
    }
    let lc = scene.lifecycle().borrow();
    assert_eq!(lc.frames(), 10);
    assert_eq!(host.rendered.get(), 10);
    let torus = lc.scene().torus().map(|t| t.rotation).unwrap_or_default();
    assert!((torus.x - 10.0 * TORUS_SPIN_X).abs() < 1e-5);
    assert!((torus.y - 10.0 * TORUS_SPIN_Y).abs() < 1e-5);
}

#[test]
fn unmount_cancels_the_loop_before_disposing() {
    let host = FakeHost::new(FakeDom::with_container(CONTAINER));
    let mut scene = BackgroundScene::mount(host.clone(), CONTAINER, MotionProfile::LANDING);
    host.fire_frame();
    scene.unmount();

    let events = host.events();
    let cancel = events.iter().position(|e| e == "cancel");
    let dispose = events.iter().position(|e| e == "dispose:1");
    assert!(cancel.is_some() && dispose.is_some());
    assert!(cancel < dispose, "events: {events:?}");

    assert_eq!(host.dom.surfaces_in(CONTAINER), 0);
    assert!(!host.claims.is_claimed(CONTAINER));
    assert!(!scene.is_running());
    assert!(!host.fire_frame(), "no frames after unmount");
    let lc = scene.lifecycle().borrow();
    assert_eq!(lc.state(), LifecycleState::TornDown);
    assert!(lc.scene().is_empty());
}

#[test]
fn unmount_twice_disposes_once() {
    let host = FakeHost::new(FakeDom::with_container(CONTAINER));
    let mut scene = BackgroundScene::mount(host.clone(), CONTAINER, MotionProfile::LANDING);
    scene.unmount();
    scene.unmount();
    drop(scene);
    assert_eq!(host.count("dispose"), 1);
    assert_eq!(host.count("cancel"), 1);
}

#[test]
fn dropping_the_handle_tears_down() {
    let host = FakeHost::new(FakeDom::with_container(CONTAINER));
    let scene = BackgroundScene::mount(host.clone(), CONTAINER, MotionProfile::AUTH);
    drop(scene);
    assert_eq!(host.dom.surfaces_in(CONTAINER), 0);
    assert_eq!(host.count("dispose"), 1);
    assert!(!host.fire_frame());
}

#[test]
fn missing_container_runs_detached() {
    let host = FakeHost::new(FakeDom::default());
    let mut scene = BackgroundScene::mount(host.clone(), CONTAINER, MotionProfile::LANDING);
    {
        let lc = scene.lifecycle().borrow();
        assert_eq!(lc.state(), LifecycleState::Running);
        assert!(!lc.is_attached());
    }
    assert!(host.fire_frame());
    assert!(!host.claims.is_claimed(CONTAINER));

    scene.unmount();
    assert_eq!(host.count("dispose"), 1);
}

#[test]
fn missing_renderer_still_animates() {
    let mut host = FakeHost::new(FakeDom::with_container(CONTAINER));
    host.renderer_available = false;
    let mut scene = BackgroundScene::mount(host.clone(), CONTAINER, MotionProfile::LANDING);

    assert!(host.fire_frame());
    assert_eq!(host.dom.surfaces_in(CONTAINER), 0);
    assert_eq!(scene.lifecycle().borrow().frames(), 1);
    assert_eq!(host.rendered.get(), 0);
    assert!(!host.claims.is_claimed(CONTAINER));
    scene.unmount();
    assert_eq!(
        scene.lifecycle().borrow().state(),
        LifecycleState::TornDown
    );
}

#[test]
fn remount_leaves_a_single_surface() {
    let host = FakeHost::new(FakeDom::with_container(CONTAINER));
    for _ in 0..3 {
        let mut scene = BackgroundScene::mount(host.sibling(), CONTAINER, MotionProfile::LANDING);
        assert_eq!(host.dom.surfaces_in(CONTAINER), 1);
        scene.unmount();
        assert_eq!(host.dom.surfaces_in(CONTAINER), 0);
    }
    assert_eq!(host.count("create"), 3);
    assert_eq!(host.count("dispose"), 3);
}

#[test]
fn second_manager_on_same_container_stays_detached() {
    let host = FakeHost::new(FakeDom::with_container(CONTAINER));
    let mut first = BackgroundScene::mount(host.sibling(), CONTAINER, MotionProfile::LANDING);
    let mut second = BackgroundScene::mount(host.sibling(), CONTAINER, MotionProfile::AUTH);

    assert_eq!(host.dom.surfaces_in(CONTAINER), 1);
    assert!(first.lifecycle().borrow().is_attached());
    assert!(!second.lifecycle().borrow().is_attached());

    // Tearing down the detached one must not touch the other's surface or claim.
    second.unmount();
    assert_eq!(host.dom.surfaces_in(CONTAINER), 1);
    assert!(host.claims.is_claimed(CONTAINER));

    first.unmount();
    assert_eq!(host.dom.surfaces_in(CONTAINER), 0);
    assert!(!host.claims.is_claimed(CONTAINER));
    assert_eq!(host.count("dispose"), 2);
}

#[test]
fn resize_updates_camera_and_renderer() {
    let host = FakeHost::new(FakeDom::with_container(CONTAINER));
    let scene = BackgroundScene::mount(host.clone(), CONTAINER, MotionProfile::LANDING);

    scene.resize(800, 400);
    assert!((scene.lifecycle().borrow().camera().aspect - 2.0).abs() < 1e-6);
    assert!(host.events().contains(&"size:1:800x400".to_owned()));

    // Zero-sized viewports (minimised windows) are ignored.
    scene.resize(0, 400);
    assert!((scene.lifecycle().borrow().camera().aspect - 2.0).abs() < 1e-6);
    assert_eq!(host.count("size"), 2);
}

#[test]
fn lifecycle_calls_outside_running_are_ignored() {
    let host = FakeHost::new(FakeDom::with_container(CONTAINER));
    let mut lc = SceneLifecycle::new(host.clone());

    // Before initialize.
    lc.tick();
    lc.resize(100, 100);
    lc.teardown();
    assert_eq!(lc.state(), LifecycleState::Uninitialized);
    assert_eq!(lc.frames(), 0);

    lc.initialize(CONTAINER, MotionProfile::AUTH);
    lc.initialize(CONTAINER, MotionProfile::LANDING);
    assert_eq!(host.count("create"), 1);

    lc.tick();
    lc.teardown();
    lc.tick();
    lc.teardown();
    assert_eq!(lc.frames(), 1);
    assert_eq!(lc.state(), LifecycleState::TornDown);
    assert_eq!(host.count("dispose"), 1);

    // A torn-down manager is not reused.
    lc.initialize(CONTAINER, MotionProfile::AUTH);
    assert_eq!(lc.state(), LifecycleState::TornDown);
    assert_eq!(host.dom.surfaces_in(CONTAINER), 0);
}

#[test]
fn camera_matches_viewport_at_initialize() {
    let mut host = FakeHost::new(FakeDom::with_container(CONTAINER));
    host.viewport = (1920, 1080);
    let mut lc = SceneLifecycle::new(host);
    lc.initialize(CONTAINER, MotionProfile::LANDING);

    let camera = lc.camera();
    assert!((camera.aspect - 1920.0 / 1080.0).abs() < 1e-6);
    assert!((camera.fovy_radians - 75f32.to_radians()).abs() < 1e-6);
    assert_eq!(camera.eye.z, CAMERA_Z);
    lc.teardown();
}

#[test]
fn claims_are_shared_between_clones() {
    let claims = MountClaims::default();
    let other = claims.clone();
    assert!(claims.try_claim("a"));
    assert!(!other.try_claim("a"));
    assert!(other.is_claimed("a"));
    other.release("a");
    assert!(!claims.is_claimed("a"));
    assert!(claims.try_claim("a"));
}

#[test]
fn unmount_during_a_frame_is_deferred_not_lost() {
    let host = FakeHost::new(FakeDom::with_container(CONTAINER));
    let mut scene = BackgroundScene::mount(host.clone(), CONTAINER, MotionProfile::LANDING);

    let lifecycle = scene.lifecycle().clone();
    let busy = lifecycle.borrow_mut();
    scene.unmount();
    assert!(scene.is_running());
    assert_eq!(host.count("cancel"), 0);
    assert_eq!(host.count("dispose"), 0);
    drop(busy);

    drop(scene);
    assert_eq!(host.count("cancel"), 1);
    assert_eq!(host.count("dispose"), 1);
    assert_eq!(host.dom.surfaces_in(CONTAINER), 0);
}

#[test]
fn page_background_comes_back_after_hide() {
    let host = FakeHost::new(FakeDom::with_container(CONTAINER));
    let mut page = PageBackground::new(CONTAINER);
    assert!(!page.restore(host.sibling()), "nothing mounted yet");

    page.mount(host.sibling(), MotionProfile::AUTH);
    assert_eq!(host.dom.surfaces_in(CONTAINER), 1);

    page.hide();
    assert!(!page.is_mounted());
    assert_eq!(host.dom.surfaces_in(CONTAINER), 0);
    assert_eq!(page.profile(), Some(MotionProfile::AUTH));

    assert!(page.restore(host.sibling()));
    assert!(page.is_mounted());
    assert_eq!(host.dom.surfaces_in(CONTAINER), 1);
    assert!(!page.restore(host.sibling()), "already running");
    assert_eq!(host.count("create"), 2);

    page.clear();
    assert_eq!(host.dom.surfaces_in(CONTAINER), 0);
    assert!(!page.restore(host.sibling()));
    assert_eq!(host.count("dispose"), 2);
}

#[test]
fn page_background_remount_replaces_the_old_scene() {
    let host = FakeHost::new(FakeDom::with_container(CONTAINER));
    let mut page = PageBackground::new(CONTAINER);
    page.mount(host.sibling(), MotionProfile::AUTH);
    page.mount(host.sibling(), MotionProfile::LANDING);

    assert_eq!(host.dom.surfaces_in(CONTAINER), 1);
    assert_eq!(host.count("dispose"), 1);
    assert_eq!(page.profile(), Some(MotionProfile::LANDING));

    page.resize(400, 200);
    assert!(host.events().contains(&"size:2:400x200".to_owned()));
}

struct DeadEntropy;

impl rand::RngCore for DeadEntropy {
    fn next_u32(&mut self) -> u32 {
        panic!("infallible path used")
    }
    fn next_u64(&mut self) -> u64 {
        panic!("infallible path used")
    }
    fn fill_bytes(&mut self, _: &mut [u8]) {
        panic!("infallible path used")
    }
    fn try_fill_bytes(&mut self, _: &mut [u8]) -> Result<(), rand::Error> {
        Err(rand::Error::new("no entropy"))
    }
}

#[test]
fn failed_entropy_falls_back_to_the_given_seed() {
    use rand::Rng;
    let mut rng = seed_particles(DeadEntropy, 42);
    let mut expected = StdRng::seed_from_u64(42);
    assert_eq!(rng.gen::<u64>(), expected.gen::<u64>());

    let mut seeded = seed_particles(StdRng::seed_from_u64(1), 42);
    assert_ne!(seeded.gen::<u64>(), StdRng::seed_from_u64(42).gen::<u64>());
}
