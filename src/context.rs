//! The preview context: render target, scene, camera/light rig and the
//! running render loop.
//!
//! [`create_scene`] builds everything a thumbnail needs and immediately starts
//! redrawing. The scene may still be empty at that point; frames rendered
//! before an asset arrives simply show the clear colour.

use std::{
    cell::{Cell, Ref, RefCell, RefMut},
    f32::consts::PI,
    rc::Rc,
};

use anyhow::{Context as _, bail};
use cgmath::{Point3, Vector3};
use instant::Duration;
use tokio::task::JoinHandle;

use crate::{
    camera::{AutoRotation, OrbitCamera},
    data_structures::scene_graph::{Scene, SceneSettings},
    effects::GlowLayer,
    lights::{Light, LightKind},
    render::run_render_loop,
};

/// Surface flags requested from the render target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EngineOptions {
    pub antialias: bool,
    /// Keep the last frame readable so thumbnails can be captured.
    pub preserve_drawing_buffer: bool,
    pub stencil: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            antialias: true,
            preserve_drawing_buffer: true,
            stencil: true,
        }
    }
}

/// The surface a preview draws into. Implementations own all GPU state.
pub trait RenderTarget {
    fn configure(&mut self, options: &EngineOptions) -> anyhow::Result<()>;

    /// Draws one frame of `scene` as seen through `rig`.
    fn draw(&mut self, scene: &Scene, rig: &Rig) -> anyhow::Result<()>;

    /// Releases the surface. Called once when the context is disposed.
    fn dispose(&mut self) {}
}

/// Tunables of the preview rig. The defaults produce the standard thumbnail.
#[derive(Clone, Debug)]
pub struct RigConfig {
    pub engine: EngineOptions,
    pub scene: SceneSettings,
    pub camera_position: Point3<f32>,
    pub idle_rotation_speed: f32,
    pub glow: GlowLayer,
    pub light_intensity: f32,
    pub frame_interval: Duration,
}

impl Default for RigConfig {
    fn default() -> Self {
        Self {
            engine: EngineOptions::default(),
            scene: SceneSettings::default(),
            camera_position: Point3::new(-2.0, 2.0, 2.0),
            idle_rotation_speed: 0.2,
            glow: GlowLayer::default(),
            light_intensity: 1.0,
            // ~60 fps
            frame_interval: Duration::from_millis(16),
        }
    }
}

/// Camera, lights and post-processing of a preview.
#[derive(Clone, Debug)]
pub struct Rig {
    pub camera: OrbitCamera,
    pub lights: Vec<Light>,
    pub glow: GlowLayer,
}

impl Rig {
    /// Builds the rig with the camera radius pinned to `initial / zoom`.
    pub fn new(zoom: f32, config: &RigConfig) -> anyhow::Result<Self> {
        if !(zoom.is_finite() && zoom > 0.0) {
            bail!("zoom must be a positive number, got {zoom}");
        }
        let origin = Point3::new(0.0, 0.0, 0.0);

        let mut camera = OrbitCamera::new("camera", origin);
        camera.set_position(config.camera_position);
        camera.auto_rotation = Some(AutoRotation {
            idle_rotation_speed: config.idle_rotation_speed,
        });
        let radius = camera.radius() / zoom;
        camera.set_radius_limits(Some(radius), Some(radius));

        let intensity = config.light_intensity;
        let lights = vec![
            Light::new(
                "directional",
                LightKind::Directional {
                    direction: Vector3::new(0.0, 0.0, 1.0),
                },
            ),
            Light::new(
                "top",
                LightKind::Hemispheric {
                    direction: Vector3::new(0.0, -1.0, 0.0),
                },
            ),
            Light::new(
                "bottom",
                LightKind::Hemispheric {
                    direction: Vector3::new(0.0, 1.0, 0.0),
                },
            ),
            Light::new(
                "spot",
                LightKind::Spot {
                    position: config.camera_position,
                    direction: origin - config.camera_position,
                    angle: PI / 2.0,
                    exponent: 1000.0,
                },
            ),
        ]
        .into_iter()
        .map(|light| light.with_intensity(intensity))
        .collect();

        Ok(Self {
            camera,
            lights,
            glow: config.glow.clone(),
        })
    }
}

/// Everything a running preview owns.
///
/// Dropping the context disposes it: the render loop stops before its next
/// frame and the target is released.
pub struct Context<T: RenderTarget> {
    pub options: EngineOptions,
    scene: Rc<RefCell<Scene>>,
    rig: Rc<RefCell<Rig>>,
    target: Rc<RefCell<T>>,
    disposed: Rc<Cell<bool>>,
    render_loop: Option<JoinHandle<()>>,
}

impl<T: RenderTarget> std::fmt::Debug for Context<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("options", &self.options)
            .field("disposed", &self.disposed.get())
            .finish_non_exhaustive()
    }
}

impl<T: RenderTarget> Context<T> {
    pub fn scene(&self) -> Ref<'_, Scene> {
        self.scene.borrow()
    }

    pub fn scene_mut(&self) -> RefMut<'_, Scene> {
        self.scene.borrow_mut()
    }

    pub fn rig(&self) -> Ref<'_, Rig> {
        self.rig.borrow()
    }

    pub fn rig_mut(&self) -> RefMut<'_, Rig> {
        self.rig.borrow_mut()
    }

    pub fn target(&self) -> Ref<'_, T> {
        self.target.borrow()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.get()
    }

    /// Stops the render loop and releases the target. Idempotent.
    pub fn dispose(&mut self) {
        if self.disposed.replace(true) {
            return;
        }
        if let Some(handle) = self.render_loop.take() {
            handle.abort();
        }
        match self.target.try_borrow_mut() {
            Ok(mut target) => target.dispose(),
            Err(_) => log::warn!("Render target is busy and could not be disposed."),
        }
        log::info!("Preview disposed");
    }
}

impl<T: RenderTarget> Drop for Context<T> {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Configures `target`, builds an empty scene with the preview rig and starts
/// the render loop.
///
/// The loop is spawned with [`tokio::task::spawn_local`], so this must run
/// inside a [`tokio::task::LocalSet`].
pub fn create_scene<T: RenderTarget + 'static>(
    mut target: T,
    zoom: f32,
    config: RigConfig,
) -> anyhow::Result<Context<T>> {
    target
        .configure(&config.engine)
        .context("Cannot configure the render target")?;

    let scene = Rc::new(RefCell::new(Scene::new(config.scene)));
    let rig = Rc::new(RefCell::new(Rig::new(zoom, &config)?));
    let target = Rc::new(RefCell::new(target));
    let disposed = Rc::new(Cell::new(false));

    let render_loop = tokio::task::spawn_local(run_render_loop(
        target.clone(),
        scene.clone(),
        rig.clone(),
        disposed.clone(),
        config.frame_interval,
    ));

    Ok(Context {
        options: config.engine,
        scene,
        rig,
        target,
        disposed,
        render_loop: Some(render_loop),
    })
}
