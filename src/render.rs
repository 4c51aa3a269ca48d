//! The continuous render loop.

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use instant::{Duration, Instant};

use crate::{
    context::{RenderTarget, Rig},
    data_structures::scene_graph::Scene,
};

/// Redraws `scene` every `frame_interval` until `disposed` is set.
///
/// The camera's idle rotation advances by the wall-clock time between frames.
/// A failed frame is logged and the loop carries on with the next one.
pub(crate) async fn run_render_loop<T: RenderTarget>(
    target: Rc<RefCell<T>>,
    scene: Rc<RefCell<Scene>>,
    rig: Rc<RefCell<Rig>>,
    disposed: Rc<Cell<bool>>,
    frame_interval: Duration,
) {
    let mut last_frame = Instant::now();
    let mut frames: u64 = 0;
    while !disposed.get() {
        let now = Instant::now();
        let dt = now - last_frame;
        last_frame = now;

        {
            let mut rig = rig.borrow_mut();
            rig.camera.update(dt);
            let scene = scene.borrow();
            if let Err(e) = target.borrow_mut().draw(&scene, &rig) {
                log::error!("Unable to render frame {}: {:#}", frames, e);
            }
        }
        frames += 1;

        tokio::time::sleep(frame_interval).await;
    }
    log::debug!("Render loop stopped after {} frames", frames);
}
