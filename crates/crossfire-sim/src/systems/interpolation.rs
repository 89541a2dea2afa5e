//! Presentation smoothing of remote entities toward their latest server position.

use hecs::World;

use crossfire_core::components::{NetState, RenderPosition};
use crossfire_core::constants::TELEPORT_SNAP_DISTANCE;

/// Per-frame blend factor for an exponential smoothing `rate` (1/s).
pub fn smoothing_alpha(rate: f64, dt: f64) -> f64 {
    if !(rate > 0.0 && dt > 0.0) {
        return 0.0;
    }
    (1.0 - (-rate * dt).exp()).clamp(0.0, 1.0)
}

/// `position += (target - position) * alpha`, snapping across large jumps.
pub fn run(world: &mut World, alpha: f64) {
    for (_entity, (net, render)) in world.query_mut::<(&NetState, &mut RenderPosition)>() {
        let target = net.0.position;
        let offset = target - render.0;
        if offset.length() > TELEPORT_SNAP_DISTANCE {
            render.0 = target;
        } else {
            render.0 += offset * alpha;
        }
    }
}
