use eframe::egui::Vec2;

use super::barnes_hut::BarnesHutTree;
use super::{Body, SimulationConfig, Viewport};

/// Velocity kick pushing `point` away from `other`. Distances are clamped to
/// one pixel so coincident bodies never divide by zero.
pub(super) fn repulsion_between(point: Vec2, other: Vec2, strength: f32) -> Vec2 {
    let delta = point - other;
    let distance = delta.length().max(1.0);
    delta / distance * (strength / (distance * distance))
}

pub(super) fn apply_repulsion_exact(bodies: &mut [Body], strength: f32) {
    for j in 0..bodies.len() {
        for k in (j + 1)..bodies.len() {
            let push = repulsion_between(bodies[k].position, bodies[j].position, strength);
            bodies[k].velocity += push;
            bodies[j].velocity -= push;
        }
    }
}

pub(super) fn apply_repulsion_barnes_hut(
    bodies: &mut [Body],
    positions: &mut Vec<Vec2>,
    strength: f32,
    theta: f32,
) {
    positions.clear();
    positions.extend(bodies.iter().map(|body| body.position));

    let Some(tree) = BarnesHutTree::build(positions) else {
        return;
    };

    for (index, body) in bodies.iter_mut().enumerate() {
        body.velocity += tree.repulsion_on(index, positions, strength, theta);
    }
}

/// Linear spring along every resolved edge, pulling `from` toward `to`.
pub(super) fn apply_attraction(bodies: &mut [Body], edges: &[(usize, usize)], strength: f32) {
    for &(from, to) in edges {
        let delta = bodies[to].position - bodies[from].position;
        let distance = delta.length().max(1.0);
        let pull = delta / distance * (distance * strength);
        bodies[from].velocity += pull;
        bodies[to].velocity -= pull;
    }
}

pub(super) fn apply_gravity(bodies: &mut [Body], viewport: Viewport, strength: f32) {
    let center = viewport.center().to_vec2();
    for body in bodies {
        body.velocity += (center - body.position) * strength;
    }
}

pub(super) fn integrate(bodies: &mut [Body], viewport: Viewport, config: &SimulationConfig) {
    for body in bodies.iter_mut() {
        body.position += body.velocity * config.time_step;
        body.velocity *= config.damping;
    }
    clamp_into(bodies, viewport, config.padding);
}

/// Pins every body inside the padded viewport.
pub(super) fn clamp_into(bodies: &mut [Body], viewport: Viewport, padding: f32) {
    let (min_x, max_x) = axis_range(viewport.width, padding);
    let (min_y, max_y) = axis_range(viewport.height, padding);

    for body in bodies {
        body.position.x = body.position.x.clamp(min_x, max_x);
        body.position.y = body.position.y.clamp(min_y, max_y);
    }
}

/// Allowed coordinate range on one axis. Collapses to the midpoint when the
/// viewport is too small for the padding.
pub(super) fn axis_range(extent: f32, padding: f32) -> (f32, f32) {
    if extent - padding >= padding {
        (padding, extent - padding)
    } else {
        (extent * 0.5, extent * 0.5)
    }
}
