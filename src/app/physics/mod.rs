//! Spring-electrical layout: inverse-square repulsion between every pair of
//! nodes, linear springs along edges, a weak pull toward the viewport centre,
//! exponential velocity damping and a padded bounding box.
//!
//! A pass runs a fixed number of iterations from a random start. It is not
//! guaranteed to converge; it is guaranteed to stay bounded.

mod barnes_hut;
mod forces;

use std::collections::HashMap;
use std::time::Instant;

use eframe::egui::{Pos2, Vec2, pos2, vec2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::graph::GraphModel;

use forces::{
    apply_attraction, apply_gravity, apply_repulsion_barnes_hut, apply_repulsion_exact, clamp_into,
    integrate,
};

/// Drawing area in device pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    pub fn center(self) -> Pos2 {
        pos2(self.width * 0.5, self.height * 0.5)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SimulationConfig {
    pub iterations: usize,
    pub repulsion: f32,
    pub attraction: f32,
    pub gravity: f32,
    pub time_step: f32,
    pub damping: f32,
    pub padding: f32,
    /// Fixed seed for reproducible layouts; `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Node count above which repulsion uses the Barnes–Hut approximation.
    pub barnes_hut_above: Option<usize>,
    pub barnes_hut_theta: f32,
    /// Node count above which a pass is spread over several frames.
    pub chunk_above: usize,
    pub chunk_iterations: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            iterations: 100,
            repulsion: 1000.0,
            attraction: 0.01,
            gravity: 0.001,
            time_step: 0.1,
            damping: 0.9,
            padding: 50.0,
            seed: None,
            barnes_hut_above: Some(600),
            barnes_hut_theta: 0.7,
            chunk_above: 300,
            chunk_iterations: 10,
        }
    }
}

impl SimulationConfig {
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }

    /// Iterations to run per frame for a graph of `node_count` nodes.
    pub fn iterations_per_frame(&self, node_count: usize) -> usize {
        if node_count > self.chunk_above {
            self.chunk_iterations.max(1)
        } else {
            self.iterations.max(1)
        }
    }

    fn uses_barnes_hut(&self, node_count: usize) -> bool {
        self.barnes_hut_above
            .is_some_and(|threshold| node_count > threshold)
    }
}

/// Transient simulation state of one node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Body {
    pub position: Vec2,
    pub velocity: Vec2,
}

/// Completed layout: one body per model node, in model order.
#[derive(Clone, Debug, PartialEq)]
pub struct Layout {
    viewport: Viewport,
    bodies: Vec<Body>,
    index_by_id: HashMap<String, usize>,
}

impl Layout {
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    /// Position of the node at `index` in model order.
    pub fn position_at(&self, index: usize) -> Option<Pos2> {
        self.bodies.get(index).map(|body| body.position.to_pos2())
    }

    pub fn position(&self, id: &str) -> Option<Pos2> {
        self.index_by_id
            .get(id)
            .and_then(|&index| self.position_at(index))
    }
}

/// A layout pass that can be advanced a few iterations at a time.
pub struct LayoutPass {
    viewport: Viewport,
    config: SimulationConfig,
    bodies: Vec<Body>,
    edges: Vec<(usize, usize)>,
    index_by_id: HashMap<String, usize>,
    completed: usize,
    scratch: Vec<Vec2>,
    started: Instant,
}

impl LayoutPass {
    pub fn new<R: Rng + ?Sized>(
        model: &GraphModel,
        viewport: Viewport,
        config: SimulationConfig,
        rng: &mut R,
    ) -> Self {
        let bodies = model
            .nodes
            .iter()
            .map(|_| Body {
                position: vec2(
                    rng.random_range(0.0..=viewport.width),
                    rng.random_range(0.0..=viewport.height),
                ),
                velocity: Vec2::ZERO,
            })
            .collect::<Vec<_>>();

        let mut index_by_id = HashMap::with_capacity(model.nodes.len());
        for (index, node) in model.nodes.iter().enumerate() {
            index_by_id.entry(node.id.clone()).or_insert(index);
        }

        let mut edges = Vec::with_capacity(model.edges.len());
        for edge in &model.edges {
            match (index_by_id.get(&edge.from), index_by_id.get(&edge.to)) {
                (Some(&from), Some(&to)) => edges.push((from, to)),
                _ => tracing::debug!(edge = %edge.id, "skipping edge with a missing endpoint"),
            }
        }

        Self {
            viewport,
            config,
            bodies,
            edges,
            index_by_id,
            completed: 0,
            scratch: Vec::new(),
            started: Instant::now(),
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn completed(&self) -> usize {
        self.completed
    }

    pub fn total(&self) -> usize {
        self.config.iterations
    }

    pub fn is_finished(&self) -> bool {
        self.completed >= self.config.iterations
    }

    /// Runs up to `max_iterations` more iterations. Returns whether the pass
    /// is finished.
    pub fn step(&mut self, max_iterations: usize) -> bool {
        let remaining = self.config.iterations.saturating_sub(self.completed);
        for _ in 0..remaining.min(max_iterations) {
            self.iterate();
        }
        self.is_finished()
    }

    fn iterate(&mut self) {
        let config = &self.config;
        if config.uses_barnes_hut(self.bodies.len()) {
            apply_repulsion_barnes_hut(
                &mut self.bodies,
                &mut self.scratch,
                config.repulsion,
                config.barnes_hut_theta,
            );
        } else {
            apply_repulsion_exact(&mut self.bodies, config.repulsion);
        }
        apply_attraction(&mut self.bodies, &self.edges, config.attraction);
        apply_gravity(&mut self.bodies, self.viewport, config.gravity);
        integrate(&mut self.bodies, self.viewport, config);
        self.completed += 1;
    }

    /// Runs whatever is left and hands over the finished layout. Positions
    /// are clamped once more so a pass of zero iterations is bounded too.
    pub fn finish(mut self) -> Layout {
        self.step(usize::MAX);
        clamp_into(&mut self.bodies, self.viewport, self.config.padding);
        tracing::debug!(
            nodes = self.bodies.len(),
            edges = self.edges.len(),
            iterations = self.completed,
            elapsed_ms = self.started.elapsed().as_secs_f64() * 1000.0,
            "layout pass finished"
        );
        Layout {
            viewport: self.viewport,
            bodies: self.bodies,
            index_by_id: self.index_by_id,
        }
    }
}

/// One full, blocking layout pass.
pub fn run_layout<R: Rng + ?Sized>(
    model: &GraphModel,
    viewport: Viewport,
    config: &SimulationConfig,
    rng: &mut R,
) -> Layout {
    LayoutPass::new(model, viewport, config.clone(), rng).finish()
}
