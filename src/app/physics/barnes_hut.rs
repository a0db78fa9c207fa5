//! Flat Barnes–Hut tree for the repulsion force. Cells live in one arena;
//! a split cell owns four consecutive children.

use eframe::egui::{Vec2, vec2};

use super::forces::repulsion_between;

const LEAF_CAPACITY: usize = 8;
const MAX_DEPTH: usize = 12;

/// Child offsets in units of the child's half extent.
const QUADRANTS: [Vec2; 4] = [
    Vec2::new(-1.0, -1.0),
    Vec2::new(1.0, -1.0),
    Vec2::new(-1.0, 1.0),
    Vec2::new(1.0, 1.0),
];

struct Cell {
    center: Vec2,
    half_extent: f32,
    /// Every body counts as unit mass.
    mass: f32,
    centroid: Vec2,
    /// Body indices, only filled on leaves.
    members: Vec<usize>,
    first_child: Option<usize>,
}

impl Cell {
    fn empty(center: Vec2, half_extent: f32) -> Self {
        Self {
            center,
            half_extent,
            mass: 0.0,
            centroid: Vec2::ZERO,
            members: Vec::new(),
            first_child: None,
        }
    }

    fn contains(&self, point: Vec2) -> bool {
        let offset = (point - self.center).abs();
        offset.x <= self.half_extent && offset.y <= self.half_extent
    }

    fn quadrant_of(&self, point: Vec2) -> usize {
        usize::from(point.x >= self.center.x) + 2 * usize::from(point.y >= self.center.y)
    }
}

pub(super) struct BarnesHutTree {
    cells: Vec<Cell>,
}

impl BarnesHutTree {
    /// `None` when there is nothing to build over or a position is not finite.
    pub(super) fn build(positions: &[Vec2]) -> Option<Self> {
        let (center, half_extent) = bounding_square(positions)?;
        let mut tree = Self {
            cells: vec![Cell::empty(center, half_extent)],
        };
        tree.fill(0, (0..positions.len()).collect(), positions, 0);
        Some(tree)
    }

    fn fill(&mut self, cell: usize, members: Vec<usize>, positions: &[Vec2], depth: usize) {
        let mass = members.len() as f32;
        let sum = members
            .iter()
            .fold(Vec2::ZERO, |sum, &index| sum + positions[index]);
        self.cells[cell].mass = mass;
        self.cells[cell].centroid = sum / mass.max(1.0);

        if depth >= MAX_DEPTH || members.len() <= LEAF_CAPACITY {
            self.cells[cell].members = members;
            return;
        }

        let mut buckets: [Vec<usize>; 4] = Default::default();
        for &index in &members {
            buckets[self.cells[cell].quadrant_of(positions[index])].push(index);
        }

        // Coincident bodies cannot be separated by splitting.
        if buckets.iter().filter(|bucket| !bucket.is_empty()).count() <= 1 {
            self.cells[cell].members = members;
            return;
        }

        let first = self.cells.len();
        let quarter = self.cells[cell].half_extent * 0.5;
        let center = self.cells[cell].center;
        self.cells.extend(
            QUADRANTS
                .iter()
                .map(|&direction| Cell::empty(center + direction * quarter, quarter)),
        );
        self.cells[cell].first_child = Some(first);

        for (offset, bucket) in buckets.into_iter().enumerate() {
            if !bucket.is_empty() {
                self.fill(first + offset, bucket, positions, depth + 1);
            }
        }
    }

    /// Velocity kick on body `index` from all other bodies. Cells that look
    /// small from the body (`side / distance < theta`) act as one mass at
    /// their centroid.
    pub(super) fn repulsion_on(
        &self,
        index: usize,
        positions: &[Vec2],
        strength: f32,
        theta: f32,
    ) -> Vec2 {
        let point = positions[index];
        let mut kick = Vec2::ZERO;
        let mut stack = vec![0];

        while let Some(id) = stack.pop() {
            let cell = &self.cells[id];
            if cell.mass <= 0.0 {
                continue;
            }

            let Some(first) = cell.first_child else {
                for &other in &cell.members {
                    if other != index {
                        kick += repulsion_between(point, positions[other], strength);
                    }
                }
                continue;
            };

            let distance = (point - cell.centroid).length().max(1.0);
            if !cell.contains(point) && cell.half_extent * 2.0 / distance < theta {
                kick += repulsion_between(point, cell.centroid, strength * cell.mass);
            } else {
                stack.extend(first..first + QUADRANTS.len());
            }
        }

        kick
    }
}

fn bounding_square(points: &[Vec2]) -> Option<(Vec2, f32)> {
    let (first, rest) = points.split_first()?;
    let (min, max) = rest
        .iter()
        .fold((*first, *first), |(min, max), point| (min.min(*point), max.max(*point)));

    if !(min.x.is_finite() && min.y.is_finite() && max.x.is_finite() && max.y.is_finite()) {
        return None;
    }

    let span = (max - min).max(vec2(1.0, 1.0)).max_elem();
    Some(((min + max) * 0.5, span * 0.5 + 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_holds_all_mass_at_the_centroid() {
        let positions = (0..40)
            .map(|i| vec2((i % 7) as f32 * 13.0, (i / 7) as f32 * 11.0))
            .collect::<Vec<_>>();
        let tree = BarnesHutTree::build(&positions).unwrap();
        let root = &tree.cells[0];

        let mean = positions.iter().fold(Vec2::ZERO, |sum, p| sum + *p) / 40.0;
        assert_eq!(root.mass, 40.0);
        assert!((root.centroid - mean).length() < 1e-3);
        assert!(root.first_child.is_some());
        assert!(positions.iter().all(|point| root.contains(*point)));
    }

    #[test]
    fn children_partition_their_parent() {
        let positions = (0..30)
            .map(|i| vec2(i as f32 * 17.0 % 200.0, i as f32 * 29.0 % 150.0))
            .collect::<Vec<_>>();
        let tree = BarnesHutTree::build(&positions).unwrap();

        for cell in &tree.cells {
            if let Some(first) = cell.first_child {
                let children = &tree.cells[first..first + 4];
                assert_eq!(children.iter().map(|child| child.mass).sum::<f32>(), cell.mass);
                assert!(cell.members.is_empty());
            }
        }
    }

    #[test]
    fn coincident_points_stay_in_one_leaf() {
        let positions = vec![vec2(5.0, 5.0); 30];
        let tree = BarnesHutTree::build(&positions).unwrap();
        assert_eq!(tree.cells.len(), 1);
        assert_eq!(tree.cells[0].members.len(), 30);
    }

    #[test]
    fn empty_or_non_finite_input_has_no_tree() {
        assert!(BarnesHutTree::build(&[]).is_none());
        assert!(BarnesHutTree::build(&[vec2(f32::NAN, 0.0)]).is_none());
    }

    #[test]
    fn lone_body_feels_nothing_from_itself() {
        let tree = BarnesHutTree::build(&[vec2(3.0, 4.0)]).unwrap();
        assert_eq!(tree.repulsion_on(0, &[vec2(3.0, 4.0)], 1000.0, 0.7), Vec2::ZERO);
    }
}
