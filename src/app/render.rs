use eframe::egui::{Align2, Color32, FontId, Painter, Pos2, Stroke, Vec2, vec2};

use crate::graph::{GraphModel, GroupTag, Node};
use crate::util::truncate_label;

use super::physics::Layout;

pub const DEFAULT_NODE_RADIUS: f32 = 20.0;
pub const MAX_LABEL_CHARS: usize = 16;

const BACKGROUND: Color32 = Color32::from_rgb(19, 23, 29);
const EDGE_COLOR: Color32 = Color32::from_rgba_premultiplied(88, 98, 112, 200);
const LABEL_COLOR: Color32 = Color32::from_gray(228);
const NEUTRAL_FILL: Color32 = Color32::from_rgb(128, 132, 140);
const SELECTED_STROKE: Color32 = Color32::from_rgb(245, 206, 93);
const LABEL_GAP: f32 = 4.0;

/// Drawing target in viewport coordinates (origin at the top-left corner of
/// the graph area).
pub trait Surface {
    fn clear(&mut self, color: Color32);
    fn line(&mut self, from: Pos2, to: Pos2, stroke: Stroke);
    fn circle(&mut self, center: Pos2, radius: f32, fill: Color32, stroke: Stroke);
    fn text(&mut self, anchor: Pos2, text: &str, color: Color32);
}

/// egui painter clipped to the graph rect; viewport coordinates are shifted
/// by the rect's top-left corner.
pub struct PainterSurface<'a> {
    painter: &'a Painter,
    offset: Vec2,
}

impl<'a> PainterSurface<'a> {
    pub fn new(painter: &'a Painter) -> Self {
        Self {
            painter,
            offset: painter.clip_rect().min.to_vec2(),
        }
    }
}

impl Surface for PainterSurface<'_> {
    fn clear(&mut self, color: Color32) {
        self.painter
            .rect_filled(self.painter.clip_rect(), 0.0, color);
    }

    fn line(&mut self, from: Pos2, to: Pos2, stroke: Stroke) {
        self.painter
            .line_segment([from + self.offset, to + self.offset], stroke);
    }

    fn circle(&mut self, center: Pos2, radius: f32, fill: Color32, stroke: Stroke) {
        self.painter
            .circle(center + self.offset, radius, fill, stroke);
    }

    fn text(&mut self, anchor: Pos2, text: &str, color: Color32) {
        self.painter.text(
            anchor + self.offset,
            Align2::CENTER_TOP,
            text,
            FontId::proportional(12.0),
            color,
        );
    }
}

/// Counts of what actually reached the surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DrawStats {
    pub nodes: usize,
    pub edges: usize,
}

pub fn group_color(group: GroupTag) -> Color32 {
    match group {
        GroupTag::Person => Color32::from_rgb(74, 144, 217),
        GroupTag::Agent => Color32::from_rgb(155, 89, 182),
        GroupTag::Team => Color32::from_rgb(80, 200, 120),
        GroupTag::Project => Color32::from_rgb(230, 126, 34),
        GroupTag::Task => Color32::from_rgb(241, 196, 15),
        GroupTag::Document => Color32::from_rgb(26, 188, 156),
        GroupTag::Goal => Color32::from_rgb(231, 76, 60),
        GroupTag::Workflow => Color32::from_rgb(52, 152, 219),
        GroupTag::Unknown => NEUTRAL_FILL,
    }
}

pub fn node_radius(node: &Node) -> f32 {
    node.size
        .filter(|size| size.is_finite() && *size > 0.0)
        .unwrap_or(DEFAULT_NODE_RADIUS)
}

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;

    Color32::from_rgba_unmultiplied(
        ((base.r() as f32 * inverse) + (overlay.r() as f32 * amount)) as u8,
        ((base.g() as f32 * inverse) + (overlay.g() as f32 * amount)) as u8,
        ((base.b() as f32 * inverse) + (overlay.b() as f32 * amount)) as u8,
        ((base.a() as f32 * inverse) + (overlay.a() as f32 * amount)) as u8,
    )
}

fn node_stroke(fill: Color32, selected: bool) -> Stroke {
    if selected {
        Stroke::new(3.5, SELECTED_STROKE)
    } else {
        Stroke::new(1.0, blend_color(fill, Color32::BLACK, 0.45))
    }
}

/// Paints edges, then nodes, then labels. Edges or nodes without a laid-out
/// position are skipped.
pub fn render(
    surface: &mut dyn Surface,
    model: &GraphModel,
    layout: &Layout,
    selected: Option<&str>,
) -> DrawStats {
    let mut stats = DrawStats::default();
    surface.clear(BACKGROUND);

    let edge_stroke = Stroke::new(1.2, EDGE_COLOR);
    for edge in &model.edges {
        let (Some(from), Some(to)) = (layout.position(&edge.from), layout.position(&edge.to))
        else {
            continue;
        };
        surface.line(from, to, edge_stroke);
        stats.edges += 1;
    }

    let mut labels = Vec::with_capacity(model.nodes.len());
    for (index, node) in model.nodes.iter().enumerate() {
        let Some(center) = layout.position_at(index) else {
            continue;
        };
        let radius = node_radius(node);
        let fill = group_color(node.group);
        let is_selected = selected == Some(node.id.as_str());

        surface.circle(center, radius, fill, node_stroke(fill, is_selected));
        labels.push((center + vec2(0.0, radius + LABEL_GAP), node));
        stats.nodes += 1;
    }

    for (anchor, node) in labels {
        surface.text(anchor, &truncate_label(&node.label, MAX_LABEL_CHARS), LABEL_COLOR);
    }

    stats
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    pub(crate) enum DrawCommand {
        Clear(Color32),
        Line(Pos2, Pos2),
        Circle {
            center: Pos2,
            radius: f32,
            fill: Color32,
            stroke: Stroke,
        },
        Text(Pos2, String),
    }

    #[derive(Default)]
    pub(crate) struct RecordingSurface {
        pub(crate) commands: Vec<DrawCommand>,
    }

    impl Surface for RecordingSurface {
        fn clear(&mut self, color: Color32) {
            self.commands.push(DrawCommand::Clear(color));
        }

        fn line(&mut self, from: Pos2, to: Pos2, _stroke: Stroke) {
            self.commands.push(DrawCommand::Line(from, to));
        }

        fn circle(&mut self, center: Pos2, radius: f32, fill: Color32, stroke: Stroke) {
            self.commands.push(DrawCommand::Circle {
                center,
                radius,
                fill,
                stroke,
            });
        }

        fn text(&mut self, anchor: Pos2, text: &str, _color: Color32) {
            self.commands.push(DrawCommand::Text(anchor, text.to_owned()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{DrawCommand, RecordingSurface};
    use super::*;
    use crate::app::physics::{SimulationConfig, Viewport, run_layout};
    use crate::graph::Edge;

    fn laid_out(model: &GraphModel) -> Layout {
        let config = SimulationConfig {
            seed: Some(9),
            ..SimulationConfig::default()
        };
        run_layout(model, Viewport::new(800.0, 600.0), &config, &mut config.rng())
    }

    fn sample() -> GraphModel {
        let mut big = Node::new("doc", "An extremely long document title", GroupTag::Document);
        big.size = Some(32.0);
        GraphModel::new(
            vec![
                Node::new("p", "Pat", GroupTag::Person),
                big,
                Node::new("x", "Mystery", GroupTag::Unknown),
            ],
            vec![
                Edge::new("e1", "p", "doc"),
                Edge::new("e2", "doc", "x"),
                Edge::new("e3", "p", "missing"),
            ],
        )
    }

    #[test]
    fn dangling_edge_is_not_drawn() {
        let model = sample();
        let layout = laid_out(&model);
        let mut surface = RecordingSurface::default();

        let stats = render(&mut surface, &model, &layout, None);
        assert_eq!(stats, DrawStats { nodes: 3, edges: 2 });
    }

    #[test]
    fn edges_come_before_nodes_and_labels_last() {
        let model = sample();
        let layout = laid_out(&model);
        let mut surface = RecordingSurface::default();
        render(&mut surface, &model, &layout, None);

        let kinds = surface
            .commands
            .iter()
            .map(|command| match command {
                DrawCommand::Clear(_) => 'c',
                DrawCommand::Line(..) => 'l',
                DrawCommand::Circle { .. } => 'o',
                DrawCommand::Text(..) => 't',
            })
            .collect::<String>();
        assert_eq!(kinds, "cllooottt");
    }

    #[test]
    fn selection_gets_a_heavier_stroke_and_palette_applies() {
        let model = sample();
        let layout = laid_out(&model);
        let mut surface = RecordingSurface::default();
        render(&mut surface, &model, &layout, Some("doc"));

        let circles = surface
            .commands
            .iter()
            .filter_map(|command| match command {
                DrawCommand::Circle {
                    radius,
                    fill,
                    stroke,
                    ..
                } => Some((*radius, *fill, *stroke)),
                _ => None,
            })
            .collect::<Vec<_>>();

        assert_eq!(circles[0].0, DEFAULT_NODE_RADIUS);
        assert_eq!(circles[1].0, 32.0);
        assert_eq!(circles[2].1, NEUTRAL_FILL);
        assert!(circles[1].2.width > circles[0].2.width);
        assert_eq!(circles[1].2.color, SELECTED_STROKE);
    }

    #[test]
    fn labels_are_truncated_and_sit_below_the_circle() {
        let model = sample();
        let layout = laid_out(&model);
        let mut surface = RecordingSurface::default();
        render(&mut surface, &model, &layout, None);

        let labels = surface
            .commands
            .iter()
            .filter_map(|command| match command {
                DrawCommand::Text(anchor, text) => Some((*anchor, text.clone())),
                _ => None,
            })
            .collect::<Vec<_>>();

        assert_eq!(labels[1].1, "An extremely lon…");
        let doc = layout.position("doc").unwrap();
        assert_eq!(labels[1].0, doc + vec2(0.0, 32.0 + LABEL_GAP));
    }

    #[test]
    fn invalid_size_falls_back_to_default_radius() {
        let mut node = Node::new("n", "N", GroupTag::Goal);
        node.size = Some(-3.0);
        assert_eq!(node_radius(&node), DEFAULT_NODE_RADIUS);
    }

    #[test]
    fn edges_to_a_duplicated_id_attach_to_its_first_node() {
        let model = GraphModel::new(
            vec![
                Node::new("dup", "First", GroupTag::Goal),
                Node::new("p", "Pat", GroupTag::Person),
                Node::new("dup", "Second", GroupTag::Goal),
            ],
            vec![Edge::new("e", "p", "dup")],
        );
        let layout = laid_out(&model);
        let mut surface = RecordingSurface::default();

        let stats = render(&mut surface, &model, &layout, Some("dup"));
        assert_eq!(stats, DrawStats { nodes: 3, edges: 1 });

        let first = layout.position_at(0).unwrap();
        let pat = layout.position_at(1).unwrap();
        assert!(surface.commands.contains(&DrawCommand::Line(pat, first)));

        let selected = surface
            .commands
            .iter()
            .filter(|command| {
                matches!(command, DrawCommand::Circle { stroke, .. } if stroke.color == SELECTED_STROKE)
            })
            .count();
        assert_eq!(selected, 2);
    }
}
