use eframe::egui::{self, Align2, Color32, FontId, Sense, Ui, vec2};

use super::super::{RelatedRequest, ViewModel};
use super::super::physics::Viewport;
use super::super::render::{PainterSurface, render};

impl ViewModel {
    /// Paints the graph and resolves clicks. Returns the related fetch for a
    /// newly selected node.
    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) -> Option<RelatedRequest> {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click());
        let painter = ui.painter_at(rect);

        self.resize(Viewport::new(rect.width(), rect.height()));
        if self.advance_layout() {
            ui.ctx().request_repaint();
        }

        let (Some(model), Some(layout)) = (self.model.as_ref(), self.layout.as_ref()) else {
            let text = match self.layout_progress() {
                Some((done, total)) => format!("Laying out graph... {done}/{total}"),
                None => "No graph loaded.".to_owned(),
            };
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                text,
                FontId::proportional(14.0),
                Color32::from_gray(200),
            );
            return None;
        };

        let stats = render(
            &mut PainterSurface::new(&painter),
            model,
            layout,
            self.selected.as_deref(),
        );
        self.record_draw(stats);

        let to_viewport = |pos: egui::Pos2| pos - rect.min.to_vec2();
        let hovered = response
            .hover_pos()
            .and_then(|pointer| self.node_at(to_viewport(pointer)).map(str::to_owned));

        if let Some(hovered) = &hovered {
            ui.output_mut(|output| {
                output.cursor_icon = egui::CursorIcon::PointingHand;
            });
            if let Some(node) = self.model.as_ref().and_then(|model| model.node(hovered)) {
                painter.text(
                    rect.left_top() + vec2(10.0, 10.0),
                    Align2::LEFT_TOP,
                    format!("{}  |  {}  |  {}", node.label, node.group, node.id),
                    FontId::proportional(13.0),
                    Color32::from_gray(240),
                );
            }
        }

        let pointer = response
            .clicked_by(egui::PointerButton::Primary)
            .then(|| response.interact_pointer_pos())
            .flatten()?;
        self.click(to_viewport(pointer))
    }
}
