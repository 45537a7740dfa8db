use std::f32::consts::{FRAC_PI_2, TAU};

use eframe::egui::{self, Align2, Color32, FontId, Pos2, RichText, Shape, Stroke, Ui};
use egui_plot::{Bar, BarChart, Legend, Plot};

use crate::color::ColorMap;
use crate::data::summary::ProportionSummary;
use crate::state::{AppState, ChartKind};

const CHART_HEIGHT: f32 = 280.0;

// ---------------------------------------------------------------------------
// Proportion charts (central panel)
// ---------------------------------------------------------------------------

/// Raw and filtered proportions of the target column, side by side.
pub fn proportion_charts(ui: &mut Ui, state: &AppState) {
    let Some(session) = &state.session else {
        return;
    };
    let Some(output) = &session.output else {
        ui.label(
            RichText::new(format!(
                "no proportions: column '{}' not found",
                state.config.target_column
            ))
            .color(Color32::RED),
        );
        return;
    };

    ui.columns(2, |cols: &mut [Ui]| {
        let panels = [
            ("Raw data", "raw", &output.raw_summary),
            ("Filtered data", "filtered", &output.filtered_summary),
        ];
        for (ui, (title, id, summary)) in cols.iter_mut().zip(panels) {
            ui.vertical_centered(|ui: &mut Ui| ui.strong(title));
            if summary.is_empty() {
                ui.label("No rows.");
                continue;
            }
            match state.chart_kind {
                ChartKind::Bars => bar_chart(ui, id, summary, &session.color_map),
                ChartKind::Pie => pie_chart(ui, summary, &session.color_map),
            }
        }
    });
}

fn bar_chart(ui: &mut Ui, id: &str, summary: &ProportionSummary, colors: &ColorMap) {
    Plot::new(format!("{id}_proportions"))
        .legend(Legend::default())
        .height(CHART_HEIGHT)
        .y_axis_label("%")
        .include_y(0.0)
        .include_y(100.0)
        .show_x(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .show(ui, |plot_ui| {
            // One chart per category so each gets its own legend entry.
            for (i, (value, pct)) in summary.entries.iter().enumerate() {
                let color = colors.color_for(value);
                let bar = Bar::new(i as f64, *pct).width(0.6).fill(color);
                plot_ui.bar_chart(BarChart::new(vec![bar]).name(value.to_string()).color(color));
            }
        });
}

fn pie_chart(ui: &mut Ui, summary: &ProportionSummary, colors: &ColorMap) {
    let size = egui::vec2(ui.available_width(), CHART_HEIGHT);
    let (response, painter) = ui.allocate_painter(size, egui::Sense::hover());
    let center = response.rect.center();
    let radius = 0.45 * response.rect.width().min(response.rect.height());

    // Start at twelve o'clock, go clockwise.
    let mut start = -FRAC_PI_2;
    for (value, pct) in &summary.entries {
        let sweep = *pct as f32 / 100.0 * TAU;
        let fill = colors.color_for(value);
        for wedge in wedges(center, radius, start, sweep) {
            painter.add(Shape::convex_polygon(wedge, fill, Stroke::NONE));
        }

        let mid = start + sweep / 2.0;
        let label_at = center + 0.65 * radius * egui::vec2(mid.cos(), mid.sin());
        painter.text(
            label_at,
            Align2::CENTER_CENTER,
            format!("{value}\n{pct:.2}%"),
            FontId::proportional(12.0),
            Color32::BLACK,
        );
        start += sweep;
    }
}

/// Split a slice into convex pieces of at most a quarter turn each.
fn wedges(center: Pos2, radius: f32, start: f32, sweep: f32) -> Vec<Vec<Pos2>> {
    const ARC_STEPS: usize = 16;
    let pieces = (sweep / FRAC_PI_2).ceil().max(1.0) as usize;
    let piece_sweep = sweep / pieces as f32;

    (0..pieces)
        .map(|p| {
            let from = start + p as f32 * piece_sweep;
            let mut points = Vec::with_capacity(ARC_STEPS + 2);
            points.push(center);
            for s in 0..=ARC_STEPS {
                let angle = from + piece_sweep * s as f32 / ARC_STEPS as f32;
                points.push(center + radius * egui::vec2(angle.cos(), angle.sin()));
            }
            points
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn large_slices_are_split_into_quarter_turns() {
        let pieces = wedges(Pos2::ZERO, 1.0, 0.0, 2.5 * FRAC_PI_2);
        assert_eq!(pieces.len(), 3);
        assert!(pieces.iter().all(|p| p[0] == Pos2::ZERO && p.len() == 18));
    }

    #[test]
    fn tiny_slice_is_one_piece() {
        assert_eq!(wedges(Pos2::ZERO, 1.0, 0.0, 0.01).len(), 1);
    }
}
