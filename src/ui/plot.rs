use std::f32::consts::TAU;
use std::ops::RangeInclusive;

use eframe::egui::{self, Align2, Color32, FontId, Pos2, Shape, Stroke, Ui};
use egui_extras::{Column, TableBuilder};
use egui_plot::{Bar, BarChart, GridMark, Plot};

use crate::analysis::stats::{Grade, Histogram};
use crate::color::{grade_color, score_gradient, HISTOGRAM_FILL};
use crate::data::model::{ExamDataset, Subject};
use crate::state::{AppState, ChartData};

/// Rows shown by the record preview.
const PREVIEW_ROWS: usize = 500;

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render the chart (or the record preview) in the central panel.
pub fn central_panel(ui: &mut Ui, state: &mut AppState) {
    let Some(dataset) = &state.dataset else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Mở bộ dữ liệu đã lưu hoặc nhập mới từ Excel để bắt đầu");
        });
        return;
    };

    if state.show_preview {
        preview_table(ui, dataset);
        return;
    }

    let subject = state.subject;
    let Some(data) = state.chart_data().cloned() else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Chọn một biểu đồ ở bảng điều khiển");
        });
        return;
    };

    match data {
        ChartData::Distribution(hist) => {
            if let Some(bin) = histogram(ui, &hist, subject) {
                state.picked_bin = Some(bin);
            }
            if let Some((start, end, count)) = state.picked_bin {
                ui.label(format!(
                    "Số lượng: {count} thí sinh trong khoảng điểm [{start:.2} - {end:.2}]"
                ));
            }
        }
        ChartData::Classification(grades) => grade_pie(ui, &grades, subject),
        ChartData::RegionComparison(avgs) => region_bars(ui, &avgs, subject),
    }
}

// ---------------------------------------------------------------------------
// Charts
// ---------------------------------------------------------------------------

/// Score histogram. Returns the bin the user clicked, if any.
fn histogram(ui: &mut Ui, hist: &Histogram, subject: Subject) -> Option<(f64, f64, usize)> {
    ui.heading(format!(
        "Phân phối điểm môn {subject} ({} thí sinh)",
        hist.total()
    ));
    if hist.is_empty() {
        ui.label("Không có điểm nào cho môn này.");
        return None;
    }

    let bars: Vec<Bar> = (0..hist.counts.len())
        .filter_map(|i| hist.bin(i))
        .map(|(start, end, count)| {
            Bar::new((start + end) / 2.0, count as f64)
                .width(end - start)
                .fill(HISTOGRAM_FILL)
                .stroke(Stroke::new(1.0, Color32::WHITE))
        })
        .collect();

    let chart = BarChart::new(bars).element_formatter(Box::new(
        |bar: &Bar, _chart: &BarChart| format!("{:.2}: {} thí sinh", bar.argument, bar.value),
    ));

    Plot::new("score_histogram")
        .x_axis_label("Điểm")
        .y_axis_label("Số lượng thí sinh")
        .include_x(-0.5)
        .include_x(10.5)
        .include_y(0.0)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(chart);
            if !plot_ui.response().clicked() {
                return None;
            }
            let x = plot_ui.pointer_coordinate()?.x;
            hist.bin(hist.bin_index(x)?)
        })
        .inner
}

/// Pie of the grade shares with percentage labels.
fn grade_pie(ui: &mut Ui, grades: &[(Grade, usize)], subject: Subject) {
    ui.heading(format!("Tỷ lệ xếp loại môn {subject}"));
    let total: usize = grades.iter().map(|(_, n)| n).sum();
    if total == 0 {
        ui.label("Không có điểm nào cho môn này.");
        return;
    }

    let size = ui.available_size();
    let (rect, _) = ui.allocate_exact_size(size, egui::Sense::hover());
    let painter = ui.painter_at(rect);
    let center = rect.center();
    let radius = rect.width().min(rect.height()) * 0.38;
    let text_color = ui.visuals().text_color();

    // Start at 140° like a conventional pie, counter-clockwise.
    let mut angle = 140f32.to_radians();
    for (grade, count) in grades {
        let sweep = *count as f32 / total as f32 * TAU;
        let color = grade_color(*grade);
        for shape in wedge(center, radius, angle, sweep, color) {
            painter.add(shape);
        }

        let mid = angle + sweep / 2.0;
        let share = *count as f64 / total as f64 * 100.0;
        painter.text(
            polar(center, radius * 0.65, mid),
            Align2::CENTER_CENTER,
            format!("{share:.1}%"),
            FontId::proportional(14.0),
            Color32::BLACK,
        );
        painter.text(
            polar(center, radius * 1.15, mid),
            Align2::CENTER_CENTER,
            grade.label(),
            FontId::proportional(15.0),
            text_color,
        );
        angle += sweep;
    }
}

/// Point at `angle` (radians, counter-clockwise, screen y pointing down).
fn polar(center: Pos2, radius: f32, angle: f32) -> Pos2 {
    Pos2::new(center.x + radius * angle.cos(), center.y - radius * angle.sin())
}

/// A pie wedge as convex pieces of at most a quarter turn each.
fn wedge(center: Pos2, radius: f32, start: f32, sweep: f32, fill: Color32) -> Vec<Shape> {
    const MAX_PIECE: f32 = TAU / 4.0;
    const STEP: f32 = TAU / 180.0;
    let stroke = Stroke::new(1.0, Color32::WHITE);

    let mut shapes = Vec::new();
    let mut from = start;
    let end = start + sweep;
    while from < end {
        let to = (from + MAX_PIECE).min(end);
        let steps = (((to - from) / STEP).ceil() as usize).max(1);
        let mut points = vec![center];
        points.extend((0..=steps).map(|i| {
            polar(center, radius, from + (to - from) * i as f32 / steps as f32)
        }));
        shapes.push(Shape::convex_polygon(points, fill, stroke));
        from = to;
    }
    shapes
}

/// Horizontal bars of the mean score per region, lowest at the bottom.
fn region_bars(ui: &mut Ui, avgs: &[(String, f64)], subject: Subject) {
    ui.heading(format!("Điểm trung bình môn {subject} theo Tỉnh/Thành phố"));
    if avgs.is_empty() {
        ui.label("Không có tỉnh nào có điểm cho môn này.");
        return;
    }

    let lo = avgs.first().map(|(_, v)| *v).unwrap_or_default();
    let hi = avgs.last().map(|(_, v)| *v).unwrap_or_default();
    let bars: Vec<Bar> = avgs
        .iter()
        .enumerate()
        .map(|(i, (region, mean))| {
            Bar::new(i as f64, *mean)
                .name(region)
                .width(0.7)
                .fill(score_gradient(*mean, lo, hi))
        })
        .collect();
    let chart = BarChart::new(bars)
        .horizontal()
        .element_formatter(Box::new(|bar: &Bar, _chart: &BarChart| {
            format!("{}: {:.2}", bar.name, bar.value)
        }));

    let names: Vec<String> = avgs.iter().map(|(n, _)| n.clone()).collect();
    Plot::new("region_comparison")
        .x_axis_label(format!("Điểm trung bình {subject}"))
        .y_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
            region_tick_label(&names, mark.value)
        })
        .include_x(0.0)
        .allow_scroll(false)
        .show(ui, |plot_ui| plot_ui.bar_chart(chart));
}

/// Region name at integral tick positions, empty elsewhere.
fn region_tick_label(names: &[String], value: f64) -> String {
    let idx = value.round();
    if (value - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    names.get(idx as usize).cloned().unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Record preview
// ---------------------------------------------------------------------------

fn preview_table(ui: &mut Ui, dataset: &ExamDataset) {
    if dataset.is_empty() {
        ui.label("Bộ dữ liệu rỗng.");
        return;
    }
    let rows = dataset.len().min(PREVIEW_ROWS);
    ui.label(format!("{rows} / {} dòng đầu tiên", dataset.len()));

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .column(Column::auto().at_least(90.0))
        .columns(Column::auto().at_least(48.0), Subject::COUNT)
        .column(Column::auto())
        .column(Column::remainder())
        .header(20.0, |mut header| {
            header.col(|ui| {
                ui.strong("SBD");
            });
            for subject in Subject::ALL {
                header.col(|ui| {
                    ui.strong(subject.column_name());
                });
            }
            header.col(|ui| {
                ui.strong("Mã tỉnh");
            });
            header.col(|ui| {
                ui.strong("Tỉnh");
            });
        })
        .body(|body| {
            body.rows(18.0, rows, |mut row| {
                let record = &dataset.records[row.index()];
                row.col(|ui| {
                    ui.label(&record.candidate_id);
                });
                for subject in Subject::ALL {
                    row.col(|ui| {
                        if let Some(score) = record.score(subject) {
                            ui.label(format!("{score}"));
                        }
                    });
                }
                row.col(|ui| {
                    ui.label(record.region_code.as_deref().unwrap_or("–"));
                });
                row.col(|ui| {
                    ui.label(record.region_name.as_deref().unwrap_or("–"));
                });
            });
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_labels_only_on_bar_positions() {
        let names = vec!["Cà Mau".to_string(), "Hà Nội".to_string()];
        assert_eq!(region_tick_label(&names, 0.0), "Cà Mau");
        assert_eq!(region_tick_label(&names, 1.0), "Hà Nội");
        assert_eq!(region_tick_label(&names, 0.5), "");
        assert_eq!(region_tick_label(&names, 2.0), "");
        assert_eq!(region_tick_label(&names, -1.0), "");
    }

    #[test]
    fn wedges_are_split_into_quarter_turns() {
        let center = Pos2::new(0.0, 0.0);
        assert_eq!(wedge(center, 10.0, 0.0, TAU * 0.9, Color32::RED).len(), 4);
        assert_eq!(wedge(center, 10.0, 0.0, TAU / 8.0, Color32::RED).len(), 1);
        assert!(wedge(center, 10.0, 0.0, 0.0, Color32::RED).is_empty());
    }
}
