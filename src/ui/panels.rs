use eframe::egui::{self, Color32, RichText, Ui};

use crate::data::model::Subject;
use crate::state::{AppState, ChartKind, StatusKind};

// ---------------------------------------------------------------------------
// Left side panel – controls
// ---------------------------------------------------------------------------

/// Render the left control panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Bảng điều khiển");
    ui.separator();

    let full = |ui: &mut Ui, text: &str, color: Color32| {
        ui.add_sized(
            [ui.available_width(), 28.0],
            egui::Button::new(RichText::new(text).strong()).fill(color),
        )
        .clicked()
    };

    if full(ui, "Mở bộ dữ liệu đã lưu", Color32::from_rgb(0x2e, 0x7d, 0x32)) {
        state.open_cache_picker();
    }
    if full(ui, "Nhập & Lưu mới từ Excel", Color32::from_rgb(0x01, 0x57, 0x9b)) {
        start_import(state);
    }

    ui.add_space(6.0);
    status_label(ui, state);

    ui.separator();

    // ---- Subject selector ----
    ui.label("Chọn môn học:");
    let mut subject = state.subject;
    egui::ComboBox::from_id_salt("subject")
        .selected_text(subject.column_name())
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            for s in Subject::ALL {
                ui.selectable_value(&mut subject, s, s.column_name());
            }
        });
    if subject != state.subject {
        state.set_subject(subject);
    }

    if let Some(summary) = state.subject_summary() {
        ui.label(
            RichText::new(format!(
                "{} thí sinh · TB {:.2} · {:.2}–{:.2}",
                summary.count, summary.mean, summary.min, summary.max
            ))
            .small(),
        );
    }

    ui.add_space(6.0);

    // ---- Chart buttons ----
    for chart in ChartKind::ALL {
        let selected = state.chart == Some(chart) && !state.show_preview;
        if ui
            .add_sized(
                [ui.available_width(), 24.0],
                egui::SelectableLabel::new(selected, chart.label()),
            )
            .clicked()
        {
            state.show_chart(chart);
        }
    }

    ui.separator();

    if full(ui, "Phân tích Tốt nghiệp", Color32::from_rgb(0xc6, 0x28, 0x28)) {
        state.run_graduation_analysis();
    }
}

fn status_label(ui: &mut Ui, state: &AppState) {
    match &state.status {
        Some(status) => {
            let color = match status.kind {
                StatusKind::Info => ui.visuals().text_color(),
                StatusKind::Error => Color32::RED,
            };
            ui.label(RichText::new(&status.text).color(color));
        }
        None if state.dataset.is_none() => {
            ui.label(RichText::new("Chưa có dữ liệu nào được nạp").italics());
        }
        None => {}
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("Tệp", |ui: &mut Ui| {
            if ui.button("Mở bộ dữ liệu đã lưu…").clicked() {
                state.open_cache_picker();
                ui.close_menu();
            }
            if ui.button("Nhập & Lưu mới…").clicked() {
                start_import(state);
                ui.close_menu();
            }
            if ui.button("Chọn thư mục nguồn…").clicked() {
                pick_source_dir(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let (Some(ds), Some(name)) = (&state.dataset, &state.dataset_name) {
            ui.label(format!("Đang dùng: {name} ({} thí sinh)", ds.len()));
            ui.separator();
        }

        if ui
            .selectable_label(state.show_preview, "Xem dữ liệu")
            .clicked()
        {
            state.show_preview = !state.show_preview;
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.label(
                RichText::new(format!("Nguồn: {}", state.source_dir().display())).weak(),
            );
        });
    });
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// Read the source files; the save dialog opens when this succeeds.
pub fn start_import(state: &mut AppState) {
    match state.import_sources() {
        Ok(rows) => {
            let files = state
                .pending_import
                .as_ref()
                .map(|p| p.files.len())
                .unwrap_or_default();
            state.info(format!("Đã đọc {rows} dòng từ {files} tệp. Nhập tên để lưu."));
        }
        Err(e) => state.fail(&e),
    }
}

fn pick_source_dir(state: &mut AppState) {
    let dir = rfd::FileDialog::new()
        .set_title("Chọn thư mục chứa tệp kết quả thi")
        .set_directory(state.source_dir())
        .pick_folder();

    if let Some(dir) = dir {
        state.set_source_dir(dir);
    }
}
