use eframe::egui::{self, RichText, ScrollArea, Ui};

use crate::data::cache::CacheEntry;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Floating windows
// ---------------------------------------------------------------------------

/// Render whichever dialog windows are currently open.
pub fn show(ctx: &egui::Context, state: &mut AppState) {
    cache_picker(ctx, state);
    save_import(ctx, state);
    report_window(ctx, state);
}

/// List of cached datasets; a click opens one.
fn cache_picker(ctx: &egui::Context, state: &mut AppState) {
    let Some(names) = state.cache_picker.clone() else {
        return;
    };

    let mut open = true;
    let mut chosen = None;
    egui::Window::new("Chọn bộ dữ liệu")
        .open(&mut open)
        .collapsible(false)
        .default_size([300.0, 400.0])
        .show(ctx, |ui: &mut Ui| {
            ScrollArea::vertical().show(ui, |ui: &mut Ui| {
                for name in &names {
                    if ui
                        .add_sized(
                            [ui.available_width(), 22.0],
                            egui::Button::new(name.as_str()),
                        )
                        .clicked()
                    {
                        chosen = Some(name.clone());
                    }
                }
            });
        });

    if let Some(name) = chosen {
        if let Err(e) = state.open_cached(&name) {
            state.fail(&e);
        }
    } else if !open {
        state.cache_picker = None;
    }
}

/// Name prompt for a freshly imported dataset.
fn save_import(ctx: &egui::Context, state: &mut AppState) {
    let Some(pending) = state.pending_import.as_mut() else {
        return;
    };

    let mut save = false;
    let mut cancel = false;
    let files = pending.files.len();
    let rows = pending.dataset.len();
    let cache = &state.cache;
    egui::Window::new("Lưu bộ dữ liệu")
        .collapsible(false)
        .resizable(false)
        .show(ctx, |ui: &mut Ui| {
            ui.label(format!("{rows} dòng từ {files} tệp:"));
            for path in &pending.files {
                ui.label(RichText::new(format!("- {}", path.display())).small());
            }
            ui.add_space(6.0);
            ui.label("Nhập tên cho bộ dữ liệu này:");
            let edit = ui.text_edit_singleline(&mut pending.name_input);
            if cache.contains(pending.name_input.trim()) {
                ui.label(
                    RichText::new("Tên này đã có trong bộ nhớ đệm, lưu sẽ hỏi ghi đè.").small(),
                );
            }
            if edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                save = true;
            }
            ui.horizontal(|ui: &mut Ui| {
                save |= ui.button("Lưu").clicked();
                cancel = ui.button("Hủy").clicked();
            });
        });

    if cancel {
        state.cancel_import();
    } else if save {
        let name = pending.name_input.clone();
        if let Err(e) = state.save_pending(&name, confirm_overwrite) {
            state.fail(&e);
        }
    }
}

fn confirm_overwrite(entry: &CacheEntry) -> bool {
    let file = entry
        .path
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| entry.name.clone());
    let answer = rfd::MessageDialog::new()
        .set_level(rfd::MessageLevel::Warning)
        .set_title("Xác nhận")
        .set_description(format!("File '{file}' đã tồn tại. Ghi đè?"))
        .set_buttons(rfd::MessageButtons::YesNo)
        .show();
    matches!(answer, rfd::MessageDialogResult::Yes)
}

/// Graduation analysis summary.
fn report_window(ctx: &egui::Context, state: &mut AppState) {
    let Some(report) = &state.report else {
        return;
    };
    let text = report.to_string();

    let mut open = true;
    egui::Window::new("Phân tích Kết quả Tốt nghiệp")
        .open(&mut open)
        .collapsible(false)
        .resizable(false)
        .show(ctx, |ui: &mut Ui| {
            ui.label(RichText::new(text).monospace());
        });
    if !open {
        state.report = None;
    }
}
