mod analysis;
mod app;
mod color;
mod config;
mod data;
mod error;
mod state;
mod ui;

use app::ExamScopeApp;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([700.0, 450.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Phân tích Điểm thi THPT Quốc gia",
        options,
        Box::new(|cc| {
            cc.egui_ctx.set_visuals(egui::Visuals::dark());
            Ok(Box::new(ExamScopeApp::default()))
        }),
    )
}
