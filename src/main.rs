//! Desktop entry point: bootstraps the egui shell around an editing
//! session.

use cutline::ui::EditorApp;
use eframe::egui;

fn main() -> eframe::Result<()> {
    env_logger::init();

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Cutline")
            .with_inner_size([1280.0, 720.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Cutline",
        native_options,
        Box::new(|cc| Box::new(EditorApp::new(cc))),
    )
}
