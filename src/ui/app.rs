//! Main application shell: menu bar, transport controls, and the timeline
//! panel, all driving one [`EditorSession`].

use eframe::egui::{self, Context};
use eframe::{App, CreationContext, Frame};
use log::error;

use crate::core::time::format_time;
use crate::interaction::Tool;
use crate::model::{MediaKind, ProjectSettings};
use crate::persist::JsonProjectStore;
use crate::playback::PlayState;
use crate::session::EditorSession;
use crate::sync::{HeadlessRenderer, RendererConfig};
use crate::ui::timeline_view::{TimelineResponse, TimelineView};

pub struct EditorApp {
    session: Option<EditorSession<HeadlessRenderer>>,
    timeline: TimelineView,
    store: JsonProjectStore,
    /// Drives the store's async file I/O from the UI thread; the store
    /// needs a runtime context even for blocking saves.
    rt: Option<tokio::runtime::Runtime>,
    status: String,
}

impl EditorApp {
    pub fn new(_cc: &CreationContext<'_>) -> Self {
        let session = match EditorSession::new(
            "Untitled",
            ProjectSettings::default(),
            HeadlessRenderer::new(),
            RendererConfig::default(),
        ) {
            Ok(s) => Some(s),
            Err(e) => {
                error!("failed to start editing session: {e}");
                None
            }
        };
        let rt = match Self::io_runtime() {
            Ok(rt) => Some(rt),
            Err(e) => {
                error!("failed to start I/O runtime: {e}");
                None
            }
        };
        Self {
            session,
            timeline: TimelineView::new(),
            store: JsonProjectStore::new("projects"),
            rt,
            status: String::new(),
        }
    }

    fn io_runtime() -> std::io::Result<tokio::runtime::Runtime> {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
    }

    fn menu_bar(&mut self, ui: &mut egui::Ui) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        egui::menu::bar(ui, |ui| {
            ui.menu_button("File", |ui| {
                if ui.button("Save").clicked() {
                    match self.rt.as_ref() {
                        Some(rt) => match rt.block_on(session.save(&self.store)) {
                            Ok(path) => self.status = format!("Saved to {}", path.display()),
                            Err(e) => {
                                error!("save failed: {e}");
                                self.status = format!("Save failed: {e}");
                            }
                        },
                        None => self.status = "Save failed: no I/O runtime".to_string(),
                    }
                    ui.close_menu();
                }
            });
            ui.menu_button("Edit", |ui| {
                if ui
                    .add_enabled(session.can_undo(), egui::Button::new("Undo"))
                    .clicked()
                {
                    if let Err(e) = session.undo() {
                        error!("undo failed: {e}");
                    }
                    ui.close_menu();
                }
                if ui
                    .add_enabled(session.can_redo(), egui::Button::new("Redo"))
                    .clicked()
                {
                    if let Err(e) = session.redo() {
                        error!("redo failed: {e}");
                    }
                    ui.close_menu();
                }
            });
            ui.menu_button("Track", |ui| {
                if ui.button("Add video track").clicked() {
                    if let Err(e) = session.add_track(MediaKind::Video) {
                        error!("add track failed: {e}");
                    }
                    ui.close_menu();
                }
                if ui.button("Add audio track").clicked() {
                    if let Err(e) = session.add_track(MediaKind::Audio) {
                        error!("add track failed: {e}");
                    }
                    ui.close_menu();
                }
            });
        });
    }

    fn transport(&mut self, ui: &mut egui::Ui) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        ui.horizontal(|ui| {
            let playing = session.playback().state() == PlayState::Playing;
            if ui.button(if playing { "Pause" } else { "Play" }).clicked() {
                if playing {
                    session.pause();
                } else {
                    session.play();
                }
            }
            if ui.button("Stop").clicked() {
                session.stop();
            }
            let mut looping = session.playback().looping();
            if ui.checkbox(&mut looping, "Loop").changed() {
                session.set_looping(looping);
            }
            ui.separator();
            if ui.button("-").clicked() {
                session.interaction_mut().viewport.zoom_out();
            }
            ui.label(format!("{:.2}x", session.interaction().viewport.zoom()));
            if ui.button("+").clicked() {
                session.interaction_mut().viewport.zoom_in();
            }
            ui.separator();
            for (tool, label) in [
                (Tool::Select, "Select"),
                (Tool::Razor, "Razor"),
                (Tool::Hand, "Hand"),
                (Tool::Zoom, "Zoom"),
            ] {
                let active = session.interaction().tool == tool;
                if ui.selectable_label(active, label).clicked() {
                    session.interaction_mut().tool = tool;
                }
            }
            ui.separator();
            let mut snapping = session.interaction().snap.enabled;
            if ui.checkbox(&mut snapping, "Snap").changed() {
                session.interaction_mut().snap.enabled = snapping;
            }
            ui.separator();
            ui.monospace(format_time(session.playback().playhead()));
            if session.unsaved_changes() {
                ui.label("*");
            }
        });
    }
}

impl App for EditorApp {
    fn update(&mut self, ctx: &Context, _frame: &mut Frame) {
        egui::TopBottomPanel::top("menu_bar")
            .resizable(false)
            .show(ctx, |ui| self.menu_bar(ui));

        egui::TopBottomPanel::top("transport")
            .resizable(false)
            .show(ctx, |ui| self.transport(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            let Some(session) = self.session.as_mut() else {
                ui.heading("Session failed to start; see the log.");
                return;
            };

            egui::TopBottomPanel::bottom("timeline")
                .resizable(true)
                .default_height(240.0)
                .show_inside(ui, |ui| match self.timeline.show(ui, session) {
                    TimelineResponse::SeekTo(t) => session.seek_to(t),
                    TimelineResponse::SelectClip(id) => {
                        if ui.input(|i| i.modifiers.shift) {
                            session.interaction_mut().selection.toggle(id);
                        } else {
                            session.interaction_mut().selection.select(id);
                        }
                    }
                    TimelineResponse::None => {}
                });

            ui.vertical_centered(|ui| {
                ui.heading(&session.project().name);
                if !self.status.is_empty() {
                    ui.label(&self.status);
                }
            });
        });

        // drive the playhead from the renderer clock while playing
        if let Some(session) = self.session.as_mut() {
            if session.playback().state() == PlayState::Playing {
                let dt = ctx.input(|i| i.stable_dt) as f64;
                let step = (dt * crate::core::time::constants::NANOS_PER_SECOND as f64) as i64;
                session.renderer_mut().advance(step);
                session.tick_playback();
                ctx.request_repaint();
            }
        }
    }
}
