//! Timeline panel: track lanes, clip rectangles, ruler, and playhead.

use eframe::egui::{self, Color32, Pos2, Rect, Sense, Stroke, Vec2};

use crate::core::time::{format_time, Time};
use crate::interaction::Viewport;
use crate::model::{MediaKind, Project};
use crate::session::EditorSession;
use crate::sync::HeadlessRenderer;

const TRACK_HEIGHT: f32 = 48.0;
const RULER_HEIGHT: f32 = 20.0;

/// What the user did to the timeline this frame.
pub enum TimelineResponse {
    None,
    SeekTo(Time),
    SelectClip(crate::model::ClipId),
}

pub struct TimelineView;

impl TimelineView {
    pub fn new() -> Self {
        Self
    }

    fn clip_color(kind: MediaKind, selected: bool) -> Color32 {
        let base = match kind {
            MediaKind::Video => Color32::from_rgb(70, 110, 180),
            MediaKind::Audio => Color32::from_rgb(70, 160, 90),
            MediaKind::Text => Color32::from_rgb(170, 130, 60),
            MediaKind::Image => Color32::from_rgb(130, 90, 170),
        };
        if selected {
            base.gamma_multiply(1.5)
        } else {
            base
        }
    }

    /// Draw the timeline and report any interaction.
    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        session: &EditorSession<HeadlessRenderer>,
    ) -> TimelineResponse {
        let project: &Project = session.project();
        let viewport: &Viewport = &session.interaction().viewport;
        let selection = &session.interaction().selection;

        let total_height =
            RULER_HEIGHT + TRACK_HEIGHT * project.tracks.len().max(1) as f32;
        let (rect, response) = ui.allocate_exact_size(
            Vec2::new(ui.available_width(), total_height),
            Sense::click(),
        );
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, Color32::from_gray(28));

        let mut out = TimelineResponse::None;

        // ruler with one tick per second
        let ruler = Rect::from_min_size(rect.min, Vec2::new(rect.width(), RULER_HEIGHT));
        painter.rect_filled(ruler, 0.0, Color32::from_gray(40));
        let tick = crate::core::time::constants::NANOS_PER_SECOND;
        let mut t = viewport.scroll_offset - viewport.scroll_offset % tick;
        loop {
            let x = rect.left() + viewport.time_to_pixel(t) as f32;
            if x > rect.right() {
                break;
            }
            if x >= rect.left() {
                painter.line_segment(
                    [Pos2::new(x, ruler.top()), Pos2::new(x, ruler.bottom())],
                    Stroke::new(1.0, Color32::from_gray(90)),
                );
                painter.text(
                    Pos2::new(x + 3.0, ruler.top() + 2.0),
                    egui::Align2::LEFT_TOP,
                    format_time(t),
                    egui::FontId::monospace(9.0),
                    Color32::from_gray(150),
                );
            }
            t += tick;
        }

        // track lanes and clips
        for (row, track) in project.tracks.iter().enumerate() {
            let top = rect.top() + RULER_HEIGHT + row as f32 * TRACK_HEIGHT;
            let lane = Rect::from_min_size(
                Pos2::new(rect.left(), top),
                Vec2::new(rect.width(), TRACK_HEIGHT),
            );
            let lane_color = if track.locked {
                Color32::from_gray(22)
            } else {
                Color32::from_gray(33)
            };
            painter.rect_filled(lane.shrink2(Vec2::new(0.0, 1.0)), 0.0, lane_color);

            for clip in &track.clips {
                let x0 = rect.left() + viewport.time_to_pixel(clip.start_time) as f32;
                let x1 = rect.left() + viewport.time_to_pixel(clip.end_time()) as f32;
                if x1 < rect.left() || x0 > rect.right() {
                    continue;
                }
                let clip_rect = Rect::from_min_max(
                    Pos2::new(x0.max(rect.left()), top + 4.0),
                    Pos2::new(x1.min(rect.right()), top + TRACK_HEIGHT - 4.0),
                );
                let selected = selection.contains(clip.id);
                painter.rect_filled(
                    clip_rect,
                    3.0,
                    Self::clip_color(clip.kind, selected),
                );
                if selected {
                    painter.rect_stroke(clip_rect, 3.0, Stroke::new(1.5, Color32::WHITE));
                }
                if let Some(pos) = response.interact_pointer_pos() {
                    if response.clicked() && clip_rect.contains(pos) {
                        out = TimelineResponse::SelectClip(clip.id);
                    }
                }
            }
        }

        // click on empty timeline or ruler seeks
        if matches!(out, TimelineResponse::None) {
            if let Some(pos) = response.interact_pointer_pos() {
                if response.clicked() {
                    let t = viewport.pixel_to_time((pos.x - rect.left()) as f64);
                    out = TimelineResponse::SeekTo(t.max(0));
                }
            }
        }

        // playhead
        let px = rect.left() + viewport.time_to_pixel(session.playback().playhead()) as f32;
        if px >= rect.left() && px <= rect.right() {
            painter.line_segment(
                [Pos2::new(px, rect.top()), Pos2::new(px, rect.bottom())],
                Stroke::new(1.5, Color32::from_rgb(230, 70, 70)),
            );
        }

        out
    }
}

impl Default for TimelineView {
    fn default() -> Self {
        Self::new()
    }
}
