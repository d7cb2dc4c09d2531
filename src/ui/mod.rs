//! egui-based editor interface.

pub mod app;
pub mod timeline_view;

pub use app::EditorApp;
pub use timeline_view::TimelineView;
