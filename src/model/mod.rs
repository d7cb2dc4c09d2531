//! Temporal model: projects, tracks, and clips with strict temporal
//! invariants. Mutations are snapshot-valued; see [`project::Project`].

pub mod clip;
pub mod project;
pub mod settings;
pub mod track;

pub use clip::{Clip, ClipId, Effect, MediaKind, SourceRef, TrackId, Transform};
pub use project::{ModelViolation, Project, ProjectId, PropertyTarget, PropertyValue};
pub use settings::ProjectSettings;
pub use track::Track;
