//! Snapping: grid rounding plus alignment targets (clip edges, playhead).
//!
//! Policy: a target within the threshold overrides grid snap; the nearest
//! target wins, with clip edges beating the playhead on exact distance ties.
//! With no target in range, the value is rounded to the nearest grid
//! multiple.

use crate::core::time::Time;
use crate::model::{ClipId, Project};

/// Category of snap target, ordered by tie-break priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapTargetKind {
    ClipEdge,
    Playhead,
    Grid,
}

impl SnapTargetKind {
    /// Priority for tie-breaking when distances are equal.
    fn priority(self) -> i32 {
        match self {
            SnapTargetKind::ClipEdge => 2,
            SnapTargetKind::Playhead => 1,
            SnapTargetKind::Grid => 0,
        }
    }
}

/// A discrete alignment target on the timeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapTarget {
    pub time: Time,
    pub kind: SnapTargetKind,
    /// Clip id if this target comes from a clip edge.
    pub clip_id: Option<ClipId>,
}

impl SnapTarget {
    pub fn clip_edge(time: Time, clip_id: ClipId) -> Self {
        Self {
            time,
            kind: SnapTargetKind::ClipEdge,
            clip_id: Some(clip_id),
        }
    }

    pub fn playhead(time: Time) -> Self {
        Self {
            time,
            kind: SnapTargetKind::Playhead,
            clip_id: None,
        }
    }
}

/// Snap configuration held by the interaction state.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapSettings {
    pub enabled: bool,
    /// Grid spacing in nanoseconds; 0 disables grid snapping.
    pub grid: Time,
    /// Maximum distance (nanoseconds) at which a target attracts the value.
    /// The viewport maps the configured pixel threshold to this.
    pub threshold: Time,
}

impl Default for SnapSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            grid: crate::core::time::from_millis(1000),
            threshold: crate::core::time::from_millis(100),
        }
    }
}

/// A resolved snap: the adjusted time plus the guide that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapResult {
    pub time: Time,
    /// The guide line to draw, `None` when nothing snapped.
    pub guide: Option<SnapTarget>,
}

/// Round a time to the nearest multiple of `grid`.
pub fn snap_to_grid(t: Time, grid: Time) -> Time {
    if grid <= 0 {
        return t;
    }
    let half = grid / 2;
    let offset = if t >= 0 { half } else { -half };
    ((t + offset) / grid) * grid
}

/// Resolve a dragged time value against the targets and grid.
pub fn resolve(t: Time, settings: &SnapSettings, targets: &[SnapTarget]) -> SnapResult {
    if !settings.enabled {
        return SnapResult { time: t, guide: None };
    }

    let mut best: Option<(Time, i32, SnapTarget)> = None;
    for target in targets {
        let distance = (target.time - t).abs();
        if distance > settings.threshold {
            continue;
        }
        let priority = target.kind.priority();
        let better = match best {
            None => true,
            Some((best_distance, best_priority, _)) => {
                distance < best_distance
                    || (distance == best_distance && priority > best_priority)
            }
        };
        if better {
            best = Some((distance, priority, *target));
        }
    }

    if let Some((_, _, target)) = best {
        return SnapResult {
            time: target.time,
            guide: Some(target),
        };
    }

    if settings.grid > 0 {
        let snapped = snap_to_grid(t, settings.grid);
        return SnapResult {
            time: snapped,
            guide: Some(SnapTarget {
                time: snapped,
                kind: SnapTargetKind::Grid,
                clip_id: None,
            }),
        };
    }

    SnapResult { time: t, guide: None }
}

/// Collect snap targets from a project: every clip edge except the dragged
/// clips' own edges, plus the playhead.
pub fn collect_targets(project: &Project, playhead: Time, exclude: &[ClipId]) -> Vec<SnapTarget> {
    let mut targets = Vec::new();
    for track in &project.tracks {
        for clip in &track.clips {
            if exclude.contains(&clip.id) {
                continue;
            }
            targets.push(SnapTarget::clip_edge(clip.start_time, clip.id));
            targets.push(SnapTarget::clip_edge(clip.end_time(), clip.id));
        }
    }
    targets.push(SnapTarget::playhead(playhead));
    targets
}
