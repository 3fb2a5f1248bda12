use serde::Serialize;
use tracing::debug;

use crate::config::{ChartConstants, ThresholdLineSpec};
use crate::error::{RaceError, RaceResult};
use crate::model::Colour;
use crate::projection::TeamProjection;

/// On/off dash lengths in pixels, with the pattern started `offset` pixels in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DashPattern {
    pub offset: f64,
    pub on: f64,
    pub off: f64,
}

impl DashPattern {
    pub const PRIMARY: DashPattern = DashPattern {
        offset: 0.0,
        on: 5.0,
        off: 5.0,
    };
    /// Fills the gaps of `PRIMARY`.
    pub const SHIFTED: DashPattern = DashPattern {
        offset: 5.0,
        on: 5.0,
        off: 5.0,
    };
    pub const GRID: DashPattern = DashPattern {
        offset: 0.0,
        on: 4.0,
        off: 4.0,
    };

    pub fn scaled(&self, factor: f64) -> DashPattern {
        DashPattern {
            offset: self.offset * factor,
            on: self.on * factor,
            off: self.off * factor,
        }
    }

    /// Visible `(from, to)` runs between `start` and `end`.
    pub fn segments(&self, start: f64, end: f64) -> Vec<(f64, f64)> {
        let period = self.on + self.off;
        if end <= start || self.on <= 0.0 || period <= 0.0 {
            return Vec::new();
        }
        let phase = self.offset.rem_euclid(period);
        let mut out = Vec::new();
        let mut cursor = start - phase;
        while cursor < end {
            let from = cursor.max(start);
            let to = (cursor + self.on).min(end);
            if to > from {
                out.push((from, to));
            }
            cursor += period;
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThresholdLine {
    pub position: usize,
    pub pts_required: i32,
    pub label: String,
    pub colour: Colour,
    /// Left edge of the label in bar-index units, `None` when the line is hidden.
    pub anchor_x: Option<f64>,
    pub label_y: f64,
    pub dash: DashPattern,
}

impl ThresholdLine {
    /// Reads the points requirement from the full ranking and anchors the label
    /// on the first displayed team whose ceiling equals it.
    pub fn new(
        spec: &ThresholdLineSpec,
        ranked: &[TeamProjection],
        displayed: &[TeamProjection],
        label_offset: f64,
    ) -> RaceResult<Self> {
        let Some(outside) = ranked.get(spec.position) else {
            return Err(RaceError::Config(format!(
                "threshold position {} needs at least {} teams, table has {}",
                spec.position,
                spec.position + 1,
                ranked.len()
            )));
        };
        let pts_required = outside.record.max_points;
        let anchor_x = displayed
            .iter()
            .position(|t| t.record.max_points == pts_required)
            .map(|idx| idx as f64 - 0.5);
        Ok(Self {
            position: spec.position,
            pts_required,
            label: spec.label(pts_required),
            colour: spec.colour,
            anchor_x,
            label_y: f64::from(pts_required) + label_offset,
            dash: DashPattern::PRIMARY,
        })
    }

    pub fn is_visible(&self) -> bool {
        self.anchor_x.is_some()
    }
}

/// Builds every configured line, then separates coincident neighbours.
pub fn layout_threshold_lines(
    specs: &[ThresholdLineSpec],
    ranked: &[TeamProjection],
    displayed: &[TeamProjection],
    constants: &ChartConstants,
) -> RaceResult<Vec<ThresholdLine>> {
    let mut lines = specs
        .iter()
        .map(|spec| ThresholdLine::new(spec, ranked, displayed, constants.label_offset))
        .collect::<RaceResult<Vec<_>>>()?;
    resolve_collisions(&mut lines, constants.collision_bump);
    for line in lines.iter().filter(|l| !l.is_visible()) {
        debug!(
            position = line.position,
            points = line.pts_required,
            "threshold line outside displayed window"
        );
    }
    Ok(lines)
}

/// Within a run of consecutive lines sharing a points value, dash patterns
/// alternate and each earlier label sits one bump above the next.
pub fn resolve_collisions(lines: &mut [ThresholdLine], bump: f64) {
    let mut run_index = 0usize;
    for idx in 0..lines.len() {
        if idx > 0 && lines[idx].pts_required == lines[idx - 1].pts_required {
            run_index += 1;
        } else {
            run_index = 0;
        }
        lines[idx].dash = if run_index % 2 == 1 {
            DashPattern::SHIFTED
        } else {
            DashPattern::PRIMARY
        };
    }
    for idx in (0..lines.len().saturating_sub(1)).rev() {
        if lines[idx].pts_required == lines[idx + 1].pts_required {
            lines[idx].label_y = lines[idx + 1].label_y + bump;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_dashes_start_on() {
        let segs = DashPattern::PRIMARY.segments(0.0, 22.0);
        assert_eq!(segs, vec![(0.0, 5.0), (10.0, 15.0), (20.0, 22.0)]);
    }

    #[test]
    fn shifted_dashes_fill_primary_gaps() {
        let segs = DashPattern::SHIFTED.segments(0.0, 22.0);
        assert_eq!(segs, vec![(5.0, 10.0), (15.0, 20.0)]);
    }

    #[test]
    fn degenerate_ranges_draw_nothing() {
        assert!(DashPattern::PRIMARY.segments(5.0, 5.0).is_empty());
        assert!(DashPattern::PRIMARY.segments(6.0, 5.0).is_empty());
    }
}
