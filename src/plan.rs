//! Draw-ready description of one chart.
//!
//! Everything here is plain data in chart coordinates (bar index on x, points on
//! y), so the whole layout can be checked without a drawing surface.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::config::{ChartConstants, RunConfig};
use crate::error::RaceResult;
use crate::geometry::{ChartGeometry, chart_title};
use crate::model::{Colour, DifficultyTier};
use crate::projection::{TableProjection, TeamProjection};
use crate::threshold::{ThresholdLine, layout_threshold_lines};

pub const X_AXIS_LABEL: &str = "Teams in order of highest possible points total";
pub const Y_AXIS_LABEL: &str = "Points and remaining fixures in chronological order";

pub const FIXTURE_OUTLINE: Colour = Colour::rgb(0x80, 0x80, 0x80);
pub const FIXTURE_TEXT: Colour = Colour::rgb(0x75, 0x71, 0x71);

const FIXTURE_LABEL_LIFT: f64 = 0.18;
const GOAL_DIFFERENCE_DROP: f64 = 0.5;

/// Rectangle in chart coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Extent {
    pub left: f64,
    pub right: f64,
    pub bottom: f64,
    pub top: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FixtureSegment {
    pub bottom: i32,
    pub height: i32,
    pub fill: Colour,
    pub difficulty: DifficultyTier,
    pub label: String,
    pub label_at: (f64, f64),
    pub opponent_id: u32,
    pub crest: Extent,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamBar {
    pub index: usize,
    pub team_id: u32,
    pub short_name: String,
    pub colour: Colour,
    pub left: f64,
    pub right: f64,
    pub current_points: i32,
    pub max_points: i32,
    /// Only drawn when there is at least one fixture bar above the team bar.
    pub goal_difference: Option<(String, (f64, f64))>,
    pub segments: Vec<FixtureSegment>,
}

impl TeamBar {
    pub fn centre(&self) -> f64 {
        (self.left + self.right) / 2.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPlan {
    pub title: String,
    pub geometry: ChartGeometry,
    pub dpi: u32,
    pub bars: Vec<TeamBar>,
    pub lines: Vec<ThresholdLine>,
}

impl ChartPlan {
    pub fn build(
        projection: &TableProjection,
        run: &RunConfig,
        constants: &ChartConstants,
        now: NaiveDateTime,
    ) -> RaceResult<Self> {
        let displayed = projection.window(run.window)?;
        let geometry = ChartGeometry::for_teams(displayed, constants)?;
        let lines = layout_threshold_lines(&run.lines, &projection.ranked, displayed, constants)?;
        let bars = displayed
            .iter()
            .enumerate()
            .map(|(index, team)| team_bar(index, team, constants))
            .collect();
        Ok(Self {
            title: chart_title(&run.title, run.window, now),
            geometry,
            dpi: constants.dpi,
            bars,
            lines,
        })
    }

    pub fn visible_lines(&self) -> impl Iterator<Item = &ThresholdLine> {
        self.lines.iter().filter(|l| l.is_visible())
    }
}

fn team_bar(index: usize, team: &TeamProjection, constants: &ChartConstants) -> TeamBar {
    let width = constants.bar_width;
    let left = index as f64 - width / 2.0;
    let centre = index as f64;
    let step = constants.points_per_fixture;
    let current = team.record.current_points;

    let segments = team
        .fixtures
        .iter()
        .enumerate()
        .map(|(n, fixture)| {
            let bottom = current + step * n as i32;
            let y = f64::from(bottom);
            let h = f64::from(step);
            FixtureSegment {
                bottom,
                height: step,
                fill: fixture.difficulty.colour(),
                difficulty: fixture.difficulty,
                label: fixture.label.clone(),
                label_at: (centre, y + FIXTURE_LABEL_LIFT),
                opponent_id: fixture.opponent_id,
                crest: Extent {
                    left: left + width / 8.5,
                    right: left + width / 1.121212,
                    bottom: y + h / 3.5,
                    top: y + h / 1.09,
                },
            }
        })
        .collect::<Vec<_>>();

    let goal_difference = (!segments.is_empty()).then(|| {
        (
            team.record.goal_difference_label(),
            (centre, f64::from(current) - GOAL_DIFFERENCE_DROP),
        )
    });

    TeamBar {
        index,
        team_id: team.team.id,
        short_name: team.team.short_name.clone(),
        colour: team.team.colour,
        left,
        right: left + width,
        current_points: current,
        max_points: team.record.max_points,
        goal_difference,
        segments,
    }
}
