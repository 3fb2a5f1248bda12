use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::config::{ChartConstants, Competition, DisplayWindow};
use crate::error::{RaceError, RaceResult};
use crate::projection::TeamProjection;

const LABEL_SIZE: u32 = 17;
const SMALL_LABEL_SIZE: u32 = 15;
const SMALL_X_BELOW_TEAMS: usize = 10;
const SMALL_Y_BELOW_SPAN: i32 = 40;
const MAJOR_TICK_STEP: i32 = 5;

pub const HISTORY_DIR: &str = "History";

/// Canvas size and axis ranges for one chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartGeometry {
    pub team_count: usize,
    pub width_in: f64,
    pub height_in: f64,
    pub width_px: u32,
    pub height_px: u32,
    pub y_min: f64,
    pub y_max: f64,
    /// Vertical extent in points used to size the canvas.
    pub point_span: i32,
    pub first_tick: i32,
    pub x_min: f64,
    pub x_max: f64,
    pub x_margin: f64,
    pub bar_width: f64,
    pub x_label_size: u32,
    pub y_label_size: u32,
}

impl ChartGeometry {
    pub fn for_teams(displayed: &[TeamProjection], constants: &ChartConstants) -> RaceResult<Self> {
        let lowest_points = displayed.iter().map(|t| t.record.current_points).min();
        let highest_max = displayed.iter().map(|t| t.record.max_points).max();
        let (Some(lowest_points), Some(highest_max)) = (lowest_points, highest_max) else {
            return Err(RaceError::Config("no teams in the display window".into()));
        };
        Ok(Self::compute(displayed.len(), lowest_points, highest_max, constants))
    }

    /// `lowest_points` is the smallest current total on show, `highest_max` the
    /// largest ceiling.
    pub fn compute(
        team_count: usize,
        lowest_points: i32,
        highest_max: i32,
        constants: &ChartConstants,
    ) -> Self {
        let mut floor = constants.lower_bound_seed.min(lowest_points);
        floor = nudge_off_major_tick(floor, constants.pad_below);

        let span_from =
            |floor: i32| (highest_max + constants.pad_above) - (floor - constants.pad_below);
        let mut point_span = span_from(floor);
        if point_span < constants.min_point_span {
            floor = highest_max - (constants.min_point_span - constants.pad_above);
            floor = nudge_off_major_tick(floor, constants.pad_below);
            // The canvas is sized from the range actually drawn.
            point_span = span_from(floor);
        }

        let width_in = constants.base_width_in
            - constants.width_step_in * (constants.base_team_count as f64 - team_count as f64);
        let height_in = constants.base_height_in
            - constants.height_step_in * f64::from(constants.base_point_span - point_span);

        let x_margin = constants.x_margin(team_count);
        let half_bar = constants.bar_width / 2.0;
        let data_lo = -half_bar;
        let data_hi = team_count.saturating_sub(1) as f64 + half_bar;
        let data_span = data_hi - data_lo;

        let x_label_size = if team_count < SMALL_X_BELOW_TEAMS {
            SMALL_LABEL_SIZE
        } else {
            LABEL_SIZE
        };
        let y_label_size = if point_span < SMALL_Y_BELOW_SPAN {
            SMALL_LABEL_SIZE
        } else {
            LABEL_SIZE
        };

        Self {
            team_count,
            width_in,
            height_in,
            width_px: inches_to_px(width_in, constants.dpi),
            height_px: inches_to_px(height_in, constants.dpi),
            y_min: f64::from(floor - constants.pad_below),
            y_max: f64::from(highest_max + constants.pad_above),
            point_span,
            first_tick: floor - constants.pad_below + 1,
            x_min: data_lo - x_margin * data_span,
            x_max: data_hi + x_margin * data_span,
            x_margin,
            bar_width: constants.bar_width,
            x_label_size,
            y_label_size,
        }
    }

    /// Multiples of five inside the y range.
    pub fn major_ticks(&self) -> Vec<i32> {
        let lo = self.y_min.ceil() as i32;
        let hi = self.y_max.floor() as i32;
        (lo..=hi).filter(|v| v.rem_euclid(MAJOR_TICK_STEP) == 0).collect()
    }

    /// One tick per point, from `first_tick` up to (not including) the top.
    pub fn minor_ticks(&self) -> Vec<i32> {
        let hi = self.y_max.ceil() as i32;
        (self.first_tick..hi).collect()
    }

    /// Right end of the bottom spine in bar-index units.
    pub fn axis_end(&self) -> f64 {
        self.team_count as f64 - 0.5
    }
}

fn nudge_off_major_tick(floor: i32, pad_below: i32) -> i32 {
    if (floor - pad_below).rem_euclid(MAJOR_TICK_STEP) == 0 {
        floor - 1
    } else {
        floor
    }
}

fn inches_to_px(inches: f64, dpi: u32) -> u32 {
    (inches * f64::from(dpi)).round().max(1.0) as u32
}

/// `1st`, `2nd`, `3rd`, `21st`, `22nd`, `23rd`, otherwise `Nth`.
pub fn ordinal(position: usize) -> String {
    match position {
        1 | 21 => format!("{position}st"),
        2 | 22 => format!("{position}nd"),
        3 | 23 => format!("{position}rd"),
        _ => format!("{position}th"),
    }
}

pub fn chart_title(title: &str, window: DisplayWindow, now: NaiveDateTime) -> String {
    format!(
        "{}\n{} to {} as of {}",
        title.trim_end(),
        ordinal(window.from),
        ordinal(window.to),
        now.format("%d-%m-%y")
    )
}

/// `<base>/History/<code>/<stem> <DD-MM-YY HH.MM>.png`
pub fn output_path(
    base: &Path,
    competition: Competition,
    file_stem: &str,
    now: NaiveDateTime,
) -> PathBuf {
    base.join(HISTORY_DIR)
        .join(competition.code())
        .join(format!("{} {}.png", file_stem, now.format("%d-%m-%y %H.%M")))
}
