use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{RaceError, RaceResult};
use crate::model::{Colour, DifficultyTier};

/// Marker in a threshold label that is replaced by the points value of the line.
pub const POINTS_PLACEHOLDER: &str = "__";

const DEFAULT_DPI: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Competition {
    PremierLeague,
    Championship,
}

impl Competition {
    pub fn code(self) -> &'static str {
        match self {
            Competition::PremierLeague => "PL",
            Competition::Championship => "ELC",
        }
    }

    pub fn team_count(self) -> usize {
        match self {
            Competition::PremierLeague => 20,
            Competition::Championship => 24,
        }
    }

    pub fn deductions(self) -> &'static [PointsDeduction] {
        match self {
            Competition::PremierLeague => &[],
            Competition::Championship => ELC_DEDUCTIONS,
        }
    }
}

impl FromStr for Competition {
    type Err = RaceError;

    fn from_str(raw: &str) -> RaceResult<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "PL" => Ok(Competition::PremierLeague),
            "ELC" => Ok(Competition::Championship),
            other => Err(RaceError::Config(format!(
                "unsupported competition {other:?}: only PL or ELC is allowed"
            ))),
        }
    }
}

impl fmt::Display for Competition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Administrative penalty applied to both current and maximum points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointsDeduction {
    pub team_id: u32,
    pub points: i32,
}

// Sheffield United, -2.
const ELC_DEDUCTIONS: &[PointsDeduction] = &[PointsDeduction {
    team_id: 356,
    points: 2,
}];

pub fn deduction_for(deductions: &[PointsDeduction], team_id: u32) -> i32 {
    deductions
        .iter()
        .filter(|d| d.team_id == team_id)
        .map(|d| d.points)
        .sum()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThresholdLineSpec {
    /// Number of places the line guarantees. The points value is read from the
    /// first team outside them.
    pub position: usize,
    pub template: String,
    pub colour: Colour,
}

impl ThresholdLineSpec {
    pub fn new(position: usize, template: impl Into<String>, colour: Colour) -> RaceResult<Self> {
        let template = template.into();
        if !template.contains(POINTS_PLACEHOLDER) {
            return Err(RaceError::Config(format!(
                "threshold label {template:?} has no {POINTS_PLACEHOLDER} placeholder"
            )));
        }
        if position == 0 {
            return Err(RaceError::Config("threshold position must be at least 1".into()));
        }
        Ok(Self {
            position,
            template,
            colour,
        })
    }

    pub fn label(&self, points: i32) -> String {
        self.template.replace(POINTS_PLACEHOLDER, &points.to_string())
    }
}

/// Inclusive, 1-indexed range of table positions shown on one chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayWindow {
    pub from: usize,
    pub to: usize,
}

impl DisplayWindow {
    pub fn new(from: usize, to: usize) -> RaceResult<Self> {
        let window = Self { from, to };
        window.check_order()?;
        Ok(window)
    }

    fn check_order(&self) -> RaceResult<()> {
        if self.from < 1 {
            return Err(RaceError::Config("window must start at position 1 or later".into()));
        }
        if self.from > self.to {
            return Err(RaceError::Config(format!(
                "window start {} is after window end {}",
                self.from, self.to
            )));
        }
        Ok(())
    }

    /// Also rejects a window whose fields were set out of order by hand.
    pub fn check_fits(&self, total: usize) -> RaceResult<()> {
        self.check_order()?;
        if self.to > total {
            return Err(RaceError::Config(format!(
                "window ends at {} but the table has {total} teams",
                self.to
            )));
        }
        Ok(())
    }

    pub fn team_count(&self) -> usize {
        self.to - self.from + 1
    }
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub competition: Competition,
    pub lines: Vec<ThresholdLineSpec>,
    pub title: String,
    pub file_stem: String,
    pub window: DisplayWindow,
}

impl RunConfig {
    pub fn preset(competition: Competition) -> Self {
        let window = DisplayWindow {
            from: 1,
            to: competition.team_count(),
        };
        match competition {
            Competition::PremierLeague => Self {
                competition,
                lines: vec![
                    preset_line(4, "Above __ points guarantees UCL", Colour::rgb(0x00, 0x00, 0x4b)),
                    preset_line(5, "Above __ points guarantees UEL", Colour::rgb(0xff, 0x69, 0x00)),
                    preset_line(18, "Above __ points for safety", Colour::rgb(0xe2, 0x1a, 0x23)),
                ],
                title: "EPL: The race for European Competitions".to_string(),
                file_stem: "PL Europe Race".to_string(),
                window,
            },
            Competition::Championship => Self {
                competition,
                lines: vec![
                    preset_line(
                        2,
                        "Above __ points guarantees automatic promotion",
                        Colour::rgb(0x52, 0xd5, 0x77),
                    ),
                    preset_line(6, "Above __ points guarantees playoffs", Colour::rgb(0xd6, 0xbf, 0x25)),
                    preset_line(21, "Above __ points for safety", Colour::rgb(0xe2, 0x1a, 0x23)),
                ],
                title: "Championship: The race for Promotion".to_string(),
                file_stem: "Championship Promotion Race".to_string(),
                window,
            },
        }
    }
}

fn preset_line(position: usize, template: &str, colour: Colour) -> ThresholdLineSpec {
    ThresholdLineSpec {
        position,
        template: template.to_string(),
        colour,
    }
}

/// Table-position bands used when a fixture carries no difficulty of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DifficultyBands {
    pub hardest_max: u32,
    pub hard_max: u32,
    pub average_max: u32,
}

impl Default for DifficultyBands {
    fn default() -> Self {
        Self {
            hardest_max: 4,
            hard_max: 8,
            average_max: 20,
        }
    }
}

impl DifficultyBands {
    pub fn tier_for(&self, position: u32) -> DifficultyTier {
        if position <= self.hardest_max {
            DifficultyTier::Hardest
        } else if position <= self.hard_max {
            DifficultyTier::Hard
        } else if position <= self.average_max {
            DifficultyTier::Average
        } else {
            DifficultyTier::Easy
        }
    }
}

// Horizontal margin as a fraction of the data span, keyed by team count.
static X_MARGINS: [(usize, f64); 23] = [
    (2, 0.1750),
    (3, 0.1130),
    (4, 0.0825),
    (5, 0.0660),
    (6, 0.0550),
    (7, 0.0440),
    (8, 0.0395),
    (9, 0.0330),
    (10, 0.0305),
    (11, 0.0280),
    (12, 0.0260),
    (13, 0.0240),
    (14, 0.0225),
    (15, 0.0210),
    (16, 0.0200),
    (17, 0.0185),
    (18, 0.0175),
    (19, 0.0160),
    (20, 0.0150),
    (21, 0.0140),
    (22, 0.0135),
    (23, 0.0125),
    (24, 0.0120),
];

#[derive(Debug, Clone)]
pub struct ChartConstants {
    pub base_width_in: f64,
    pub width_step_in: f64,
    pub base_team_count: usize,
    pub base_height_in: f64,
    pub height_step_in: f64,
    pub base_point_span: i32,
    pub min_point_span: i32,
    pub bar_width: f64,
    /// Starting value for the running minimum of current points.
    pub lower_bound_seed: i32,
    pub pad_below: i32,
    pub pad_above: i32,
    pub label_offset: f64,
    pub collision_bump: f64,
    pub points_per_fixture: i32,
    pub x_margins: &'static [(usize, f64)],
    pub bands: DifficultyBands,
    pub dpi: u32,
}

impl Default for ChartConstants {
    fn default() -> Self {
        Self {
            base_width_in: 18.0,
            width_step_in: 0.8869,
            base_team_count: 20,
            base_height_in: 26.0,
            height_step_in: 0.2601,
            base_point_span: 100,
            min_point_span: 32,
            bar_width: 0.7,
            lower_bound_seed: 114,
            pad_below: 3,
            pad_above: 2,
            label_offset: 0.12,
            collision_bump: 0.8,
            points_per_fixture: 3,
            x_margins: &X_MARGINS,
            bands: DifficultyBands::default(),
            dpi: DEFAULT_DPI,
        }
    }
}

impl ChartConstants {
    /// Margin fraction for `teams` bars, clamped to the ends of the table.
    pub fn x_margin(&self, teams: usize) -> f64 {
        let Some(first) = self.x_margins.first() else {
            return 0.0;
        };
        let mut best = *first;
        for entry in self.x_margins {
            if entry.0 == teams {
                return entry.1;
            }
            if entry.0 <= teams {
                best = *entry;
            }
        }
        best.1
    }
}

/// Settings read from the process environment (after `.env` files are loaded).
#[derive(Debug, Clone)]
pub struct EnvSettings {
    pub football_data_key: Option<String>,
    pub football_data_season: Option<u32>,
    pub output_dir: PathBuf,
    pub dpi: u32,
}

impl EnvSettings {
    pub fn from_env() -> Self {
        let football_data_key = std::env::var("FOOTBALL_DATA_KEY")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        let football_data_season = std::env::var("FOOTBALL_DATA_SEASON")
            .ok()
            .and_then(|v| v.trim().parse::<u32>().ok());
        let output_dir = std::env::var("TITLE_RACE_OUTPUT_DIR")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        let dpi = std::env::var("TITLE_RACE_DPI")
            .ok()
            .and_then(|v| v.trim().parse::<u32>().ok())
            .unwrap_or(DEFAULT_DPI)
            .clamp(50, 300);
        Self {
            football_data_key,
            football_data_season,
            output_dir,
            dpi,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn competition_codes_parse_case_insensitively() {
        assert_eq!("pl".parse::<Competition>().unwrap(), Competition::PremierLeague);
        assert_eq!(" ELC ".parse::<Competition>().unwrap(), Competition::Championship);
        let err = "BL1".parse::<Competition>().unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Config);
    }

    #[test]
    fn x_margin_clamps_outside_table() {
        let c = ChartConstants::default();
        assert_eq!(c.x_margin(20), 0.0150);
        assert_eq!(c.x_margin(2), 0.1750);
        assert_eq!(c.x_margin(1), 0.1750);
        assert_eq!(c.x_margin(30), 0.0120);
    }

    #[test]
    fn bands_follow_table_position() {
        let b = DifficultyBands::default();
        assert_eq!(b.tier_for(1), DifficultyTier::Hardest);
        assert_eq!(b.tier_for(4), DifficultyTier::Hardest);
        assert_eq!(b.tier_for(5), DifficultyTier::Hard);
        assert_eq!(b.tier_for(8), DifficultyTier::Hard);
        assert_eq!(b.tier_for(9), DifficultyTier::Average);
        assert_eq!(b.tier_for(20), DifficultyTier::Average);
        assert_eq!(b.tier_for(21), DifficultyTier::Easy);
    }

    #[test]
    fn threshold_template_needs_placeholder() {
        assert!(ThresholdLineSpec::new(4, "no marker", Colour::WHITE).is_err());
        let line = ThresholdLineSpec::new(4, "Above __ points", Colour::WHITE).unwrap();
        assert_eq!(line.label(71), "Above 71 points");
    }

    #[test]
    fn deductions_sum_per_team() {
        let table = Competition::Championship.deductions();
        assert_eq!(deduction_for(table, 356), 2);
        assert_eq!(deduction_for(table, 1), 0);
    }

    #[test]
    fn window_rejects_inverted_range() {
        assert!(DisplayWindow::new(0, 5).is_err());
        assert!(DisplayWindow::new(6, 5).is_err());
        let w = DisplayWindow::new(3, 10).unwrap();
        assert_eq!(w.team_count(), 8);
        assert!(w.check_fits(20).is_ok());
        assert!(w.check_fits(9).is_err());
    }

    #[test]
    fn hand_built_windows_are_checked_on_fit() {
        assert!(DisplayWindow { from: 0, to: 5 }.check_fits(20).is_err());
        assert!(DisplayWindow { from: 7, to: 5 }.check_fits(20).is_err());
        assert!(DisplayWindow { from: 1, to: 20 }.check_fits(20).is_ok());
    }
}
