use crate::config::{Competition, DisplayWindow, RunConfig, ThresholdLineSpec};
use crate::error::{RaceError, RaceResult};
use crate::model::Colour;

/// Flags accepted by the chart binary. Everything is optional; the competition
/// preset fills the gaps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliArgs {
    pub competition: Option<String>,
    pub from: Option<usize>,
    pub to: Option<usize>,
    pub title: Option<String>,
    pub file: Option<String>,
    /// Raw `POS:TEMPLATE:#RRGGBB` threshold lines, in the order given.
    pub lines: Vec<String>,
}

impl CliArgs {
    pub fn parse<I, S>(args: I) -> RaceResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args = args.into_iter().map(Into::into).collect::<Vec<String>>();
        let mut out = CliArgs::default();
        let mut idx = 0;
        while idx < args.len() {
            let arg = &args[idx];
            let (key, inline) = match arg.split_once('=') {
                Some((k, v)) if k.starts_with("--") => (k, Some(v.to_string())),
                _ => (arg.as_str(), None),
            };
            let value = match inline {
                Some(v) => v,
                None => {
                    idx += 1;
                    args.get(idx)
                        .cloned()
                        .ok_or_else(|| RaceError::Config(format!("{key} needs a value")))?
                }
            };
            match key {
                "--competition" => out.competition = Some(value),
                "--from" => out.from = Some(parse_position(key, &value)?),
                "--to" => out.to = Some(parse_position(key, &value)?),
                "--title" => out.title = Some(value),
                "--file" => out.file = Some(value),
                "--line" => out.lines.push(value),
                other => {
                    return Err(RaceError::Config(format!("unknown argument {other:?}")));
                }
            }
            idx += 1;
        }
        Ok(out)
    }

    /// Resolves the competition first so an unsupported code fails before
    /// anything else happens.
    pub fn into_run_config(self) -> RaceResult<RunConfig> {
        let competition = match self.competition.as_deref() {
            Some(code) => code.parse::<Competition>()?,
            None => Competition::PremierLeague,
        };
        let mut run = RunConfig::preset(competition);
        if let Some(title) = self.title.filter(|t| !t.trim().is_empty()) {
            run.title = title;
        }
        if let Some(file) = self.file.filter(|f| !f.trim().is_empty()) {
            run.file_stem = file;
        }
        if !self.lines.is_empty() {
            run.lines = self
                .lines
                .iter()
                .map(|raw| parse_line(raw))
                .collect::<RaceResult<Vec<_>>>()?;
        }
        run.window = DisplayWindow::new(
            self.from.unwrap_or(1),
            self.to.unwrap_or(competition.team_count()),
        )?;
        Ok(run)
    }
}

fn parse_position(key: &str, raw: &str) -> RaceResult<usize> {
    raw.trim()
        .parse::<usize>()
        .map_err(|_| RaceError::Config(format!("{key} expects a table position, got {raw:?}")))
}

/// `6:Above __ points guarantees CON:#00be14`. The template may itself
/// contain colons; position and colour are taken from the ends.
fn parse_line(raw: &str) -> RaceResult<ThresholdLineSpec> {
    let bad = || RaceError::Config(format!("--line expects POS:TEMPLATE:#RRGGBB, got {raw:?}"));
    let (position, rest) = raw.split_once(':').ok_or_else(bad)?;
    let (template, colour) = rest.rsplit_once(':').ok_or_else(bad)?;
    ThresholdLineSpec::new(
        parse_position("--line", position)?,
        template,
        Colour::from_hex(colour)?,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_flag_styles_parse() {
        let args = CliArgs::parse(["--competition", "ELC", "--from=3", "--to", "10"]).unwrap();
        assert_eq!(args.competition.as_deref(), Some("ELC"));
        assert_eq!(args.from, Some(3));
        assert_eq!(args.to, Some(10));
    }

    #[test]
    fn defaults_come_from_preset() {
        let run = CliArgs::default().into_run_config().unwrap();
        assert_eq!(run.competition, Competition::PremierLeague);
        assert_eq!(run.window, DisplayWindow { from: 1, to: 20 });
        assert_eq!(run.lines.len(), 3);

        let run = CliArgs::parse(["--competition=elc", "--title", "Promotion"])
            .unwrap()
            .into_run_config()
            .unwrap();
        assert_eq!(run.window.to, 24);
        assert_eq!(run.title, "Promotion");
        assert_eq!(run.file_stem, "Championship Promotion Race");
    }

    #[test]
    fn line_flags_replace_the_preset_lines() {
        let run = CliArgs::parse([
            "--competition",
            "PL",
            "--line",
            "4:Above __ points guarantees UCL:#00004b",
            "--line=6:Above __ points guarantees CON: maybe:#00be14",
        ])
        .unwrap()
        .into_run_config()
        .unwrap();
        assert_eq!(run.lines.len(), 2);
        assert_eq!(run.lines[1].position, 6);
        assert_eq!(run.lines[1].template, "Above __ points guarantees CON: maybe");
        assert_eq!(run.lines[1].colour, Colour::rgb(0x00, 0xbe, 0x14));
        assert_eq!(run.lines[1].label(58), "Above 58 points guarantees CON: maybe");
    }

    #[test]
    fn malformed_lines_fail_before_any_fetch() {
        for raw in [
            "6:Above points:#00be14",
            "six:Above __ points:#00be14",
            "6:Above __ points:#00be1",
            "6:Above __ points",
            "0:Above __ points:#00be14",
        ] {
            let err = CliArgs::parse(["--line", raw])
                .unwrap()
                .into_run_config()
                .unwrap_err();
            assert_eq!(err.kind(), crate::error::ErrorKind::Config, "{raw}");
        }
    }

    #[test]
    fn bad_input_is_a_config_error() {
        assert!(CliArgs::parse(["--from"]).is_err());
        assert!(CliArgs::parse(["--from", "first"]).is_err());
        assert!(CliArgs::parse(["--colour", "red"]).is_err());
        let err = CliArgs::parse(["--competition", "SA"])
            .unwrap()
            .into_run_config()
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Config);
    }
}
