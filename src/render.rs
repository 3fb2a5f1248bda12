use std::fmt::Display;
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use plotters::coord::Shift;
use plotters::coord::combinators::WithKeyPoints;
use plotters::coord::types::RangedCoordf64;
use plotters::element::BitMapElement;
use plotters::prelude::*;
use plotters::style::FontTransform;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use tracing::info;

use crate::crest::{Crest, CrestSet, fit, flatten_onto};
use crate::error::{RaceError, RaceResult};
use crate::model::Colour;
use crate::plan::{ChartPlan, FIXTURE_OUTLINE, FIXTURE_TEXT, TeamBar, X_AXIS_LABEL, Y_AXIS_LABEL};
use crate::threshold::DashPattern;

const FONT: &str = "sans-serif";
const TITLE_PT: f64 = 16.0;
const SMALL_PT: f64 = 8.33;
const MEDIUM_PT: f64 = 10.0;
const TICK_PT: f64 = 10.0;
const LINE_WIDTH_PT: f64 = 1.5;
const CREST_DROP_PT: f64 = 30.0;
const CREST_TICK_PT: f64 = 36.0;
const GRID_COLOUR: Colour = Colour::rgb(0xb0, 0xb0, 0xb0);

type Root<'a> = DrawingArea<BitMapBackend<'a>, Shift>;
type PlotArea<'a> = DrawingArea<
    BitMapBackend<'a>,
    Cartesian2d<RangedCoordf64, WithKeyPoints<RangedCoordf64>>,
>;

/// Time spent drawing into the bitmap and encoding it to disk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderTimings {
    pub draw: Duration,
    pub save: Duration,
}

/// Draws `plan` to a PNG at `path`, creating the parent directory on demand.
pub fn render_chart(
    plan: &ChartPlan,
    crests: &CrestSet,
    path: &Path,
) -> RaceResult<RenderTimings> {
    let started = Instant::now();
    for bar in &plan.bars {
        crest_for(crests, bar.team_id)?;
        for seg in &bar.segments {
            crest_for(crests, seg.opponent_id)?;
        }
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| RaceError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let g = &plan.geometry;
    let pt = |size: f64| size * f64::from(plan.dpi) / 72.0;
    let root = BitMapBackend::new(path, (g.width_px, g.height_px)).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;

    let title_lines: Vec<&str> = plan.title.lines().collect();
    let title_line_px = pt(TITLE_PT * 1.3);
    let top_margin = title_line_px * title_lines.len() as f64 + pt(20.0);
    let crest_box = pt(CREST_TICK_PT);
    let minor_ticks = g.minor_ticks().into_iter().map(f64::from).collect::<Vec<_>>();

    let mut chart = ChartBuilder::on(&root)
        .margin_top(top_margin as u32)
        .margin_left(pt(10.0) as u32)
        .margin_right(pt(70.0) as u32)
        .margin_bottom(pt(10.0) as u32)
        .x_label_area_size((pt(CREST_DROP_PT + 20.0) + crest_box) as u32)
        .y_label_area_size(pt(70.0) as u32)
        .build_cartesian_2d(
            g.x_min..g.x_max,
            (g.y_min..g.y_max).with_key_points(minor_ticks.clone()),
        )
        .map_err(render_err)?;

    let major_only = |v: &f64| {
        let r = v.round();
        if (r - v).abs() < 1e-6 && (r as i64).rem_euclid(5) == 0 {
            format!("{r:.0}")
        } else {
            String::new()
        }
    };
    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .disable_x_axis()
        .y_labels(minor_ticks.len())
        .y_label_formatter(&major_only)
        .x_desc(X_AXIS_LABEL)
        .label_style((FONT, pt(TICK_PT)))
        .axis_desc_style((FONT, pt(f64::from(g.x_label_size))).into_font().style(FontStyle::Bold))
        .axis_style(BLACK.stroke_width(pt(LINE_WIDTH_PT) as u32))
        .draw()
        .map_err(render_err)?;

    // The mesh styles both axis titles alike, so the y title is drawn by hand.
    let (plot_left, plot_top) = chart.backend_coord(&(g.x_min, g.y_max));
    let (_, plot_bottom) = chart.backend_coord(&(g.x_min, g.y_min));
    let y_desc_style = (FONT, pt(f64::from(g.y_label_size)))
        .into_font()
        .style(FontStyle::Bold)
        .transform(FontTransform::Rotate270)
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Top));
    root.draw(&Text::new(
        Y_AXIS_LABEL,
        (plot_left - pt(70.0) as i32, (plot_top + plot_bottom) / 2),
        y_desc_style,
    ))
    .map_err(render_err)?;

    // Grid sits under the bars.
    for tick in g.major_ticks() {
        let (x0, y) = chart.backend_coord(&(g.x_min, f64::from(tick)));
        let (x1, _) = chart.backend_coord(&(g.x_max, f64::from(tick)));
        draw_dashed(&root, DashPattern::GRID.scaled(pt(1.0)), x0, x1, y, GRID_COLOUR, 1)?;
    }

    let area = chart.plotting_area();
    for bar in &plan.bars {
        draw_bar(area, bar, g.y_min, pt)?;
    }
    for bar in &plan.bars {
        for seg in &bar.segments {
            let (left, top) = chart.backend_coord(&(seg.crest.left, seg.crest.top));
            let (right, bottom) = chart.backend_coord(&(seg.crest.right, seg.crest.bottom));
            let crest = crest_for(crests, seg.opponent_id)?;
            blit_crest(&root, &crest.faded, (left, top), (right - left, bottom - top), seg.fill)?;
        }
    }
    for bar in &plan.bars {
        draw_bar_text(area, bar, pt)?;
    }

    let line_px = pt(LINE_WIDTH_PT).round().max(1.0) as u32;
    for line in plan.visible_lines() {
        let y = f64::from(line.pts_required);
        let (x0, py) = chart.backend_coord(&(g.x_min, y));
        let (x1, _) = chart.backend_coord(&(g.x_max, y));
        draw_dashed(&root, line.dash.scaled(pt(LINE_WIDTH_PT)), x0, x1, py, line.colour, line_px)?;
        if let Some(anchor) = line.anchor_x {
            let style = (FONT, pt(MEDIUM_PT))
                .into_font()
                .style(FontStyle::Bold)
                .color(&rgb(line.colour))
                .pos(Pos::new(HPos::Left, VPos::Bottom));
            area.draw(&Text::new(line.label.clone(), (anchor, line.label_y), style))
                .map_err(render_err)?;
        }
    }

    // Bottom spine runs from just left of the first bar to half a slot past the last.
    let (sx0, sy) = chart.backend_coord(&((-1.0f64).max(g.x_min), g.y_min));
    let (sx1, _) = chart.backend_coord(&(g.axis_end().min(g.x_max), g.y_min));
    root.draw(&PathElement::new(
        vec![(sx0, sy), (sx1, sy)],
        BLACK.stroke_width(pt(LINE_WIDTH_PT) as u32),
    ))
    .map_err(render_err)?;

    let tick_box = crest_box.min(pt(72.0) * g.bar_width) as u32;
    for bar in &plan.bars {
        let (cx, cy) = chart.backend_coord(&(bar.centre(), g.y_min));
        let crest = crest_for(crests, bar.team_id)?;
        let (w, h) = fit_within(crest.colour.dimensions(), tick_box);
        let top_left = (cx - w as i32 / 2, cy + pt(CREST_DROP_PT) as i32 - h as i32 / 2);
        blit_crest(&root, &crest.colour, top_left, (w as i32, h as i32), Colour::WHITE)?;
    }

    let title_style = (FONT, pt(TITLE_PT))
        .into_font()
        .style(FontStyle::Bold)
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Top));
    for (n, text) in title_lines.iter().enumerate() {
        let y = pt(10.0) + title_line_px * n as f64;
        root.draw(&Text::new(
            text.to_string(),
            ((g.width_px / 2) as i32, y as i32),
            title_style.clone(),
        ))
        .map_err(render_err)?;
    }

    let drawn = Instant::now();
    root.present().map_err(render_err)?;
    let timings = RenderTimings {
        draw: drawn.duration_since(started),
        save: drawn.elapsed(),
    };
    info!(path = %path.display(), save_ms = timings.save.as_millis() as u64, "chart written");
    Ok(timings)
}

fn draw_bar<F: Fn(f64) -> f64>(
    area: &PlotArea<'_>,
    bar: &TeamBar,
    floor: f64,
    pt: F,
) -> RaceResult<()> {
    let base = 0.0f64.max(floor);
    area.draw(&Rectangle::new(
        [(bar.left, base), (bar.right, f64::from(bar.current_points))],
        rgb(bar.colour).filled(),
    ))
    .map_err(render_err)?;

    let outline = rgb(FIXTURE_OUTLINE).stroke_width(pt(LINE_WIDTH_PT).round().max(1.0) as u32);
    for seg in &bar.segments {
        let corners = [
            (bar.left, f64::from(seg.bottom)),
            (bar.right, f64::from(seg.bottom + seg.height)),
        ];
        area.draw(&Rectangle::new(corners, rgb(seg.fill).filled()))
            .map_err(render_err)?;
        area.draw(&Rectangle::new(corners, outline))
            .map_err(render_err)?;
    }
    Ok(())
}

fn draw_bar_text<F: Fn(f64) -> f64>(
    area: &PlotArea<'_>,
    bar: &TeamBar,
    pt: F,
) -> RaceResult<()> {
    let small = (FONT, pt(SMALL_PT)).into_font().style(FontStyle::Bold);
    let fixture_style = small
        .clone()
        .color(&rgb(FIXTURE_TEXT))
        .pos(Pos::new(HPos::Center, VPos::Bottom));
    for seg in &bar.segments {
        area.draw(&Text::new(seg.label.clone(), seg.label_at, fixture_style.clone()))
            .map_err(render_err)?;
    }
    if let Some((label, at)) = &bar.goal_difference {
        let gd_style = small
            .color(&WHITE)
            .pos(Pos::new(HPos::Center, VPos::Bottom));
        area.draw(&Text::new(label.clone(), *at, gd_style))
            .map_err(render_err)?;
    }
    Ok(())
}

fn draw_dashed(
    root: &Root<'_>,
    pattern: DashPattern,
    x0: i32,
    x1: i32,
    y: i32,
    colour: Colour,
    width: u32,
) -> RaceResult<()> {
    let style = rgb(colour).stroke_width(width);
    for (from, to) in pattern.segments(f64::from(x0), f64::from(x1)) {
        root.draw(&PathElement::new(
            vec![(from.round() as i32, y), (to.round() as i32, y)],
            style,
        ))
        .map_err(render_err)?;
    }
    Ok(())
}

fn blit_crest(
    root: &Root<'_>,
    image: &image::RgbaImage,
    top_left: (i32, i32),
    size: (i32, i32),
    background: Colour,
) -> RaceResult<()> {
    if size.0 <= 0 || size.1 <= 0 {
        return Ok(());
    }
    let (w, h) = (size.0 as u32, size.1 as u32);
    let fitted = fit(image, w, h);
    let buf = flatten_onto(&fitted, background);
    let element = BitMapElement::with_owned_buffer(top_left, (w, h), buf)
        .ok_or_else(|| RaceError::Render("crest buffer size mismatch".into()))?;
    root.draw(&element).map_err(render_err)
}

/// Largest size with the same aspect ratio whose longer side is `limit`.
fn fit_within((w, h): (u32, u32), limit: u32) -> (u32, u32) {
    if w == 0 || h == 0 {
        return (limit, limit);
    }
    let scale = f64::from(limit) / f64::from(w.max(h));
    (
        (f64::from(w) * scale).round().max(1.0) as u32,
        (f64::from(h) * scale).round().max(1.0) as u32,
    )
}

fn crest_for(crests: &CrestSet, team_id: u32) -> RaceResult<&Crest> {
    crests
        .get(&team_id)
        .ok_or_else(|| RaceError::Integrity(format!("no crest loaded for team {team_id}")))
}

fn rgb(colour: Colour) -> RGBColor {
    RGBColor(colour.r, colour.g, colour.b)
}

fn render_err<E: Display>(err: E) -> RaceError {
    RaceError::Render(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::fit_within;

    #[test]
    fn fit_within_keeps_aspect() {
        assert_eq!(fit_within((200, 100), 50), (50, 25));
        assert_eq!(fit_within((100, 200), 50), (25, 50));
        assert_eq!(fit_within((0, 10), 50), (50, 50));
    }
}
