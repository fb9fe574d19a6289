//! Static Chart Renderer
//! Draws a chart description into SVG text or PNG bytes with plotters.
//!
//! Layout:
//! 1. The canvas is split evenly into the chart's rows x cols grid
//! 2. Each populated cell gets its own date/value mesh; empty cells stay blank
//! 3. Bands are translucent filled polygons, lines are drawn per run of
//!    non-null points, markers are filled circles
//! 4. Each panel carries a legend of its visible traces
//!
//! Axis labels and legends need a system font; [`RenderOptions`] can turn
//! both off for headless use.

use image::{ImageFormat, RgbImage};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::io::Cursor;

use super::model::{Cell, Chart, Fill, Trace, TraceMode};
use crate::data::{date_from_days, days_from_date};
use crate::error::{ChartError, Result};

// Colors
const GRID_GRAY: RGBColor = RGBColor(200, 200, 200);
const BAND_ALPHA: f64 = 0.3;

const MARKER_RADIUS: i32 = 3;
const LINE_WIDTH: u32 = 2;
const PANEL_MARGIN: u32 = 10;
const X_LABEL_AREA: u32 = 30;
const Y_LABEL_AREA: u32 = 50;

fn render_error<E: std::fmt::Display>(err: E) -> ChartError {
    ChartError::Render(err.to_string())
}

/// Parse `#RRGGBB` or a basic color name; anything else draws black.
fn parse_color(color: &str) -> RGBColor {
    if let Some(hex) = color.strip_prefix('#') {
        if hex.len() == 6 {
            if let Ok(rgb) = u32::from_str_radix(hex, 16) {
                return RGBColor((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8);
            }
        }
    }
    match color.to_ascii_lowercase().as_str() {
        "white" => WHITE,
        "red" => RED,
        "green" => GREEN,
        "blue" => BLUE,
        "gray" | "grey" => RGBColor(128, 128, 128),
        _ => BLACK,
    }
}

/// Split a trace into runs of consecutive non-null points.
fn point_runs(trace: &Trace) -> Vec<Vec<(f64, f64)>> {
    let mut runs = Vec::new();
    let mut current = Vec::new();
    for (x, y) in trace.x.iter().zip(&trace.y) {
        match y {
            Some(y) if y.is_finite() => current.push((days_from_date(*x) as f64, *y)),
            _ => {
                if !current.is_empty() {
                    runs.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

/// Padded y range over the finite values of `traces`.
fn y_range(traces: &[(usize, &Trace)]) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for (_, trace) in traces {
        for v in trace.y.iter().flatten().filter(|v| v.is_finite()) {
            min = min.min(*v);
            max = max.max(*v);
        }
    }
    if min.is_infinite() {
        return (0.0, 1.0);
    }
    let pad = if max > min { (max - min) * 0.05 } else { 1.0 };
    (min - pad, max + pad)
}

/// Day-number x range for a panel: the column extent when x is shared,
/// otherwise the panel's own extent.
fn x_range(chart: &Chart, cell: Cell, traces: &[(usize, &Trace)]) -> (f64, f64) {
    let extent = if chart.shared_x() {
        chart.x_extent(cell.col)
    } else {
        let mut dates = traces.iter().flat_map(|(_, t)| t.x.iter().copied());
        dates.next().map(|first| {
            dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)))
        })
    };
    match extent {
        Some((start, end)) if end > start => {
            (days_from_date(start) as f64, days_from_date(end) as f64)
        }
        Some((start, _)) => {
            let day = days_from_date(start) as f64;
            (day - 1.0, day + 1.0)
        }
        None => (0.0, 1.0),
    }
}

fn format_day(day: &f64) -> String {
    date_from_days(day.round() as i32)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Text elements to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub axis_labels: bool,
    pub legend: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            axis_labels: true,
            legend: true,
        }
    }
}

impl RenderOptions {
    /// Shapes only: no mesh, tick labels or legend.
    pub fn without_text() -> Self {
        Self {
            axis_labels: false,
            legend: false,
        }
    }
}

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render to an SVG document sized `width x height`.
    pub fn render_svg(chart: &Chart) -> Result<String> {
        Self::render_svg_with(chart, RenderOptions::default())
    }

    pub fn render_svg_with(chart: &Chart, options: RenderOptions) -> Result<String> {
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, (chart.width(), chart.height()))
                .into_drawing_area();
            Self::draw_chart(&root, chart, options)?;
            root.present().map_err(render_error)?;
        }
        Ok(svg)
    }

    /// Render to PNG bytes sized `width x height`.
    pub fn render_png(chart: &Chart) -> Result<Vec<u8>> {
        Self::render_png_with(chart, RenderOptions::default())
    }

    pub fn render_png_with(chart: &Chart, options: RenderOptions) -> Result<Vec<u8>> {
        let (width, height) = (chart.width(), chart.height());
        let mut pixels = vec![0u8; width as usize * height as usize * 3];
        {
            let root = BitMapBackend::with_buffer(&mut pixels, (width, height)).into_drawing_area();
            Self::draw_chart(&root, chart, options)?;
            root.present().map_err(render_error)?;
        }

        let image = RgbImage::from_raw(width, height, pixels)
            .ok_or_else(|| ChartError::Render("pixel buffer does not match chart size".into()))?;
        let mut bytes = Vec::new();
        image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }

    fn draw_chart<DB: DrawingBackend>(
        root: &DrawingArea<DB, Shift>,
        chart: &Chart,
        options: RenderOptions,
    ) -> Result<()> {
        chart.check_cells()?;
        root.fill(&WHITE).map_err(render_error)?;
        if chart.rows() == 0 || chart.cols() == 0 {
            return Ok(());
        }

        let areas = root.split_evenly((chart.rows(), chart.cols()));
        for (i, area) in areas.iter().enumerate() {
            let cell = Cell::new(i / chart.cols() + 1, i % chart.cols() + 1);
            let traces: Vec<(usize, &Trace)> = chart
                .traces()
                .iter()
                .enumerate()
                .filter(|(_, t)| t.cell == cell)
                .collect();
            if traces.is_empty() {
                continue;
            }
            Self::draw_panel(area, chart, cell, &traces, options)?;
        }
        Ok(())
    }

    fn draw_panel<DB: DrawingBackend>(
        area: &DrawingArea<DB, Shift>,
        chart: &Chart,
        cell: Cell,
        traces: &[(usize, &Trace)],
        options: RenderOptions,
    ) -> Result<()> {
        let (x0, x1) = x_range(chart, cell, traces);
        let (y0, y1) = y_range(traces);
        let (x_area, y_area) = if options.axis_labels {
            (X_LABEL_AREA, Y_LABEL_AREA)
        } else {
            (0, 0)
        };

        let mut ctx = ChartBuilder::on(area)
            .margin(PANEL_MARGIN)
            .x_label_area_size(x_area)
            .y_label_area_size(y_area)
            .build_cartesian_2d(x0..x1, y0..y1)
            .map_err(render_error)?;

        if options.axis_labels {
            let hide_x_labels = chart.shared_x() && cell.row < chart.rows();
            ctx.configure_mesh()
                .light_line_style(GRID_GRAY.mix(0.3))
                .x_labels(if hide_x_labels { 0 } else { 6 })
                .x_label_formatter(&format_day)
                .draw()
                .map_err(render_error)?;
        }

        let mut has_legend = false;
        for &(index, trace) in traces {
            let color = parse_color(chart.trace_color(index));
            let runs = point_runs(trace);

            match (trace.fill, trace.mode) {
                (Fill::ToSelf, _) => {
                    let outline: Vec<(f64, f64)> = runs.into_iter().flatten().collect();
                    if outline.len() >= 3 {
                        ctx.draw_series(std::iter::once(Polygon::new(
                            outline,
                            color.mix(BAND_ALPHA).filled(),
                        )))
                        .map_err(render_error)?;
                    }
                }
                (Fill::None, TraceMode::Lines) => {
                    let width = trace.line_width.map_or(LINE_WIDTH, |w| w.round() as u32);
                    for (n, run) in runs.into_iter().enumerate() {
                        let series = ctx
                            .draw_series(LineSeries::new(run, color.stroke_width(width)))
                            .map_err(render_error)?;
                        if n == 0 && trace.show_legend && options.legend {
                            series.label(trace.name.as_str()).legend(move |(x, y)| {
                                PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
                            });
                            has_legend = true;
                        }
                    }
                }
                (Fill::None, TraceMode::Markers) => {
                    let points: Vec<(f64, f64)> = runs.into_iter().flatten().collect();
                    let series = ctx
                        .draw_series(
                            points
                                .into_iter()
                                .map(|p| Circle::new(p, MARKER_RADIUS, color.filled())),
                        )
                        .map_err(render_error)?;
                    if trace.show_legend && options.legend {
                        series
                            .label(trace.name.as_str())
                            .legend(move |(x, y)| Circle::new((x + 10, y), MARKER_RADIUS, color.filled()));
                        has_legend = true;
                    }
                }
            }
        }

        if has_legend {
            ctx.configure_series_labels()
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .position(SeriesLabelPosition::UpperLeft)
                .draw()
                .map_err(render_error)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 5, d).unwrap()
    }

    #[test]
    fn parses_hex_and_named_colors() {
        assert_eq!(parse_color("#636EFA"), RGBColor(0x63, 0x6E, 0xFA));
        assert_eq!(parse_color("black"), BLACK);
        assert_eq!(parse_color("Red"), RED);
        assert_eq!(parse_color("#12"), BLACK);
    }

    #[test]
    fn null_points_split_runs() {
        let trace = Trace::line(
            "Mobility",
            vec![day(1), day(2), day(3), day(4)],
            vec![Some(1.0), None, Some(2.0), Some(3.0)],
        );
        let runs = point_runs(&trace);
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].len(), 1);
        assert_eq!(runs[1].iter().map(|p| p.1).collect::<Vec<_>>(), vec![2.0, 3.0]);
    }

    #[test]
    fn ranges_are_padded_and_non_degenerate() {
        let trace = Trace::line("Rt", vec![day(1)], vec![Some(1.0)]);
        let traces = [(0, &trace)];
        assert_eq!(y_range(&traces), (0.0, 2.0));

        let chart = Chart::new(1, 1, true, 100, 100);
        let (x0, x1) = x_range(&chart, Cell::new(1, 1), &traces);
        assert!(x1 > x0);
        assert_eq!(format_day(&(days_from_date(day(1)) as f64)), "2021-05-01");
    }

    fn panels_chart() -> Chart {
        let mut chart = Chart::new(2, 2, true, 300, 400);
        chart.add_trace(
            Trace::line("Rt", vec![day(1), day(2)], vec![Some(1.0), Some(1.1)]).color("#00CC96"),
        );
        chart.add_trace(
            crate::charts::uncertainty_band(
                &[day(1), day(2)],
                &[Some(0.8), Some(0.9)],
                &[Some(1.2), Some(1.3)],
                "#00CC96",
            )
            .named("Rt"),
        );
        chart.add_trace(
            Trace::markers("Reported cases", vec![day(1), day(3)], vec![Some(4.0), Some(6.0)])
                .color("black")
                .at(Cell::new(2, 1)),
        );
        chart
    }

    #[test]
    fn draws_shapes_without_text() {
        let chart = panels_chart();

        let svg = StaticChartRenderer::render_svg_with(&chart, RenderOptions::without_text()).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("<polygon"));
        assert!(svg.contains("<polyline"));
        assert!(svg.contains("<circle"));
        assert!(!svg.contains("<text"));

        let png = StaticChartRenderer::render_png_with(&chart, RenderOptions::without_text()).unwrap();
        assert_eq!(&png[1..4], b"PNG");
    }

    #[test]
    fn refuses_traces_outside_the_grid() {
        let mut chart = panels_chart();
        chart.add_trace(Trace::line("Rt", vec![day(1)], vec![Some(1.0)]).at(Cell::new(3, 1)));
        assert!(matches!(
            StaticChartRenderer::render_svg_with(&chart, RenderOptions::without_text()),
            Err(ChartError::CellOutOfGrid { row: 3, .. })
        ));
    }

    // Text layout needs a system font.
    #[test]
    #[ignore]
    fn renders_svg_and_png() {
        let mut chart = Chart::new(2, 2, true, 300, 400);
        chart.add_trace(
            Trace::line("Rt", vec![day(1), day(2)], vec![Some(1.0), Some(1.1)]).color("#00CC96"),
        );
        let svg = StaticChartRenderer::render_svg(&chart).unwrap();
        assert!(svg.contains("<svg"));
        let png = StaticChartRenderer::render_png(&chart).unwrap();
        assert_eq!(&png[1..4], b"PNG");
    }
}
