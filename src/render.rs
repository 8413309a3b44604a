// Rendering strategies: draw a ChartPlan into an SVG document.
//
// Cartesian kinds go through plotters' ChartBuilder on a segmented category
// axis. Circular, tiled and polar kinds are laid out in pixel space.

use crate::config::RenderOptions;
use crate::data::CellValue;
use crate::engine::ChartPlan;
use crate::kind::{ChartKind, Layout};
use crate::label::format_label;
use crate::palette::ChartPalette;
use anyhow::{bail, Context, Result};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::FontTransform;
use std::f64::consts::PI;
use std::ops::Range;
use tracing::debug;

type Area<'a> = DrawingArea<SVGBackend<'a>, Shift>;

/// Smallest width and height, in pixels, a chart is laid out in
pub const MIN_DIMENSION: u32 = 64;

/// Everything a strategy needs besides the plan
struct Style<'p> {
    palette: &'p ChartPalette,
    label_max_length: usize,
}

/// Draw `plan` as a standalone SVG document
pub fn render_svg(plan: &ChartPlan, options: &RenderOptions) -> Result<String> {
    if options.width < MIN_DIMENSION || options.height < MIN_DIMENSION {
        bail!(
            "Chart size {}x{} is below the minimum of {}x{} pixels",
            options.width,
            options.height,
            MIN_DIMENSION,
            MIN_DIMENSION
        );
    }

    let palette = ChartPalette::for_mode(options.theme);
    let style = Style {
        palette: &palette,
        label_max_length: options.label_max_length,
    };

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (options.width, options.height))
            .into_drawing_area();
        root.fill(&palette.background)
            .context("Failed to fill background")?;

        let area = if plan.title.is_empty() {
            root.clone()
        } else {
            root.titled(&plan.title, ("sans-serif", 20).into_font().color(&palette.text))
                .context("Failed to draw title")?
        };

        match plan.kind {
            ChartKind::Bar => draw_vertical_bars(&area, plan, &style)?,
            ChartKind::HorizontalBar => draw_horizontal_bars(&area, plan, &style)?,
            ChartKind::Line => draw_line(&area, plan, &style)?,
            ChartKind::AreaBarCombo => draw_area_bar_combo(&area, plan, &style)?,
            ChartKind::Pie | ChartKind::Donut => draw_circular(&area, plan, &style)?,
            ChartKind::Treemap => draw_treemap(&area, plan, &style)?,
            ChartKind::Radar => draw_radar(&area, plan, &style)?,
        }

        root.present().context("Failed to present drawing")?;
    }

    debug!(kind = %plan.kind, bytes = svg.len(), "rendered chart");
    Ok(svg)
}

// =============================================================================
// Data extraction
// =============================================================================

/// Display labels for the category column, shortened for axes and legends
fn category_labels(plan: &ChartPlan, max_length: usize) -> Vec<String> {
    plan.data
        .rows
        .iter()
        .map(|row| {
            row.get(plan.fields.category.as_str())
                .map(|value| format_label(value, max_length))
                .unwrap_or_default()
        })
        .collect()
}

/// Numeric series for `column`; rows without the key plot as 0
fn series_values(plan: &ChartPlan, column: &str) -> Vec<f64> {
    plan.data
        .rows
        .iter()
        .map(|row| row.get(column).and_then(CellValue::as_number).unwrap_or(0.0))
        .collect()
}

/// Value axis range that always contains zero, padded by 5%
fn value_range(values: &[f64]) -> Range<f64> {
    let (min, max) = values
        .iter()
        .fold((0.0_f64, 0.0_f64), |(lo, hi), v| (lo.min(*v), hi.max(*v)));

    if min == max {
        return (min - 1.0)..(max + 1.0);
    }

    let padding = (max - min) * 0.05;
    let low = if min < 0.0 { min - padding } else { 0.0 };
    let high = if max > 0.0 { max + padding } else { 0.0 };
    low..high
}

/// Whether category tick labels are drawn vertically for `categories` ticks
fn rotates_labels(layout: &Layout, categories: usize) -> bool {
    match layout {
        Layout::Cartesian {
            rotate_labels_above: Some(above),
            ..
        } => categories > *above,
        _ => false,
    }
}

fn segment_label(labels: &[String], value: &SegmentValue<u32>) -> String {
    match value {
        SegmentValue::CenterOf(idx) => labels.get(*idx as usize).cloned().unwrap_or_default(),
        _ => String::new(),
    }
}

// =============================================================================
// Cartesian strategies
// =============================================================================

fn draw_vertical_bars(area: &Area, plan: &ChartPlan, style: &Style) -> Result<()> {
    let palette = style.palette;
    let labels = category_labels(plan, style.label_max_length);
    let values = series_values(plan, &plan.fields.value);
    let n = labels.len() as u32;

    let rotate = rotates_labels(&plan.layout, labels.len());
    let label_area = match plan.layout {
        Layout::Cartesian { label_area, .. } => label_area,
        _ => 40,
    };
    // rotated labels need room for their length instead of their height
    let x_label_area = if rotate { label_area + 50 } else { label_area };

    let mut chart = ChartBuilder::on(area)
        .margin(10)
        .x_label_area_size(x_label_area as i32)
        .y_label_area_size(50)
        .build_cartesian_2d((0..n).into_segmented(), value_range(&values))
        .context("Failed to build chart")?;

    let tick_font = if rotate {
        ("sans-serif", 12).into_font().transform(FontTransform::Rotate90)
    } else {
        ("sans-serif", 12).into_font()
    };

    chart
        .configure_mesh()
        .disable_x_mesh()
        .light_line_style(palette.grid)
        .bold_line_style(palette.grid)
        .axis_style(palette.text)
        .x_labels(labels.len())
        .x_label_style(tick_font.color(&palette.text))
        .y_label_style(("sans-serif", 12).into_font().color(&palette.text))
        .x_label_formatter(&|v| segment_label(&labels, v))
        .draw()
        .context("Failed to draw mesh")?;

    let color = palette.primary;
    chart
        .draw_series(values.iter().enumerate().map(|(i, v)| {
            let i = i as u32;
            let mut bar = Rectangle::new(
                [(SegmentValue::Exact(i), 0.0), (SegmentValue::Exact(i + 1), *v)],
                color.filled(),
            );
            bar.set_margin(0, 0, 5, 5);
            bar
        }))
        .context("Failed to draw bars")?
        .label(plan.fields.value.as_str())
        .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));

    draw_series_legend(&mut chart, palette)
}

fn draw_horizontal_bars(area: &Area, plan: &ChartPlan, style: &Style) -> Result<()> {
    let palette = style.palette;
    let labels = category_labels(plan, style.label_max_length);
    let values = series_values(plan, &plan.fields.value);
    let n = labels.len() as u32;

    let label_area = match plan.layout {
        Layout::Cartesian { label_area, .. } => label_area,
        _ => 80,
    };

    let mut chart = ChartBuilder::on(area)
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(label_area as i32)
        .build_cartesian_2d(value_range(&values), (0..n).into_segmented())
        .context("Failed to build chart")?;

    chart
        .configure_mesh()
        .disable_y_mesh()
        .light_line_style(palette.grid)
        .bold_line_style(palette.grid)
        .axis_style(palette.text)
        .y_labels(labels.len())
        .label_style(("sans-serif", 12).into_font().color(&palette.text))
        .y_label_formatter(&|v| segment_label(&labels, v))
        .draw()
        .context("Failed to draw mesh")?;

    let color = palette.primary;
    chart
        .draw_series(values.iter().enumerate().map(|(i, v)| {
            let i = i as u32;
            let mut bar = Rectangle::new(
                [(0.0, SegmentValue::Exact(i)), (*v, SegmentValue::Exact(i + 1))],
                color.filled(),
            );
            bar.set_margin(5, 5, 0, 0);
            bar
        }))
        .context("Failed to draw bars")?
        .label(plan.fields.value.as_str())
        .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));

    draw_series_legend(&mut chart, palette)
}

fn draw_line(area: &Area, plan: &ChartPlan, style: &Style) -> Result<()> {
    let palette = style.palette;
    let labels = category_labels(plan, style.label_max_length);
    let values = series_values(plan, &plan.fields.value);
    let n = labels.len() as u32;

    let mut chart = ChartBuilder::on(area)
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d((0..n).into_segmented(), value_range(&values))
        .context("Failed to build chart")?;

    chart
        .configure_mesh()
        .light_line_style(palette.grid)
        .bold_line_style(palette.grid)
        .axis_style(palette.text)
        .x_labels(labels.len())
        .label_style(("sans-serif", 12).into_font().color(&palette.text))
        .x_label_formatter(&|v| segment_label(&labels, v))
        .draw()
        .context("Failed to draw mesh")?;

    let color = palette.primary;
    let points: Vec<(SegmentValue<u32>, f64)> = values
        .iter()
        .enumerate()
        .map(|(i, v)| (SegmentValue::CenterOf(i as u32), *v))
        .collect();

    chart
        .draw_series(LineSeries::new(points.clone(), color.stroke_width(2)))
        .context("Failed to draw line series")?
        .label(plan.fields.value.as_str())
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 15, y)], color.stroke_width(2)));

    chart
        .draw_series(points.into_iter().map(|p| Circle::new(p, 3, color.filled())))
        .context("Failed to draw line points")?;

    draw_series_legend(&mut chart, palette)
}

fn draw_area_bar_combo(area: &Area, plan: &ChartPlan, style: &Style) -> Result<()> {
    let palette = style.palette;
    let labels = category_labels(plan, style.label_max_length);
    let area_values = series_values(plan, &plan.fields.value);
    let bar_values = plan
        .fields
        .secondary
        .as_deref()
        .map(|column| series_values(plan, column));
    let n = labels.len() as u32;

    let all_values: Vec<f64> = area_values
        .iter()
        .chain(bar_values.iter().flatten())
        .copied()
        .collect();

    let mut chart = ChartBuilder::on(area)
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d((0..n).into_segmented(), value_range(&all_values))
        .context("Failed to build chart")?;

    chart
        .configure_mesh()
        .light_line_style(palette.grid)
        .bold_line_style(palette.grid)
        .axis_style(palette.text)
        .x_labels(labels.len())
        .label_style(("sans-serif", 12).into_font().color(&palette.text))
        .x_label_formatter(&|v| segment_label(&labels, v))
        .draw()
        .context("Failed to draw mesh")?;

    let area_color = palette.primary;
    chart
        .draw_series(
            AreaSeries::new(
                area_values
                    .iter()
                    .enumerate()
                    .map(|(i, v)| (SegmentValue::CenterOf(i as u32), *v)),
                0.0,
                area_color.mix(0.6),
            )
            .border_style(area_color),
        )
        .context("Failed to draw area series")?
        .label(plan.fields.value.as_str())
        .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], area_color.mix(0.6).filled()));

    if let (Some(values), Some(column)) = (bar_values, plan.fields.secondary.as_deref()) {
        let bar_color = palette.secondary;
        chart
            .draw_series(values.iter().enumerate().map(|(i, v)| {
                let i = i as u32;
                let mut bar = Rectangle::new(
                    [(SegmentValue::Exact(i), 0.0), (SegmentValue::Exact(i + 1), *v)],
                    bar_color.filled(),
                );
                bar.set_margin(0, 0, 12, 12);
                bar
            }))
            .context("Failed to draw bar series")?
            .label(column)
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], bar_color.filled()));
    }

    draw_series_legend(&mut chart, palette)
}

fn draw_series_legend<'a, DB, X, Y>(
    chart: &mut ChartContext<'a, DB, Cartesian2d<X, Y>>,
    palette: &ChartPalette,
) -> Result<()>
where
    DB: DrawingBackend + 'a,
    DB::ErrorType: 'static,
    X: Ranged,
    Y: Ranged,
{
    chart
        .configure_series_labels()
        .background_style(palette.background.mix(0.8))
        .border_style(palette.grid)
        .label_font(("sans-serif", 12).into_font().color(&palette.text))
        .draw()
        .context("Failed to draw legend")?;
    Ok(())
}

// =============================================================================
// Circular strategies (pie, donut)
// =============================================================================

/// Radii in the layout are for a 250px panel and scale with the drawing area
const REFERENCE_PANEL: f64 = 250.0;

/// Arc steps per full turn when approximating wedges
const ARC_STEPS: usize = 180;

fn draw_circular(area: &Area, plan: &ChartPlan, style: &Style) -> Result<()> {
    let palette = style.palette;
    let (inner, outer) = match plan.layout {
        Layout::Circular {
            inner_radius,
            outer_radius,
        } => (inner_radius, outer_radius),
        _ => (0.0, 80.0),
    };

    let (width, height) = area.dim_in_pixel();
    let scale = width.min(height) as f64 / REFERENCE_PANEL;
    let center = (width as f64 * 0.4, height as f64 / 2.0);
    let outer_px = (outer * scale).min(height as f64 / 2.0 - 10.0).max(1.0);
    let inner_px = inner * scale * outer_px / (outer * scale).max(1.0);

    let labels = category_labels(plan, style.label_max_length);
    let values: Vec<f64> = series_values(plan, &plan.fields.value)
        .into_iter()
        .map(|v| v.max(0.0))
        .collect();
    let total: f64 = values.iter().sum();

    if total > 0.0 {
        let mut start = -PI / 2.0;
        for (i, value) in values.iter().enumerate() {
            let sweep = value / total * 2.0 * PI;
            if sweep <= 0.0 {
                continue;
            }
            let points = wedge_points(center, inner_px, outer_px, start, start + sweep);
            area.draw(&Polygon::new(points.clone(), palette.segment(i).filled()))
                .context("Failed to draw slice")?;
            area.draw(&PathElement::new(closed(points), palette.background.stroke_width(1)))
                .context("Failed to draw slice border")?;
            start += sweep;
        }
    } else {
        let ring = wedge_points(center, inner_px, outer_px, 0.0, 2.0 * PI);
        area.draw(&PathElement::new(closed(ring), palette.grid.stroke_width(1)))
            .context("Failed to draw empty ring")?;
    }

    let legend_x = (center.0 + outer_px + 30.0) as i32;
    draw_swatch_legend(area, &labels, legend_x, style)
}

/// Outline of an annular wedge between two angles (radians, clockwise from +x)
fn wedge_points(center: (f64, f64), inner: f64, outer: f64, start: f64, end: f64) -> Vec<(i32, i32)> {
    let steps = (((end - start) / (2.0 * PI)) * ARC_STEPS as f64).ceil().max(2.0) as usize;
    let arc = |radius: f64, i: usize| {
        let angle = start + (end - start) * i as f64 / steps as f64;
        (
            (center.0 + radius * angle.cos()).round() as i32,
            (center.1 + radius * angle.sin()).round() as i32,
        )
    };

    let mut points: Vec<(i32, i32)> = (0..=steps).map(|i| arc(outer, i)).collect();
    if inner > 0.0 {
        points.extend((0..=steps).rev().map(|i| arc(inner, i)));
    } else {
        points.push((center.0.round() as i32, center.1.round() as i32));
    }
    points
}

fn closed(mut points: Vec<(i32, i32)>) -> Vec<(i32, i32)> {
    if let Some(first) = points.first().copied() {
        points.push(first);
    }
    points
}

fn draw_swatch_legend(area: &Area, labels: &[String], x: i32, style: &Style) -> Result<()> {
    let palette = style.palette;
    let font = ("sans-serif", 12).into_font().color(&palette.text);
    for (i, label) in labels.iter().enumerate() {
        let y = 20 + i as i32 * 20;
        area.draw(&Rectangle::new([(x, y), (x + 12, y + 12)], palette.segment(i).filled()))
            .context("Failed to draw legend swatch")?;
        area.draw(&Text::new(label.clone(), (x + 18, y), font.clone()))
            .context("Failed to draw legend label")?;
    }
    Ok(())
}

// =============================================================================
// Treemap
// =============================================================================

/// One laid-out treemap cell; `index` is the row it stands for
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tile {
    pub index: usize,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Squarified treemap layout of `values` over the rectangle at (x, y).
///
/// Non-positive values get no tile. Larger values are placed first.
pub fn squarify(values: &[f64], x: f64, y: f64, width: f64, height: f64) -> Vec<Tile> {
    let mut items: Vec<(usize, f64)> = values
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, v)| *v > 0.0 && v.is_finite())
        .collect();
    let total: f64 = items.iter().map(|(_, v)| v).sum();
    if items.is_empty() || width <= 0.0 || height <= 0.0 {
        return Vec::new();
    }

    items.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    let scale = width * height / total;
    let areas: Vec<(usize, f64)> = items.into_iter().map(|(i, v)| (i, v * scale)).collect();

    let mut tiles = Vec::with_capacity(areas.len());
    let mut rect = (x, y, width, height);
    let mut row: Vec<(usize, f64)> = Vec::new();

    for item in areas {
        let side = rect.2.min(rect.3);
        let mut candidate = row.clone();
        candidate.push(item);
        if row.is_empty() || worst_ratio(&candidate, side) <= worst_ratio(&row, side) {
            row = candidate;
        } else {
            rect = layout_row(&row, rect, &mut tiles);
            row = vec![item];
        }
    }
    if !row.is_empty() {
        layout_row(&row, rect, &mut tiles);
    }
    tiles
}

fn worst_ratio(row: &[(usize, f64)], side: f64) -> f64 {
    let sum: f64 = row.iter().map(|(_, a)| a).sum();
    let max = row.iter().map(|(_, a)| *a).fold(f64::MIN, f64::max);
    let min = row.iter().map(|(_, a)| *a).fold(f64::MAX, f64::min);
    let side2 = side * side;
    let sum2 = sum * sum;
    (side2 * max / sum2).max(sum2 / (side2 * min))
}

/// Place `row` along the shorter side of `rect`; returns the remaining rectangle
fn layout_row(
    row: &[(usize, f64)],
    rect: (f64, f64, f64, f64),
    tiles: &mut Vec<Tile>,
) -> (f64, f64, f64, f64) {
    let (x, y, width, height) = rect;
    let sum: f64 = row.iter().map(|(_, a)| a).sum();

    if width >= height {
        let column_width = sum / height;
        let mut cursor = y;
        for (index, a) in row {
            let h = a / column_width;
            tiles.push(Tile {
                index: *index,
                x,
                y: cursor,
                width: column_width,
                height: h,
            });
            cursor += h;
        }
        (x + column_width, y, width - column_width, height)
    } else {
        let row_height = sum / width;
        let mut cursor = x;
        for (index, a) in row {
            let w = a / row_height;
            tiles.push(Tile {
                index: *index,
                x: cursor,
                y,
                width: w,
                height: row_height,
            });
            cursor += w;
        }
        (x, y + row_height, width, height - row_height)
    }
}

fn draw_treemap(area: &Area, plan: &ChartPlan, style: &Style) -> Result<()> {
    let palette = style.palette;
    let (width, height) = area.dim_in_pixel();
    let labels = category_labels(plan, style.label_max_length);
    let values = series_values(plan, &plan.fields.value);

    // Keep the layout's aspect ratio inside the panel
    let aspect = match plan.layout {
        Layout::Tiled { aspect_ratio } => aspect_ratio,
        _ => 4.0 / 3.0,
    };
    let (w, h) = fit_aspect(width as f64 - 20.0, height as f64 - 20.0, aspect);
    let origin = ((width as f64 - w) / 2.0, (height as f64 - h) / 2.0);

    let font = ("sans-serif", 12).into_font().color(&palette.background);
    for tile in squarify(&values, origin.0, origin.1, w, h) {
        let tl = (tile.x.round() as i32, tile.y.round() as i32);
        let br = (
            (tile.x + tile.width).round() as i32,
            (tile.y + tile.height).round() as i32,
        );
        area.draw(&Rectangle::new([tl, br], palette.segment(tile.index).filled()))
            .context("Failed to draw treemap tile")?;
        area.draw(&Rectangle::new([tl, br], palette.background.stroke_width(2)))
            .context("Failed to draw treemap border")?;

        if tile.width > 40.0 && tile.height > 18.0 {
            let label = labels.get(tile.index).cloned().unwrap_or_default();
            area.draw(&Text::new(label, (tl.0 + 4, tl.1 + 4), font.clone()))
                .context("Failed to draw treemap label")?;
        }
    }
    Ok(())
}

fn fit_aspect(width: f64, height: f64, aspect: f64) -> (f64, f64) {
    let width = width.max(1.0);
    let height = height.max(1.0);
    if width / height > aspect {
        (height * aspect, height)
    } else {
        (width, width / aspect)
    }
}

// =============================================================================
// Radar
// =============================================================================

const RADAR_RINGS: usize = 4;

fn draw_radar(area: &Area, plan: &ChartPlan, style: &Style) -> Result<()> {
    let palette = style.palette;
    let ratio = match plan.layout {
        Layout::Polar { outer_radius_ratio } => outer_radius_ratio,
        _ => 0.8,
    };

    let (width, height) = area.dim_in_pixel();
    let center = (width as f64 / 2.0, height as f64 / 2.0);
    let radius = width.min(height) as f64 / 2.0 * ratio;

    let labels = category_labels(plan, style.label_max_length);
    let primary = series_values(plan, &plan.fields.value);
    let secondary = plan
        .fields
        .secondary
        .as_deref()
        .map(|column| series_values(plan, column));

    let max = primary
        .iter()
        .chain(secondary.iter().flatten())
        .copied()
        .fold(0.0_f64, f64::max);
    let max = if max > 0.0 { max } else { 1.0 };

    let axes = labels.len().max(1);
    let vertex = |i: usize, r: f64| {
        let angle = -PI / 2.0 + 2.0 * PI * i as f64 / axes as f64;
        (
            (center.0 + r * angle.cos()).round() as i32,
            (center.1 + r * angle.sin()).round() as i32,
        )
    };

    // grid
    for ring in 1..=RADAR_RINGS {
        let r = radius * ring as f64 / RADAR_RINGS as f64;
        let outline: Vec<(i32, i32)> = (0..axes).map(|i| vertex(i, r)).collect();
        area.draw(&PathElement::new(closed(outline), palette.grid.stroke_width(1)))
            .context("Failed to draw radar grid")?;
    }
    let center_px = (center.0.round() as i32, center.1.round() as i32);
    let font = ("sans-serif", 12).into_font().color(&palette.text);
    for (i, label) in labels.iter().enumerate() {
        area.draw(&PathElement::new(vec![center_px, vertex(i, radius)], palette.grid.stroke_width(1)))
            .context("Failed to draw radar spoke")?;
        let (lx, ly) = vertex(i, radius + 14.0);
        let half_width = (label.chars().count() as i32 * 7) / 2;
        area.draw(&Text::new(label.clone(), (lx - half_width, ly - 6), font.clone()))
            .context("Failed to draw radar label")?;
    }

    let series = std::iter::once((primary, palette.primary))
        .chain(secondary.map(|values| (values, palette.secondary)));
    for (values, color) in series {
        let shape: Vec<(i32, i32)> = values
            .iter()
            .enumerate()
            .map(|(i, v)| vertex(i, radius * v.max(0.0) / max))
            .collect();
        area.draw(&Polygon::new(shape.clone(), color.mix(0.6).filled()))
            .context("Failed to draw radar area")?;
        area.draw(&PathElement::new(closed(shape), color.stroke_width(2)))
            .context("Failed to draw radar outline")?;
    }
    Ok(())
}
