use std::f64::consts::TAU;

use plotters::coord::Shift;
use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::types::RangedCoordf64;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use tracing::debug;

use super::PlotError;
use super::figure::{Element, Figure, Marker, Panel};
use super::font::{self, FAMILY};
use super::palette::Colour;

type Chart<'a, DB> = ChartContext<'a, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

/// Dashes per dashed segment.
const DASHES: usize = 24;

/// Points on a circle outline.
const CIRCLE_POINTS: usize = 64;

impl<E: std::error::Error + Send + Sync> From<DrawingAreaErrorKind<E>> for PlotError {
    fn from(e: DrawingAreaErrorKind<E>) -> Self {
        PlotError::Render(e.to_string())
    }
}

/// Draw `figure` onto a drawing area of any plotters backend.
///
/// Text is only drawn when a font could be registered; see
/// [`FONT_ENV`](super::font::FONT_ENV).
pub fn render<DB: DrawingBackend>(figure: &Figure, root: &DrawingArea<DB, Shift>) -> Result<(), PlotError> {
    let text = font::available();
    debug!(panels = figure.panels.len(), text, "rendering figure");

    root.fill(&WHITE)?;
    let body = match (&figure.title, text) {
        (Some(title), true) => root.titled(title, (FAMILY, 24).into_font())?,
        _ => root.clone(),
    };

    let (width, height) = body.dim_in_pixel();
    let (width, height) = (f64::from(width), f64::from(height));
    for panel in &figure.panels {
        let rect = panel.rect;
        let left = (rect.left * width).round() as i32;
        let top = (rect.top * height).round() as i32;
        let w = ((rect.width * width).round() as u32).max(1);
        let h = ((rect.height * height).round() as u32).max(1);
        draw_panel(panel, &body.clone().shrink((left, top), (w, h)), text)?;
    }
    Ok(())
}

fn draw_panel<DB: DrawingBackend>(panel: &Panel, area: &DrawingArea<DB, Shift>, text: bool) -> Result<(), PlotError> {
    let ((x0, x1), (y0, y1)) = panel.ranges();

    let mut builder = ChartBuilder::on(area);
    builder.margin(6);
    if text {
        let x_area = if panel.hide_x_ticks && panel.x_label.is_none() { 6 } else { 32 };
        let y_area = if panel.hide_y_ticks && panel.y_label.is_none() { 6 } else { 48 };
        builder.x_label_area_size(x_area).y_label_area_size(y_area);
        if let Some(title) = &panel.title {
            builder.caption(title, (FAMILY, 14).into_font());
        }
    }
    let mut chart = builder.build_cartesian_2d(x0..x1, y0..y1)?;

    if text {
        let blank = |_: &f64| String::new();
        let tick = |y: &f64| {
            panel
                .y_ticks
                .iter()
                .find(|(at, _)| (at - y).abs() < 1e-6)
                .map(|(_, label)| label.clone())
                .unwrap_or_default()
        };

        let mut mesh = chart.configure_mesh();
        mesh.disable_mesh();
        if let Some(label) = &panel.x_label {
            mesh.x_desc(label.as_str());
        }
        if let Some(label) = &panel.y_label {
            mesh.y_desc(label.as_str());
        }
        if panel.hide_x_ticks {
            mesh.x_label_formatter(&blank);
        }
        if panel.hide_y_ticks {
            mesh.y_label_formatter(&blank);
        } else if !panel.y_ticks.is_empty() {
            // half-unit steps so integer positions always get a key point
            let labels = ((y1 - y0).ceil() as usize).saturating_mul(2) + 1;
            mesh.y_labels(labels).y_label_formatter(&tick);
        }
        mesh.draw()?;
    } else {
        chart.draw_series(std::iter::once(Rectangle::new([(x0, y0), (x1, y1)], BLACK.stroke_width(1))))?;
    }

    for element in &panel.elements {
        draw_element(&mut chart, element, (x0, x1), (y0, y1), text)?;
    }
    Ok(())
}

fn draw_element<DB: DrawingBackend>(
    chart: &mut Chart<'_, DB>,
    element: &Element,
    (x0, x1): (f64, f64),
    (y0, y1): (f64, f64),
    text: bool,
) -> Result<(), PlotError> {
    match element {
        Element::Line { points, colour, width, dashed: false } => {
            chart.draw_series(LineSeries::new(points.iter().copied(), colour.to_rgb().stroke_width(*width)))?;
        }
        Element::Line { points, colour, width, dashed: true } => {
            for (&a, &b) in points.iter().zip(points.iter().skip(1)) {
                segment(chart, a, b, *colour, *width, true)?;
            }
        }
        Element::Markers { points, colour, marker, size, width } => {
            let rgb = colour.to_rgb();
            let size = *size as i32;
            match marker {
                Marker::Point => {
                    chart.draw_series(points.iter().map(|&p| Circle::new(p, size, rgb.filled())))?;
                }
                Marker::Cross => {
                    chart.draw_series(points.iter().map(|&p| Cross::new(p, size, rgb.stroke_width(*width))))?;
                }
                Marker::VerticalBar => {
                    chart.draw_series(points.iter().map(|&p| {
                        EmptyElement::at(p) + PathElement::new(vec![(0, -size), (0, size)], rgb.stroke_width(*width))
                    }))?;
                }
            }
        }
        Element::Bars { edges, heights, colour } => {
            let fill = colour.to_rgb().mix(0.6).filled();
            chart.draw_series(
                edges
                    .iter()
                    .zip(edges.iter().skip(1))
                    .zip(heights)
                    .map(|((&l, &r), &h)| Rectangle::new([(l, 0.0), (r, h)], fill)),
            )?;
        }
        Element::Circle { centre: (cx, cy), radius, colour } => {
            let outline = (0..=CIRCLE_POINTS).map(|i| {
                let t = TAU * i as f64 / CIRCLE_POINTS as f64;
                (cx + radius * t.cos(), cy + radius * t.sin())
            });
            chart.draw_series(LineSeries::new(outline, colour.to_rgb()))?;
        }
        Element::VLine { x, colour, dashed } => {
            if (x0..=x1).contains(x) {
                segment(chart, (*x, y0), (*x, y1), *colour, 1, *dashed)?;
            }
        }
        Element::HLine { y, colour, dashed } => {
            if (y0..=y1).contains(y) {
                segment(chart, (x0, *y), (x1, *y), *colour, 1, *dashed)?;
            }
        }
        Element::VSpan { x0: from, x1: to, colour, alpha } => {
            let (from, to) = (from.min(*to).max(x0), from.max(*to).min(x1));
            if from < to {
                let fill = colour.to_rgb().mix(*alpha).filled();
                chart.draw_series(std::iter::once(Rectangle::new([(from, y0), (to, y1)], fill)))?;
            }
        }
        Element::Text { at, text: label } => {
            if text {
                chart.draw_series(std::iter::once(Text::new(label.clone(), *at, (FAMILY, 12).into_font())))?;
            }
        }
    }
    Ok(())
}

fn segment<DB: DrawingBackend>(
    chart: &mut Chart<'_, DB>,
    from: (f64, f64),
    to: (f64, f64),
    colour: Colour,
    width: u32,
    dashed: bool,
) -> Result<(), PlotError> {
    let style = colour.to_rgb().stroke_width(width);
    if dashed {
        chart.draw_series(dashes(from, to).map(|dash| PathElement::new(dash, style)))?;
    } else {
        chart.draw_series(std::iter::once(PathElement::new(vec![from, to], style)))?;
    }
    Ok(())
}

/// Every other piece of `from → to` cut into `2 · DASHES` pieces.
fn dashes((ax, ay): (f64, f64), (bx, by): (f64, f64)) -> impl Iterator<Item = Vec<(f64, f64)>> {
    let at = move |t: f64| (ax + (bx - ax) * t, ay + (by - ay) * t);
    let step = 1.0 / (2 * DASHES) as f64;
    (0..DASHES).map(move |i| {
        let start = (2 * i) as f64 * step;
        vec![at(start), at(start + step)]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plot::{Panel, Rect};
    use approx::assert_abs_diff_eq;

    #[test]
    fn dashes_cover_half_the_segment() {
        let pieces: Vec<_> = dashes((0.0, 0.0), (48.0, 0.0)).collect();
        assert_eq!(pieces.len(), DASHES);
        let first = &pieces[0];
        assert_abs_diff_eq!(first[0].0, 0.0);
        assert_abs_diff_eq!(first[1].0, 1.0, epsilon = 1e-12);
        let last = &pieces[DASHES - 1];
        assert_abs_diff_eq!(last[1].0, 47.0, epsilon = 1e-12);
    }

    #[test]
    fn renders_every_element_kind_to_svg() {
        let mut panel = Panel::new(Rect::FULL);
        panel.title = Some("all elements".into());
        panel.x_label = Some("x".into());
        panel.y_ticks = vec![(0.0, "zero".into()), (1.0, "one".into())];
        panel.push(Element::Line {
            points: vec![(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)],
            colour: Colour::BLACK,
            width: 2,
            dashed: true,
        });
        for marker in [Marker::Point, Marker::Cross, Marker::VerticalBar] {
            panel.push(Element::Markers {
                points: vec![(0.5, 0.5)],
                colour: Colour::GRAY,
                marker,
                size: 4,
                width: 1,
            });
        }
        panel.push(Element::Bars { edges: vec![0.0, 1.0, 2.0], heights: vec![0.3, 0.6], colour: Colour::YELLOW });
        panel.push(Element::Circle { centre: (1.0, 0.5), radius: 0.25, colour: Colour::BLACK });
        panel.push(Element::VLine { x: 1.5, colour: Colour::BLACK, dashed: true });
        panel.push(Element::HLine { y: 0.0, colour: Colour::BLACK, dashed: false });
        panel.push(Element::VSpan { x0: 0.2, x1: 0.4, colour: Colour::GRAY, alpha: 0.2 });
        panel.push(Element::Text { at: (1.0, 1.0), text: "TP".into() });

        let mut figure = Figure::new();
        figure.title = Some("render test".into());
        figure.add_panel(panel);

        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, figure.size).into_drawing_area();
            render(&figure, &root).unwrap();
            root.present().unwrap();
        }
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("<rect"));
    }
}
