use super::PlotError;
use super::palette::Colour;
use crate::statistics::{Extent, Statistic};

/// Fractional placement of a panel inside its figure, measured from the
/// top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Distance of the left edge from the figure's left edge.
    pub left: f64,
    /// Distance of the top edge from the figure's top edge.
    pub top: f64,
    /// Fraction of the figure width.
    pub width: f64,
    /// Fraction of the figure height.
    pub height: f64,
}

impl Rect {
    /// The whole figure.
    pub const FULL: Rect = Rect { left: 0.0, top: 0.0, width: 1.0, height: 1.0 };

    /// Cell `index` (1-based, row-major) of a `rows × cols` grid.
    pub fn subplot(rows: usize, cols: usize, index: usize) -> Option<Rect> {
        if rows == 0 || cols == 0 || index == 0 || index > rows * cols {
            return None;
        }
        let (row, col) = ((index - 1) / cols, (index - 1) % cols);
        let (width, height) = (1.0 / cols as f64, 1.0 / rows as f64);
        Some(Rect {
            left: col as f64 * width,
            top: row as f64 * height,
            width,
            height,
        })
    }
}

impl Default for Rect {
    fn default() -> Self {
        Rect::FULL
    }
}

/// Glyph drawn at each point of [`Element::Markers`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// Filled dot.
    Point,
    /// Diagonal cross.
    Cross,
    /// Vertical tick, as used in raster plots.
    VerticalBar,
}

/// Something drawn inside a panel, in data coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    /// Polyline through `points`.
    Line {
        /// Vertices in drawing order.
        points: Vec<(f64, f64)>,
        /// Stroke colour.
        colour: Colour,
        /// Stroke width in pixels.
        width: u32,
        /// Dashed instead of solid.
        dashed: bool,
    },
    /// One glyph per point.
    Markers {
        /// Glyph positions.
        points: Vec<(f64, f64)>,
        /// Glyph colour.
        colour: Colour,
        /// Glyph shape.
        marker: Marker,
        /// Glyph size in pixels.
        size: u32,
        /// Stroke width in pixels.
        width: u32,
    },
    /// Histogram bars between consecutive `edges`.
    Bars {
        /// Bin edges, one more than `heights`.
        edges: Vec<f64>,
        /// Bar height per bin.
        heights: Vec<f64>,
        /// Fill colour.
        colour: Colour,
    },
    /// Circle outline with a radius in data units.
    Circle {
        /// Centre of the circle.
        centre: (f64, f64),
        /// Radius in data units.
        radius: f64,
        /// Outline colour.
        colour: Colour,
    },
    /// Vertical line across the whole panel.
    VLine {
        /// Position on the x axis.
        x: f64,
        /// Stroke colour.
        colour: Colour,
        /// Dashed instead of solid.
        dashed: bool,
    },
    /// Horizontal line across the whole panel.
    HLine {
        /// Position on the y axis.
        y: f64,
        /// Stroke colour.
        colour: Colour,
        /// Dashed instead of solid.
        dashed: bool,
    },
    /// Translucent band between `x0` and `x1`.
    VSpan {
        /// Left edge of the band.
        x0: f64,
        /// Right edge of the band.
        x1: f64,
        /// Fill colour.
        colour: Colour,
        /// Opacity in `[0, 1]`.
        alpha: f64,
    },
    /// Text anchored at a data position.
    Text {
        /// Anchor of the text's top-left corner.
        at: (f64, f64),
        /// The text.
        text: String,
    },
}

impl Element {
    /// Solid line through `points`.
    pub fn line(points: Vec<(f64, f64)>, colour: Colour) -> Self {
        Element::Line { points, colour, width: 1, dashed: false }
    }

    /// Data range covered by the element, per axis.
    pub(crate) fn extent(&self) -> (Option<(f64, f64)>, Option<(f64, f64)>) {
        fn span(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
            let values: Vec<f64> = values.collect();
            Extent.compute(&values)
        }
        match self {
            Element::Line { points, .. } | Element::Markers { points, .. } => (
                span(points.iter().map(|p| p.0)),
                span(points.iter().map(|p| p.1)),
            ),
            Element::Bars { edges, heights, .. } => (
                span(edges.iter().copied()),
                span(heights.iter().copied().chain(std::iter::once(0.0))),
            ),
            Element::Circle { centre: (x, y), radius, .. } => (
                span([x - radius, x + radius].into_iter()),
                span([y - radius, y + radius].into_iter()),
            ),
            Element::VLine { x, .. } => (span(std::iter::once(*x)), None),
            Element::HLine { y, .. } => (None, span(std::iter::once(*y))),
            Element::VSpan { x0, x1, .. } => (span([*x0, *x1].into_iter()), None),
            Element::Text { at: (x, y), .. } => (span(std::iter::once(*x)), span(std::iter::once(*y))),
        }
    }
}

/// One set of axes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Panel {
    /// Placement inside the figure.
    pub rect: Rect,
    /// Caption above the axes.
    pub title: Option<String>,
    /// Label under the x axis.
    pub x_label: Option<String>,
    /// Label beside the y axis.
    pub y_label: Option<String>,
    /// Fixed x range; fitted to the elements when `None`.
    pub x_range: Option<(f64, f64)>,
    /// Fixed y range; fitted to the elements when `None`.
    pub y_range: Option<(f64, f64)>,
    /// Custom tick labels at the given y positions.
    pub y_ticks: Vec<(f64, String)>,
    /// Draw the x axis without tick labels.
    pub hide_x_ticks: bool,
    /// Draw the y axis without tick labels.
    pub hide_y_ticks: bool,
    /// Drawn in order, later elements on top.
    pub elements: Vec<Element>,
}

impl Panel {
    /// An empty panel at `rect`.
    pub fn new(rect: Rect) -> Self {
        Self { rect, ..Self::default() }
    }

    /// Add an element on top of the existing ones.
    pub fn push(&mut self, element: Element) {
        self.elements.push(element);
    }

    /// Ranges the panel is drawn with: fixed ranges where set, otherwise the
    /// extent of the elements with a 5 % margin.
    pub fn ranges(&self) -> ((f64, f64), (f64, f64)) {
        let (xs, ys) = self
            .elements
            .iter()
            .map(Element::extent)
            .fold((None, None), |(xs, ys), (x, y)| (Extent::union(xs, x), Extent::union(ys, y)));
        (
            usable(self.x_range.or_else(|| xs.map(with_margin))),
            usable(self.y_range.or_else(|| ys.map(with_margin))),
        )
    }
}

fn with_margin((lo, hi): (f64, f64)) -> (f64, f64) {
    let pad = (hi - lo) * 0.05;
    (lo - pad, hi + pad)
}

/// Replace empty, inverted or non-finite ranges by something drawable.
fn usable(range: Option<(f64, f64)>) -> (f64, f64) {
    match range {
        Some((lo, hi)) if lo.is_finite() && hi.is_finite() && hi > lo => (lo, hi),
        Some((lo, hi)) if lo.is_finite() && hi.is_finite() => {
            let (lo, hi) = (lo.min(hi), lo.max(hi));
            if hi > lo { (lo, hi) } else { (lo - 0.5, hi + 0.5) }
        }
        _ => (0.0, 1.0),
    }
}

/// A declarative figure: a canvas size, an optional title and the panels
/// laid out on it.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    /// Pixel size used when the figure is saved or shown.
    pub size: (u32, u32),
    /// Title above all panels.
    pub title: Option<String>,
    /// Panels in region order.
    pub panels: Vec<Panel>,
}

impl Default for Figure {
    fn default() -> Self {
        Self {
            size: (1024, 768),
            title: None,
            panels: Vec::new(),
        }
    }
}

impl Figure {
    /// An empty 1024x768 figure.
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove every panel and the title.
    pub fn clear(&mut self) {
        self.title = None;
        self.panels.clear();
    }

    /// Append a panel and return its region index.
    pub fn add_panel(&mut self, panel: Panel) -> usize {
        self.panels.push(panel);
        self.panels.len() - 1
    }

    /// Append an empty panel at cell `index` (1-based) of a `rows × cols` grid.
    pub fn add_subplot(&mut self, rows: usize, cols: usize, index: usize) -> Result<usize, PlotError> {
        let rect = Rect::subplot(rows, cols, index).ok_or_else(|| {
            PlotError::RenderTarget(format!("subplot {index} does not exist in a {rows}x{cols} grid"))
        })?;
        Ok(self.add_panel(Panel::new(rect)))
    }

    /// The panel at `region`, if it exists.
    pub fn panel_mut(&mut self, region: usize) -> Option<&mut Panel> {
        self.panels.get_mut(region)
    }

    pub(crate) fn region_mut(&mut self, region: usize) -> Result<&mut Panel, PlotError> {
        self.panels
            .get_mut(region)
            .ok_or_else(|| PlotError::RenderTarget(format!("region {region} does not exist")))
    }
}

/// Where a plot routine draws.
///
/// `New` allocates a fresh figure that is handed back in
/// [`Rendered::figure`](super::Rendered). `Canvas` draws onto a caller-owned
/// figure and `Regions` into existing panels of one.
#[derive(Debug, Default)]
pub enum CanvasTarget<'a> {
    /// A fresh figure.
    #[default]
    New,
    /// New panels on an existing figure.
    Canvas(&'a mut Figure),
    /// Existing panels of a figure, by region index.
    Regions(&'a mut Figure, Vec<usize>),
}

/// The figure a routine draws onto, owned or borrowed from the caller.
#[derive(Debug)]
pub(crate) enum Surface<'a> {
    Owned(Figure),
    Borrowed(&'a mut Figure),
}

impl Surface<'_> {
    pub(crate) fn figure(&mut self) -> &mut Figure {
        match self {
            Surface::Owned(figure) => figure,
            Surface::Borrowed(figure) => figure,
        }
    }

    pub(crate) fn into_owned(self) -> Option<Figure> {
        match self {
            Surface::Owned(figure) => Some(figure),
            Surface::Borrowed(_) => None,
        }
    }
}

impl<'a> CanvasTarget<'a> {
    /// Resolve into a surface and the caller's region list, if any.
    fn resolve(self) -> Result<(Surface<'a>, Option<Vec<usize>>), PlotError> {
        match self {
            CanvasTarget::New => Ok((Surface::Owned(Figure::new()), None)),
            CanvasTarget::Canvas(figure) => Ok((Surface::Borrowed(figure), None)),
            CanvasTarget::Regions(figure, regions) => {
                if let Some(&bad) = regions.iter().find(|&&r| r >= figure.panels.len()) {
                    return Err(PlotError::RenderTarget(format!(
                        "region {bad} does not exist, the figure has {} panels",
                        figure.panels.len()
                    )));
                }
                Ok((Surface::Borrowed(figure), Some(regions)))
            }
        }
    }

    /// A whole figure, cleared, for plots that lay out their own grid.
    pub(crate) fn canvas(self) -> Result<Surface<'a>, PlotError> {
        match self.resolve()? {
            (_, Some(_)) => Err(PlotError::RenderTarget(
                "this plot lays out its own panels and needs a whole canvas".into(),
            )),
            (mut surface, None) => {
                surface.figure().clear();
                Ok(surface)
            }
        }
    }

    /// A single panel: a full-size panel on a new or given canvas, or the one
    /// region the caller passed.
    pub(crate) fn region(self) -> Result<(Surface<'a>, usize), PlotError> {
        match self.resolve()? {
            (mut surface, None) => {
                let region = surface.figure().add_panel(Panel::new(Rect::FULL));
                Ok((surface, region))
            }
            (surface, Some(regions)) => match regions.as_slice() {
                [region] => Ok((surface, *region)),
                _ => Err(PlotError::RenderTarget(format!(
                    "this plot draws into exactly one region, got {}",
                    regions.len()
                ))),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn subplot_cells_are_row_major() {
        let rect = Rect::subplot(2, 3, 5).unwrap();
        assert_abs_diff_eq!(rect.left, 1.0 / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(rect.top, 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(rect.width, 1.0 / 3.0, epsilon = 1e-12);
        assert!(Rect::subplot(2, 3, 0).is_none());
        assert!(Rect::subplot(2, 3, 7).is_none());
        assert!(Rect::subplot(0, 3, 1).is_none());
    }

    #[test]
    fn out_of_range_subplot_is_a_target_error() {
        let mut figure = Figure::new();
        assert_eq!(figure.add_subplot(1, 1, 1).unwrap(), 0);
        assert!(matches!(figure.add_subplot(1, 1, 2), Err(PlotError::RenderTarget(_))));
    }

    #[test]
    fn ranges_fit_elements_with_margin() {
        let mut panel = Panel::new(Rect::FULL);
        panel.push(Element::line(vec![(0.0, -1.0), (10.0, 1.0)], Colour::BLACK));
        panel.push(Element::VLine { x: 20.0, colour: Colour::BLACK, dashed: false });
        let ((x0, x1), (y0, y1)) = panel.ranges();
        assert_abs_diff_eq!(x0, -1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(x1, 21.0, epsilon = 1e-12);
        assert_abs_diff_eq!(y0, -1.1, epsilon = 1e-12);
        assert_abs_diff_eq!(y1, 1.1, epsilon = 1e-12);
    }

    #[test]
    fn degenerate_ranges_are_padded() {
        let mut panel = Panel::new(Rect::FULL);
        let ((x0, x1), (y0, y1)) = panel.ranges();
        assert_abs_diff_eq!(x0, 0.0);
        assert_abs_diff_eq!(x1, 1.0);
        assert_abs_diff_eq!(y0, 0.0);
        assert_abs_diff_eq!(y1, 1.0);
        panel.x_range = Some((3.0, 3.0));
        let (x0, x1) = panel.ranges().0;
        assert_abs_diff_eq!(x0, 2.5);
        assert_abs_diff_eq!(x1, 3.5);
    }

    #[test]
    fn regions_must_exist() {
        let mut figure = Figure::new();
        figure.add_panel(Panel::default());
        let err = CanvasTarget::Regions(&mut figure, vec![0, 3]).region().unwrap_err();
        assert!(matches!(err, PlotError::RenderTarget(_)));
    }

    #[test]
    fn canvas_plots_reject_regions() {
        let mut figure = Figure::new();
        figure.add_panel(Panel::default());
        let err = CanvasTarget::Regions(&mut figure, vec![0]).canvas().unwrap_err();
        assert!(matches!(err, PlotError::RenderTarget(_)));
    }

    #[test]
    fn region_targets() {
        let (surface, region) = CanvasTarget::New.region().unwrap();
        assert_eq!(region, 0);
        assert_eq!(surface.into_owned().unwrap().panels.len(), 1);

        let mut figure = Figure::new();
        figure.add_panel(Panel::default());
        figure.add_panel(Panel::default());
        let (surface, region) = CanvasTarget::Regions(&mut figure, vec![1]).region().unwrap();
        assert_eq!(region, 1);
        assert!(surface.into_owned().is_none());
        assert!(CanvasTarget::Regions(&mut figure, vec![0, 1]).region().is_err());
    }

    #[test]
    fn canvas_target_clears_the_figure() {
        let mut figure = Figure::new();
        figure.title = Some("old".into());
        figure.add_panel(Panel::default());
        let mut surface = CanvasTarget::Canvas(&mut figure).canvas().unwrap();
        assert!(surface.figure().panels.is_empty());
        assert!(surface.figure().title.is_none());
    }
}
