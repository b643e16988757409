use plotters::style::RGBColor;
use serde::{Deserialize, Serialize};

/// RGB colour with channels in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Colour {
    /// Red.
    pub r: f64,
    /// Green.
    pub g: f64,
    /// Blue.
    pub b: f64,
}

impl Colour {
    /// `#000000`
    pub const BLACK: Colour = Colour::new(0.0, 0.0, 0.0);
    /// `#808080`
    pub const GRAY: Colour = Colour::new(0.5, 0.5, 0.5);
    /// `#ffff00`
    pub const YELLOW: Colour = Colour::new(1.0, 1.0, 0.0);

    /// Colour from channel intensities; values are clamped when rendered.
    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// 8-bit colour for the drawing backend.
    pub fn to_rgb(self) -> RGBColor {
        let channel = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        RGBColor(channel(self.r), channel(self.g), channel(self.b))
    }
}

impl From<(f64, f64, f64)> for Colour {
    fn from((r, g, b): (f64, f64, f64)) -> Self {
        Self::new(r, g, b)
    }
}

const UNIFIED: [Colour; 23] = [
    Colour::new(0.0, 0.0, 1.0), // blue
    Colour::new(0.0, 1.0, 0.0), // green
    Colour::new(1.0, 0.0, 0.0), // red
    Colour::new(1.0, 0.0, 1.0), // fuchsia
    Colour::new(0.0, 1.0, 1.0), // aqua
    Colour::new(0.5, 0.5, 0.5), // gray
    Colour::new(1.0, 1.0, 0.0), // yellow
    Colour::new(0.5, 0.5, 0.0),
    Colour::new(1.0, 0.5, 0.5),
    Colour::new(0.5, 1.0, 0.5),
    Colour::new(0.0, 0.0, 0.5), // navy
    Colour::new(0.0, 0.5, 0.0), // green
    Colour::new(0.5, 0.0, 0.0), // maroon
    Colour::new(0.0, 0.5, 0.5), // teal
    Colour::new(0.5, 0.0, 0.5), // purple
    Colour::new(0.5, 0.5, 0.0), // olive
    Colour::new(0.2, 0.5, 0.8),
    Colour::new(1.0, 0.1, 0.1),
    Colour::new(0.3, 0.3, 0.3),
    Colour::new(0.0, 0.0, 0.0), // black
    Colour::new(0.9, 0.2, 0.9),
    Colour::new(0.2, 0.9, 0.9),
    Colour::new(0.9, 0.9, 0.2),
];

/// Ordered, non-empty list of colours, indexed modulo its length.
///
/// Group `i` of any plot is drawn in `palette.get(i)`, so the same unit keeps
/// the same colour across plots that share a palette.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Colour>", into = "Vec<Colour>")]
pub struct Palette(Vec<Colour>);

impl Palette {
    /// Palette from explicit colours; `None` if `colours` is empty.
    pub fn new(colours: Vec<Colour>) -> Option<Self> {
        (!colours.is_empty()).then_some(Self(colours))
    }

    /// Every index maps to `colour`.
    pub fn uniform(colour: Colour) -> Self {
        Self(vec![colour])
    }

    /// Colour for index `i`, wrapping around.
    pub fn get(&self, i: usize) -> Colour {
        self.0.get(i % self.0.len()).copied().unwrap_or(Colour::BLACK)
    }

    /// Number of distinct entries before wrapping.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for Palette {
    /// The 23 unified colours shared by every plot.
    fn default() -> Self {
        Self(UNIFIED.to_vec())
    }
}

impl TryFrom<Vec<Colour>> for Palette {
    type Error = &'static str;

    fn try_from(colours: Vec<Colour>) -> Result<Self, Self::Error> {
        Palette::new(colours).ok_or("a palette needs at least one colour")
    }
}

impl From<Palette> for Vec<Colour> {
    fn from(palette: Palette) -> Self {
        palette.0
    }
}
