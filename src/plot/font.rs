use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use plotters::style::{FontStyle, register_font};
use tracing::{debug, warn};

/// Family name every text element is drawn with.
pub(crate) const FAMILY: &str = "sans-serif";

/// Overrides the font file used for text.
pub const FONT_ENV: &str = "SPIKEPLOT_FONT";

const SYSTEM_FONTS: [&str; 8] = [
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

static REGISTERED: OnceLock<bool> = OnceLock::new();

/// Whether text can be drawn. The first call registers a font.
pub(crate) fn available() -> bool {
    *REGISTERED.get_or_init(register)
}

fn register() -> bool {
    let mut candidates = std::env::var_os(FONT_ENV)
        .map(PathBuf::from)
        .into_iter()
        .chain(SYSTEM_FONTS.iter().map(PathBuf::from));

    if candidates.any(|path| try_register(&path)) {
        return true;
    }

    warn!("no TrueType font found, set {FONT_ENV} to draw text; figures are rendered without text");
    false
}

fn try_register(path: &Path) -> bool {
    let Ok(bytes) = std::fs::read(path) else {
        return false;
    };
    // plotters keeps registered fonts for the rest of the process
    let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
    match register_font(FAMILY, FontStyle::Normal, bytes) {
        Ok(()) => {
            debug!(path = %path.display(), "registered font");
            true
        }
        Err(_) => {
            warn!(path = %path.display(), "not a usable font");
            false
        }
    }
}
