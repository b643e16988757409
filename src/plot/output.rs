use std::error::Error as StdError;
use std::fmt;
use std::path::{Path, PathBuf};

use plotters::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::PlotError;
use super::figure::{Figure, Surface};
use super::render::render;

/// Image formats a figure can be saved in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// `png`
    Png,
    /// `bmp`
    Bmp,
    /// `jpg` or `jpeg`
    Jpeg,
    /// `svg`, written as vector graphics.
    Svg,
}

impl ImageFormat {
    /// Format for a file extension, case-insensitive.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(ImageFormat::Png),
            "bmp" => Some(ImageFormat::Bmp),
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "svg" => Some(ImageFormat::Svg),
            _ => None,
        }
    }
}

/// Where and how a figure is saved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveOptions {
    /// Stem of every written file.
    pub file_name: String,
    /// Directory the files are written to; must exist.
    pub directory: PathBuf,
    /// Appended to `file_name` before the extension.
    pub description: String,
    /// One file is written per entry, e.g. `["png", "svg"]`.
    pub formats: Vec<String>,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            file_name: "figure".into(),
            directory: PathBuf::from("."),
            description: String::new(),
            formats: vec!["png".into()],
        }
    }
}

impl SaveOptions {
    /// PNG output named `file_name` in the working directory.
    pub fn new(file_name: impl Into<String>) -> Self {
        Self { file_name: file_name.into(), ..Self::default() }
    }

    /// `directory/file_name + description + "." + format`
    pub fn path_for(&self, format: &str) -> PathBuf {
        self.directory
            .join(format!("{}{}.{}", self.file_name, self.description, format))
    }
}

/// Why a format could not be written.
#[derive(Debug)]
pub enum SaveErrorKind {
    /// The extension names no [`ImageFormat`].
    UnsupportedFormat,
    /// The file could not be created or written.
    Io(std::io::Error),
    /// The drawing backend failed.
    Render(String),
}

/// A format that could not be written.
#[derive(Debug)]
pub struct SaveError {
    /// The requested format, as given.
    pub format: String,
    /// The file that was to be written.
    pub path: PathBuf,
    /// What went wrong.
    pub kind: SaveErrorKind,
}

impl fmt::Display for SaveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = self.path.display();
        match &self.kind {
            SaveErrorKind::UnsupportedFormat => write!(f, "{path}: unsupported image format '{}'", self.format),
            SaveErrorKind::Io(e) => write!(f, "{path}: {e}"),
            SaveErrorKind::Render(msg) => write!(f, "{path}: rendering failed: {msg}"),
        }
    }
}

impl StdError for SaveError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match &self.kind {
            SaveErrorKind::Io(e) => Some(e),
            SaveErrorKind::UnsupportedFormat | SaveErrorKind::Render(_) => None,
        }
    }
}

/// Outcome of [`save`]: the files written and the formats that failed.
#[derive(Debug, Default)]
pub struct SaveReport {
    /// Files written, in request order.
    pub written: Vec<PathBuf>,
    /// One entry per format that failed.
    pub failures: Vec<SaveError>,
}

impl SaveReport {
    /// Every requested format was written.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Write `figure` once per requested format.
///
/// A failing format never prevents the others from being attempted.
pub fn save(figure: &Figure, options: &SaveOptions) -> SaveReport {
    let mut report = SaveReport::default();
    for format in &options.formats {
        let path = options.path_for(format);
        let written = match ImageFormat::from_extension(format) {
            None => Err(SaveErrorKind::UnsupportedFormat),
            Some(kind) => write(figure, &path, kind),
        };
        match written {
            Ok(()) => {
                info!(path = %path.display(), "figure written");
                report.written.push(path);
            }
            Err(kind) => {
                let error = SaveError { format: format.clone(), path, kind };
                warn!(%format, %error, "failed to save figure");
                report.failures.push(error);
            }
        }
    }
    report
}

fn write(figure: &Figure, path: &Path, format: ImageFormat) -> Result<(), SaveErrorKind> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        if !dir.is_dir() {
            return Err(SaveErrorKind::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("directory {} does not exist", dir.display()),
            )));
        }
    }

    match format {
        ImageFormat::Svg => {
            let mut svg = String::new();
            {
                let root = SVGBackend::with_string(&mut svg, figure.size).into_drawing_area();
                render(figure, &root).map_err(|e| SaveErrorKind::Render(e.to_string()))?;
                root.present().map_err(|e| SaveErrorKind::Render(e.to_string()))?;
            }
            std::fs::write(path, svg).map_err(SaveErrorKind::Io)
        }
        ImageFormat::Png | ImageFormat::Bmp | ImageFormat::Jpeg => {
            let root = BitMapBackend::new(path, figure.size).into_drawing_area();
            render(figure, &root).map_err(|e| SaveErrorKind::Render(e.to_string()))?;
            root.present().map_err(|e| SaveErrorKind::Render(e.to_string()))
        }
    }
}

/// Display `figure` without a windowing system: render it to a PNG in the
/// system temp directory and return the path.
///
/// Each process owns one such file, `spikeplot-<pid>.png`, and every call
/// overwrites it, so showing never accumulates files.
pub fn show(figure: &Figure) -> Result<PathBuf, PlotError> {
    let path = std::env::temp_dir().join(format!("spikeplot-{}.png", std::process::id()));
    {
        let root = BitMapBackend::new(&path, figure.size).into_drawing_area();
        render(figure, &root)?;
        root.present()?;
    }
    info!(path = %path.display(), "figure shown");
    Ok(path)
}

/// What a plot routine does with its figure once drawn.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Output {
    /// Save the figure with these options.
    pub save: Option<SaveOptions>,
    /// Display the figure with [`show`].
    pub show: bool,
}

/// Result of a plot routine.
#[derive(Debug, Default)]
pub struct Rendered {
    /// The figure, when the routine allocated it (`CanvasTarget::New`).
    pub figure: Option<Figure>,
    /// Report of the save, when one was requested.
    pub saved: Option<SaveReport>,
    /// File the figure was shown from, when showing was requested.
    pub shown: Option<PathBuf>,
}

impl Output {
    pub(crate) fn finish(&self, mut surface: Surface<'_>) -> Result<Rendered, PlotError> {
        let figure = surface.figure();
        let saved = self.save.as_ref().map(|options| save(figure, options));
        let shown = if self.show { Some(show(figure)?) } else { None };
        Ok(Rendered { figure: surface.into_owned(), saved, shown })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plot::{Colour, Element, Panel, Rect};

    fn figure() -> Figure {
        let mut panel = Panel::new(Rect::FULL);
        panel.push(Element::line(vec![(0.0, 0.0), (1.0, 2.0)], Colour::BLACK));
        let mut figure = Figure { size: (160, 120), ..Figure::default() };
        figure.add_panel(panel);
        figure
    }

    #[test]
    fn path_joins_name_description_and_format() {
        let options = SaveOptions {
            file_name: "units".into(),
            directory: PathBuf::from("/tmp/plots"),
            description: "_pca".into(),
            formats: vec![],
        };
        assert_eq!(options.path_for("png"), PathBuf::from("/tmp/plots/units_pca.png"));
    }

    #[test]
    fn format_names() {
        assert_eq!(ImageFormat::from_extension("PNG"), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::from_extension("jpeg"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_extension("pdf"), None);
    }

    #[test]
    fn failing_formats_do_not_stop_the_others() {
        let dir = tempfile::tempdir().unwrap();
        let options = SaveOptions {
            file_name: "fig".into(),
            directory: dir.path().to_path_buf(),
            description: String::new(),
            formats: vec!["pdf".into(), "svg".into(), "png".into()],
        };
        let report = save(&figure(), &options);

        assert_eq!(report.written, vec![dir.path().join("fig.svg"), dir.path().join("fig.png")]);
        assert!(dir.path().join("fig.svg").is_file());
        assert!(dir.path().join("fig.png").is_file());
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].format, "pdf");
        assert!(matches!(report.failures[0].kind, SaveErrorKind::UnsupportedFormat));
        assert!(!report.is_complete());
    }

    #[test]
    fn missing_directory_is_an_io_failure() {
        let dir = tempfile::tempdir().unwrap();
        let options = SaveOptions {
            directory: dir.path().join("missing"),
            formats: vec!["svg".into()],
            ..SaveOptions::default()
        };
        let report = save(&figure(), &options);
        assert!(report.written.is_empty());
        assert!(matches!(report.failures[0].kind, SaveErrorKind::Io(_)));
    }

    #[test]
    fn show_overwrites_one_png_per_process() {
        let first = show(&figure()).unwrap();
        let second = show(&figure()).unwrap();
        assert_eq!(first, second);
        assert!(second.is_file());
        std::fs::remove_file(second).unwrap();
    }

    #[test]
    fn default_output_does_nothing() {
        let rendered = Output::default().finish(Surface::Owned(figure())).unwrap();
        assert!(rendered.figure.is_some());
        assert!(rendered.saved.is_none());
        assert!(rendered.shown.is_none());
    }
}
