use std::time::Duration;

use image::RgbImage;

use crate::{
    draw::draw_outline,
    foundation::error::{FramemarkError, FramemarkResult},
};

/// RGB triple, one byte per channel.
pub type Color = [u8; 3];

/// An opaque uploaded file handle. The Custom model logs the name; the
/// payload is never parsed.
#[derive(Clone, Debug)]
pub struct AuxFile {
    pub name: String,
    pub data: Vec<u8>,
}

/// Construction parameters for a model. `color` overrides the variant's
/// default; the auxiliary files are only meaningful for [`ModelKind::Custom`].
#[derive(Clone, Debug, Default)]
pub struct ModelParams {
    pub color: Option<Color>,
    pub checkpoint_file: Option<AuxFile>,
    pub config_file: Option<AuxFile>,
}

/// The closed set of model variants. Each carries its own relative corner
/// constants and default color; there are no open-ended extension points.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModelKind {
    A,
    B,
    C,
    Custom,
}

impl ModelKind {
    /// Resolve a user-facing selection name. Unknown names are surfaced as
    /// [`FramemarkError::InvalidSelection`], never silently defaulted.
    pub fn from_selection(name: &str) -> FramemarkResult<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "model a" | "a" => Ok(Self::A),
            "model b" | "b" => Ok(Self::B),
            "model c" | "c" => Ok(Self::C),
            "custom" | "custom model" => Ok(Self::Custom),
            _ => Err(FramemarkError::InvalidSelection(name.to_string())),
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::A => "Model A",
            Self::B => "Model B",
            Self::C => "Model C",
            Self::Custom => "Custom",
        }
    }

    /// Rectangle corners as (top-left, bottom-right) fractions of
    /// (width, height). All offsets are strictly inside (0.0, 1.0), so the
    /// corner rectangle lies inside the image for any non-degenerate size.
    pub fn corner_fractions(self) -> ([f64; 2], [f64; 2]) {
        match self {
            Self::A => ([0.25, 0.25], [0.75, 0.75]),
            Self::B => ([0.10, 0.10], [0.90, 0.90]),
            Self::C => ([0.40, 0.40], [0.60, 0.60]),
            Self::Custom => ([0.30, 0.30], [0.70, 0.70]),
        }
    }

    pub fn default_color(self) -> Color {
        match self {
            Self::A => [0, 255, 0],
            Self::B => [255, 0, 0],
            Self::C => [0, 0, 255],
            Self::Custom => [255, 255, 255],
        }
    }
}

/// Simulated load time for the Custom model's auxiliary files.
const CUSTOM_SETUP_DELAY: Duration = Duration::from_millis(250);

/// A configured model instance. Owns its params for its lifetime and is
/// stateless across `execute` calls; create one per processing request.
#[derive(Debug)]
pub struct Model {
    kind: ModelKind,
    params: ModelParams,
}

impl Model {
    /// Registry entry point: selection name plus params to exactly one
    /// configured model of the matching variant.
    pub fn from_selection(name: &str, params: ModelParams) -> FramemarkResult<Self> {
        let kind = ModelKind::from_selection(name)?;
        Self::new(kind, params)
    }

    pub fn new(kind: ModelKind, params: ModelParams) -> FramemarkResult<Self> {
        let model = Self { kind, params };
        model.setup()?;
        Ok(model)
    }

    pub fn kind(&self) -> ModelKind {
        self.kind
    }

    pub fn color(&self) -> Color {
        self.params
            .color
            .unwrap_or_else(|| self.kind.default_color())
    }

    /// Runs once at construction. A log line for every variant; Custom also
    /// requires both auxiliary uploads and simulates their load time.
    fn setup(&self) -> FramemarkResult<()> {
        tracing::info!(model = self.kind.display_name(), "setting up model");

        if self.kind == ModelKind::Custom {
            let checkpoint = self
                .params
                .checkpoint_file
                .as_ref()
                .ok_or(FramemarkError::MissingAuxiliaryFile("checkpoint_file"))?;
            let config = self
                .params
                .config_file
                .as_ref()
                .ok_or(FramemarkError::MissingAuxiliaryFile("config_file"))?;

            tracing::info!(
                checkpoint = %checkpoint.name,
                config = %config.name,
                "loading custom model files"
            );
            std::thread::sleep(CUSTOM_SETUP_DELAY);
        }

        Ok(())
    }

    /// Apply the model to one frame: a 5-px rectangle outline in the
    /// configured color at the variant's relative corners. The output always
    /// has the input's dimensions.
    pub fn execute(&self, image: &RgbImage) -> RgbImage {
        let mut out = image.clone();
        let (w, h) = (f64::from(image.width()), f64::from(image.height()));
        let (tl, br) = self.kind.corner_fractions();

        // Corner pixels truncate width*fraction / height*fraction.
        let x0 = (w * tl[0]) as i32;
        let y0 = (h * tl[1]) as i32;
        let x1 = (w * br[0]) as i32;
        let y1 = (h * br[1]) as i32;

        draw_outline(&mut out, x0, y0, x1, y1, self.color());
        out
    }
}
