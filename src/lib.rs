#![forbid(unsafe_code)]

pub mod archive;
pub mod batch;
pub mod draw;
pub mod encode_ffmpeg;
pub mod foundation;
pub mod media;
pub mod model;
pub mod progress;
pub mod video;

pub use archive::zip_archive;
pub use batch::{NamedUpload, process_images};
pub use foundation::error::{FramemarkError, FramemarkResult};
pub use media::{VideoSourceInfo, probe_video};
pub use model::{AuxFile, Color, Model, ModelKind, ModelParams};
pub use progress::FrameCounter;
pub use video::{VideoOptions, process_video};
