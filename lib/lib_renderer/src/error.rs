use lib_atlas::PackError;
use thiserror::Error;

/// Failures while drawing a frame. These never interrupt the frame; the
/// renderer keeps the first one until it is read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("failed to allocate {size} bytes for {label}: {reason}")]
    BufferAllocation {
        label: &'static str,
        size: u64,
        reason: String,
    },

    #[error("{label} needs {size} bytes but the device allows at most {max}")]
    BufferTooLarge {
        label: &'static str,
        size: u64,
        max: u64,
    },

    #[error("no GPU resources for {0}; assets were never uploaded")]
    NotReady(&'static str),
}

/// Failures while declaring, packing and uploading assets. These must be
/// dealt with before the first frame.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error(transparent)]
    Pack(#[from] PackError),

    #[error("picture name \"{0}\" already taken")]
    DuplicatePicture(String),

    #[error("font name \"{0}\" already taken")]
    DuplicateFont(String),

    #[error("too many pictures (at most {max})")]
    TooManyPictures { max: usize },

    #[error("picture \"{name}\" is {width}x{height}, larger than a {max}x{max} atlas bin")]
    PictureTooLarge {
        name: String,
        width: u32,
        height: u32,
        max: i16,
    },

    #[error("font strip \"{name}\" is invalid: {reason}")]
    InvalidFont { name: String, reason: &'static str },

    #[error("while painting atlas bin {bin}: {reason}")]
    Paint { bin: usize, reason: String },

    #[error(transparent)]
    Render(#[from] RenderError),
}

/// First-error-wins slot for per-frame failures, cleared on read.
#[derive(Debug, Default)]
pub struct StickyError(Option<RenderError>);

impl StickyError {
    pub fn set(&mut self, err: RenderError) {
        log::error!("render error: {err}");

        if self.0.is_none() {
            self.0 = Some(err);
        }
    }

    pub fn is_set(&self) -> bool {
        self.0.is_some()
    }

    pub fn take(&mut self) -> Option<RenderError> {
        self.0.take()
    }
}
