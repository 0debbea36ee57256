//! Signature capture engine.
//!
//! - [`mapping`]: client-to-backing coordinate mapping
//! - [`surface`]: the raster buffer strokes are drawn onto
//! - [`pad`]: the drawing state machine, resize handling, and export
//! - [`record`]: persisted signature records and attachment to assignments

pub mod mapping;
pub mod pad;
pub mod record;
pub mod surface;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use self::mapping::PixelSize;
use self::pad::{PadConfig, PadEvent, SignaturePad};
use crate::error::CoreError;

/// A lossless PNG export of a signature pad.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureImage {
    pub png: Vec<u8>,
    pub size: PixelSize,
}

impl SignatureImage {
    /// `data:image/png;base64,...` form used for storage and display.
    pub fn to_data_url(&self) -> String {
        format!("data:image/png;base64,{}", STANDARD.encode(&self.png))
    }
}

/// Longest input session accepted for replay.
pub const MAX_SCRIPT_EVENTS: usize = 20_000;

/// A recorded input session to be replayed through a fresh pad.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureScript {
    #[serde(default)]
    pub pad: PadConfig,
    /// Width of the hosting container in logical pixels.
    #[serde(default = "default_container_width")]
    pub container_width: f64,
    pub events: Vec<PadEvent>,
}

fn default_container_width() -> f64 {
    pad::DEFAULT_WIDTH
}

impl CaptureScript {
    /// Replay the events and export the result.
    pub fn render(&self) -> Result<SignatureImage, CoreError> {
        if self.events.len() > MAX_SCRIPT_EVENTS {
            return Err(CoreError::Validation(format!(
                "Signature input has {} events, at most {MAX_SCRIPT_EVENTS} are accepted",
                self.events.len()
            )));
        }
        let mut pad = SignaturePad::new(self.pad, self.container_width);
        pad.replay(self.events.iter().copied());
        pad.export_image()
    }
}
