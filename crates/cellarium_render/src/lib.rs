//! # Cellarium Render
//!
//! The rendering collaborator: converts grid snapshots into raster images
//! and exported animations. Owns no simulation state — it consumes
//! snapshots taken by the controller, or drives a private engine when
//! recording an animation offline.

/// Animation recording and GIF export
pub mod animation;
/// Error types for rendering and export
pub mod error;
/// Snapshot-to-raster conversion and PNG encoding
pub mod raster;

pub use animation::{AnimationExporter, AnimationInit, AnimationSpec};
pub use error::{RenderError, Result};
pub use image::{Rgb, RgbImage};
pub use raster::{encode_png, parse_hex, render_frame, Palette};
