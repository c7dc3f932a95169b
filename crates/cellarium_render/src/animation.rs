//! Animation recording and GIF export.
//!
//! Recording runs its own private engine so an export never contends with
//! the live simulation's lock: the grid is initialized from a preset or at
//! random, then each frame is captured before stepping.

use crate::error::{RenderError, Result};
use crate::raster::{render_frame, Palette};
use cellarium_core::LifeEngine;
use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, DynamicImage, Frame, RgbImage};
use std::fs;
use std::path::{Path, PathBuf};

const MAX_FRAMES: u32 = 300;

/// How a recording initializes its grid.
#[derive(Debug, Clone)]
pub enum AnimationInit {
    Preset {
        name: String,
        x_offset: Option<i32>,
        y_offset: Option<i32>,
    },
    Random {
        density: f64,
    },
}

#[derive(Debug, Clone)]
pub struct AnimationSpec {
    pub width: u16,
    pub height: u16,
    pub cell_size: u16,
    pub frames: u32,
    pub fps: u16,
    pub init: AnimationInit,
    pub seed: Option<u64>,
}

/// Steps a private engine and captures one raster frame per generation,
/// starting with the initial state. Frame count is clamped to [1, 300].
pub fn record_frames(spec: &AnimationSpec, palette: &Palette) -> Result<Vec<RgbImage>> {
    let mut engine = LifeEngine::new(spec.width, spec.height, spec.seed);
    match &spec.init {
        AnimationInit::Preset {
            name,
            x_offset,
            y_offset,
        } => {
            if !engine.load_pattern(name, *x_offset, *y_offset) {
                return Err(RenderError::unknown_pattern(name));
            }
        }
        AnimationInit::Random { density } => engine.randomize(*density),
    }

    let count = spec.frames.clamp(1, MAX_FRAMES);
    let mut frames = Vec::with_capacity(count as usize);
    for _ in 0..count {
        frames.push(render_frame(&engine.snapshot(), spec.cell_size, palette));
        engine.step();
    }
    Ok(frames)
}

/// Encodes frames as an infinitely looping GIF with a per-frame delay of
/// `1000 / fps` milliseconds.
pub fn encode_gif(frames: &[RgbImage], fps: u16) -> Result<Vec<u8>> {
    let fps = fps.clamp(1, 60) as u32;
    let delay = Delay::from_numer_denom_ms(1000 / fps, 1);

    let mut buf = Vec::new();
    {
        let mut encoder = GifEncoder::new(&mut buf);
        encoder.set_repeat(Repeat::Infinite)?;
        for frame in frames {
            let rgba = DynamicImage::ImageRgb8(frame.clone()).into_rgba8();
            encoder.encode_frame(Frame::from_parts(rgba, 0, 0, delay))?;
        }
    }
    Ok(buf)
}

/// Writes exported animations under an output directory with
/// `prefix_NNNNN.gif` naming.
pub struct AnimationExporter {
    output_dir: PathBuf,
    prefix: String,
}

impl AnimationExporter {
    pub fn new<P: Into<PathBuf>, S: Into<String>>(output_dir: P, prefix: S) -> Self {
        Self {
            output_dir: output_dir.into(),
            prefix: prefix.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Records, encodes and writes one animation; returns the artifact's
    /// filename within the output directory.
    pub fn export(&self, spec: &AnimationSpec, palette: &Palette) -> Result<String> {
        fs::create_dir_all(&self.output_dir)?;
        let frames = record_frames(spec, palette)?;
        let bytes = encode_gif(&frames, spec.fps)?;

        let counter = fs::read_dir(&self.output_dir)?.count();
        let filename = format!("{}_{:05}.gif", self.prefix, counter);
        let path = self.output_dir.join(&filename);
        fs::write(&path, bytes)?;

        tracing::info!(
            path = %path.display(),
            frames = frames.len(),
            "animation exported"
        );
        Ok(filename)
    }

    /// Records an animation and dumps it as a numbered PNG sequence in its
    /// own subdirectory, with a small metadata file describing the run.
    /// Returns the sequence directory's name within the output directory.
    pub fn export_png_sequence(&self, spec: &AnimationSpec, palette: &Palette) -> Result<String> {
        fs::create_dir_all(&self.output_dir)?;
        let frames = record_frames(spec, palette)?;

        let counter = fs::read_dir(&self.output_dir)?.count();
        let dirname = format!("{}_{:05}", self.prefix, counter);
        let sequence_dir = self.output_dir.join(&dirname);
        fs::create_dir_all(&sequence_dir)?;

        for (i, frame) in frames.iter().enumerate() {
            let bytes = crate::raster::encode_png(frame)?;
            fs::write(sequence_dir.join(format!("frame_{:05}.png", i)), bytes)?;
        }

        let (frame_w, frame_h) = frames[0].dimensions();
        let metadata = serde_json::json!({
            "frames": frames.len(),
            "fps": spec.fps,
            "width": frame_w,
            "height": frame_h,
        });
        fs::write(
            sequence_dir.join("metadata.json"),
            serde_json::to_vec_pretty(&metadata)?,
        )?;

        tracing::info!(
            path = %sequence_dir.display(),
            frames = frames.len(),
            "frame sequence exported"
        );
        Ok(dirname)
    }

    /// Maps an artifact filename back to its path, rejecting anything that
    /// could escape the output directory.
    pub fn resolve(&self, filename: &str) -> Option<PathBuf> {
        if filename.is_empty()
            || filename.contains("..")
            || filename.contains('/')
            || filename.contains('\\')
        {
            return None;
        }
        Some(self.output_dir.join(filename))
    }
}
