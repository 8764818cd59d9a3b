use crate::foundation::core::{Fps, FrameRange};
use crate::foundation::error::{FacecastError, FacecastResult};

/// Name of the time column in the curve artifact.
pub const TIME_CODE_COLUMN: &str = "timeCode";

/// Namespace prefix the inference service puts in front of blendshape names.
pub const DEFAULT_CHANNEL_PREFIX: &str = "blendShapes.";

/// One row of the curve: a time code and one weight per curve channel.
///
/// `weights[i]` belongs to `AnimationCurve::channels()[i]`. A `None` weight is a cell that was
/// missing or not a number.
#[derive(Clone, Debug, PartialEq)]
pub struct AnimationFrame {
    /// Seconds from the start of the audio.
    pub time_code: f64,
    /// Channel-aligned weights.
    pub weights: Vec<Option<f64>>,
}

impl AnimationFrame {
    /// Weight of channel `idx`, with missing or unparseable cells read as `0.0`.
    pub fn weight_or_zero(&self, idx: usize) -> f64 {
        self.weights.get(idx).copied().flatten().unwrap_or(0.0)
    }
}

/// Time-coded blendshape curve with a fixed channel set.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnimationCurve {
    channels: Vec<String>,
    frames: Vec<AnimationFrame>,
}

impl AnimationCurve {
    /// Create an empty curve over `channels`.
    pub fn new(channels: Vec<String>) -> FacecastResult<Self> {
        let mut seen = std::collections::HashSet::new();
        for c in &channels {
            if c.is_empty() || c == TIME_CODE_COLUMN {
                return Err(FacecastError::malformed(format!(
                    "invalid curve channel name '{c}'"
                )));
            }
            if !seen.insert(c.as_str()) {
                return Err(FacecastError::malformed(format!(
                    "duplicate curve channel '{c}'"
                )));
            }
        }
        Ok(Self {
            channels,
            frames: Vec::new(),
        })
    }

    /// Append a row; its weights must align with the channel set.
    pub fn push(&mut self, frame: AnimationFrame) -> FacecastResult<()> {
        if frame.weights.len() != self.channels.len() {
            return Err(FacecastError::malformed(format!(
                "frame at {}s has {} weights, curve has {} channels",
                frame.time_code,
                frame.weights.len(),
                self.channels.len()
            )));
        }
        self.frames.push(frame);
        Ok(())
    }

    pub fn channels(&self) -> &[String] {
        &self.channels
    }

    pub fn frames(&self) -> &[AnimationFrame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Time code of the last row, if any.
    pub fn last_time_code(&self) -> Option<f64> {
        self.frames.last().map(|f| f.time_code)
    }

    /// Reject curves the driver cannot animate: no rows or no weight columns.
    pub fn ensure_animatable(&self) -> FacecastResult<()> {
        if self.frames.is_empty() {
            return Err(FacecastError::empty_curve("curve has no rows"));
        }
        if self.channels.is_empty() {
            return Err(FacecastError::empty_curve(format!(
                "curve has no columns besides '{TIME_CODE_COLUMN}'"
            )));
        }
        Ok(())
    }

    /// Frame window covering this curve at `fps`.
    pub fn frame_range(&self, fps: Fps) -> FacecastResult<FrameRange> {
        let last = self
            .last_time_code()
            .ok_or_else(|| FacecastError::empty_curve("curve has no rows"))?;
        FrameRange::for_curve(last, fps)
    }
}

/// Strip the namespace prefix from a curve channel name.
///
/// Names without the prefix are returned unchanged.
pub fn local_control_name<'a>(channel: &'a str, prefix: &str) -> &'a str {
    channel.strip_prefix(prefix).unwrap_or(channel)
}

#[cfg(test)]
#[path = "../../tests/unit/curve/model.rs"]
mod tests;
