use crate::foundation::error::{FacecastError, FacecastResult};

/// Absolute 0-based frame index on the render host timeline.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Longest frame window a curve may ask the host to render (about six days at 30 fps).
pub const MAX_TIMELINE_FRAMES: u64 = 1 << 24;

/// Inclusive frame window `[start, end]` handed to the render host.
///
/// Render hosts render both boundary frames, so unlike a half-open range `end` is a real frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameRange {
    /// First rendered frame.
    pub start: FrameIndex,
    /// Last rendered frame (inclusive).
    pub end: FrameIndex,
}

impl FrameRange {
    /// Create a validated range with `start <= end`.
    pub fn new(start: FrameIndex, end: FrameIndex) -> FacecastResult<Self> {
        if start.0 > end.0 {
            return Err(FacecastError::configuration(
                "FrameRange start must be <= end",
            ));
        }
        Ok(Self { start, end })
    }

    /// Frame window covering a curve whose last row sits at `last_time_code` seconds.
    ///
    /// `end = ceil(last_time_code * fps) + 1`; negative or non-finite time codes count as zero.
    /// A window longer than [`MAX_TIMELINE_FRAMES`] is [`FacecastError::MalformedFrame`].
    pub fn for_curve(last_time_code: f64, fps: Fps) -> FacecastResult<Self> {
        let last = if last_time_code.is_finite() {
            last_time_code.max(0.0)
        } else {
            0.0
        };
        let last_frame = (last * fps.as_f64()).ceil();
        if last_frame >= MAX_TIMELINE_FRAMES as f64 {
            return Err(FacecastError::malformed(format!(
                "time code {last_time_code}s at {fps} fps exceeds the {MAX_TIMELINE_FRAMES} frame timeline"
            )));
        }
        Ok(Self {
            start: FrameIndex(0),
            end: FrameIndex((last_frame as u64).saturating_add(1)),
        })
    }

    /// Number of frames the host renders for this window.
    pub fn len_frames(self) -> u64 {
        self.end.0.saturating_sub(self.start.0).saturating_add(1)
    }

    /// Return `true` when `f` is inside `[start, end]`.
    pub fn contains(self, f: FrameIndex) -> bool {
        self.start.0 <= f.0 && f.0 <= self.end.0
    }

    /// Clamp a signed frame number into this window.
    pub fn clamp(self, frame: i64) -> FrameIndex {
        if frame <= self.start.0 as i64 {
            return self.start;
        }
        FrameIndex((frame as u64).min(self.end.0))
    }

    /// Iterate every frame index in the window, in order.
    pub fn iter(self) -> impl Iterator<Item = FrameIndex> {
        (self.start.0..=self.end.0).map(FrameIndex)
    }
}

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32, // must be > 0
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> FacecastResult<Self> {
        if den == 0 {
            return Err(FacecastError::configuration("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(FacecastError::configuration("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Whole-number frame rate, the form render hosts and CLIs pass around.
    pub fn whole(fps: u32) -> FacecastResult<Self> {
        Self::new(fps, 1)
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Duration of one frame in seconds.
    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }

    /// Nearest frame number for a time code, before any clamping.
    ///
    /// Halfway cases round to the even frame.
    pub fn secs_to_frame_round(self, secs: f64) -> i64 {
        if !secs.is_finite() {
            return 0;
        }
        (secs * self.as_f64()).round_ties_even() as i64
    }

    /// Render an encoder-friendly rate string (`30` or `30000/1001`).
    pub fn to_arg(self) -> String {
        if self.den == 1 {
            self.num.to_string()
        } else {
            format!("{}/{}", self.num, self.den)
        }
    }
}

impl std::fmt::Display for Fps {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_arg())
    }
}

impl std::str::FromStr for Fps {
    type Err = FacecastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let parse = |v: &str| {
            v.trim()
                .parse::<u32>()
                .map_err(|e| FacecastError::configuration(format!("invalid fps '{s}': {e}")))
        };
        match s.split_once('/') {
            Some((num, den)) => Self::new(parse(num)?, parse(den)?),
            None => Self::new(parse(s)?, 1),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
