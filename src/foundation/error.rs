pub type FacecastResult<T> = Result<T, FacecastError>;

/// Pipeline stage a [`FacecastError`] is attributed to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    /// Speech synthesis or audio file handling.
    Audio,
    /// Streaming inference exchange.
    Inference,
    /// Curve loading and curve-to-control mapping.
    Mapping,
    /// Keyframing and frame rendering, inside or outside the host.
    Render,
    /// Final encode.
    Mux,
    /// Configuration and request validation.
    Setup,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Audio => "audio",
            Self::Inference => "inference",
            Self::Mapping => "mapping",
            Self::Render => "render",
            Self::Mux => "mux",
            Self::Setup => "setup",
        })
    }
}

#[derive(thiserror::Error, Debug)]
pub enum FacecastError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("stream error: {0}")]
    Stream(String),

    #[error("malformed frame: {0}")]
    MalformedFrame(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("empty curve: {0}")]
    EmptyCurve(String),

    #[error("no target mesh objects found: {0}")]
    NoTargets(String),

    #[error("no animatable targets: {0}")]
    NoAnimatableTargets(String),

    #[error("no mapped channels: {0}")]
    NoMappedChannels(String),

    #[error("executable not found: {0}")]
    ExecutableNotFound(String),

    #[error("render process failed: {0}")]
    RenderProcess(String),

    #[error("mux failed: {0}")]
    Mux(String),

    #[error("audio error: {0}")]
    Audio(String),

    #[error("cancelled: {0}")]
    Cancelled(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FacecastError {
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    pub fn stream(msg: impl Into<String>) -> Self {
        Self::Stream(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedFrame(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn empty_curve(msg: impl Into<String>) -> Self {
        Self::EmptyCurve(msg.into())
    }

    pub fn no_targets(msg: impl Into<String>) -> Self {
        Self::NoTargets(msg.into())
    }

    pub fn no_animatable_targets(msg: impl Into<String>) -> Self {
        Self::NoAnimatableTargets(msg.into())
    }

    pub fn no_mapped_channels(msg: impl Into<String>) -> Self {
        Self::NoMappedChannels(msg.into())
    }

    pub fn executable_not_found(msg: impl Into<String>) -> Self {
        Self::ExecutableNotFound(msg.into())
    }

    pub fn render_process(msg: impl Into<String>) -> Self {
        Self::RenderProcess(msg.into())
    }

    pub fn mux(msg: impl Into<String>) -> Self {
        Self::Mux(msg.into())
    }

    pub fn audio(msg: impl Into<String>) -> Self {
        Self::Audio(msg.into())
    }

    pub fn cancelled(msg: impl Into<String>) -> Self {
        Self::Cancelled(msg.into())
    }

    /// Stage this error terminates, for the single user-facing failure report.
    pub fn stage(&self) -> Stage {
        match self {
            Self::Connection(_) | Self::Stream(_) | Self::MalformedFrame(_) => Stage::Inference,
            Self::EmptyCurve(_)
            | Self::NoTargets(_)
            | Self::NoAnimatableTargets(_)
            | Self::NoMappedChannels(_) => Stage::Mapping,
            Self::RenderProcess(_) => Stage::Render,
            Self::Mux(_) => Stage::Mux,
            Self::Audio(_) => Stage::Audio,
            Self::Configuration(_)
            | Self::ExecutableNotFound(_)
            | Self::Cancelled(_)
            | Self::Other(_) => Stage::Setup,
        }
    }

    /// The error text without its kind prefix.
    pub fn message(&self) -> String {
        match self {
            Self::Connection(m)
            | Self::Stream(m)
            | Self::MalformedFrame(m)
            | Self::Configuration(m)
            | Self::EmptyCurve(m)
            | Self::NoTargets(m)
            | Self::NoAnimatableTargets(m)
            | Self::NoMappedChannels(m)
            | Self::ExecutableNotFound(m)
            | Self::RenderProcess(m)
            | Self::Mux(m)
            | Self::Audio(m)
            | Self::Cancelled(m) => m.clone(),
            Self::Other(e) => format!("{e:#}"),
        }
    }

    /// Return `true` for operator cancellation, which callers re-raise instead of reporting.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
