//! Audio input for the pipeline: PCM buffers and the speech-synthesis seam.

/// PCM16 buffers and WAV I/O.
pub mod buffer;
/// Speech synthesis collaborator and silence fallback.
pub mod synth;
