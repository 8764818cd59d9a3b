//! Render-host launcher: locate the host, build its command line, supervise the child.

/// Host command line and launch entry point.
pub mod host;
/// Executable lookup.
pub mod locate;
/// Child process supervision shared by the host launcher and the muxer.
pub mod supervise;
