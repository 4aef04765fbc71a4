//! narralign CLI library - exposes the command modules for testing.

pub mod captions;
pub mod cli;
pub mod plan;
pub mod srt;
pub mod synth;
