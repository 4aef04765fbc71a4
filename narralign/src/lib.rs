//! narralign: narration-to-clip segmentation and timeline alignment.
//!
//! Binds a script's narration to an ordered set of video clips, measures the
//! synthesized speech, validates the resulting timeline, and chunks it into
//! caption cues. Every attempt persists a segment map and an alignment report
//! so a failed attempt can be diagnosed and retried.
//!
//! # Architecture
//!
//! The engine talks to the outside world through three traits:
//!
//! - [`traits::SpeechSynthesizer`]: renders one segment of narration to WAV
//! - [`traits::DurationProbe`]: measures audio and clip durations
//! - [`traits::ArtifactSink`]: stores the JSON artifacts
//!
//! # Quick Start
//!
//! ```ignore
//! use narralign::artifact::DirSink;
//! use narralign::assembly::{AssemblyInput, Engine, NarrationAudio};
//! use narralign::config::EngineConfig;
//! use narralign::discover::discover_clips;
//! use narralign::probe::MediaProbe;
//!
//! let clips = discover_clips("project/clips".as_ref())?;
//! let engine = Engine::new(EngineConfig::for_format(script.format));
//!
//! let assembly = engine.assemble(
//!     AssemblyInput {
//!         script: &script,
//!         clips: &clips,
//!         audio: NarrationAudio::Synthesize,
//!         work_dir: "project/audio".as_ref(),
//!     },
//!     &mut synthesizer,
//!     &MediaProbe::default(),
//!     &DirSink::new("project"),
//! )?;
//!
//! for cue in &assembly.cues {
//!     println!("{:.2} {:.2} {}", cue.start_sec, cue.end_sec, cue.text);
//! }
//! ```

pub mod allocate;
pub mod artifact;
pub mod assembly;
pub mod audio;
pub mod caption;
pub mod config;
pub mod discover;
pub mod error;
pub mod mode;
pub mod probe;
pub mod segment;
pub mod synth;
pub mod text;
pub mod timeline;
pub mod traits;
pub mod types;
pub mod validate;
