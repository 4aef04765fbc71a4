//! Captions subcommand - regenerate captions from a persisted segment map.

use crate::cli::CaptionArgs;
use crate::plan::CAPTIONS_FILE;
use crate::srt;
use eyre::{Context, Result};
use narralign::artifact::read_segment_map;
use narralign::caption::CaptionChunker;
use narralign::config::CaptionConfig;
use std::path::PathBuf;

/// CLI arguments for caption replay.
#[derive(clap::Args, Debug)]
pub struct Args {
    /// Path to clip_segment_map.json
    pub map: PathBuf,

    /// Output SRT path (default: captions.srt next to the map)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub captions: CaptionArgs,
}

/// Resolved configuration for caption replay.
#[derive(Debug)]
pub struct Config {
    pub map: PathBuf,
    pub output: Option<PathBuf>,
    pub preview: bool,
    pub caption_config: CaptionConfig,
}

impl TryFrom<Args> for Config {
    type Error = eyre::Error;

    fn try_from(args: Args) -> Result<Self> {
        Ok(Self {
            map: args.map,
            output: args.output,
            preview: args.captions.preview,
            caption_config: args.captions.try_into()?,
        })
    }
}

pub fn execute(config: Config) -> Result<()> {
    let output = config
        .output
        .unwrap_or_else(|| config.map.with_file_name(CAPTIONS_FILE));

    tracing::info!(
        map = ?config.map.display(),
        output = ?output.display(),
        "regenerating captions"
    );

    let map = read_segment_map(&config.map)
        .wrap_err_with(|| format!("failed to load segment map: {:?}", config.map.display()))?;

    let cues = CaptionChunker::new(config.caption_config).chunk(&map.segments);
    let subtitles = srt::to_subtitles(&cues);

    tracing::info!(path = ?output.display(), cues = subtitles.len(), "write srt file");

    std::fs::write(&output, srt::display_subtitles(&subtitles))
        .wrap_err_with(|| format!("failed to write srt: {:?}", output.display()))?;

    if config.preview {
        print!("{}", srt::preview_subtitles(&subtitles, 3, 3));
    }

    Ok(())
}
