//! Discovers contiguous clips on disk.
//!
//! Clips are named `clip_{index}.{ext}`. A still image at an index stands in
//! for a missing video clip.

use crate::error::InputError;
use crate::types::{ClipKind, ClipSource};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Video extensions, in lookup priority order.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "webm"];

/// Still-image substitute extensions, in lookup priority order.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp"];

/// Collect `clip_0`, `clip_1`, ... from `dir` up to the first gap.
///
/// Extensions match case-insensitively. When several files share an index,
/// videos win over images, then extension priority decides.
///
/// # Errors
///
/// - [`InputError::NoClips`] when `clip_0` is missing
/// - [`InputError::NonContiguousClips`] when any clip exists past the gap
pub fn discover_clips(dir: &Path) -> Result<Vec<ClipSource>, InputError> {
    if !dir.is_dir() {
        return Err(InputError::NoClips(dir.to_path_buf()));
    }

    let mut found = scan_clips(dir)?;

    let mut clips = Vec::new();
    while let Some((_, path, kind)) = found.remove(&clips.len()) {
        let index = clips.len();
        clips.push(ClipSource::new(index, path, kind));
    }

    let gap = clips.len();
    if let Some((&index, _)) = found.range(gap..).next() {
        return Err(InputError::NonContiguousClips { gap, found: index });
    }

    if clips.is_empty() {
        return Err(InputError::NoClips(dir.to_path_buf()));
    }

    let images = clips.iter().filter(|c| c.kind == ClipKind::Image).count();
    tracing::info!(dir = ?dir.display(), clips = clips.len(), images, "discovered clips");

    Ok(clips)
}

/// Best candidate per index, keyed by lookup priority.
fn scan_clips(dir: &Path) -> Result<BTreeMap<usize, (usize, PathBuf, ClipKind)>, InputError> {
    let mut found: BTreeMap<usize, (usize, PathBuf, ClipKind)> = BTreeMap::new();

    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let Some((index, priority, kind)) = parse_clip_name(&path) else {
            continue;
        };

        match found.get(&index) {
            Some((best, _, _)) if *best <= priority => {}
            _ => {
                found.insert(index, (priority, path, kind));
            }
        }
    }

    Ok(found)
}

/// Index, lookup priority and kind of a `clip_{index}.{ext}` file.
fn parse_clip_name(path: &Path) -> Option<(usize, usize, ClipKind)> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();

    let (priority, kind) = match VIDEO_EXTENSIONS.iter().position(|e| *e == ext) {
        Some(p) => (p, ClipKind::Video),
        None => {
            let p = IMAGE_EXTENSIONS.iter().position(|e| *e == ext)?;
            (VIDEO_EXTENSIONS.len() + p, ClipKind::Image)
        }
    };

    let index = path
        .file_stem()?
        .to_str()?
        .strip_prefix("clip_")?
        .parse()
        .ok()?;

    Some((index, priority, kind))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    fn touch(dir: &Path, names: &[&str]) {
        for name in names {
            File::create(dir.join(name)).unwrap();
        }
    }

    #[test]
    fn discovers_videos_and_image_substitutes() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), &["clip_0.mp4", "clip_1.png", "clip_2.mov", "notes.txt"]);

        let clips = discover_clips(dir.path()).unwrap();

        match &clips[..] {
            [a, b, c] => {
                assert_eq!((a.index, a.kind), (0, ClipKind::Video));
                assert_eq!((b.index, b.kind), (1, ClipKind::Image));
                assert_eq!((c.index, c.kind), (2, ClipKind::Video));
            }
            _ => panic!("expected 3 clips, got {clips:?}"),
        }
    }

    #[test]
    fn video_wins_over_image_at_same_index() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), &["clip_0.jpg", "clip_0.mp4"]);

        let clips = discover_clips(dir.path()).unwrap();

        assert_eq!(clips.len(), 1);
        assert_eq!(clips[0].kind, ClipKind::Video);
    }

    #[test]
    fn gap_before_existing_clip_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), &["clip_0.mp4", "clip_1.mp4", "clip_3.mp4"]);

        let err = discover_clips(dir.path()).unwrap_err();

        assert!(
            matches!(err, InputError::NonContiguousClips { gap: 2, found: 3 }),
            "unexpected error: {err:?}"
        );
    }

    #[test]
    fn missing_first_clip_is_rejected() {
        let dir = tempfile::tempdir().unwrap();

        assert!(matches!(
            discover_clips(dir.path()),
            Err(InputError::NoClips(_))
        ));

        touch(dir.path(), &["clip_1.mp4"]);

        assert!(matches!(
            discover_clips(dir.path()),
            Err(InputError::NonContiguousClips { gap: 0, found: 1 })
        ));
    }

    #[test]
    fn upper_case_extensions_are_found() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), &["clip_0.mp4", "clip_1.MP4", "clip_2.Png"]);

        let clips = discover_clips(dir.path()).unwrap();

        match &clips[..] {
            [_, b, c] => {
                assert_eq!((b.index, b.kind), (1, ClipKind::Video));
                assert!(b.path.ends_with("clip_1.MP4"));
                assert_eq!((c.index, c.kind), (2, ClipKind::Image));
            }
            _ => panic!("expected 3 clips, got {clips:?}"),
        }
    }

    #[test]
    fn mov_wins_over_webm_at_same_index() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), &["clip_0.webm", "clip_0.mov"]);

        let clips = discover_clips(dir.path()).unwrap();

        assert!(clips[0].path.ends_with("clip_0.mov"));
    }
}
