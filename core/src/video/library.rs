//! Clip Library
//!
//! Loads the clips the backdrop rotates through. A clip that fails to decode
//! is logged and left out; it never aborts startup.

use std::path::{Path, PathBuf};

use super::decoder::{DecodeError, Decoder};
use super::renderer::Renderer;

/// Built-in backdrop, used when no clip directory yields anything and for
/// the "terminal too small" screen.
pub const BUILTIN_BACKDROP: &[u8] = include_bytes!("../../assets/backdrop.json");

/// A decoded clip paired with its palette tables.
#[derive(Debug)]
pub struct Clip {
    pub name: String,
    pub decoder: Decoder,
    pub renderer: Renderer,
}

impl Clip {
    pub fn from_bytes(name: impl Into<String>, data: &[u8]) -> Result<Self, DecodeError> {
        let decoder = Decoder::from_bytes(data)?;
        let renderer = Renderer::new(decoder.palette());
        Ok(Self {
            name: name.into(),
            decoder,
            renderer,
        })
    }

    /// The clip compiled into the binary.
    pub fn builtin() -> Result<Self, DecodeError> {
        Self::from_bytes("builtin", BUILTIN_BACKDROP)
    }
}

/// Decode every named blob, dropping the ones that fail.
pub fn decode_all<'a, I>(sources: I) -> Vec<Clip>
where
    I: IntoIterator<Item = (String, &'a [u8])>,
{
    sources
        .into_iter()
        .filter_map(|(name, data)| match Clip::from_bytes(name.clone(), data) {
            Ok(clip) => {
                tracing::debug!(clip = %name, frames = clip.decoder.total_frames(), "loaded clip");
                Some(clip)
            }
            Err(e) => {
                tracing::warn!(clip = %name, error = %e, "skipping clip");
                None
            }
        })
        .collect()
}

/// Load all clips in `dir`, sorted by file name.
///
/// A missing directory is not an error; it simply yields no clips.
/// Runs before the event loop starts.
pub fn load_dir(dir: &Path) -> Vec<Clip> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!(dir = %dir.display(), error = %e, "no clip directory");
            return Vec::new();
        }
    };

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file())
        .collect();
    paths.sort();

    let blobs: Vec<(String, Vec<u8>)> = paths
        .into_iter()
        .filter_map(|path| {
            let name = path.file_name()?.to_string_lossy().into_owned();
            match std::fs::read(&path) {
                Ok(data) => Some((name, data)),
                Err(e) => {
                    tracing::warn!(clip = %name, error = %e, "unreadable clip");
                    None
                }
            }
        })
        .collect();

    decode_all(blobs.iter().map(|(name, data)| (name.clone(), data.as_slice())))
}

/// Clips from `dir`, or the built-in clip if there are none.
pub fn load_or_builtin(dir: Option<&Path>) -> Vec<Clip> {
    let clips = dir.map(load_dir).unwrap_or_default();
    if !clips.is_empty() {
        return clips;
    }
    match Clip::builtin() {
        Ok(clip) => vec![clip],
        Err(e) => {
            tracing::error!(error = %e, "built-in clip failed to decode");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builtin_clip_decodes() {
        let clip = Clip::builtin().expect("built-in clip");
        assert_eq!(clip.decoder.width(), 64);
        assert_eq!(clip.decoder.height(), 18);
        assert!(clip.decoder.total_frames() > 1);
        assert_eq!(clip.decoder.keyframe_index().first(), Some(&0));
    }

    #[test]
    fn test_bad_clips_are_skipped() {
        let good = br#"{"v":1,"w":1,"h":1,"chars":"a","frames":[[1,0,0,1]]}"#;
        let clips = decode_all(vec![
            ("bad.json".to_string(), &b"{}"[..]),
            ("good.json".to_string(), &good[..]),
        ]);
        assert_eq!(clips.len(), 1);
        assert_eq!(clips[0].name, "good.json");
    }

    #[test]
    fn test_load_dir_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        let clip = br#"{"v":1,"w":2,"h":1,"chars":"a","frames":[[1,0,0,2]]}"#;
        for name in ["b.json", "a.json"] {
            std::fs::File::create(dir.path().join(name))
                .unwrap()
                .write_all(clip)
                .unwrap();
        }
        std::fs::write(dir.path().join("broken.json"), b"nope").unwrap();

        let clips = load_dir(dir.path());
        let names: Vec<_> = clips.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["a.json", "b.json"]);
    }

    #[test]
    fn test_fallback_to_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let clips = load_or_builtin(Some(dir.path()));
        assert_eq!(clips.len(), 1);
        assert_eq!(clips[0].name, "builtin");

        assert_eq!(load_or_builtin(None)[0].name, "builtin");
    }
}
