//! Track Catalog
//!
//! The album list is static data compiled into the binary from
//! `assets/catalog.toml`. Track URLs are derived from the CDN layout:
//!
//! ```text
//! <cdn>/<artist> - <album>/<artist> - <album> - <NN> <title>.mp3
//! ```

use std::time::Duration;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;
use thiserror::Error;

const CATALOG_TOML: &str = include_str!("../assets/catalog.toml");

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("invalid catalog: {0}")]
    Parse(#[from] toml::de::Error),
}

/// A playable track.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Track {
    pub title: String,
    pub artist: String,
    pub url: String,
}

/// An album and its tracks, in play order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Album {
    pub title: String,
    pub genre: String,
    pub tracks: Vec<Track>,
}

/// The full album catalog.
#[derive(Clone, Debug)]
pub struct Catalog {
    pub albums: Vec<Album>,
}

#[derive(Deserialize)]
struct RawCatalog {
    cdn: String,
    artist: String,
    albums: Vec<RawAlbum>,
}

#[derive(Deserialize)]
struct RawAlbum {
    title: String,
    #[serde(default)]
    genre: String,
    tracks: Vec<RawTrack>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTrack {
    Title(String),
    Credited { title: String, artist: String },
}

fn track_url(cdn: &str, artist: &str, album: &str, number: usize, title: &str) -> String {
    format!("{cdn}/{artist} - {album}/{artist} - {album} - {number:02} {title}.mp3")
}

impl Catalog {
    /// The catalog shipped with the binary.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_toml(CATALOG_TOML)
    }

    pub fn from_toml(source: &str) -> Result<Self, CatalogError> {
        let raw: RawCatalog = toml::from_str(source)?;
        let cdn = raw.cdn.trim_end_matches('/');

        let albums = raw
            .albums
            .into_iter()
            .map(|album| {
                let tracks = album
                    .tracks
                    .into_iter()
                    .enumerate()
                    .map(|(i, track)| {
                        let (title, artist) = match track {
                            RawTrack::Title(title) => (title, raw.artist.clone()),
                            RawTrack::Credited { title, artist } => (title, artist),
                        };
                        let url = track_url(cdn, &artist, &album.title, i + 1, &title);
                        Track { title, artist, url }
                    })
                    .collect();
                Album {
                    title: album.title,
                    genre: album.genre,
                    tracks,
                }
            })
            .collect();

        Ok(Self { albums })
    }

    /// Albums in random order (the startup order).
    pub fn shuffled<R: Rng>(mut self, rng: &mut R) -> Self {
        self.albums.shuffle(rng);
        self
    }

    pub fn track_count(&self) -> usize {
        self.albums.iter().map(|a| a.tracks.len()).sum()
    }
}

/// Format a duration as `M:SS`, or `H:MM:SS` from one hour up.
pub fn format_duration(d: Duration) -> String {
    let total = d.as_secs();
    if total >= 3600 {
        format!("{}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60)
    } else {
        format!("{}:{:02}", total / 60, total % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_builtin_catalog_shape() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(catalog.albums.len(), 15);
        for album in &catalog.albums {
            assert!(!album.title.is_empty());
            assert!(!album.tracks.is_empty(), "{} has no tracks", album.title);
            for track in &album.tracks {
                assert!(!track.title.is_empty());
                assert!(track.url.ends_with(".mp3"));
            }
        }
    }

    #[test]
    fn test_track_url_layout() {
        let catalog = Catalog::builtin().unwrap();
        let first = &catalog.albums[0].tracks[0];
        assert_eq!(
            first.url,
            "https://cdn.dopogoto.com/Dopo Goto - The Songs From The Pillbox/Dopo Goto - The Songs From The Pillbox - 01 A Song Number One.mp3"
        );
    }

    #[test]
    fn test_credited_artist_overrides_album_artist() {
        let source = r#"
            cdn = "https://cdn.example/"
            artist = "Main"

            [[albums]]
            title = "Disc"
            tracks = ["One", { title = "Two", artist = "Main, Guest" }]
        "#;
        let catalog = Catalog::from_toml(source).unwrap();
        let tracks = &catalog.albums[0].tracks;
        assert_eq!(tracks[0].url, "https://cdn.example/Main - Disc/Main - Disc - 01 One.mp3");
        assert_eq!(tracks[1].artist, "Main, Guest");
        assert_eq!(
            tracks[1].url,
            "https://cdn.example/Main, Guest - Disc/Main, Guest - Disc - 02 Two.mp3"
        );
    }

    #[test]
    fn test_shuffle_keeps_every_album() {
        let catalog = Catalog::builtin().unwrap();
        let count = catalog.track_count();
        let mut titles: Vec<_> = catalog.albums.iter().map(|a| a.title.clone()).collect();

        let shuffled = catalog.shuffled(&mut StdRng::seed_from_u64(3));
        let mut after: Vec<_> = shuffled.albums.iter().map(|a| a.title.clone()).collect();
        titles.sort();
        after.sort();
        assert_eq!(titles, after);
        assert_eq!(shuffled.track_count(), count);
    }

    #[test]
    fn test_format_duration() {
        let cases = [
            (0, "0:00"),
            (45, "0:45"),
            (3 * 60 + 27, "3:27"),
            (5 * 60, "5:00"),
            (3600 + 2 * 60 + 3, "1:02:03"),
            (4 * 60 + 15, "4:15"),
        ];
        for (secs, want) in cases {
            assert_eq!(format_duration(Duration::from_secs(secs)), want);
        }
    }
}
