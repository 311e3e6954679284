//! Play Queue
//!
//! Which track plays after the current one. Pure over the album list so the
//! policy can be tested without a player or a terminal.

use dopogoto_core::Album;
use rand::Rng;

/// An album index and a track index within it
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QueuePosition {
    pub album: usize,
    pub track: usize,
}

impl QueuePosition {
    pub const fn new(album: usize, track: usize) -> Self {
        Self { album, track }
    }
}

/// Shuffle and repeat are mutually exclusive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlayMode {
    #[default]
    Sequential,
    Shuffle,
    Repeat,
}

/// The currently playing position and the advance policy
#[derive(Debug, Default)]
pub struct Queue {
    current: Option<QueuePosition>,
    mode: PlayMode,
}

impl Queue {
    pub fn current(&self) -> Option<QueuePosition> {
        self.current
    }

    pub fn set_current(&mut self, position: Option<QueuePosition>) {
        self.current = position;
    }

    pub fn mode(&self) -> PlayMode {
        self.mode
    }

    pub fn shuffle(&self) -> bool {
        self.mode == PlayMode::Shuffle
    }

    pub fn repeat(&self) -> bool {
        self.mode == PlayMode::Repeat
    }

    /// Turn shuffle on (clearing repeat) or off.
    pub fn toggle_shuffle(&mut self) {
        self.mode = if self.shuffle() {
            PlayMode::Sequential
        } else {
            PlayMode::Shuffle
        };
    }

    /// Turn repeat on (clearing shuffle) or off.
    pub fn toggle_repeat(&mut self) {
        self.mode = if self.repeat() {
            PlayMode::Sequential
        } else {
            PlayMode::Repeat
        };
    }

    /// The track after the current one, or `None` when playback should stop.
    ///
    /// Sequential play runs through the album, rolls over into the next one
    /// and ends after the last track of the last album.
    pub fn next<R: Rng>(&self, albums: &[Album], rng: &mut R) -> Option<QueuePosition> {
        let current = self.current?;
        match self.mode {
            PlayMode::Repeat => Some(current),
            PlayMode::Shuffle => random_track(albums, rng),
            PlayMode::Sequential => {
                let tracks = albums.get(current.album)?.tracks.len();
                if current.track + 1 < tracks {
                    return Some(QueuePosition::new(current.album, current.track + 1));
                }
                albums
                    .iter()
                    .enumerate()
                    .skip(current.album + 1)
                    .find(|(_, album)| !album.tracks.is_empty())
                    .map(|(album, _)| QueuePosition::new(album, 0))
            }
        }
    }

    /// The track before the current one.
    ///
    /// Before the first track of an album comes the last track of the
    /// previous album; before the first album comes the last album.
    pub fn previous(&self, albums: &[Album]) -> Option<QueuePosition> {
        let current = self.current?;
        if current.track > 0 {
            return Some(QueuePosition::new(current.album, current.track - 1));
        }
        let count = albums.len();
        (1..=count)
            .map(|back| (current.album + count - back) % count)
            .find_map(|album| {
                let tracks = albums[album].tracks.len();
                (tracks > 0).then(|| QueuePosition::new(album, tracks - 1))
            })
    }
}

fn random_track<R: Rng>(albums: &[Album], rng: &mut R) -> Option<QueuePosition> {
    let candidates: Vec<usize> = albums
        .iter()
        .enumerate()
        .filter(|(_, album)| !album.tracks.is_empty())
        .map(|(i, _)| i)
        .collect();
    if candidates.is_empty() {
        return None;
    }
    let album = candidates[rng.gen_range(0..candidates.len())];
    let track = rng.gen_range(0..albums[album].tracks.len());
    Some(QueuePosition::new(album, track))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dopogoto_core::Track;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn albums(sizes: &[usize]) -> Vec<Album> {
        sizes
            .iter()
            .enumerate()
            .map(|(a, &n)| Album {
                title: format!("Album {a}"),
                genre: String::new(),
                tracks: (0..n)
                    .map(|t| Track {
                        title: format!("Track {t}"),
                        artist: "Artist".into(),
                        url: format!("https://cdn.example/{a}/{t}.mp3"),
                    })
                    .collect(),
            })
            .collect()
    }

    fn queue_at(album: usize, track: usize, mode: PlayMode) -> Queue {
        Queue {
            current: Some(QueuePosition::new(album, track)),
            mode,
        }
    }

    #[test]
    fn test_sequential_advances_within_album() {
        let albums = albums(&[3, 2]);
        let mut rng = StdRng::seed_from_u64(1);
        let next = queue_at(0, 1, PlayMode::Sequential).next(&albums, &mut rng);
        assert_eq!(next, Some(QueuePosition::new(0, 2)));
    }

    #[test]
    fn test_sequential_rolls_over_to_next_album() {
        let albums = albums(&[3, 2]);
        let mut rng = StdRng::seed_from_u64(1);
        let next = queue_at(0, 2, PlayMode::Sequential).next(&albums, &mut rng);
        assert_eq!(next, Some(QueuePosition::new(1, 0)));
    }

    #[test]
    fn test_sequential_stops_after_last_album() {
        let albums = albums(&[3, 2]);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(queue_at(1, 1, PlayMode::Sequential).next(&albums, &mut rng), None);
    }

    #[test]
    fn test_nothing_playing_has_no_next() {
        let albums = albums(&[3]);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(Queue::default().next(&albums, &mut rng), None);
        assert_eq!(Queue::default().previous(&albums), None);
    }

    #[test]
    fn test_repeat_replays_current() {
        let albums = albums(&[3, 2]);
        let mut rng = StdRng::seed_from_u64(1);
        let next = queue_at(1, 1, PlayMode::Repeat).next(&albums, &mut rng);
        assert_eq!(next, Some(QueuePosition::new(1, 1)));
    }

    #[test]
    fn test_shuffle_stays_in_bounds() {
        let albums = albums(&[3, 0, 5]);
        let mut rng = StdRng::seed_from_u64(42);
        let queue = queue_at(0, 0, PlayMode::Shuffle);
        for _ in 0..200 {
            let next = queue.next(&albums, &mut rng).unwrap();
            assert_ne!(next.album, 1);
            assert!(next.track < albums[next.album].tracks.len());
        }
    }

    #[test]
    fn test_previous_within_album_and_wrapping() {
        let albums = albums(&[3, 2]);
        assert_eq!(
            queue_at(1, 1, PlayMode::Sequential).previous(&albums),
            Some(QueuePosition::new(1, 0))
        );
        assert_eq!(
            queue_at(1, 0, PlayMode::Sequential).previous(&albums),
            Some(QueuePosition::new(0, 2))
        );
        assert_eq!(
            queue_at(0, 0, PlayMode::Sequential).previous(&albums),
            Some(QueuePosition::new(1, 1))
        );
    }

    #[test]
    fn test_shuffle_and_repeat_exclusive() {
        let mut queue = Queue::default();
        queue.toggle_shuffle();
        assert!(queue.shuffle());
        queue.toggle_repeat();
        assert!(queue.repeat());
        assert!(!queue.shuffle());
        queue.toggle_repeat();
        assert_eq!(queue.mode(), PlayMode::Sequential);
    }
}
