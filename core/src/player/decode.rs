//! MP3 decoding
//!
//! Runs on the blocking pool: probing walks the whole file when the stream
//! header carries no frame count.

use std::io::Cursor;
use std::time::Duration;

use bytes::Bytes;
use rodio::Decoder;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::units::{Time, TimeBase};

use super::PlayerError;

/// A decoded track ready to be attached to the output mixer.
pub struct LoadedTrack {
    pub source: Decoder<Cursor<Bytes>>,
    pub duration: Duration,
}

/// Decode `data` and measure its duration.
pub fn decode(data: Bytes) -> Result<LoadedTrack, PlayerError> {
    let duration = probe_duration(data.clone())?;
    let source =
        Decoder::new(Cursor::new(data)).map_err(|e| PlayerError::Decode(e.to_string()))?;
    Ok(LoadedTrack { source, duration })
}

fn to_duration(time: Time) -> Duration {
    Duration::from_secs(time.seconds) + Duration::from_secs_f64(time.frac)
}

/// Total play time of an MP3 stream.
pub fn probe_duration(data: Bytes) -> Result<Duration, PlayerError> {
    let stream = MediaSourceStream::new(Box::new(Cursor::new(data)), Default::default());
    let mut hint = Hint::new();
    hint.with_extension("mp3");

    let probed = symphonia::default::get_probe().format(
        &hint,
        stream,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;
    let mut format = probed.format;

    let track = format
        .default_track()
        .ok_or_else(|| PlayerError::Decode("no audio track".to_string()))?;
    let params = &track.codec_params;
    let time_base = params
        .time_base
        .or_else(|| params.sample_rate.map(|rate| TimeBase::new(1, rate)))
        .ok_or_else(|| PlayerError::Decode("unknown sample rate".to_string()))?;

    if let Some(frames) = params.n_frames {
        return Ok(to_duration(time_base.calc_time(frames)));
    }

    // No frame count in the header: walk the packets.
    let track_id = track.id;
    let mut end = 0u64;
    loop {
        match format.next_packet() {
            Ok(packet) if packet.track_id() == track_id => {
                end = end.max(packet.ts() + packet.dur());
            }
            Ok(_) => {}
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(to_duration(time_base.calc_time(end)))
}
