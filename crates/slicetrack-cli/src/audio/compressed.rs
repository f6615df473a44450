//! Decoding of MP3 and other non-WAV inputs with `symphonia`.

use std::fs::File;
use std::io;
use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, warn};

use super::wav::{downmix, AudioError};

/// Decode the first audio track of `path` to mono f32 at its native rate.
///
/// The file extension is passed to symphonia as a hint; the container is
/// still recognised from its content when the extension is missing or
/// wrong. Packets that fail to decode are skipped, as MP3 streams often
/// carry a damaged frame or two.
pub fn decode(path: &Path) -> Result<(Vec<f32>, u32), AudioError> {
    let codec_err = |source| AudioError::Compressed {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(|source| AudioError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let stream = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|ext| ext.to_str()) {
        hint.with_extension(ext);
    }

    let recognised = symphonia::default::get_probe()
        .format(
            &hint,
            stream,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(codec_err)?;
    let mut format = recognised.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| AudioError::NoTrack {
            path: path.to_path_buf(),
        })?;
    let track_id = track.id;
    let mut sample_rate = track.codec_params.sample_rate;
    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(codec_err)?;

    let mut samples = Vec::new();
    let mut skipped = 0usize;
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == io::ErrorKind::UnexpectedEof => break,
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(codec_err(e)),
        };
        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                let channels = spec.channels.count();
                if channels == 0 {
                    continue;
                }
                sample_rate.get_or_insert(spec.rate);
                let mut buffer = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
                buffer.copy_interleaved_ref(decoded);
                samples.extend(downmix(buffer.samples(), channels));
            }
            Err(SymphoniaError::DecodeError(_)) => skipped += 1,
            Err(e) => return Err(codec_err(e)),
        }
    }

    if skipped > 0 {
        warn!(path = %path.display(), skipped, "skipped undecodable packets");
    }

    let sample_rate = sample_rate
        .filter(|&rate| rate > 0)
        .ok_or_else(|| AudioError::Unsupported {
            path: path.to_path_buf(),
            reason: "unknown sample rate".to_string(),
        })?;

    debug!(
        path = %path.display(),
        frames = samples.len(),
        sample_rate,
        "decoded audio"
    );
    Ok((samples, sample_rate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// A RIFF stream under a non-WAV extension, so it is decoded here.
    fn write_riff(path: &Path, channels: u16, frames: &[[i16; 2]]) {
        let spec = hound::WavSpec {
            channels,
            sample_rate: 16000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for frame in frames {
            for &s in &frame[..channels as usize] {
                writer.write_sample(s).unwrap();
            }
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_decode_detects_container_from_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.audio");
        write_riff(&path, 1, &[[16384, 0]; 400]);

        let (samples, rate) = decode(&path).unwrap();
        assert_eq!(rate, 16000);
        assert_eq!(samples.len(), 400);
        assert!(samples.iter().all(|&s| (s - 0.5).abs() < 1e-6));
    }

    #[test]
    fn test_decode_downmixes_stereo() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.bin");
        write_riff(&path, 2, &[[16384, 0]; 100]);

        let (samples, _) = decode(&path).unwrap();
        assert_eq!(samples.len(), 100);
        assert!(samples.iter().all(|&s| (s - 0.25).abs() < 1e-6));
    }

    #[test]
    fn test_decode_rejects_garbage_mp3() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.mp3");
        std::fs::write(&path, b"definitely not an mpeg stream").unwrap();

        let err = decode(&path).unwrap_err();
        assert!(matches!(
            err,
            AudioError::Compressed { .. } | AudioError::NoTrack { .. } | AudioError::Unsupported { .. }
        ));
    }

    #[test]
    fn test_decode_missing_file() {
        let err = decode(Path::new("/nonexistent/song.mp3")).unwrap_err();
        assert!(matches!(err, AudioError::Open { .. }));
    }
}
