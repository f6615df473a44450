//! Audio loading, resampling and slice extraction.
//!
//! WAV files are read with `hound`. Everything else (MP3 and the other
//! formats `symphonia` recognises) goes through [`super::compressed`].

use std::path::{Path, PathBuf};

use slicetrack_plan::{SampleBuffer, SampleProvider, Slice};
use thiserror::Error;
use tracing::debug;

/// Largest magnitude written to extracted PCM.
pub const PCM_PEAK: f32 = 32767.0;

/// Error type for audio loading.
#[derive(Debug, Error)]
pub enum AudioError {
    /// The WAV file could not be opened or decoded.
    #[error("Failed to read WAV file '{path}': {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },

    /// The WAV file declares a layout we cannot use.
    #[error("Unsupported WAV format in '{path}': {reason}")]
    Unsupported { path: PathBuf, reason: String },

    /// A slice starts past the end of the audio.
    #[error("Slice starting at {start:.3}s is past the end of the audio ({duration:.3}s)")]
    OutOfRange { start: f64, duration: f64 },

    /// A non-WAV file could not be recognised or decoded.
    #[error("Failed to decode audio file '{path}': {source}")]
    Compressed {
        path: PathBuf,
        #[source]
        source: symphonia::core::errors::Error,
    },

    /// The container holds no decodable audio track.
    #[error("No audio track found in '{path}'")]
    NoTrack { path: PathBuf },

    /// Opening the input file failed.
    #[error("Failed to open audio file '{path}': {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing a WAV file failed.
    #[error("Failed to write WAV file '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },
}

/// Decoded mono audio, with a cache of the last resampled rendition.
#[derive(Debug, Clone)]
pub struct WavSource {
    samples: Vec<f32>,
    sample_rate: u32,
    resampled: Option<(u32, Vec<f32>)>,
}

impl WavSource {
    /// Decode an audio file to mono f32 at its native rate.
    ///
    /// Files with a `.wav`/`.wave` extension are read with `hound`; any
    /// other file (MP3 in particular) is recognised and decoded by `symphonia`.
    /// Multi-channel audio is averaged to mono.
    pub fn open(path: &Path) -> Result<Self, AudioError> {
        let is_wav = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("wav") || ext.eq_ignore_ascii_case("wave"));
        if is_wav {
            return Self::open_wav(path);
        }

        let (samples, sample_rate) = super::compressed::decode(path)?;
        Ok(Self::from_samples(samples, sample_rate))
    }

    /// Decode a WAV file. Integer formats of any bit depth and 32-bit float
    /// are accepted.
    pub fn open_wav(path: &Path) -> Result<Self, AudioError> {
        let reader = hound::WavReader::open(path).map_err(|source| AudioError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        let spec = reader.spec();
        if spec.channels == 0 || spec.sample_rate == 0 {
            return Err(AudioError::Unsupported {
                path: path.to_path_buf(),
                reason: format!(
                    "{} channels at {} Hz",
                    spec.channels, spec.sample_rate
                ),
            });
        }

        let decode_err = |source| AudioError::Decode {
            path: path.to_path_buf(),
            source,
        };
        let interleaved: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Int => {
                if spec.bits_per_sample == 0 || spec.bits_per_sample > 32 {
                    return Err(AudioError::Unsupported {
                        path: path.to_path_buf(),
                        reason: format!("{}-bit integer samples", spec.bits_per_sample),
                    });
                }
                let max_val = (1i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .into_samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / max_val))
                    .collect::<Result<_, _>>()
                    .map_err(decode_err)?
            }
            hound::SampleFormat::Float => reader
                .into_samples::<f32>()
                .collect::<Result<_, _>>()
                .map_err(decode_err)?,
        };

        let samples = downmix(&interleaved, spec.channels as usize);
        debug!(
            path = %path.display(),
            frames = samples.len(),
            sample_rate = spec.sample_rate,
            channels = spec.channels,
            "decoded wav"
        );
        Ok(Self::from_samples(samples, spec.sample_rate))
    }

    /// Wrap mono samples in [-1.0, 1.0].
    pub fn from_samples(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
            resampled: None,
        }
    }

    /// Native sample rate.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Length in seconds.
    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// The whole signal at `sample_rate`.
    pub fn at_rate(&mut self, sample_rate: u32) -> &[f32] {
        if sample_rate == self.sample_rate {
            return &self.samples;
        }
        let cached = matches!(&self.resampled, Some((rate, _)) if *rate == sample_rate);
        if !cached {
            let data = resample_linear(&self.samples, self.sample_rate, sample_rate);
            self.resampled = Some((sample_rate, data));
        }
        match &self.resampled {
            Some((_, data)) => data,
            None => &self.samples,
        }
    }

    /// Extract `duration` seconds starting at `offset` as 16-bit PCM.
    ///
    /// Samples are clipped to [-1.0, 1.0] and scaled by 32767, so the
    /// result stays within [-32767, 32767]. A span running past the end of
    /// the audio is shortened.
    pub fn load_samples(
        &mut self,
        offset: f64,
        duration: f64,
        sample_rate: u32,
    ) -> Result<SampleBuffer, AudioError> {
        let total = self.duration_seconds();
        if offset >= total && total > 0.0 || offset < 0.0 {
            return Err(AudioError::OutOfRange {
                start: offset,
                duration: total,
            });
        }

        let data = self.at_rate(sample_rate);
        let start = ((offset * sample_rate as f64).round() as usize).min(data.len());
        let end = (((offset + duration) * sample_rate as f64).round() as usize)
            .clamp(start, data.len());
        let pcm = data[start..end].iter().map(|&s| to_pcm16(s)).collect();
        Ok(SampleBuffer::new(pcm, sample_rate))
    }
}

impl SampleProvider for WavSource {
    type Error = AudioError;

    fn extract(
        &mut self,
        _index: usize,
        slice: &Slice,
        sample_rate: u32,
    ) -> Result<SampleBuffer, Self::Error> {
        self.load_samples(slice.start, slice.duration(), sample_rate)
    }
}

/// Convert one normalized sample to clipped 16-bit PCM.
pub fn to_pcm16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * PCM_PEAK) as i16
}

/// Average interleaved frames to mono.
pub fn downmix(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

/// Resample audio data using linear interpolation.
///
/// # Arguments
/// * `data` - Mono samples
/// * `src_rate` - Source sample rate
/// * `dst_rate` - Destination sample rate
pub fn resample_linear(data: &[f32], src_rate: u32, dst_rate: u32) -> Vec<f32> {
    if src_rate == dst_rate || data.is_empty() || dst_rate == 0 {
        return data.to_vec();
    }

    let ratio = src_rate as f64 / dst_rate as f64;
    let num_dst_samples = (data.len() as f64 / ratio).ceil() as usize;

    (0..num_dst_samples)
        .map(|i| {
            let src_pos = i as f64 * ratio;
            let src_idx = src_pos.floor() as usize;
            let frac = (src_pos - src_idx as f64) as f32;
            match (data.get(src_idx), data.get(src_idx + 1)) {
                (Some(&s0), Some(&s1)) => s0 + (s1 - s0) * frac,
                (Some(&s0), None) => s0,
                _ => 0.0,
            }
        })
        .collect()
}

/// Write a buffer as a 16-bit mono WAV file.
pub fn write_wav(path: &Path, buffer: &SampleBuffer) -> Result<(), AudioError> {
    let write_err = |source| AudioError::Write {
        path: path.to_path_buf(),
        source,
    };
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: buffer.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).map_err(write_err)?;
    for &sample in &buffer.pcm {
        writer.write_sample(sample).map_err(write_err)?;
    }
    writer.finalize().map_err(write_err)
}
