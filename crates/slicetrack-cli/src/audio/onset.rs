//! Onset detection and slice boundary assembly.
//!
//! Onsets are found with a spectral-flux envelope: 2048-point Hann frames
//! centered every `hop_length` samples, log-compressed magnitude spectra, and
//! the mean positive difference between consecutive frames. Peaks are picked
//! against a moving-average threshold and moved back to the preceding
//! minimum of the envelope so a slice starts before its attack.

use rustfft::{num_complex::Complex, FftPlanner};
use slicetrack_plan::Slice;
use tracing::debug;

/// FFT frame length in samples.
pub const FRAME_SIZE: usize = 2048;

/// Default hop between frames in samples.
pub const DEFAULT_HOP_LENGTH: usize = 512;

/// Slices shorter than this are dropped.
pub const MIN_SLICE_SECONDS: f64 = 0.025;

/// Distance from either end of the audio below which no boundary is added.
pub const EDGE_TOLERANCE_SECONDS: f64 = 0.05;

// Peak picking windows, in seconds.
const PRE_MAX_SECONDS: f64 = 0.03;
const AVG_SECONDS: f64 = 0.10;
const WAIT_SECONDS: f64 = 0.03;
const PEAK_DELTA: f32 = 0.07;

/// Detect slices in mono audio.
pub fn detect_slices(samples: &[f32], sample_rate: u32, hop_length: usize) -> Vec<Slice> {
    let onsets = detect_onsets(samples, sample_rate, hop_length);
    let duration = if sample_rate == 0 {
        0.0
    } else {
        samples.len() as f64 / sample_rate as f64
    };
    let slices = slices_from_onsets(&onsets, duration);
    debug!(
        onsets = onsets.len(),
        slices = slices.len(),
        duration,
        "detected slices"
    );
    slices
}

/// Onset times in seconds, ascending.
pub fn detect_onsets(samples: &[f32], sample_rate: u32, hop_length: usize) -> Vec<f64> {
    if sample_rate == 0 || hop_length == 0 {
        return Vec::new();
    }
    let envelope = normalize(&onset_strength(samples, hop_length));
    let peaks = pick_peaks(&envelope, sample_rate, hop_length);
    let mut frames = backtrack(&peaks, &envelope);
    frames.dedup();

    frames
        .into_iter()
        .map(|frame| (frame * hop_length) as f64 / sample_rate as f64)
        .collect()
}

/// Turn onset times into contiguous slices covering the audio.
///
/// A boundary at `0.0` is inserted when the first onset comes later than
/// [`EDGE_TOLERANCE_SECONDS`], and `duration` is appended when the last
/// onset is further than that from the end. Spans shorter than
/// [`MIN_SLICE_SECONDS`] are dropped.
pub fn slices_from_onsets(onsets: &[f64], duration: f64) -> Vec<Slice> {
    let mut times = onsets.to_vec();
    if times.first().map_or(true, |&first| first > EDGE_TOLERANCE_SECONDS) {
        times.insert(0, 0.0);
    }
    if let Some(&last) = times.last() {
        if (last - duration).abs() > EDGE_TOLERANCE_SECONDS {
            times.push(duration);
        }
    }

    times
        .windows(2)
        .filter(|pair| pair[1] - pair[0] >= MIN_SLICE_SECONDS)
        .filter_map(|pair| Slice::new(pair[0], pair[1]).ok())
        .collect()
}

/// Spectral flux per frame. Frame `t` is centered on sample `t * hop_length`.
pub fn onset_strength(samples: &[f32], hop_length: usize) -> Vec<f32> {
    if samples.is_empty() || hop_length == 0 {
        return Vec::new();
    }

    let num_frames = 1 + samples.len() / hop_length;
    let bins = FRAME_SIZE / 2 + 1;
    let window: Vec<f32> = (0..FRAME_SIZE)
        .map(|i| {
            0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / FRAME_SIZE as f32).cos())
        })
        .collect();

    let mut planner = FftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(FRAME_SIZE);
    let mut buffer = vec![Complex::new(0.0f32, 0.0); FRAME_SIZE];
    let mut previous = vec![0.0f32; bins];
    let mut current = vec![0.0f32; bins];
    let mut flux = Vec::with_capacity(num_frames);

    for frame in 0..num_frames {
        let center = frame * hop_length;
        for (i, slot) in buffer.iter_mut().enumerate() {
            let sample = (center + i)
                .checked_sub(FRAME_SIZE / 2)
                .and_then(|pos| samples.get(pos))
                .copied()
                .unwrap_or(0.0);
            *slot = Complex::new(sample * window[i], 0.0);
        }
        fft.process(&mut buffer);

        for (bin, c) in current.iter_mut().zip(buffer.iter()) {
            *bin = (1.0 + 10.0 * c.norm()).ln();
        }

        if frame == 0 {
            flux.push(0.0);
        } else {
            let rise: f32 = current
                .iter()
                .zip(previous.iter())
                .map(|(c, p)| (c - p).max(0.0))
                .sum();
            flux.push(rise / bins as f32);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    flux
}

/// Scale to [0, 1]. A flat envelope becomes all zeros.
fn normalize(envelope: &[f32]) -> Vec<f32> {
    let min = envelope.iter().copied().fold(f32::INFINITY, f32::min);
    let max = envelope.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let range = max - min;
    if !range.is_finite() || range <= f32::EPSILON {
        return vec![0.0; envelope.len()];
    }
    envelope.iter().map(|&v| (v - min) / range).collect()
}

fn frames_for(seconds: f64, sample_rate: u32, hop_length: usize) -> usize {
    (seconds * sample_rate as f64 / hop_length as f64).floor() as usize
}

/// Frames that are a local maximum and stand `PEAK_DELTA` above the local
/// mean, at least `WAIT_SECONDS` after the previous pick.
fn pick_peaks(envelope: &[f32], sample_rate: u32, hop_length: usize) -> Vec<usize> {
    let pre_max = frames_for(PRE_MAX_SECONDS, sample_rate, hop_length);
    let post_max = 1;
    let pre_avg = frames_for(AVG_SECONDS, sample_rate, hop_length);
    let post_avg = pre_avg + 1;
    let wait = frames_for(WAIT_SECONDS, sample_rate, hop_length);

    let mut peaks = Vec::new();
    let mut last: Option<usize> = None;

    for (n, &value) in envelope.iter().enumerate() {
        let max_window = &envelope[n.saturating_sub(pre_max)..(n + post_max).min(envelope.len())];
        if max_window.iter().any(|&v| v > value) {
            continue;
        }

        let avg_window = &envelope[n.saturating_sub(pre_avg)..(n + post_avg).min(envelope.len())];
        let mean = avg_window.iter().sum::<f32>() / avg_window.len() as f32;
        if value < mean + PEAK_DELTA {
            continue;
        }

        if last.map_or(true, |prev| n > prev + wait) {
            peaks.push(n);
            last = Some(n);
        }
    }

    peaks
}

/// Move each peak back to the closest preceding local minimum of `energy`.
fn backtrack(peaks: &[usize], energy: &[f32]) -> Vec<usize> {
    let mut minima = vec![0usize];
    for i in 1..energy.len().saturating_sub(1) {
        if energy[i] <= energy[i - 1] && energy[i] < energy[i + 1] {
            minima.push(i);
        }
    }

    peaks
        .iter()
        .map(|&peak| {
            let idx = minima.partition_point(|&m| m <= peak);
            minima[idx.saturating_sub(1)]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn spans(slices: &[Slice]) -> Vec<(f64, f64)> {
        slices.iter().map(|s| (s.start, s.end)).collect()
    }

    #[test]
    fn test_slices_from_onsets_inserts_start_and_end() {
        let slices = slices_from_onsets(&[0.5, 1.0], 2.0);
        assert_eq!(spans(&slices), vec![(0.0, 0.5), (0.5, 1.0), (1.0, 2.0)]);
    }

    #[test]
    fn test_slices_from_onsets_keeps_near_edges() {
        // First onset within 50 ms of the start and last within 50 ms of the end.
        let slices = slices_from_onsets(&[0.04, 1.0, 1.98], 2.0);
        assert_eq!(spans(&slices), vec![(0.04, 1.0), (1.0, 1.98)]);
    }

    #[test]
    fn test_slices_from_onsets_drops_short_spans() {
        let slices = slices_from_onsets(&[0.5, 0.51, 1.0], 1.5);
        assert_eq!(spans(&slices), vec![(0.0, 0.5), (0.51, 1.0), (1.0, 1.5)]);
    }

    #[test]
    fn test_slices_from_onsets_without_onsets() {
        assert_eq!(spans(&slices_from_onsets(&[], 1.0)), vec![(0.0, 1.0)]);
        assert!(slices_from_onsets(&[], 0.0).is_empty());
    }

    #[test]
    fn test_onset_past_end_is_dropped() {
        let slices = slices_from_onsets(&[0.5, 3.0], 2.0);
        assert_eq!(spans(&slices), vec![(0.0, 0.5), (0.5, 3.0)]);
    }

    #[test]
    fn test_backtrack_to_preceding_minimum() {
        let energy = [0.0, 0.5, 0.2, 0.1, 0.6, 1.0, 0.3];
        assert_eq!(backtrack(&[5], &energy), vec![3]);
        assert_eq!(backtrack(&[1], &energy), vec![0]);
    }

    #[test]
    fn test_normalize_flat_envelope() {
        assert_eq!(normalize(&[0.3, 0.3]), vec![0.0, 0.0]);
        assert_eq!(normalize(&[1.0, 3.0]), vec![0.0, 1.0]);
        assert!(normalize(&[]).is_empty());
    }

    #[test]
    fn test_onset_strength_frame_count() {
        let samples = vec![0.0; 22050];
        let flux = onset_strength(&samples, 512);
        assert_eq!(flux.len(), 1 + 22050 / 512);
        assert!(flux.iter().all(|&v| v == 0.0));
        assert!(onset_strength(&[], 512).is_empty());
    }

    #[test]
    fn test_silence_is_one_slice() {
        let samples = vec![0.0; 22050];
        let slices = detect_slices(&samples, 22050, DEFAULT_HOP_LENGTH);
        assert_eq!(spans(&slices), vec![(0.0, 1.0)]);
    }

    #[test]
    fn test_empty_audio_has_no_slices() {
        assert!(detect_slices(&[], 22050, DEFAULT_HOP_LENGTH).is_empty());
    }

    #[test]
    fn test_bursts_produce_boundaries() {
        let sample_rate = 22050u32;
        let mut samples = vec![0.0f32; 2 * sample_rate as usize];
        for &start in &[0.5f64, 1.2] {
            let first = (start * sample_rate as f64) as usize;
            for i in 0..2205 {
                let t = i as f32 / sample_rate as f32;
                samples[first + i] = 0.8 * (2.0 * std::f32::consts::PI * 440.0 * t).sin();
            }
        }

        let slices = detect_slices(&samples, sample_rate, DEFAULT_HOP_LENGTH);
        assert!(slices.len() >= 3, "got {:?}", spans(&slices));
        assert_eq!(slices[0].start, 0.0);
        assert_eq!(slices.last().unwrap().end, 2.0);

        let boundaries: Vec<f64> = slices.iter().skip(1).map(|s| s.start).collect();
        assert!(boundaries.iter().any(|&b| (0.35..=0.55).contains(&b)));
        assert!(boundaries.iter().any(|&b| (1.05..=1.25).contains(&b)));
        assert!(!boundaries.iter().any(|&b| (0.7..=1.0).contains(&b)));
    }
}
