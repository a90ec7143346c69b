//! Spectral analysis utilities (periodogram and FFT-based peak search).
//!
//! Frequencies are in cycles per observation, so a peak at `f` corresponds
//! to a period of `1/f` observations.

use std::f64::consts::PI;

use ndarray::Array1;
use ndrustfft::ndfft;
use ndrustfft::FftHandler;
use num_complex::Complex64;

use crate::error::Result;
use crate::error::TsError;

/// Configuration for periodogram estimation.
///
/// The series is demeaned and left unwindowed; values are the raw periodogram
/// `|X(λ)|² / (2πn)` used by log-periodogram regression.
#[derive(Debug, Clone, Copy, Default)]
pub struct PeriodogramConfig {
  /// FFT size. If `None`, the series length is used. Longer sizes zero-pad.
  pub nfft: Option<usize>,
}

/// One-sided periodogram output.
#[derive(Debug, Clone)]
pub struct PeriodogramResult {
  /// Frequency bins in cycles per observation, `k / nfft`.
  pub frequencies: Vec<f64>,
  /// Spectrum values at `frequencies`.
  pub spectrum: Vec<f64>,
  /// FFT size used.
  pub nfft: usize,
}

/// Single spectral peak.
#[derive(Debug, Clone, Copy)]
pub struct SpectrumPeak {
  /// Bin index in the periodogram output.
  pub index: usize,
  /// Peak frequency in cycles per observation.
  pub frequency: f64,
  /// Peak period in observations.
  pub period: f64,
  /// Peak power.
  pub power: f64,
}

/// One-sided periodogram computed with an FFT.
///
/// # Errors
/// Fewer than 4 observations, non-finite values, or `nfft` below the series length.
pub fn periodogram(signal: &[f64], cfg: PeriodogramConfig) -> Result<PeriodogramResult> {
  if signal.len() < 4 {
    return Err(TsError::InsufficientData {
      needed: 4,
      got: signal.len(),
    });
  }
  if let Some(index) = signal.iter().position(|v| !v.is_finite()) {
    return Err(TsError::NonFiniteValue { index });
  }

  let n = signal.len();
  let nfft = cfg.nfft.unwrap_or(n);
  if nfft < n {
    return Err(TsError::InvalidArgument(format!(
      "nfft {nfft} is shorter than the signal ({n})"
    )));
  }

  let mean = signal.iter().sum::<f64>() / n as f64;
  let mut input = Array1::<Complex64>::zeros(nfft);
  for (slot, &v) in input.iter_mut().zip(signal) {
    *slot = Complex64::new(v - mean, 0.0);
  }

  let mut fft_out = Array1::<Complex64>::zeros(nfft);
  let fft = FftHandler::<f64>::new(nfft);
  ndfft(&input, &mut fft_out, &fft, 0);

  let bins = nfft / 2 + 1;
  let mut frequencies = Vec::with_capacity(bins);
  let mut spectrum = Vec::with_capacity(bins);

  let scale = 2.0 * PI * n as f64;
  for k in 0..bins {
    frequencies.push(k as f64 / nfft as f64);
    spectrum.push((fft_out[k].norm_sqr() / scale).max(0.0));
  }

  Ok(PeriodogramResult {
    frequencies,
    spectrum,
    nfft,
  })
}

/// Local maxima of the periodogram with periods in `[min_period, max_period]`,
/// sorted by descending power.
pub fn spectrum_peaks(
  signal: &[f64],
  cfg: PeriodogramConfig,
  min_period: f64,
  max_period: f64,
) -> Result<Vec<SpectrumPeak>> {
  let pg = periodogram(signal, cfg)?;
  let n = pg.spectrum.len();

  let mut peaks = Vec::new();
  for i in 1..n {
    let f = pg.frequencies[i];
    let period = 1.0 / f;
    if period < min_period || period > max_period {
      continue;
    }
    let p = pg.spectrum[i];
    let left = pg.spectrum[i - 1];
    let right = if i + 1 < n {
      pg.spectrum[i + 1]
    } else {
      f64::NEG_INFINITY
    };
    if p >= left && p >= right {
      peaks.push(SpectrumPeak {
        index: i,
        frequency: f,
        period,
        power: p,
      });
    }
  }

  peaks.sort_by(|a, b| b.power.total_cmp(&a.power));
  Ok(peaks)
}

#[cfg(test)]
mod tests {
  use super::periodogram;
  use super::spectrum_peaks;
  use super::PeriodogramConfig;

  fn sine_wave(period: f64, n: usize, amplitude: f64, phase: f64) -> Vec<f64> {
    (0..n)
      .map(|i| amplitude * (2.0 * std::f64::consts::PI * i as f64 / period + phase).sin())
      .collect()
  }

  #[test]
  fn periodogram_detects_single_tone_frequency() {
    let n = 960;
    let x = sine_wave(12.0, n, 1.0, 0.3);

    let pg = periodogram(&x, PeriodogramConfig { nfft: Some(n) }).unwrap();

    let (idx, _) = pg
      .spectrum
      .iter()
      .enumerate()
      .skip(1)
      .max_by(|a, b| a.1.total_cmp(b.1))
      .expect("periodogram must contain a peak");

    assert_eq!(idx, n / 12);
    assert!((pg.frequencies[idx] - 1.0 / 12.0).abs() < 1e-12);
  }

  #[test]
  fn peaks_are_sorted_by_power() {
    let n = 1200;
    let mut x = sine_wave(12.0, n, 1.0, 0.0);
    for (a, b) in x.iter_mut().zip(sine_wave(4.0, n, 0.4, 0.7)) {
      *a += b;
    }
    let peaks = spectrum_peaks(&x, PeriodogramConfig::default(), 2.0, 100.0).unwrap();
    assert!(peaks.len() >= 2, "{peaks:?}");
    assert!((peaks[0].period - 12.0).abs() < 0.5);
    assert!((peaks[1].period - 4.0).abs() < 0.5);
  }

  #[test]
  fn zero_padding_refines_the_frequency_grid() {
    let x = sine_wave(12.0, 240, 1.0, 0.0);
    let pg = periodogram(&x, PeriodogramConfig { nfft: Some(480) }).unwrap();
    assert_eq!(pg.nfft, 480);
    assert_eq!(pg.spectrum.len(), 241);
    assert!((pg.frequencies[1] - 1.0 / 480.0).abs() < 1e-15);
    assert!(periodogram(&x, PeriodogramConfig { nfft: Some(100) }).is_err());
  }

  #[test]
  fn constant_offset_does_not_reach_the_zero_frequency() {
    let x: Vec<f64> = sine_wave(8.0, 64, 1.0, 0.2).iter().map(|v| v + 5.0).collect();
    let pg = periodogram(&x, PeriodogramConfig::default()).unwrap();
    assert!(pg.spectrum[0] < 1e-20);
  }

  #[test]
  fn too_short_signal_is_rejected() {
    assert!(periodogram(&[1.0, 2.0, 3.0], PeriodogramConfig::default()).is_err());
  }
}
