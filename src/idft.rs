//! Inverse DFT synthesis over a small, fixed set of frequency components.
//!
//! Each call to [`Idft::calc`] evaluates the sum of sinusoids at evenly spaced
//! sample points starting from the current time offset, then nudges the
//! offset forward so the next call sees a slightly later wave.

use std::collections::TryReserveError;
use std::str::FromStr;

use thiserror::Error;

/// One frequency component (angular frequency + sine/cosine amplitudes)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Magnitude {
    pub frequency: f64,
    pub sine: f64,
    pub cosine: f64,
}

impl Magnitude {
    pub const fn new(frequency: f64, sine: f64, cosine: f64) -> Self {
        Self {
            frequency,
            sine,
            cosine,
        }
    }

    /// Contribution of this component at time `t`
    pub fn eval(&self, t: f64) -> f64 {
        let phase = t * self.frequency;
        self.sine * phase.sin() + self.cosine * phase.cos()
    }
}

/// Errors from parsing `frequency:sine:cosine`
#[derive(Debug, Error, PartialEq)]
pub enum MagnitudeParseError {
    #[error("expected `frequency:sine:cosine`, got `{0}`")]
    Format(String),

    #[error("invalid number `{0}`")]
    Number(String),

    #[error("component values must be finite")]
    NonFinite,
}

impl FromStr for Magnitude {
    type Err = MagnitudeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').map(str::trim).collect();
        let [frequency, sine, cosine] = parts.as_slice() else {
            return Err(MagnitudeParseError::Format(s.to_string()));
        };

        let parse = |v: &str| {
            v.parse::<f64>()
                .map_err(|_| MagnitudeParseError::Number(v.to_string()))
        };
        let mag = Magnitude::new(parse(*frequency)?, parse(*sine)?, parse(*cosine)?);

        if !(mag.frequency.is_finite() && mag.sine.is_finite() && mag.cosine.is_finite()) {
            return Err(MagnitudeParseError::NonFinite);
        }
        Ok(mag)
    }
}

/// Errors from the synthesis module
#[derive(Debug, Error)]
pub enum IdftError {
    #[error("at least one magnitude is required")]
    NoMagnitudes,

    #[error("output buffer is empty")]
    EmptyOutput,

    #[error("not enough memory for magnitude table: {0}")]
    OutOfMemory(#[from] TryReserveError),
}

/// Inverse DFT state: private magnitude table plus running time offset
#[derive(Debug, Clone)]
pub struct Idft {
    magnitudes: Vec<Magnitude>,
    time: f64,
    sample_step: f64,
    time_step: f64,
}

impl Idft {
    /// Distance in time between consecutive output samples
    pub const DEFAULT_SAMPLE_STEP: f64 = 0.05;

    /// Time advance applied after every [`Idft::calc`]
    pub const DEFAULT_TIME_STEP: f64 = 0.0001;

    /// Copy `magnitudes` into a new synthesizer with time at zero
    pub fn new(magnitudes: &[Magnitude]) -> Result<Self, IdftError> {
        if magnitudes.is_empty() {
            return Err(IdftError::NoMagnitudes);
        }

        let mut owned = Vec::new();
        owned.try_reserve_exact(magnitudes.len())?;
        owned.extend_from_slice(magnitudes);

        Ok(Self {
            magnitudes: owned,
            time: 0.0,
            sample_step: Self::DEFAULT_SAMPLE_STEP,
            time_step: Self::DEFAULT_TIME_STEP,
        })
    }

    /// Override the sample spacing and per-call time advance
    pub fn with_steps(mut self, sample_step: f64, time_step: f64) -> Self {
        self.sample_step = sample_step;
        self.time_step = time_step;
        self
    }

    /// Sum of all components at time `t`
    pub fn point(&self, t: f64) -> f64 {
        self.magnitudes.iter().map(|m| m.eval(t)).sum()
    }

    /// Fill `out` with samples starting at the current time, then advance time
    pub fn calc(&mut self, out: &mut [f64]) -> Result<(), IdftError> {
        if out.is_empty() {
            return Err(IdftError::EmptyOutput);
        }

        for (i, sample) in out.iter_mut().enumerate() {
            *sample = self.point(self.time + i as f64 * self.sample_step);
        }

        self.time += self.time_step;
        Ok(())
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn magnitudes(&self) -> &[Magnitude] {
        &self.magnitudes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    fn default_table() -> Vec<Magnitude> {
        vec![
            Magnitude::new(2.0, 0.0, 2.5),
            Magnitude::new(4.0, 1.25, 0.0),
            Magnitude::new(6.0, 0.0, 0.625),
        ]
    }

    #[test]
    fn test_new_rejects_empty_table() {
        assert!(matches!(Idft::new(&[]), Err(IdftError::NoMagnitudes)));
    }

    #[test]
    fn test_new_copies_table() {
        let mut table = default_table();
        let idft = Idft::new(&table).unwrap();
        table[0].cosine = 100.0;

        assert_eq!(idft.magnitudes()[0].cosine, 2.5);
        assert_eq!(idft.time(), 0.0);
    }

    #[test]
    fn test_point_at_zero_is_sum_of_cosines() {
        let idft = Idft::new(&default_table()).unwrap();
        assert!((idft.point(0.0) - 3.125).abs() < EPS);
    }

    #[test]
    fn test_point_matches_closed_form() {
        let idft = Idft::new(&default_table()).unwrap();
        let t = 0.37_f64;
        let expected = 2.5 * (2.0 * t).cos() + 1.25 * (4.0 * t).sin() + 0.625 * (6.0 * t).cos();
        assert!((idft.point(t) - expected).abs() < EPS);
    }

    #[test]
    fn test_calc_samples_and_advances_time() {
        let mut idft = Idft::new(&default_table()).unwrap();
        let mut out = [0.0; 100];

        idft.calc(&mut out).unwrap();
        assert!((out[0] - 3.125).abs() < EPS);
        assert!((out[10] - idft.point(0.5)).abs() < EPS);
        assert!((idft.time() - Idft::DEFAULT_TIME_STEP).abs() < EPS);

        // Second call starts from the advanced time
        idft.calc(&mut out).unwrap();
        assert!((out[0] - idft.point(Idft::DEFAULT_TIME_STEP)).abs() < EPS);
        assert!((idft.time() - 2.0 * Idft::DEFAULT_TIME_STEP).abs() < EPS);
    }

    #[test]
    fn test_calc_time_advance_ignores_output_length() {
        let mut short = Idft::new(&default_table()).unwrap();
        let mut long = short.clone();

        short.calc(&mut [0.0; 1]).unwrap();
        long.calc(&mut [0.0; 1000]).unwrap();

        assert_eq!(short.time(), long.time());
    }

    #[test]
    fn test_calc_rejects_empty_output_without_advancing() {
        let mut idft = Idft::new(&default_table()).unwrap();
        assert!(matches!(idft.calc(&mut []), Err(IdftError::EmptyOutput)));
        assert_eq!(idft.time(), 0.0);
    }

    #[test]
    fn test_custom_steps() {
        let mut idft = Idft::new(&[Magnitude::new(1.0, 1.0, 0.0)])
            .unwrap()
            .with_steps(0.5, 1.0);
        let mut out = [0.0; 3];

        idft.calc(&mut out).unwrap();
        assert!((out[2] - 1.0f64.sin()).abs() < EPS);

        idft.calc(&mut out).unwrap();
        assert!((out[0] - 1.0f64.sin()).abs() < EPS);
    }

    #[test]
    fn test_parse_magnitude() {
        let mag: Magnitude = "4:1.25:0".parse().unwrap();
        assert_eq!(mag, Magnitude::new(4.0, 1.25, 0.0));

        let spaced: Magnitude = " 2 : 0 : 2.5 ".parse().unwrap();
        assert_eq!(spaced, Magnitude::new(2.0, 0.0, 2.5));
    }

    #[test]
    fn test_parse_magnitude_errors() {
        assert!(matches!(
            "1:2".parse::<Magnitude>(),
            Err(MagnitudeParseError::Format(_))
        ));
        assert!(matches!(
            "1:x:3".parse::<Magnitude>(),
            Err(MagnitudeParseError::Number(_))
        ));
        assert_eq!(
            "inf:0:1".parse::<Magnitude>(),
            Err(MagnitudeParseError::NonFinite)
        );
    }
}
