//! Synthetic IMU signal source
//!
//! Stands in for a device loop: produces one value per channel per sample
//! period so a graph can be exercised without hardware.
//!
//! # Patterns
//!
//! - [`SignalPattern::Constant`] - Fixed value
//! - [`SignalPattern::Sine`] - Sinusoid with frequency, amplitude and offset
//! - [`SignalPattern::Square`] - Square wave
//! - [`SignalPattern::Triangle`] - Triangle wave
//! - [`SignalPattern::Sawtooth`] - Rising sawtooth

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::time::Duration;

use crate::types::{Axis, ImuChannel, SensorKind};

/// Waveform of one channel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SignalPattern {
    Constant(f64),
    Sine {
        frequency: f64,
        amplitude: f64,
        offset: f64,
    },
    Square { period: f64, amplitude: f64 },
    Triangle { period: f64, amplitude: f64 },
    Sawtooth { period: f64, amplitude: f64 },
}

impl Default for SignalPattern {
    fn default() -> Self {
        SignalPattern::Sine {
            frequency: 1.0,
            amplitude: 1.0,
            offset: 0.0,
        }
    }
}

impl SignalPattern {
    /// Length of one cycle in seconds. `None` for constants and degenerate
    /// patterns.
    pub fn period(&self) -> Option<f64> {
        let period = match *self {
            SignalPattern::Constant(_) => return None,
            SignalPattern::Sine { frequency, .. } => {
                if frequency <= 0.0 {
                    return None;
                }
                1.0 / frequency
            }
            SignalPattern::Square { period, .. }
            | SignalPattern::Triangle { period, .. }
            | SignalPattern::Sawtooth { period, .. } => period,
        };
        (period > 0.0).then_some(period)
    }

    /// Value at `t` seconds
    pub fn value_at(&self, t: f64) -> f64 {
        match *self {
            SignalPattern::Constant(v) => v,
            SignalPattern::Sine {
                frequency,
                amplitude,
                offset,
            } => offset + amplitude * (2.0 * PI * frequency * t).sin(),
            SignalPattern::Square { period, amplitude } => {
                if period <= 0.0 {
                    return 0.0;
                }
                if t.rem_euclid(period) < period / 2.0 {
                    amplitude
                } else {
                    -amplitude
                }
            }
            SignalPattern::Triangle { period, amplitude } => {
                if period <= 0.0 {
                    return 0.0;
                }
                let t = t.rem_euclid(period);
                let half = period / 2.0;
                if t < half {
                    amplitude * (2.0 * t / half - 1.0)
                } else {
                    amplitude * (1.0 - 2.0 * (t - half) / half)
                }
            }
            SignalPattern::Sawtooth { period, amplitude } => {
                if period <= 0.0 {
                    return 0.0;
                }
                amplitude * (t.rem_euclid(period) / period)
            }
        }
    }
}

/// One generated channel
#[derive(Debug, Clone)]
pub struct SignalChannel {
    pub identifier: String,
    pub pattern: SignalPattern,
    /// Time shift in seconds, so the axes of one sensor differ
    pub phase: f64,
}

/// Multi-channel signal source with optional uniform noise
#[derive(Debug, Clone)]
pub struct SignalSource {
    channels: Vec<SignalChannel>,
    noise_amplitude: f64,
    seed: u64,
}

impl SignalSource {
    pub fn new() -> Self {
        Self {
            channels: Vec::new(),
            noise_amplitude: 0.0,
            seed: 0x2545_F491_4F6C_DD1D,
        }
    }

    /// One channel per axis of each sensor, using `pattern` for every axis with
    /// a quarter-period phase step between axes. Scalar sensors get a constant
    /// at a plausible resting value.
    pub fn for_sensors(sensors: &[SensorKind], pattern: SignalPattern) -> Self {
        let mut source = Self::new();
        for sensor in sensors {
            for channel in sensor.channels() {
                let step = match channel.axis {
                    Some(Axis::X) | None => 0.0,
                    Some(Axis::Y) => 0.25,
                    Some(Axis::Z) => 0.5,
                };
                let pattern = if sensor.is_triaxial() {
                    pattern
                } else {
                    SignalPattern::Constant(resting_value(*sensor))
                };
                let phase = pattern.period().map_or(0.0, |period| step * period);
                source.add_channel(channel, pattern, phase);
            }
        }
        source
    }

    pub fn add_channel(&mut self, channel: ImuChannel, pattern: SignalPattern, phase: f64) {
        self.channels.push(SignalChannel {
            identifier: channel.identifier(),
            pattern,
            phase,
        });
    }

    pub fn with_noise(mut self, amplitude: f64) -> Self {
        self.noise_amplitude = amplitude.max(0.0);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed.max(1);
        self
    }

    pub fn channels(&self) -> &[SignalChannel] {
        &self.channels
    }

    /// Values of every channel at `elapsed`, in channel order
    pub fn sample(&mut self, elapsed: Duration) -> Vec<(String, f64)> {
        let t = elapsed.as_secs_f64();
        let mut out = Vec::with_capacity(self.channels.len());
        for i in 0..self.channels.len() {
            let channel = &self.channels[i];
            let base = channel.pattern.value_at(t + channel.phase);
            let identifier = channel.identifier.clone();
            let value = if self.noise_amplitude > 0.0 {
                base + (self.next_unit() - 0.5) * 2.0 * self.noise_amplitude
            } else {
                base
            };
            out.push((identifier, value));
        }
        out
    }

    /// xorshift64, in `[0, 1]`
    fn next_unit(&mut self) -> f64 {
        let mut s = self.seed;
        s ^= s << 13;
        s ^= s >> 7;
        s ^= s << 17;
        self.seed = s;
        (s as f64) / (u64::MAX as f64)
    }
}

impl Default for SignalSource {
    fn default() -> Self {
        Self::new()
    }
}

fn resting_value(sensor: SensorKind) -> f64 {
    match sensor {
        SensorKind::Barometer => 101.325,
        SensorKind::Battery => 3.7,
        SensorKind::Current => 0.05,
        _ => 0.0,
    }
}
