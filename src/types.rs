//! Core IMU domain types
//!
//! This module names the things a recording is made of: which sensor produced
//! a channel, which axis it measures, where the unit was worn and which device
//! family it came from.
//!
//! # Main Types
//!
//! - [`SensorKind`] - Sensor family (accelerometer, gyrometer, ...) with its [`Unit`]
//! - [`Axis`] - X, Y or Z
//! - [`ImuChannel`] - One sensor axis, named by its node identifier (`accel_x`)
//! - [`ImuPosition`] - Body placement of the unit
//! - [`ImuDevice`] - Device family

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Physical unit of a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Unit {
    /// Standard gravity
    G,
    /// Degrees per second
    DegreesPerSecond,
    /// Microtesla
    MicroTesla,
    /// Kilopascal
    KiloPascal,
    Volt,
    Ampere,
}

impl Unit {
    pub fn symbol(&self) -> &'static str {
        match self {
            Unit::G => "g",
            Unit::DegreesPerSecond => "deg/s",
            Unit::MicroTesla => "µT",
            Unit::KiloPascal => "kPa",
            Unit::Volt => "V",
            Unit::Ampere => "A",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Sensor family carried by an IMU
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorKind {
    Accelerometer,
    Gyrometer,
    Magnetometer,
    Barometer,
    Battery,
    Current,
}

impl SensorKind {
    /// All sensor kinds, in catalogue order
    pub const ALL: [SensorKind; 6] = [
        SensorKind::Accelerometer,
        SensorKind::Gyrometer,
        SensorKind::Magnetometer,
        SensorKind::Barometer,
        SensorKind::Battery,
        SensorKind::Current,
    ];

    pub fn unit(&self) -> Unit {
        match self {
            SensorKind::Accelerometer => Unit::G,
            SensorKind::Gyrometer => Unit::DegreesPerSecond,
            SensorKind::Magnetometer => Unit::MicroTesla,
            SensorKind::Barometer => Unit::KiloPascal,
            SensorKind::Battery => Unit::Volt,
            SensorKind::Current => Unit::Ampere,
        }
    }

    /// Identifier prefix used for this sensor's nodes
    pub fn prefix(&self) -> &'static str {
        match self {
            SensorKind::Accelerometer => "accel",
            SensorKind::Gyrometer => "gyro",
            SensorKind::Magnetometer => "mag",
            SensorKind::Barometer => "baro",
            SensorKind::Battery => "battery",
            SensorKind::Current => "current",
        }
    }

    /// Whether the sensor reports three axes rather than a single scalar
    pub fn is_triaxial(&self) -> bool {
        matches!(
            self,
            SensorKind::Accelerometer | SensorKind::Gyrometer | SensorKind::Magnetometer
        )
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SensorKind::Accelerometer => "Accelerometer",
            SensorKind::Gyrometer => "Gyrometer",
            SensorKind::Magnetometer => "Magnetometer",
            SensorKind::Barometer => "Barometer",
            SensorKind::Battery => "Battery",
            SensorKind::Current => "Current",
        }
    }

    /// Node identifiers for every channel of this sensor
    pub fn channels(&self) -> Vec<ImuChannel> {
        if self.is_triaxial() {
            Axis::ALL
                .iter()
                .map(|axis| ImuChannel::axis(*self, *axis))
                .collect()
        } else {
            vec![ImuChannel::scalar(*self)]
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for SensorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        SensorKind::ALL
            .into_iter()
            .find(|k| k.prefix() == lower || k.display_name().to_ascii_lowercase() == lower)
            .ok_or_else(|| format!("unknown sensor '{}'", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn suffix(&self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        }
    }
}

/// One recorded channel: a sensor plus, for tri-axial sensors, an axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImuChannel {
    pub sensor: SensorKind,
    pub axis: Option<Axis>,
}

impl ImuChannel {
    pub const fn axis(sensor: SensorKind, axis: Axis) -> Self {
        Self {
            sensor,
            axis: Some(axis),
        }
    }

    pub const fn scalar(sensor: SensorKind) -> Self {
        Self { sensor, axis: None }
    }

    /// Accelerometer, gyrometer and magnetometer axes
    pub fn inertial() -> Vec<ImuChannel> {
        [
            SensorKind::Accelerometer,
            SensorKind::Gyrometer,
            SensorKind::Magnetometer,
        ]
        .iter()
        .flat_map(|s| s.channels())
        .collect()
    }

    /// Every channel of every sensor
    pub fn all() -> Vec<ImuChannel> {
        SensorKind::ALL.iter().flat_map(|s| s.channels()).collect()
    }

    /// Node identifier, e.g. `accel_x` or `baro`
    pub fn identifier(&self) -> String {
        match self.axis {
            Some(axis) => format!("{}_{}", self.sensor.prefix(), axis.suffix()),
            None => self.sensor.prefix().to_string(),
        }
    }

    /// Identifier of the derived norm node for a tri-axial sensor
    pub fn norm_identifier(sensor: SensorKind) -> String {
        format!("{}_norm", sensor.prefix())
    }

    pub fn unit(&self) -> Unit {
        self.sensor.unit()
    }
}

impl fmt::Display for ImuChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identifier())
    }
}

/// Body placement of the IMU during a recording
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImuPosition {
    #[default]
    Wrist,
    Ankle,
    Neck,
    Elbow,
    Knee,
    Hip,
    Head,
}

impl ImuPosition {
    pub const ALL: [ImuPosition; 7] = [
        ImuPosition::Wrist,
        ImuPosition::Ankle,
        ImuPosition::Neck,
        ImuPosition::Elbow,
        ImuPosition::Knee,
        ImuPosition::Hip,
        ImuPosition::Head,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            ImuPosition::Wrist => "Wrist",
            ImuPosition::Ankle => "Ankle",
            ImuPosition::Neck => "Neck",
            ImuPosition::Elbow => "Elbow",
            ImuPosition::Knee => "Knee",
            ImuPosition::Hip => "Hip",
            ImuPosition::Head => "Head",
        }
    }
}

impl fmt::Display for ImuPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for ImuPosition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ImuPosition::ALL
            .into_iter()
            .find(|p| p.display_name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown position '{}'", s))
    }
}

/// Device family that produced a recording
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ImuDevice {
    #[default]
    WimU,
    XSens,
    DelsysTrigno,
    Other(String),
}

impl ImuDevice {
    pub fn display_name(&self) -> &str {
        match self {
            ImuDevice::WimU => "WimU",
            ImuDevice::XSens => "XSens",
            ImuDevice::DelsysTrigno => "Delsys Trigno",
            ImuDevice::Other(name) => name,
        }
    }
}

impl fmt::Display for ImuDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for ImuDevice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();
        Ok(match compact.as_str() {
            "wimu" => ImuDevice::WimU,
            "xsens" => ImuDevice::XSens,
            "delsystrigno" | "trigno" => ImuDevice::DelsysTrigno,
            "" => return Err("device name is empty".to_string()),
            _ => ImuDevice::Other(s.trim().to_string()),
        })
    }
}
