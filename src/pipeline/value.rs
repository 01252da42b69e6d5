//! Node payloads.
//!
//! Every node holds exactly one value of a type implementing [`Payload`].
//! Observers that don't know a node's concrete type read it through its
//! [`Sample`] snapshot instead.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A value a node can hold.
///
/// `Default` is the value returned by a read before any write.
pub trait Payload: Clone + Default + fmt::Debug + Send + 'static {
    /// Erased snapshot of this value.
    fn to_sample(&self) -> Sample;

    /// Recover a typed value from a sample. Returns `None` on a variant or range
    /// mismatch; no coercion between variants is performed.
    fn from_sample(sample: &Sample) -> Option<Self>;
}

/// Type-erased node value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Sample {
    Int(i64),
    Float(f64),
    Bool(bool),
    Vector(Vector3),
}

impl Sample {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Sample::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Sample::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Sample::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_vector(&self) -> Option<Vector3> {
        match self {
            Sample::Vector(v) => Some(*v),
            _ => None,
        }
    }

    /// Scalar view used for plotting and summaries. Vectors report their norm.
    pub fn as_f64(&self) -> f64 {
        match self {
            Sample::Int(v) => *v as f64,
            Sample::Float(v) => *v,
            Sample::Bool(v) => {
                if *v {
                    1.0
                } else {
                    0.0
                }
            }
            Sample::Vector(v) => v.norm(),
        }
    }

    /// Short name of the variant, used in type mismatch errors.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Sample::Int(_) => "int",
            Sample::Float(_) => "float",
            Sample::Bool(_) => "bool",
            Sample::Vector(_) => "vector",
        }
    }
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sample::Int(v) => write!(f, "{}", v),
            Sample::Float(v) => write!(f, "{:.4}", v),
            Sample::Bool(v) => write!(f, "{}", v),
            Sample::Vector(v) => write!(f, "({:.4}, {:.4}, {:.4})", v.x, v.y, v.z),
        }
    }
}

/// Three-axis aggregate payload (one IMU sensor reading).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean norm.
    pub fn norm(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

macro_rules! int_payload {
    ($($ty:ty),*) => {
        $(
            impl Payload for $ty {
                fn to_sample(&self) -> Sample {
                    Sample::Int(i64::from(*self))
                }

                fn from_sample(sample: &Sample) -> Option<Self> {
                    sample.as_int().and_then(|v| <$ty>::try_from(v).ok())
                }
            }
        )*
    };
}

int_payload!(i8, i16, i32, i64, u8, u16, u32);

impl Payload for f64 {
    fn to_sample(&self) -> Sample {
        Sample::Float(*self)
    }

    fn from_sample(sample: &Sample) -> Option<Self> {
        sample.as_float()
    }
}

impl Payload for f32 {
    fn to_sample(&self) -> Sample {
        Sample::Float(f64::from(*self))
    }

    fn from_sample(sample: &Sample) -> Option<Self> {
        sample
            .as_float()
            .filter(|v| !v.is_finite() || v.abs() <= f64::from(f32::MAX))
            .map(|v| v as f32)
    }
}

impl Payload for bool {
    fn to_sample(&self) -> Sample {
        Sample::Bool(*self)
    }

    fn from_sample(sample: &Sample) -> Option<Self> {
        sample.as_bool()
    }
}

impl Payload for Vector3 {
    fn to_sample(&self) -> Sample {
        Sample::Vector(*self)
    }

    fn from_sample(sample: &Sample) -> Option<Self> {
        sample.as_vector()
    }
}
