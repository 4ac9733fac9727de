use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Cartesian three-vector (spins, positions, momenta, velocities).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Vec3(pub [f64; 3]);

impl Vec3 {
    /// Creates a vector from its components.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self([x, y, z])
    }

    /// Returns the components as an array.
    pub fn components(&self) -> [f64; 3] {
        self.0
    }

    /// Euclidean dot product.
    pub fn dot(&self, other: &Vec3) -> f64 {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| a * b)
            .sum()
    }

    /// Euclidean norm.
    pub fn norm(&self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Unit vector along `self`, or `None` for the zero vector.
    pub fn normalized(&self) -> Option<Vec3> {
        let norm = self.norm();
        if norm == 0.0 || !norm.is_finite() {
            return None;
        }
        Some(Vec3(self.0.map(|c| c / norm)))
    }
}

impl From<[f64; 3]> for Vec3 {
    fn from(value: [f64; 3]) -> Self {
        Self(value)
    }
}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [x, y, z] = self.0;
        write!(
            f,
            "{}, {}, {}",
            format_float(x),
            format_float(y),
            format_float(z)
        )
    }
}

/// A scalar that is either known exactly or only bounded from above.
///
/// `Exact(x)` and `UpperBound(x)` compare unequal even for the same `x`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bounded {
    /// Measured value.
    Exact(f64),
    /// The true value is at most this number.
    UpperBound(f64),
}

impl Bounded {
    /// Numeric payload regardless of qualification.
    pub fn value(&self) -> f64 {
        match self {
            Bounded::Exact(value) | Bounded::UpperBound(value) => *value,
        }
    }

    /// Whether the value is an upper bound.
    pub fn is_upper_bound(&self) -> bool {
        matches!(self, Bounded::UpperBound(_))
    }
}

impl fmt::Display for Bounded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bounded::Exact(value) => write!(f, "{}", format_float(*value)),
            Bounded::UpperBound(value) => write!(f, "<{}", format_float(*value)),
        }
    }
}

/// Type of compact object in the binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    /// Black hole, written `bh`.
    BlackHole,
    /// Neutron star, written `ns`.
    NeutronStar,
}

impl ObjectKind {
    /// Token used in metadata files.
    pub fn as_token(&self) -> &'static str {
        match self {
            ObjectKind::BlackHole => "bh",
            ObjectKind::NeutronStar => "ns",
        }
    }
}

impl FromStr for ObjectKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("bh") {
            Ok(ObjectKind::BlackHole)
        } else if s.eq_ignore_ascii_case("ns") {
            Ok(ObjectKind::NeutronStar)
        } else {
            Err(format!("expected `bh` or `ns`, found `{s}`"))
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_token())
    }
}

/// Renders a float with the shortest text that parses back to the same value.
///
/// Magnitudes outside `[1e-4, 1e16)` use exponent notation; integral values
/// keep a trailing `.0` so they never read as integers.
pub fn format_float(value: f64) -> String {
    if !value.is_finite() {
        return if value.is_nan() {
            "nan".into()
        } else if value > 0.0 {
            "inf".into()
        } else {
            "-inf".into()
        };
    }
    let magnitude = value.abs();
    if magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        return format!("{value:e}");
    }
    let text = value.to_string();
    if text.contains('.') {
        text
    } else {
        format!("{text}.0")
    }
}
