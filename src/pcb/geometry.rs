//! Geometry primitives shared by board items.
//!
//! Coordinates are integer nanometres, matching the engine's internal units.

use std::ops::{Add, AddAssign};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A point or offset on the board, in nanometres.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Vector2 {
    /// X coordinate in nm.
    #[serde(default)]
    pub x_nm: i64,
    /// Y coordinate in nm.
    #[serde(default)]
    pub y_nm: i64,
}

impl Vector2 {
    /// Creates a vector from nanometre components.
    #[must_use]
    pub const fn from_xy(x_nm: i64, y_nm: i64) -> Self {
        Self { x_nm, y_nm }
    }
}

impl Add for Vector2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            x_nm: self.x_nm.saturating_add(rhs.x_nm),
            y_nm: self.y_nm.saturating_add(rhs.y_nm),
        }
    }
}

impl AddAssign for Vector2 {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl From<(i64, i64)> for Vector2 {
    fn from((x_nm, y_nm): (i64, i64)) -> Self {
        Self { x_nm, y_nm }
    }
}

/// An orientation in degrees, kept in `[0, 360)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Angle {
    /// Rotation in degrees, counter-clockwise.
    #[serde(default)]
    pub degrees: f64,
}

impl Angle {
    /// Creates an angle, normalising it into `[0, 360)`.
    #[must_use]
    pub fn from_degrees(degrees: f64) -> Self {
        Self {
            degrees: degrees.rem_euclid(360.0),
        }
    }
}

impl Add for Angle {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::from_degrees(self.degrees + rhs.degrees)
    }
}

impl AddAssign for Angle {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}
