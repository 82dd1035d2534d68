//! Numeric cell model with explicit missing-value propagation.
//!
//! A parsed cell is either a finite number or `Missing`. Arithmetic is defined
//! over both states: any operation touching `Missing` yields `Missing`, and
//! nothing is ever coerced to zero or NaN.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::iter::Sum;
use std::ops::{Add, Sub};

use crate::error::ReportError;

/// A parsed numeric cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Numeric {
    Value(f64),
    Missing,
}

impl Numeric {
    /// Wrap a float; NaN and infinities become `Missing`.
    pub fn new(value: f64) -> Self {
        if value.is_finite() {
            Numeric::Value(value)
        } else {
            Numeric::Missing
        }
    }

    pub fn value(self) -> Option<f64> {
        match self {
            Numeric::Value(v) => Some(v),
            Numeric::Missing => None,
        }
    }

    pub fn is_missing(self) -> bool {
        matches!(self, Numeric::Missing)
    }

    /// Division; a zero divisor yields `Missing`.
    pub fn checked_div(self, rhs: Numeric) -> Self {
        match (self, rhs) {
            (Numeric::Value(_), Numeric::Value(d)) if d == 0.0 => Numeric::Missing,
            (Numeric::Value(n), Numeric::Value(d)) => Numeric::new(n / d),
            _ => Numeric::Missing,
        }
    }

    /// Round to `decimals` places, halves rounding toward positive infinity.
    pub fn round_to(self, decimals: i32) -> Self {
        let factor = 10f64.powi(decimals);
        self.map(|v| (v * factor + 0.5).floor() / factor)
    }

    fn map(self, f: impl FnOnce(f64) -> f64) -> Self {
        match self {
            Numeric::Value(v) => Numeric::new(f(v)),
            Numeric::Missing => Numeric::Missing,
        }
    }

    fn zip(self, rhs: Numeric, f: impl FnOnce(f64, f64) -> f64) -> Self {
        match (self, rhs) {
            (Numeric::Value(a), Numeric::Value(b)) => Numeric::new(f(a, b)),
            _ => Numeric::Missing,
        }
    }
}

impl From<f64> for Numeric {
    fn from(value: f64) -> Self {
        Numeric::new(value)
    }
}

impl From<Option<f64>> for Numeric {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Numeric::Missing, Numeric::new)
    }
}

impl Sub for Numeric {
    type Output = Numeric;

    fn sub(self, rhs: Numeric) -> Numeric {
        self.zip(rhs, |a, b| a - b)
    }
}

impl Add for Numeric {
    type Output = Numeric;

    fn add(self, rhs: Numeric) -> Numeric {
        self.zip(rhs, |a, b| a + b)
    }
}

impl Sum for Numeric {
    fn sum<I: Iterator<Item = Numeric>>(iter: I) -> Self {
        iter.fold(Numeric::Value(0.0), Add::add)
    }
}

impl Serialize for Numeric {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Numeric::Value(v) => serializer.serialize_f64(*v),
            Numeric::Missing => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for Numeric {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<f64>::deserialize(deserializer).map(Numeric::from)
    }
}

/// An ordered run of numeric cells sliced from one row.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NumericVector(Vec<Numeric>);

impl NumericVector {
    pub fn new(values: Vec<Numeric>) -> Self {
        Self(values)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Numeric> {
        self.0.get(index).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = Numeric> + '_ {
        self.0.iter().copied()
    }

    pub fn as_slice(&self) -> &[Numeric] {
        &self.0
    }

    /// Element-wise `self - rhs`. Lengths must match exactly.
    pub fn checked_sub(&self, rhs: &NumericVector, context: &str) -> Result<Self, ReportError> {
        self.zip_with(rhs, context, |a, b| a - b)
    }

    /// Element-wise `self + rhs`. Lengths must match exactly.
    pub fn checked_add(&self, rhs: &NumericVector, context: &str) -> Result<Self, ReportError> {
        self.zip_with(rhs, context, |a, b| a + b)
    }

    fn zip_with(
        &self,
        rhs: &NumericVector,
        context: &str,
        f: impl Fn(Numeric, Numeric) -> Numeric,
    ) -> Result<Self, ReportError> {
        if self.len() != rhs.len() {
            return Err(ReportError::shape(context, self.len(), rhs.len()));
        }
        Ok(self.iter().zip(rhs.iter()).map(|(a, b)| f(a, b)).collect())
    }
}

impl FromIterator<Numeric> for NumericVector {
    fn from_iter<I: IntoIterator<Item = Numeric>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<Vec<f64>> for NumericVector {
    fn from(values: Vec<f64>) -> Self {
        values.into_iter().map(Numeric::new).collect()
    }
}

impl From<Vec<Option<f64>>> for NumericVector {
    fn from(values: Vec<Option<f64>>) -> Self {
        values.into_iter().map(Numeric::from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_finite_becomes_missing() {
        assert_eq!(Numeric::new(f64::NAN), Numeric::Missing);
        assert_eq!(Numeric::new(f64::INFINITY), Numeric::Missing);
        assert_eq!(Numeric::new(-3.5), Numeric::Value(-3.5));
    }

    #[test]
    fn missing_propagates_through_arithmetic() {
        let five = Numeric::Value(5.0);
        assert_eq!(five - Numeric::Missing, Numeric::Missing);
        assert_eq!(Numeric::Missing + five, Numeric::Missing);
        assert_eq!(Numeric::Missing.checked_div(five), Numeric::Missing);
        assert_eq!(Numeric::Missing.round_to(2), Numeric::Missing);
    }

    #[test]
    fn negative_difference_is_kept() {
        assert_eq!(Numeric::Value(40.0) - Numeric::Value(55.0), Numeric::Value(-15.0));
    }

    #[test]
    fn division_by_zero_is_missing() {
        assert_eq!(Numeric::Value(1.0).checked_div(Numeric::Value(0.0)), Numeric::Missing);
        assert_eq!(Numeric::Value(1.0).checked_div(Numeric::Value(4.0)), Numeric::Value(0.25));
    }

    #[test]
    fn rounding_halves_go_up() {
        assert_eq!(Numeric::Value(0.03125).round_to(4), Numeric::Value(0.0313));
        assert_eq!(Numeric::Value(-0.03125).round_to(4), Numeric::Value(-0.0312));
    }

    #[test]
    fn sum_of_missing_is_missing() {
        let total: Numeric = [Numeric::Value(1.0), Numeric::Missing, Numeric::Value(2.0)]
            .into_iter()
            .sum();
        assert_eq!(total, Numeric::Missing);
    }

    #[test]
    fn vector_subtraction_requires_equal_length() {
        let a = NumericVector::from(vec![1.0, 2.0]);
        let b = NumericVector::from(vec![1.0]);
        let err = a.checked_sub(&b, "test").unwrap_err();
        assert!(matches!(err, ReportError::ShapeMismatch { left: 2, right: 1, .. }));
    }

    #[test]
    fn serializes_missing_as_null() {
        let v = NumericVector::from(vec![Some(1.5), None]);
        assert_eq!(serde_json::to_string(&v).unwrap(), "[1.5,null]");
        let back: NumericVector = serde_json::from_str("[1.5,null]").unwrap();
        assert_eq!(back, v);
    }
}
