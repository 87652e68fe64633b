// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Parameter values carried by mechanisms.
//!
//! A parameter is either a plain scalar or an interval of admissible values
//! together with the representative value used as its default.

use core::fmt;
use serde::{Deserialize, Serialize};

use crate::error::{MechanismError, MechanismResult};

/// Closed interval `[lower, upper]` with a representative parameterization
///
/// Deserialization goes through [`ParameterInterval::new`], so a decoded
/// interval satisfies the same invariants as a constructed one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "IntervalBounds")]
pub struct ParameterInterval {
    lower: f64,
    upper: f64,
    value: f64,
}

/// Unchecked wire shape of [`ParameterInterval`]
#[derive(Deserialize)]
struct IntervalBounds {
    lower: f64,
    upper: f64,
    value: f64,
}

impl TryFrom<IntervalBounds> for ParameterInterval {
    type Error = MechanismError;

    fn try_from(bounds: IntervalBounds) -> MechanismResult<Self> {
        ParameterInterval::new(bounds.lower, bounds.upper, bounds.value)
    }
}

impl ParameterInterval {
    /// Create an interval, validating bounds and the representative value
    ///
    /// # Errors
    ///
    /// Returns error if any input is NaN or infinite, if `lower > upper`, or
    /// if `value` lies outside `[lower, upper]`.
    pub fn new(lower: f64, upper: f64, value: f64) -> MechanismResult<Self> {
        for (field, input) in [("lower", lower), ("upper", upper), ("value", value)] {
            if !input.is_finite() {
                return Err(MechanismError::NonFiniteInterval {
                    field,
                    value: input,
                });
            }
        }
        if lower > upper {
            return Err(MechanismError::InvalidInterval { lower, upper });
        }
        if value < lower || value > upper {
            return Err(MechanismError::ValueOutsideInterval {
                value,
                lower,
                upper,
            });
        }
        Ok(Self {
            lower,
            upper,
            value,
        })
    }

    /// Degenerate interval `[value, value]`
    pub fn exact(value: f64) -> Self {
        Self {
            lower: value,
            upper: value,
            value,
        }
    }

    pub fn lower(&self) -> f64 {
        self.lower
    }

    pub fn upper(&self) -> f64 {
        self.upper
    }

    pub fn representative(&self) -> f64 {
        self.value
    }

    /// Whether `value` lies within the closed interval
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }
}

impl fmt::Display for ParameterInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}] ({})", self.lower, self.upper, self.value)
    }
}

/// Value of a single mechanism parameter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    Scalar(f64),
    Interval(ParameterInterval),
}

impl ParameterValue {
    /// Value used when the parameter is written into a default-parameter table
    pub fn representative(&self) -> f64 {
        match self {
            ParameterValue::Scalar(value) => *value,
            ParameterValue::Interval(interval) => interval.representative(),
        }
    }

    pub fn is_interval(&self) -> bool {
        matches!(self, ParameterValue::Interval(_))
    }
}

impl From<f64> for ParameterValue {
    fn from(value: f64) -> Self {
        ParameterValue::Scalar(value)
    }
}

impl From<ParameterInterval> for ParameterValue {
    fn from(interval: ParameterInterval) -> Self {
        ParameterValue::Interval(interval)
    }
}

impl Default for ParameterValue {
    fn default() -> Self {
        ParameterValue::Scalar(0.0)
    }
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterValue::Scalar(value) => write!(f, "{}", value),
            ParameterValue::Interval(interval) => write!(f, "{}", interval),
        }
    }
}
