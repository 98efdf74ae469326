//! Feature vector handed to the classifier.
//!
//! Positions are fixed: `[pclass, sex, age, fare]`. Values are converted but
//! never range-checked; whatever the caller sends reaches the model.

use serde_json::Value;
use thiserror::Error;

pub const FEATURE_COUNT: usize = 4;

pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = ["pclass", "sex", "age", "fare"];

#[derive(Debug, Error, PartialEq)]
pub enum FeatureError {
    #[error("missing field '{0}'")]
    Missing(&'static str),

    #[error("field '{field}' must be an integer, got '{value}'")]
    InvalidInteger { field: &'static str, value: String },

    #[error("field '{field}' must be a number, got '{value}'")]
    InvalidNumber { field: &'static str, value: String },

    #[error("Expected 4 features: [Pclass, Sex, Age, Fare]")]
    WrongLength(usize),

    #[error("feature {index} ({name}) must be a number")]
    NotNumeric { index: usize, name: &'static str },
}

/// Raw fields as submitted by the browser form. Every field is optional so
/// that a missing input is reported on the page instead of rejected up front.
#[derive(Debug, Default, PartialEq)]
pub struct PassengerForm {
    pub pclass: Option<String>,
    pub sex: Option<String>,
    pub age: Option<String>,
    pub fare: Option<String>,
}

impl PassengerForm {
    /// Collect the known fields from decoded name/value pairs. When a name
    /// repeats, the first value wins; unknown names are ignored.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut form = Self::default();
        for (name, value) in pairs {
            let slot = match name.as_ref() {
                "pclass" => &mut form.pclass,
                "sex" => &mut form.sex,
                "age" => &mut form.age,
                "fare" => &mut form.fare,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into());
            }
        }
        form
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn new(pclass: i64, sex: i64, age: f64, fare: f64) -> Self {
        Self([pclass as f64, sex as f64, age, fare])
    }

    pub fn from_values(values: [f64; FEATURE_COUNT]) -> Self {
        Self(values)
    }

    pub fn from_form(form: &PassengerForm) -> Result<Self, FeatureError> {
        let pclass = parse_integer("pclass", form.pclass.as_deref())?;
        let sex = parse_integer("sex", form.sex.as_deref())?;
        let age = parse_number("age", form.age.as_deref())?;
        let fare = parse_number("fare", form.fare.as_deref())?;

        Ok(Self::new(pclass, sex, age, fare))
    }

    pub fn from_json(values: &[Value]) -> Result<Self, FeatureError> {
        if values.len() != FEATURE_COUNT {
            return Err(FeatureError::WrongLength(values.len()));
        }

        let mut out = [0.0; FEATURE_COUNT];
        for (index, value) in values.iter().enumerate() {
            out[index] = value
                .as_f64()
                .ok_or(FeatureError::NotNumeric {
                    index,
                    name: FEATURE_NAMES[index],
                })?;
        }

        Ok(Self(out))
    }

    pub fn values(&self) -> &[f64; FEATURE_COUNT] {
        &self.0
    }

    pub fn pclass(&self) -> f64 {
        self.0[0]
    }

    pub fn sex(&self) -> f64 {
        self.0[1]
    }

    pub fn age(&self) -> f64 {
        self.0[2]
    }

    pub fn fare(&self) -> f64 {
        self.0[3]
    }
}

fn required<'a>(field: &'static str, raw: Option<&'a str>) -> Result<&'a str, FeatureError> {
    match raw.map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(FeatureError::Missing(field)),
    }
}

fn parse_integer(field: &'static str, raw: Option<&str>) -> Result<i64, FeatureError> {
    let value = required(field, raw)?;
    value.parse().map_err(|_| FeatureError::InvalidInteger {
        field,
        value: value.to_string(),
    })
}

fn parse_number(field: &'static str, raw: Option<&str>) -> Result<f64, FeatureError> {
    let value = required(field, raw)?;
    value.parse().map_err(|_| FeatureError::InvalidNumber {
        field,
        value: value.to_string(),
    })
}
