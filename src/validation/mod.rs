//! Aggregating validation.
//!
//! A [`Validator`] runs every registered condition in registration order and
//! reports every failure at once, so one request can be answered with the
//! complete list of invalid fields.

pub mod conditions;
pub mod country;

use serde::Serialize;
use thiserror::Error;

/// One violated field-level rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("invalid spot id")]
    InvalidSpotId,
    #[error("spot name must not be empty")]
    InvalidSpotName,
    #[error("latitude must be between -90 and 90")]
    InvalidLatitude,
    #[error("longitude must be between -180 and 180")]
    InvalidLongitude,
    #[error("locality must not be empty")]
    InvalidLocality,
    #[error("invalid country code")]
    InvalidCountryCode,
    #[error("search query is too long")]
    InvalidSearchQuery,
    #[error("north-east latitude must be between -90 and 90")]
    InvalidNorthEastLatitude,
    #[error("north-east longitude must be between -180 and 180")]
    InvalidNorthEastLongitude,
    #[error("south-west latitude must be between -90 and 90")]
    InvalidSouthWestLatitude,
    #[error("south-west longitude must be between -180 and 180")]
    InvalidSouthWestLongitude,
    #[error("invalid e-mail address")]
    InvalidEmail,
    #[error("password must be at least 8 characters long")]
    InvalidPassword,
    #[error("unknown role")]
    InvalidRole,
}

impl FieldError {
    /// Request field the rule applies to, as the HTTP layer names it.
    pub fn field(&self) -> &'static str {
        match self {
            FieldError::InvalidSpotId => "id",
            FieldError::InvalidSpotName => "name",
            FieldError::InvalidLatitude => "latitude",
            FieldError::InvalidLongitude => "longitude",
            FieldError::InvalidLocality => "locality",
            FieldError::InvalidCountryCode => "country_code",
            FieldError::InvalidSearchQuery => "query",
            FieldError::InvalidNorthEastLatitude => "ne_lat",
            FieldError::InvalidNorthEastLongitude => "ne_lon",
            FieldError::InvalidSouthWestLatitude => "sw_lat",
            FieldError::InvalidSouthWestLongitude => "sw_lon",
            FieldError::InvalidEmail => "email",
            FieldError::InvalidPassword => "password",
            FieldError::InvalidRole => "role",
        }
    }

    pub fn violation(&self) -> FieldViolation {
        FieldViolation {
            field: self.field().to_string(),
            message: self.to_string(),
        }
    }
}

/// Wire form of a [`FieldError`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

/// Every failed rule of one input, in registration order. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("validation failed: {}", describe(.0))]
pub struct ValidationErrors(Vec<FieldError>);

fn describe(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    pub fn contains(&self, error: FieldError) -> bool {
        self.0.contains(&error)
    }

    pub fn violations(&self) -> Vec<FieldViolation> {
        self.0.iter().map(FieldError::violation).collect()
    }

    pub fn into_inner(self) -> Vec<FieldError> {
        self.0
    }
}

impl From<FieldError> for ValidationErrors {
    fn from(error: FieldError) -> Self {
        Self(vec![error])
    }
}

type Condition<'a> = Box<dyn FnOnce() -> bool + Send + 'a>;

/// Ordered list of `(condition, error)` pairs.
///
/// Conditions close over values that were already sanitized and must be free
/// of side effects; they are only evaluated by [`Validator::validate`].
#[derive(Default)]
pub struct Validator<'a> {
    checks: Vec<(Condition<'a>, FieldError)>,
}

impl<'a> Validator<'a> {
    pub fn new() -> Self {
        Self { checks: Vec::new() }
    }

    pub fn register<F>(&mut self, condition: F, error: FieldError) -> &mut Self
    where
        F: FnOnce() -> bool + Send + 'a,
    {
        self.checks.push((Box::new(condition), error));
        self
    }

    /// Registers `condition` only when `value` is present.
    pub fn register_some<T, F>(&mut self, value: Option<T>, condition: F, error: FieldError) -> &mut Self
    where
        T: Send + 'a,
        F: FnOnce(T) -> bool + Send + 'a,
    {
        if let Some(value) = value {
            self.register(move || condition(value), error);
        }
        self
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    /// Evaluates every condition and collects the errors of those that failed.
    pub fn validate(self) -> Result<(), ValidationErrors> {
        let failed: Vec<FieldError> = self
            .checks
            .into_iter()
            .filter_map(|(condition, error)| if condition() { None } else { Some(error) })
            .collect();

        if failed.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(failed))
        }
    }
}

/// Single-shot form of [`Validator`].
pub fn validate_one<F>(condition: F, error: FieldError) -> Result<(), FieldError>
where
    F: FnOnce() -> bool,
{
    if condition() {
        Ok(())
    } else {
        Err(error)
    }
}
