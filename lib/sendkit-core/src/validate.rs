//! Fail-fast parameter validation.
//!
//! Every request runs [`Validatable::validate`] on its parameters before
//! anything is sent. Containers check their own rules first, then each child
//! in declaration order, and stop at the first violation.
//!
//! The free functions in this module are the building blocks used by
//! hand-written impls and by `#[derive(Validate)]`.

use std::fmt::Display;
use std::ops::RangeInclusive;

use serde::Serialize;

use crate::{Timestamp, ValidationError};

/// Capability of checking business rules before dispatch.
pub trait Validatable {
    /// Succeeds silently, or fails with the first violated rule.
    fn validate(&self) -> Result<(), ValidationError>;
}

impl Validatable for () {
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

impl<T: Validatable + ?Sized> Validatable for &T {
    fn validate(&self) -> Result<(), ValidationError> {
        (**self).validate()
    }
}

impl<T: Validatable + ?Sized> Validatable for Box<T> {
    fn validate(&self) -> Result<(), ValidationError> {
        (**self).validate()
    }
}

impl<T: Validatable> Validatable for Option<T> {
    fn validate(&self) -> Result<(), ValidationError> {
        self.as_ref().map_or(Ok(()), Validatable::validate)
    }
}

impl<T: Validatable> Validatable for [T] {
    fn validate(&self) -> Result<(), ValidationError> {
        self.iter().try_for_each(Validatable::validate)
    }
}

impl<T: Validatable> Validatable for Vec<T> {
    fn validate(&self) -> Result<(), ValidationError> {
        self.as_slice().validate()
    }
}

// ============================================================================
// Validators
// ============================================================================

/// Check the syntax of an email address.
///
/// Accepts `local@domain` where the local part uses letters, digits and
/// `._%+-`, and the domain has at least one dot and ends with an alphabetic
/// top-level label of 2 to 64 characters.
pub fn email(value: &str) -> Result<(), ValidationError> {
    if is_email(value) {
        Ok(())
    } else {
        Err(ValidationError::MalformedEmailAddress(value.to_string()))
    }
}

fn is_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    let local_ok = !local.is_empty()
        && local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "._%+-".contains(c));
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    let host_ok = !host.is_empty()
        && !host.starts_with('.')
        && host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-');
    let tld_ok = (2..=64).contains(&tld.len()) && tld.chars().all(|c| c.is_ascii_alphabetic());

    local_ok && host_ok && tld_ok
}

/// Check that a numeric value lies inside an inclusive range.
pub fn range<T: Into<i64>>(value: T, allowed: RangeInclusive<i64>) -> Result<(), ValidationError> {
    let value = value.into();
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::LimitOutOfRange {
            value,
            range: allowed,
        })
    }
}

/// Check the number of items of a collection.
pub fn count(
    field: &'static str,
    len: usize,
    allowed: RangeInclusive<usize>,
) -> Result<(), ValidationError> {
    if allowed.contains(&len) {
        Ok(())
    } else {
        Err(ValidationError::InvalidCount {
            field,
            count: len,
            range: allowed,
        })
    }
}

/// Check that `end` is not before `start`.
pub fn date_order<T: PartialOrd + Display>(start: &T, end: &T) -> Result<(), ValidationError> {
    if end < start {
        Err(ValidationError::InvalidEndDate {
            start: start.to_string(),
            end: end.to_string(),
        })
    } else {
        Ok(())
    }
}

// ============================================================================
// Date Range
// ============================================================================

/// Optional `start_time`/`end_time` filter shared by list endpoints.
///
/// Flatten it into a parameter struct with `#[serde(flatten)]`; absent bounds
/// are omitted from the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DateRange {
    /// Inclusive lower bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<Timestamp>,
    /// Inclusive upper bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<Timestamp>,
}

impl DateRange {
    /// Range with both bounds.
    #[must_use]
    pub const fn between(start: Timestamp, end: Timestamp) -> Self {
        Self {
            start_time: Some(start),
            end_time: Some(end),
        }
    }

    /// Range open on the upper side.
    #[must_use]
    pub const fn since(start: Timestamp) -> Self {
        Self {
            start_time: Some(start),
            end_time: None,
        }
    }
}

impl Validatable for DateRange {
    fn validate(&self) -> Result<(), ValidationError> {
        match (&self.start_time, &self.end_time) {
            (Some(start), Some(end)) => date_order(start, end),
            _ => Ok(()),
        }
    }
}
