//! Field-keyed validation error accumulator.

use std::collections::HashMap;

use crate::errors::AppError;

#[derive(Debug, Default)]
pub struct Validator {
    pub errors: HashMap<String, String>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Records `message` under `field` unless the field already failed.
    pub fn add_error(&mut self, field: &str, message: &str) {
        self.errors
            .entry(field.to_string())
            .or_insert_with(|| message.to_string());
    }

    pub fn check(&mut self, ok: bool, field: &str, message: &str) {
        if !ok {
            self.add_error(field, message);
        }
    }

    /// Turns any recorded failures into an `AppError::Validation`.
    pub fn into_result(self) -> Result<(), AppError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self.errors))
        }
    }
}

pub fn permitted_value(value: &str, permitted: &[&str]) -> bool {
    permitted.contains(&value)
}
