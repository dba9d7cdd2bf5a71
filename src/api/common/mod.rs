//! Helpers shared by every API version.

pub mod tracing;

use crate::errors::AppError;

/// Parses a path identifier. Anything that is not a positive integer cannot
/// name a stored record, so it is reported as not found.
pub fn read_id_param(raw: &str) -> Result<i64, AppError> {
    match raw.parse::<i64>() {
        Ok(id) if id >= 1 => Ok(id),
        _ => Err(AppError::record_not_found()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_ids_parse() {
        assert_eq!(read_id_param("17").unwrap(), 17);
    }

    #[test]
    fn bad_ids_are_not_found() {
        for raw in ["0", "-3", "abc", "", "9223372036854775808"] {
            assert!(
                matches!(read_id_param(raw), Err(AppError::NotFound(_))),
                "{:?}",
                raw
            );
        }
    }
}
