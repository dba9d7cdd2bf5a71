//! Pagination and sorting parameters for list endpoints.
//!
//! Raw query parameters are resolved into [`Filters`] while every problem is
//! recorded on a [`Validator`]; the filters must not reach SQL unless the
//! validator stayed empty.

use std::collections::HashMap;

use serde::Serialize;

use crate::errors::AppError;
use crate::validator::{permitted_value, Validator};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE: i64 = 10_000_000;
pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Clone)]
pub struct Filters {
    pub page: i64,
    pub page_size: i64,
    pub sort: String,
    pub sort_safelist: &'static [&'static str],
}

impl Filters {
    /// Reads `page`, `page_size` and `sort` from the query string, falling
    /// back to defaults, and validates the result.
    pub fn from_query(
        params: &HashMap<String, String>,
        default_sort: &str,
        sort_safelist: &'static [&'static str],
        v: &mut Validator,
    ) -> Self {
        let filters = Filters {
            page: read_int(params, "page", DEFAULT_PAGE, v),
            page_size: read_int(params, "page_size", DEFAULT_PAGE_SIZE, v),
            sort: read_string(params, "sort", default_sort),
            sort_safelist,
        };
        validate_filters(v, &filters);
        filters
    }

    /// Column to order by. Only ever returns an entry of the safelist.
    pub fn sort_column(&self) -> Result<&'static str, AppError> {
        self.sort_safelist
            .iter()
            .copied()
            .find(|safe| *safe == self.sort)
            .map(|safe| safe.trim_start_matches('-'))
            .ok_or_else(|| {
                AppError::Unexpected(anyhow::anyhow!("unsafe sort parameter: {}", self.sort))
            })
    }

    pub fn sort_direction(&self) -> &'static str {
        if self.sort.starts_with('-') {
            "DESC"
        } else {
            "ASC"
        }
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.page_size
    }
}

pub fn validate_filters(v: &mut Validator, f: &Filters) {
    v.check(f.page > 0, "page", "must be greater than zero");
    v.check(f.page <= MAX_PAGE, "page", "must be a maximum of 10 million");
    v.check(f.page_size > 0, "page_size", "must be greater than zero");
    v.check(
        f.page_size <= MAX_PAGE_SIZE,
        "page_size",
        "must be a maximum of 100",
    );
    v.check(
        permitted_value(&f.sort, f.sort_safelist),
        "sort",
        "invalid sort value",
    );
}

fn read_string(params: &HashMap<String, String>, key: &str, default: &str) -> String {
    match params.get(key) {
        Some(value) if !value.is_empty() => value.clone(),
        _ => default.to_string(),
    }
}

fn read_int(params: &HashMap<String, String>, key: &str, default: i64, v: &mut Validator) -> i64 {
    match params.get(key) {
        None => default,
        Some(value) if value.is_empty() => default,
        Some(value) => match value.parse::<i64>() {
            Ok(n) => n,
            Err(_) => {
                v.add_error(key, "must be an integer value");
                default
            }
        },
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Metadata {
    pub current_page: i64,
    pub page_size: i64,
    pub first_page: i64,
    pub last_page: i64,
    pub total_records: i64,
}

/// Pagination summary for a result set. An empty result yields all zeros.
pub fn calculate_metadata(total_records: i64, page: i64, page_size: i64) -> Metadata {
    if total_records <= 0 || page_size <= 0 {
        return Metadata::default();
    }

    Metadata {
        current_page: page,
        page_size,
        first_page: 1,
        last_page: (total_records + page_size - 1) / page_size,
        total_records,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAFELIST: &[&str] = &["id", "name", "-id", "-name"];

    fn query(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_apply_when_parameters_are_absent() {
        let mut v = Validator::new();
        let f = Filters::from_query(&query(&[]), "id", SAFELIST, &mut v);

        assert!(v.is_empty());
        assert_eq!(f.page, 1);
        assert_eq!(f.page_size, 10);
        assert_eq!(f.sort, "id");
        assert_eq!(f.limit(), 10);
        assert_eq!(f.offset(), 0);
    }

    #[test]
    fn offset_follows_page_and_size() {
        let mut v = Validator::new();
        let f = Filters::from_query(
            &query(&[("page", "3"), ("page_size", "25")]),
            "id",
            SAFELIST,
            &mut v,
        );

        assert!(v.is_empty());
        assert_eq!(f.limit(), 25);
        assert_eq!(f.offset(), 50);
    }

    #[test]
    fn largest_page_does_not_overflow_offset() {
        let mut v = Validator::new();
        let f = Filters::from_query(
            &query(&[("page", "10000000"), ("page_size", "100")]),
            "id",
            SAFELIST,
            &mut v,
        );

        assert!(v.is_empty());
        assert_eq!(f.offset(), 999_999_900);
    }

    #[test]
    fn descending_sort_strips_prefix() {
        let mut v = Validator::new();
        let f = Filters::from_query(&query(&[("sort", "-name")]), "id", SAFELIST, &mut v);

        assert!(v.is_empty());
        assert_eq!(f.sort_column().unwrap(), "name");
        assert_eq!(f.sort_direction(), "DESC");
    }

    #[test]
    fn ascending_sort_is_default_direction() {
        let mut v = Validator::new();
        let f = Filters::from_query(&query(&[("sort", "name")]), "id", SAFELIST, &mut v);

        assert_eq!(f.sort_column().unwrap(), "name");
        assert_eq!(f.sort_direction(), "ASC");
    }

    #[test]
    fn unknown_sort_is_rejected() {
        let mut v = Validator::new();
        let f = Filters::from_query(
            &query(&[("sort", "name; DROP TABLE customers")]),
            "id",
            SAFELIST,
            &mut v,
        );

        assert_eq!(v.errors["sort"], "invalid sort value");
        assert!(f.sort_column().is_err());
    }

    #[test]
    fn non_integer_page_is_reported() {
        let mut v = Validator::new();
        let f = Filters::from_query(&query(&[("page", "two")]), "id", SAFELIST, &mut v);

        assert_eq!(v.errors["page"], "must be an integer value");
        assert_eq!(f.page, DEFAULT_PAGE);
    }

    #[test]
    fn out_of_range_values_are_reported() {
        let mut v = Validator::new();
        Filters::from_query(
            &query(&[("page", "0"), ("page_size", "10000")]),
            "id",
            SAFELIST,
            &mut v,
        );

        assert_eq!(v.errors["page"], "must be greater than zero");
        assert_eq!(v.errors["page_size"], "must be a maximum of 100");

        let mut v = Validator::new();
        Filters::from_query(
            &query(&[("page", "10000001"), ("page_size", "-5")]),
            "id",
            SAFELIST,
            &mut v,
        );

        assert_eq!(v.errors["page"], "must be a maximum of 10 million");
        assert_eq!(v.errors["page_size"], "must be greater than zero");
    }

    #[test]
    fn empty_result_gives_zero_metadata() {
        assert_eq!(calculate_metadata(0, 3, 20), Metadata::default());
    }

    #[test]
    fn last_page_rounds_up() {
        for (total, page_size, last_page) in [(1, 10, 1), (10, 10, 1), (11, 10, 2), (99, 20, 5), (100, 1, 100)] {
            let m = calculate_metadata(total, 1, page_size);
            assert_eq!(m.last_page, last_page, "total={} page_size={}", total, page_size);
            assert_eq!(m.first_page, 1);
            assert_eq!(m.total_records, total);
            assert_eq!(m.page_size, page_size);
        }
    }

    #[test]
    fn current_page_is_echoed_even_past_the_end() {
        let m = calculate_metadata(5, 7, 2);
        assert_eq!(m.current_page, 7);
        assert_eq!(m.last_page, 3);
    }
}
