//! Field-level checks shared by node, product and registration forms.
//!
//! Every check records its failure under the field name and keeps going, so a
//! single response lists all invalid fields at once.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;

pub const REQUIRED: &str = "This field is required.";
pub const BLANK: &str = "This field may not be blank.";
pub const INVALID_EMAIL: &str = "Enter a valid email address.";
pub const INVALID_DATE: &str = "Date has wrong format. Use one of these formats instead: YYYY-MM-DD.";

/// Maximum integer digits of a `NUMERIC(12,2)` value.
pub const MONEY_INTEGER_DIGITS: u32 = 10;
pub const MONEY_DECIMAL_PLACES: u32 = 2;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(HashMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `message` for `field` unless the field already has an error.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn into_inner(self) -> HashMap<String, String> {
        self.0
    }

    /// `Ok(value)` when no error was recorded.
    pub fn finish<T>(self, value: impl FnOnce() -> T) -> Result<T, FieldErrors> {
        if self.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

fn too_long(max: usize) -> String {
    format!("Ensure this field has no more than {max} characters.")
}

/// Trims `value` and checks it is present, non-blank and within `max` chars.
pub fn required_text(errors: &mut FieldErrors, field: &str, value: Option<String>, max: usize) -> Option<String> {
    match value {
        None => {
            errors.add(field, REQUIRED);
            None
        }
        Some(v) => present_text(errors, field, v, max),
    }
}

/// Like `required_text`, but an absent value is fine (partial update).
pub fn optional_text(errors: &mut FieldErrors, field: &str, value: Option<String>, max: usize) -> Option<String> {
    value.and_then(|v| present_text(errors, field, v, max))
}

/// Optional field that may also be blank. Absent becomes empty.
pub fn blank_text(errors: &mut FieldErrors, field: &str, value: Option<String>, max: usize) -> String {
    let value = value.map(|v| v.trim().to_string()).unwrap_or_default();
    if value.chars().count() > max {
        errors.add(field, too_long(max));
    }
    value
}

fn present_text(errors: &mut FieldErrors, field: &str, value: String, max: usize) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        errors.add(field, BLANK);
        return None;
    }
    if value.chars().count() > max {
        errors.add(field, too_long(max));
        return None;
    }
    Some(value.to_string())
}

/// Basic shape check: one `@`, non-empty local part, dotted domain, no spaces.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains("..")
}

/// Lower-cases the domain part; the local part is kept as typed.
pub fn normalize_email(email: &str) -> String {
    let email = email.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{local}@{}", domain.to_lowercase()),
        None => email.to_string(),
    }
}

/// Email field: the usual text checks, then shape and normalization.
pub fn email(errors: &mut FieldErrors, field: &str, value: Option<String>, required: bool) -> Option<String> {
    let value = if required {
        required_text(errors, field, value, 254)?
    } else {
        optional_text(errors, field, value, 254)?
    };
    if !is_valid_email(&value) {
        errors.add(field, INVALID_EMAIL);
        return None;
    }
    Some(normalize_email(&value))
}

/// Fits a `NUMERIC(12,2)` column without rounding.
pub fn money(errors: &mut FieldErrors, field: &str, value: Decimal) -> Option<Decimal> {
    let value = value.normalize();
    if value.scale() > MONEY_DECIMAL_PLACES {
        errors.add(
            field,
            format!("Ensure that there are no more than {MONEY_DECIMAL_PLACES} decimal places."),
        );
        return None;
    }
    let integer_digits = value.trunc().abs().to_string().trim_start_matches('0').len() as u32;
    if integer_digits > MONEY_INTEGER_DIGITS {
        errors.add(
            field,
            format!("Ensure that there are no more than {MONEY_INTEGER_DIGITS} digits before the decimal point."),
        );
        return None;
    }
    let mut value = value;
    value.rescale(MONEY_DECIMAL_PLACES);
    Some(value)
}

/// Calendar date in `YYYY-MM-DD` form.
pub fn date(errors: &mut FieldErrors, field: &str, value: &str) -> Option<NaiveDate> {
    match NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
            errors.add(field, INVALID_DATE);
            None
        }
    }
}

pub fn missing_object(id: i64) -> String {
    format!("Invalid pk \"{id}\" - object does not exist.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn required_text_trims_and_checks() {
        let mut errors = FieldErrors::new();
        assert_eq!(required_text(&mut errors, "name", Some("  Plant  ".into()), 255), Some("Plant".into()));
        assert_eq!(required_text(&mut errors, "city", None, 100), None);
        assert_eq!(required_text(&mut errors, "street", Some("   ".into()), 100), None);
        assert_eq!(required_text(&mut errors, "phone", Some("1".repeat(21)), 20), None);

        assert_eq!(errors.get("city"), Some(REQUIRED));
        assert_eq!(errors.get("street"), Some(BLANK));
        assert_eq!(errors.get("phone"), Some("Ensure this field has no more than 20 characters."));
        assert!(!errors.contains("name"));
    }

    #[test]
    fn optional_text_allows_absence_only() {
        let mut errors = FieldErrors::new();
        assert_eq!(optional_text(&mut errors, "name", None, 10), None);
        assert!(errors.is_empty());
        assert_eq!(optional_text(&mut errors, "name", Some(String::new()), 10), None);
        assert_eq!(errors.get("name"), Some(BLANK));
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        let mut errors = FieldErrors::new();
        let city = "Санкт-Петербург".to_string();
        assert_eq!(required_text(&mut errors, "city", Some(city.clone()), 15), Some(city));
        assert!(errors.is_empty());
    }

    #[test]
    fn email_shapes() {
        assert!(is_valid_email("info@plant.ru"));
        assert!(!is_valid_email("info.plant.ru"));
        assert!(!is_valid_email("@plant.ru"));
        assert!(!is_valid_email("info@plant"));
        assert!(!is_valid_email("in fo@plant.ru"));
        assert!(!is_valid_email("a@b@c.ru"));
        assert!(!is_valid_email("info@.ru"));
    }

    #[test]
    fn email_domain_is_lowercased() {
        assert_eq!(normalize_email("Ivan.Ivanov@Example.COM"), "Ivan.Ivanov@example.com");
        let mut errors = FieldErrors::new();
        assert_eq!(
            email(&mut errors, "email", Some(" Info@Plant.RU ".into()), true),
            Some("Info@plant.ru".into())
        );
    }

    #[test]
    fn money_is_rescaled_to_two_places() {
        let mut errors = FieldErrors::new();
        let value = money(&mut errors, "debt", Decimal::from_str("1000").unwrap()).unwrap();
        assert_eq!(value.to_string(), "1000.00");
        let value = money(&mut errors, "debt", Decimal::from_str("12.50").unwrap()).unwrap();
        assert_eq!(value.to_string(), "12.50");
        assert!(errors.is_empty());
    }

    #[test]
    fn money_rejects_extra_precision_and_size() {
        let mut errors = FieldErrors::new();
        assert!(money(&mut errors, "a", Decimal::from_str("1.005").unwrap()).is_none());
        assert!(money(&mut errors, "b", Decimal::from_str("12345678901").unwrap()).is_none());
        assert!(money(&mut errors, "c", Decimal::from_str("9999999999.99").unwrap()).is_some());
        assert_eq!(errors.get("a"), Some("Ensure that there are no more than 2 decimal places."));
        assert!(errors.contains("b"));
        assert!(!errors.contains("c"));
    }

    #[test]
    fn dates_must_be_iso() {
        let mut errors = FieldErrors::new();
        assert_eq!(date(&mut errors, "d", "2024-03-01"), NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(date(&mut errors, "e", "01.03.2024"), None);
        assert_eq!(errors.get("e"), Some(INVALID_DATE));
    }

    #[test]
    fn first_error_per_field_wins() {
        let mut errors = FieldErrors::new();
        errors.add("name", "first");
        errors.add("name", "second");
        assert_eq!(errors.get("name"), Some("first"));
        assert!(errors.finish(|| ()).is_err());
        assert_eq!(FieldErrors::new().finish(|| 5), Ok(5));
    }
}
