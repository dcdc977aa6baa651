//! Reusable conditions for [`Validator`](super::Validator).
//!
//! Each function captures the value to check and returns a predicate, so the
//! check itself only runs when the validator evaluates it.

use validator::ValidateEmail;

use super::country;

pub const MAX_EMAIL_LEN: usize = 254;
pub const MIN_PASSWORD_LEN: usize = 8;

/// Roles an account may hold.
pub const ROLES: &[&str] = &["admin"];

pub fn non_empty(value: &str) -> impl FnOnce() -> bool + Send + '_ {
    move || !value.is_empty()
}

/// Length bound counted in characters, not bytes.
pub fn max_len(value: &str, max: usize) -> impl FnOnce() -> bool + Send + '_ {
    move || value.chars().count() <= max
}

pub fn latitude(value: f64) -> impl FnOnce() -> bool + Send {
    move || is_latitude(value)
}

pub fn longitude(value: f64) -> impl FnOnce() -> bool + Send {
    move || is_longitude(value)
}

pub fn country_code(value: &str) -> impl FnOnce() -> bool + Send + '_ {
    move || country::is_valid(value)
}

/// Structurally valid address, at most 254 characters, no display name.
pub fn email(value: &str) -> impl FnOnce() -> bool + Send + '_ {
    move || is_email(value)
}

/// Only the minimum length is enforced; there is no character-set rule.
pub fn password(value: &str) -> impl FnOnce() -> bool + Send + '_ {
    move || value.chars().count() >= MIN_PASSWORD_LEN
}

pub fn role(value: &str) -> impl FnOnce() -> bool + Send + '_ {
    move || ROLES.contains(&value)
}

pub fn is_latitude(value: f64) -> bool {
    (-90.0..=90.0).contains(&value)
}

pub fn is_longitude(value: f64) -> bool {
    (-180.0..=180.0).contains(&value)
}

fn is_email(value: &str) -> bool {
    if value.is_empty() || value.len() > MAX_EMAIL_LEN {
        return false;
    }
    // "Name <user@host>" forms are rejected outright
    if value.contains(['<', '>', ' ', '"']) {
        return false;
    }
    value.validate_email()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_and_max_len() {
        assert!(non_empty("a")());
        assert!(!non_empty("")());
        assert!(max_len("héllo", 5)());
        assert!(!max_len("hello!", 5)());
    }

    #[test]
    fn coordinate_ranges_are_inclusive() {
        assert!(latitude(90.0)());
        assert!(latitude(-90.0)());
        assert!(!latitude(90.0001)());
        assert!(!latitude(f64::NAN)());
        assert!(longitude(-180.0)());
        assert!(longitude(180.0)());
        assert!(!longitude(-180.5)());
    }

    #[test]
    fn country_codes() {
        assert!(country_code("kz")());
        assert!(country_code("us")());
        assert!(!country_code("zz")());
        assert!(!country_code("KZ")());
        assert!(!country_code("")());
    }

    #[test]
    fn emails() {
        assert!(email("admin@example.com")());
        assert!(!email("admin")());
        assert!(!email("admin@")());
        assert!(!email("Admin <admin@example.com>")());
        let long = format!("{}@example.com", "a".repeat(250));
        assert!(!email(&long)());
    }

    #[test]
    fn passwords_only_check_length() {
        assert!(password("12345678")());
        assert!(password("aaaaaaaa")());
        assert!(!password("1234567")());
    }

    #[test]
    fn roles() {
        assert!(role("admin")());
        assert!(!role("root")());
        assert!(!role("")());
    }
}
