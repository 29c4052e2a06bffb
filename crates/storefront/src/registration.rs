//! Customer sign-up form.

use bettabeal_core::{PhoneNumber, PhoneNumberError};
use chrono::NaiveDate;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;

use crate::api::RegisterRequest;

/// Why a sign-up form was refused before reaching the backend.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistrationFormError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("Invalid phone number: {0}")]
    Phone(#[from] PhoneNumberError),

    #[error("Invalid birth date, expected YYYY-MM-DD")]
    BirthDate,

    #[error("Invalid email address")]
    Email,
}

/// Sign-up form as submitted by the client.
#[derive(Debug, Default, Deserialize)]
pub struct RegistrationForm {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub birth_date: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// A form that passed local checks.
#[derive(Debug)]
pub struct Registration {
    pub full_name: String,
    pub username: String,
    pub birth_date: NaiveDate,
    pub phone_number: PhoneNumber,
    pub email: String,
    password: SecretString,
}

impl Registration {
    /// Request body for the backend. The password is only exposed here.
    #[must_use]
    pub fn request(&self) -> RegisterRequest<'_> {
        RegisterRequest {
            full_name: &self.full_name,
            username: &self.username,
            birth_date: self.birth_date,
            phone_number: &self.phone_number,
            email: &self.email,
            password: self.password.expose_secret(),
        }
    }
}

impl RegistrationForm {
    /// Check required fields and formats.
    ///
    /// # Errors
    ///
    /// Returns the first missing field, then the first malformed one.
    pub fn validate(self) -> Result<Registration, RegistrationFormError> {
        let full_name = required(&self.full_name, "full_name")?;
        let username = required(&self.username, "username")?;
        let birth_date = required(&self.birth_date, "birth_date")?;
        let phone_number = required(&self.phone_number, "phone_number")?;
        let email = required(&self.email, "email")?;
        if self.password.is_empty() {
            return Err(RegistrationFormError::MissingField("password"));
        }

        let birth_date = NaiveDate::parse_from_str(&birth_date, "%Y-%m-%d")
            .map_err(|_| RegistrationFormError::BirthDate)?;
        let phone_number = PhoneNumber::parse(&phone_number)?;
        if !is_plausible_email(&email) {
            return Err(RegistrationFormError::Email);
        }

        Ok(Registration {
            full_name,
            username,
            birth_date,
            phone_number,
            email,
            password: SecretString::from(self.password),
        })
    }
}

fn required(value: &str, field: &'static str) -> Result<String, RegistrationFormError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(RegistrationFormError::MissingField(field))
    } else {
        Ok(trimmed.to_string())
    }
}

/// `local@domain` with both parts present and no whitespace.
fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form() -> RegistrationForm {
        RegistrationForm {
            full_name: " Budi Santoso ".to_string(),
            username: "budi".to_string(),
            birth_date: "2000-02-29".to_string(),
            phone_number: "081234567890".to_string(),
            email: "budi@example.com".to_string(),
            password: "rahasia".to_string(),
        }
    }

    #[test]
    fn test_valid_form_is_trimmed() {
        let registration = form().validate().unwrap();
        assert_eq!(registration.full_name, "Budi Santoso");
        assert_eq!(
            registration.birth_date,
            NaiveDate::from_ymd_opt(2000, 2, 29).unwrap()
        );
        assert_eq!(registration.request().password, "rahasia");
    }

    #[test]
    fn test_missing_fields_reported_in_order() {
        let mut missing = form();
        missing.username = "  ".to_string();
        missing.password = String::new();
        assert_eq!(
            missing.validate().unwrap_err(),
            RegistrationFormError::MissingField("username")
        );

        let mut missing = form();
        missing.password = String::new();
        assert_eq!(
            missing.validate().unwrap_err(),
            RegistrationFormError::MissingField("password")
        );
    }

    #[test]
    fn test_malformed_fields_rejected() {
        let mut bad = form();
        bad.birth_date = "2001-02-29".to_string();
        assert_eq!(bad.validate().unwrap_err(), RegistrationFormError::BirthDate);

        let mut bad = form();
        bad.phone_number = "+62 812".to_string();
        assert!(matches!(
            bad.validate().unwrap_err(),
            RegistrationFormError::Phone(_)
        ));

        for email in ["budi", "@example.com", "budi@", "bu di@example.com", "a@b@c"] {
            let mut bad = form();
            bad.email = email.to_string();
            assert_eq!(bad.validate().unwrap_err(), RegistrationFormError::Email, "{email}");
        }
    }
}
