// src/utils/validation.rs
// Input rules shared by the service and the client forms
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    static ref EMAIL: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
}

pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MIN_USERNAME_LENGTH: usize = 3;
pub const MAX_TITLE_LENGTH: usize = 255;
pub const MAX_CONTENT_LENGTH: usize = 1_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PasswordStrength {
    Weak,
    Fair,
    Good,
    Strong,
}

pub fn validate_email(email: &str) -> Result<(), String> {
    if EMAIL.is_match(email.trim()) {
        Ok(())
    } else {
        Err("Invalid email address".to_string())
    }
}

pub fn validate_password(password: &str) -> Result<(), String> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err("Password must contain at least one digit".to_string());
    }
    if !password.chars().any(char::is_uppercase) {
        return Err("Password must contain at least one uppercase letter".to_string());
    }
    if !password.chars().any(char::is_lowercase) {
        return Err("Password must contain at least one lowercase letter".to_string());
    }
    Ok(())
}

pub fn validate_username(username: &str) -> Result<(), String> {
    if username.trim().chars().count() < MIN_USERNAME_LENGTH {
        return Err(format!(
            "Username must be at least {} characters long",
            MIN_USERNAME_LENGTH
        ));
    }
    Ok(())
}

// Score for the strength meter on the registration form
pub fn password_strength(password: &str) -> PasswordStrength {
    let length = password.chars().count();
    let mut score = 0;
    if length >= MIN_PASSWORD_LENGTH {
        score += 1;
    }
    if length >= 12 {
        score += 1;
    }
    if password.chars().any(char::is_uppercase) && password.chars().any(char::is_lowercase) {
        score += 1;
    }
    if password.chars().any(|c| c.is_ascii_digit()) {
        score += 1;
    }
    if password.chars().any(|c| !c.is_alphanumeric()) {
        score += 1;
    }

    match score {
        0..=1 => PasswordStrength::Weak,
        2..=3 => PasswordStrength::Fair,
        4 => PasswordStrength::Good,
        _ => PasswordStrength::Strong,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_rules() {
        assert!(validate_password("Short1").is_err());
        assert!(validate_password("alllowercase1").is_err());
        assert!(validate_password("ALLUPPERCASE1").is_err());
        assert!(validate_password("NoDigitsHere").is_err());
        assert!(validate_password("Valid123").is_ok());
    }

    #[test]
    fn strength_grows_with_variety() {
        assert_eq!(password_strength("abc"), PasswordStrength::Weak);
        assert_eq!(password_strength("abcdefgh"), PasswordStrength::Weak);
        assert_eq!(password_strength("Abcdefgh1"), PasswordStrength::Fair);
        assert_eq!(password_strength("Abcdefgh1234"), PasswordStrength::Good);
        assert_eq!(password_strength("Abcdefgh1234!"), PasswordStrength::Strong);
    }

    #[test]
    fn email_and_username_rules() {
        assert!(validate_email("someone@example.com").is_ok());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("abc").is_ok());
    }
}
