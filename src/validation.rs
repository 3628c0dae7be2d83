use regex::Regex;
use std::sync::OnceLock;

pub const PHONE_DIGITS: usize = 11;

/// Letters (any script), spaces and dashes.
pub fn validate_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Name is required".to_string());
    }

    static NAME_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = NAME_REGEX
        .get_or_init(|| Regex::new(r"^[\p{L}\s-]+$").expect("Failed to compile name regex"));

    if !regex.is_match(name) {
        return Err("Name can only contain letters, spaces and dashes".to_string());
    }

    Ok(())
}

/// Strips everything but digits and requires exactly eleven of them.
pub fn normalize_phone(phone: &str) -> Result<String, String> {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    if digits.len() != PHONE_DIGITS {
        return Err(format!("Phone must contain exactly {PHONE_DIGITS} digits"));
    }
    Ok(digits)
}

pub fn validate_city(city: &str) -> Result<(), String> {
    if city.trim().is_empty() {
        return Err("City is required".to_string());
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}
