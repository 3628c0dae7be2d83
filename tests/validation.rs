use qure_storefront::validation::{normalize_phone, validate_city, validate_email, validate_name};

#[test]
fn names_allow_letters_spaces_and_dashes() {
    assert!(validate_name("Анна-Мария Петрова").is_ok());
    assert!(validate_name("John Smith").is_ok());
    assert!(validate_name("   ").is_err());
    assert!(validate_name("R2D2").is_err());
}

#[test]
fn phones_normalize_to_eleven_digits() {
    assert_eq!(
        normalize_phone("+7 (701) 123-45-67").as_deref(),
        Ok("77011234567")
    );
    assert_eq!(normalize_phone("87011234567").as_deref(), Ok("87011234567"));
    assert!(normalize_phone("701 123 45 67").is_err());
    assert!(normalize_phone("+7 701 123 45 67 8").is_err());
}

#[test]
fn city_and_email_checks() {
    assert!(validate_city("Алматы").is_ok());
    assert!(validate_city(" ").is_err());

    assert!(validate_email("user@qure.kz").is_ok());
    assert!(validate_email("").is_err());
    assert!(validate_email("user@qure").is_err());
}
