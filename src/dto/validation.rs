//! Validation helpers for DTOs.

use validator::ValidationError;

const LOGIN_MIN: usize = 3;
const LOGIN_MAX: usize = 10;

/// Validates that a login is 3 to 10 characters of `[0-9A-Za-z_-]`.
///
/// # Examples
///
/// ```ignore
/// validate_login("player_1") // Ok
/// validate_login("ab")       // Err - too short
/// validate_login("no spaces") // Err - invalid character
/// ```
pub fn validate_login(login: &str) -> Result<(), ValidationError> {
    let length = login.chars().count();
    if !(LOGIN_MIN..=LOGIN_MAX).contains(&length) {
        let mut err = ValidationError::new("login_length");
        err.message = Some(
            format!("Login must be between {LOGIN_MIN} and {LOGIN_MAX} characters (got {length})")
                .into(),
        );
        return Err(err);
    }

    if !login
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        let mut err = ValidationError::new("login_format");
        err.message = Some("Login may only contain letters, digits, '_' and '-'".into());
        return Err(err);
    }

    Ok(())
}

/// Validates that a question has at least one accepted answer and none of them is blank.
pub fn validate_correct_answers(answers: &[String]) -> Result<(), ValidationError> {
    if answers.is_empty() {
        let mut err = ValidationError::new("correct_answers_empty");
        err.message = Some("At least one correct answer is required".into());
        return Err(err);
    }

    if answers.iter().any(|answer| answer.trim().is_empty()) {
        let mut err = ValidationError::new("correct_answers_blank");
        err.message = Some("Correct answers must not be blank".into());
        return Err(err);
    }

    Ok(())
}
