//! Field checks shared by the services
//!
//! Messages are the user-facing French strings of the product.

/// Longest value accepted for short text columns
pub const MAX_TEXT_LENGTH: usize = 255;

/// Longest accepted email address
pub const MAX_EMAIL_LENGTH: usize = 180;

/// Reject blank values
pub fn not_blank(value: &str, message: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(message.to_string());
    }
    Ok(())
}

/// Reject values longer than `max` characters
pub fn max_length(value: &str, max: usize) -> Result<(), String> {
    if value.chars().count() > max {
        return Err(format!("Attention, pas plus de {} caractères.", max));
    }
    Ok(())
}

/// Required short text: not blank and at most 255 characters
pub fn required_text(value: &str, message: &str) -> Result<(), String> {
    not_blank(value, message)?;
    max_length(value, MAX_TEXT_LENGTH)
}

/// Required email address
pub fn email(value: &str) -> Result<(), String> {
    not_blank(value, "N'oubliez pas votre email.")?;
    max_length(value, MAX_EMAIL_LENGTH)?;

    match value.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err("Adresse email invalide.".to_string()),
    }
}
