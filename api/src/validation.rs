use crate::database::{NewBook, NewUser};
use anyhow::{bail, Result};
use regex::Regex;
use std::sync::OnceLock;

static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
static URL_REGEX: OnceLock<Regex> = OnceLock::new();
static USERNAME_REGEX: OnceLock<Regex> = OnceLock::new();

const RESERVED_USERNAMES: &[&str] = &[
    "admin",
    "administrator",
    "api",
    "bookstore",
    "moderator",
    "null",
    "root",
    "support",
    "system",
    "undefined",
];

pub const MAX_TITLE_LEN: usize = 1024;
pub const MAX_DESCRIPTION_LEN: usize = 10_000;
pub const MAX_DISPLAY_NAME_LEN: usize = 100;

fn email_regex() -> &'static Regex {
    EMAIL_REGEX
        .get_or_init(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap())
}

fn url_regex() -> &'static Regex {
    URL_REGEX.get_or_init(|| Regex::new(r"^https?://[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}(/.*)?$").unwrap())
}

fn username_regex() -> &'static Regex {
    USERNAME_REGEX.get_or_init(|| Regex::new(r"^[a-zA-Z0-9._-]+$").unwrap())
}

pub fn validate_email(email: &str) -> Result<()> {
    if email.trim().is_empty() {
        bail!("Email cannot be empty");
    }
    if email.len() > 255 {
        bail!("Email is too long (max 255 characters)");
    }
    if !email_regex().is_match(email) {
        bail!("Invalid email format");
    }
    Ok(())
}

pub fn validate_url(url: &str) -> Result<()> {
    if url.trim().is_empty() {
        bail!("URL cannot be empty");
    }
    if url.len() > 2048 {
        bail!("URL is too long (max 2048 characters)");
    }
    if !url_regex().is_match(url) {
        bail!("Invalid URL format (must start with http:// or https://)");
    }
    Ok(())
}

/// Validate account username
/// Rules:
/// - Length: 3-30 characters
/// - Characters: [a-zA-Z0-9._-]
/// - Not in reserved list (case-insensitive)
pub fn validate_username(username: &str) -> Result<()> {
    let len = username.chars().count();
    if len < 3 {
        bail!("Username must be at least 3 characters");
    }
    if len > 30 {
        bail!("Username must be at most 30 characters");
    }
    if !username_regex().is_match(username) {
        bail!("Username may only contain letters, numbers, period, underscore or hyphen");
    }
    if RESERVED_USERNAMES.contains(&username.to_lowercase().as_str()) {
        bail!("Username is reserved");
    }
    Ok(())
}

/// Optional free-text names (real name, pseudonym).
pub fn validate_display_name(label: &str, value: Option<&str>) -> Result<()> {
    if let Some(value) = value {
        if value.chars().count() > MAX_DISPLAY_NAME_LEN {
            bail!(
                "{} is too long (max {} characters)",
                label,
                MAX_DISPLAY_NAME_LEN
            );
        }
    }
    Ok(())
}

pub fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        bail!("Title cannot be empty");
    }
    if title.chars().count() > MAX_TITLE_LEN {
        bail!("Title is too long (max {} characters)", MAX_TITLE_LEN);
    }
    Ok(())
}

pub fn validate_price(price: i64) -> Result<()> {
    if price < 0 {
        bail!("Price cannot be negative");
    }
    Ok(())
}

pub fn validate_new_user(user: &NewUser) -> Result<()> {
    validate_username(&user.username)?;
    validate_email(&user.email)?;
    validate_display_name("Name", user.name.as_deref())?;
    validate_display_name("Pseudonym", user.pseudonym.as_deref())?;
    Ok(())
}

pub fn validate_new_book(book: &NewBook) -> Result<()> {
    validate_title(&book.title)?;
    if let Some(description) = &book.description {
        if description.chars().count() > MAX_DESCRIPTION_LEN {
            bail!(
                "Description is too long (max {} characters)",
                MAX_DESCRIPTION_LEN
            );
        }
    }
    if let Some(cover) = &book.cover {
        validate_url(cover)?;
    }
    validate_price(book.price)?;
    Ok(())
}

#[cfg(test)]
mod tests;
