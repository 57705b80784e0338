// Client-side form validation. These checks run before any request is sent,
// so a malformed field never reaches the network.
use once_cell::sync::Lazy;
use regex::Regex;

use crate::{Error, Result};

static NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z\s]+$").expect("invalid name regex"));
static DOMAIN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("invalid domain regex"));
static COMPANY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9\s]+$").expect("invalid company regex"));
static ALL_DIGITS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").expect("invalid digit regex"));
static LINKEDIN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https://[a-z]{2,3}\.linkedin\.com/.*$").expect("invalid linkedin regex")
});
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("invalid email regex"));

fn invalid(message: &str) -> Error {
    Error::ValidationError(message.to_string())
}

/// Person names: English letters and spaces only.
pub fn person_name(value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid("Name is required"));
    }
    if !NAME_RE.is_match(value) {
        return Err(invalid("Only English alphabets and spaces are allowed"));
    }
    Ok(())
}

/// Either a domain (`example.com`) or a company name; bare numbers are
/// rejected because they are never either.
pub fn domain_or_company(value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid("This field is required"));
    }
    let is_domain = DOMAIN_RE.is_match(value);
    let is_company = COMPANY_RE.is_match(value) && !ALL_DIGITS_RE.is_match(value);
    if !is_domain && !is_company {
        return Err(invalid(
            "Enter a valid domain (e.g., example.com) or company name",
        ));
    }
    Ok(())
}

/// Profile URLs on any LinkedIn country subdomain.
pub fn linkedin_url(value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid("LinkedIn URL is required"));
    }
    if !LINKEDIN_RE.is_match(value) {
        return Err(invalid("Invalid LinkedIn URL"));
    }
    Ok(())
}

pub fn email_address(value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid("Email is required"));
    }
    if !EMAIL_RE.is_match(value) {
        return Err(invalid("Enter a valid email address"));
    }
    Ok(())
}
