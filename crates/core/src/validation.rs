//! Shape validation for customer payloads.
//!
//! These checks only look at the payload itself (blank fields, lengths and
//! patterns). Anything that needs stored state, such as duplicate emails or
//! existence, is decided by the service and the store.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::domain::customer::{CustomerInput, NewCustomer};
use crate::errors::CustomerError;

pub const MAX_NAME_CHARS: usize = 50;
pub const VALIDATION_FAILED_MESSAGE: &str = "Validation failed.";

const PHONE_PATTERN: &str = r"^\+?[1-9]\d{1,14}$";

const MAX_EMAIL_LOCAL_CHARS: usize = 64;
const MAX_EMAIL_DOMAIN_BYTES: usize = 255;

const EMAIL_LOCAL_ATOM: &str = r"[A-Za-z0-9!#$%&'*+/=?^_`{|}~\x{80}-\x{10FFFF}-]+";
const EMAIL_LOCAL_QUOTED: &str =
    r#""(?:[A-Za-z0-9!#$%&'*.(),<>\[\]:; @+/=?^_`{|}~\x{80}-\x{10FFFF}-]|\\\\|\\")*""#;
const EMAIL_DOMAIN_CHAR: &str = r"[A-Za-z0-9!#$%&'*+/=?^_`{|}~\x{80}-\x{10FFFF}]";
const EMAIL_ADDRESS_LITERAL: &str = r"\[[0-9]{1,3}(?:\.[0-9]{1,3}){3}\]";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub field: &'static str,
    pub message: &'static str,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Violations(Vec<Violation>);

impl Violations {
    fn push(&mut self, field: &'static str, message: &'static str) {
        self.0.push(Violation { field, message });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn messages(&self) -> Vec<String> {
        self.0.iter().map(|violation| violation.message.to_string()).collect()
    }
}

impl From<Violations> for CustomerError {
    fn from(violations: Violations) -> Self {
        CustomerError::InvalidInput {
            message: VALIDATION_FAILED_MESSAGE.to_string(),
            details: violations.messages(),
        }
    }
}

fn phone_regex() -> &'static Regex {
    static PHONE: OnceLock<Regex> = OnceLock::new();
    PHONE.get_or_init(|| Regex::new(PHONE_PATTERN).expect("phone pattern is a valid regex"))
}

/// Dot-separated atoms or a quoted string; non-ASCII characters allowed.
fn email_local_regex() -> &'static Regex {
    static LOCAL: OnceLock<Regex> = OnceLock::new();
    LOCAL.get_or_init(|| {
        let dot_atoms = format!(r"{EMAIL_LOCAL_ATOM}(?:\.{EMAIL_LOCAL_ATOM})*");
        let pattern = format!("^(?:{dot_atoms}|{EMAIL_LOCAL_QUOTED})$");
        Regex::new(&pattern).expect("local part pattern is a valid regex")
    })
}

/// Hostname labels (Unicode allowed, no leading or trailing hyphen) or a
/// bracketed IPv4 literal.
fn email_domain_regex() -> &'static Regex {
    static DOMAIN: OnceLock<Regex> = OnceLock::new();
    DOMAIN.get_or_init(|| {
        let label = format!("(?:{EMAIL_DOMAIN_CHAR}-*)*{EMAIL_DOMAIN_CHAR}+");
        let pattern = format!(r"^(?:{label}(?:\.{label})*|{EMAIL_ADDRESS_LITERAL})$");
        Regex::new(&pattern).expect("domain pattern is a valid regex")
    })
}

pub fn is_valid_phone(value: &str) -> bool {
    phone_regex().is_match(value)
}

/// Unicode local parts and internationalized domain names are accepted.
pub fn is_valid_email(value: &str) -> bool {
    let Some((local, domain)) = value.rsplit_once('@') else {
        return false;
    };
    if local.chars().count() > MAX_EMAIL_LOCAL_CHARS || domain.len() > MAX_EMAIL_DOMAIN_BYTES {
        return false;
    }
    email_local_regex().is_match(local) && email_domain_regex().is_match(domain)
}

fn is_blank(value: Option<&str>) -> bool {
    value.map(|value| value.trim().is_empty()).unwrap_or(true)
}

fn check_name(
    violations: &mut Violations,
    field: &'static str,
    value: Option<&str>,
    required: &'static str,
    too_long: &'static str,
) {
    if is_blank(value) {
        violations.push(field, required);
    } else if value.map(|value| value.chars().count() > MAX_NAME_CHARS).unwrap_or(false) {
        violations.push(field, too_long);
    }
}

/// Runs every shape rule and reports all failures at once.
pub fn validate_customer(input: &CustomerInput) -> Result<(), Violations> {
    let mut violations = Violations::default();

    check_name(
        &mut violations,
        "firstName",
        input.first_name.as_deref(),
        "First name is required.",
        "First name must not exceed 50 characters.",
    );
    check_name(
        &mut violations,
        "lastName",
        input.last_name.as_deref(),
        "Last name is required.",
        "Last name must not exceed 50 characters.",
    );

    match input.email_address.as_deref() {
        value if is_blank(value) => violations.push("emailAddress", "Email is required."),
        Some(email) if !is_valid_email(email) => {
            violations.push("emailAddress", "Email should be valid.")
        }
        _ => {}
    }

    if let Some(phone) = input.phone_number.as_deref() {
        if !is_valid_phone(phone) {
            violations.push("phoneNumber", "Phone number must be valid and follow E.164 format.");
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

/// Business-rule check applied at creation: both names must be present.
/// Blank-but-present names are a shape concern handled by [`validate_customer`].
pub fn require_names(input: &CustomerInput) -> Result<NewCustomer, CustomerError> {
    match (&input.first_name, &input.last_name) {
        (Some(first_name), Some(last_name)) => Ok(NewCustomer {
            first_name: first_name.clone(),
            middle_name: input.middle_name.clone(),
            last_name: last_name.clone(),
            email_address: input.email_address.clone().unwrap_or_default(),
            phone_number: input.phone_number.clone(),
        }),
        _ => Err(CustomerError::InvalidInput {
            message: "First name and last name are required.".to_string(),
            details: Vec::new(),
        }),
    }
}
