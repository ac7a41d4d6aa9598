use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::CustomerError;

pub const INVALID_ID_MESSAGE: &str = "Invalid UUID format.";

const HYPHENATED_LEN: usize = 36;
const HYPHEN_POSITIONS: [usize; 4] = [8, 13, 18, 23];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(pub Uuid);

impl CustomerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parses a path or CLI argument into an id. Only the canonical 36-character
    /// hyphenated form is accepted: no surrounding whitespace, braces, `urn:uuid:`
    /// prefix or simple (unhyphenated) form.
    pub fn parse(raw: &str) -> Result<Self, CustomerError> {
        let invalid = || CustomerError::InvalidInput {
            message: INVALID_ID_MESSAGE.to_string(),
            details: vec![format!("`{raw}` is not a valid UUID")],
        };

        let bytes = raw.as_bytes();
        let hyphenated = bytes.len() == HYPHENATED_LEN
            && HYPHEN_POSITIONS.iter().all(|&position| bytes[position] == b'-');
        if !hyphenated {
            return Err(invalid());
        }
        Uuid::parse_str(raw).map(Self).map_err(|_| invalid())
    }
}

impl Default for CustomerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    #[schema(value_type = String, format = Uuid)]
    pub id: CustomerId,
    #[schema(example = "Ada")]
    pub first_name: String,
    pub middle_name: Option<String>,
    #[schema(example = "Lovelace")]
    pub last_name: String,
    #[schema(example = "ada@example.com")]
    pub email_address: String,
    #[schema(example = "+441234567890")]
    pub phone_number: Option<String>,
}

/// Request payload for create and update. Every field is optional so that
/// missing values reach validation instead of failing deserialization.
/// `id` is accepted for compatibility and ignored; the path id is authoritative.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    #[schema(max_length = 50)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub middle_name: Option<String>,
    #[serde(default)]
    #[schema(max_length = 50)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email_address: Option<String>,
    #[serde(default)]
    #[schema(pattern = r"^\+?[1-9]\d{1,14}$")]
    pub phone_number: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewCustomer {
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub email_address: String,
    pub phone_number: Option<String>,
}

impl NewCustomer {
    pub fn with_id(self, id: CustomerId) -> Customer {
        Customer {
            id,
            first_name: self.first_name,
            middle_name: self.middle_name,
            last_name: self.last_name,
            email_address: self.email_address,
            phone_number: self.phone_number,
        }
    }
}

impl Customer {
    /// Overwrites the mutable contact fields from `input`. `id` and
    /// `middle_name` are left untouched; absent values become blank/None.
    pub fn overwrite_from(&mut self, input: &CustomerInput) {
        self.first_name = input.first_name.clone().unwrap_or_default();
        self.last_name = input.last_name.clone().unwrap_or_default();
        self.email_address = input.email_address.clone().unwrap_or_default();
        self.phone_number = input.phone_number.clone();
    }
}
