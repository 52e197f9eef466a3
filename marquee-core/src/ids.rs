use serde::{Deserialize, Serialize};
use std::fmt;

use crate::HoldError;

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Rejects ids that cannot be embedded in a ledger key.
            pub fn validate(&self) -> Result<(), HoldError> {
                validate_segment($label, &self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

opaque_id!(
    /// Customer on whose behalf tickets are held.
    CustomerId,
    "customer id"
);
opaque_id!(
    /// Screening that scopes which tickets compete with each other.
    ShowtimeId,
    "showtime id"
);
opaque_id!(
    /// Externally issued ticket (seat) identifier.
    TicketId,
    "ticket id"
);

fn validate_segment(label: &str, value: &str) -> Result<(), HoldError> {
    if value.is_empty() {
        return Err(HoldError::InvalidInput(format!("{} must not be empty", label)));
    }
    if value.contains(':') {
        return Err(HoldError::InvalidInput(format!("{} must not contain ':': {:?}", label, value)));
    }
    if value.contains(|c| c == '{' || c == '}') {
        return Err(HoldError::InvalidInput(format!("{} must not contain braces: {:?}", label, value)));
    }
    if value.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(HoldError::InvalidInput(format!(
            "{} must not contain whitespace or control characters: {:?}",
            label, value
        )));
    }
    Ok(())
}
