//! Domain ID Types with NewType Pattern
//!
//! Client and secret identifiers are opaque, caller-supplied strings. The only
//! rule the vault enforces is that they are non-empty; construction through
//! [`ClientId::parse`] / [`SecretId::parse`] is the single place that rule lives.

use serde::{Deserialize, Serialize};
use sqlx::encode::IsNull;
use sqlx::error::BoxDynError;
use sqlx::{Decode, Encode, Sqlite, Type};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::errors::DeadswitchError;

/// Macro to generate NewType ID wrappers with all required traits
macro_rules! domain_id {
    ($(#[$meta:meta])* $name:ident, $field:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Parse a caller-supplied identifier, rejecting empty values
            pub fn parse(s: &str) -> Result<Self, DeadswitchError> {
                if s.is_empty() {
                    return Err(DeadswitchError::validation_field(
                        concat!($field, " must not be empty"),
                        $field,
                    ));
                }
                Ok(Self(s.to_string()))
            }

            /// Get the inner string value
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = DeadswitchError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = DeadswitchError;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                Self::parse(&s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        // SQLx trait implementations for database compatibility
        impl Type<Sqlite> for $name {
            fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
                <String as Type<Sqlite>>::type_info()
            }
        }

        impl<'q> Encode<'q, Sqlite> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut Vec<sqlx::sqlite::SqliteArgumentValue<'q>>,
            ) -> Result<IsNull, BoxDynError> {
                <String as Encode<'q, Sqlite>>::encode_by_ref(&self.0, buf)
            }
        }

        impl<'r> Decode<'r, Sqlite> for $name {
            fn decode(value: sqlx::sqlite::SqliteValueRef<'r>) -> Result<Self, BoxDynError> {
                let s = <String as Decode<'r, Sqlite>>::decode(value)?;
                Ok(Self::parse(&s)?)
            }
        }
    };
}

domain_id!(
    /// Identifier of a client that sends heartbeats and owns secrets
    ClientId,
    "client_id"
);

domain_id!(
    /// Identifier of a secret, unique within its client's namespace
    SecretId,
    "secret_id"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_opaque_values() {
        let id = ClientId::parse("7f9c0a1e-client").unwrap();
        assert_eq!(id.as_str(), "7f9c0a1e-client");
        assert_eq!(id.to_string(), "7f9c0a1e-client");

        // Not required to be a UUID
        let id: SecretId = "backup key #2".parse().unwrap();
        assert_eq!(String::from(id), "backup key #2");
    }

    #[test]
    fn test_parse_rejects_empty() {
        let err = ClientId::parse("").unwrap_err();
        assert!(matches!(err, DeadswitchError::Validation { field: Some(ref f), .. } if f == "client_id"));

        let err = SecretId::parse("").unwrap_err();
        assert!(matches!(err, DeadswitchError::Validation { field: Some(ref f), .. } if f == "secret_id"));
    }

    #[test]
    fn test_serde_roundtrip_validates() {
        let id = ClientId::parse("alice").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"alice\"");

        assert!(serde_json::from_str::<ClientId>("\"\"").is_err());
    }
}
