//! Request routing and validation.
//!
//! Turns the raw shape of an inbound call (operation kind, method, path
//! identifiers, body) into a typed [`VaultRequest`]. Anything malformed is
//! rejected here, before any store is touched.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::domain::{ClientId, SecretId};
use crate::errors::{DeadswitchError, Result};

/// Operation kind, taken from the path segment after `/api/vault/`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    /// `alive`
    Heartbeat,
    /// `store`
    SecretAccess,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Heartbeat => "alive",
            OperationKind::SecretAccess => "store",
        }
    }
}

impl FromStr for OperationKind {
    type Err = DeadswitchError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "alive" => Ok(OperationKind::Heartbeat),
            "store" => Ok(OperationKind::SecretAccess),
            other => Err(DeadswitchError::not_found("operation", other)),
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request methods the vault understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VaultMethod {
    Get,
    Post,
    Delete,
}

impl FromStr for VaultMethod {
    type Err = DeadswitchError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "GET" => Ok(VaultMethod::Get),
            "POST" => Ok(VaultMethod::Post),
            "DELETE" => Ok(VaultMethod::Delete),
            other => Err(DeadswitchError::not_found("method", other)),
        }
    }
}

/// JSON body of a deposit
#[derive(Debug, Clone, Deserialize)]
pub struct DepositBody {
    pub key: String,
    pub process_after: u32,
}

/// A validated vault operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VaultRequest {
    Heartbeat { client_id: ClientId },
    GetSecret { client_id: ClientId, secret_id: SecretId },
    DeleteSecret { client_id: ClientId, secret_id: SecretId },
    DepositSecret { client_id: ClientId, secret_id: SecretId, payload: String, wait_periods: u32 },
}

impl VaultRequest {
    /// Validate an inbound call.
    ///
    /// Every rejection is a [`DeadswitchError::Validation`] or
    /// [`DeadswitchError::NotFound`], both of which surface as 404.
    pub fn parse(
        kind: OperationKind,
        method: VaultMethod,
        client_id: Option<&str>,
        secret_id: Option<&str>,
        body: Option<&[u8]>,
    ) -> Result<Self> {
        let client_id = ClientId::parse(client_id.unwrap_or_default())?;

        match kind {
            OperationKind::Heartbeat => {
                if secret_id.is_some() {
                    return Err(DeadswitchError::not_found("route", "alive with secret id"));
                }
                match method {
                    VaultMethod::Get | VaultMethod::Post => Ok(VaultRequest::Heartbeat { client_id }),
                    VaultMethod::Delete => Err(DeadswitchError::not_found("route", "DELETE alive")),
                }
            }
            OperationKind::SecretAccess => {
                let secret_id = SecretId::parse(secret_id.unwrap_or_default())?;
                match method {
                    VaultMethod::Get => Ok(VaultRequest::GetSecret { client_id, secret_id }),
                    VaultMethod::Delete => Ok(VaultRequest::DeleteSecret { client_id, secret_id }),
                    VaultMethod::Post => {
                        let deposit = parse_deposit_body(body)?;
                        Ok(VaultRequest::DepositSecret {
                            client_id,
                            secret_id,
                            payload: deposit.key,
                            wait_periods: deposit.process_after,
                        })
                    }
                }
            }
        }
    }

    /// Parse from raw strings, as they arrive off the wire
    pub fn parse_raw(
        kind: &str,
        method: &str,
        client_id: Option<&str>,
        secret_id: Option<&str>,
        body: Option<&[u8]>,
    ) -> Result<Self> {
        Self::parse(kind.parse()?, method.parse()?, client_id, secret_id, body)
    }

    pub fn client_id(&self) -> &ClientId {
        match self {
            VaultRequest::Heartbeat { client_id }
            | VaultRequest::GetSecret { client_id, .. }
            | VaultRequest::DeleteSecret { client_id, .. }
            | VaultRequest::DepositSecret { client_id, .. } => client_id,
        }
    }

    /// Operation label used in logs and metrics
    pub fn operation(&self) -> &'static str {
        match self {
            VaultRequest::Heartbeat { .. } => "heartbeat",
            VaultRequest::GetSecret { .. } => "get",
            VaultRequest::DeleteSecret { .. } => "delete",
            VaultRequest::DepositSecret { .. } => "deposit",
        }
    }
}

/// Validated during parsing, so a malformed body is rejected before the store
/// is asked whether the key is taken. Both outcomes answer 404.
fn parse_deposit_body(body: Option<&[u8]>) -> Result<DepositBody> {
    let body = match body {
        Some(bytes) if !bytes.is_empty() => bytes,
        _ => return Err(DeadswitchError::validation("Request body is required")),
    };

    let deposit: DepositBody = serde_json::from_slice(body).map_err(|e| {
        DeadswitchError::validation(format!("Invalid deposit body: {}", e))
    })?;

    if deposit.key.is_empty() {
        return Err(DeadswitchError::validation_field("key must be provided", "key"));
    }

    Ok(deposit)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deposit(body: &str) -> Result<VaultRequest> {
        VaultRequest::parse(
            OperationKind::SecretAccess,
            VaultMethod::Post,
            Some("alice"),
            Some("s1"),
            Some(body.as_bytes()),
        )
    }

    fn is_rejection(result: Result<VaultRequest>) -> bool {
        matches!(result, Err(e) if e.status_code() == 404)
    }

    #[test]
    fn test_heartbeat_accepts_get_and_post() {
        for method in [VaultMethod::Get, VaultMethod::Post] {
            let request =
                VaultRequest::parse(OperationKind::Heartbeat, method, Some("alice"), None, None)
                    .unwrap();
            assert_eq!(request, VaultRequest::Heartbeat { client_id: ClientId::parse("alice").unwrap() });
        }
    }

    #[test]
    fn test_heartbeat_rejects_delete() {
        let result =
            VaultRequest::parse(OperationKind::Heartbeat, VaultMethod::Delete, Some("alice"), None, None);
        assert!(is_rejection(result));
    }

    #[test]
    fn test_heartbeat_rejects_secret_id() {
        let result = VaultRequest::parse(
            OperationKind::Heartbeat,
            VaultMethod::Post,
            Some("alice"),
            Some("s1"),
            None,
        );
        assert!(is_rejection(result));
    }

    #[test]
    fn test_unknown_kind_and_method_are_rejected() {
        assert!(is_rejection(VaultRequest::parse_raw("admin", "GET", Some("alice"), None, None)));
        assert!(is_rejection(VaultRequest::parse_raw("store", "PUT", Some("alice"), Some("s1"), None)));
    }

    #[test]
    fn test_missing_or_empty_identifiers_are_rejected() {
        for kind in [OperationKind::Heartbeat, OperationKind::SecretAccess] {
            assert!(is_rejection(VaultRequest::parse(kind, VaultMethod::Get, None, Some("s1"), None)));
            assert!(is_rejection(VaultRequest::parse(kind, VaultMethod::Get, Some(""), Some("s1"), None)));
        }
        for method in [VaultMethod::Get, VaultMethod::Delete, VaultMethod::Post] {
            assert!(is_rejection(VaultRequest::parse(
                OperationKind::SecretAccess,
                method,
                Some("alice"),
                None,
                Some(br#"{"key":"k","process_after":1}"#),
            )));
            assert!(is_rejection(VaultRequest::parse(
                OperationKind::SecretAccess,
                method,
                Some("alice"),
                Some(""),
                Some(br#"{"key":"k","process_after":1}"#),
            )));
        }
    }

    #[test]
    fn test_valid_deposit() {
        let request = deposit(r#"{"key":"the payload","process_after":3}"#).unwrap();
        assert_eq!(
            request,
            VaultRequest::DepositSecret {
                client_id: ClientId::parse("alice").unwrap(),
                secret_id: SecretId::parse("s1").unwrap(),
                payload: "the payload".to_string(),
                wait_periods: 3,
            }
        );
        assert_eq!(request.operation(), "deposit");
        assert_eq!(request.client_id().as_str(), "alice");
    }

    #[test]
    fn test_operation_labels() {
        let alice = || ClientId::parse("alice").unwrap();
        let s1 = || SecretId::parse("s1").unwrap();

        assert_eq!(VaultRequest::Heartbeat { client_id: alice() }.operation(), "heartbeat");
        assert_eq!(VaultRequest::GetSecret { client_id: alice(), secret_id: s1() }.operation(), "get");
        assert_eq!(
            VaultRequest::DeleteSecret { client_id: alice(), secret_id: s1() }.operation(),
            "delete"
        );
    }

    #[test]
    fn test_zero_wait_periods_is_accepted() {
        assert!(deposit(r#"{"key":"k","process_after":0}"#).is_ok());
    }

    #[test]
    fn test_malformed_deposit_bodies_are_rejected() {
        let bodies = [
            "",
            "not json",
            "[1,2]",
            r#"{"process_after":1}"#,
            r#"{"key":"k"}"#,
            r#"{"key":"","process_after":1}"#,
            r#"{"key":"k","process_after":-1}"#,
            r#"{"key":"k","process_after":1.5}"#,
            r#"{"key":"k","process_after":"1"}"#,
            r#"{"key":"k","process_after":4294967296}"#,
            r#"{"key":7,"process_after":1}"#,
        ];
        for body in bodies {
            assert!(is_rejection(deposit(body)), "body should be rejected: {body}");
        }
    }

    #[test]
    fn test_absent_body_is_rejected() {
        let result = VaultRequest::parse(
            OperationKind::SecretAccess,
            VaultMethod::Post,
            Some("alice"),
            Some("s1"),
            None,
        );
        assert!(is_rejection(result));
    }
}
