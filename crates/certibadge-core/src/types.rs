use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Address — chain-native account identifier, 0x-prefixed 20-byte hex
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid address: {0}")]
pub struct InvalidAddress(pub String);

impl Address {
    /// Parse a canonical `0x`-prefixed 40-hex-digit address.
    pub fn parse(s: &str) -> Result<Self, InvalidAddress> {
        if is_canonical_address(s) {
            Ok(Self(s.to_string()))
        } else {
            Err(InvalidAddress(s.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The all-zero address, used by naming services to signal "no mapping".
    pub fn is_zero(&self) -> bool {
        self.0[2..].bytes().all(|b| b == b'0')
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether a recipient string is already a canonical address rather than
/// a human-readable name still awaiting resolution.
pub fn is_canonical_address(s: &str) -> bool {
    s.len() == 42 && s.starts_with("0x") && s[2..].bytes().all(|b| b.is_ascii_hexdigit())
}

// ---------------------------------------------------------------------------
// TxHash — 32-byte transaction hash, 0x-prefixed hex
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxHash(String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transaction hash: {0}")]
pub struct InvalidTxHash(pub String);

impl TxHash {
    pub fn parse(s: &str) -> Result<Self, InvalidTxHash> {
        let valid = s.len() == 66
            && s.starts_with("0x")
            && s[2..].bytes().all(|b| b.is_ascii_hexdigit());
        if valid {
            Ok(Self(s.to_string()))
        } else {
            Err(InvalidTxHash(s.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Cid — content identifier returned by the content store
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cid(String);

impl Cid {
    pub fn new(cid: impl Into<String>) -> Self {
        Self(cid.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Authorization — outcome of a wallet authorization prompt
// ---------------------------------------------------------------------------

/// A denial is an expected outcome, not a transport failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Authorization {
    /// The wallet approved and exposed the issuing account.
    Approved(Address),
    /// The user rejected the authorization prompt.
    Denied,
}

// ---------------------------------------------------------------------------
// ConfirmationStatus — submitted transactions are valid before inclusion
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfirmationStatus {
    /// The transaction is included by the underlying ledger.
    Confirmed,
    /// Not yet included within the wait bound. Not an error.
    Pending,
}

impl fmt::Display for ConfirmationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfirmationStatus::Confirmed => write!(f, "confirmed"),
            ConfirmationStatus::Pending => write!(f, "pending"),
        }
    }
}

// ---------------------------------------------------------------------------
// IssueBadgeCall — the issuance call arguments, in contract order
// ---------------------------------------------------------------------------

/// Arguments for `issueBadge(address,string,string,string,string)`.
/// Field order here is the argument order on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueBadgeCall {
    pub recipient: Address,
    pub course_id: String,
    pub issued_by: String,
    pub issued_date: String,
    pub metadata_uri: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_parse_canonical() {
        let addr = Address::parse("0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045").unwrap();
        assert_eq!(addr.as_str(), "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045");
        assert!(!addr.is_zero());
    }

    #[test]
    fn test_address_parse_rejects_names() {
        assert!(Address::parse("alice.eth").is_err());
        assert!(Address::parse("").is_err());
        assert!(Address::parse("0x1234").is_err());
        // right length, bad digit
        assert!(Address::parse("0xZZdA6BF26964aF9D7eEd9e03E53415D37aA96045").is_err());
    }

    #[test]
    fn test_address_zero() {
        let zero = Address::parse("0x0000000000000000000000000000000000000000").unwrap();
        assert!(zero.is_zero());
    }

    #[test]
    fn test_is_canonical_address() {
        assert!(is_canonical_address(
            "0x0000000000000000000000000000000000000001"
        ));
        assert!(!is_canonical_address("alice.eth"));
        assert!(!is_canonical_address("0x01"));
    }

    #[test]
    fn test_tx_hash_parse() {
        let h = TxHash::parse(
            "0xdeadbeefdeadbeefdeadbeefdeadbeefdeadbeefdeadbeefdeadbeefdeadbeef",
        )
        .unwrap();
        assert!(h.as_str().starts_with("0xdead"));
        assert!(TxHash::parse("0xdeadbeef").is_err());
    }

    #[test]
    fn test_address_serde_transparent() {
        let addr = Address::parse("0x0000000000000000000000000000000000000001").unwrap();
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, "\"0x0000000000000000000000000000000000000001\"");
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(addr, back);
    }

    #[test]
    fn test_confirmation_status_display() {
        assert_eq!(ConfirmationStatus::Confirmed.to_string(), "confirmed");
        assert_eq!(ConfirmationStatus::Pending.to_string(), "pending");
    }

    #[test]
    fn test_issue_badge_call_field_order() {
        let call = IssueBadgeCall {
            recipient: Address::parse("0x0000000000000000000000000000000000000001").unwrap(),
            course_id: "CS101".into(),
            issued_by: "MIT".into(),
            issued_date: "2024-05-01".into(),
            metadata_uri: "ipfs://Qm123/metadata.json".into(),
        };
        let json = serde_json::to_string(&call).unwrap();
        let recipient_pos = json.find("recipient").unwrap();
        let course_pos = json.find("course_id").unwrap();
        let uri_pos = json.find("metadata_uri").unwrap();
        assert!(recipient_pos < course_pos && course_pos < uri_pos);
    }
}
