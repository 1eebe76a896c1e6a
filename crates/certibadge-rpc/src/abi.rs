//! Calldata encoding and name hashing.
//!
//! Hand-rolled for the two call shapes this crate actually makes: the
//! five-argument `issueBadge` call and single-`bytes32` resolver lookups.
//! Dynamic strings follow the standard head/tail layout: a 32-byte offset
//! per string in the head, then length-prefixed, zero-padded data.

use sha3::{Digest, Keccak256};

use certibadge_core::{Address, GatewayError, GatewayResult, IssueBadgeCall};

/// ABI signature of the issuance call. Argument order is the contract's.
pub const ISSUE_BADGE_SIGNATURE: &str = "issueBadge(address,string,string,string,string)";

pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// 4-byte function selector: first four bytes of keccak256(signature).
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// ENS namehash: fold keccak over the labels from the TLD down.
/// namehash("") is the zero node.
pub fn namehash(name: &str) -> [u8; 32] {
    let mut node = [0u8; 32];
    if name.is_empty() {
        return node;
    }
    for label in name.split('.').rev() {
        let label_hash = keccak256(label.as_bytes());
        let mut buf = [0u8; 64];
        buf[..32].copy_from_slice(&node);
        buf[32..].copy_from_slice(&label_hash);
        node = keccak256(&buf);
    }
    node
}

fn encode_u256(value: u64) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[24..].copy_from_slice(&value.to_be_bytes());
    word
}

fn encode_address(address: &Address) -> GatewayResult<[u8; 32]> {
    let bytes = hex::decode(&address.as_str()[2..])
        .map_err(|e| GatewayError::Serialization(format!("address hex: {}", e)))?;
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(&bytes);
    Ok(word)
}

/// Length word plus zero-padded UTF-8 data.
fn encode_string_tail(s: &str) -> Vec<u8> {
    let bytes = s.as_bytes();
    let padded_len = (bytes.len() + 31) / 32 * 32;
    let mut tail = Vec::with_capacity(32 + padded_len);
    tail.extend_from_slice(&encode_u256(bytes.len() as u64));
    tail.extend_from_slice(bytes);
    tail.resize(32 + padded_len, 0);
    tail
}

/// Full calldata for `issueBadge(address,string,string,string,string)`.
pub fn encode_issue_badge(call: &IssueBadgeCall) -> GatewayResult<Vec<u8>> {
    let strings = [
        call.course_id.as_str(),
        call.issued_by.as_str(),
        call.issued_date.as_str(),
        call.metadata_uri.as_str(),
    ];
    let tails: Vec<Vec<u8>> = strings.iter().map(|s| encode_string_tail(s)).collect();

    let head_len = 5 * 32u64;
    let mut data = Vec::new();
    data.extend_from_slice(&selector(ISSUE_BADGE_SIGNATURE));
    data.extend_from_slice(&encode_address(&call.recipient)?);
    let mut offset = head_len;
    for tail in &tails {
        data.extend_from_slice(&encode_u256(offset));
        offset += tail.len() as u64;
    }
    for tail in &tails {
        data.extend_from_slice(tail);
    }
    Ok(data)
}

/// Calldata for a call taking a single `bytes32` argument.
pub fn encode_bytes32_call(selector: [u8; 4], arg: &[u8; 32]) -> Vec<u8> {
    let mut data = Vec::with_capacity(36);
    data.extend_from_slice(&selector);
    data.extend_from_slice(arg);
    data
}

/// Decode an `eth_call` result word holding an address.
pub fn decode_address_word(word: &str) -> GatewayResult<Address> {
    let raw = word.strip_prefix("0x").unwrap_or(word);
    if raw.len() != 64 {
        return Err(GatewayError::Protocol(format!(
            "expected a 32-byte word, got {} hex chars",
            raw.len()
        )));
    }
    let address = format!("0x{}", &raw[24..]);
    Address::parse(&address).map_err(|e| GatewayError::Protocol(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keccak256_empty_input() {
        assert_eq!(
            hex::encode(keccak256(b"")),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn test_known_selectors() {
        assert_eq!(hex::encode(selector("addr(bytes32)")), "3b3b57de");
        assert_eq!(hex::encode(selector("resolver(bytes32)")), "0178b8bf");
        assert_eq!(hex::encode(selector("transfer(address,uint256)")), "a9059cbb");
    }

    #[test]
    fn test_namehash_vectors() {
        assert_eq!(namehash(""), [0u8; 32]);
        assert_eq!(
            hex::encode(namehash("eth")),
            "93cdeb708b7545dc668eb9280176169d1c33cfd8ed6f04690a0bcc88a93fc4ae"
        );
        assert_eq!(
            hex::encode(namehash("foo.eth")),
            "de9b09fd7c5f901e23a3f19fecc54828e9c848539801e86591bd9801b019f84f"
        );
    }

    #[test]
    fn test_encode_string_tail_padding() {
        let tail = encode_string_tail("CS101");
        assert_eq!(tail.len(), 64);
        // Length word says 5.
        assert_eq!(tail[31], 5);
        assert_eq!(&tail[32..37], b"CS101");
        assert!(tail[37..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_encode_string_tail_exact_word() {
        let tail = encode_string_tail(&"a".repeat(32));
        assert_eq!(tail.len(), 64);
        assert_eq!(tail[31], 32);
    }

    #[test]
    fn test_encode_issue_badge_layout() {
        let call = IssueBadgeCall {
            recipient: Address::parse("0x00000000000000000000000000000000000000aB").unwrap(),
            course_id: "CS101".into(),
            issued_by: "MIT".into(),
            issued_date: "2024-05-01".into(),
            metadata_uri: "ipfs://Qm123/metadata.json".into(),
        };
        let data = encode_issue_badge(&call).unwrap();

        assert_eq!(&data[..4], &selector(ISSUE_BADGE_SIGNATURE));
        // Address word: 12 zero bytes then the 20 address bytes.
        assert!(data[4..16].iter().all(|&b| b == 0));
        assert_eq!(data[4 + 31], 0xAB);
        // First dynamic offset points past the 5-word head.
        let first_offset = &data[4 + 32..4 + 64];
        assert_eq!(first_offset[31], 160);
        // Tail for "CS101" starts right after the head.
        let tail_start = 4 + 160;
        assert_eq!(data[tail_start + 31], 5);
        assert_eq!(&data[tail_start + 32..tail_start + 37], b"CS101");
    }

    #[test]
    fn test_encode_issue_badge_offsets_are_sequential() {
        let call = IssueBadgeCall {
            recipient: Address::parse("0x00000000000000000000000000000000000000aB").unwrap(),
            course_id: "a".into(),
            issued_by: "bb".into(),
            issued_date: "ccc".into(),
            metadata_uri: "dddd".into(),
        };
        let data = encode_issue_badge(&call).unwrap();
        // Each short string occupies one length word + one data word.
        let offsets: Vec<u64> = (1..5)
            .map(|i| {
                let word = &data[4 + i * 32..4 + (i + 1) * 32];
                u64::from_be_bytes(word[24..].try_into().unwrap())
            })
            .collect();
        assert_eq!(offsets, [160, 224, 288, 352]);
    }

    #[test]
    fn test_encode_bytes32_call() {
        let node = namehash("foo.eth");
        let data = encode_bytes32_call(selector("addr(bytes32)"), &node);
        assert_eq!(data.len(), 36);
        assert_eq!(hex::encode(&data[..4]), "3b3b57de");
        assert_eq!(&data[4..], &node);
    }

    #[test]
    fn test_decode_address_word() {
        let word = "0x000000000000000000000000d8da6bf26964af9d7eed9e03e53415d37aa96045";
        let address = decode_address_word(word).unwrap();
        assert_eq!(
            address.as_str(),
            "0xd8da6bf26964af9d7eed9e03e53415d37aa96045"
        );
    }

    #[test]
    fn test_decode_address_word_zero() {
        let word = format!("0x{}", "0".repeat(64));
        assert!(decode_address_word(&word).unwrap().is_zero());
    }

    #[test]
    fn test_decode_address_word_rejects_short_input() {
        assert!(decode_address_word("0x1234").is_err());
    }
}
