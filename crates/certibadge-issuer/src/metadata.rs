//! Badge metadata object and content-address composition.
//!
//! The JSON shape — `name`, `description`, `image`, `attributes` with
//! `trait_type`/`value` pairs — is the interop contract with credential
//! viewers and must not change. Field order follows declaration order.

use serde::{Deserialize, Serialize};

use certibadge_core::Cid;

/// Filename under which the metadata object is uploaded.
pub const METADATA_FILENAME: &str = "metadata.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataAttribute {
    pub trait_type: String,
    pub value: String,
}

/// Immutable once constructed; exactly one per issuance attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataObject {
    pub name: String,
    pub description: String,
    /// Content address of the badge image.
    pub image: String,
    /// Exactly three attributes, always Course, Issuer, Date in that order.
    pub attributes: Vec<MetadataAttribute>,
}

impl MetadataObject {
    /// Build the metadata for one badge from the draft fields and the
    /// already-uploaded image's content address.
    pub fn for_badge(image_uri: &str, course_id: &str, issued_by: &str, issued_date: &str) -> Self {
        Self {
            name: course_id.to_string(),
            description: format!("Issued by {}", issued_by),
            image: image_uri.to_string(),
            attributes: vec![
                MetadataAttribute {
                    trait_type: "Course".to_string(),
                    value: course_id.to_string(),
                },
                MetadataAttribute {
                    trait_type: "Issuer".to_string(),
                    value: issued_by.to_string(),
                },
                MetadataAttribute {
                    trait_type: "Date".to_string(),
                    value: issued_date.to_string(),
                },
            ],
        }
    }

    /// Canonical JSON bytes for upload. serde_json emits struct fields in
    /// declaration order, which is the canonical order here.
    pub fn to_canonical_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

/// Compose a content address locator: `ipfs://<cid>/<filename>`.
pub fn ipfs_uri(cid: &Cid, filename: &str) -> String {
    format!("ipfs://{}/{}", cid, filename)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_badge_shape() {
        let meta = MetadataObject::for_badge(
            "ipfs://QmImg/badge.png",
            "CS101",
            "MIT",
            "2024-05-01",
        );
        assert_eq!(meta.name, "CS101");
        assert_eq!(meta.description, "Issued by MIT");
        assert_eq!(meta.image, "ipfs://QmImg/badge.png");
        assert_eq!(meta.attributes.len(), 3);
        assert_eq!(meta.attributes[0].trait_type, "Course");
        assert_eq!(meta.attributes[0].value, "CS101");
        assert_eq!(meta.attributes[1].trait_type, "Issuer");
        assert_eq!(meta.attributes[1].value, "MIT");
        assert_eq!(meta.attributes[2].trait_type, "Date");
        assert_eq!(meta.attributes[2].value, "2024-05-01");
    }

    #[test]
    fn test_canonical_json_field_order() {
        let meta = MetadataObject::for_badge("ipfs://QmImg/b.png", "CS101", "MIT", "2024-05-01");
        let json = String::from_utf8(meta.to_canonical_json().unwrap()).unwrap();
        let name_pos = json.find("\"name\"").unwrap();
        let desc_pos = json.find("\"description\"").unwrap();
        let image_pos = json.find("\"image\"").unwrap();
        let attrs_pos = json.find("\"attributes\"").unwrap();
        assert!(name_pos < desc_pos && desc_pos < image_pos && image_pos < attrs_pos);
    }

    #[test]
    fn test_canonical_json_interop_shape() {
        let meta = MetadataObject::for_badge("ipfs://QmImg/b.png", "CS101", "MIT", "2024-05-01");
        let value: serde_json::Value =
            serde_json::from_slice(&meta.to_canonical_json().unwrap()).unwrap();
        assert_eq!(value["name"], "CS101");
        assert_eq!(value["description"], "Issued by MIT");
        assert_eq!(value["attributes"][0]["trait_type"], "Course");
        assert_eq!(value["attributes"][2]["value"], "2024-05-01");
    }

    #[test]
    fn test_ipfs_uri() {
        let cid = Cid::new("Qm123");
        assert_eq!(ipfs_uri(&cid, "badge.png"), "ipfs://Qm123/badge.png");
        assert_eq!(
            ipfs_uri(&cid, METADATA_FILENAME),
            "ipfs://Qm123/metadata.json"
        );
    }

    #[test]
    fn test_metadata_roundtrip() {
        let meta = MetadataObject::for_badge("ipfs://QmImg/b.png", "CS101", "MIT", "2024-05-01");
        let bytes = meta.to_canonical_json().unwrap();
        let back: MetadataObject = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(meta, back);
    }
}
