//! Event payload encoding
//!
//! Events are stored as a kind column plus a JSON payload so new event kinds
//! don't need schema changes.

use crate::StoreError;
use serde_json::{json, Value};
use testament_domain::{Address, TestamentEvent};

/// JSON fields of an event, without its kind
///
/// The same shape is stored in the `events` table and served over HTTP.
pub fn payload(event: &TestamentEvent) -> Value {
    match event {
        TestamentEvent::TestamentCreated {
            owner,
            heir,
            notary,
            unlock_time,
        } => json!({
            "owner": owner.to_string(),
            "heir": heir.to_string(),
            "notary": notary.to_string(),
            "unlock_time": unlock_time,
        }),
        TestamentEvent::DeathConfirmed { notary } => json!({
            "notary": notary.to_string(),
        }),
        TestamentEvent::TestamentUnlocked {
            heir,
            document_hash,
        } => json!({
            "heir": heir.to_string(),
            "document_hash": document_hash,
        }),
        TestamentEvent::HeirUpdated { previous, new }
        | TestamentEvent::NotaryUpdated { previous, new } => json!({
            "previous": previous.to_string(),
            "new": new.to_string(),
        }),
    }
}

/// Encode an event as `(kind, payload)`
pub(crate) fn encode(event: &TestamentEvent) -> (&'static str, String) {
    (event.name(), payload(event).to_string())
}

/// Decode a stored `(kind, payload)` pair
pub(crate) fn decode(kind: &str, payload: &str) -> Result<TestamentEvent, StoreError> {
    let value: Value = serde_json::from_str(payload)?;

    let event = match kind {
        "TestamentCreated" => TestamentEvent::TestamentCreated {
            owner: address(&value, "owner")?,
            heir: address(&value, "heir")?,
            notary: address(&value, "notary")?,
            unlock_time: value["unlock_time"].as_u64().ok_or_else(|| {
                StoreError::InvalidData("TestamentCreated without unlock_time".to_string())
            })?,
        },
        "DeathConfirmed" => TestamentEvent::DeathConfirmed {
            notary: address(&value, "notary")?,
        },
        "TestamentUnlocked" => TestamentEvent::TestamentUnlocked {
            heir: address(&value, "heir")?,
            document_hash: text(&value, "document_hash")?.to_string(),
        },
        "HeirUpdated" => TestamentEvent::HeirUpdated {
            previous: address(&value, "previous")?,
            new: address(&value, "new")?,
        },
        "NotaryUpdated" => TestamentEvent::NotaryUpdated {
            previous: address(&value, "previous")?,
            new: address(&value, "new")?,
        },
        other => {
            return Err(StoreError::InvalidData(format!(
                "Unknown event kind: {}",
                other
            )))
        }
    };
    Ok(event)
}

fn text<'a>(value: &'a Value, field: &str) -> Result<&'a str, StoreError> {
    value[field]
        .as_str()
        .ok_or_else(|| StoreError::InvalidData(format!("Missing field: {}", field)))
}

fn address(value: &Value, field: &str) -> Result<Address, StoreError> {
    Address::parse(text(value, field)?).map_err(|e| StoreError::InvalidData(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_unlocked() {
        let heir = Address::from_bytes([7u8; 20]);
        let event = TestamentEvent::TestamentUnlocked {
            heir,
            document_hash: "QmHash123456789".to_string(),
        };

        let (kind, payload) = encode(&event);
        assert_eq!(kind, "TestamentUnlocked");
        assert_eq!(decode(kind, &payload).unwrap(), event);
    }

    #[test]
    fn test_payload_fields() {
        let previous = Address::from_bytes([1u8; 20]);
        let new = Address::from_bytes([2u8; 20]);
        let value = payload(&TestamentEvent::NotaryUpdated { previous, new });

        assert_eq!(value["previous"], previous.to_string());
        assert_eq!(value["new"], new.to_string());
        assert!(value.get("notary").is_none());
    }

    #[test]
    fn test_decode_rejects_unknown_kind() {
        assert!(matches!(
            decode("Revived", "{}"),
            Err(StoreError::InvalidData(_))
        ));
    }

    #[test]
    fn test_decode_rejects_missing_field() {
        assert!(decode("DeathConfirmed", r#"{"who":"nobody"}"#).is_err());
        assert!(decode("DeathConfirmed", "not json").is_err());
    }
}
