//! Envelope encode and decode commands

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::Value as JsonValue;

use super::build_wire_codec;
use crate::config::Config;
use crate::error::{AvrowireError, Result};

/// Encode a JSON value for `subject` and print the envelope
///
/// Prints lowercase hex unless `as_base64` is set.
pub async fn encode(config: &Config, subject: &str, json: &str, as_base64: bool) -> Result<()> {
    let value: JsonValue = serde_json::from_str(json)
        .map_err(|e| AvrowireError::Input(format!("Invalid JSON value: {}", e)))?;

    let wire = build_wire_codec(config, Some(subject)).await?;
    let envelope = wire.encode(subject, &value)?;

    tracing::debug!(subject, bytes = envelope.len(), "Encoded envelope");

    if as_base64 {
        println!("{}", STANDARD.encode(&envelope));
    } else {
        println!("{}", hex::encode(&envelope));
    }
    Ok(())
}

/// Decode an envelope given as hex or base64 and print the JSON value
///
/// The schema id must belong to one of the configured `schemas`.
pub async fn decode(config: &Config, hex: Option<&str>, base64: Option<&str>) -> Result<()> {
    let envelope = match (hex, base64) {
        (Some(h), _) => from_hex(h)?,
        (None, Some(b)) => STANDARD
            .decode(b.trim())
            .map_err(|e| AvrowireError::Input(format!("Invalid base64 envelope: {}", e)))?,
        (None, None) => {
            return Err(AvrowireError::Input("No envelope given".to_string()).into());
        }
    };

    let wire = build_wire_codec(config, None).await?;
    println!("{}", wire.decode_to_string(&envelope)?);
    Ok(())
}

/// Parse hex text, ignoring whitespace and an optional `0x` prefix
pub fn from_hex(text: &str) -> Result<Vec<u8>> {
    let cleaned: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    let digits = cleaned
        .strip_prefix("0x")
        .or_else(|| cleaned.strip_prefix("0X"))
        .unwrap_or(&cleaned);

    hex::decode(digits)
        .map_err(|e| AvrowireError::Input(format!("Invalid hex envelope: {}", e)).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hex() {
        assert_eq!(from_hex("000000000714").unwrap(), vec![0, 0, 0, 0, 7, 0x14]);
        assert_eq!(from_hex("0xFF0a").unwrap(), vec![0xff, 0x0a]);
        assert_eq!(from_hex("0X0a").unwrap(), vec![0x0a]);
        assert!(from_hex("").unwrap().is_empty());
        assert_eq!(from_hex("00 00 00 00 07 14\n").unwrap(), vec![0, 0, 0, 0, 7, 0x14]);
    }

    #[test]
    fn test_from_hex_rejects_odd_length() {
        let err = from_hex("abc").unwrap_err();
        assert_eq!(err.to_string(), "Invalid input: Invalid hex envelope: Odd number of digits");
    }

    #[test]
    fn test_from_hex_rejects_non_hex() {
        let err = from_hex("00zz").unwrap_err();
        assert!(err.to_string().contains("Invalid hex envelope"));
        assert!(matches!(
            err.downcast_ref::<AvrowireError>(),
            Some(AvrowireError::Input(_))
        ));
    }

    #[test]
    fn test_from_hex_rejects_multibyte_text() {
        assert!(from_hex("é").is_err());
        assert!(from_hex("aéa").is_err());
    }
}
