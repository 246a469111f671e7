//! Decoding of on-chain token metadata.
//!
//! The game contract renders its token URIs as `data:application/json;base64,<payload>`.

use anyhow::{Context, Result};
use base64::{Engine, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};

const JSON_DATA_URI_PREFIX: &str = "data:application/json;base64,";

/// A single metadata attribute, e.g. `{"trait_type": "Health Points", "value": 1000, "max_value": 1000}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenAttribute {
    pub trait_type: String,
    pub value: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<serde_json::Value>,
}

/// ERC-721 metadata JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenMetadata {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub attributes: Vec<TokenAttribute>,
}

impl TokenMetadata {
    /// Decode a base64 JSON data URI. Any other URI scheme yields `Ok(None)`.
    pub fn from_token_uri(uri: &str) -> Result<Option<Self>> {
        let Some(payload) = uri.strip_prefix(JSON_DATA_URI_PREFIX) else {
            return Ok(None);
        };

        let json = STANDARD
            .decode(payload.trim())
            .context("Token URI payload is not valid base64")?;
        let metadata =
            serde_json::from_slice(&json).context("Token URI payload is not valid metadata JSON")?;

        Ok(Some(metadata))
    }

    pub fn attribute(&self, trait_type: &str) -> Option<&TokenAttribute> {
        self.attributes.iter().find(|a| a.trait_type == trait_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data_uri(json: &str) -> String {
        format!("{}{}", JSON_DATA_URI_PREFIX, STANDARD.encode(json))
    }

    #[test]
    fn test_decode_data_uri() {
        let uri = data_uri(
            r#"{"name": "Mike Tyson -- NFT #: 1", "description": "This is an NFT that lets people play in the game Punch-Out!", "image": "https://charactersdb.com/wp-content/uploads/mike-tyson-punch-out-1.jpg", "attributes": [ { "trait_type": "Health Points", "value": 1000, "max_value":1000}, { "trait_type": "Attack Damage", "value": 90} ]}"#,
        );

        let metadata = TokenMetadata::from_token_uri(&uri).unwrap().unwrap();
        assert_eq!(metadata.name, "Mike Tyson -- NFT #: 1");
        assert_eq!(metadata.attributes.len(), 2);

        let hp = metadata.attribute("Health Points").unwrap();
        assert_eq!(hp.value, serde_json::json!(1000));
        assert_eq!(hp.max_value, Some(serde_json::json!(1000)));
        assert!(metadata.attribute("Attack Damage").unwrap().max_value.is_none());
    }

    #[test]
    fn test_non_data_uri_is_ignored() {
        assert_eq!(
            TokenMetadata::from_token_uri("ipfs://QmSomething/1.json").unwrap(),
            None
        );
    }

    #[test]
    fn test_malformed_payload_is_an_error() {
        assert!(TokenMetadata::from_token_uri("data:application/json;base64,!!!").is_err());
        assert!(TokenMetadata::from_token_uri(&data_uri("{not json")).is_err());
    }
}
