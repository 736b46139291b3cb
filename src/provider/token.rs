//! Load-token envelope.
//!
//! Every piece of load data an adapter hands out is wrapped as
//! `{"adapter": "<id>", "data": <payload>}` so that `resolve_streams` can
//! refuse tokens minted by another adapter instead of misreading them.

use crate::{Error, Result};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

#[derive(Debug, Serialize, Deserialize)]
pub struct LoadToken<T> {
    pub adapter: String,
    pub data: T,
}

impl<T: Serialize> LoadToken<T> {
    /// Wrap `data` for the adapter `adapter` and serialize it
    pub fn encode(adapter: &str, data: T) -> Result<String> {
        let token = LoadToken {
            adapter: adapter.to_string(),
            data,
        };
        Ok(serde_json::to_string(&token)?)
    }
}

impl<T: DeserializeOwned> LoadToken<T> {
    /// Decode a token, checking that `adapter` minted it
    pub fn decode(adapter: &str, raw: &str) -> Result<T> {
        let token: LoadToken<serde_json::Value> = serde_json::from_str(raw)
            .map_err(|e| Error::InvalidToken(format!("not a load token: {e}")))?;

        if token.adapter != adapter {
            return Err(Error::TokenMismatch {
                expected: adapter.to_string(),
                found: token.adapter,
            });
        }

        serde_json::from_value(token.data)
            .map_err(|e| Error::InvalidToken(format!("unexpected payload for {adapter}: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_foreign_token_is_rejected() {
        let raw = LoadToken::encode("arte", "RC-014095").unwrap();

        let err = LoadToken::<String>::decode("kinoger", &raw).unwrap_err();
        assert!(matches!(
            err,
            Error::TokenMismatch { ref expected, ref found } if expected == "kinoger" && found == "arte"
        ));
        assert_eq!(LoadToken::<String>::decode("arte", &raw).unwrap(), "RC-014095");
    }

    #[test]
    fn test_garbage_and_wrong_shape() {
        assert!(matches!(
            LoadToken::<String>::decode("arte", "https://example.com"),
            Err(Error::InvalidToken(_))
        ));

        let raw = LoadToken::encode("arte", vec![1, 2]).unwrap();
        assert!(matches!(
            LoadToken::<String>::decode("arte", &raw),
            Err(Error::InvalidToken(_))
        ));
    }
}
