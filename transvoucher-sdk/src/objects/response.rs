//! Response envelope shared by every API endpoint.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// `{ success, data, message, errors }` wrapper around every response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(default)]
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub errors: Option<BTreeMap<String, Vec<String>>>,
}

impl<T> ApiResponse<T> {
    /// The payload of a successful response, if there is one.
    pub fn into_data(self) -> Option<T> {
        if self.success { self.data } else { None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_defaults() {
        let resp: ApiResponse<Vec<u32>> = serde_json::from_str(r#"{"success":true}"#).unwrap();
        assert!(resp.success);
        assert_eq!(resp.into_data(), None);

        let resp: ApiResponse<Vec<u32>> =
            serde_json::from_str(r#"{"success":false,"data":[1],"message":"nope"}"#).unwrap();
        assert_eq!(resp.message.as_deref(), Some("nope"));
        assert_eq!(resp.into_data(), None);

        let resp: ApiResponse<Vec<u32>> =
            serde_json::from_str(r#"{"success":true,"data":[1,2]}"#).unwrap();
        assert_eq!(resp.into_data(), Some(vec![1, 2]));
    }

    #[derive(Debug, PartialEq, Deserialize)]
    struct Ticket {
        code: String,
    }

    fn decode<T: serde::de::DeserializeOwned>(body: &str) -> ApiResponse<T> {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn test_envelope_with_non_default_payload() {
        let resp: ApiResponse<Ticket> = decode(r#"{"success":true,"data":{"code":"A1"}}"#);
        assert_eq!(resp.into_data(), Some(Ticket { code: "A1".to_owned() }));

        let resp: ApiResponse<Ticket> = decode(r#"{"success":true}"#);
        assert!(resp.message.is_none());
        assert!(resp.errors.is_none());
        assert_eq!(resp.into_data(), None);
    }
}
