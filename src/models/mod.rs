use serde::{Deserialize, Serialize};

/// Remote documents are plain JSON objects owned by the document store.
pub type Document = serde_json::Map<String, serde_json::Value>;

pub const USERS_COLLECTION: &str = "users";
pub const JOURNALS_COLLECTION: &str = "journals";

/// Signed-in account as reported by the auth provider.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct AuthUser {
    pub uid: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Floating-point degrees. Values from the sensor or the picker are trusted as-is.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Reads `field` out of a document, ignoring it when the shape does not match.
    pub fn from_field(doc: &Document, field: &str) -> Option<Self> {
        doc.get(field)
            .and_then(|v| serde_json::from_value::<Coordinates>(v.clone()).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coordinates_from_field_reads_location_object() {
        let doc = json!({ "location": { "latitude": 49.28, "longitude": -123.12 } });
        let doc = doc.as_object().cloned().unwrap_or_default();
        assert_eq!(
            Coordinates::from_field(&doc, "location"),
            Some(Coordinates::new(49.28, -123.12))
        );
    }

    #[test]
    fn test_coordinates_from_field_ignores_missing_or_malformed() {
        let doc = json!({ "location": "somewhere", "name": "u" });
        let doc = doc.as_object().cloned().unwrap_or_default();
        assert_eq!(Coordinates::from_field(&doc, "location"), None);
        assert_eq!(Coordinates::from_field(&doc, "missing"), None);
    }

    #[test]
    fn test_auth_user_email_is_optional() {
        let user: AuthUser = serde_json::from_str(r#"{"uid":"u-1"}"#).expect("should parse");
        assert_eq!(user.uid, "u-1");
        assert!(user.email.is_none());
    }
}
