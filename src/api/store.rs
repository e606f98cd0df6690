use super::{failure_parts, ApiClient};
use crate::collab::DocumentStore;
use crate::error::StoreError;
use crate::models::Document;
use async_trait::async_trait;
use log::debug;
use reqwest::Method;

/// [`DocumentStore`] over the backend's collection endpoints.
#[derive(Clone)]
pub struct RestDocumentStore {
    client: ApiClient,
}

impl RestDocumentStore {
    pub(crate) fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

pub(crate) fn document_path(collection: &str, id: &str) -> String {
    format!(
        "/collections/{}/{}",
        urlencoding::encode(collection),
        urlencoding::encode(id)
    )
}

pub(crate) fn status_error(status: u16, body: String) -> StoreError {
    match status {
        401 => StoreError::Unauthorized,
        404 => StoreError::NotFound,
        _ => StoreError::Http { status, body },
    }
}

/// Accepts either the bare document or `{ "document": {...} }`.
pub(crate) fn parse_document(data: serde_json::Value) -> Result<Document, StoreError> {
    let data = match data {
        serde_json::Value::Object(mut map) => match map.remove("document") {
            Some(serde_json::Value::Object(inner)) => return Ok(inner),
            Some(other) => {
                map.insert("document".to_string(), other);
                map
            }
            None => map,
        },
        other => {
            return Err(StoreError::Parse(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            )))
        }
    };
    Ok(data)
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

fn network(e: reqwest::Error) -> StoreError {
    StoreError::Network(e.to_string())
}

#[async_trait(?Send)]
impl DocumentStore for RestDocumentStore {
    async fn get_one(&self, id: &str, collection: &str) -> Result<Option<Document>, StoreError> {
        let res = self
            .client
            .send(Method::GET, &document_path(collection, id), None)
            .await
            .map_err(network)?;

        if res.status().as_u16() == 404 {
            debug!("event=store_get module=api status=missing collection={collection}");
            return Ok(None);
        }
        if !res.status().is_success() {
            let (status, body) = failure_parts(res).await;
            return Err(status_error(status, body));
        }

        let data: serde_json::Value = res
            .json()
            .await
            .map_err(|e| StoreError::Parse(e.to_string()))?;
        parse_document(data).map(Some)
    }

    async fn update(
        &self,
        id: &str,
        partial: Document,
        collection: &str,
    ) -> Result<(), StoreError> {
        let body = serde_json::Value::Object(partial);
        let res = self
            .client
            .send(Method::PATCH, &document_path(collection, id), Some(&body))
            .await
            .map_err(network)?;

        if res.status().is_success() {
            debug!("event=store_update module=api status=ok collection={collection}");
            Ok(())
        } else {
            let (status, body) = failure_parts(res).await;
            Err(status_error(status, body))
        }
    }

    async fn delete(&self, id: &str, collection: &str) -> Result<(), StoreError> {
        let res = self
            .client
            .send(Method::DELETE, &document_path(collection, id), None)
            .await
            .map_err(network)?;

        if res.status().is_success() {
            debug!("event=store_delete module=api status=ok collection={collection}");
            Ok(())
        } else {
            let (status, body) = failure_parts(res).await;
            Err(status_error(status, body))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_document_path_encodes_segments() {
        assert_eq!(document_path("journals", "J1"), "/collections/journals/J1");
        assert_eq!(
            document_path("journals", "a/b c"),
            "/collections/journals/a%2Fb%20c"
        );
    }

    #[test]
    fn test_status_error_mapping() {
        assert_eq!(status_error(401, String::new()), StoreError::Unauthorized);
        assert_eq!(status_error(404, "gone".to_string()), StoreError::NotFound);
        assert_eq!(
            status_error(500, "boom".to_string()),
            StoreError::Http {
                status: 500,
                body: "boom".to_string()
            }
        );
    }

    #[test]
    fn test_parse_document_accepts_wrapped_and_bare_shapes() {
        let wrapped = parse_document(json!({ "document": { "name": "a" } })).expect("object");
        assert_eq!(wrapped.get("name"), Some(&json!("a")));

        let bare = parse_document(json!({ "name": "b" })).expect("object");
        assert_eq!(bare.get("name"), Some(&json!("b")));

        // A non-object `document` field is plain data.
        let field = parse_document(json!({ "document": "draft" })).expect("object");
        assert_eq!(field.get("document"), Some(&json!("draft")));
    }

    #[test]
    fn test_parse_document_rejects_non_objects() {
        assert!(matches!(parse_document(json!([1, 2])), Err(StoreError::Parse(_))));
        assert!(matches!(parse_document(json!(null)), Err(StoreError::Parse(_))));
    }
}
