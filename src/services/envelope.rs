use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::Error;
use crate::http::messages;

/// Success body shape of an endpoint.
///
/// The API is inconsistent: some endpoints return the resource itself,
/// others wrap it as `{ success, message, data }`. Each endpoint declares
/// which one it uses; nothing is guessed from the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Shape {
    #[default]
    Raw,
    Wrapped,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<Value>,
}

/// Extracts the resource from a success body according to `shape`.
///
/// # Errors
///
/// Returns [`Error::Envelope`] carrying the server message if a wrapped body
/// reports `success: false`. A body that is not an envelope, or whose payload
/// does not match `T`, is an [`Error::Request`].
pub fn unwrap<T: DeserializeOwned>(shape: Shape, body: Value) -> Result<T, Error> {
    let payload = match shape {
        Shape::Raw => body,
        // 204 No Content
        Shape::Wrapped if body.is_null() => body,
        Shape::Wrapped => {
            let envelope: Envelope = serde_json::from_value(body)
                .map_err(|e| Error::Request(format!("expected {{success, message, data}}: {e}")))?;
            if envelope.success == Some(false) {
                return Err(Error::Envelope(
                    envelope
                        .message
                        .filter(|m| !m.trim().is_empty())
                        .unwrap_or_else(|| messages::REQUEST_FAILED.to_owned()),
                ));
            }
            envelope.data.unwrap_or(Value::Null)
        }
    };
    serde_json::from_value(payload).map_err(|e| Error::Request(format!("unexpected payload: {e}")))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn raw_passes_body_through() {
        let v: Value = unwrap(Shape::Raw, json!({"id": 1})).unwrap();
        assert_eq!(v, json!({"id": 1}));
    }

    #[test]
    fn wrapped_extracts_data() {
        let v: Value = unwrap(
            Shape::Wrapped,
            json!({"success": true, "message": "ok", "data": {"id": 1}}),
        )
        .unwrap();
        assert_eq!(v, json!({"id": 1}));
    }

    #[test]
    fn wrapped_failure_surfaces_message() {
        let err = unwrap::<Value>(
            Shape::Wrapped,
            json!({"success": false, "message": "Empresa inativa"}),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Envelope(ref m) if m == "Empresa inativa"));
    }

    #[test]
    fn wrapped_failure_without_message_uses_generic_text() {
        for body in [json!({"success": false}), json!({"success": false, "message": " "})] {
            let err = unwrap::<Value>(Shape::Wrapped, body).unwrap_err();
            assert!(matches!(err, Error::Envelope(ref m) if m == messages::REQUEST_FAILED));
        }
    }

    #[test]
    fn wrapped_without_data_is_null() {
        let unit: () = unwrap(Shape::Wrapped, json!({"success": true, "message": "removido"})).unwrap();
        assert_eq!(unit, ());
    }

    #[test]
    fn wrapped_empty_body_is_null() {
        let unit: () = unwrap(Shape::Wrapped, Value::Null).unwrap();
        assert_eq!(unit, ());
    }

    #[test]
    fn shape_mismatch_is_an_error_not_a_guess() {
        #[derive(Debug, serde::Deserialize)]
        #[allow(dead_code)]
        struct Company {
            id: u64,
        }

        // Raw resource declared as wrapped: no `data` -> null -> no Company
        let err = unwrap::<Company>(Shape::Wrapped, json!({"id": 1})).unwrap_err();
        assert!(matches!(err, Error::Request(_)), "{err:?}");
        // Wrapped body declared as raw: envelope is not a Company
        let err = unwrap::<Company>(Shape::Raw, json!({"success": true, "data": {"id": 1}})).unwrap_err();
        assert!(matches!(err, Error::Request(_)), "{err:?}");
        let err = unwrap::<Value>(Shape::Wrapped, json!([1, 2])).unwrap_err();
        assert!(matches!(err, Error::Request(_)), "{err:?}");
    }
}
