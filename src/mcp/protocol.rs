//! JSON-RPC 2.0 framing for the MCP wire protocol.
//!
//! Incoming lines become an [`IncomingMessage`]: a request when the object
//! carries an `id`, a notification otherwise. Replies are either a
//! [`JsonRpcResponse`] or a [`JsonRpcError`]. Tools may also queue
//! [`OutgoingNotification`]s, which are written ahead of the reply.
//!
//! MCP narrows JSON-RPC ids to strings or integers; `null` is rejected.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Value};

/// The MCP protocol version this implementation supports.
pub const MCP_PROTOCOL_VERSION: &str = "2024-11-05";

/// Server name for capability negotiation.
pub const SERVER_NAME: &str = "kicad-pcb-mcp";

/// The `"jsonrpc": "2.0"` member. Any other value fails to deserialise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Version2;

impl Serialize for Version2 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str("2.0")
    }
}

impl<'de> Deserialize<'de> for Version2 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match String::deserialize(deserializer)?.as_str() {
            "2.0" => Ok(Self),
            other => Err(de::Error::invalid_value(
                de::Unexpected::Str(other),
                &"\"2.0\"",
            )),
        }
    }
}

/// A request id, echoed back in the reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    /// Numeric id.
    Number(i64),
    /// String id.
    String(String),
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

/// A call that expects a reply.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    #[serde(rename = "jsonrpc")]
    _version: Version2,
    /// Id to answer with.
    pub id: RequestId,
    /// Method name, never empty.
    pub method: String,
    /// Method parameters, if sent.
    #[serde(default)]
    pub params: Option<Value>,
}

/// A one-way message from the client.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcNotification {
    #[serde(rename = "jsonrpc")]
    _version: Version2,
    /// Notification name.
    pub method: String,
    /// Notification parameters, if sent.
    #[serde(default)]
    pub params: Option<Value>,
}

/// A message read from the client.
#[derive(Debug, Clone)]
pub enum IncomingMessage {
    /// Carries an `id`; must be answered.
    Request(JsonRpcRequest),
    /// No `id`; never answered.
    Notification(JsonRpcNotification),
}

/// Parses one line of input.
///
/// # Errors
///
/// Returns a ready-to-send error reply: `ParseError` for text that is not
/// a JSON object, `InvalidRequest` for an object that is not a well-formed
/// request or notification. The reply carries the request's id when it
/// could be read.
pub fn parse_message(line: &str) -> Result<IncomingMessage, JsonRpcError> {
    let unparseable = |message: String| {
        JsonRpcError::new(
            None,
            JsonRpcErrorData::with_message(ErrorCode::ParseError, message),
        )
    };
    let value: Value = serde_json::from_str(line).map_err(|e| unparseable(e.to_string()))?;
    let Some(object) = value.as_object() else {
        return Err(unparseable("message must be a JSON object".to_string()));
    };

    let id = object
        .get("id")
        .and_then(|id| RequestId::deserialize(id).ok());
    let invalid = |message: String| {
        JsonRpcError::new(
            id.clone(),
            JsonRpcErrorData::with_message(ErrorCode::InvalidRequest, message),
        )
    };

    if object.contains_key("id") {
        let request = JsonRpcRequest::deserialize(&value).map_err(|e| invalid(e.to_string()))?;
        if request.method.is_empty() {
            return Err(invalid("method must not be empty".to_string()));
        }
        Ok(IncomingMessage::Request(request))
    } else {
        JsonRpcNotification::deserialize(&value)
            .map(IncomingMessage::Notification)
            .map_err(|e| invalid(e.to_string()))
    }
}

/// A notification sent from the server to the client.
#[derive(Debug, Clone, Serialize)]
pub struct OutgoingNotification {
    jsonrpc: Version2,
    /// Notification name.
    pub method: String,
    /// Notification parameters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl OutgoingNotification {
    /// Creates a notification.
    #[must_use]
    pub fn new(method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: Version2,
            method: method.into(),
            params,
        }
    }

    /// Creates a `notifications/progress` message. The token is passed
    /// through unchanged, string or number.
    #[must_use]
    pub fn progress(
        progress_token: &Value,
        progress: u32,
        total: Option<u32>,
        message: Option<&str>,
    ) -> Self {
        Self::new(
            "notifications/progress",
            Some(json!({
                "progressToken": progress_token,
                "progress": progress,
                "total": total,
                "message": message,
            })),
        )
    }
}

/// A successful reply.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcResponse {
    jsonrpc: Version2,
    /// Id of the request being answered.
    pub id: RequestId,
    /// Method result.
    pub result: Value,
}

impl JsonRpcResponse {
    /// Wraps `result` as the reply to `id`.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn success(id: RequestId, result: Value) -> Self {
        Self {
            jsonrpc: Version2,
            id,
            result,
        }
    }
}

/// JSON-RPC error codes used by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ErrorCode {
    /// The line was not JSON.
    ParseError = -32700,
    /// The JSON was not a valid message.
    InvalidRequest = -32600,
    /// Unknown method.
    MethodNotFound = -32601,
    /// Bad parameters for a known method.
    InvalidParams = -32602,
    /// The server failed while handling the call.
    InternalError = -32603,
}

impl ErrorCode {
    /// The numeric wire code.
    #[must_use]
    pub const fn code(self) -> i32 {
        self as i32
    }
}

/// The `error` member of an error reply.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcErrorData {
    /// Numeric code, see [`ErrorCode`].
    pub code: i32,
    /// Human-readable description.
    pub message: String,
}

impl JsonRpcErrorData {
    /// Builds error data for `code` with a custom message.
    #[must_use]
    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.code(),
            message: message.into(),
        }
    }
}

/// An error reply.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcError {
    jsonrpc: Version2,
    /// Id of the failed request; absent when it could not be read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RequestId>,
    /// Error details.
    pub error: JsonRpcErrorData,
}

impl JsonRpcError {
    /// Builds an error reply.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn new(id: Option<RequestId>, error: JsonRpcErrorData) -> Self {
        Self {
            jsonrpc: Version2,
            id,
            error,
        }
    }

    /// The reply for an unknown method.
    #[must_use]
    pub fn method_not_found(id: RequestId, method: &str) -> Self {
        Self::new(
            Some(id),
            JsonRpcErrorData::with_message(
                ErrorCode::MethodNotFound,
                format!("Method not found: {method}"),
            ),
        )
    }

    /// The reply for bad parameters.
    #[must_use]
    pub fn invalid_params(id: RequestId, message: impl Into<String>) -> Self {
        Self::new(
            Some(id),
            JsonRpcErrorData::with_message(ErrorCode::InvalidParams, message),
        )
    }

    /// The reply for a server-side failure.
    #[must_use]
    pub fn internal_error(id: RequestId, message: impl Into<String>) -> Self {
        Self::new(
            Some(id),
            JsonRpcErrorData::with_message(ErrorCode::InternalError, message),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn error_code(line: &str) -> i32 {
        parse_message(line).unwrap_err().error.code
    }

    #[test]
    fn id_decides_request_or_notification() {
        let msg = parse_message(r#"{"jsonrpc":"2.0","id":"abc-1","method":"tools/list"}"#).unwrap();
        let IncomingMessage::Request(req) = msg else {
            panic!("expected request");
        };
        assert_eq!(req.id, RequestId::String("abc-1".to_string()));
        assert!(req.params.is_none());

        let msg = parse_message(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#).unwrap();
        assert!(matches!(msg, IncomingMessage::Notification(n) if n.method == "notifications/initialized"));
    }

    #[test]
    fn malformed_lines_get_matching_codes() {
        assert_eq!(error_code("not json"), ErrorCode::ParseError.code());
        assert_eq!(error_code("[1, 2]"), ErrorCode::ParseError.code());
        assert_eq!(error_code(r#"{"id":1,"method":"x"}"#), ErrorCode::InvalidRequest.code());
        assert_eq!(
            error_code(r#"{"jsonrpc":"1.0","id":1,"method":"x"}"#),
            ErrorCode::InvalidRequest.code()
        );
        assert_eq!(
            error_code(r#"{"jsonrpc":"2.0","id":null,"method":"x"}"#),
            ErrorCode::InvalidRequest.code()
        );
    }

    #[test]
    fn invalid_request_keeps_readable_id() {
        let err = parse_message(r#"{"jsonrpc":"2.0","id":9,"method":""}"#).unwrap_err();
        assert_eq!(err.id, Some(RequestId::Number(9)));
        assert_eq!(err.error.code, ErrorCode::InvalidRequest.code());
    }

    #[test]
    fn replies_carry_version_and_id() {
        let ok = serde_json::to_value(JsonRpcResponse::success(
            RequestId::Number(1),
            json!({"ok": true}),
        ))
        .unwrap();
        assert_eq!(ok, json!({"jsonrpc": "2.0", "id": 1, "result": {"ok": true}}));

        let err = serde_json::to_value(JsonRpcError::method_not_found(
            RequestId::Number(1),
            "unknown/method",
        ))
        .unwrap();
        assert_eq!(err["jsonrpc"], "2.0");
        assert_eq!(err["error"]["code"], -32601);
        assert_eq!(err["error"]["message"], "Method not found: unknown/method");
    }

    #[test]
    fn progress_passes_token_through() {
        let note = OutgoingNotification::progress(&json!(7), 1, Some(3), None);
        let params = note.params.unwrap();
        assert_eq!(params["progressToken"], 7);
        assert_eq!(params["total"], 3);

        let note = OutgoingNotification::progress(&json!("t-1"), 2, None, Some("done"));
        let value = serde_json::to_value(&note).unwrap();
        assert_eq!(value["method"], "notifications/progress");
        assert_eq!(value["params"]["progressToken"], "t-1");
        assert_eq!(value["params"]["message"], "done");
    }

    #[test]
    fn request_id_display() {
        assert_eq!(RequestId::Number(42).to_string(), "42");
        assert_eq!(RequestId::String("abc".to_string()).to_string(), "abc");
    }
}
