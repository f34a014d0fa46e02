//! Request/response message model shared by the node and any transport.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Request method.  `Post` creates (registration), `Put` updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        };
        f.write_str(s)
    }
}

/// Payload content format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentFormat {
    TextPlain,
    LinkFormat,
    Json,
}

/// Response status, stored as the raw code byte (`class << 5 | detail`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub struct ResponseCode(u8);

impl ResponseCode {
    pub const CREATED: Self = Self::new(2, 1);
    pub const DELETED: Self = Self::new(2, 2);
    pub const VALID: Self = Self::new(2, 3);
    pub const CHANGED: Self = Self::new(2, 4);
    pub const CONTENT: Self = Self::new(2, 5);
    pub const BAD_REQUEST: Self = Self::new(4, 0);
    pub const FORBIDDEN: Self = Self::new(4, 3);
    pub const NOT_FOUND: Self = Self::new(4, 4);
    pub const METHOD_NOT_ALLOWED: Self = Self::new(4, 5);
    pub const REQUEST_ENTITY_TOO_LARGE: Self = Self::new(4, 13);
    pub const INTERNAL_SERVER_ERROR: Self = Self::new(5, 0);
    pub const SERVICE_UNAVAILABLE: Self = Self::new(5, 3);

    pub const fn new(class: u8, detail: u8) -> Self {
        Self(((class & 0x07) << 5) | (detail & 0x1f))
    }

    pub const fn from_raw(raw: u8) -> Self {
        Self(raw)
    }

    pub const fn class(self) -> u8 {
        self.0 >> 5
    }

    pub const fn detail(self) -> u8 {
        self.0 & 0x1f
    }

    /// Decimal form `class * 100 + detail` (`2.01` → `201`).
    pub const fn flattened(self) -> u16 {
        self.class() as u16 * 100 + self.detail() as u16
    }

    pub const fn is_success(self) -> bool {
        self.class() == 2
    }

    fn reason(self) -> Option<&'static str> {
        let reason = match (self.class(), self.detail()) {
            (2, 1) => "Created",
            (2, 2) => "Deleted",
            (2, 3) => "Valid",
            (2, 4) => "Changed",
            (2, 5) => "Content",
            (4, 0) => "Bad Request",
            (4, 1) => "Unauthorized",
            (4, 2) => "Bad Option",
            (4, 3) => "Forbidden",
            (4, 4) => "Not Found",
            (4, 5) => "Method Not Allowed",
            (4, 6) => "Not Acceptable",
            (4, 12) => "Precondition Failed",
            (4, 13) => "Request Entity Too Large",
            (4, 15) => "Unsupported Content-Format",
            (5, 0) => "Internal Server Error",
            (5, 1) => "Not Implemented",
            (5, 2) => "Bad Gateway",
            (5, 3) => "Service Unavailable",
            (5, 4) => "Gateway Timeout",
            (5, 5) => "Proxying Not Supported",
            _ => return None,
        };
        Some(reason)
    }
}

impl From<u8> for ResponseCode {
    fn from(raw: u8) -> Self {
        Self(raw)
    }
}

impl From<ResponseCode> for u8 {
    fn from(code: ResponseCode) -> Self {
        code.0
    }
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.class(), self.detail())?;
        if let Some(reason) = self.reason() {
            write!(f, " {reason}")?;
        }
        Ok(())
    }
}

/// An outbound or locally dispatched request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub method: Method,
    pub uri_path: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub uri_query: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_format: Option<ContentFormat>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub payload: String,
}

impl Request {
    pub fn new(method: Method, uri_path: impl Into<String>) -> Self {
        Self {
            method,
            uri_path: uri_path.into(),
            uri_query: Vec::new(),
            content_format: None,
            payload: String::new(),
        }
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.uri_query.push(query.into());
        self
    }

    pub fn with_content_format(mut self, format: ContentFormat) -> Self {
        self.content_format = Some(format);
        self
    }

    pub fn with_payload(mut self, payload: impl Into<String>) -> Self {
        self.payload = payload.into();
        self
    }
}

/// A response from the directory or from a local resource handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub code: ResponseCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_format: Option<ContentFormat>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub payload: String,
}

impl Response {
    pub fn new(code: ResponseCode) -> Self {
        Self {
            code,
            location_path: None,
            content_format: None,
            payload: String::new(),
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location_path = Some(location.into());
        self
    }

    pub fn with_payload(mut self, format: ContentFormat, payload: impl Into<String>) -> Self {
        self.content_format = Some(format);
        self.payload = payload.into();
        self
    }
}

/// Transport framing: one JSON object per WebSocket text message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WireFrame {
    /// Node → directory.
    #[serde(rename = "request")]
    Request { message_id: u16, request: Request },

    /// Directory → node, echoing the request's `message_id`.
    #[serde(rename = "response")]
    Response { message_id: u16, response: Response },
}

impl WireFrame {
    pub fn message_id(&self) -> u16 {
        match self {
            WireFrame::Request { message_id, .. } | WireFrame::Response { message_id, .. } => {
                *message_id
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn created_flattens_to_201() {
        assert_eq!(ResponseCode::CREATED.flattened(), 201);
        assert_eq!(ResponseCode::from_raw(0x41).flattened(), 201);
        assert_eq!(ResponseCode::CHANGED.flattened(), 204);
        assert_eq!(ResponseCode::BAD_REQUEST.flattened(), 400);
        assert_eq!(ResponseCode::REQUEST_ENTITY_TOO_LARGE.flattened(), 413);
        assert_eq!(ResponseCode::SERVICE_UNAVAILABLE.flattened(), 503);
    }

    #[test]
    fn class_and_detail_split_raw_byte() {
        let code = ResponseCode::from_raw(0x84);
        assert_eq!(code.class(), 4);
        assert_eq!(code.detail(), 4);
        assert_eq!(code, ResponseCode::NOT_FOUND);
        assert!(!code.is_success());
        assert!(ResponseCode::CHANGED.is_success());
    }

    #[test]
    fn display_includes_reason() {
        assert_eq!(ResponseCode::CREATED.to_string(), "2.01 Created");
        assert_eq!(ResponseCode::BAD_REQUEST.to_string(), "4.00 Bad Request");
        assert_eq!(ResponseCode::new(3, 7).to_string(), "3.07");
    }

    #[test]
    fn method_display() {
        assert_eq!(Method::Put.to_string(), "PUT");
        assert_eq!(Method::Delete.to_string(), "DELETE");
    }

    #[test]
    fn request_frame_json_shape() {
        let frame = WireFrame::Request {
            message_id: 7,
            request: Request::new(Method::Post, "/rd")
                .with_query("ep=1.2")
                .with_content_format(ContentFormat::LinkFormat)
                .with_payload("</a>"),
        };
        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["type"], "request");
        assert_eq!(json["message_id"], 7);
        assert_eq!(json["request"]["method"], "POST");
        assert_eq!(json["request"]["uri_query"][0], "ep=1.2");
        assert_eq!(json["request"]["content_format"], "link_format");
    }

    #[test]
    fn response_frame_carries_raw_code() {
        let text = r#"{"type":"response","message_id":9,"response":{"code":65,"location_path":"/rd/12"}}"#;
        let frame: WireFrame = serde_json::from_str(text).unwrap();
        assert_eq!(frame.message_id(), 9);
        match frame {
            WireFrame::Response { response, .. } => {
                assert_eq!(response.code, ResponseCode::CREATED);
                assert_eq!(response.location_path.as_deref(), Some("/rd/12"));
                assert!(response.payload.is_empty());
            }
            other => panic!("expected response, got {other:?}"),
        }
    }

    #[test]
    fn empty_fields_are_omitted() {
        let json = serde_json::to_string(&Request::new(Method::Get, "/x")).unwrap();
        assert_eq!(json, r#"{"method":"GET","uri_path":"/x"}"#);
    }
}
