//! HTTP response facts collected from response-builder calls.

use std::collections::BTreeSet;

use crate::element::{Element, Value};
use crate::json::JsonValue;

/// Everything one code path may have put into a response.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HttpResponse {
    pub statuses: BTreeSet<u16>,
    pub headers: BTreeSet<String>,
    pub content_types: BTreeSet<String>,
    pub entity_types: BTreeSet<String>,
    pub inline_entities: BTreeSet<JsonValue>,
}

impl HttpResponse {
    pub fn with_status(status: u16) -> Self {
        Self {
            statuses: BTreeSet::from([status]),
            ..Self::default()
        }
    }

    /// Union of both responses.
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        let mut merged = self.clone();
        merged.statuses.extend(&other.statuses);
        merged.headers.extend(other.headers.iter().cloned());
        merged.content_types.extend(other.content_types.iter().cloned());
        merged.entity_types.extend(other.entity_types.iter().cloned());
        merged
            .inline_entities
            .extend(other.inline_entities.iter().cloned());
        merged
    }

    /// Record the status codes an element may hold. Values outside the HTTP range are dropped.
    pub fn add_statuses(&mut self, element: &Element) {
        self.statuses.extend(
            element
                .ints()
                .filter_map(|code| u16::try_from(code).ok())
                .filter(|code| (100..600).contains(code)),
        );
    }

    pub fn add_header(&mut self, name: &str) {
        self.headers.insert(name.to_string());
    }

    /// Record header names held as string literals.
    pub fn add_headers(&mut self, names: &Element) {
        self.headers.extend(names.strings().map(ToString::to_string));
    }

    /// Record media types held as string literals.
    pub fn add_content_types(&mut self, media_types: &Element) {
        self.content_types
            .extend(media_types.strings().map(ToString::to_string));
    }

    /// Record an entity: its static types, plus any JSON structure built inline.
    pub fn add_entity(&mut self, entity: &Element) {
        self.entity_types.extend(entity.types().iter().cloned());
        self.inline_entities.extend(entity.values().iter().filter_map(|value| match value {
            Value::Json(json) => Some(json.clone()),
            _ => None,
        }));
    }
}

/// Code of a `Response.Status` constant.
pub fn status_code(constant: &str) -> Option<u16> {
    Some(match constant {
        "OK" => 200,
        "CREATED" => 201,
        "ACCEPTED" => 202,
        "NO_CONTENT" => 204,
        "RESET_CONTENT" => 205,
        "PARTIAL_CONTENT" => 206,
        "MOVED_PERMANENTLY" => 301,
        "FOUND" => 302,
        "SEE_OTHER" => 303,
        "NOT_MODIFIED" => 304,
        "USE_PROXY" => 305,
        "TEMPORARY_REDIRECT" => 307,
        "PERMANENT_REDIRECT" => 308,
        "BAD_REQUEST" => 400,
        "UNAUTHORIZED" => 401,
        "PAYMENT_REQUIRED" => 402,
        "FORBIDDEN" => 403,
        "NOT_FOUND" => 404,
        "METHOD_NOT_ALLOWED" => 405,
        "NOT_ACCEPTABLE" => 406,
        "PROXY_AUTHENTICATION_REQUIRED" => 407,
        "REQUEST_TIMEOUT" => 408,
        "CONFLICT" => 409,
        "GONE" => 410,
        "LENGTH_REQUIRED" => 411,
        "PRECONDITION_FAILED" => 412,
        "REQUEST_ENTITY_TOO_LARGE" => 413,
        "REQUEST_URI_TOO_LONG" => 414,
        "UNSUPPORTED_MEDIA_TYPE" => 415,
        "REQUESTED_RANGE_NOT_SATISFIABLE" => 416,
        "EXPECTATION_FAILED" => 417,
        "PRECONDITION_REQUIRED" => 428,
        "TOO_MANY_REQUESTS" => 429,
        "REQUEST_HEADER_FIELDS_TOO_LARGE" => 431,
        "UNAVAILABLE_FOR_LEGAL_REASONS" => 451,
        "INTERNAL_SERVER_ERROR" => 500,
        "NOT_IMPLEMENTED" => 501,
        "BAD_GATEWAY" => 502,
        "SERVICE_UNAVAILABLE" => 503,
        "GATEWAY_TIMEOUT" => 504,
        "HTTP_VERSION_NOT_SUPPORTED" => 505,
        "NETWORK_AUTHENTICATION_REQUIRED" => 511,
        _ => return None,
    })
}

/// Media type of a `MediaType` constant, for both the `String` and the `*_TYPE` fields.
pub fn media_type(constant: &str) -> Option<&'static str> {
    Some(match constant.strip_suffix("_TYPE").unwrap_or(constant) {
        "WILDCARD" => "*/*",
        "APPLICATION_XML" => "application/xml",
        "APPLICATION_ATOM_XML" => "application/atom+xml",
        "APPLICATION_XHTML_XML" => "application/xhtml+xml",
        "APPLICATION_SVG_XML" => "application/svg+xml",
        "APPLICATION_JSON" => "application/json",
        "APPLICATION_JSON_PATCH_JSON" => "application/json-patch+json",
        "APPLICATION_FORM_URLENCODED" => "application/x-www-form-urlencoded",
        "MULTIPART_FORM_DATA" => "multipart/form-data",
        "APPLICATION_OCTET_STREAM" => "application/octet-stream",
        "TEXT_PLAIN" => "text/plain",
        "TEXT_XML" => "text/xml",
        "TEXT_HTML" => "text/html",
        "SERVER_SENT_EVENTS" => "text/event-stream",
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use jaxan_ir::{Literal, types};

    #[test]
    fn test_merge_unions_every_field() {
        let mut a = HttpResponse::with_status(200);
        a.add_header("Location");
        let mut b = HttpResponse::with_status(404);
        b.add_entity(&Element::string("missing"));
        let merged = a.merge(&b);
        assert_eq!(merged.statuses, BTreeSet::from([200, 404]));
        assert!(merged.headers.contains("Location"));
        assert!(merged.entity_types.contains(types::STRING));
        assert_eq!(merged, b.merge(&a));
    }

    #[test]
    fn test_statuses_from_element() {
        let mut response = HttpResponse::default();
        let codes = Element::from_values(
            types::PRIMITIVE_INT,
            [Literal::Int(201), Literal::Int(-1), Literal::Int(70000)],
        );
        response.add_statuses(&codes);
        assert_eq!(response.statuses, BTreeSet::from([201]));
    }

    #[test]
    fn test_inline_json_entity() {
        let json = JsonValue::empty_object().with_member("id", Element::int(1));
        let mut response = HttpResponse::default();
        response.add_entity(&Element::new("Ljavax/json/JsonObject;", json.clone()));
        assert!(response.inline_entities.contains(&json));
        assert!(response.entity_types.contains("Ljavax/json/JsonObject;"));
    }

    #[test]
    fn test_constant_tables() {
        assert_eq!(status_code("BAD_REQUEST"), Some(400));
        assert_eq!(status_code("IM_A_TEAPOT"), None);
        assert_eq!(media_type("APPLICATION_JSON"), Some("application/json"));
        assert_eq!(media_type("TEXT_PLAIN_TYPE"), Some("text/plain"));
        assert_eq!(media_type("CHARSET_PARAMETER"), None);
    }
}
