//! `Response`, `ResponseBuilder`, `Response.Status` and `GenericEntity`.

use jaxan_ir::{CONSTRUCTOR_NAME, Literal, MethodIdentifier};

use super::KnownCall;
use crate::element::Element;
use crate::response::{self, HttpResponse};

pub const PACKAGE: &str = "ws/rs/";

const RESPONSE: &str = "ws/rs/core/Response";
const RESPONSE_BUILDER: &str = "ws/rs/core/Response$ResponseBuilder";
const RESPONSE_STATUS: &str = "ws/rs/core/Response$Status";
const GENERIC_ENTITY: &str = "ws/rs/core/GenericEntity";
const MEDIA_TYPE: &str = "ws/rs/core/MediaType";

pub fn simulate(
    class: &str,
    identifier: &MethodIdentifier,
    receiver: Option<&Element>,
    arguments: &[Element],
) -> Option<KnownCall> {
    match class {
        RESPONSE if identifier.is_static() => response_factory(identifier, arguments),
        RESPONSE => response_method(identifier, receiver?),
        RESPONSE_BUILDER => builder_method(identifier, receiver?, arguments),
        RESPONSE_STATUS => status_method(identifier, receiver, arguments),
        GENERIC_ENTITY => generic_entity(identifier, receiver?, arguments),
        _ => None,
    }
}

pub fn static_field(class: &str, name: &str, field_type: &str) -> Option<Element> {
    match class {
        RESPONSE_STATUS => {
            let code = response::status_code(name)?;
            Some(Element::literal(field_type, Literal::Int(i64::from(code))))
        }
        MEDIA_TYPE => {
            let media_type = response::media_type(name)?;
            Some(Element::literal(field_type, Literal::string(media_type)))
        }
        _ => None,
    }
}

/// Static `Response` factories, each starting a fresh builder.
fn response_factory(identifier: &MethodIdentifier, arguments: &[Element]) -> Option<KnownCall> {
    let mut response = HttpResponse::default();
    match identifier.name() {
        "status" => response.add_statuses(arguments.first()?),
        "ok" => {
            response.statuses.insert(200);
            if let Some(entity) = arguments.first() {
                response.add_entity(entity);
            }
            if let Some(media_type) = arguments.get(1) {
                response.add_content_types(media_type);
            }
        }
        "created" => {
            response.statuses.insert(201);
            response.add_header("Location");
        }
        "accepted" => {
            response.statuses.insert(202);
            if let Some(entity) = arguments.first() {
                response.add_entity(entity);
            }
        }
        "noContent" => {
            response.statuses.insert(204);
        }
        "seeOther" => {
            response.statuses.insert(303);
            response.add_header("Location");
        }
        "notModified" => {
            response.statuses.insert(304);
            if !arguments.is_empty() {
                response.add_header("ETag");
            }
        }
        "temporaryRedirect" => {
            response.statuses.insert(307);
            response.add_header("Location");
        }
        "notAcceptable" => {
            response.statuses.insert(406);
            response.add_header("Vary");
        }
        "serverError" => {
            response.statuses.insert(500);
        }
        "fromResponse" => {
            let source = arguments.first()?;
            return Some(KnownCall::value(with_responses(
                identifier.return_type(),
                source.responses().cloned().collect(),
            )));
        }
        _ => return None,
    }
    Some(KnownCall::value(Element::new(
        identifier.return_type(),
        response,
    )))
}

/// Instance methods on a built `Response`.
fn response_method(identifier: &MethodIdentifier, receiver: &Element) -> Option<KnownCall> {
    match identifier.name() {
        "getStatus" => {
            let statuses: Vec<Literal> = receiver
                .responses()
                .flat_map(|response| response.statuses.iter())
                .map(|&status| Literal::Int(i64::from(status)))
                .collect();
            Some(KnownCall::value(Element::from_values(
                identifier.return_type(),
                statuses,
            )))
        }
        _ => None,
    }
}

/// `ResponseBuilder` methods: each adds its facts to every response the builder may hold.
fn builder_method(
    identifier: &MethodIdentifier,
    receiver: &Element,
    arguments: &[Element],
) -> Option<KnownCall> {
    let mut delta = HttpResponse::default();
    let name = identifier.name();
    match name {
        "status" => delta.add_statuses(arguments.first()?),
        "entity" => delta.add_entity(arguments.first()?),
        "type" => delta.add_content_types(arguments.first()?),
        "header" => delta.add_headers(arguments.first()?),
        "build" | "clone" | "variant" | "replaceAll" => {}
        other => delta.add_header(builder_header(other)?),
    }

    let responses = builder_responses(receiver)
        .iter()
        .map(|response| response.merge(&delta))
        .collect();
    let result = with_responses(identifier.return_type(), responses);

    Some(if matches!(name, "build" | "clone") {
        KnownCall::value(result)
    } else {
        KnownCall::update(result)
    })
}

/// Header set by a dedicated builder method.
fn builder_header(method: &str) -> Option<&'static str> {
    Some(match method {
        "allow" => "Allow",
        "cacheControl" => "Cache-Control",
        "contentLocation" => "Content-Location",
        "cookie" => "Set-Cookie",
        "encoding" => "Content-Encoding",
        "expires" => "Expires",
        "language" => "Content-Language",
        "lastModified" => "Last-Modified",
        "link" | "links" => "Link",
        "location" => "Location",
        "tag" => "ETag",
        "variants" => "Vary",
        _ => return None,
    })
}

fn status_method(
    identifier: &MethodIdentifier,
    receiver: Option<&Element>,
    arguments: &[Element],
) -> Option<KnownCall> {
    let return_type = identifier.return_type();
    match identifier.name() {
        "getStatusCode" => Some(KnownCall::value(
            receiver?.clone().retyped(return_type),
        )),
        "fromStatusCode" => Some(KnownCall::value(
            arguments.first()?.clone().retyped(return_type),
        )),
        "valueOf" => {
            let codes: Vec<Literal> = arguments
                .first()?
                .strings()
                .filter_map(response::status_code)
                .map(|code| Literal::Int(i64::from(code)))
                .collect();
            Some(KnownCall::value(Element::from_values(return_type, codes)))
        }
        _ => None,
    }
}

/// `new GenericEntity<T>(entity, ...)` stands for the wrapped entity itself.
fn generic_entity(
    identifier: &MethodIdentifier,
    receiver: &Element,
    arguments: &[Element],
) -> Option<KnownCall> {
    match identifier.name() {
        CONSTRUCTOR_NAME => Some(KnownCall::update(arguments.first()?.clone())),
        "getEntity" => Some(KnownCall::value(receiver.clone())),
        _ => None,
    }
}

/// Responses a builder may hold; an untracked builder starts out empty.
fn builder_responses(receiver: &Element) -> Vec<HttpResponse> {
    let responses: Vec<HttpResponse> = receiver.responses().cloned().collect();
    if responses.is_empty() {
        vec![HttpResponse::default()]
    } else {
        responses
    }
}

fn with_responses(return_type: &str, responses: Vec<HttpResponse>) -> Element {
    if responses.is_empty() {
        Element::new(return_type, HttpResponse::default())
    } else {
        Element::from_values(return_type, responses)
    }
}
