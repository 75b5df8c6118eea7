//! Request dispatch: route table, handlers and response envelopes.
//!
//! # Design
//! `Dispatcher::dispatch` is the single entry point. It never fails: handler
//! errors are turned into envelope responses here, so the host only has to
//! copy the returned `HttpResponse` onto the wire. The repository is passed
//! in by the caller for every request; the dispatcher holds no item state.

use chrono::Utc;
use log::{error, info, warn};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::{DispatchError, ValidationErrors};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::repository::ItemRepository;
use crate::router::{Params, Router};
use crate::types::Envelope;
use crate::validate::{validate_create, validate_update};

pub const HEALTH_MESSAGE: &str = "Shopping list API is running";
pub const CREATED_MESSAGE: &str = "Item created successfully";
pub const UPDATED_MESSAGE: &str = "Item updated successfully";
pub const VALIDATION_FAILED: &str = "Validation failed";
pub const INVALID_JSON: &str = "Invalid JSON in request body";
pub const ITEM_NOT_FOUND: &str = "Item not found";
pub const ROUTE_NOT_FOUND: &str = "Route not found";
pub const INTERNAL_ERROR: &str = "Internal server error";

pub struct Dispatcher {
    router: Router,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        let router = Router::new()
            .route(HttpMethod::Get, "/health", health)
            .route(HttpMethod::Get, "/items", list_items)
            .route(HttpMethod::Post, "/items", create_item)
            .route(HttpMethod::Get, "/items/{id}", get_item)
            .route(HttpMethod::Put, "/items/{id}", update_item)
            .route(HttpMethod::Delete, "/items/{id}", delete_item)
            .route(HttpMethod::Options, "*", preflight);
        Self { router }
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Route `request`, run its handler against `repo`, and build the response.
    pub fn dispatch(&self, repo: &mut ItemRepository, request: &HttpRequest) -> HttpResponse {
        let response = match self.router.find(&request.method, &request.path) {
            Some((route, params)) => (route.handler)(repo, &params, &request.body)
                .unwrap_or_else(|err| failure_response(&err)),
            None => not_found(ROUTE_NOT_FOUND),
        };
        info!("{} {} -> {}", request.method, request.path, response.status);
        response
    }
}

/// Convert a dispatch failure into its envelope response. Internal details
/// are logged, never sent to the client.
pub fn failure_response(err: &DispatchError) -> HttpResponse {
    match err {
        DispatchError::InvalidJson(source) => {
            warn!("rejected request body: {source}");
            envelope_response(err.status(), &Envelope::failure(INVALID_JSON))
        }
        DispatchError::Encode(_) | DispatchError::BodyRead(_) => {
            error!("request failed: {err}");
            internal_error()
        }
    }
}

/// The generic 500 response.
pub fn internal_error() -> HttpResponse {
    envelope_response(500, &Envelope::failure(INTERNAL_ERROR))
}

fn envelope_response(status: u16, envelope: &Envelope) -> HttpResponse {
    HttpResponse::json(status, envelope).unwrap_or_else(|_| HttpResponse::empty(status))
}

fn not_found(message: &str) -> HttpResponse {
    envelope_response(404, &Envelope::failure(message))
}

fn invalid(errors: ValidationErrors) -> HttpResponse {
    warn!("validation failed: {errors}");
    envelope_response(
        400,
        &Envelope::failure(VALIDATION_FAILED).with_errors(errors.into_messages()),
    )
}

/// Absent body reads as `{}`.
fn parse_body(body: &[u8]) -> Result<Value, DispatchError> {
    if body.is_empty() {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_slice(body).map_err(DispatchError::InvalidJson)
}

/// Ids are matched as opaque strings: only the exact hyphenated lowercase
/// form handed out at creation names an item.
fn item_id(params: &Params<'_>) -> Option<Uuid> {
    let raw = params.get("id")?;
    Uuid::parse_str(raw)
        .ok()
        .filter(|id| id.hyphenated().to_string() == raw)
}

fn health(_: &mut ItemRepository, _: &Params<'_>, _: &[u8]) -> Result<HttpResponse, DispatchError> {
    let envelope = Envelope::ok()
        .with_message(HEALTH_MESSAGE)
        .with_timestamp(Utc::now());
    HttpResponse::json(200, &envelope)
}

fn list_items(
    repo: &mut ItemRepository,
    _: &Params<'_>,
    _: &[u8],
) -> Result<HttpResponse, DispatchError> {
    let items = repo.list_all();
    HttpResponse::json(200, &Envelope::ok().with_data(items).with_count(items.len()))
}

fn create_item(
    repo: &mut ItemRepository,
    _: &Params<'_>,
    body: &[u8],
) -> Result<HttpResponse, DispatchError> {
    let payload = parse_body(body)?;
    let input = match validate_create(&payload) {
        Ok(input) => input,
        Err(errors) => return Ok(invalid(errors)),
    };
    let item = repo.create(input);
    let envelope = Envelope::ok()
        .with_message(CREATED_MESSAGE)
        .with_data(&item);
    HttpResponse::json(201, &envelope)
}

fn get_item(
    repo: &mut ItemRepository,
    params: &Params<'_>,
    _: &[u8],
) -> Result<HttpResponse, DispatchError> {
    match item_id(params).and_then(|id| repo.get_by_id(&id)) {
        Some(item) => HttpResponse::json(200, &Envelope::ok().with_data(item)),
        None => Ok(not_found(ITEM_NOT_FOUND)),
    }
}

fn update_item(
    repo: &mut ItemRepository,
    params: &Params<'_>,
    body: &[u8],
) -> Result<HttpResponse, DispatchError> {
    let payload = parse_body(body)?;
    let changes = match validate_update(&payload) {
        Ok(changes) => changes,
        Err(errors) => return Ok(invalid(errors)),
    };
    match item_id(params).and_then(|id| repo.update(&id, changes)) {
        Some(item) => {
            let envelope = Envelope::ok()
                .with_message(UPDATED_MESSAGE)
                .with_data(&item);
            HttpResponse::json(200, &envelope)
        }
        None => Ok(not_found(ITEM_NOT_FOUND)),
    }
}

fn delete_item(
    repo: &mut ItemRepository,
    params: &Params<'_>,
    _: &[u8],
) -> Result<HttpResponse, DispatchError> {
    if item_id(params).is_some_and(|id| repo.delete(&id)) {
        Ok(HttpResponse::empty(204))
    } else {
        Ok(not_found(ITEM_NOT_FOUND))
    }
}

fn preflight(_: &mut ItemRepository, _: &Params<'_>, _: &[u8]) -> Result<HttpResponse, DispatchError> {
    Ok(HttpResponse::empty(200))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn send(dispatcher: &Dispatcher, repo: &mut ItemRepository, request: HttpRequest) -> (u16, Value) {
        let response = dispatcher.dispatch(repo, &request);
        let body = if response.body.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&response.body).unwrap()
        };
        (response.status, body)
    }

    #[test]
    fn route_table_order() {
        let dispatcher = Dispatcher::new();
        let patterns: Vec<(String, &str)> = dispatcher
            .router()
            .routes()
            .iter()
            .map(|route| (route.method.to_string(), route.pattern))
            .collect();
        assert_eq!(
            patterns,
            [
                ("GET".to_string(), "/health"),
                ("GET".to_string(), "/items"),
                ("POST".to_string(), "/items"),
                ("GET".to_string(), "/items/{id}"),
                ("PUT".to_string(), "/items/{id}"),
                ("DELETE".to_string(), "/items/{id}"),
                ("OPTIONS".to_string(), "*"),
            ]
        );
    }

    #[test]
    fn health_reports_timestamp() {
        let dispatcher = Dispatcher::new();
        let mut repo = ItemRepository::new();
        let (status, body) = send(&dispatcher, &mut repo, HttpRequest::new(HttpMethod::Get, "/health"));
        assert_eq!(status, 200);
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], HEALTH_MESSAGE);
        assert!(body["timestamp"].is_string());
    }

    #[test]
    fn create_without_body_fails_validation() {
        let dispatcher = Dispatcher::new();
        let mut repo = ItemRepository::new();
        let (status, body) = send(&dispatcher, &mut repo, HttpRequest::new(HttpMethod::Post, "/items"));
        assert_eq!(status, 400);
        assert_eq!(body["message"], VALIDATION_FAILED);
        assert_eq!(body["errors"].as_array().unwrap().len(), 1);
        assert!(repo.is_empty());
    }

    #[test]
    fn malformed_json_is_rejected_before_validation() {
        let dispatcher = Dispatcher::new();
        let mut repo = ItemRepository::new();
        let request = HttpRequest::new(HttpMethod::Post, "/items").with_body(r#"{"name":"#);
        let (status, body) = send(&dispatcher, &mut repo, request);
        assert_eq!(status, 400);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], INVALID_JSON);
        assert!(body.get("errors").is_none());
        assert!(repo.is_empty());
    }

    #[test]
    fn non_utf8_body_is_invalid_json() {
        let dispatcher = Dispatcher::new();
        let mut repo = ItemRepository::new();
        let request = HttpRequest::new(HttpMethod::Post, "/items").with_body(vec![0xff, 0xfe]);
        let (status, body) = send(&dispatcher, &mut repo, request);
        assert_eq!(status, 400);
        assert_eq!(body["message"], INVALID_JSON);
        assert!(repo.is_empty());
    }

    #[test]
    fn only_the_issued_id_form_names_an_item() {
        let dispatcher = Dispatcher::new();
        let mut repo = ItemRepository::new();
        let request = HttpRequest::new(HttpMethod::Post, "/items").with_body(r#"{"name":"Milk"}"#);
        let (status, body) = send(&dispatcher, &mut repo, request);
        assert_eq!(status, 201);
        let id = body["data"]["id"].as_str().unwrap().to_string();

        let (status, _) = send(&dispatcher, &mut repo, HttpRequest::new(HttpMethod::Get, format!("/items/{id}")));
        assert_eq!(status, 200);

        for alias in [
            id.replace('-', ""),
            id.to_uppercase(),
            format!("urn:uuid:{id}"),
            format!("{{{id}}}"),
        ] {
            let path = format!("/items/{alias}");
            for method in [HttpMethod::Get, HttpMethod::Delete] {
                let (status, body) = send(&dispatcher, &mut repo, HttpRequest::new(method, path.clone()));
                assert_eq!(status, 404, "{alias}");
                assert_eq!(body["message"], ITEM_NOT_FOUND);
            }
            let request = HttpRequest::new(HttpMethod::Put, path).with_body(r#"{"purchased":true}"#);
            let (status, _) = send(&dispatcher, &mut repo, request);
            assert_eq!(status, 404, "{alias}");
        }
        assert_eq!(repo.len(), 1);
        assert!(!repo.list_all()[0].purchased);
    }

    #[test]
    fn non_uuid_id_is_not_found() {
        let dispatcher = Dispatcher::new();
        let mut repo = ItemRepository::new();
        let (status, body) = send(&dispatcher, &mut repo, HttpRequest::new(HttpMethod::Get, "/items/abc"));
        assert_eq!(status, 404);
        assert_eq!(body["message"], ITEM_NOT_FOUND);
    }

    #[test]
    fn update_validates_before_lookup() {
        let dispatcher = Dispatcher::new();
        let mut repo = ItemRepository::new();
        let request = HttpRequest::new(HttpMethod::Put, format!("/items/{}", Uuid::new_v4()))
            .with_body(r#"{"quantity":-3}"#);
        let (status, _) = send(&dispatcher, &mut repo, request);
        assert_eq!(status, 400);
    }

    #[test]
    fn unknown_route_and_method_are_not_found() {
        let dispatcher = Dispatcher::new();
        let mut repo = ItemRepository::new();
        for request in [
            HttpRequest::new(HttpMethod::Get, "/"),
            HttpRequest::new(HttpMethod::Get, "/items/a/b"),
            HttpRequest::new(HttpMethod::Other("PATCH".to_string()), "/items"),
            HttpRequest::new(HttpMethod::Delete, "/items"),
        ] {
            let (status, body) = send(&dispatcher, &mut repo, request);
            assert_eq!(status, 404);
            assert_eq!(body["message"], ROUTE_NOT_FOUND);
        }
    }

    #[test]
    fn options_anywhere_is_empty_ok() {
        let dispatcher = Dispatcher::new();
        let mut repo = ItemRepository::new();
        let response = dispatcher.dispatch(&mut repo, &HttpRequest::new(HttpMethod::Options, "/anything/at/all"));
        assert_eq!(response.status, 200);
        assert!(response.body.is_empty());
    }

    #[test]
    fn body_read_failure_is_generic_500() {
        let response = failure_response(&DispatchError::BodyRead("connection reset".to_string()));
        assert_eq!(response.status, 500);
        let body: Value = serde_json::from_str(&response.body).unwrap();
        assert_eq!(body["message"], INTERNAL_ERROR);
        assert!(!response.body.contains("connection reset"));
    }
}
