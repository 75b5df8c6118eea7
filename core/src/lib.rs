//! Shopping-list item management without network I/O.
//!
//! # Overview
//! Holds the item model, the validator that guards it, the in-memory
//! repository, and a dispatcher that maps plain-data `HttpRequest` values to
//! `HttpResponse` values (host-does-IO pattern). A host such as the axum
//! server reads the socket, hands the request to `Dispatcher::dispatch`
//! together with the repository, and writes the response back.
//!
//! # Design
//! - `ItemRepository` is an ordinary value: the host creates one and passes
//!   it by reference to every dispatch. There is no global state.
//! - Routing is an ordered table of (method, pattern, handler); first match
//!   wins, and the matcher is testable on its own.
//! - Bodies go through two stages: bytes decode to `serde_json::Value`, then
//!   the validator produces `CreateItem` / `UpdateItem`. Untyped input never
//!   reaches the repository.

pub mod dispatch;
pub mod error;
pub mod http;
pub mod repository;
pub mod router;
pub mod types;
pub mod validate;

pub use dispatch::Dispatcher;
pub use error::{DispatchError, ValidationErrors};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use repository::ItemRepository;
pub use router::{match_path, Params, Router};
pub use types::{CreateItem, Envelope, Item, UpdateItem};
pub use validate::{validate_create, validate_update};
