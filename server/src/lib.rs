use std::{any::Any, sync::Arc};

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use log::{error, info};
use shopping_list_core::{
    dispatch::{failure_response, internal_error},
    DispatchError, Dispatcher, HttpMethod, HttpRequest, HttpResponse, ItemRepository,
};
use tokio::{net::TcpListener, sync::Mutex};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any as AnyOrigin, CorsLayer},
};

/// Everything a request needs: the route table and the one repository.
#[derive(Clone)]
pub struct AppState {
    dispatcher: Arc<Dispatcher>,
    repo: Arc<Mutex<ItemRepository>>,
}

impl AppState {
    pub fn new(repo: ItemRepository) -> Self {
        Self {
            dispatcher: Arc::new(Dispatcher::new()),
            repo: Arc::new(Mutex::new(repo)),
        }
    }
}

pub fn app() -> Router {
    app_with(AppState::new(ItemRepository::new()))
}

/// Every request goes to the core dispatcher; axum only supplies the socket,
/// CORS headers and panic recovery.
pub fn app_with(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .fallback(handle)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(cors)
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app())
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown requested, draining connections"),
        Err(err) => {
            error!("failed to listen for shutdown signal: {err}");
            std::future::pending::<()>().await;
        }
    }
}

async fn handle(State(state): State<AppState>, request: Request) -> Response {
    let (parts, body) = request.into_parts();

    // The whole body is read before the repository lock is taken, so
    // dispatch itself never waits on the network.
    let response = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => {
            let request = HttpRequest {
                method: HttpMethod::from_token(parts.method.as_str()),
                path: parts.uri.path().to_string(),
                body: bytes.to_vec(),
            };
            let mut repo = state.repo.lock().await;
            state.dispatcher.dispatch(&mut repo, &request)
        }
        Err(err) => failure_response(&DispatchError::BodyRead(err.to_string())),
    };

    into_response(response)
}

fn into_response(response: HttpResponse) -> Response {
    let mut builder = Response::builder().status(response.status);
    for (name, value) in &response.headers {
        builder = builder.header(name, value);
    }
    builder.body(Body::from(response.body)).unwrap_or_else(|err| {
        error!("failed to build response: {err}");
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    })
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic payload");
    error!("request handler panicked: {detail}");
    into_response(internal_error())
}
