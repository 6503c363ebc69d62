rust_i18n::i18n!("locales", fallback = "en");

pub mod bank;
pub mod db;
pub mod extractors;
pub mod flow;
pub mod handlers;
pub mod irt;
pub mod models;
pub mod names;
pub mod page;
pub mod rejections;
pub mod services;
pub mod statics;
pub mod utils;
pub mod views;

use axum::{middleware, Router};

use crate::{page::PageRegistry, services::attempt::AttemptService};

#[derive(Clone)]
pub struct AppState {
    pub db: db::Db,
    pub attempts: AttemptService,
    pub pages: PageRegistry,
    pub secure_cookies: bool,
}

impl AppState {
    pub fn new(db: db::Db, max_answer_count: i64, secure_cookies: bool) -> Self {
        Self {
            attempts: AttemptService::new(db.clone(), max_answer_count),
            db,
            pages: PageRegistry::new(),
            secure_cookies,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(handlers::homepage::routes())
        .merge(handlers::cat::routes())
        .layer(middleware::from_fn(csrf_check))
        .nest("/static", statics::routes())
        .with_state(state)
}

async fn csrf_check(
    req: axum::http::Request<axum::body::Body>,
    next: middleware::Next,
) -> axum::response::Response {
    use axum::http::{Method, StatusCode};
    use axum::response::IntoResponse;

    let state_changing = [Method::POST, Method::PUT, Method::PATCH, Method::DELETE];

    if state_changing.contains(req.method()) {
        let has_hx_request = req
            .headers()
            .get("HX-Request")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v == "true");

        if !has_hx_request {
            return (StatusCode::FORBIDDEN, "CSRF check failed").into_response();
        }
    }

    next.run(req).await
}
