use axum::{
    extract::State,
    http::{header::SET_COOKIE, HeaderMap, HeaderValue},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use maud::Markup;
use rust_i18n::t;
use serde::Deserialize;

use crate::{
    extractors::{match_supported_locale, IsHtmx, Locale, Visitor},
    names,
    rejections::{AppError, ResultExt},
    utils, views,
    views::homepage as homepage_views,
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(homepage))
        .route(names::SET_LOCALE_URL, post(set_locale))
}

async fn homepage(
    State(state): State<AppState>,
    visitor: Visitor,
    IsHtmx(is_htmx): IsHtmx,
    Locale(locale): Locale,
) -> Result<Markup, AppError> {
    let session_key = (!visitor.is_new).then_some(visitor.session_key.as_str());
    let questionnaires = state
        .db
        .questionnaires(session_key)
        .await
        .reject("could not get questionnaires")?;

    Ok(views::render(
        is_htmx,
        &t!("home.title", locale = locale.as_str()),
        homepage_views::questionnaire_list(&questionnaires, &locale),
        &locale,
    ))
}

#[derive(Deserialize)]
struct SetLocaleBody {
    locale: String,
}

async fn set_locale(
    State(state): State<AppState>,
    Json(body): Json<SetLocaleBody>,
) -> Result<impl IntoResponse, AppError> {
    let locale = match_supported_locale(&body.locale).unwrap_or(names::DEFAULT_LOCALE);
    let cookie = utils::cookie(names::LOCALE_COOKIE_NAME, locale, state.secure_cookies)
        .reject("could not build locale cookie")?;
    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, cookie);
    headers.insert("HX-Refresh", HeaderValue::from_static("true"));

    Ok((headers, ""))
}
