use axum::{
    extract::{Form, Path, State},
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Router,
};
use maud::Markup;
use rust_i18n::t;
use serde::Deserialize;

use crate::{
    extractors::{IsHtmx, Locale, Visitor},
    names,
    page::{
        PageError, PageKey, QuizPageController, SubmitControl, SubmitDecision, SubmitKind, Tick,
    },
    rejections::{AppError, ResultExt},
    services::attempt::{AnswerOutcome, ItemPage},
    utils, views,
    views::cat as cat_views,
    views::result as result_views,
    AppState,
};

/// htmx stops polling when it receives this status.
const STOP_POLLING: u16 = 286;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/cat/{id}", get(cat_page).post(cat_submit))
        .route("/cat/{id}/tick", post(tick))
        .route("/cat/{id}/choose", post(choose))
        .route("/result/{id}", get(result_page))
}

#[derive(Deserialize)]
struct AnswerForm {
    #[serde(default)]
    question: String,
    #[serde(default)]
    action: SubmitKind,
}

#[derive(Deserialize)]
struct ChooseForm {
    choice: String,
}

fn controller_for(page: &ItemPage) -> QuizPageController {
    QuizPageController::new(
        page.questionnaire.seconds,
        page.step,
        page.total,
        page.question.choice_ids(),
    )
}

/// Registers a fresh controller for `page` and renders it.
async fn open_page(
    state: &AppState,
    key: PageKey,
    page: &ItemPage,
    is_htmx: bool,
    locale: &str,
) -> Markup {
    let controller = controller_for(page);
    let markup = views::render(
        is_htmx,
        &page.questionnaire.name,
        cat_views::item_page(page, &controller, locale),
        locale,
    );
    state.pages.open(key, controller).await;
    markup
}

async fn cat_page(
    State(state): State<AppState>,
    Path(questionnaire_id): Path<i64>,
    visitor: Visitor,
    IsHtmx(is_htmx): IsHtmx,
    Locale(locale): Locale,
) -> Result<Response, AppError> {
    state
        .db
        .ensure_session(&visitor.session_key)
        .await
        .reject("could not create session")?;

    let page = state
        .attempts
        .begin(&visitor.session_key, questionnaire_id)
        .await?;

    let key = PageKey::new(&visitor.session_key, questionnaire_id);
    let markup = open_page(&state, key, &page, is_htmx, &locale).await;

    let mut headers = HeaderMap::new();
    if visitor.is_new {
        let cookie = utils::cookie(
            names::SESSION_COOKIE_NAME,
            &visitor.session_key,
            state.secure_cookies,
        )
        .reject("could not build session cookie")?;
        headers.insert(SET_COOKIE, cookie);
    }

    Ok((headers, markup).into_response())
}

async fn cat_submit(
    State(state): State<AppState>,
    Path(questionnaire_id): Path<i64>,
    visitor: Visitor,
    Locale(locale): Locale,
    Form(form): Form<AnswerForm>,
) -> Result<Response, AppError> {
    let key = PageKey::new(&visitor.session_key, questionnaire_id);

    // Without an open page (e.g. after a restart of the server) the form
    // fields are all there is to go on.
    let decision = match state.pages.with(&key, |c| c.submit(form.action)).await {
        Some(decision) => decision,
        None => SubmitControl::new().decide(form.action, &form.question),
    };

    let choice = match decision {
        SubmitDecision::Submit(choice) => choice,
        SubmitDecision::Suppress => {
            let page = state
                .attempts
                .current(&visitor.session_key, questionnaire_id)
                .await?;
            let markup = state
                .pages
                .with(&key, |c| cat_views::item_page(&page, c, &locale))
                .await;
            return Ok(match markup {
                Some(markup) => views::titled(&page.questionnaire.name, markup).into_response(),
                None => open_page(&state, key, &page, true, &locale)
                    .await
                    .into_response(),
            });
        }
        SubmitDecision::AlreadySubmitted => {
            return Err(AppError::Input("page was already submitted"));
        }
    };

    state.pages.close(&key).await;

    let outcome = state
        .attempts
        .answer(&visitor.session_key, questionnaire_id, &choice)
        .await?;

    Ok(match outcome {
        AnswerOutcome::Next => Redirect::to(&names::cat_url(questionnaire_id)).into_response(),
        AnswerOutcome::Finished => {
            Redirect::to(&names::result_url(questionnaire_id)).into_response()
        }
        AnswerOutcome::Invalid(page) => open_page(&state, key, &page, true, &locale)
            .await
            .into_response(),
    })
}

async fn tick(
    State(state): State<AppState>,
    Path(questionnaire_id): Path<i64>,
    visitor: Visitor,
    Locale(locale): Locale,
) -> Response {
    let key = PageKey::new(&visitor.session_key, questionnaire_id);

    let fragment = state
        .pages
        .with(&key, |c| {
            if c.tick() == Tick::Expired {
                tracing::debug!("time is up on questionnaire {questionnaire_id}");
            }
            cat_views::countdown(questionnaire_id, c.countdown(), &locale)
        })
        .await;

    match fragment {
        Some(markup) => markup.into_response(),
        None => StatusCode::from_u16(STOP_POLLING)
            .unwrap_or(StatusCode::NO_CONTENT)
            .into_response(),
    }
}

async fn choose(
    State(state): State<AppState>,
    Path(questionnaire_id): Path<i64>,
    visitor: Visitor,
    Locale(locale): Locale,
    Form(form): Form<ChooseForm>,
) -> Result<Markup, AppError> {
    let page = state
        .attempts
        .current(&visitor.session_key, questionnaire_id)
        .await?;
    let key = PageKey::new(&visitor.session_key, questionnaire_id);

    state
        .pages
        .with(&key, |c| -> Result<Markup, PageError> {
            c.select(&form.choice)?;
            Ok(cat_views::answer_form(
                questionnaire_id,
                &page.question.choices,
                c,
                &locale,
            ))
        })
        .await
        .ok_or(AppError::NotFound)?
        .map_err(|e| {
            tracing::debug!("{e}");
            AppError::Input("unknown choice")
        })
}

async fn result_page(
    State(state): State<AppState>,
    Path(questionnaire_id): Path<i64>,
    visitor: Visitor,
    IsHtmx(is_htmx): IsHtmx,
    Locale(locale): Locale,
) -> Result<Markup, AppError> {
    let result = state
        .attempts
        .result(&visitor.session_key, questionnaire_id)
        .await?;

    Ok(views::render(
        is_htmx,
        &t!("result.title", locale = locale.as_str()),
        result_views::result(&result, &locale),
        &locale,
    ))
}
