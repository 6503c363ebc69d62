mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, Response, StatusCode},
    Router,
};
use catquiz::{router, AppState};
use common::{binary_bank, create_test_db, seed_vocabulary};
use tower::ServiceExt;

async fn app() -> (Router, i64) {
    let db = create_test_db().await;
    let id = seed_vocabulary(&db).await;
    (router(AppState::new(db, 3, false)), id)
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut req = Request::builder().method(Method::GET).uri(uri);
    if let Some(cookie) = cookie {
        req = req.header(header::COOKIE, cookie);
    }
    req.body(Body::empty()).expect("request build should succeed")
}

fn post_form(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
    let mut req = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("HX-Request", "true")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        req = req.header(header::COOKIE, cookie);
    }
    req.body(Body::from(body.to_string()))
        .expect("request build should succeed")
}

async fn send(app: &Router, req: Request<Body>) -> Response<Body> {
    app.clone().oneshot(req).await.expect("router should respond")
}

async fn body_string(resp: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    String::from_utf8(bytes.to_vec()).expect("body should be utf-8")
}

/// `name=value` of the session cookie set by the response.
fn session_cookie(resp: &Response<Body>) -> String {
    resp.headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .expect("session cookie should be set")
        .to_string()
}

/// Opens the quiz page and returns the visitor's cookie.
async fn open_quiz(app: &Router, id: i64) -> String {
    let resp = send(app, get(&format!("/cat/{id}"), None)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    session_cookie(&resp)
}

#[tokio::test]
async fn homepage_lists_questionnaires() {
    let (app, id) = app().await;

    let resp = send(&app, get("/", None)).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_string(resp).await;
    assert!(body.contains("Vocabulary"));
    assert!(body.contains(&format!("href=\"/cat/{id}\"")));
}

#[tokio::test]
async fn state_changing_requests_need_the_htmx_header() {
    let (app, id) = app().await;

    let req = Request::builder()
        .method(Method::POST)
        .uri(format!("/cat/{id}"))
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("action=skip"))
        .unwrap();
    let resp = send(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn first_visit_sets_the_session_cookie_and_renders_the_page() {
    let (app, id) = app().await;

    let resp = send(&app, get(&format!("/cat/{id}"), None)).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let set_cookie = resp
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(set_cookie.starts_with("sessionid="));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(!set_cookie.contains("Secure"));

    let body = body_string(resp).await;
    assert!(body.contains(r#"id="countdown""#));
    assert!(body.contains(r#"hx-trigger="every 1s""#));
    assert!(body.contains("Item 1 of 4"));
    assert!(body.contains(r#"aria-valuenow="25""#));
    assert!(body.contains("3 items left"));
}

#[tokio::test]
async fn unknown_questionnaire_is_not_found() {
    let (app, _) = app().await;

    let resp = send(&app, get("/cat/999", None)).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn tick_counts_down_one_second() {
    let (app, id) = app().await;
    let cookie = open_quiz(&app, id).await;

    let resp = send(&app, post_form(&format!("/cat/{id}/tick"), "", Some(&cookie))).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_string(resp).await;
    assert!(body.contains("width: 96%;"));
    assert!(body.contains("29 seconds"));
    assert!(body.contains(r#"hx-trigger="every 1s""#));
}

#[tokio::test]
async fn tick_without_an_open_page_stops_polling() {
    let (app, id) = app().await;

    let resp = send(&app, post_form(&format!("/cat/{id}/tick"), "", None)).await;

    assert_eq!(resp.status().as_u16(), 286);
}

#[tokio::test]
async fn choosing_marks_exactly_one_choice() {
    let (app, id) = app().await;
    let cookie = open_quiz(&app, id).await;
    let uri = format!("/cat/{id}/choose");

    send(&app, post_form(&uri, "choice=0", Some(&cookie))).await;
    let resp = send(&app, post_form(&uri, "choice=1", Some(&cookie))).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_string(resp).await;
    assert_eq!(body.matches("choice selected").count(), 1);
    assert!(body.contains(r#"name="question" value="1""#));
    assert!(!body.contains("Choose an answer first"));
}

#[tokio::test]
async fn choosing_an_unknown_choice_is_rejected() {
    let (app, id) = app().await;
    let cookie = open_quiz(&app, id).await;

    let resp = send(
        &app,
        post_form(&format!("/cat/{id}/choose"), "choice=7", Some(&cookie)),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn submit_without_a_choice_is_suppressed() {
    let (app, id) = app().await;
    let cookie = open_quiz(&app, id).await;

    let resp = send(
        &app,
        post_form(&format!("/cat/{id}"), "question=&action=submit", Some(&cookie)),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_string(resp).await;
    assert!(body.contains(r#"id="answer-form""#));
    assert!(body.contains("Choose an answer first"));
    assert!(body.contains("Item 1 of 4"));
}

#[tokio::test]
async fn skip_moves_on_to_the_next_item() {
    let (app, id) = app().await;
    let cookie = open_quiz(&app, id).await;

    let resp = send(
        &app,
        post_form(&format!("/cat/{id}"), "question=&action=skip", Some(&cookie)),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        resp.headers().get(header::LOCATION).unwrap(),
        &format!("/cat/{id}")
    );

    let resp = send(&app, get(&format!("/cat/{id}"), Some(&cookie))).await;
    let body = body_string(resp).await;
    assert!(body.contains("Item 2 of 4"));
    assert!(body.contains(r#"aria-valuenow="50""#));
    assert!(body.contains("2 items left"));
}

#[tokio::test]
async fn expired_countdown_shows_the_time_up_dialog() {
    let db = create_test_db().await;
    let id = db
        .load_questionnaire(binary_bank("Blitz", "2|2", 2, 3, 0))
        .await
        .unwrap();
    let app = router(AppState::new(db, 3, false));
    let cookie = open_quiz(&app, id).await;

    let resp = send(&app, post_form(&format!("/cat/{id}/tick"), "", Some(&cookie))).await;

    let body = body_string(resp).await;
    assert!(body.contains(r#"<dialog open id="time-up">"#));
    assert!(!body.contains("hx-trigger"));

    let resp = send(
        &app,
        post_form(&format!("/cat/{id}"), "question=&action=skip", Some(&cookie)),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn answering_every_item_leads_to_the_result() {
    let (app, id) = app().await;
    let cookie = open_quiz(&app, id).await;
    let submit_uri = format!("/cat/{id}");

    let mut location = String::new();
    for step in 1..=4 {
        if step > 1 {
            let resp = send(&app, get(&submit_uri, Some(&cookie))).await;
            assert_eq!(resp.status(), StatusCode::OK);
        }
        send(
            &app,
            post_form(&format!("/cat/{id}/choose"), "choice=1", Some(&cookie)),
        )
        .await;
        let resp = send(
            &app,
            post_form(&submit_uri, "question=1&action=submit", Some(&cookie)),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        location = resp
            .headers()
            .get(header::LOCATION)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
    }

    assert_eq!(location, format!("/result/{id}"));
    let resp = send(&app, get(&location, Some(&cookie))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_string(resp).await;
    assert!(body.contains("Estimated ability"));
    assert!(body.contains("Level two item"));
}

#[tokio::test]
async fn finished_questionnaire_links_home_to_the_result() {
    let (app, id) = app().await;
    let cookie = open_quiz(&app, id).await;
    for step in 1..=4 {
        if step > 1 {
            send(&app, get(&format!("/cat/{id}"), Some(&cookie))).await;
        }
        send(
            &app,
            post_form(&format!("/cat/{id}"), "question=&action=skip", Some(&cookie)),
        )
        .await;
    }

    let resp = send(&app, get("/", Some(&cookie))).await;
    let body = body_string(resp).await;
    assert!(body.contains(&format!(r#"href="/result/{id}""#)));
    assert!(body.contains("Completed, click to view the result"));

    let resp = send(&app, get("/", None)).await;
    let body = body_string(resp).await;
    assert!(body.contains(&format!(r#"href="/cat/{id}""#)));
    assert!(!body.contains("Completed, click to view the result"));
}

#[tokio::test]
async fn retake_cannot_reuse_level_one_items() {
    let (app, id) = app().await;
    let cookie = open_quiz(&app, id).await;

    // one of the two level-one items was shown in the first try
    let resp = send(&app, get(&format!("/cat/{id}"), Some(&cookie))).await;

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn result_before_finishing_is_not_found() {
    let (app, id) = app().await;
    let cookie = open_quiz(&app, id).await;

    let resp = send(&app, get(&format!("/result/{id}"), Some(&cookie))).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn static_files_are_served_with_a_content_type() {
    let (app, _) = app().await;

    let resp = send(&app, get("/static/index.css", None)).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get(header::CONTENT_TYPE).unwrap(), "text/css");
}

#[tokio::test]
async fn locale_cookie_switches_the_language() {
    let (app, id) = app().await;

    let resp = send(&app, get(&format!("/cat/{id}"), Some("lang=zh-CN"))).await;

    let body = body_string(resp).await;
    assert!(body.contains("30 秒"));
}
