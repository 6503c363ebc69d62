pub const SESSION_COOKIE_NAME: &str = "sessionid";

pub fn cat_url(questionnaire_id: i64) -> String {
    format!("/cat/{questionnaire_id}")
}

pub fn tick_url(questionnaire_id: i64) -> String {
    format!("/cat/{questionnaire_id}/tick")
}

pub fn choose_url(questionnaire_id: i64) -> String {
    format!("/cat/{questionnaire_id}/choose")
}

pub fn result_url(questionnaire_id: i64) -> String {
    format!("/result/{questionnaire_id}")
}

// Quiz defaults
pub const DEFAULT_SECONDS: u32 = 30;
pub const DEFAULT_MAX_ANSWER_COUNT: i64 = 3;

// i18n
pub const LOCALE_COOKIE_NAME: &str = "lang";
pub const DEFAULT_LOCALE: &str = "en";
pub const SUPPORTED_LOCALES: &[&str] = &["en", "zh-CN"];
pub const SET_LOCALE_URL: &str = "/set-locale";
