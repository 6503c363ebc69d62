use maud::{html, Markup};
use rust_i18n::t;

use crate::{names, services::attempt::AttemptResult};

pub fn result(result: &AttemptResult, locale: &str) -> Markup {
    html! {
        h2 { (t!("result.title", locale = locale)) " " mark { (result.questionnaire.name) } }
        article {
            p { (t!("result.theta", locale = locale)) }
            p.result-theta { strong { (format!("{:.3}", result.theta)) } }
            p { (t!("result.info", locale = locale)) ": " (format!("{:.3}", result.info)) }
            p { (t!("result.tries", locale = locale, count = result.try_count)) }
        }

        @if !result.answers.is_empty() {
            table {
                thead {
                    tr {
                        th { "#" }
                        th { (t!("result.question", locale = locale)) }
                        th { (t!("result.level", locale = locale)) }
                        th { (t!("result.score", locale = locale)) }
                        th { "θ" }
                    }
                }
                tbody {
                    @for answer in &result.answers {
                        tr {
                            td { (answer.position) }
                            td { (answer.question) }
                            td { (answer.a_level) }
                            td {
                                @match answer.score {
                                    Some(score) => { (score) }
                                    None => { "-" }
                                }
                            }
                            td {
                                @match answer.theta {
                                    Some(theta) => { (format!("{theta:.3}")) }
                                    None => { "-" }
                                }
                            }
                        }
                    }
                }
            }
        }

        a role="button" href=(names::cat_url(result.questionnaire.id)) {
            (t!("result.again", locale = locale))
        }
    }
}
