use maud::{html, Markup};
use rust_i18n::t;

use crate::{
    db::QuestionnaireSummary,
    names,
    page::{Placement, Popover},
};

pub fn questionnaire_list(questionnaires: &[QuestionnaireSummary], locale: &str) -> Markup {
    html! {
        h2 { (t!("home.title", locale = locale)) }

        @if questionnaires.is_empty() {
            p { (t!("home.empty", locale = locale)) }
        } @else {
            @for q in questionnaires {
                article {
                    header { strong { (q.name) } }
                    p { (t!("home.items", locale = locale, count = q.item_count)) }
                    @if q.has_finished {
                        (finished_link(q.id, locale))
                    } @else {
                        a role="button" href=(names::cat_url(q.id)) {
                            (t!("home.start", locale = locale))
                        }
                    }
                }
            }
        }
    }
}

fn finished_link(questionnaire_id: i64, locale: &str) -> Markup {
    let tooltip = Popover::text(t!("home.finished_hint", locale = locale), Placement::Right);

    html! {
        a.finished
          role="button"
          href=(names::result_url(questionnaire_id))
          data-tooltip=(tooltip.content())
          data-placement=(tooltip.placement().as_str()) {
            (t!("home.finished", locale = locale))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(id: i64, has_finished: bool) -> QuestionnaireSummary {
        QuestionnaireSummary {
            id,
            name: format!("Bank {id}"),
            item_count: 5,
            has_finished,
        }
    }

    #[test]
    fn finished_questionnaire_links_to_its_result() {
        let html = questionnaire_list(&[summary(2, true)], "en").into_string();

        assert!(html.contains(r#"class="finished""#));
        assert!(html.contains(r#"href="/result/2""#));
        assert!(html.contains(r#"data-tooltip="Completed, click to view the result""#));
        assert!(html.contains(r#"data-placement="right""#));
        assert!(!html.contains(r#"href="/cat/2""#));
    }

    #[test]
    fn unfinished_questionnaire_links_to_the_quiz() {
        let html = questionnaire_list(&[summary(3, false)], "en").into_string();

        assert!(html.contains(r#"href="/cat/3""#));
        assert!(!html.contains("finished"));
    }
}
