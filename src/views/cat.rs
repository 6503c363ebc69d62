use maud::{html, Markup};
use rust_i18n::t;

use crate::{
    db::ChoiceModel,
    names,
    page::{Countdown, Placement, Popover, Progress, QuizPageController},
    services::attempt::ItemPage,
};

const INSTRUCTIONS_ID: &str = "instructions";
const CHOICE_HELP_ID: &str = "choice-help";

pub fn item_page(page: &ItemPage, controller: &QuizPageController, locale: &str) -> Markup {
    let qid = page.questionnaire.id;
    let instructions = t!("cat.instructions", locale = locale);
    let instructions_popover = Popover::from_node(INSTRUCTIONS_ID, &instructions, Placement::Bottom);

    html! {
        p { (t!("cat.doing", locale = locale)) " " mark { (page.questionnaire.name) } }
        article {
            (countdown(qid, controller.countdown(), locale))

            p {
                (t!("cat.item_of", locale = locale, current = page.step, total = page.total))
            }
            (progress_bar(controller.progress(), locale))

            h3 data-tooltip=(instructions_popover.content())
               data-placement=(instructions_popover.placement().as_str())
               aria-describedby=[instructions_popover.node_id()] {
                (page.question.question)
            }
            p.instructions id=(INSTRUCTIONS_ID) { (instructions) }

            (answer_form(qid, &page.question.choices, controller, locale))
        }
    }
}

/// The countdown bar. While running it polls the tick endpoint every second
/// and replaces itself; the expired variant carries no trigger.
pub fn countdown(questionnaire_id: i64, countdown: &Countdown, locale: &str) -> Markup {
    let percentage = countdown.percentage();
    let label = t!(
        "cat.seconds",
        locale = locale,
        count = countdown.remaining()
    );

    if countdown.is_expired() {
        return html! {
            div id="countdown" {
                div.countdown {
                    div."countdown-bar expired" style="width: 0%;" {}
                }
                span.countdown-label { (label) }
                (time_up_modal(questionnaire_id, locale))
            }
        };
    }

    html! {
        div id="countdown"
            hx-post=(names::tick_url(questionnaire_id))
            hx-trigger="every 1s"
            hx-swap="outerHTML" {
            div.countdown {
                div.countdown-bar style=(format!("width: {percentage}%;")) {}
            }
            span.countdown-label { (label) }
        }
    }
}

/// Shown once time is up. It has no close control: the only way on is the
/// button, which skips the item.
fn time_up_modal(questionnaire_id: i64, locale: &str) -> Markup {
    html! {
        dialog open id="time-up" {
            article {
                h3 { (t!("cat.time_up", locale = locale)) }
                p { (t!("cat.time_up_body", locale = locale)) }
                form method="post"
                     action=(names::cat_url(questionnaire_id))
                     hx-boost="true"
                     hx-target="main" {
                    input type="hidden" name="question" value="";
                    button type="submit" name="action" value="skip" {
                        (t!("cat.continue", locale = locale))
                    }
                }
            }
        }
    }
}

pub fn progress_bar(progress: Progress, locale: &str) -> Markup {
    let percentage = progress.percentage();
    let tooltip = Popover::text(
        t!("cat.items_left", locale = locale, count = progress.remaining()),
        Placement::Bottom,
    );

    html! {
        div data-tooltip=(tooltip.content()) data-placement=(tooltip.placement().as_str()) tabindex="0" {
            div.progress
                role="progressbar"
                aria-valuemin="0"
                aria-valuemax="100"
                aria-valuenow=(percentage) {
                div.progress-bar style=(format!("width: {percentage}%;")) {}
            }
        }
    }
}

pub fn answer_form(
    questionnaire_id: i64,
    choices: &[ChoiceModel],
    controller: &QuizPageController,
    locale: &str,
) -> Markup {
    let selector = controller.selector();
    let hint = Popover::text(t!("cat.choose_first", locale = locale), Placement::Top);
    let choice_help = t!("cat.choice_help", locale = locale);
    let choices_popover = Popover::from_node(CHOICE_HELP_ID, &choice_help, Placement::Left);

    let submit_button = html! {
        button type="submit" name="action" value="submit" {
            (t!("cat.submit", locale = locale))
        }
    };

    html! {
        form id="answer-form"
             method="post"
             action=(names::cat_url(questionnaire_id))
             hx-boost="true"
             hx-target="main" {
            input type="hidden" name="question" value=(selector.hidden_value());

            p id=(CHOICE_HELP_ID) hidden { (choice_help) }
            div.choices
                data-tooltip=(choices_popover.content())
                data-placement=(choices_popover.placement().as_str())
                aria-describedby=[choices_popover.node_id()] {
                @for (id, choice) in selector.choices().iter().zip(choices) {
                    @let class = if selector.is_selected(id) { "choice selected" } else { "choice outline" };
                    button type="button"
                           class=(class)
                           hx-post=(names::choose_url(questionnaire_id))
                           hx-vals=(format!(r#"{{"choice": "{id}"}}"#))
                           hx-target="#answer-form"
                           hx-swap="outerHTML" {
                        (choice.text)
                    }
                }
            }

            div role="group" {
                @if controller.hint_visible() {
                    span data-tooltip=(hint.content()) data-placement=(hint.placement().as_str()) {
                        (submit_button)
                    }
                } @else {
                    (submit_button)
                }
                button type="submit" name="action" value="skip" class="secondary" {
                    (t!("cat.skip", locale = locale))
                }
            }
        }
    }
}
