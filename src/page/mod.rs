//! State of one quiz item page: the countdown, the item progress bar, the
//! answer choices and the submit buttons. Views render this state; handlers
//! mutate it through [`QuizPageController`].

mod choice;
mod countdown;
mod popover;
mod progress;
pub mod registry;
mod submit;

pub use choice::ChoiceSelector;
pub use countdown::{Countdown, Tick};
pub use popover::{Placement, Popover};
pub use progress::Progress;
pub use registry::{PageKey, PageRegistry};
pub use submit::{SubmitControl, SubmitDecision, SubmitKind};

#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error("malformed {field}: {text:?}")]
    Malformed { field: &'static str, text: String },
    #[error("unknown choice {0:?}")]
    UnknownChoice(String),
}

#[derive(Debug, Clone)]
pub struct QuizPageController {
    countdown: Countdown,
    progress: Progress,
    selector: ChoiceSelector,
    submit: SubmitControl,
}

impl QuizPageController {
    pub fn new(seconds: u32, current_item: u32, total_items: u32, choices: Vec<String>) -> Self {
        Self {
            countdown: Countdown::new(seconds),
            progress: Progress::new(current_item, total_items),
            selector: ChoiceSelector::new(choices),
            submit: SubmitControl::new(),
        }
    }

    /// Builds a controller from the numbers printed on a rendered page, for
    /// rehydrating a page whose server-side state was lost. The handlers open
    /// pages with [`QuizPageController::new`] instead.
    pub fn from_rendered(
        countdown_text: &str,
        total_text: &str,
        current_text: &str,
        choices: Vec<String>,
    ) -> Result<Self, PageError> {
        let seconds = parse_count("countdown", countdown_text)?;
        let total = parse_count("total items", total_text)?;
        let current = parse_count("current item", current_text)?;
        Ok(Self::new(seconds, current, total, choices))
    }

    pub fn tick(&mut self) -> Tick {
        self.countdown.tick()
    }

    pub fn select(&mut self, id: &str) -> Result<(), PageError> {
        self.selector.select(id)?;
        self.submit.dismiss_hint();
        Ok(())
    }

    /// Decides whether the form goes out. An accepted submission stops the
    /// countdown.
    pub fn submit(&mut self, kind: SubmitKind) -> SubmitDecision {
        let hidden = self.selector.hidden_value().to_string();
        let decision = self.submit.decide(kind, &hidden);
        if matches!(decision, SubmitDecision::Submit(_)) {
            self.countdown.stop();
        }
        decision
    }

    pub fn start_countdown(&mut self) {
        self.countdown.start();
    }

    pub fn stop_countdown(&mut self) {
        self.countdown.stop();
    }

    pub fn reset_countdown(&mut self) {
        self.countdown.reset();
    }

    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    pub fn progress(&self) -> Progress {
        self.progress
    }

    pub fn selector(&self) -> &ChoiceSelector {
        &self.selector
    }

    pub fn hint_visible(&self) -> bool {
        self.submit.hint_visible()
    }
}

fn parse_count(field: &'static str, text: &str) -> Result<u32, PageError> {
    text.trim().parse().map_err(|_| PageError::Malformed {
        field,
        text: text.to_string(),
    })
}
