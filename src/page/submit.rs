use serde::Deserialize;

/// Which button submitted the answer form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmitKind {
    #[default]
    Submit,
    Skip,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitDecision {
    /// Send the form with this choice value (empty for a skip).
    Submit(String),
    /// Primary submit without a selection.
    Suppress,
    AlreadySubmitted,
}

/// Guards the answer form so a page is submitted at most once, and never
/// through the primary button without a selection.
#[derive(Debug, Clone)]
pub struct SubmitControl {
    submitted: bool,
    hint_visible: bool,
}

impl SubmitControl {
    pub fn new() -> Self {
        Self {
            submitted: false,
            hint_visible: true,
        }
    }

    pub fn decide(&mut self, kind: SubmitKind, hidden_value: &str) -> SubmitDecision {
        if self.submitted {
            return SubmitDecision::AlreadySubmitted;
        }

        let value = match kind {
            SubmitKind::Submit if hidden_value.is_empty() => return SubmitDecision::Suppress,
            SubmitKind::Submit => hidden_value.to_string(),
            SubmitKind::Skip => String::new(),
        };

        self.submitted = true;
        SubmitDecision::Submit(value)
    }

    /// Drops the "select an answer first" hint once a choice is made.
    pub fn dismiss_hint(&mut self) {
        self.hint_visible = false;
    }

    pub fn hint_visible(&self) -> bool {
        self.hint_visible
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }
}

impl Default for SubmitControl {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_submit_without_selection_is_suppressed() {
        let mut control = SubmitControl::new();

        assert_eq!(control.decide(SubmitKind::Submit, ""), SubmitDecision::Suppress);
        assert!(!control.is_submitted());
    }

    #[test]
    fn primary_submit_with_selection_submits_exactly_once() {
        let mut control = SubmitControl::new();

        assert_eq!(
            control.decide(SubmitKind::Submit, "B"),
            SubmitDecision::Submit("B".to_string())
        );
        assert_eq!(
            control.decide(SubmitKind::Submit, "B"),
            SubmitDecision::AlreadySubmitted
        );
    }

    #[test]
    fn skip_always_submits_an_empty_value() {
        let mut control = SubmitControl::new();

        assert_eq!(
            control.decide(SubmitKind::Skip, "C"),
            SubmitDecision::Submit(String::new())
        );
    }

    #[test]
    fn hint_is_visible_until_dismissed() {
        let mut control = SubmitControl::new();
        assert!(control.hint_visible());

        control.dismiss_hint();

        assert!(!control.hint_visible());
    }
}
