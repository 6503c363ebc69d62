use super::PageError;

/// The answer options of one item and which of them, if any, is chosen.
#[derive(Debug, Clone)]
pub struct ChoiceSelector {
    choices: Vec<String>,
    selected: Option<usize>,
}

impl ChoiceSelector {
    pub fn new(choices: Vec<String>) -> Self {
        Self {
            choices,
            selected: None,
        }
    }

    /// Marks `id` as the only selected choice.
    pub fn select(&mut self, id: &str) -> Result<(), PageError> {
        let idx = self
            .choices
            .iter()
            .position(|c| c == id)
            .ok_or_else(|| PageError::UnknownChoice(id.to_string()))?;
        self.selected = Some(idx);
        Ok(())
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.map(|idx| self.choices[idx].as_str())
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected() == Some(id)
    }

    /// Value of the hidden `question` form field.
    pub fn hidden_value(&self) -> &str {
        self.selected().unwrap_or("")
    }

    pub fn choices(&self) -> &[String] {
        &self.choices
    }
}
