use super::{Category, ClassificationSuggestion, NewTicket, Priority};

/// Maximum title length accepted by the ticket form
pub const DEFAULT_TITLE_MAX_LEN: usize = 200;

/// A single user edit to the in-progress ticket
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftField {
    Title(String),
    Description(String),
    Category(Category),
    Priority(Priority),
}

/// The ticket being composed before submission
///
/// `generation` advances on every description edit and on reset, so any
/// classification tagged with an older generation can be recognized as stale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketDraft {
    pub title: String,
    pub description: String,
    pub category: Category,
    pub priority: Priority,
    /// Set once a suggestion has been applied, cleared by manual edits
    pub ai_suggested: bool,
    pub generation: u64,
}

impl TicketDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a user edit.
    ///
    /// Returns the new generation when the edit touched the description.
    pub fn apply_edit(&mut self, field: DraftField, title_max_len: usize) -> Option<u64> {
        match field {
            DraftField::Title(title) => {
                self.title = truncate_chars(title, title_max_len);
                None
            },
            DraftField::Description(description) => {
                self.description = description;
                self.ai_suggested = false;
                self.generation += 1;
                Some(self.generation)
            },
            DraftField::Category(category) => {
                self.category = category;
                self.ai_suggested = false;
                None
            },
            DraftField::Priority(priority) => {
                self.priority = priority;
                self.ai_suggested = false;
                None
            },
        }
    }

    /// Overwrite category and priority with a classifier suggestion
    pub fn apply_suggestion(&mut self, suggestion: ClassificationSuggestion) {
        self.category = suggestion.category;
        self.priority = suggestion.priority;
        self.ai_suggested = true;
    }

    /// Restore default field values and advance the generation
    pub fn reset(&mut self) {
        *self = Self {
            generation: self.generation + 1,
            ..Self::default()
        };
    }

    /// Whether title and description are both filled in
    #[must_use]
    pub fn has_required_fields(&self) -> bool {
        self.missing_field().is_none()
    }

    /// Name of the first required field that is still empty
    #[must_use]
    pub fn missing_field(&self) -> Option<&'static str> {
        if self.title.is_empty() {
            Some("title")
        } else if self.description.is_empty() {
            Some("description")
        } else {
            None
        }
    }

    #[must_use]
    pub fn to_new_ticket(&self) -> NewTicket {
        NewTicket {
            title: self.title.clone(),
            description: self.description.clone(),
            category: self.category,
            priority: self.priority,
        }
    }
}

fn truncate_chars(mut value: String, max_chars: usize) -> String {
    if let Some((idx, _)) = value.char_indices().nth(max_chars) {
        value.truncate(idx);
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_description_edit_bumps_generation() {
        let mut draft = TicketDraft::new();
        assert_eq!(
            draft.apply_edit(DraftField::Description("a".into()), 200),
            Some(1)
        );
        assert_eq!(
            draft.apply_edit(DraftField::Description("ab".into()), 200),
            Some(2)
        );
        assert_eq!(draft.apply_edit(DraftField::Title("t".into()), 200), None);
        assert_eq!(draft.generation, 2);
    }

    #[test]
    fn test_manual_edits_clear_ai_flag() {
        let mut draft = TicketDraft::new();
        draft.apply_suggestion(ClassificationSuggestion {
            category: Category::Billing,
            priority: Priority::High,
        });
        assert!(draft.ai_suggested);

        draft.apply_edit(DraftField::Priority(Priority::Low), 200);
        assert!(!draft.ai_suggested);
        assert_eq!(draft.category, Category::Billing);
        assert_eq!(draft.priority, Priority::Low);
    }

    #[test]
    fn test_title_is_capped_on_char_boundary() {
        let mut draft = TicketDraft::new();
        draft.apply_edit(DraftField::Title("é".repeat(250)), 200);
        assert_eq!(draft.title.chars().count(), 200);
    }

    #[test]
    fn test_reset_restores_defaults_and_advances_generation() {
        let mut draft = TicketDraft::new();
        draft.apply_edit(DraftField::Title("Broken invoice".into()), 200);
        draft.apply_edit(DraftField::Description("Charged twice".into()), 200);
        draft.apply_edit(DraftField::Category(Category::Billing), 200);

        draft.reset();
        assert_eq!(draft.generation, 2);
        assert!(draft.title.is_empty());
        assert_eq!(draft.category, Category::General);
        assert_eq!(draft.priority, Priority::Medium);
    }

    #[test]
    fn test_missing_field_order() {
        let mut draft = TicketDraft::new();
        assert_eq!(draft.missing_field(), Some("title"));
        draft.apply_edit(DraftField::Title("x".into()), 200);
        assert_eq!(draft.missing_field(), Some("description"));
        draft.apply_edit(DraftField::Description("y".into()), 200);
        assert!(draft.has_required_fields());
    }
}
