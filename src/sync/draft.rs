//! Draft manager: the single entry point for editing and submitting a ticket

use super::{ClassificationDebouncer, DebouncePhase, DebounceSettings, SharedDraft};
use crate::api::{Classifier, TicketStore};
use crate::config::DraftConfig;
use crate::core::{DraftField, Ticket, TicketDraft};
use crate::error::{Result, TicketDeskError};
use crate::integration::EventBus;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

pub const CREATED_MESSAGE: &str = "Ticket created successfully!";
pub const CREATE_FAILED_MESSAGE: &str = "Failed to create ticket. Please try again.";

/// Feedback shown next to the form after a submit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMessage {
    Success(String),
    Error(String),
}

impl FormMessage {
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Success(text) | Self::Error(text) => text,
        }
    }

    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmitState {
    pub submitting: bool,
    pub message: Option<FormMessage>,
    message_seq: u64,
}

/// Releases the submit claim when the submit future finishes or is dropped
struct SubmitClaim<'a>(&'a watch::Sender<SubmitState>);

impl Drop for SubmitClaim<'_> {
    fn drop(&mut self) {
        self.0
            .send_if_modified(|s| std::mem::replace(&mut s.submitting, false));
    }
}

/// Mutates the draft, feeds description edits to the debouncer and submits
/// the finished draft to the store.
#[derive(Clone)]
pub struct DraftManager {
    draft: SharedDraft,
    submit: Arc<watch::Sender<SubmitState>>,
    debouncer: ClassificationDebouncer,
    store: Arc<dyn TicketStore>,
    events: EventBus,
    title_max_len: usize,
    message_ttl: Duration,
}

impl std::fmt::Debug for DraftManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DraftManager")
            .field("draft", &*self.draft.borrow())
            .field("submit", &*self.submit.borrow())
            .finish_non_exhaustive()
    }
}

impl DraftManager {
    pub fn new(
        store: Arc<dyn TicketStore>,
        classifier: Arc<dyn Classifier>,
        events: EventBus,
        config: &DraftConfig,
        debounce: DebounceSettings,
    ) -> Self {
        let (draft, _) = watch::channel(TicketDraft::new());
        let draft = Arc::new(draft);
        let (submit, _) = watch::channel(SubmitState::default());
        Self {
            debouncer: ClassificationDebouncer::new(classifier, Arc::clone(&draft), debounce),
            draft,
            submit: Arc::new(submit),
            store,
            events,
            title_max_len: config.title_max_len,
            message_ttl: config.message_ttl(),
        }
    }

    /// Apply one edit. Description edits advance the generation and are
    /// handed to the debouncer.
    pub fn update_field(&self, field: DraftField) {
        let description = match &field {
            DraftField::Description(text) => Some(text.clone()),
            _ => None,
        };
        let mut generation = None;
        self.draft
            .send_modify(|d| generation = d.apply_edit(field, self.title_max_len));

        if let (Some(generation), Some(text)) = (generation, description) {
            self.debouncer.on_description_changed(&text, generation);
        }
    }

    /// Clear the form and invalidate any outstanding classification
    pub fn reset(&self) {
        self.draft.send_modify(TicketDraft::reset);
        self.debouncer.cancel();
        debug!(generation = self.draft.borrow().generation, "Draft reset");
    }

    #[must_use]
    pub fn can_submit(&self) -> bool {
        self.draft.borrow().has_required_fields() && !self.submit.borrow().submitting
    }

    /// Send the draft to the store.
    ///
    /// On success the draft is reset and a [`TicketCreated`] event is
    /// published. On failure the draft is left as it was and the error
    /// message shown is the server's `detail` when it sent one.
    ///
    /// [`TicketCreated`]: crate::integration::DeskEvent::TicketCreated
    pub async fn submit(&self) -> Result<Ticket> {
        let draft = self.draft();
        if let Some(field) = draft.missing_field() {
            return Err(TicketDeskError::MissingRequiredField {
                field: field.to_string(),
            });
        }

        let claimed = self.submit.send_if_modified(|s| {
            if s.submitting {
                return false;
            }
            s.submitting = true;
            s.message = None;
            true
        });
        if !claimed {
            return Err(TicketDeskError::SubmitInProgress);
        }
        let _claim = SubmitClaim(&self.submit);

        info!(title = %draft.title, category = %draft.category, priority = %draft.priority, "Submitting ticket");
        match self.store.create_ticket(&draft.to_new_ticket()).await {
            Ok(ticket) => {
                info!(id = %ticket.id, "Ticket created");
                self.reset();
                let seq = self.show_message(FormMessage::Success(CREATED_MESSAGE.to_string()));
                self.clear_message_after_ttl(seq);
                self.events.notify_ticket_created(&ticket);
                Ok(ticket)
            },
            Err(e) => {
                warn!(error = %e, "Ticket creation failed; draft preserved");
                let text = e
                    .server_detail()
                    .map_or_else(|| CREATE_FAILED_MESSAGE.to_string(), str::to_string);
                self.show_message(FormMessage::Error(text));
                Err(e)
            },
        }
    }

    pub fn dismiss_message(&self) {
        self.submit.send_if_modified(|s| {
            s.message_seq += 1;
            s.message.take().is_some()
        });
    }

    #[must_use]
    pub fn draft(&self) -> TicketDraft {
        self.draft.borrow().clone()
    }

    #[must_use]
    pub fn subscribe_draft(&self) -> watch::Receiver<TicketDraft> {
        self.draft.subscribe()
    }

    #[must_use]
    pub fn submit_state(&self) -> SubmitState {
        self.submit.borrow().clone()
    }

    #[must_use]
    pub fn subscribe_submit(&self) -> watch::Receiver<SubmitState> {
        self.submit.subscribe()
    }

    #[must_use]
    pub fn classification_phase(&self) -> DebouncePhase {
        self.debouncer.phase()
    }

    #[must_use]
    pub const fn debouncer(&self) -> &ClassificationDebouncer {
        &self.debouncer
    }

    fn show_message(&self, message: FormMessage) -> u64 {
        let mut seq = 0;
        self.submit.send_modify(|s| {
            s.message_seq += 1;
            s.message = Some(message);
            seq = s.message_seq;
        });
        seq
    }

    fn clear_message_after_ttl(&self, seq: u64) {
        let submit = Arc::clone(&self.submit);
        let ttl = self.message_ttl;
        tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            submit.send_if_modified(|s| {
                if s.message_seq != seq {
                    return false;
                }
                s.message.take().is_some()
            });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{MockClassifier, MockTicketStore};
    use crate::core::{Category, Priority, Status, TicketBuilder};
    use crate::integration::DeskEvent;
    use crate::test_utils::{GatedClassifier, GatedStore, RecordingClassifier, settle, suggestion};
    use tokio::time::sleep;

    const DESCRIPTION: &str = "I was charged twice for my subscription this month";

    fn manager(store: Arc<dyn TicketStore>, classifier: Arc<dyn Classifier>) -> DraftManager {
        DraftManager::new(
            store,
            classifier,
            EventBus::new(),
            &DraftConfig::default(),
            DebounceSettings::default(),
        )
    }

    fn fill(manager: &DraftManager) {
        manager.update_field(DraftField::Title("Double charge".into()));
        manager.update_field(DraftField::Description(DESCRIPTION.into()));
    }

    fn created(id: u64) -> Ticket {
        TicketBuilder::new()
            .id(id)
            .title("Double charge")
            .description(DESCRIPTION)
            .category(Category::Billing)
            .status(Status::Open)
            .build()
    }

    #[tokio::test(start_paused = true)]
    async fn test_description_edit_reaches_classifier() {
        let classifier = RecordingClassifier::new(Ok(suggestion(Category::Billing, Priority::High)));
        let manager = manager(Arc::new(MockTicketStore::new()), classifier.clone());

        fill(&manager);
        assert_eq!(manager.classification_phase(), DebouncePhase::PendingDebounce);
        sleep(Duration::from_secs(1)).await;
        settle().await;

        assert_eq!(classifier.calls(), vec![DESCRIPTION.to_string()]);
        let draft = manager.draft();
        assert_eq!(draft.category, Category::Billing);
        assert_eq!(draft.priority, Priority::High);
        assert!(draft.ai_suggested);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_manager_abandons_pending_classification() {
        let classifier = RecordingClassifier::new(Ok(suggestion(Category::Billing, Priority::High)));
        let manager = manager(Arc::new(MockTicketStore::new()), classifier.clone());

        manager.update_field(DraftField::Description(DESCRIPTION.into()));
        let clone = manager.clone();
        drop(manager);
        assert_eq!(clone.classification_phase(), DebouncePhase::PendingDebounce);
        drop(clone);

        sleep(Duration::from_secs(2)).await;
        settle().await;
        assert!(classifier.calls().is_empty());
    }

    #[tokio::test]
    async fn test_submit_requires_title_and_description() {
        let manager = manager(Arc::new(MockTicketStore::new()), Arc::new(MockClassifier::new()));
        assert!(!manager.can_submit());

        manager.update_field(DraftField::Title("Only a title".into()));
        let err = manager.submit().await.unwrap_err();
        assert!(matches!(
            err,
            TicketDeskError::MissingRequiredField { ref field } if field == "description"
        ));
        assert!(manager.submit_state().message.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_successful_submit_resets_and_announces() {
        let mut store = MockTicketStore::new();
        store
            .expect_create_ticket()
            .withf(|t| t.title == "Double charge" && t.description == DESCRIPTION)
            .times(1)
            .returning(|_| Ok(created(12)));
        let manager = manager(
            Arc::new(store),
            RecordingClassifier::failing("offline"),
        );
        let mut events = manager.events.subscribe();

        fill(&manager);
        let generation_before = manager.draft().generation;
        let ticket = manager.submit().await.unwrap();
        assert_eq!(ticket.id.get(), 12);

        let draft = manager.draft();
        assert!(draft.title.is_empty());
        assert!(draft.description.is_empty());
        assert!(draft.generation > generation_before);
        assert_eq!(manager.classification_phase(), DebouncePhase::Idle);

        let state = manager.submit_state();
        assert!(!state.submitting);
        assert_eq!(
            state.message,
            Some(FormMessage::Success(CREATED_MESSAGE.to_string()))
        );
        assert!(matches!(
            events.recv().await.unwrap(),
            DeskEvent::TicketCreated { ticket } if ticket.id.get() == 12
        ));

        sleep(Duration::from_millis(4001)).await;
        assert!(manager.submit_state().message.is_none());
    }

    #[tokio::test]
    async fn test_failed_submit_preserves_draft_and_shows_detail() {
        let mut store = MockTicketStore::new();
        store.expect_create_ticket().times(1).returning(|_| {
            Err(TicketDeskError::Api {
                status: 400,
                detail: Some("Title already exists".into()),
            })
        });
        let manager = manager(Arc::new(store), Arc::new(MockClassifier::new()));
        manager.update_field(DraftField::Title("Double charge".into()));
        manager.update_field(DraftField::Description("short".into()));

        assert!(manager.submit().await.is_err());

        let draft = manager.draft();
        assert_eq!(draft.title, "Double charge");
        assert_eq!(draft.description, "short");
        let state = manager.submit_state();
        assert!(!state.submitting);
        assert_eq!(
            state.message,
            Some(FormMessage::Error("Title already exists".into()))
        );
        assert!(manager.can_submit());
    }

    #[tokio::test]
    async fn test_failed_submit_without_detail_uses_fallback() {
        let mut store = MockTicketStore::new();
        store
            .expect_create_ticket()
            .returning(|_| Err(TicketDeskError::Network("connection reset".into())));
        let manager = manager(Arc::new(store), Arc::new(MockClassifier::new()));
        manager.update_field(DraftField::Title("A".into()));
        manager.update_field(DraftField::Description("B".into()));

        manager.submit().await.unwrap_err();
        assert_eq!(
            manager.submit_state().message.unwrap().text(),
            CREATE_FAILED_MESSAGE
        );
    }

    #[tokio::test]
    async fn test_second_submit_while_pending_is_rejected() {
        let (store, mut calls) = GatedStore::new();
        let manager = manager(store, Arc::new(MockClassifier::new()));
        manager.update_field(DraftField::Title("A".into()));
        manager.update_field(DraftField::Description("B".into()));

        let first = tokio::spawn({
            let manager = manager.clone();
            async move { manager.submit().await }
        });
        let pending = calls.creates.recv().await.unwrap();
        assert!(manager.submit_state().submitting);
        assert!(!manager.can_submit());
        assert!(matches!(
            manager.submit().await,
            Err(TicketDeskError::SubmitInProgress)
        ));

        pending.succeed(created(1));
        first.await.unwrap().unwrap();
        assert!(calls.creates.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_invalidates_outstanding_classification() {
        let (classifier, mut calls) = GatedClassifier::new();
        let manager = manager(Arc::new(MockTicketStore::new()), classifier);

        fill(&manager);
        let pending = calls.recv().await.unwrap();
        manager.reset();
        pending.succeed(suggestion(Category::Technical, Priority::Critical));
        settle().await;

        let draft = manager.draft();
        assert_eq!(draft.category, Category::General);
        assert_eq!(draft.priority, Priority::Medium);
        assert!(!draft.ai_suggested);
    }

    #[tokio::test]
    async fn test_dismiss_message() {
        let mut store = MockTicketStore::new();
        store
            .expect_create_ticket()
            .returning(|_| Err(TicketDeskError::Network("down".into())));
        let manager = manager(Arc::new(store), Arc::new(MockClassifier::new()));
        manager.update_field(DraftField::Title("A".into()));
        manager.update_field(DraftField::Description("B".into()));
        manager.submit().await.unwrap_err();

        manager.dismiss_message();
        assert!(manager.submit_state().message.is_none());
    }
}
