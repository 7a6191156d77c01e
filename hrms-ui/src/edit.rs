//! Single-row edit sessions for tabular views.
//!
//! A table owns one [`EditSessions`]. At most one row is editable at a time:
//! beginning an edit replaces whatever session existed, discarding its draft.
//! Confirming hands the draft to a [`RowStore`], then re-fetches the table
//! whatever the outcome, so the view never keeps a copy that diverges from
//! the store.
//!
//! # Example
//!
//! ```ignore
//! let sessions = EditSessions::new(store, alerts);
//!
//! sessions.begin_edit(7, Status::Present);
//! sessions.update_draft(&7, Status::Absent);
//! match sessions.confirm_edit().await {
//!     ConfirmOutcome::Saved => {}
//!     ConfirmOutcome::Failed(message) => log::warn!("{message}"),
//!     _ => {}
//! }
//! ```

use std::fmt::{Debug, Display};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use log::{debug, warn};

use crate::alert::{Alert, AlertSink};

/// The persistence side of an editable table.
#[async_trait]
pub trait RowStore: Send + Sync {
    type Id: Clone + PartialEq + Debug + Send + Sync;
    type Value: Clone + Debug + Send + Sync;
    type Error: Display + Send;

    /// Write one row's new value.
    async fn persist_update(&self, id: &Self::Id, value: &Self::Value) -> Result<(), Self::Error>;

    /// Re-fetch the authoritative row collection.
    async fn refresh(&self) -> Result<(), Self::Error>;
}

/// A row that can seed an edit session.
pub trait EditableRow {
    type Id;
    type Value;

    fn row_id(&self) -> Self::Id;
    fn persisted_value(&self) -> Self::Value;
}

/// Draft state for the one row being edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession<I, V> {
    pub row_id: I,
    pub draft: V,
    pub is_saving: bool,
}

/// Result of [`EditSessions::confirm_edit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmOutcome {
    /// Nothing was being edited.
    NoSession,
    /// A save is already in flight; no request was issued.
    AlreadySaving,
    Saved,
    /// The store rejected the update. Carries the user-facing message.
    Failed(String),
}

const DEFAULT_SAVED_MESSAGE: &str = "Changes saved";
const DEFAULT_FAILED_MESSAGE: &str = "Failed to save changes";

struct State<I, V> {
    session: Option<EditSession<I, V>>,
    /// Bumped for every new session.
    generation: u64,
    /// A save is in flight for this table.
    in_flight: bool,
}

struct Messages {
    saved: String,
    failed: String,
}

/// Exclusive edit-session holder for one table.
///
/// Clones share the session. The state lock is never held across an await.
pub struct EditSessions<S: RowStore> {
    store: Arc<S>,
    alerts: Arc<dyn AlertSink>,
    messages: Arc<Messages>,
    state: Arc<Mutex<State<S::Id, S::Value>>>,
}

impl<S: RowStore> Clone for EditSessions<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            alerts: Arc::clone(&self.alerts),
            messages: Arc::clone(&self.messages),
            state: Arc::clone(&self.state),
        }
    }
}

impl<S: RowStore> EditSessions<S> {
    pub fn new(store: Arc<S>, alerts: Arc<dyn AlertSink>) -> Self {
        Self {
            store,
            alerts,
            messages: Arc::new(Messages {
                saved: DEFAULT_SAVED_MESSAGE.to_string(),
                failed: DEFAULT_FAILED_MESSAGE.to_string(),
            }),
            state: Arc::new(Mutex::new(State {
                session: None,
                generation: 0,
                in_flight: false,
            })),
        }
    }

    /// Set the success alert text and the fallback used when a failed
    /// save carries no message of its own.
    pub fn with_messages(mut self, saved: impl Into<String>, failed: impl Into<String>) -> Self {
        self.messages = Arc::new(Messages {
            saved: saved.into(),
            failed: failed.into(),
        });
        self
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Start editing `row_id`, seeded with its persisted value.
    ///
    /// Any other session is dropped without persisting its draft. A save
    /// already in flight still completes and still refreshes the table.
    pub fn begin_edit(&self, row_id: S::Id, persisted: S::Value) {
        let Ok(mut state) = self.state.lock() else {
            return;
        };
        if let Some(previous) = &state.session
            && previous.row_id != row_id
        {
            debug!("edit of row {:?} superseded by {row_id:?}", previous.row_id);
        }
        state.generation += 1;
        debug!("editing row {row_id:?} (from {persisted:?})");
        state.session = Some(EditSession {
            row_id,
            draft: persisted,
            is_saving: false,
        });
    }

    /// [`begin_edit`](Self::begin_edit) for anything that knows its own id
    /// and persisted value.
    pub fn begin_edit_row<R>(&self, row: &R)
    where
        R: EditableRow<Id = S::Id, Value = S::Value>,
    {
        self.begin_edit(row.row_id(), row.persisted_value());
    }

    /// Change the draft of the session for `row_id`.
    ///
    /// Returns `false` (and does nothing) when that row is not being edited
    /// or its save is already under way.
    pub fn update_draft(&self, row_id: &S::Id, value: S::Value) -> bool {
        let Ok(mut state) = self.state.lock() else {
            return false;
        };
        match state.session.as_mut() {
            Some(session) if session.row_id == *row_id && !session.is_saving => {
                session.draft = value;
                true
            }
            _ => false,
        }
    }

    /// Drop the session without touching the store.
    ///
    /// A session whose save is in flight cannot be cancelled; returns
    /// `false` for it and when there is no session.
    pub fn cancel_edit(&self) -> bool {
        let Ok(mut state) = self.state.lock() else {
            return false;
        };
        if !state.session.as_ref().is_some_and(|s| !s.is_saving) {
            return false;
        }
        if let Some(session) = state.session.take() {
            debug!("edit of row {:?} cancelled", session.row_id);
        }
        true
    }

    /// Persist the active draft.
    ///
    /// The session is torn down once the store answers (unless a newer
    /// session replaced it meanwhile), an alert reports the outcome, and the
    /// table is refreshed. Only one save runs per table; a confirm while one
    /// is in flight returns [`ConfirmOutcome::AlreadySaving`] without a
    /// request.
    pub async fn confirm_edit(&self) -> ConfirmOutcome {
        let (row_id, draft, generation) = {
            let Ok(mut state) = self.state.lock() else {
                return ConfirmOutcome::NoSession;
            };
            if state.in_flight {
                return ConfirmOutcome::AlreadySaving;
            }
            let generation = state.generation;
            let Some(session) = state.session.as_mut() else {
                return ConfirmOutcome::NoSession;
            };
            session.is_saving = true;
            let pending = (session.row_id.clone(), session.draft.clone());
            state.in_flight = true;
            (pending.0, pending.1, generation)
        };

        debug!("saving row {row_id:?} as {draft:?}");
        let result = self.store.persist_update(&row_id, &draft).await;

        if let Ok(mut state) = self.state.lock() {
            state.in_flight = false;
            if state.generation == generation {
                state.session = None;
            }
        }

        let outcome = match result {
            Ok(()) => {
                self.alerts.push(Alert::success(self.messages.saved.clone()));
                ConfirmOutcome::Saved
            }
            Err(e) => {
                let mut message = e.to_string();
                if message.trim().is_empty() {
                    message = self.messages.failed.clone();
                }
                warn!("saving row {row_id:?} failed: {message}");
                self.alerts.push(Alert::error(message.clone()));
                ConfirmOutcome::Failed(message)
            }
        };

        if let Err(e) = self.store.refresh().await {
            warn!("refresh after saving row {row_id:?} failed: {e}");
            self.alerts.push(Alert::error(format!("Failed to refresh: {e}")));
        }

        outcome
    }

    /// Snapshot of the active session.
    pub fn active(&self) -> Option<EditSession<S::Id, S::Value>> {
        self.state
            .lock()
            .ok()
            .and_then(|state| state.session.clone())
    }

    pub fn is_editing(&self, row_id: &S::Id) -> bool {
        self.state
            .lock()
            .map(|state| {
                state
                    .session
                    .as_ref()
                    .is_some_and(|session| session.row_id == *row_id)
            })
            .unwrap_or(false)
    }

    /// Whether a save is in flight for this table.
    pub fn is_saving(&self) -> bool {
        self.state.lock().map(|state| state.in_flight).unwrap_or(false)
    }
}

impl<S: RowStore> std::fmt::Debug for EditSessions<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditSessions")
            .field("active", &self.active())
            .field("saving", &self.is_saving())
            .finish()
    }
}
