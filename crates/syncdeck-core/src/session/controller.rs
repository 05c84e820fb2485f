//! Integration session controller.
//!
//! Tracks which integration is active, the credentials that belong to it,
//! and the records loaded with them. Every change goes through
//! [`SessionController::apply`].
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> AwaitingAuth -> Authorized <-> Loaded
//!   any --select(other kind)--> AwaitingAuth
//! ```
//!
//! Switching integrations moves the loaded records into a single
//! previous-snapshot slot, which stays on display until the new integration
//! loads its own records or the operator clears.
//!
//! ## Usage
//!
//! ```ignore
//! let mut controller = SessionController::new();
//! controller.select_integration(IntegrationKind::Airtable);
//! controller.auth_completed(done);
//! controller.load(&backend).await;
//! controller.displayed_data();
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::event::{LoadTicket, LoadTicketId, SessionEvent, SessionState, Transition};
use crate::error::LoadError;
use crate::integrations::{AuthCompleted, CredentialBag, IntegrationKind, RecordLoader};
use crate::records::NormalizedRecord;

/// The live selection, its credentials and its loaded records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "type")]
    kind: Option<IntegrationKind>,
    credentials: Option<CredentialBag>,
    loaded_data: Option<Vec<NormalizedRecord>>,
    previous_type: Option<IntegrationKind>,
}

impl Session {
    pub fn kind(&self) -> Option<IntegrationKind> {
        self.kind
    }

    pub fn credentials(&self) -> Option<&CredentialBag> {
        self.credentials.as_ref()
    }

    pub fn loaded_data(&self) -> Option<&[NormalizedRecord]> {
        self.loaded_data.as_deref()
    }

    pub fn previous_type(&self) -> Option<IntegrationKind> {
        self.previous_type
    }

    pub fn state(&self) -> SessionState {
        match (&self.kind, &self.credentials, &self.loaded_data) {
            (None, _, _) => SessionState::Idle,
            (Some(_), None, _) => SessionState::AwaitingAuth,
            (Some(_), Some(_), None) => SessionState::Authorized,
            (Some(_), Some(_), Some(_)) => SessionState::Loaded,
        }
    }
}

/// Records that were on display right before the last switch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviousSnapshot {
    /// Integration that produced the records.
    pub kind: Option<IntegrationKind>,
    pub records: Vec<NormalizedRecord>,
}

#[derive(Debug, Clone, Default)]
pub struct SessionController {
    session: Session,
    snapshot: Option<PreviousSnapshot>,
    /// Whether the snapshot is still what the operator sees.
    showing_snapshot: bool,
    in_flight: Option<LoadTicketId>,
    next_ticket: u64,
    /// Bumped whenever the displayed records may have changed.
    revision: u64,
}

impl SessionController {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    pub fn kind(&self) -> Option<IntegrationKind> {
        self.session.kind
    }

    pub fn credentials(&self) -> Option<&CredentialBag> {
        self.session.credentials.as_ref()
    }

    pub fn previous_type(&self) -> Option<IntegrationKind> {
        self.session.previous_type
    }

    pub fn previous_snapshot(&self) -> Option<&PreviousSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn can_load(&self) -> bool {
        self.session.credentials.is_some() && !self.is_loading()
    }

    pub fn can_clear(&self) -> bool {
        self.displayed_data().is_some()
    }

    /// Records the operator should see right now.
    ///
    /// The session's own records win; until they exist, the snapshot taken
    /// at the last switch is shown unless it was cleared.
    pub fn displayed_data(&self) -> Option<&[NormalizedRecord]> {
        if let Some(records) = self.session.loaded_data.as_deref() {
            return Some(records);
        }
        if self.showing_snapshot {
            return self.snapshot.as_ref().map(|s| s.records.as_slice());
        }
        None
    }

    /// Integration that produced [`Self::displayed_data`].
    pub fn displayed_kind(&self) -> Option<IntegrationKind> {
        if self.session.loaded_data.is_some() {
            return self.session.kind;
        }
        if self.showing_snapshot {
            return self.snapshot.as_ref().and_then(|s| s.kind);
        }
        None
    }

    // ── Operations ───────────────────────────────────────────────────

    pub fn select_integration(&mut self, kind: IntegrationKind) -> Transition {
        self.apply(SessionEvent::SelectIntegration(kind))
    }

    pub fn auth_completed(&mut self, done: AuthCompleted) -> Transition {
        self.apply(SessionEvent::AuthCompleted(done))
    }

    pub fn clear(&mut self) -> Transition {
        self.apply(SessionEvent::Clear)
    }

    /// Reserve the single load slot for the current selection.
    ///
    /// Returns `None` without credentials or while another load is
    /// outstanding.
    pub fn begin_load(&mut self) -> Option<LoadTicket> {
        let (Some(kind), Some(credentials)) = (self.session.kind, &self.session.credentials)
        else {
            debug!("load requested without credentials");
            return None;
        };
        if self.in_flight.is_some() {
            debug!(integration = %kind, "load already in flight");
            return None;
        }

        let id = LoadTicketId(self.next_ticket);
        self.next_ticket = self.next_ticket.wrapping_add(1);
        self.in_flight = Some(id);
        Some(LoadTicket {
            id,
            kind,
            credentials: credentials.clone(),
        })
    }

    /// Settle a load started with [`Self::begin_load`].
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<Vec<NormalizedRecord>, LoadError>,
    ) -> Transition {
        match result {
            Ok(records) => self.apply(SessionEvent::LoadSucceeded { ticket, records }),
            Err(error) => self.apply(SessionEvent::LoadFailed { ticket, error }),
        }
    }

    /// Run a complete load against `loader`.
    pub async fn load<L: RecordLoader>(&mut self, loader: &L) -> Transition {
        let Some(ticket) = self.begin_load() else {
            return Transition::Ignored;
        };
        let result = loader.load(ticket.kind, &ticket.credentials).await;
        self.finish_load(ticket, result)
    }

    // ── Transition function ──────────────────────────────────────────

    pub fn apply(&mut self, event: SessionEvent) -> Transition {
        let from = self.state();
        let transition = match event {
            SessionEvent::SelectIntegration(kind) => self.on_select(kind, from),
            SessionEvent::AuthCompleted(done) => self.on_auth(done, from),
            SessionEvent::LoadSucceeded { ticket, records } => {
                if self.settle(&ticket) {
                    self.session.loaded_data = Some(records);
                    self.showing_snapshot = false;
                    self.revision += 1;
                    self.applied(from)
                } else {
                    Transition::Stale
                }
            }
            SessionEvent::LoadFailed { ticket, error } => {
                if self.settle(&ticket) {
                    warn!(integration = %ticket.kind, error = %error, "load failed");
                    Transition::Failed {
                        message: error.user_message(),
                    }
                } else {
                    Transition::Stale
                }
            }
            SessionEvent::Clear => {
                if self.displayed_data().is_none() {
                    Transition::Ignored
                } else {
                    self.session.loaded_data = None;
                    self.showing_snapshot = false;
                    self.revision += 1;
                    self.applied(from)
                }
            }
        };

        if let Transition::Applied { from, to } = &transition {
            debug!(?from, ?to, "session transition");
        }
        transition
    }

    fn on_select(&mut self, kind: IntegrationKind, from: SessionState) -> Transition {
        if self.session.kind == Some(kind) {
            return Transition::Ignored;
        }

        if let Some(records) = self.session.loaded_data.take() {
            self.snapshot = Some(PreviousSnapshot {
                kind: self.session.kind,
                records,
            });
            self.showing_snapshot = true;
        }
        self.session.previous_type = self.session.kind;
        self.session.kind = Some(kind);
        self.session.credentials = None;
        if self.in_flight.take().is_some() {
            debug!(integration = %kind, "abandoning in-flight load");
        }
        self.revision += 1;
        info!(integration = %kind, previous = ?self.session.previous_type, "integration selected");
        self.applied(from)
    }

    fn on_auth(&mut self, done: AuthCompleted, from: SessionState) -> Transition {
        if self.session.kind != Some(done.kind) {
            warn!(
                integration = %done.kind,
                active = ?self.session.kind,
                "ignoring credentials for inactive integration"
            );
            return Transition::Ignored;
        }
        info!(integration = %done.kind, "credentials adopted");
        self.session.credentials = Some(done.credentials);
        self.applied(from)
    }

    /// Release the load slot held by `ticket` and report whether its
    /// response may still be applied.
    fn settle(&mut self, ticket: &LoadTicket) -> bool {
        let current = self.in_flight == Some(ticket.id);
        if current {
            self.in_flight = None;
        }
        let matches = self.session.kind == Some(ticket.kind)
            && self.session.credentials.as_ref() == Some(&ticket.credentials);
        if !(current && matches) {
            warn!(integration = %ticket.kind, "discarding stale load response");
            return false;
        }
        true
    }

    fn applied(&self, from: SessionState) -> Transition {
        Transition::Applied {
            from,
            to: self.state(),
        }
    }
}
