use serde::{Deserialize, Serialize};

use crate::error::LoadError;
use crate::integrations::{AuthCompleted, CredentialBag, IntegrationKind};
use crate::records::NormalizedRecord;

/// Coarse session state, derived from which fields are set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No integration selected.
    Idle,
    /// Integration selected, credentials pending.
    AwaitingAuth,
    /// Credentials present, nothing loaded.
    Authorized,
    /// Credentials present and records loaded.
    Loaded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadTicketId(pub(crate) u64);

/// Proof that a load was started, carrying the selection it was started for.
///
/// Settling a load hands the ticket back so the controller can tell whether
/// the response still belongs to the active selection.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadTicket {
    pub(crate) id: LoadTicketId,
    pub(crate) kind: IntegrationKind,
    pub(crate) credentials: CredentialBag,
}

impl LoadTicket {
    pub fn id(&self) -> LoadTicketId {
        self.id
    }

    pub fn kind(&self) -> IntegrationKind {
        self.kind
    }

    pub fn credentials(&self) -> &CredentialBag {
        &self.credentials
    }
}

/// Everything that can change a session.
#[derive(Debug)]
pub enum SessionEvent {
    SelectIntegration(IntegrationKind),
    AuthCompleted(AuthCompleted),
    LoadSucceeded {
        ticket: LoadTicket,
        records: Vec<NormalizedRecord>,
    },
    LoadFailed {
        ticket: LoadTicket,
        error: LoadError,
    },
    Clear,
}

/// What applying an event did.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    Applied { from: SessionState, to: SessionState },
    /// The event was a no-op in the current state.
    Ignored,
    /// A load settled for a selection that is no longer active.
    Stale,
    /// The load or credential flow failed; state is unchanged.
    Failed { message: String },
}

impl Transition {
    pub fn is_applied(&self) -> bool {
        matches!(self, Transition::Applied { .. })
    }
}
