//! Session view model.
//!
//! Owns the operator identity, the session controller and the data panel.
//! The presentation layer reads from here and forwards operator actions;
//! it never mutates the controller directly.

use std::collections::HashSet;

use crate::error::{AuthError, LoadError};
use crate::integrations::{AuthCompleted, IntegrationKind, Operator, RecordLoader};
use crate::records::NormalizedRecord;
use crate::session::{LoadTicket, SessionController, Transition};

/// The data panel's copy of the displayed records plus its action state.
#[derive(Debug, Clone, Default)]
pub struct DataPanel {
    rows: Option<Vec<NormalizedRecord>>,
    source: Option<IntegrationKind>,
    synced_revision: Option<u64>,
    load_enabled: bool,
    clear_enabled: bool,
    loading: bool,
}

impl DataPanel {
    /// Replace the panel's copy if the controller changed since last sync.
    pub fn sync(&mut self, controller: &SessionController) {
        if self.synced_revision != Some(controller.revision()) {
            self.rows = controller.displayed_data().map(<[_]>::to_vec);
            self.source = controller.displayed_kind();
            self.synced_revision = Some(controller.revision());
        }
        self.load_enabled = controller.can_load();
        self.clear_enabled = controller.can_clear();
        self.loading = controller.is_loading();
    }

    pub fn rows(&self) -> Option<&[NormalizedRecord]> {
        self.rows.as_deref()
    }

    /// Integration the rows came from.
    pub fn source(&self) -> Option<IntegrationKind> {
        self.source
    }

    pub fn load_enabled(&self) -> bool {
        self.load_enabled
    }

    pub fn clear_enabled(&self) -> bool {
        self.clear_enabled
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Whether the panel has anything to show at all.
    pub fn is_visible(&self) -> bool {
        self.rows.is_some() || self.load_enabled || self.loading
    }
}

#[derive(Debug, Clone)]
pub struct SessionView {
    operator: Operator,
    controller: SessionController,
    panel: DataPanel,
    notice: Option<String>,
    /// Integrations whose credential flow has started but not settled.
    pending_auth: HashSet<IntegrationKind>,
}

impl SessionView {
    pub fn new(operator: Operator) -> Self {
        let controller = SessionController::new();
        let mut panel = DataPanel::default();
        panel.sync(&controller);
        Self {
            operator,
            controller,
            panel,
            notice: None,
            pending_auth: HashSet::new(),
        }
    }

    pub fn operator(&self) -> &Operator {
        &self.operator
    }

    pub fn set_user(&mut self, user: impl Into<String>) {
        self.operator.user = user.into();
    }

    pub fn set_org(&mut self, org: impl Into<String>) {
        self.operator.org = org.into();
    }

    pub fn controller(&self) -> &SessionController {
        &self.controller
    }

    pub fn panel(&self) -> &DataPanel {
        &self.panel
    }

    /// Integration whose credential flow should be mounted, if any.
    pub fn active_flow(&self) -> Option<IntegrationKind> {
        self.controller.kind()
    }

    /// Take the pending operator notice (e.g. a load failure), if any.
    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }

    pub fn pick(&mut self, kind: IntegrationKind) -> Transition {
        let transition = self.controller.select_integration(kind);
        self.panel.sync(&self.controller);
        transition
    }

    pub fn on_auth_completed(&mut self, done: AuthCompleted) -> Transition {
        let transition = self.controller.auth_completed(done);
        self.panel.sync(&self.controller);
        transition
    }

    /// Start the active integration's credential flow.
    ///
    /// Returns `None` without a selection or while that integration's flow
    /// is still pending.
    pub fn begin_auth(&mut self) -> Option<IntegrationKind> {
        let kind = self.active_flow()?;
        self.pending_auth.insert(kind).then_some(kind)
    }

    pub fn is_auth_pending(&self, kind: IntegrationKind) -> bool {
        self.pending_auth.contains(&kind)
    }

    /// Settle a flow started with [`Self::begin_auth`].
    pub fn finish_auth(
        &mut self,
        kind: IntegrationKind,
        result: Result<AuthCompleted, AuthError>,
    ) -> Transition {
        self.pending_auth.remove(&kind);
        match result {
            Ok(done) => self.on_auth_completed(done),
            Err(e) => {
                let message = e.to_string();
                self.notice = Some(message.clone());
                Transition::Failed { message }
            }
        }
    }

    /// Start a load if the panel's load action is enabled.
    pub fn begin_load(&mut self) -> Option<LoadTicket> {
        if !self.panel.load_enabled {
            return None;
        }
        let ticket = self.controller.begin_load();
        self.panel.sync(&self.controller);
        ticket
    }

    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<Vec<NormalizedRecord>, LoadError>,
    ) -> Transition {
        let transition = self.controller.finish_load(ticket, result);
        if let Transition::Failed { message } = &transition {
            self.notice = Some(message.clone());
        }
        self.panel.sync(&self.controller);
        transition
    }

    /// Run a complete load inline.
    pub async fn load<L: RecordLoader>(&mut self, loader: &L) -> Transition {
        let Some(ticket) = self.begin_load() else {
            return Transition::Ignored;
        };
        let result = loader.load(ticket.kind(), ticket.credentials()).await;
        self.finish_load(ticket, result)
    }

    pub fn clear(&mut self) -> Transition {
        if !self.panel.clear_enabled {
            return Transition::Ignored;
        }
        let transition = self.controller.clear();
        self.panel.sync(&self.controller);
        transition
    }
}

impl Default for SessionView {
    fn default() -> Self {
        Self::new(Operator::default())
    }
}
