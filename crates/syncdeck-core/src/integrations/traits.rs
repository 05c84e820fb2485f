use std::future::Future;

use serde::{Deserialize, Serialize};

use super::credentials::{AuthCompleted, CredentialBag};
use super::kind::IntegrationKind;
use crate::error::{AuthError, LoadError};
use crate::records::NormalizedRecord;

/// Who is operating the session. Credential flows scope their backend state
/// by this pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operator {
    pub user: String,
    pub org: String,
}

impl Operator {
    pub fn new(user: impl Into<String>, org: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            org: org.into(),
        }
    }
}

impl Default for Operator {
    fn default() -> Self {
        Self::new("TestUser", "TestOrg")
    }
}

/// Acquires credentials for one integration.
///
/// Implementations run until the operator has finished authenticating and
/// then return the completion message. They never touch session state.
pub trait CredentialFlow: Send + Sync {
    fn authorize(
        &self,
        kind: IntegrationKind,
        operator: &Operator,
    ) -> impl Future<Output = Result<AuthCompleted, AuthError>> + Send;
}

/// The remote load endpoint.
pub trait RecordLoader: Send + Sync {
    fn load(
        &self,
        kind: IntegrationKind,
        credentials: &CredentialBag,
    ) -> impl Future<Output = Result<Vec<NormalizedRecord>, LoadError>> + Send;
}
