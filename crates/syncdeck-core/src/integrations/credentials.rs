use serde::{Deserialize, Serialize};

use super::kind::IntegrationKind;
use super::traits::{CredentialFlow, Operator};
use crate::error::AuthError;

/// Integration-specific proof of authorization.
///
/// The shape belongs to the backend integration that issued it; nothing in
/// this crate looks inside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CredentialBag(serde_json::Value);

impl CredentialBag {
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    /// Parse a bag from raw JSON text, e.g. pasted by the operator.
    pub fn from_json(text: &str) -> Result<Self, AuthError> {
        serde_json::from_str(text)
            .map(Self)
            .map_err(|e| AuthError::InvalidCredentials(e.to_string()))
    }

    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }

    /// Serialized form sent in the `credentials` form field.
    pub fn to_form_value(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.0)
    }
}

/// Message a credential flow produces once the operator finished
/// authenticating. This is the only way credentials reach a session.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthCompleted {
    pub kind: IntegrationKind,
    pub credentials: CredentialBag,
}

/// Credential flow for a bag the operator already holds.
#[derive(Debug, Clone)]
pub struct ProvidedCredentials {
    bag: CredentialBag,
}

impl ProvidedCredentials {
    pub fn new(bag: CredentialBag) -> Self {
        Self { bag }
    }

    pub fn from_json(text: &str) -> Result<Self, AuthError> {
        CredentialBag::from_json(text).map(Self::new)
    }
}

impl CredentialFlow for ProvidedCredentials {
    async fn authorize(
        &self,
        kind: IntegrationKind,
        _operator: &Operator,
    ) -> Result<AuthCompleted, AuthError> {
        Ok(AuthCompleted {
            kind,
            credentials: self.bag.clone(),
        })
    }
}
