//! # SyncDeck Core Library
//!
//! This library provides the core logic for SyncDeck: pick a third-party
//! data source (Notion, Airtable, HubSpot), authorize against it, load its
//! records once through the integrations backend, and look at them as a table.
//! The CLI binary is a thin layer over the same library.
//!
//! ## Architecture
//!
//! - **Session Controller**: state machine tracking the active integration,
//!   its credentials and loaded records, with a single previous-snapshot slot
//! - **Session View**: operator identity plus the data panel bound to the
//!   controller
//! - **Integrations**: credential flows and the backend HTTP client
//! - **Storage**: TOML-based configuration
//!
//! ## Key Components
//!
//! - [`SessionController`]: Core session state machine
//! - [`SessionView`]: View model driving the controller
//! - [`BackendClient`]: Remote load and authorization endpoints
//! - [`CredentialFlow`]: Trait for per-integration credential acquisition
//! - [`Config`]: Application configuration management

pub mod error;
pub mod integrations;
pub mod records;
pub mod session;
pub mod storage;
pub mod view;

pub use error::{AuthError, ConfigError, CoreError, LoadError};
pub use integrations::{
    AuthCompleted, BackendClient, CredentialBag, CredentialFlow, IntegrationKind, OAuthFlow,
    Operator, ProvidedCredentials, RecordLoader,
};
pub use records::NormalizedRecord;
pub use session::{SessionController, SessionEvent, SessionState, Transition};
pub use storage::Config;
pub use view::{DataPanel, SessionView};
