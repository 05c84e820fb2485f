pub mod backend;
pub mod credentials;
pub mod kind;
pub mod oauth;
pub mod traits;

pub use backend::BackendClient;
pub use credentials::{AuthCompleted, CredentialBag, ProvidedCredentials};
pub use kind::IntegrationKind;
pub use oauth::OAuthFlow;
pub use traits::{CredentialFlow, Operator, RecordLoader};
