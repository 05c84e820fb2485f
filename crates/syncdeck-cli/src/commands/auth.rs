use clap::Args;
use syncdeck_core::error::Result;
use syncdeck_core::{BackendClient, Config, CredentialFlow, IntegrationKind, OAuthFlow};

#[derive(Args)]
pub struct AuthArgs {
    /// Integration to authorize (notion, airtable, hubspot)
    kind: String,
    /// User id sent to the backend (overrides operator.user)
    #[arg(long)]
    user: Option<String>,
    /// Organization id sent to the backend (overrides operator.org)
    #[arg(long)]
    org: Option<String>,
    /// Do not open the browser; only print the authorization URL
    #[arg(long)]
    no_browser: bool,
}

pub async fn run(args: AuthArgs) -> Result<()> {
    let kind: IntegrationKind = args.kind.parse()?;
    let config = Config::load_or_default();

    let mut operator = config.operator.to_operator();
    if let Some(user) = args.user {
        operator.user = user;
    }
    if let Some(org) = args.org {
        operator.org = org;
    }

    let backend = BackendClient::from_config(&config.backend)?;
    let flow = OAuthFlow::new(backend, &config.auth)
        .with_browser(config.auth.open_browser && !args.no_browser)
        .on_authorization_url(|kind, url| eprintln!("Authorize {kind} at: {url}"));

    eprintln!("Waiting for {kind} authorization...");
    let done = flow.authorize(kind, &operator).await?;
    println!("{}", serde_json::to_string(done.credentials.as_value())?);
    Ok(())
}
