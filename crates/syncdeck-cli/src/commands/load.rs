use clap::Args;
use syncdeck_core::error::Result;
use syncdeck_core::{
    BackendClient, Config, CredentialFlow, IntegrationKind, ProvidedCredentials, SessionView,
};

use crate::table;

#[derive(Args)]
pub struct LoadArgs {
    /// Integration to load from (notion, airtable, hubspot)
    #[arg(long)]
    kind: String,
    /// Credential bag as JSON, e.g. the output of `syncdeck auth`
    #[arg(long)]
    credentials: String,
    /// Backend base URL (overrides backend.base_url)
    #[arg(long)]
    base_url: Option<String>,
    /// Print records as JSON instead of a table
    #[arg(long)]
    json: bool,
}

pub async fn run(args: LoadArgs) -> Result<()> {
    let kind: IntegrationKind = args.kind.parse()?;
    let flow = ProvidedCredentials::from_json(&args.credentials)?;

    let mut config = Config::load_or_default();
    if let Some(base_url) = args.base_url {
        config.backend.base_url = base_url;
    }
    let backend = BackendClient::from_config(&config.backend)?;

    let mut view = SessionView::new(config.operator.to_operator());
    view.pick(kind);
    let done = flow.authorize(kind, view.operator()).await?;
    view.on_auth_completed(done);

    // Freshly authorized, so the load slot is free.
    if let Some(ticket) = view.begin_load() {
        let records = backend
            .load_records(ticket.kind(), ticket.credentials())
            .await?;
        view.finish_load(ticket, Ok(records));
    }

    let rows = view.panel().rows().unwrap_or_default();
    if args.json {
        println!("{}", serde_json::to_string_pretty(rows)?);
    } else {
        println!("{}", table::render_records(rows, &config.display.placeholder));
    }
    Ok(())
}
