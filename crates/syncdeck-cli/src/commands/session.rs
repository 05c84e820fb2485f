//! Interactive session.
//!
//! Operator input and background completions (loads, authorizations) are
//! multiplexed with `tokio::select!`. Background tasks only report back over
//! the channel; every state change happens here, on the loop, through the
//! session view.

use std::io::Write;

use syncdeck_core::error::Result;
use syncdeck_core::session::LoadTicket;
use syncdeck_core::{
    AuthCompleted, AuthError, BackendClient, Config, CredentialFlow, IntegrationKind, LoadError,
    NormalizedRecord, OAuthFlow, ProvidedCredentials, SessionView, Transition,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::debug;

use crate::table;

const HELP: &str = "\
commands:
  select <kind>        pick an integration (notion, airtable, hubspot)
  auth                 authorize the selected integration in the browser
  credentials <json>   use a credential bag you already have
  load                 load records for the selected integration
  clear                clear the displayed records
  show                 show the displayed records
  status               show the session state
  user <name>          set the user id
  org <name>           set the organization id
  help                 show this help
  quit                 leave the session";

/// Results reported by background tasks.
enum Completion {
    Loaded {
        ticket: LoadTicket,
        result: Result<Vec<NormalizedRecord>, LoadError>,
    },
    Authorized {
        kind: IntegrationKind,
        result: Result<AuthCompleted, AuthError>,
    },
}

enum Flow {
    Continue,
    Quit,
}

struct Shell {
    view: SessionView,
    backend: BackendClient,
    oauth: OAuthFlow,
    placeholder: String,
    tx: mpsc::UnboundedSender<Completion>,
}

pub async fn run() -> Result<()> {
    let config = Config::load_or_default();
    let backend = BackendClient::from_config(&config.backend)?;
    let oauth = OAuthFlow::new(backend.clone(), &config.auth)
        .on_authorization_url(|kind, url| println!("\nAuthorize {kind} at: {url}"));

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut shell = Shell {
        view: SessionView::new(config.operator.to_operator()),
        backend,
        oauth,
        placeholder: config.display.placeholder.clone(),
        tx,
    };

    println!("{HELP}");
    prompt();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if let Flow::Quit = shell.handle_line(&line).await {
                    break;
                }
                prompt();
            }
            Some(completion) = rx.recv() => {
                shell.handle_completion(completion);
                prompt();
            }
        }
    }
    Ok(())
}

fn prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}

impl Shell {
    async fn handle_line(&mut self, line: &str) -> Flow {
        let line = line.trim();
        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        match command {
            "" => {}
            "select" => self.select(rest),
            "auth" => self.start_auth(),
            "credentials" => self.provide_credentials(rest).await,
            "load" => self.start_load(),
            "clear" => {
                if self.view.clear().is_applied() {
                    println!("cleared");
                } else {
                    println!("nothing to clear");
                }
            }
            "show" => self.show(),
            "status" => self.status(),
            "user" if !rest.is_empty() => {
                self.view.set_user(rest);
                println!("user set to {rest}");
            }
            "org" if !rest.is_empty() => {
                self.view.set_org(rest);
                println!("organization set to {rest}");
            }
            "help" => println!("{HELP}"),
            "quit" | "exit" => return Flow::Quit,
            other => println!("unknown command '{other}' (try `help`)"),
        }
        Flow::Continue
    }

    fn select(&mut self, name: &str) {
        let kind = match name.parse::<IntegrationKind>() {
            Ok(kind) => kind,
            Err(e) => {
                println!("{e}");
                return;
            }
        };
        match self.view.pick(kind) {
            Transition::Ignored => println!("{kind} is already selected"),
            _ => {
                println!("selected {kind}; run `auth` or `credentials <json>`");
                if let Some(source) = self.view.panel().source() {
                    println!("still showing {source} data until {kind} is loaded");
                }
            }
        }
    }

    fn start_auth(&mut self) {
        let Some(kind) = self.view.begin_auth() else {
            match self.view.active_flow() {
                Some(kind) => println!("{kind} authorization is already in progress"),
                None => println!("select an integration first"),
            }
            return;
        };
        let flow = self.oauth.clone();
        let operator = self.view.operator().clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = flow.authorize(kind, &operator).await;
            let _ = tx.send(Completion::Authorized { kind, result });
        });
        println!("authorizing {kind}...");
    }

    async fn provide_credentials(&mut self, json: &str) {
        let Some(kind) = self.view.active_flow() else {
            println!("select an integration first");
            return;
        };
        let flow = match ProvidedCredentials::from_json(json) {
            Ok(flow) => flow,
            Err(e) => {
                println!("{e}");
                return;
            }
        };
        match flow.authorize(kind, self.view.operator()).await {
            Ok(done) => self.adopt(done),
            Err(e) => println!("{e}"),
        }
    }

    fn start_load(&mut self) {
        let Some(ticket) = self.view.begin_load() else {
            if self.view.panel().is_loading() {
                println!("a load is already running");
            } else {
                println!("authorize the selected integration before loading");
            }
            return;
        };
        let backend = self.backend.clone();
        let tx = self.tx.clone();
        println!("loading {}...", ticket.kind());
        tokio::spawn(async move {
            let result = backend
                .load_records(ticket.kind(), ticket.credentials())
                .await;
            let _ = tx.send(Completion::Loaded { ticket, result });
        });
    }

    fn handle_completion(&mut self, completion: Completion) {
        println!();
        match completion {
            Completion::Loaded { ticket, result } => {
                let kind = ticket.kind();
                let transition = self.view.finish_load(ticket, result);
                debug!(integration = %kind, ?transition, "load settled");
                match transition {
                    Transition::Applied { .. } => self.show(),
                    Transition::Stale => println!("discarded a late {kind} response"),
                    _ => {
                        if let Some(notice) = self.view.take_notice() {
                            println!("error: {notice}");
                        }
                    }
                }
            }
            Completion::Authorized { kind, result } => {
                match self.view.finish_auth(kind, result) {
                    Transition::Applied { .. } => println!("{kind} authorized; run `load`"),
                    Transition::Failed { .. } => {
                        if let Some(notice) = self.view.take_notice() {
                            println!("{kind} authorization failed: {notice}");
                        }
                    }
                    _ => println!("ignored {kind} credentials: {kind} is no longer selected"),
                }
            }
        }
    }

    fn adopt(&mut self, done: AuthCompleted) {
        let kind = done.kind;
        if self.view.on_auth_completed(done).is_applied() {
            println!("{kind} authorized; run `load`");
        } else {
            println!("ignored {kind} credentials: {kind} is no longer selected");
        }
    }

    fn show(&self) {
        if !self.view.panel().is_visible() {
            println!("nothing to show; select and authorize an integration first");
            return;
        }
        match table::render_panel(self.view.panel(), &self.placeholder) {
            Some(rendered) => println!("{rendered}"),
            None => println!("no data"),
        }
    }

    fn status(&self) {
        let controller = self.view.controller();
        let name = |kind: Option<IntegrationKind>| {
            kind.map_or_else(|| "none".to_string(), |k| k.to_string())
        };
        let panel = self.view.panel();
        println!("state:        {:?}", controller.state());
        println!("integration:  {}", name(controller.kind()));
        println!("previous:     {}", name(controller.previous_type()));
        println!("authorized:   {}", controller.credentials().is_some());
        println!("user / org:   {} / {}", self.view.operator().user, self.view.operator().org);
        println!("backend:      {}", self.backend.base_url());
        println!(
            "actions:      load {}, clear {}{}",
            if panel.load_enabled() { "on" } else { "off" },
            if panel.clear_enabled() { "on" } else { "off" },
            if panel.is_loading() { " (loading)" } else { "" },
        );
    }
}
