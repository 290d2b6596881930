//! Command handlers: the views of the terminal front-end.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use taskpulse_core::api::{ApiClient, ApiError, HttpTransport, RequestPipeline};
use taskpulse_core::auth::SessionStore;
use taskpulse_core::config::Config;
use taskpulse_core::models::{BoardInput, CardMove, NewCard, NewList, NewMonitor};
use taskpulse_core::navigation::{self, Route};
use tracing::warn;

use crate::cli::{BoardsCommand, CardsCommand, Command, ListsCommand, LoginArgs, MonitorsCommand};
use crate::navigator::{TerminalNavigator, LOGIN_HINT};
use crate::render;

/// How a command ended, mapped to the process exit code by `main`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Done,
    /// The command needs a session the user does not have (anymore)
    LoginRequired,
    /// Shown to the user already, nothing more to report
    Failed,
}

pub struct App {
    pub client: ApiClient,
    pub config: Config,
    pub navigator: Arc<TerminalNavigator>,
}

impl App {
    /// Wire the session store, transport and a terminal navigator into a client
    pub fn new(config: Config, transport: Arc<dyn HttpTransport>, session: SessionStore) -> Self {
        let navigator = Arc::new(TerminalNavigator::new());
        let pipeline =
            RequestPipeline::new(&config.server_url, transport, session, navigator.clone());
        Self {
            client: ApiClient::new(pipeline),
            config,
            navigator,
        }
    }

    pub async fn run(&mut self, command: Command) -> Result<Outcome> {
        if let Some(route) = command.route() {
            if navigation::guard(route, self.client.session()) == Route::Login
                && route != Route::Login
            {
                println!("{}", LOGIN_HINT);
                return Ok(Outcome::LoginRequired);
            }
        }

        let result = match command {
            Command::Login(args) => return self.login(args).await,
            Command::Register(args) => return self.register(args).await,
            Command::Logout => self.logout(),
            Command::Whoami => {
                self.whoami();
                Ok(())
            }
            Command::Boards(cmd) => self.boards(cmd).await,
            Command::Lists(cmd) => self.lists(cmd).await,
            Command::Cards(cmd) => self.cards(cmd).await,
            Command::Monitors(cmd) => self.monitors(cmd).await,
            Command::Dashboard => self.dashboard().await,
            Command::Status => self.status().await,
        };

        match result {
            Ok(()) => Ok(Outcome::Done),
            // An expired session lands on the login hint, not an error dump
            Err(_) if self.navigator.login_requested() => {
                println!("{}", LOGIN_HINT);
                Ok(Outcome::LoginRequired)
            }
            Err(e) => Err(e.into()),
        }
    }

    // ===== Session =====

    async fn login(&mut self, args: LoginArgs) -> Result<Outcome> {
        let email = self.prompt_email(args.email)?;
        let password = read_password(args.password_stdin)?;
        self.submit_login(&email, &password).await
    }

    /// Inline message for rejected credentials; anything else is an error
    async fn submit_login(&mut self, email: &str, password: &str) -> Result<Outcome> {
        match self.client.login(email, password).await {
            Ok(session) => {
                println!("Logged in as {}", session.user.email);
                self.remember_email(email);
                Ok(Outcome::Done)
            }
            Err(e @ ApiError::Network(_)) => Err(e).context("Could not reach the server"),
            Err(e) if e.status().is_some() => {
                println!("{}", e.login_message());
                Ok(Outcome::Failed)
            }
            Err(e) => Err(e).context("Login failed"),
        }
    }

    async fn register(&mut self, args: LoginArgs) -> Result<Outcome> {
        let email = self.prompt_email(args.email)?;
        let password = read_password(args.password_stdin)?;

        match self.client.register(&email, &password).await {
            Ok(_) => {
                println!("Account created for {}. Run `taskpulse login` to sign in.", email);
                self.remember_email(&email);
                Ok(Outcome::Done)
            }
            Err(e @ ApiError::Network(_)) => Err(e).context("Could not reach the server"),
            Err(e) if e.status().is_some() => {
                println!("{}", e.detail().unwrap_or_else(|| "Registration failed".to_string()));
                Ok(Outcome::Failed)
            }
            Err(e) => Err(e).context("Registration failed"),
        }
    }

    fn logout(&self) -> Result<(), ApiError> {
        self.client
            .logout()
            .map_err(|e| ApiError::Session(format!("{:#}", e)))?;
        println!("Logged out.");
        Ok(())
    }

    fn whoami(&self) {
        match self.client.session().snapshot() {
            Some(data) => println!("{}", render::session(&data)),
            None => println!("Not logged in."),
        }
    }

    fn prompt_email(&self, email: Option<String>) -> Result<String> {
        if let Some(email) = email {
            return Ok(email);
        }
        let default = self.config.last_email.clone();
        match default {
            Some(ref last) => print!("Email [{}]: ", last),
            None => print!("Email: "),
        }
        io::stdout().flush()?;

        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        let entered = line.trim();
        match (entered.is_empty(), default) {
            (false, _) => Ok(entered.to_string()),
            (true, Some(last)) => Ok(last),
            (true, None) => Err(anyhow::anyhow!("An email address is required")),
        }
    }

    fn remember_email(&mut self, email: &str) {
        if self.config.last_email.as_deref() == Some(email) {
            return;
        }
        self.config.last_email = Some(email.to_string());
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }
    }

    // ===== Task boards =====

    async fn boards(&self, cmd: BoardsCommand) -> Result<(), ApiError> {
        match cmd {
            BoardsCommand::List => {
                let boards = self.client.list_boards().await?;
                print!("{}", render::board_list(&boards));
            }
            BoardsCommand::Show { id } => {
                let board = self.client.get_board(&id).await?;
                print!("{}", render::board_detail(&board));
            }
            BoardsCommand::Create { name, description } => {
                let board = self
                    .client
                    .create_board(&BoardInput { name, description })
                    .await?;
                println!("Created board {} ({})", board.name, board.id);
            }
            BoardsCommand::Update {
                id,
                name,
                description,
            } => {
                let board = self
                    .client
                    .update_board(&id, &BoardInput { name, description })
                    .await?;
                println!("Updated board {} ({})", board.name, board.id);
            }
            BoardsCommand::Delete { id } => {
                self.client.delete_board(&id).await?;
                println!("Deleted board {}", id);
            }
        }
        Ok(())
    }

    async fn lists(&self, cmd: ListsCommand) -> Result<(), ApiError> {
        match cmd {
            ListsCommand::Create {
                board_id,
                name,
                position,
            } => {
                let list = self
                    .client
                    .create_list(&board_id, &NewList { name, position })
                    .await?;
                println!("Created list {} ({})", list.name, list.id);
            }
        }
        Ok(())
    }

    async fn cards(&self, cmd: CardsCommand) -> Result<(), ApiError> {
        match cmd {
            CardsCommand::Create {
                list_id,
                title,
                description,
            } => {
                let card = self
                    .client
                    .create_card(&list_id, &NewCard { title, description })
                    .await?;
                println!("Created card {} ({})", card.title, card.id);
            }
            CardsCommand::Move {
                card_id,
                list_id,
                position,
            } => {
                let card = self
                    .client
                    .move_card(&card_id, &CardMove { list_id, position })
                    .await?;
                println!(
                    "Moved card {} to list {} at position {}",
                    card.id, card.list_id, card.position
                );
            }
        }
        Ok(())
    }

    // ===== Monitoring =====

    async fn monitors(&self, cmd: MonitorsCommand) -> Result<(), ApiError> {
        match cmd {
            MonitorsCommand::List => {
                let monitors = self.client.list_monitors().await?;
                print!("{}", render::monitor_list(&monitors));
            }
            MonitorsCommand::Show { id } => {
                let monitor = self.client.get_monitor(&id).await?;
                print!("{}", render::monitor_detail(&monitor));
            }
            MonitorsCommand::Create { name, url, interval } => {
                let monitor = self
                    .client
                    .create_monitor(&NewMonitor {
                        name,
                        url,
                        interval,
                    })
                    .await?;
                println!("Created monitor {} ({})", monitor.name, monitor.id);
            }
            MonitorsCommand::Uptime { id, hours } => {
                let uptime = self.client.monitor_uptime(&id, hours).await?;
                print!("{}", render::uptime(&uptime, hours));
            }
            MonitorsCommand::Check { id } => {
                let triggered = self.client.trigger_check(&id).await?;
                match triggered.check_id {
                    Some(check_id) => println!("Check {} ({})", triggered.status, check_id),
                    None => println!("Check {}", triggered.status),
                }
            }
        }
        Ok(())
    }

    async fn dashboard(&self) -> Result<(), ApiError> {
        let (metrics, monitors) = futures::future::try_join(
            self.client.dashboard_metrics(),
            self.client.list_monitors(),
        )
        .await?;
        print!("{}", render::dashboard(&metrics, &monitors));
        Ok(())
    }

    async fn status(&self) -> Result<(), ApiError> {
        let page = self.client.status_page().await?;
        print!("{}", render::status_page(&page));
        Ok(())
    }
}

fn read_password(from_stdin: bool) -> Result<String> {
    let password = if from_stdin {
        let mut line = String::new();
        io::stdin()
            .lock()
            .read_line(&mut line)
            .context("Failed to read password from stdin")?;
        line.trim_end_matches(['\r', '\n']).to_string()
    } else {
        rpassword::prompt_password("Password: ").context("Failed to read password")?
    };

    if password.is_empty() {
        return Err(anyhow::anyhow!("A password is required"));
    }
    Ok(password)
}

// ============================================================================
// Tests
// ============================================================================
