use anyhow::{Context, Result};
use dialoguer::{Input, Password};
use std::sync::Arc;

use crm_client::auth::{
    KeyValueStore, MemoryStore, SessionEndReason, SessionExpiredHandler, SessionStore, SqliteStore,
};
use crm_client::config::{Command, Config, StoreLocation};
use crm_client::models::Role;
use crm_client::ApiClient;

/// Tells the terminal user what happened to their session
struct CliSessionHandler;

impl SessionExpiredHandler for CliSessionHandler {
    fn on_session_end(&self, reason: SessionEndReason) {
        match reason {
            SessionEndReason::LoggedOut => println!("Logged out."),
            SessionEndReason::Expired => {
                eprintln!("Your session has expired. Please log in again with `crm-client login`.")
            }
            // The login error itself is reported to the user
            SessionEndReason::LoginIncomplete => {}
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let (config, command) = Config::load()?;

    // Initialize logging with a configured level
    let log_level = config.log_level.to_lowercase();
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let backend = open_store(&config.store)?;
    let session = SessionStore::new(backend);
    tracing::debug!(store = session.backend_name(), base_url = %config.client.base_url, "Session store ready");

    let client = ApiClient::new(session, Arc::new(CliSessionHandler), &config.client)?;

    run(&client, command).await
}

/// Open the configured session backend
fn open_store(location: &StoreLocation) -> Result<Arc<dyn KeyValueStore>> {
    match location {
        StoreLocation::Memory => Ok(Arc::new(MemoryStore::new())),
        StoreLocation::Sqlite(path) => {
            let store = SqliteStore::open(path)
                .with_context(|| format!("Failed to open session store {}", path.display()))?;
            Ok(Arc::new(store))
        }
    }
}

async fn run(client: &ApiClient, command: Command) -> Result<()> {
    match command {
        Command::Login { username, password } => {
            let username = match username {
                Some(u) => u,
                None => Input::new()
                    .with_prompt("Username")
                    .interact_text()
                    .context("Failed to read username")?,
            };
            let password = match password {
                Some(p) => p,
                None => Password::new()
                    .with_prompt("Password")
                    .interact()
                    .context("Failed to read password")?,
            };

            let profile = client.login(&username, &password).await?;
            println!("Logged in as {} ({})", profile.display_name(), profile.role);
        }

        Command::Logout => client.logout(),

        Command::Whoami => match client.session().profile() {
            Some(profile) => {
                println!("{} ({})", profile.display_name(), profile.role);
                println!("  username: {}", profile.username);
                if let Some(ref email) = profile.email {
                    println!("  email:    {}", email);
                }
                if let Some(chc) = profile.chc {
                    println!("  chc:      {}", chc);
                }
                if !client.session().credentials().can_refresh() {
                    println!("  session cannot be renewed; log in again when it expires");
                }
            }
            None => println!("Not logged in."),
        },

        Command::Machines { public, chc } => {
            let machines = client.list_machines(public, chc).await?;
            for m in &machines {
                println!(
                    "{:>5}  {:<28} {:<18} {:<14} {}",
                    m.id,
                    m.machine_name,
                    m.machine_type,
                    format!("{:?}", m.status),
                    if m.is_available() { "available" } else { "-" }
                );
            }
            println!("{} machine(s)", machines.len());
        }

        Command::Bookings => {
            let bookings = client.list_chc_bookings().await?;
            for b in &bookings {
                println!(
                    "{:>5}  {:<12} machine {:<5} {} .. {}  {:?}  {}",
                    b.id, b.booking_id, b.machine, b.start_date, b.end_date, b.status, b.farmer_name
                );
            }
            println!("{} booking(s)", bookings.len());
        }

        Command::BookingAction { id, action, notes } => {
            client.update_booking_status(id, action, &notes).await?;
            println!("Booking {} -> {:?}", id, action.target_status());
        }

        Command::Usage { machine } => {
            let records = match machine {
                Some(id) => client.machine_usage(id).await?,
                None => client.list_usage(&[]).await?,
            };
            for r in &records {
                println!(
                    "{:>5}  machine {:<5} {}  {}-{}  {}  {} h",
                    r.id,
                    r.machine,
                    r.usage_date,
                    r.start_time,
                    r.end_time,
                    r.farmer_name,
                    r.total_hours_used.as_deref().unwrap_or("-")
                );
            }
            println!("{} record(s)", records.len());
        }

        Command::Chcs { filters } => {
            let chcs = client.search_chcs(&filters).await?;
            for c in &chcs {
                println!(
                    "{:>5}  {:<30} {}, {}  machines: {}",
                    c.id, c.chc_name, c.district, c.state, c.total_machines
                );
            }
            println!("{} CHC(s)", chcs.len());
        }

        Command::Dashboard => {
            let data = match client.session().role() {
                Some(Role::GovtAdmin) => client.govt_dashboard().await?,
                Some(Role::ChcAdmin) => client.chc_dashboard().await?,
                Some(Role::Other(role)) => anyhow::bail!("No dashboard for role {}", role),
                None => anyhow::bail!("Not logged in; run `crm-client login` first"),
            };
            println!("{}", serde_json::to_string_pretty(&data)?);
        }
    }

    Ok(())
}
