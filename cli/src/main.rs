use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod bootstrap;
mod client;
mod config;
mod util;

use client::RulesClient;
use config::{DesiredRuleArgs, RulesApiConfig};
use util::exit_error;

#[derive(Parser)]
#[command(
    name = "streamrule",
    version,
    about = "Make sure a filtered-stream rule exists on the remote filtering API"
)]
struct Cli {
    #[command(flatten)]
    api: RulesApiConfig,

    #[command(flatten)]
    desired: DesiredRuleArgs,

    /// Emit logs as JSON lines instead of plain text
    #[arg(long, env = "STREAMRULE_LOG_JSON")]
    log_json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the rule unless it already exists (default)
    Ensure(EnsureArgs),
    /// Print the rules currently configured remotely
    List,
}

#[derive(Args, Default)]
struct EnsureArgs {
    /// Let the remote validate the rule without storing it
    #[arg(long)]
    dry_run: bool,
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "streamrule=info".into());
    let registry = tracing_subscriber::registry().with(filter);

    // stderr keeps stdout clean for `list`
    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() {
    // Load .env if present
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let client = match RulesClient::from_config(&cli.api) {
        Ok(c) => c,
        Err(e) => exit_error(
            &e.to_string(),
            Some("Check TWITTER_SEARCH_URL, TWITTER_RULE_PATH and STREAMRULE_TIMEOUT_SECS"),
            e.exit_code(),
        ),
    };

    let command = cli
        .command
        .unwrap_or_else(|| Commands::Ensure(EnsureArgs::default()));

    let code = match command {
        Commands::Ensure(args) => ensure(&client, &cli.desired, args.dry_run).await,
        Commands::List => list(&client).await,
    };

    std::process::exit(code);
}

async fn ensure(client: &RulesClient, desired: &DesiredRuleArgs, dry_run: bool) -> i32 {
    match bootstrap::ensure_rule(client, &desired.to_new_rule(), dry_run).await {
        Ok(outcome) => outcome.exit_code(),
        Err(e) => exit_error(
            &e.to_string(),
            Some("Set --rule or STREAMRULE_RULE to a non-empty filter expression"),
            4,
        ),
    }
}

async fn list(client: &RulesClient) -> i32 {
    match client.list_rules().await {
        Ok(response) => match serde_json::to_value(&response) {
            Ok(body) => {
                println!("{}", util::to_pretty(&body));
                0
            }
            Err(e) => exit_error(&format!("Failed to encode rules: {e}"), None, 3),
        },
        Err(e) => {
            tracing::error!(error = %e, "Failed to fetch stream rules");
            e.exit_code()
        }
    }
}
