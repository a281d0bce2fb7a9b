use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use savolalab::config::{load_config, print_schema};
use savolalab::guard::Rendered;
use savolalab::navigation::{HistoryNavigator, Navigator};
use savolalab::startup;
use savolalab::utils::logger::init_logging;
use serde_json::json;
use tracing::error;

#[derive(Parser, Debug)]
#[command(name = "savolalab", about = "SavolaLab QC session client")]
struct Cli {
    /// Path to the YAML configuration.
    #[arg(long, env = "SAVOLALAB_CONFIG", default_value = "./config.yaml")]
    config: PathBuf,

    /// Print the configuration JSON schema and exit.
    #[arg(long)]
    schema: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and persist the issued token.
    Login {
        employee_id: String,
        /// Read from stdin when omitted.
        #[arg(long, env = "SAVOLALAB_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Show the current session.
    Whoami,
    /// Clear the session.
    Logout,
    /// Run the route guard for a dashboard path.
    Open { path: String },
    /// Fetch the backend profile of the signed-in user.
    Me,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    if cli.schema {
        print_schema();
        return ExitCode::SUCCESS;
    }
    let Some(command) = cli.command else {
        eprintln!("No command given; see --help");
        return ExitCode::FAILURE;
    };

    let config = Arc::new(load_config(&cli.config));
    if let Err(e) = init_logging(&config.logging) {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }

    let navigator = Arc::new(HistoryNavigator::new());
    let app = match startup::build(config, navigator.clone()) {
        Ok(app) => app,
        Err(e) => {
            error!("Startup failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let code = match command {
        Command::Login {
            employee_id,
            password,
        } => {
            let password = match password.map_or_else(read_password, Ok) {
                Ok(p) => p,
                Err(e) => {
                    error!("Could not read password: {}", e);
                    return ExitCode::FAILURE;
                }
            };
            match app.api.login(&employee_id, &password).await {
                Ok(identity) => {
                    app.navigator.navigate(&app.config.navigation.home_path);
                    println!(
                        "Signed in as {} ({})",
                        identity.display_name(),
                        identity
                            .role
                            .as_ref()
                            .map_or_else(|| "no role".to_string(), |r| r.display_name())
                    );
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!("Login failed: {}", e);
                    ExitCode::FAILURE
                }
            }
        }
        Command::Whoami => {
            let state = app.store.state();
            let out = json!({
                "authenticated": state.is_authenticated(),
                "loading": state.loading,
                "user": state.user,
            });
            println!("{}", serde_json::to_string_pretty(&out).unwrap_or_default());
            ExitCode::SUCCESS
        }
        Command::Logout => {
            app.store.logout();
            println!("Signed out");
            ExitCode::SUCCESS
        }
        Command::Open { path } => {
            let guard = app.guard_for(&path);
            let decision = guard.react();
            match guard.render(|| path.clone()) {
                Rendered::Content(page) => println!("{:?}: rendering {}", decision, page),
                Rendered::Loading(message) => println!("{}", message),
                Rendered::Nothing => println!("{:?}", decision),
            }
            if decision.is_redirect() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Command::Me => match app.api.current_user().await {
            Ok(profile) => {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&profile).unwrap_or_default()
                );
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Request failed: {}", e);
                ExitCode::FAILURE
            }
        },
    };

    if let Some(location) = navigator.current() {
        println!("-> {}", location);
    }
    code
}

fn read_password() -> io::Result<String> {
    eprint!("Password: ");
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
