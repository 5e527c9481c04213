// Crosscheck CLI - drive the reconciliation wizard from the shell

mod account;
mod exit_codes;
mod files;
mod plan;
mod recon;

use std::process::ExitCode;

use clap::{Parser, Subcommand};

use crosscheck_client::ApiError;

use exit_codes::{
    EXIT_API_NETWORK, EXIT_API_NOT_AUTH, EXIT_API_PARSE, EXIT_API_VALIDATION, EXIT_ERROR,
    EXIT_SUCCESS,
};

#[derive(Parser)]
#[command(name = "xcheck")]
#[command(about = "Crosscheck spreadsheet reconciliation service client")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Store and verify API credentials
    Login {
        /// API token (falls back to CROSSCHECK_API_TOKEN, then a prompt)
        #[arg(long)]
        token: Option<String>,

        /// Service base URL
        #[arg(long, env = "CROSSCHECK_API_BASE", default_value = "https://api.crosscheck.dev")]
        api_base: String,

        /// Account email stored for display
        #[arg(long)]
        email: Option<String>,
    },

    /// Remove saved credentials
    Logout,

    /// Show the active session
    Whoami {
        /// Output JSON instead of a human summary
        #[arg(long)]
        json: bool,
    },

    /// Remote file operations
    #[command(subcommand)]
    Files(files::FilesCommands),

    /// Reconciliation wizard commands
    #[command(subcommand)]
    Recon(recon::ReconCommands),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Login { token, api_base, email } => account::cmd_login(token, api_base, email),
        Commands::Logout => account::cmd_logout(),
        Commands::Whoami { json } => account::cmd_whoami(json),
        Commands::Files(cmd) => files::cmd_files(cmd),
        Commands::Recon(cmd) => recon::cmd_recon(cmd),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    /// Create error from a service error with the proper exit code.
    pub fn api(err: ApiError) -> Self {
        let (code, hint) = match &err {
            ApiError::NotAuthenticated => {
                (EXIT_API_NOT_AUTH, Some("run `xcheck login` first".to_string()))
            }
            ApiError::Http(401, _) | ApiError::Http(403, _) => (
                EXIT_API_NOT_AUTH,
                Some("token rejected; run `xcheck login` with a fresh token".to_string()),
            ),
            ApiError::Validation(_) => (EXIT_API_VALIDATION, None),
            ApiError::Network(_) | ApiError::Http(_, _) => (EXIT_API_NETWORK, None),
            ApiError::Parse(_) => (EXIT_API_PARSE, None),
        };
        Self { code, message: err.to_string(), hint }
    }
}
