//! `xcheck recon` — replay a reconciliation plan and submit it.

use std::path::PathBuf;

use clap::Subcommand;

use crosscheck_client::ApiClient;
use crosscheck_wizard::{assemble, FileMeta, Wizard};

use crate::exit_codes::EXIT_API_PARSE;
use crate::plan::{build_wizard, wizard_err, ReconPlan};
use crate::CliError;

#[derive(Subcommand)]
pub enum ReconCommands {
    /// Validate a plan against live file metadata without submitting
    #[command(after_help = "\
Examples:
  xcheck recon validate close.plan.toml")]
    Validate {
        /// Path to the plan file
        plan: PathBuf,
    },

    /// Replay a plan through the wizard and submit the job
    #[command(after_help = "\
Examples:
  xcheck recon submit close.plan.toml
  xcheck recon submit close.plan.toml --dry-run
  xcheck recon submit close.plan.toml --output-file recon_q3.xlsx --replace-existing
  xcheck recon submit close.plan.toml --json")]
    Submit {
        /// Path to the plan file
        plan: PathBuf,

        /// Print the assembled request instead of posting it
        #[arg(long)]
        dry_run: bool,

        /// Override the plan's output file name
        #[arg(long)]
        output_file: Option<String>,

        /// Override the plan's replace-existing flag
        #[arg(long)]
        replace_existing: bool,

        /// Output the service response as JSON on stdout
        #[arg(long)]
        json: bool,
    },
}

pub fn cmd_recon(cmd: ReconCommands) -> Result<(), CliError> {
    match cmd {
        ReconCommands::Validate { plan } => cmd_recon_validate(plan),
        ReconCommands::Submit { plan, dry_run, output_file, replace_existing, json } => {
            cmd_recon_submit(plan, dry_run, output_file, replace_existing, json)
        }
    }
}

fn load_plan(path: &PathBuf) -> Result<ReconPlan, CliError> {
    let input = std::fs::read_to_string(path)
        .map_err(|e| CliError::io(format!("cannot read plan: {e}")))?;
    ReconPlan::from_toml(&input)
}

/// Fetch both files' metadata and replay the plan through the wizard.
fn replay(plan: &ReconPlan) -> Result<Wizard, CliError> {
    let client = ApiClient::from_saved_auth().map_err(CliError::api)?;
    let (details1, details2) = client
        .get_details_pair(&plan.files[0].name, &plan.files[1].name)
        .map_err(CliError::api)?;

    let meta1 = FileMeta::from_details(&details1).map_err(|e| CliError {
        code: EXIT_API_PARSE,
        message: format!("{}: {e}", plan.files[0].name),
        hint: None,
    })?;
    let meta2 = FileMeta::from_details(&details2).map_err(|e| CliError {
        code: EXIT_API_PARSE,
        message: format!("{}: {e}", plan.files[1].name),
        hint: None,
    })?;

    let mut wizard = build_wizard(plan, meta1, meta2)?;
    for warning in wizard.take_warnings() {
        eprintln!("note: {warning}");
    }
    Ok(wizard)
}

fn cmd_recon_validate(path: PathBuf) -> Result<(), CliError> {
    let plan = load_plan(&path)?;
    let wizard = replay(&plan)?;

    eprintln!(
        "valid: plan '{}' — {} key pair(s), {} value pair(s), method {}",
        plan.name,
        wizard.keys().len(),
        wizard.values().len(),
        wizard.settings().method,
    );
    Ok(())
}

fn cmd_recon_submit(
    path: PathBuf,
    dry_run: bool,
    output_file: Option<String>,
    replace_existing: bool,
    json: bool,
) -> Result<(), CliError> {
    let plan = load_plan(&path)?;
    let mut wizard = replay(&plan)?;

    if output_file.is_some() {
        wizard.set_output_file(output_file);
    }
    if replace_existing {
        wizard.set_replace_existing(true);
    }

    let request = assemble(&wizard).map_err(wizard_err)?;

    if dry_run {
        let out = serde_json::to_string_pretty(&request)
            .map_err(|e| CliError::io(format!("JSON serialization error: {e}")))?;
        println!("{out}");
        return Ok(());
    }

    let client = ApiClient::from_saved_auth().map_err(CliError::api)?;
    let response = client.submit_reconciliation(&request).map_err(CliError::api)?;

    if json {
        let out = serde_json::to_string_pretty(&response)
            .map_err(|e| CliError::io(format!("JSON serialization error: {e}")))?;
        println!("{out}");
        return Ok(());
    }

    eprintln!(
        "submitted: plan '{}' as '{}'",
        plan.name,
        request.output_file,
    );
    if let Some(message) = &response.message {
        eprintln!("{message}");
    }
    if let Some(url) = &response.download_url {
        println!("{url}");
    }
    Ok(())
}
