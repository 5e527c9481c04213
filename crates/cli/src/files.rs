//! `xcheck files` — remote file listing.

use clap::Subcommand;

use crosscheck_client::ApiClient;

use crate::CliError;

#[derive(Subcommand)]
pub enum FilesCommands {
    /// List uploaded files
    #[command(after_help = "\
Examples:
  xcheck files list
  xcheck files list --json")]
    List {
        /// Output JSON to stdout instead of a human summary
        #[arg(long)]
        json: bool,
    },
}

pub fn cmd_files(cmd: FilesCommands) -> Result<(), CliError> {
    match cmd {
        FilesCommands::List { json } => cmd_files_list(json),
    }
}

fn cmd_files_list(json: bool) -> Result<(), CliError> {
    let client = ApiClient::from_saved_auth().map_err(CliError::api)?;
    let files = client.list_files().map_err(CliError::api)?;

    if json {
        let out = serde_json::to_string_pretty(&files)
            .map_err(|e| CliError::io(format!("JSON serialization error: {e}")))?;
        println!("{out}");
        return Ok(());
    }

    if files.is_empty() {
        eprintln!("no files uploaded");
        return Ok(());
    }
    for file in &files {
        match &file.upload_time {
            Some(time) => println!("{}\t{}", file.file_name, time),
            None => println!("{}", file.file_name),
        }
    }
    Ok(())
}
