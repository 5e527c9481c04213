//! Session commands: login, logout, whoami.
//!
//! `xcheck login`   — verify and store an API token
//! `xcheck logout`  — delete the saved session
//! `xcheck whoami`  — show the active session

use std::io::{self, IsTerminal, Write};

use crosscheck_client::{delete_auth, load_auth, save_auth, ApiClient, SessionContext};

use crate::exit_codes::{EXIT_API_NOT_AUTH, EXIT_ERROR, EXIT_USAGE};
use crate::CliError;

pub fn cmd_login(
    token: Option<String>,
    api_base: String,
    email: Option<String>,
) -> Result<(), CliError> {
    // Resolve token: --token flag > CROSSCHECK_API_TOKEN env > interactive prompt
    let token = if let Some(t) = token {
        t
    } else if let Ok(t) = std::env::var("CROSSCHECK_API_TOKEN") {
        t
    } else if io::stdin().is_terminal() {
        eprint!("Crosscheck API token: ");
        io::stderr().flush().ok();
        let mut buf = String::new();
        io::stdin()
            .read_line(&mut buf)
            .map_err(|e| CliError { code: EXIT_ERROR, message: e.to_string(), hint: None })?;
        let trimmed = buf.trim().to_string();
        if trimmed.is_empty() {
            return Err(CliError {
                code: EXIT_USAGE,
                message: "No token provided".into(),
                hint: Some("pass --token or set CROSSCHECK_API_TOKEN".into()),
            });
        }
        trimmed
    } else {
        return Err(CliError {
            code: EXIT_USAGE,
            message: "No token provided and stdin is not a TTY".into(),
            hint: Some("pass --token or set CROSSCHECK_API_TOKEN".into()),
        });
    };

    // Verify the token works before saving it.
    let session = SessionContext { token, api_base, email };
    let client = ApiClient::new(session.clone());
    client.verify_session().map_err(CliError::api)?;

    save_auth(&session).map_err(|e| CliError { code: EXIT_ERROR, message: e, hint: None })?;

    match &session.email {
        Some(email) => eprintln!("Authenticated as {} ({})", email, session.api_base),
        None => eprintln!("Authenticated ({})", session.api_base),
    }
    Ok(())
}

pub fn cmd_logout() -> Result<(), CliError> {
    delete_auth().map_err(|e| CliError { code: EXIT_ERROR, message: e, hint: None })?;
    eprintln!("Logged out");
    Ok(())
}

pub fn cmd_whoami(json: bool) -> Result<(), CliError> {
    let session = load_auth().ok_or(CliError {
        code: EXIT_API_NOT_AUTH,
        message: "No saved session".into(),
        hint: Some("run `xcheck login` first".into()),
    })?;

    if json {
        let out = serde_json::json!({
            "api_base": session.api_base,
            "email": session.email,
        });
        println!("{}", out);
    } else {
        match &session.email {
            Some(email) => eprintln!("{} ({})", email, session.api_base),
            None => eprintln!("token session ({})", session.api_base),
        }
    }
    Ok(())
}
