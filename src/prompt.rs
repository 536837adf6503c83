use anyhow::{Context, Result};
use std::io::{BufRead, Write};

/// Supplies credentials that were not configured.
pub trait CredentialPrompt {
    fn username(&mut self) -> Result<String>;
    fn password(&mut self) -> Result<String>;
}

/// Asks on the controlling terminal. The password is read without echo.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompt;

impl CredentialPrompt for TerminalPrompt {
    fn username(&mut self) -> Result<String> {
        let mut out = std::io::stdout();
        write!(out, "Aquarius username: ")?;
        out.flush()?;

        let mut line = String::new();
        std::io::stdin()
            .lock()
            .read_line(&mut line)
            .context("failed to read username")?;
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    fn password(&mut self) -> Result<String> {
        rpassword::prompt_password("Aquarius password: ").context("failed to read password")
    }
}

/// Fixed answers, for callers that already hold credentials elsewhere (and for tests).
#[derive(Debug, Clone)]
pub struct StaticPrompt {
    pub username: String,
    pub password: String,
}

impl CredentialPrompt for StaticPrompt {
    fn username(&mut self) -> Result<String> {
        Ok(self.username.clone())
    }

    fn password(&mut self) -> Result<String> {
        Ok(self.password.clone())
    }
}

/// Fills in whichever of `username`/`password` is missing, asking in that order.
pub fn resolve_credentials(
    username: Option<String>,
    password: Option<String>,
    prompt: &mut dyn CredentialPrompt,
) -> Result<(String, String)> {
    let username = match username {
        Some(u) => u,
        None => prompt.username()?,
    };
    let password = match password {
        Some(p) => p,
        None => prompt.password()?,
    };
    Ok((username, password))
}
