use anyhow::{bail, Result};
use colored::Colorize;
use shipquote::auth::hash_password;
use std::io::{self, BufRead, IsTerminal};

/// Execute the hash-password command
///
/// Prints the hash alone on stdout so it can be piped into a config file.
pub fn execute(password: Option<String>) -> Result<()> {
    let password = match password {
        Some(password) => password,
        None => read_password()?,
    };

    if password.is_empty() {
        bail!("Password cannot be empty");
    }

    let hash = hash_password(&password)?;
    println!("{}", hash);

    if io::stdout().is_terminal() {
        eprintln!();
        eprintln!("{}", "Add it to your configuration:".dimmed());
        eprintln!("{}", format!("  [admin]\n  password_hash = \"{}\"", hash).dimmed());
    }

    Ok(())
}

fn read_password() -> Result<String> {
    if io::stdin().is_terminal() {
        eprint!("Password: ");
    }

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
