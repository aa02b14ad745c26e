//! Config subcommand handlers.

use std::fmt::Write as _;
use std::io::{BufRead, IsTerminal};

use dialoguer::Select;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

/// Effective config as TOML, with the plaintext token masked.
fn format_config_redacted(cfg: &Config) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);
    let _ = writeln!(out, "days = {}", cfg.defaults.days);
    let _ = writeln!(out, "max_concurrent = {}", cfg.defaults.max_concurrent);
    let _ = writeln!(out, "cap = {}", cfg.defaults.cap);

    let _ = writeln!(out);
    let _ = writeln!(out, "[eonet]");
    let _ = writeln!(out, "base_url = \"{}\"", cfg.eonet.base_url);

    let _ = writeln!(out);
    let _ = writeln!(out, "[github]");
    let _ = writeln!(out, "base_url = \"{}\"", cfg.github.base_url);
    let _ = writeln!(out, "repo = \"{}\"", cfg.github.repo);
    if cfg.github.token.is_some() {
        let _ = writeln!(out, "token = \"****\"");
    }
    if let Some(ref env) = cfg.github.token_env {
        let _ = writeln!(out, "token_env = \"{env}\"");
    }

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "# cache_dir = \"{}\"",
        feedline_config::cache_dir(cfg).display()
    );

    out
}

fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn read_token(from_stdin: bool) -> Result<String, CliError> {
    let token = if from_stdin {
        let mut line = String::new();
        std::io::stdin().lock().read_line(&mut line)?;
        line
    } else {
        rpassword::prompt_password("GitHub token: ").map_err(prompt_err)?
    };

    let token = token.trim().to_owned();
    if token.is_empty() {
        return Err(CliError::Validation {
            field: "token".into(),
            reason: "token cannot be empty".into(),
        });
    }
    Ok(token)
}

/// Keyring unless `--plaintext`; asks when attached to a terminal.
fn choose_plaintext(plaintext: bool, from_stdin: bool) -> Result<bool, CliError> {
    if plaintext || from_stdin || !std::io::stdin().is_terminal() {
        return Ok(plaintext);
    }
    let choices = &[
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let selection = Select::new()
        .with_prompt("Where to store the token?")
        .items(choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;
    Ok(selection == 1)
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Show => {
            let cfg = config::load_with_overrides(global)?;
            let token_source = match config::resolve_token(&cfg.github) {
                Some(_) => "configured",
                None => "none (anonymous)",
            };
            output::print_output(&format_config_redacted(&cfg), global.quiet);
            output::print_output(&format!("# token: {token_source}"), global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Init => {
            let path = config::config_path();
            if path.exists() {
                return Err(CliError::Validation {
                    field: "config".into(),
                    reason: format!("{} already exists", path.display()),
                });
            }
            let written = config::save_config(&Config::default())?;
            if !global.quiet {
                eprintln!("Wrote {}", written.display());
            }
            Ok(())
        }

        ConfigCommand::SetToken { stdin, plaintext } => {
            let token = read_token(stdin)?;
            if choose_plaintext(plaintext, stdin)? {
                let mut cfg = config::load_config()?;
                cfg.github.token = Some(token);
                let path = config::save_config(&cfg)?;
                if !global.quiet {
                    eprintln!("Token saved to {} (plaintext)", path.display());
                }
            } else {
                config::store_token(&token)?;
                if !global.quiet {
                    eprintln!("Token stored in system keyring");
                }
            }
            Ok(())
        }
    }
}
