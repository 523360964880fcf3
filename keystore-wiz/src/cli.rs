//! Command line interface.
//!
//! Without a subcommand the interactive UI is started. The other commands
//! work on a keystore file directly and are meant for scripts.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;

use crate::cert::Validity;
use crate::config::WizConfig;
use crate::manager::{KeystoreEntry, KeystoreManager};
use crate::ui;
use crate::ui::dialogs::details_text;

/// Command line arguments.
#[derive(Parser, Debug)]
#[command(name = "keystore-wiz", version, about = "Inspect and edit Java keystores")]
pub struct Cli {
    /// Configuration file (default: ./.keystore-wiz.toml).
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<SubCommands>,
}

/// Keystore password, taken from the flag or the environment.
#[derive(Args, Debug, Clone, Default)]
pub struct PasswordArg {
    /// Keystore password.
    #[arg(short, long, env = "KEYSTORE_WIZ_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

impl PasswordArg {
    /// Returns the password or an error explaining how to pass one.
    pub fn require(&self) -> Result<&str> {
        match self.password.as_deref() {
            Some(p) if !p.is_empty() => Ok(p),
            _ => bail!("Keystore password required (use --password or KEYSTORE_WIZ_PASSWORD)"),
        }
    }
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum SubCommands {
    /// Open the interactive UI (default).
    Ui {
        /// Keystore to pre-fill in the load form.
        keystore: Option<PathBuf>,
    },
    /// List keystore entries.
    List {
        /// Keystore file.
        keystore: PathBuf,
        #[command(flatten)]
        password: PasswordArg,
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Show details of one entry.
    Show {
        /// Keystore file.
        keystore: PathBuf,
        /// Entry alias.
        alias: String,
        #[command(flatten)]
        password: PasswordArg,
        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Delete an entry.
    Delete {
        /// Keystore file.
        keystore: PathBuf,
        /// Entry alias.
        alias: String,
        #[command(flatten)]
        password: PasswordArg,
        /// Write the result here instead of in place.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Import a trusted certificate (DER or PEM).
    ///
    /// A keystore that does not exist yet is created.
    Import {
        /// Keystore file.
        keystore: PathBuf,
        /// Alias for the new entry.
        alias: String,
        /// Certificate file (.cer, .crt, .pem).
        cert: PathBuf,
        #[command(flatten)]
        password: PasswordArg,
        /// Write the result here instead of in place.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Write the keystore to a new file, optionally under a new password.
    Export {
        /// Keystore file.
        keystore: PathBuf,
        /// Output file.
        output: PathBuf,
        #[command(flatten)]
        password: PasswordArg,
        /// Password protecting the exported file (default: same as input).
        #[arg(long)]
        new_password: Option<String>,
    },
}

/// Initialises logging for non-interactive commands.
///
/// The UI installs its own logger so output does not corrupt the screen.
pub fn init_cli_logger() {
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("keystore_wiz=info,jks=warn"),
    )
    .try_init();
}

/// Runs the parsed command line.
pub fn run(cli: Cli) -> Result<()> {
    let command = cli.command.unwrap_or(SubCommands::Ui { keystore: None });
    if !matches!(command, SubCommands::Ui { .. }) {
        init_cli_logger();
    }
    let config = WizConfig::load(cli.config.as_deref())?;

    match command {
        SubCommands::Ui { keystore } => {
            let manager = ui::run(KeystoreManager::new(), config, keystore)?;
            if manager.is_dirty() {
                println!("{}", "Unsaved keystore changes were discarded.".yellow());
            }
        }
        SubCommands::List {
            keystore,
            password,
            json,
        } => {
            let manager = open(&keystore, password.require()?)?;
            let entries = manager.entries()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                print_entries(&keystore, &entries);
            }
        }
        SubCommands::Show {
            keystore,
            alias,
            password,
            json,
        } => {
            let manager = open(&keystore, password.require()?)?;
            let details = manager.details(&alias)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&details)?);
            } else {
                println!("{}", details_text(&details));
            }
        }
        SubCommands::Delete {
            keystore,
            alias,
            password,
            output,
        } => {
            let password = password.require()?;
            let mut manager = open(&keystore, password)?;
            manager.delete_entry(&alias)?;
            let out = output.unwrap_or(keystore);
            manager.store(&out, password)?;
            println!("{} `{alias}` from {}", "Deleted".green().bold(), out.display());
        }
        SubCommands::Import {
            keystore,
            alias,
            cert,
            password,
            output,
        } => {
            let password = password.require()?;
            let mut manager = KeystoreManager::new();
            if keystore.exists() {
                manager.load(&keystore, password)?;
            } else {
                manager.create(&keystore);
            }
            let added = manager.add_certificate_file(&alias, &cert)?;
            let out = output.unwrap_or(keystore);
            manager.store(&out, password)?;
            println!(
                "{} `{}` ({}) into {}",
                "Imported".green().bold(),
                added.alias,
                added.subject,
                out.display()
            );
        }
        SubCommands::Export {
            keystore,
            output,
            password,
            new_password,
        } => {
            let password = password.require()?;
            let mut manager = open(&keystore, password)?;
            let target_password = new_password.as_deref().unwrap_or(password);
            manager.store(&output, target_password)?;
            println!(
                "{}",
                format!("Keystore exported successfully to {}", output.display()).green()
            );
        }
    }
    Ok(())
}

fn open(path: &Path, password: &str) -> Result<KeystoreManager> {
    let mut manager = KeystoreManager::new();
    manager.load(path, password)?;
    Ok(manager)
}

fn print_entries(path: &Path, entries: &[KeystoreEntry]) {
    println!(
        "{}",
        format!("Keystore: {} ({} entries)", path.display(), entries.len()).bold()
    );
    for e in entries {
        let status = match e.validity {
            Validity::Valid => e.validity.label().green(),
            Validity::Expired => e.validity.label().red(),
            Validity::NotYetValid => e.validity.label().yellow(),
        };
        println!(
            "\n{}  {}",
            e.alias.cyan().bold(),
            format!("[{}]", e.kind.label()).dimmed()
        );
        println!("  subject: {}", e.subject);
        println!("  issuer:  {}", e.issuer);
        println!("  valid:   {} .. {}  {}", e.start_date, e.end_date, status);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_is_ui() {
        let cli = Cli::try_parse_from(["keystore-wiz"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_parse_import() {
        let cli = Cli::try_parse_from([
            "keystore-wiz",
            "import",
            "trust.jks",
            "root",
            "root.pem",
            "--password",
            "changeit",
            "-o",
            "out.jks",
        ])
        .unwrap();
        let Some(SubCommands::Import {
            keystore,
            alias,
            cert,
            password,
            output,
        }) = cli.command
        else {
            panic!("expected import");
        };
        assert_eq!(keystore, PathBuf::from("trust.jks"));
        assert_eq!(alias, "root");
        assert_eq!(cert, PathBuf::from("root.pem"));
        assert_eq!(password.require().unwrap(), "changeit");
        assert_eq!(output, Some(PathBuf::from("out.jks")));
    }

    #[test]
    fn test_missing_password() {
        let arg = PasswordArg { password: None };
        assert!(arg.require().is_err());
        let arg = PasswordArg {
            password: Some(String::new()),
        };
        assert!(arg.require().is_err());
    }

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::try_parse_from(["keystore-wiz", "ui", "--config", "wiz.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("wiz.toml")));
    }
}
