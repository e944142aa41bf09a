// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lockbox - a client-side encrypted password vault.
//!
//! This is the binary entry point. Every secret is sealed locally before it
//! reaches the vault file.

mod envelope;
mod file_store;
mod generate;
mod items;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use lockbox_config::LockboxConfig;
use lockbox_core::LockboxError;

use crate::generate::GenerateOverrides;
use crate::items::{ItemFields, ListOptions, SecretSource};

/// Lockbox - a client-side encrypted password vault.
#[derive(Parser, Debug)]
#[command(name = "lockbox", version, about, long_about = None)]
struct Cli {
    /// Configuration file to use instead of the standard lookup.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Disable colored output.
    #[arg(long, global = true)]
    plain: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a new vault file.
    Init {
        file: PathBuf,
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
    /// Add an item. The secret is generated, read from stdin or prompted.
    Add {
        file: PathBuf,
        #[arg(long)]
        title: String,
        #[command(flatten)]
        meta: MetaArgs,
        #[command(flatten)]
        secret: SecretArgs,
    },
    /// List items, optionally revealing their secrets.
    List {
        file: PathBuf,
        /// Decrypt every item (in batches).
        #[arg(long)]
        reveal: bool,
        /// Print revealed secrets in full instead of masked.
        #[arg(long)]
        show: bool,
    },
    /// Edit an item's fields or secret.
    Edit {
        file: PathBuf,
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[command(flatten)]
        meta: MetaArgs,
        /// Replace the secret (prompted, piped or generated).
        #[arg(long)]
        secret: bool,
        #[command(flatten)]
        source: SecretArgs,
    },
    /// Delete an item.
    Remove { file: PathBuf, id: String },
    /// Change the master password.
    Passwd { file: PathBuf },
    /// Encrypt text into an envelope.
    Encrypt {
        /// Text to encrypt; read from stdin if omitted.
        #[arg(long)]
        text: Option<String>,
    },
    /// Decrypt an envelope.
    Decrypt {
        /// Envelope JSON; read from stdin if omitted.
        #[arg(long)]
        envelope: Option<String>,
    },
    /// Generate a random password.
    Generate {
        #[arg(long)]
        length: Option<usize>,
        #[arg(long)]
        no_uppercase: bool,
        #[arg(long)]
        no_lowercase: bool,
        #[arg(long)]
        no_digits: bool,
        #[arg(long)]
        symbols: bool,
    },
}

#[derive(Args, Debug)]
struct MetaArgs {
    #[arg(long)]
    username: Option<String>,
    #[arg(long)]
    url: Option<String>,
    #[arg(long)]
    notes: Option<String>,
}

#[derive(Args, Debug)]
struct SecretArgs {
    /// Generate the secret instead of reading it.
    #[arg(long)]
    generate: bool,
    /// Length of the generated secret.
    #[arg(long, requires = "generate")]
    length: Option<usize>,
    /// Include symbols in the generated secret.
    #[arg(long, requires = "generate")]
    symbols: bool,
}

impl From<SecretArgs> for SecretSource {
    fn from(args: SecretArgs) -> Self {
        Self {
            generate: args.generate,
            length: args.length,
            symbols: args.symbols,
        }
    }
}

impl MetaArgs {
    fn into_fields(self, title: Option<String>) -> ItemFields {
        ItemFields {
            title,
            username: self.username,
            url: self.url,
            notes: self.notes,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => lockbox_config::load_and_validate_path(path),
        None => lockbox_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            lockbox_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.log.level);

    if let Err(e) = run(cli, &config).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &LockboxConfig) -> Result<(), LockboxError> {
    match cli.command {
        Commands::Init { file, force } => items::run_init(&file, force, config).await,
        Commands::Add {
            file,
            title,
            meta,
            secret,
        } => items::run_add(&file, meta.into_fields(Some(title)), secret.into(), config).await,
        Commands::List { file, reveal, show } => {
            let options = ListOptions {
                reveal,
                show,
                plain: cli.plain,
            };
            items::run_list(&file, options, config).await
        }
        Commands::Edit {
            file,
            id,
            title,
            meta,
            secret,
            source,
        } => {
            let source = (secret || source.generate).then(|| SecretSource::from(source));
            items::run_edit(&file, &id, meta.into_fields(title), source, config).await
        }
        Commands::Remove { file, id } => items::run_remove(&file, &id, config).await,
        Commands::Passwd { file } => items::run_passwd(&file, config).await,
        Commands::Encrypt { text } => envelope::run_encrypt(text, config).await,
        Commands::Decrypt { envelope } => envelope::run_decrypt(envelope, config).await,
        Commands::Generate {
            length,
            no_uppercase,
            no_lowercase,
            no_digits,
            symbols,
        } => {
            let overrides = GenerateOverrides {
                length,
                no_uppercase,
                no_lowercase,
                no_digits,
                symbols,
            };
            generate::run_generate(overrides, &config.generator)
        }
    }
}

/// Logs go to stderr so that stdout carries only command output.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("lockbox={log_level},lockbox_vault={log_level},warn"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn binary_loads_config_defaults() {
        let config =
            lockbox_config::load_and_validate_str("").expect("default config should be valid");
        assert_eq!(config.vault.reveal_batch_size, 3);
    }

    #[test]
    fn length_requires_generate() {
        let parsed =
            Cli::try_parse_from(["lockbox", "add", "v.json", "--title", "t", "--length", "20"]);
        assert!(parsed.is_err());
    }
}
