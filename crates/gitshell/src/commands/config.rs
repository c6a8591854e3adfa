//! `gitshell config` commands.

use std::collections::BTreeMap;
use std::io::Write;

use anyhow::Result;
use clap::Subcommand;
use gitshell_core::config::{CONFIG_OPTIONS, option_for_key};

use crate::context::Context;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the value of a configuration key.
    Get {
        /// The configuration key to read.
        key: String,
    },
    /// Store a value for a configuration key.
    Set {
        /// The configuration key to write.
        key: String,
        /// The new value.
        value: String,
    },
    /// Print every configuration key with its current value.
    #[command(alias = "ls")]
    List,
}

impl ConfigCommand {
    /// Run the subcommand.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown keys, rejected values, or if the config
    /// file cannot be written.
    pub fn run(self, ctx: &mut Context, out: &mut dyn Write) -> Result<()> {
        match self {
            Self::Get { key } => {
                let value = option_for_key(&key)?.current_value(&*ctx.config);
                ctx.emit(out, &value, &value)
            }
            Self::Set { key, value } => {
                ctx.config.set(&key, &value)?;
                ctx.config.write()?;
                tracing::debug!(key = %key, value = %value, "config updated");
                Ok(())
            }
            Self::List => {
                let values: Vec<(&str, String)> = CONFIG_OPTIONS
                    .iter()
                    .map(|o| (o.key, o.current_value(&*ctx.config)))
                    .collect();
                let text = values
                    .iter()
                    .map(|(key, value)| format!("{key}={value}"))
                    .collect::<Vec<_>>()
                    .join("\n");
                let json: BTreeMap<&str, String> = values.into_iter().collect();
                ctx.emit(out, &json, &text)
            }
        }
    }
}
