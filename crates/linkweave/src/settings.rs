//! Layered link configuration for the command line.
//!
//! Sources, lowest precedence first: built-in defaults,
//! `~/.config/linkweave/config.*`, `<vault>/.linkweave.*`, an explicit
//! `--config` file, `LINKWEAVE_*` environment variables, command-line flags.

use anyhow::{Context, anyhow};
use config::{Config, Environment, File};
use linkweave_core::{LinkConfig, WikilinkSyntax};
use std::path::{Path, PathBuf};

const USER_CONFIG: &str = "~/.config/linkweave/config";
const VAULT_CONFIG: &str = ".linkweave";
const ENV_PREFIX: &str = "LINKWEAVE";

/// Values given on the command line; `None` leaves the layered value alone
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub syntax: Option<WikilinkSyntax>,
    pub config_file: Option<PathBuf>,
}

/// Build the effective [`LinkConfig`] for `vault`
pub fn load_settings(vault: &Path, overrides: &Overrides) -> anyhow::Result<LinkConfig> {
    let user_config = shellexpand::tilde(USER_CONFIG);
    let vault_config = vault.join(VAULT_CONFIG);
    let vault_config = vault_config
        .to_str()
        .ok_or(anyhow!("Can't convert vault path to str"))?;

    let mut builder = Config::builder()
        .add_source(Config::try_from(&LinkConfig::default())?)
        .add_source(File::with_name(&user_config).required(false))
        .add_source(File::with_name(vault_config).required(false));

    if let Some(path) = &overrides.config_file {
        let expanded = expand_path(path)?;
        log::debug!("Reading link configuration from {}", expanded.display());
        builder = builder.add_source(File::from(expanded).required(true));
    }

    let settings = builder
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("note_extensions")
                .with_list_parse_key("image_extensions"),
        )
        .set_override_option("wikilink_syntax", overrides.syntax.map(|s| s.to_string()))?
        .build()
        .map_err(|err| anyhow!("Build err: {err}"))?;

    let config: LinkConfig = settings
        .try_deserialize()
        .context("Invalid link configuration")?;
    config.validate()?;

    log::debug!(
        "Link configuration: grammar={}, default extension={}",
        config.grammar(),
        config.default_note_extension
    );
    Ok(config)
}

/// Expand `~` and environment variables in a user-supplied path
pub fn expand_path(path: &Path) -> anyhow::Result<PathBuf> {
    let raw = path
        .to_str()
        .ok_or_else(|| anyhow!("Path {} is not valid UTF-8", path.display()))?;
    let expanded = shellexpand::full(raw).with_context(|| format!("Cannot expand {}", raw))?;
    Ok(PathBuf::from(expanded.as_ref()))
}
