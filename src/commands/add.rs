use super::Context;
use clap::Args;
use color_eyre::eyre::Result;
use gitidentity::config::{USER_EMAIL_KEY, USER_NAME_KEY};
use gitidentity::{default_config_paths, write_config, Config, ConfigError, Format, Identity};
use tracing::debug;

#[derive(Args, Debug, Default)]
pub struct AddArgs {
    /// Identifier for easier identification (generated from name and email when empty)
    #[arg(long, default_value = "")]
    pub id: String,

    /// User name value
    #[arg(long, default_value = "")]
    pub name: String,

    /// User email value
    #[arg(long, default_value = "")]
    pub email: String,

    /// Extra git config value, may be repeated
    #[arg(long = "value", value_name = "KEY=VALUE")]
    pub values: Vec<String>,
}

/// Identity described by the flags; `--name` and `--email` win over `--value`.
#[must_use]
pub fn build_identity(args: &AddArgs) -> Identity {
    let mut identity = Identity {
        identifier: args.id.clone(),
        ..Identity::default()
    };
    for raw in &args.values {
        let (key, value) = raw.split_once('=').unwrap_or((raw.as_str(), ""));
        identity.values.insert(key.to_string(), value.to_string());
    }
    identity
        .values
        .insert(USER_NAME_KEY.to_string(), args.name.clone());
    identity
        .values
        .insert(USER_EMAIL_KEY.to_string(), args.email.clone());
    identity
}

pub async fn run(ctx: &Context, args: &AddArgs) -> Result<()> {
    let (mut config, format, path) = match ctx.load_config().await {
        Ok(loaded) => (loaded.config, loaded.format, loaded.path),
        Err(e) if e.is_not_found() => {
            let path = ctx
                .config_path
                .clone()
                .or_else(|| default_config_paths().into_iter().next())
                .ok_or(ConfigError::NoDefaultLocation)?;
            debug!("no config yet, starting a new one at {}", path.display());
            (Config::empty(), Format::from_path(&path), path)
        }
        Err(e) => return Err(e.into()),
    };

    config.list.push(build_identity(args));
    write_config(&path, &config, format).await?;
    Ok(())
}
