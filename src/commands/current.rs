use super::Context;
use clap::{Args, ValueEnum};
use color_eyre::eyre::Result;
use gitidentity::{encode, Format, Identity, IdentityError};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Short,
    Json,
    Yaml,
}

#[derive(Args, Debug, Default)]
pub struct CurrentArgs {
    /// Include all git configs, not only the local one
    #[arg(long)]
    pub all: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Short, ignore_case = true)]
    pub format: OutputFormat,
}

/// Text printed for `identity`, newline-terminated.
pub fn render(identity: &Identity, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Short => format!("{}\n", identity.display()),
        OutputFormat::Json => encode(identity, Format::Json)?,
        OutputFormat::Yaml => encode(identity, Format::Yaml)?,
    })
}

pub async fn run(ctx: &Context, args: &CurrentArgs) -> Result<()> {
    let identity = match ctx.manager().current_identity(args.all).await {
        Ok(identity) => identity,
        Err(IdentityError::NoCurrentIdentity) => return Ok(()),
        Err(e) => return Err(e.into()),
    };
    print!("{}", render(&identity, args.format)?);
    Ok(())
}
