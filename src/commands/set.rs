use super::prompt::select_identity;
use super::Context;
use clap::Args;
use color_eyre::eyre::{bail, Result};
use gitidentity::{first_auto_matching_identity, ConfigStore};

#[derive(Args, Debug, Default)]
pub struct SetArgs {
    /// Do not apply auto applicable identities
    #[arg(long)]
    pub no_auto: bool,

    /// Only apply an auto applicable identity, never prompt
    #[arg(long)]
    pub only_auto: bool,
}

pub async fn run(ctx: &Context, args: &SetArgs) -> Result<()> {
    if args.no_auto && args.only_auto {
        bail!("conflicting options \"no-auto\" and \"only-auto\"");
    }

    let loaded = ctx.load_config().await?;
    let list = &loaded.config.list;
    let manager = ctx.manager();

    if !args.no_auto {
        let git_info = manager.store().remotes().await?;
        let match_ctx = ctx.match_context(git_info);
        if let Some(identity) = first_auto_matching_identity(list, &match_ctx).await? {
            manager.apply_identity(Some(identity)).await?;
            println!("Automatically selected identity: {}", identity.display());
            return Ok(());
        }
    }
    if args.only_auto {
        bail!("no matching identity");
    }

    let identity = select_identity(&manager, list).await?;
    manager.apply_identity(Some(&identity)).await?;
    Ok(())
}
