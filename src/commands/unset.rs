use super::Context;
use color_eyre::eyre::Result;

pub async fn run(ctx: &Context) -> Result<()> {
    ctx.manager().unset_current_identity().await?;
    Ok(())
}
