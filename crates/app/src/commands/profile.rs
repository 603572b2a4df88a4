//! Profile commands.

use common::AppResult;
use domain::ProfileUpdate;

use crate::cli::args::ProfileAction;
use crate::context::AppContext;
use crate::output;

pub async fn execute(action: ProfileAction, ctx: &AppContext) -> AppResult<()> {
    let identity = ctx.identity().await?;

    let profile = match action {
        ProfileAction::Show => ctx.session.get_user_profile(identity).await?,
        ProfileAction::Update { name, email, phone } => {
            let update = ProfileUpdate { name, email, phone };
            ctx.session.update_profile(identity, update).await?
        }
    };

    ctx.output.emit(&profile, output::profile_text)
}
