//! Session commands.

use auth_service::SignUpOutcome;
use common::AppResult;
use domain::SignUpRequest;

use crate::cli::args::{LoginArgs, SignupArgs};
use crate::context::AppContext;

pub async fn login(args: LoginArgs, ctx: &AppContext) -> AppResult<()> {
    let session = ctx.session.sign_in(&args.email, &args.password).await?;
    ctx.output
        .message(&format!("Signed in as {}", session.email))
}

pub async fn signup(args: SignupArgs, ctx: &AppContext) -> AppResult<()> {
    let mut request = SignUpRequest::new(args.email, args.password);
    if let Some(name) = args.name {
        request = request.with_metadata("name", name);
    }

    match ctx.session.sign_up(request).await? {
        SignUpOutcome::SignedIn(session) => ctx
            .output
            .message(&format!("Account created, signed in as {}", session.email)),
        SignUpOutcome::ConfirmationPending { email, .. } => ctx.output.message(&format!(
            "Account created. Check {} for a confirmation link, then log in",
            email
        )),
    }
}

pub async fn logout(ctx: &AppContext) -> AppResult<()> {
    ctx.session.sign_out().await?;
    ctx.output.message("Signed out")
}

pub async fn reset_password(email: &str, ctx: &AppContext) -> AppResult<()> {
    ctx.session.reset_password(email).await?;
    ctx.output
        .message(&format!("Password reset link sent to {}", email.trim()))
}
