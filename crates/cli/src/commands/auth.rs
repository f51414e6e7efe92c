//! Account commands: login, register, logout, whoami, passwd.

use clap::Args;
use secrecy::ExposeSecret;
use village_water_core::{RegistrationProfile, Role};

use super::{CommandError, Context, read_secret};
use crate::output;

/// Arguments of `vws register`.
#[derive(Debug, Args)]
pub struct RegisterArgs {
    /// Username (4-50 letters, digits or underscores)
    pub username: String,

    #[arg(long)]
    pub full_name: String,

    #[arg(long)]
    pub email: String,

    #[arg(long)]
    pub phone: String,

    /// Account role
    #[arg(long, default_value = "Household")]
    pub role: Role,

    /// National ID (required for households)
    #[arg(long)]
    pub national_id: Option<String>,

    /// Address (required for households)
    #[arg(long)]
    pub address: Option<String>,

    #[arg(long)]
    pub household_name: Option<String>,

    #[arg(long)]
    pub meter_number: Option<String>,

    /// Password (read from stdin when omitted)
    #[arg(short, long)]
    pub password: Option<String>,
}

pub async fn login(
    ctx: &Context,
    username: &str,
    password: Option<String>,
) -> Result<(), CommandError> {
    let password = read_secret(password, "Password:")?;
    let user = ctx.auth.login(username, &password).await?;
    output::print(&format!("Logged in as {} ({})", user.username, user.role));
    Ok(())
}

pub async fn register(ctx: &Context, args: RegisterArgs) -> Result<(), CommandError> {
    let password = read_secret(args.password, "Password:")?;
    let profile = RegistrationProfile {
        username: args.username,
        password: password.expose_secret().to_owned(),
        confirm_password: password.expose_secret().to_owned(),
        full_name: args.full_name,
        email: args.email,
        phone_number: args.phone,
        role: args.role,
        national_id: args.national_id,
        household_name: args.household_name,
        address: args.address,
        meter_number: args.meter_number,
        ..RegistrationProfile::default()
    };

    let user = ctx.auth.register(&profile).await?;
    output::print(&format!("Registered and logged in as {} ({})", user.username, user.role));
    Ok(())
}

pub async fn logout(ctx: &Context) {
    let was_logged_in = ctx.auth.state().is_authenticated();
    ctx.auth.logout().await;
    if was_logged_in {
        output::print("Logged out.");
    } else {
        output::print("Not logged in.");
    }
}

pub async fn whoami(ctx: &Context, refresh: bool) -> Result<(), CommandError> {
    ctx.require_login()?;
    let user = if refresh {
        ctx.auth.refresh_profile().await?
    } else {
        ctx.auth.user().ok_or(CommandError::NotLoggedIn)?
    };
    output::print(&output::render_user(&user, ctx.auth.capabilities()));
    Ok(())
}

pub async fn change_password(ctx: &Context) -> Result<(), CommandError> {
    ctx.require_login()?;
    let old_password = read_secret(None, "Current password:")?;
    let new_password = read_secret(None, "New password:")?;
    let confirm_password = read_secret(None, "Repeat new password:")?;
    if new_password.expose_secret() != confirm_password.expose_secret() {
        return Err(CommandError::InvalidInput("passwords do not match".to_owned()));
    }

    ctx.auth
        .change_password(&old_password, &new_password, &confirm_password)
        .await?;
    output::print("Password changed.");
    Ok(())
}
