//! Resource commands: households, bills, payments, notifications, dashboard.

use village_water_core::{BillGenerationRequest, BillingPeriod, HouseholdId, PaymentMethod};

use super::{CommandError, Context};
use crate::output;

pub async fn list_households(ctx: &Context, search: Option<String>) -> Result<(), CommandError> {
    ctx.require_login()?;
    let query: Vec<(&str, String)> = search.into_iter().map(|s| ("search", s)).collect();
    let households = ctx.client().households().list_where(query).await?;
    output::print(&output::render_households(&households));
    Ok(())
}

pub async fn list_bills(ctx: &Context, status: Option<String>) -> Result<(), CommandError> {
    ctx.require_login()?;
    let query: Vec<(&str, String)> = status.into_iter().map(|s| ("status", s)).collect();
    let bills = ctx.client().bills().list_where(query).await?;
    output::print(&output::render_bills(&bills));
    Ok(())
}

/// Generate bills for `period` (default: the current month).
///
/// Household accounts are pinned to their own household before anything is
/// sent.
pub async fn generate_bills(
    ctx: &Context,
    period: Option<String>,
    household: Option<i32>,
) -> Result<(), CommandError> {
    ctx.require_login()?;
    let period = period.unwrap_or_else(current_period);
    let user = ctx.auth.user();
    let request =
        BillGenerationRequest::for_user(user.as_ref(), &period, household.map(HouseholdId::new))?;

    let outcome = ctx.client().bills().generate(&request).await?;
    output::print(&output::render_generation(&outcome));
    Ok(())
}

fn current_period() -> String {
    BillingPeriod::containing(chrono::Local::now().date_naive()).to_string()
}

pub async fn list_payments(
    ctx: &Context,
    method: Option<PaymentMethod>,
) -> Result<(), CommandError> {
    ctx.require_login()?;
    let query: Vec<(&str, String)> = method
        .into_iter()
        .map(|m| ("payment_method", m.to_string()))
        .collect();
    let payments = ctx.client().payments().list_where(query).await?;
    output::print(&output::render_payments(&payments));
    Ok(())
}

pub async fn list_notifications(ctx: &Context) -> Result<(), CommandError> {
    ctx.require_login()?;
    let notifications = ctx.client().notifications().list().await?;
    output::print(&output::render_notifications(&notifications));
    Ok(())
}

pub async fn unread_notifications(ctx: &Context) -> Result<(), CommandError> {
    ctx.require_login()?;
    let count = ctx.client().notifications().unread_count().await?;
    output::print(&count.to_string());
    Ok(())
}

pub async fn read_all_notifications(ctx: &Context) -> Result<(), CommandError> {
    ctx.require_login()?;
    ctx.client().notifications().mark_all_read().await?;
    output::print("All notifications marked as read.");
    Ok(())
}

/// Headline statistics; staff also get the top consumers.
pub async fn dashboard(ctx: &Context) -> Result<(), CommandError> {
    let caps = ctx.require_login()?;
    let dashboard = ctx.client().dashboard();
    let stats = dashboard.stats().await?;
    output::print(&output::render_stats(&stats));

    if caps.is_manager_or_admin {
        let charts = dashboard.charts().await?;
        for consumer in &charts.top_consumers {
            output::print(&format!(
                "  {:<14} {:<28} {} L",
                consumer.household_code, consumer.household_name, consumer.total_consumption
            ));
        }
    }
    Ok(())
}

pub async fn list_sms(ctx: &Context) -> Result<(), CommandError> {
    ctx.require_staff("SMS logs are visible to staff only")?;
    let entries = ctx.client().sms().list().await?;
    output::print(&output::render_sms(&entries));
    Ok(())
}
