//! Plain-text rendering of command results.
//!
//! The `render_*` functions build the text; [`print`] writes it to stdout.

use std::fmt::Write as _;

use village_water_core::{
    Bill, BillGenerationOutcome, Capabilities, DashboardStats, Household, Notification, Payment,
    SmsLogEntry, User,
};

#[allow(clippy::print_stdout)]
pub fn print(text: &str) {
    println!("{text}");
}

#[allow(clippy::print_stderr)]
pub fn prompt(text: &str) {
    eprintln!("{text}");
}

pub fn render_user(user: &User, caps: Capabilities) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", user.username, user.full_name);
    let _ = writeln!(out, "  email:     {}", user.email);
    let _ = writeln!(out, "  role:      {}", user.role);
    if let Some(household) = user.household_id {
        let _ = writeln!(out, "  household: {household}");
    }
    let _ = write!(out, "  can:       {}", capability_summary(caps).join(", "));
    out
}

fn capability_summary(caps: Capabilities) -> Vec<&'static str> {
    let mut can = Vec::new();
    if caps.is_manager_or_admin {
        can.extend(["manage households", "generate bills", "view SMS logs"]);
    }
    if caps.is_admin {
        can.push("manage users");
    }
    if caps.is_household {
        can.extend(["view own bills", "pay own bills"]);
    }
    if can.is_empty() {
        can.push("nothing");
    }
    can
}

pub fn render_households(households: &[Household]) -> String {
    if households.is_empty() {
        return "No households.".to_owned();
    }
    households
        .iter()
        .map(|h| {
            format!(
                "{:<14} {:<28} {:<14} {:?}",
                h.household_code, h.household_name, h.phone_number, h.status
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_bills(bills: &[Bill]) -> String {
    if bills.is_empty() {
        return "No bills.".to_owned();
    }
    bills
        .iter()
        .map(|b| {
            format!(
                "{:<18} {} {:<14} {:>12} due {} {:?}",
                b.bill_number,
                b.billing_period,
                b.household_code.as_deref().unwrap_or("-"),
                b.total_amount,
                b.due_date,
                b.status
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_generation(outcome: &BillGenerationOutcome) -> String {
    let mut out = String::new();
    if !outcome.message.is_empty() {
        let _ = writeln!(out, "{}", outcome.message);
    }
    let _ = write!(out, "{}", render_bills(&outcome.bills));
    for error in &outcome.errors {
        let _ = write!(out, "\n  skipped: {error}");
    }
    out
}

pub fn render_payments(payments: &[Payment]) -> String {
    if payments.is_empty() {
        return "No payments.".to_owned();
    }
    payments
        .iter()
        .map(|p| {
            format!(
                "{:<18} {} {:>12} {:<14} {}",
                p.receipt_number, p.payment_date, p.amount_paid, p.payment_method, p.payer_name
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_notifications(notifications: &[Notification]) -> String {
    if notifications.is_empty() {
        return "No notifications.".to_owned();
    }
    notifications
        .iter()
        .map(|n| {
            let marker = if n.is_read { ' ' } else { '*' };
            format!("{marker} {} {}: {}", n.created_at.format("%Y-%m-%d %H:%M"), n.title, n.message)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_sms(entries: &[SmsLogEntry]) -> String {
    if entries.is_empty() {
        return "No SMS sent.".to_owned();
    }
    entries
        .iter()
        .map(|e| {
            let mut line = format!(
                "{} {:<15} {:?}/{:?}: {}",
                e.sent_at.format("%Y-%m-%d %H:%M"),
                e.phone_number,
                e.notification_type,
                e.status,
                e.message
            );
            if let Some(error) = &e.error_message {
                let _ = write!(line, " ({error})");
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_stats(stats: &DashboardStats) -> String {
    format!(
        "Households:       {} ({} active)\n\
         Monthly revenue:  {}\n\
         Bills:            {} ({} pending)\n\
         Payments:         {}\n\
         Water consumed:   {} L",
        stats.total_households,
        stats.active_connections,
        stats.monthly_revenue,
        stats.total_bills,
        stats.pending_bills,
        stats.total_payments,
        stats.total_water_consumed,
    )
}
