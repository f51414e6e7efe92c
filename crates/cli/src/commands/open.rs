//! `vws open <path>`: ask the route guard what a navigation would do.

use village_water_client::GuardDecision;

use super::Context;
use crate::output;

pub async fn open(ctx: &Context, path: &str) {
    let mut guard = ctx.auth.guard();
    guard.wait_resolved().await;

    let (route, decision) = guard.navigate(path);
    let line = match decision {
        GuardDecision::Render => format!("{} ({route})", route.title()),
        GuardDecision::Wait => format!("{} ({route}): still resolving session", route.title()),
        GuardDecision::RedirectToLogin => format!("Redirected to {route}: login required"),
    };
    output::print(&line);
    if guard.show_navbar(route) {
        output::print("[navbar]");
    }
}
