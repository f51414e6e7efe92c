//! Dashboard statistics and chart series.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{BillStatus, BillingPeriod};

/// Headline numbers for the dashboard.
///
/// Household accounts get the same shape scoped to their own household.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_households: u64,
    pub active_connections: u64,
    /// Completed payments in the current month.
    pub monthly_revenue: Decimal,
    pub pending_bills: u64,
    pub total_bills: u64,
    pub total_payments: u64,
    /// Liters across all recorded readings.
    pub total_water_consumed: Decimal,
}

/// Chart data for staff dashboards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardCharts {
    /// Last six months, oldest first.
    pub revenue_trend: Vec<RevenuePoint>,
    pub bill_status: Vec<BillStatusCount>,
    /// Top five households by consumption.
    pub top_consumers: Vec<TopConsumer>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevenuePoint {
    pub month: BillingPeriod,
    pub revenue: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillStatusCount {
    pub status: BillStatus,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopConsumer {
    pub household_code: String,
    pub household_name: String,
    pub total_consumption: Decimal,
}
