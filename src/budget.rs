//! Daily cost budget monitoring.
//!
//! The chat service consults a [`BudgetMonitor`] before doing any provider
//! work and records the cost of each answered question afterwards. Alert
//! levels escalate at 80% (warning) and 100% (critical) of the daily budget.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::types::Result;

/// Spend classification against the daily budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    /// Below the warning threshold.
    Normal,
    /// At or above the warning threshold (default 80%).
    Warning,
    /// Daily budget exhausted (>= 100%).
    Critical,
}

/// Snapshot of the current day's spend against the budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetStatus {
    /// Date the status covers (UTC).
    pub date: NaiveDate,
    /// Total cost accumulated today, USD.
    pub total_cost: f64,
    /// Configured daily budget, USD.
    pub daily_budget: f64,
    /// Spend as a percentage of the budget (0-100+).
    pub budget_used_pct: f64,
    /// Number of answered requests today.
    pub request_count: u64,
    /// Classification of the spend ratio.
    pub alert_level: AlertLevel,
}

/// One cost record, emitted per answered question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostRecord {
    /// Model that served the request.
    pub model: String,
    /// Prompt token count.
    pub prompt_tokens: u64,
    /// Completion token count.
    pub completion_tokens: u64,
    /// Estimated cost in USD.
    pub estimated_cost_usd: f64,
    /// Wall-clock latency of the turn in milliseconds.
    pub latency_ms: u64,
    /// When the request completed.
    pub created_at: DateTime<Utc>,
}

/// Port for the budget collaborator.
#[async_trait]
pub trait BudgetMonitor: Send + Sync {
    /// Check the current day's spending against the budget.
    async fn check_budget(&self) -> Result<BudgetStatus>;

    /// Record the cost of an answered question.
    async fn record_cost(&self, record: CostRecord) -> Result<()>;
}

/// In-memory, day-bucketed cost ledger.
///
/// Only the current day's records contribute to the budget status; prior
/// days are dropped on rollover, so the ledger stays bounded in long-lived
/// processes. Suitable for single-process deployments and tests; durable
/// accounting belongs to the host's persistence layer.
pub struct InMemoryBudgetMonitor {
    daily_budget: f64,
    alert_threshold: f64,
    records: RwLock<Vec<CostRecord>>,
}

impl InMemoryBudgetMonitor {
    /// Create a monitor with the given daily budget (USD) and the default
    /// 0.8 warning threshold.
    pub fn new(daily_budget: f64) -> Self {
        Self::with_threshold(daily_budget, 0.8)
    }

    /// Create a monitor with an explicit warning threshold ratio.
    pub fn with_threshold(daily_budget: f64, alert_threshold: f64) -> Self {
        Self {
            daily_budget,
            alert_threshold,
            records: RwLock::new(Vec::new()),
        }
    }

    fn alert_level(&self, used_ratio: f64) -> AlertLevel {
        if used_ratio >= 1.0 {
            AlertLevel::Critical
        } else if used_ratio >= self.alert_threshold {
            AlertLevel::Warning
        } else {
            AlertLevel::Normal
        }
    }
}

#[async_trait]
impl BudgetMonitor for InMemoryBudgetMonitor {
    async fn check_budget(&self) -> Result<BudgetStatus> {
        let today = Utc::now().date_naive();
        let records = self.records.read();

        let mut total_cost = 0.0;
        let mut request_count = 0u64;
        for record in records.iter() {
            if record.created_at.date_naive() == today {
                total_cost += record.estimated_cost_usd;
                request_count += 1;
            }
        }

        let used_ratio = if self.daily_budget > 0.0 {
            total_cost / self.daily_budget
        } else {
            // Zero budget means every spend is over budget.
            if total_cost > 0.0 { 1.0 } else { 0.0 }
        };

        Ok(BudgetStatus {
            date: today,
            total_cost,
            daily_budget: self.daily_budget,
            budget_used_pct: used_ratio * 100.0,
            request_count,
            alert_level: self.alert_level(used_ratio),
        })
    }

    async fn record_cost(&self, record: CostRecord) -> Result<()> {
        let today = Utc::now().date_naive();
        let mut records = self.records.write();
        // Day rollover: prior days no longer count, drop them.
        records.retain(|r| r.created_at.date_naive() == today);
        records.push(record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(cost: f64) -> CostRecord {
        CostRecord {
            model: "gpt-4o-mini".to_string(),
            prompt_tokens: 100,
            completion_tokens: 50,
            estimated_cost_usd: cost,
            latency_ms: 120,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn empty_ledger_is_normal() {
        let monitor = InMemoryBudgetMonitor::new(50.0);
        let status = monitor.check_budget().await.unwrap();

        assert_eq!(status.alert_level, AlertLevel::Normal);
        assert_eq!(status.total_cost, 0.0);
        assert_eq!(status.request_count, 0);
    }

    #[tokio::test]
    async fn alert_levels_escalate() {
        let monitor = InMemoryBudgetMonitor::new(10.0);

        monitor.record_cost(record(5.0)).await.unwrap();
        assert_eq!(
            monitor.check_budget().await.unwrap().alert_level,
            AlertLevel::Normal
        );

        monitor.record_cost(record(3.5)).await.unwrap();
        let status = monitor.check_budget().await.unwrap();
        assert_eq!(status.alert_level, AlertLevel::Warning);
        assert!((status.budget_used_pct - 85.0).abs() < 1e-9);

        monitor.record_cost(record(2.0)).await.unwrap();
        assert_eq!(
            monitor.check_budget().await.unwrap().alert_level,
            AlertLevel::Critical
        );
    }

    #[tokio::test]
    async fn rollover_drops_prior_day_records() {
        let monitor = InMemoryBudgetMonitor::new(10.0);
        let mut yesterday = record(1.0);
        yesterday.created_at = Utc::now() - chrono::Duration::days(1);
        monitor.record_cost(yesterday).await.unwrap();

        monitor.record_cost(record(2.0)).await.unwrap();

        assert_eq!(monitor.records.read().len(), 1);
        let status = monitor.check_budget().await.unwrap();
        assert_eq!(status.total_cost, 2.0);
        assert_eq!(status.request_count, 1);
    }

    #[tokio::test]
    async fn old_records_do_not_count() {
        let monitor = InMemoryBudgetMonitor::new(1.0);
        let mut yesterday = record(100.0);
        yesterday.created_at = Utc::now() - chrono::Duration::days(1);
        monitor.record_cost(yesterday).await.unwrap();

        let status = monitor.check_budget().await.unwrap();
        assert_eq!(status.total_cost, 0.0);
        assert_eq!(status.alert_level, AlertLevel::Normal);
    }
}
