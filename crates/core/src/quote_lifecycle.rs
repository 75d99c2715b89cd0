//! Quote reconciliation rules used by the lifecycle cron.
//!
//! The cron loads a bounded batch of open quotes and asks [`plan_quote_action`]
//! what to do with each one. Planning is pure so the reminder thresholds,
//! supersession rule and auto-cancel grace period can be tested without a
//! database.

use std::collections::{HashMap, HashSet};

use chrono::Duration;
use serde::Serialize;

use crate::types::{DbId, Timestamp};

/// Reminder thresholds (hours before expiry) when none are configured.
pub const DEFAULT_REMINDER_THRESHOLDS_HOURS: [f64; 2] = [24.0, 2.0];

/// Hours past expiry before a request is auto-cancelled.
pub const DEFAULT_AUTO_CANCEL_AFTER_HOURS: f64 = 0.0;

/// Days a cancelled request is retained before deletion.
pub const DEFAULT_CLEANUP_AFTER_DAYS: f64 = 30.0;

/// Quotes examined per cron run.
pub const DEFAULT_BATCH_SIZE: i64 = 100;

/// Lower bound for the batch size.
pub const MIN_BATCH_SIZE: i64 = 10;

/// Upper bound for the batch size.
pub const MAX_BATCH_SIZE: i64 = 500;

/// Tunables for one cron run. Echoed back in the cron response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LifecycleSettings {
    /// Descending list of hours-before-expiry at which reminders go out.
    pub reminder_thresholds: Vec<f64>,
    /// Grace period after expiry before auto-cancel, in hours (>= 0).
    pub auto_cancel_delay_hours: f64,
    /// Age in days after which cancelled, unconverted requests are deleted (>= 1).
    pub cleanup_after_days: f64,
    /// Maximum rows examined by each pass.
    pub max_batch: i64,
}

impl Default for LifecycleSettings {
    fn default() -> Self {
        Self {
            reminder_thresholds: DEFAULT_REMINDER_THRESHOLDS_HOURS.to_vec(),
            auto_cancel_delay_hours: DEFAULT_AUTO_CANCEL_AFTER_HOURS,
            cleanup_after_days: DEFAULT_CLEANUP_AFTER_DAYS,
            max_batch: DEFAULT_BATCH_SIZE,
        }
    }
}

impl LifecycleSettings {
    /// Build settings from raw (usually environment) values.
    ///
    /// Unparseable values fall back to their defaults; numeric values are
    /// then clamped into their allowed ranges.
    pub fn from_raw(
        thresholds: Option<&str>,
        auto_cancel_after_hours: Option<&str>,
        cleanup_after_days: Option<&str>,
        batch_size: Option<&str>,
    ) -> Self {
        let max_batch = parse_number(batch_size, DEFAULT_BATCH_SIZE as f64)
            .clamp(MIN_BATCH_SIZE as f64, MAX_BATCH_SIZE as f64) as i64;

        Self {
            reminder_thresholds: parse_thresholds(thresholds),
            auto_cancel_delay_hours: parse_number(
                auto_cancel_after_hours,
                DEFAULT_AUTO_CANCEL_AFTER_HOURS,
            )
            .max(0.0),
            cleanup_after_days: parse_number(cleanup_after_days, DEFAULT_CLEANUP_AFTER_DAYS)
                .max(1.0),
            max_batch,
        }
    }

    /// Total reminders a quote can receive.
    pub fn total_reminders(&self) -> usize {
        self.reminder_thresholds.len()
    }

    /// Cutoff for retention cleanup: requests last updated at or before this go.
    pub fn cleanup_cutoff(&self, now: Timestamp) -> Timestamp {
        now - hours(self.cleanup_after_days * 24.0)
    }
}

/// Parse a comma-separated list of positive hour values, sorted descending.
///
/// Non-numeric and non-positive entries are dropped. An empty result falls
/// back to [`DEFAULT_REMINDER_THRESHOLDS_HOURS`].
pub fn parse_thresholds(raw: Option<&str>) -> Vec<f64> {
    let mut parsed: Vec<f64> = raw
        .unwrap_or("24,2")
        .split(',')
        .filter_map(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v > 0.0)
        .collect();
    parsed.sort_by(|a, b| b.total_cmp(a));

    if parsed.is_empty() {
        DEFAULT_REMINDER_THRESHOLDS_HOURS.to_vec()
    } else {
        parsed
    }
}

fn parse_number(raw: Option<&str>, fallback: f64) -> f64 {
    raw.and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(fallback)
}

/// Fractional hours as a chrono duration (millisecond precision).
pub fn hours(value: f64) -> Duration {
    Duration::milliseconds((value * 3_600_000.0).round() as i64)
}

/// The facts about one open quote that planning depends on.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteSnapshot {
    pub quote_id: DbId,
    pub request_id: DbId,
    pub version: i32,
    pub expires_at: Option<Timestamp>,
    pub reminder_count: i32,
    pub expired_notification_sent: bool,
    /// The owning request is paid or already converted into an order.
    pub request_settled: bool,
}

/// What the cron should do with one quote.
#[derive(Debug, Clone, PartialEq)]
pub enum QuoteAction {
    /// A newer quote exists and this one has lapsed: mark it expired, nothing else.
    ExpireSuperseded,
    /// Issue a fresh access token and send reminder `number` of `total`.
    SendReminder { number: usize, total: usize },
    /// Expire the quote, cancel the request, and send the expiry notice if
    /// it has not gone out yet.
    AutoCancel { send_notice: bool },
}

/// Map each request to the id of its highest-version open quote in the batch.
pub fn latest_active_quotes(snapshots: &[QuoteSnapshot]) -> HashMap<DbId, DbId> {
    let mut latest: HashMap<DbId, (DbId, i32)> = HashMap::new();
    for s in snapshots {
        match latest.get(&s.request_id) {
            Some((_, version)) if *version >= s.version => {}
            _ => {
                latest.insert(s.request_id, (s.quote_id, s.version));
            }
        }
    }
    latest
        .into_iter()
        .map(|(request_id, (quote_id, _))| (request_id, quote_id))
        .collect()
}

/// Decide the action for one quote.
///
/// `is_latest` must come from [`latest_active_quotes`] over the same batch.
/// Quotes on settled requests and quotes without an expiry are left alone.
pub fn plan_quote_action(
    snapshot: &QuoteSnapshot,
    is_latest: bool,
    now: Timestamp,
    settings: &LifecycleSettings,
) -> Option<QuoteAction> {
    let expires_at = snapshot.expires_at?;
    if snapshot.request_settled {
        return None;
    }

    let until_expiry = expires_at - now;

    if !is_latest {
        return (until_expiry <= Duration::zero()).then_some(QuoteAction::ExpireSuperseded);
    }

    if until_expiry > Duration::zero() {
        let index = usize::try_from(snapshot.reminder_count.max(0)).unwrap_or(usize::MAX);
        let threshold = *settings.reminder_thresholds.get(index)?;
        if until_expiry > hours(threshold) {
            return None;
        }
        return Some(QuoteAction::SendReminder {
            number: index + 1,
            total: settings.total_reminders(),
        });
    }

    if until_expiry > -hours(settings.auto_cancel_delay_hours) {
        return None;
    }

    Some(QuoteAction::AutoCancel {
        send_notice: !snapshot.expired_notification_sent,
    })
}

/// Remove requests that still have an open, unexpired quote from a cleanup batch.
pub fn deletable_requests(stale: &[DbId], still_quoted: &HashSet<DbId>) -> Vec<DbId> {
    stale
        .iter()
        .copied()
        .filter(|id| !still_quoted.contains(id))
        .collect()
}
