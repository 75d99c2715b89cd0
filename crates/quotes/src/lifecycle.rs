//! The quote lifecycle cron: reminders, supersession, auto-cancel and
//! retention cleanup.
//!
//! One run is bounded by [`LifecycleSettings::max_batch`]. Failures on a
//! single quote are collected into [`LifecycleReport::errors`] and the run
//! carries on; only loading the batch or the cleanup queries abort it.

use std::collections::HashSet;

use footprint_core::custom_order::{quote_access_url, request_track_url};
use footprint_core::hashing::generate_access_token;
use footprint_core::quote_lifecycle::{
    deletable_requests, latest_active_quotes, plan_quote_action, LifecycleSettings, QuoteAction,
    QuoteSnapshot,
};
use footprint_core::status::RequestStatus;
use footprint_core::types::Timestamp;
use footprint_db::models::custom_order_quote::OpenQuote;
use footprint_db::models::quote_token::CreateQuoteToken;
use footprint_events::Notification;
use serde::Serialize;

use crate::error::QuoteError;
use crate::service::QuoteService;

/// Summary of one cron run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LifecycleReport {
    pub config: LifecycleSettings,
    pub scanned: usize,
    pub reminders_sent: usize,
    pub quotes_cancelled: usize,
    pub cleanup_deleted: u64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

fn snapshot(row: &OpenQuote) -> QuoteSnapshot {
    QuoteSnapshot {
        quote_id: row.quote_id,
        request_id: row.request_id,
        version: row.version,
        expires_at: row.expires_at,
        reminder_count: row.reminder_count,
        expired_notification_sent: row.expired_notification_sent_at.is_some(),
        request_settled: row.request_status == RequestStatus::Paid.as_str()
            || row.converted_order_id.is_some(),
    }
}

impl QuoteService {
    /// Run every pass once.
    pub async fn run_lifecycle(
        &self,
        settings: &LifecycleSettings,
        now: Timestamp,
    ) -> Result<LifecycleReport, QuoteError> {
        let rows = self.store.list_open_quotes(settings.max_batch).await?;
        let snapshots: Vec<QuoteSnapshot> = rows.iter().map(snapshot).collect();
        let latest = latest_active_quotes(&snapshots);

        let mut report = LifecycleReport {
            config: settings.clone(),
            scanned: rows.len(),
            reminders_sent: 0,
            quotes_cancelled: 0,
            cleanup_deleted: 0,
            errors: Vec::new(),
        };

        for (row, snap) in rows.iter().zip(&snapshots) {
            let is_latest =
                !row.superseded && latest.get(&row.request_id) == Some(&row.quote_id);

            match plan_quote_action(snap, is_latest, now, settings) {
                None => {}
                Some(QuoteAction::ExpireSuperseded) => {
                    if let Err(e) = self.store.expire_quote(row.quote_id).await {
                        report
                            .errors
                            .push(format!("expire-old {}: {e}", row.request_number));
                    }
                }
                Some(QuoteAction::SendReminder { number, total }) => {
                    match self.send_reminder(row, number, total, now).await {
                        Ok(()) => report.reminders_sent += 1,
                        Err(msg) => report
                            .errors
                            .push(format!("reminder {}: {msg}", row.request_number)),
                    }
                }
                Some(QuoteAction::AutoCancel { send_notice }) => {
                    match self.auto_cancel(row, send_notice, now).await {
                        Ok(true) => report.quotes_cancelled += 1,
                        Ok(false) => {}
                        Err(msg) => report
                            .errors
                            .push(format!("expire {}: {msg}", row.request_number)),
                    }
                }
            }
        }

        report.cleanup_deleted = self.cleanup_cancelled(settings, now).await?;

        tracing::info!(
            scanned = report.scanned,
            reminders_sent = report.reminders_sent,
            quotes_cancelled = report.quotes_cancelled,
            cleanup_deleted = report.cleanup_deleted,
            errors = report.errors.len(),
            "Quote lifecycle run finished",
        );

        Ok(report)
    }

    /// Issue a new access token and send reminder `number` of `total`.
    /// The count only advances once the email has gone out.
    async fn send_reminder(
        &self,
        row: &OpenQuote,
        number: usize,
        total: usize,
        now: Timestamp,
    ) -> Result<(), String> {
        let expires_at = row
            .expires_at
            .ok_or_else(|| "quote has no expiry".to_string())?;

        let (token, token_hash) = generate_access_token();
        self.store
            .insert_token(&CreateQuoteToken {
                quote_id: row.quote_id,
                email: row.email.clone(),
                token_hash,
                expires_at,
            })
            .await
            .map_err(|e| e.to_string())?;

        let notification = Notification::QuoteReminder {
            to: row.email.clone(),
            customer_name: row.customer_name.clone(),
            request_number: row.request_number.clone(),
            amount: row.amount,
            currency_code: row.currency_code.clone(),
            expires_at: Some(expires_at),
            quote_url: quote_access_url(&self.config.public_base_url, row.quote_id, &token),
            reminder_number: number,
            total_reminders: total,
        };
        self.notifier
            .send(&notification)
            .await
            .map_err(|e| e.to_string())?;

        self.store
            .record_reminder(row.quote_id, now)
            .await
            .map_err(|e| e.to_string())?;

        tracing::debug!(
            quote_id = row.quote_id,
            reminder = number,
            total,
            "Quote reminder sent",
        );
        Ok(())
    }

    /// Expire the quote and cancel its request. Returns whether the request
    /// was actually cancelled; the expiry notice only goes out in that case.
    async fn auto_cancel(
        &self,
        row: &OpenQuote,
        send_notice: bool,
        now: Timestamp,
    ) -> Result<bool, String> {
        let cancelled = self
            .store
            .expire_and_cancel(row.quote_id, row.request_id)
            .await
            .map_err(|e| e.to_string())?;

        if !cancelled {
            tracing::debug!(
                quote_id = row.quote_id,
                request_id = row.request_id,
                "Request settled before auto-cancel; quote expired only",
            );
            return Ok(false);
        }

        tracing::info!(
            quote_id = row.quote_id,
            request_id = row.request_id,
            "Request auto-cancelled after quote expiry",
        );

        if send_notice {
            let notification = Notification::QuoteExpired {
                to: row.email.clone(),
                customer_name: row.customer_name.clone(),
                request_number: row.request_number.clone(),
                title: row.title.clone(),
                track_url: request_track_url(
                    &self.config.public_base_url,
                    &row.request_number,
                    &row.email,
                ),
            };
            if self.notify(notification).await {
                self.store
                    .mark_expiry_notice_sent(row.quote_id, now)
                    .await
                    .map_err(|e| e.to_string())?;
            }
        }

        Ok(true)
    }

    /// Delete cancelled requests past retention that have no live quote.
    async fn cleanup_cancelled(
        &self,
        settings: &LifecycleSettings,
        now: Timestamp,
    ) -> Result<u64, QuoteError> {
        let stale = self
            .store
            .stale_cancelled_requests(settings.cleanup_cutoff(now), settings.max_batch)
            .await?;
        if stale.is_empty() {
            return Ok(0);
        }

        let live: HashSet<_> = self
            .store
            .requests_with_live_quotes(&stale, now)
            .await?
            .into_iter()
            .collect();
        let doomed = deletable_requests(&stale, &live);
        if doomed.is_empty() {
            return Ok(0);
        }

        let deleted = self.store.delete_requests(&doomed).await?;
        tracing::info!(deleted, "Stale cancelled requests removed");
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;
    use serde_json::json;

    use super::*;

    fn row(status: &str, converted: Option<i64>) -> OpenQuote {
        OpenQuote {
            quote_id: 1,
            request_id: 2,
            version: 1,
            amount: Decimal::from(1000),
            currency_code: "NGN".to_string(),
            expires_at: Some(Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap()),
            reminder_count: 1,
            expired_notification_sent_at: None,
            request_number: "CR-1".to_string(),
            email: "a@b.co".to_string(),
            customer_name: "A".to_string(),
            title: "T".to_string(),
            request_status: status.to_string(),
            converted_order_id: converted,
            superseded: false,
        }
    }

    #[test]
    fn snapshot_marks_paid_or_converted_requests_settled() {
        assert!(!snapshot(&row("quoted", None)).request_settled);
        assert!(snapshot(&row("paid", None)).request_settled);
        assert!(snapshot(&row("awaiting_payment", Some(9))).request_settled);
        assert_eq!(snapshot(&row("quoted", None)).reminder_count, 1);
    }

    #[test]
    fn report_omits_empty_errors() {
        let report = LifecycleReport {
            config: LifecycleSettings::default(),
            scanned: 3,
            reminders_sent: 1,
            quotes_cancelled: 0,
            cleanup_deleted: 0,
            errors: Vec::new(),
        };
        let body = serde_json::to_value(&report).unwrap();
        assert!(body.get("errors").is_none());
        assert_eq!(body["reminders_sent"], json!(1));
        assert_eq!(body["config"]["reminderThresholds"], json!([24.0, 2.0]));
        assert_eq!(body["config"]["maxBatch"], json!(100));
    }
}
