#![allow(dead_code)]

//! In-memory fakes for the quote service ports.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use footprint_core::quote_lifecycle::hours;
use footprint_core::status::{QuoteStatus, RequestStatus};
use footprint_core::types::{DbId, Timestamp};
use footprint_db::models::custom_order_quote::{
    CreateCustomOrderQuote, CustomOrderQuote, OpenQuote,
};
use footprint_db::models::custom_order_request::{CreateCustomOrderRequest, CustomOrderRequest};
use footprint_db::models::order::{ConvertQuoteToOrder, Order};
use footprint_db::models::quote_token::{CreateQuoteToken, CustomOrderQuoteToken};
use footprint_events::{Notification, Notifier, NotifyError};
use footprint_quotes::{
    GatewayError, InitializePayment, PaymentGateway, PaymentSession, QuoteService, QuoteStore,
    ServiceConfig, StoreError, StoreResult, VerifiedTransaction,
};
use rust_decimal::Decimal;
use serde_json::json;

pub const BASE_URL: &str = "https://shop.example";
pub const ADMIN_EMAIL: &str = "admin@dfootprint.example";

/// Fixed "now" used across the suite.
pub fn now() -> Timestamp {
    Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap()
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

#[derive(Default)]
struct State {
    next_id: DbId,
    clock: Option<Timestamp>,
    requests: Vec<CustomOrderRequest>,
    quotes: Vec<CustomOrderQuote>,
    tokens: Vec<CustomOrderQuoteToken>,
    orders: Vec<Order>,
    version_conflict: bool,
    token_failure: bool,
    /// Fail the next conversion; when `true`, a concurrent callback is
    /// simulated by converting the request before failing.
    conversion_failure: Option<bool>,
}

impl State {
    fn id(&mut self) -> DbId {
        self.next_id += 1;
        self.next_id
    }

    fn clock(&self) -> Timestamp {
        self.clock.unwrap_or_else(now)
    }

    fn request_mut(&mut self, id: DbId) -> Option<&mut CustomOrderRequest> {
        self.requests.iter_mut().find(|r| r.id == id)
    }

    fn quote_mut(&mut self, id: DbId) -> Option<&mut CustomOrderQuote> {
        self.quotes.iter_mut().find(|q| q.id == id)
    }

    fn insert_order(&mut self, input: &ConvertQuoteToOrder) -> Order {
        let at = self.clock();
        let order = Order {
            id: self.id(),
            user_id: input.user_id.clone(),
            order_number: input.order_number.clone(),
            email: input.email.clone(),
            phone: input.phone.clone(),
            customer_name: Some(input.customer_name.clone()),
            shipping_address: Some(json!({})),
            billing_address: None,
            status: "processing".to_string(),
            delivery_status: "production".to_string(),
            estimated_arrival: None,
            subtotal_amount: input.amount,
            tax_amount: Decimal::ZERO,
            shipping_amount: Decimal::ZERO,
            discount_amount: Decimal::ZERO,
            coupon_code: None,
            total_amount: input.amount,
            currency_code: input.currency_code.clone(),
            notes: Some(input.notes.clone()),
            tracking_number: None,
            acknowledged_at: None,
            acknowledged_by: None,
            order_type: "custom".to_string(),
            custom_order_request_id: Some(input.request_id),
            created_at: at,
            updated_at: at,
        };
        self.orders.push(order.clone());
        order
    }
}

/// [`QuoteStore`] backed by vectors behind a mutex.
#[derive(Clone, Default)]
pub struct MemoryQuoteStore {
    state: Arc<Mutex<State>>,
}

impl MemoryQuoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    /// Clock used for `created_at`/`updated_at` stamps.
    pub fn set_clock(&self, at: Timestamp) {
        self.lock().clock = Some(at);
    }

    pub fn request(&self, id: DbId) -> CustomOrderRequest {
        self.lock().requests.iter().find(|r| r.id == id).cloned().unwrap()
    }

    pub fn has_request(&self, id: DbId) -> bool {
        self.lock().requests.iter().any(|r| r.id == id)
    }

    pub fn quote(&self, id: DbId) -> CustomOrderQuote {
        self.lock().quotes.iter().find(|q| q.id == id).cloned().unwrap()
    }

    pub fn quotes_for(&self, request_id: DbId) -> Vec<CustomOrderQuote> {
        self.lock()
            .quotes
            .iter()
            .filter(|q| q.request_id == request_id)
            .cloned()
            .collect()
    }

    pub fn tokens_for(&self, quote_id: DbId) -> Vec<CustomOrderQuoteToken> {
        self.lock()
            .tokens
            .iter()
            .filter(|t| t.quote_id == quote_id)
            .cloned()
            .collect()
    }

    pub fn orders(&self) -> Vec<Order> {
        self.lock().orders.clone()
    }

    pub fn update_request(&self, id: DbId, f: impl FnOnce(&mut CustomOrderRequest)) {
        let mut state = self.lock();
        f(state.request_mut(id).unwrap());
    }

    pub fn update_quote(&self, id: DbId, f: impl FnOnce(&mut CustomOrderQuote)) {
        let mut state = self.lock();
        f(state.quote_mut(id).unwrap());
    }

    /// Make the next quote insert lose a version race.
    pub fn force_version_conflict(&self) {
        self.lock().version_conflict = true;
    }

    /// Make the next token insert fail.
    pub fn fail_next_token(&self) {
        self.lock().token_failure = true;
    }

    /// Fail the next conversion. With `converted_elsewhere`, the request is
    /// converted by a "concurrent" callback before the failure.
    pub fn fail_next_conversion(&self, converted_elsewhere: bool) {
        self.lock().conversion_failure = Some(converted_elsewhere);
    }
}

fn unavailable(what: &str) -> StoreError {
    StoreError::Unavailable(what.to_string())
}

#[async_trait]
impl QuoteStore for MemoryQuoteStore {
    async fn create_request(
        &self,
        input: &CreateCustomOrderRequest,
    ) -> StoreResult<CustomOrderRequest> {
        let mut state = self.lock();
        let at = state.clock();
        let request = CustomOrderRequest {
            id: state.id(),
            request_number: input.request_number.clone(),
            user_id: input.user_id.clone(),
            email: input.email.clone(),
            phone: input.phone.clone(),
            customer_name: input.customer_name.clone(),
            title: input.title.clone(),
            description: input.description.clone(),
            size_notes: input.size_notes.clone(),
            color_preferences: input.color_preferences.clone(),
            budget_min: input.budget_min,
            budget_max: input.budget_max,
            desired_date: input.desired_date,
            reference_images: json!(input.reference_images),
            status: RequestStatus::Submitted.as_str().to_string(),
            admin_notes: None,
            customer_notes: input.customer_notes.clone(),
            quoted_amount: None,
            currency_code: "NGN".to_string(),
            quote_expires_at: None,
            paid_at: None,
            converted_order_id: None,
            created_at: at,
            updated_at: at,
        };
        state.requests.push(request.clone());
        Ok(request)
    }

    async fn find_request(&self, id: DbId) -> StoreResult<Option<CustomOrderRequest>> {
        Ok(self.lock().requests.iter().find(|r| r.id == id).cloned())
    }

    async fn find_request_for_tracking(
        &self,
        request_number: &str,
        email: &str,
    ) -> StoreResult<Option<CustomOrderRequest>> {
        Ok(self
            .lock()
            .requests
            .iter()
            .find(|r| {
                r.request_number.eq_ignore_ascii_case(request_number)
                    && r.email.eq_ignore_ascii_case(email)
            })
            .cloned())
    }

    async fn set_request_status(&self, id: DbId, status: RequestStatus) -> StoreResult<()> {
        let mut state = self.lock();
        let at = state.clock();
        if let Some(r) = state.request_mut(id) {
            r.status = status.as_str().to_string();
            r.updated_at = at;
        }
        Ok(())
    }

    async fn create_quote_version(
        &self,
        request_id: DbId,
        input: &CreateCustomOrderQuote,
    ) -> StoreResult<Option<(CustomOrderQuote, CustomOrderRequest)>> {
        let mut state = self.lock();
        if !state.requests.iter().any(|r| r.id == request_id) {
            return Ok(None);
        }
        if std::mem::take(&mut state.version_conflict) {
            return Err(StoreError::DuplicateVersion);
        }

        let version = state
            .quotes
            .iter()
            .filter(|q| q.request_id == request_id)
            .map(|q| q.version)
            .max()
            .unwrap_or(0)
            + 1;
        let at = state.clock();
        let quote = CustomOrderQuote {
            id: state.id(),
            request_id,
            version,
            amount: input.amount,
            currency_code: input.currency_code.clone(),
            breakdown: input.breakdown.clone(),
            note: input.note.clone(),
            status: QuoteStatus::Sent.as_str().to_string(),
            expires_at: Some(input.expires_at),
            reminder_count: 0,
            last_reminder_at: None,
            expired_notification_sent_at: None,
            created_by: input.created_by.clone(),
            created_at: at,
            updated_at: at,
        };
        state.quotes.push(quote.clone());

        let request = state.request_mut(request_id).ok_or_else(|| unavailable("request"))?;
        request.status = RequestStatus::Quoted.as_str().to_string();
        request.quoted_amount = Some(input.amount);
        request.currency_code = input.currency_code.clone();
        request.quote_expires_at = Some(input.expires_at);
        request.updated_at = at;
        Ok(Some((quote, request.clone())))
    }

    async fn find_quote(&self, id: DbId) -> StoreResult<Option<CustomOrderQuote>> {
        Ok(self.lock().quotes.iter().find(|q| q.id == id).cloned())
    }

    async fn latest_quote(&self, request_id: DbId) -> StoreResult<Option<CustomOrderQuote>> {
        Ok(self
            .lock()
            .quotes
            .iter()
            .filter(|q| q.request_id == request_id)
            .max_by_key(|q| q.version)
            .cloned())
    }

    async fn set_quote_status(&self, id: DbId, status: QuoteStatus) -> StoreResult<()> {
        let mut state = self.lock();
        let at = state.clock();
        if let Some(q) = state.quote_mut(id) {
            q.status = status.as_str().to_string();
            q.updated_at = at;
        }
        Ok(())
    }

    async fn insert_token(&self, input: &CreateQuoteToken) -> StoreResult<()> {
        let mut state = self.lock();
        if std::mem::take(&mut state.token_failure) {
            return Err(unavailable("token"));
        }
        let token = CustomOrderQuoteToken {
            id: state.id(),
            quote_id: input.quote_id,
            email: input.email.clone(),
            token_hash: input.token_hash.clone(),
            expires_at: input.expires_at,
            used_at: None,
            created_at: state.clock(),
        };
        state.tokens.push(token);
        Ok(())
    }

    async fn find_valid_token(
        &self,
        quote_id: DbId,
        token_hash: &str,
        now: Timestamp,
    ) -> StoreResult<Option<CustomOrderQuoteToken>> {
        Ok(self
            .lock()
            .tokens
            .iter()
            .find(|t| {
                t.quote_id == quote_id
                    && t.token_hash == token_hash
                    && t.used_at.is_none()
                    && t.expires_at > now
            })
            .cloned())
    }

    async fn list_open_quotes(&self, limit: i64) -> StoreResult<Vec<OpenQuote>> {
        let state = self.lock();
        let is_open = |q: &CustomOrderQuote| {
            QuoteStatus::parse(&q.status).is_some_and(QuoteStatus::is_active)
        };
        let mut open: Vec<OpenQuote> = state
            .quotes
            .iter()
            .filter(|q| is_open(q) && q.expires_at.is_some())
            .filter_map(|q| {
                let r = state.requests.iter().find(|r| r.id == q.request_id)?;
                let superseded = state
                    .quotes
                    .iter()
                    .any(|n| n.request_id == q.request_id && is_open(n) && n.version > q.version);
                Some(OpenQuote {
                    quote_id: q.id,
                    request_id: q.request_id,
                    version: q.version,
                    amount: q.amount,
                    currency_code: q.currency_code.clone(),
                    expires_at: q.expires_at,
                    reminder_count: q.reminder_count,
                    expired_notification_sent_at: q.expired_notification_sent_at,
                    request_number: r.request_number.clone(),
                    email: r.email.clone(),
                    customer_name: r.customer_name.clone(),
                    title: r.title.clone(),
                    request_status: r.status.clone(),
                    converted_order_id: r.converted_order_id,
                    superseded,
                })
            })
            .collect();
        open.sort_by_key(|o| (o.expires_at, o.quote_id));
        open.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(open)
    }

    async fn expire_quote(&self, quote_id: DbId) -> StoreResult<()> {
        let mut state = self.lock();
        if let Some(q) = state.quote_mut(quote_id) {
            if QuoteStatus::parse(&q.status).is_some_and(QuoteStatus::is_active) {
                q.status = QuoteStatus::Expired.as_str().to_string();
            }
        }
        Ok(())
    }

    async fn record_reminder(&self, quote_id: DbId, at: Timestamp) -> StoreResult<()> {
        let mut state = self.lock();
        let q = state.quote_mut(quote_id).ok_or_else(|| unavailable("quote"))?;
        q.reminder_count += 1;
        q.last_reminder_at = Some(at);
        Ok(())
    }

    async fn expire_and_cancel(&self, quote_id: DbId, request_id: DbId) -> StoreResult<bool> {
        let mut state = self.lock();
        let at = state.clock();
        if let Some(q) = state.quote_mut(quote_id) {
            if QuoteStatus::parse(&q.status).is_some_and(QuoteStatus::is_active) {
                q.status = QuoteStatus::Expired.as_str().to_string();
            }
        }
        let Some(r) = state.request_mut(request_id) else {
            return Ok(false);
        };
        if r.status == RequestStatus::Paid.as_str() || r.converted_order_id.is_some() {
            return Ok(false);
        }
        r.status = RequestStatus::Cancelled.as_str().to_string();
        r.updated_at = at;
        Ok(true)
    }

    async fn mark_expiry_notice_sent(&self, quote_id: DbId, at: Timestamp) -> StoreResult<()> {
        let mut state = self.lock();
        if let Some(q) = state.quote_mut(quote_id) {
            q.expired_notification_sent_at = Some(at);
        }
        Ok(())
    }

    async fn stale_cancelled_requests(
        &self,
        cutoff: Timestamp,
        limit: i64,
    ) -> StoreResult<Vec<DbId>> {
        Ok(self
            .lock()
            .requests
            .iter()
            .filter(|r| {
                r.status == RequestStatus::Cancelled.as_str()
                    && r.converted_order_id.is_none()
                    && r.updated_at <= cutoff
            })
            .take(usize::try_from(limit).unwrap_or(0))
            .map(|r| r.id)
            .collect())
    }

    async fn requests_with_live_quotes(
        &self,
        request_ids: &[DbId],
        now: Timestamp,
    ) -> StoreResult<Vec<DbId>> {
        let ids: HashSet<DbId> = request_ids.iter().copied().collect();
        let mut live: Vec<DbId> = self
            .lock()
            .quotes
            .iter()
            .filter(|q| {
                ids.contains(&q.request_id)
                    && QuoteStatus::parse(&q.status).is_some_and(QuoteStatus::is_active)
                    && q.expires_at.map_or(true, |at| at > now)
            })
            .map(|q| q.request_id)
            .collect();
        live.sort_unstable();
        live.dedup();
        Ok(live)
    }

    async fn delete_requests(&self, request_ids: &[DbId]) -> StoreResult<u64> {
        let mut state = self.lock();
        let before = state.requests.len();
        state.requests.retain(|r| !request_ids.contains(&r.id));
        state.quotes.retain(|q| !request_ids.contains(&q.request_id));
        Ok((before - state.requests.len()) as u64)
    }

    async fn find_order_number_by_marker(&self, marker: &str) -> StoreResult<Option<String>> {
        let marker = marker.to_lowercase();
        Ok(self
            .lock()
            .orders
            .iter()
            .find(|o| {
                o.notes
                    .as_deref()
                    .is_some_and(|n| n.to_lowercase().contains(&marker))
            })
            .map(|o| o.order_number.clone()))
    }

    async fn find_order(&self, id: DbId) -> StoreResult<Option<Order>> {
        Ok(self.lock().orders.iter().find(|o| o.id == id).cloned())
    }

    async fn convert_to_order(&self, input: &ConvertQuoteToOrder) -> StoreResult<Order> {
        let mut state = self.lock();

        if let Some(converted_elsewhere) = state.conversion_failure.take() {
            if converted_elsewhere {
                let mut other = input.clone();
                other.order_number = "ORD-CONCURRENT".to_string();
                let order = state.insert_order(&other);
                if let Some(r) = state.request_mut(input.request_id) {
                    r.converted_order_id = Some(order.id);
                    r.status = RequestStatus::Paid.as_str().to_string();
                }
            }
            return Err(unavailable("uq_orders_custom_order_request"));
        }

        let at = state.clock();
        let order = state.insert_order(input);
        if let Some(q) = state.quote_mut(input.quote_id) {
            q.status = QuoteStatus::Paid.as_str().to_string();
        }
        if let Some(r) = state.request_mut(input.request_id) {
            r.status = RequestStatus::Paid.as_str().to_string();
            r.paid_at = Some(at);
            r.converted_order_id = Some(order.id);
            r.quoted_amount = Some(input.amount);
        }
        for t in state
            .tokens
            .iter_mut()
            .filter(|t| t.token_hash == input.token_hash && t.used_at.is_none())
        {
            t.used_at = Some(at);
        }
        Ok(order)
    }
}

// ---------------------------------------------------------------------------
// Notifier
// ---------------------------------------------------------------------------

/// Records every notification; can be told to fail a given kind.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<Notification>>>,
    failing: Arc<Mutex<HashSet<&'static str>>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_of_kind(&self, kind: &str) -> Vec<Notification> {
        self.sent().into_iter().filter(|n| n.kind() == kind).collect()
    }

    pub fn fail_kind(&self, kind: &'static str) {
        self.failing.lock().unwrap().insert(kind);
    }

    pub fn recover_kind(&self, kind: &'static str) {
        self.failing.lock().unwrap().remove(kind);
    }

    /// Wait for a background notification of `kind`.
    pub async fn wait_for(&self, kind: &str) -> Notification {
        for _ in 0..200 {
            if let Some(n) = self.sent_of_kind(kind).pop() {
                return n;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        panic!("no {kind} notification was sent");
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        if self.failing.lock().unwrap().contains(notification.kind()) {
            return Err(NotifyError::Other("smtp unavailable".to_string()));
        }
        self.sent.lock().unwrap().push(notification.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Gateway
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum VerifyScript {
    Transaction(VerifiedTransaction),
    NotConfigured,
    Rejected(String),
}

/// Gateway returning canned answers and recording initialise calls.
#[derive(Clone)]
pub struct ScriptedGateway {
    verify: Arc<Mutex<VerifyScript>>,
    configured: Arc<Mutex<bool>>,
    initialized: Arc<Mutex<Vec<InitializePayment>>>,
    verified: Arc<Mutex<Vec<String>>>,
}

impl Default for ScriptedGateway {
    fn default() -> Self {
        Self {
            verify: Arc::new(Mutex::new(VerifyScript::Rejected("no script".to_string()))),
            configured: Arc::new(Mutex::new(true)),
            initialized: Arc::default(),
            verified: Arc::default(),
        }
    }
}

impl ScriptedGateway {
    pub fn script_verify(&self, script: VerifyScript) {
        *self.verify.lock().unwrap() = script;
    }

    /// Answer verification with a successful payment.
    pub fn pay(&self, amount_minor: i64, quote_id: DbId, request_id: DbId) {
        self.script_verify(VerifyScript::Transaction(VerifiedTransaction {
            status: "success".to_string(),
            amount: Some(amount_minor),
            metadata: json!({
                "custom_quote_id": quote_id,
                "custom_request_id": request_id,
            }),
        }));
    }

    pub fn unconfigure(&self) {
        *self.configured.lock().unwrap() = false;
    }

    pub fn initialized(&self) -> Vec<InitializePayment> {
        self.initialized.lock().unwrap().clone()
    }

    pub fn verified(&self) -> Vec<String> {
        self.verified.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentGateway for ScriptedGateway {
    async fn initialize(&self, input: &InitializePayment) -> Result<PaymentSession, GatewayError> {
        if !*self.configured.lock().unwrap() {
            return Err(GatewayError::NotConfigured);
        }
        let mut calls = self.initialized.lock().unwrap();
        calls.push(input.clone());
        Ok(PaymentSession {
            authorization_url: format!("https://checkout.example/{}", calls.len()),
            reference: format!("ref_{}", calls.len()),
        })
    }

    async fn verify(&self, reference: &str) -> Result<VerifiedTransaction, GatewayError> {
        self.verified.lock().unwrap().push(reference.to_string());
        if !*self.configured.lock().unwrap() {
            return Err(GatewayError::NotConfigured);
        }
        match self.verify.lock().unwrap().clone() {
            VerifyScript::Transaction(tx) => Ok(tx),
            VerifyScript::NotConfigured => Err(GatewayError::NotConfigured),
            VerifyScript::Rejected(msg) => Err(GatewayError::Rejected(msg)),
        }
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

pub struct Harness {
    pub service: QuoteService,
    pub store: MemoryQuoteStore,
    pub notifier: RecordingNotifier,
    pub gateway: ScriptedGateway,
}

pub fn harness() -> Harness {
    let store = MemoryQuoteStore::new();
    let notifier = RecordingNotifier::default();
    let gateway = ScriptedGateway::default();
    let service = QuoteService::new(
        Arc::new(store.clone()),
        Arc::new(notifier.clone()),
        Arc::new(gateway.clone()),
        ServiceConfig {
            public_base_url: BASE_URL.to_string(),
            admin_emails: vec![ADMIN_EMAIL.to_string()],
            feature_enabled: true,
        },
    );
    Harness {
        service,
        store,
        notifier,
        gateway,
    }
}

pub fn new_request() -> footprint_quotes::NewRequest {
    footprint_quotes::NewRequest {
        customer_name: Some("Ada Obi".to_string()),
        email: Some("  Ada@Example.com ".to_string()),
        title: Some("Tan loafers".to_string()),
        description: Some("Hand-stitched, size 42".to_string()),
        reference_images: vec!["https://img.example/1.jpg".to_string()],
        ..Default::default()
    }
}

pub fn new_quote(amount: i64) -> footprint_quotes::NewQuote {
    footprint_quotes::NewQuote {
        amount: Some(Decimal::from(amount)),
        ..Default::default()
    }
}

impl Harness {
    pub async fn submit(&self) -> CustomOrderRequest {
        self.service.submit_request(new_request(), now()).await.unwrap()
    }

    /// Submit a request and quote it, returning the quote and its access token.
    pub async fn quoted(&self, amount: i64, expires_in_hours: f64) -> (CustomOrderQuote, String) {
        let request = self.submit().await;
        self.quote(request.id, amount, expires_in_hours).await
    }

    /// Quote an existing request, returning the quote and its access token.
    pub async fn quote(
        &self,
        request_id: DbId,
        amount: i64,
        expires_in_hours: f64,
    ) -> (CustomOrderQuote, String) {
        let mut input = new_quote(amount);
        input.expires_at = Some((now() + hours(expires_in_hours)).to_rfc3339());
        let quote = self
            .service
            .create_quote(request_id, input, ADMIN_EMAIL, now())
            .await
            .unwrap();
        let token = self.token_for(quote.id).await;
        (quote, token)
    }

    /// Pull the plaintext token out of the latest quote email for `quote_id`.
    pub async fn token_for(&self, quote_id: DbId) -> String {
        let marker = format!("quoteId={quote_id}&token=");
        for _ in 0..200 {
            let found = self.notifier.sent().into_iter().rev().find_map(|n| match n {
                Notification::QuoteSent { quote_url, .. }
                | Notification::QuoteReminder { quote_url, .. } => quote_url
                    .split_once(&marker)
                    .map(|(_, token)| token.to_string()),
                _ => None,
            });
            if let Some(token) = found {
                return token;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        panic!("no access link sent for quote {quote_id}");
    }
}
