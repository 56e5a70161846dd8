//! In-memory payment gateway for tests.
//!
//! Supports:
//! - Pre-configured plans
//! - Error injection per method
//! - Call tracking and captured create requests
//!
//! Clones share state, so a test can keep one handle while the code under
//! test holds another through [`MockConnector`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use secrecy::ExposeSecret;

use crate::domain::tenant::GatewayCredentials;
use crate::ports::{
    CancelOptions, CreateSubscriptionRequest, GatewayConnector, GatewayError, GatewayPlan,
    GatewaySubscription, PaymentGateway, PlanItem,
};

#[derive(Clone, Default)]
pub struct MockGateway {
    inner: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    plans: HashMap<String, GatewayPlan>,
    subscriptions: HashMap<String, GatewaySubscription>,
    created: Vec<CreateSubscriptionRequest>,
    sequence: u32,
    method_errors: HashMap<String, GatewayError>,
    call_log: Vec<MethodCall>,
}

/// Recorded method call for assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodCall {
    pub method: String,
    pub args: Vec<String>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Configuration Methods
    // ════════════════════════════════════════════════════════════════════════════

    /// Registers a plan returned by `fetch_plan`.
    pub fn with_plan(self, plan: GatewayPlan) -> Self {
        self.add_plan(plan);
        self
    }

    pub fn add_plan(&self, plan: GatewayPlan) {
        self.inner
            .lock()
            .unwrap()
            .plans
            .insert(plan.id.clone(), plan);
    }

    /// Registers a plan by amount and period.
    pub fn add_simple_plan(&self, id: &str, amount: i64, period: &str) {
        self.add_plan(GatewayPlan {
            id: id.to_string(),
            period: period.to_string(),
            interval: 1,
            item: PlanItem {
                name: Some(format!("{} plan", id)),
                amount,
                currency: "INR".to_string(),
            },
        });
    }

    /// Makes every call to `method` fail with `error`.
    pub fn set_method_error(&self, method: &str, error: GatewayError) {
        self.inner
            .lock()
            .unwrap()
            .method_errors
            .insert(method.to_string(), error);
    }

    pub fn clear_errors(&self) {
        self.inner.lock().unwrap().method_errors.clear();
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Assertion Helpers
    // ════════════════════════════════════════════════════════════════════════════

    pub fn calls(&self) -> Vec<MethodCall> {
        self.inner.lock().unwrap().call_log.clone()
    }

    pub fn call_count(&self, method: &str) -> usize {
        self.inner
            .lock()
            .unwrap()
            .call_log
            .iter()
            .filter(|c| c.method == method)
            .count()
    }

    pub fn was_called(&self, method: &str) -> bool {
        self.call_count(method) > 0
    }

    /// Create requests in the order received.
    pub fn created_requests(&self) -> Vec<CreateSubscriptionRequest> {
        self.inner.lock().unwrap().created.clone()
    }

    pub fn last_created_request(&self) -> Option<CreateSubscriptionRequest> {
        self.inner.lock().unwrap().created.last().cloned()
    }

    pub fn subscription(&self, id: &str) -> Option<GatewaySubscription> {
        self.inner.lock().unwrap().subscriptions.get(id).cloned()
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Internal Helpers
    // ════════════════════════════════════════════════════════════════════════════

    fn record(&self, method: &str, args: Vec<String>) -> Result<(), GatewayError> {
        let mut state = self.inner.lock().unwrap();
        state.call_log.push(MethodCall {
            method: method.to_string(),
            args,
        });
        match state.method_errors.get(method) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn create_subscription(
        &self,
        request: &CreateSubscriptionRequest,
    ) -> Result<GatewaySubscription, GatewayError> {
        self.record("create_subscription", vec![request.plan_id.clone()])?;

        let mut state = self.inner.lock().unwrap();
        state.sequence += 1;
        let subscription = GatewaySubscription {
            id: format!("sub_mock_{}", state.sequence),
            plan_id: request.plan_id.clone(),
            status: "created".to_string(),
            short_url: Some(format!("https://rzp.io/i/mock{}", state.sequence)),
            customer_id: None,
        };
        state.created.push(request.clone());
        state
            .subscriptions
            .insert(subscription.id.clone(), subscription.clone());
        Ok(subscription)
    }

    async fn fetch_plan(&self, plan_id: &str) -> Result<GatewayPlan, GatewayError> {
        self.record("fetch_plan", vec![plan_id.to_string()])?;

        self.inner
            .lock()
            .unwrap()
            .plans
            .get(plan_id)
            .cloned()
            .ok_or_else(|| GatewayError::invalid_request("The id provided does not exist"))
    }

    async fn fetch_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<GatewaySubscription, GatewayError> {
        self.record("fetch_subscription", vec![subscription_id.to_string()])?;

        self.inner
            .lock()
            .unwrap()
            .subscriptions
            .get(subscription_id)
            .cloned()
            .ok_or_else(|| GatewayError::not_found("subscription"))
    }

    async fn cancel_subscription(
        &self,
        subscription_id: &str,
        options: CancelOptions,
    ) -> Result<GatewaySubscription, GatewayError> {
        self.record(
            "cancel_subscription",
            vec![subscription_id.to_string(), options.at_cycle_end.to_string()],
        )?;

        let mut state = self.inner.lock().unwrap();
        let subscription = state
            .subscriptions
            .entry(subscription_id.to_string())
            .or_insert_with(|| GatewaySubscription {
                id: subscription_id.to_string(),
                plan_id: String::new(),
                status: "created".to_string(),
                short_url: None,
                customer_id: None,
            });
        subscription.status = "cancelled".to_string();
        Ok(subscription.clone())
    }
}

/// Connector that hands out clones of one [`MockGateway`] and counts connects.
#[derive(Default)]
pub struct MockConnector {
    gateway: MockGateway,
    connects: AtomicUsize,
    key_ids: Mutex<Vec<String>>,
}

impl MockConnector {
    pub fn new(gateway: MockGateway) -> Self {
        Self {
            gateway,
            connects: AtomicUsize::new(0),
            key_ids: Mutex::new(Vec::new()),
        }
    }

    pub fn gateway(&self) -> &MockGateway {
        &self.gateway
    }

    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    /// Key ids of every connect, in order.
    pub fn connected_key_ids(&self) -> Vec<String> {
        self.key_ids.lock().unwrap().clone()
    }
}

impl GatewayConnector for MockConnector {
    fn connect(
        &self,
        credentials: &GatewayCredentials,
    ) -> Result<Arc<dyn PaymentGateway>, GatewayError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        self.key_ids
            .lock()
            .unwrap()
            .push(credentials.key_id().expose_secret().clone());
        Ok(Arc::new(self.gateway.clone()))
    }
}
