//! Shared mocks for payment handler tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use secrecy::SecretString;

use crate::adapters::memory::{
    InMemoryFulfillmentBacklog, InMemoryOfferCatalog, InMemoryOrderRepository,
};
use crate::domain::foundation::{CourseId, DomainError, ErrorCode, ModuleId, OrderId, StudentId};
use crate::domain::order::{Order, OrderStatus, Transaction};
use crate::domain::payment::{
    fixtures::approved_callback, sign_test_callback, CallbackVerifier, GeneratePaymentLinkInput,
    PaymentError, ValidatedCallback,
};
use crate::ports::{
    AccessGrantor, EmailMessage, NotificationSender, OfferEntitlements, OrderRepository,
    PaymentProvider, TransitionResult,
};

use super::{OrderFulfiller, PaymentLinkSettings};

pub const TEST_SECRET: &str = "test";

// ════════════════════════════════════════════════════════════════════════════
// Mock Implementations
// ════════════════════════════════════════════════════════════════════════════

#[derive(Default)]
pub struct MockAccessGrantor {
    grants: Mutex<Vec<(StudentId, Vec<CourseId>, Vec<ModuleId>)>>,
    fail: AtomicBool,
}

impl MockAccessGrantor {
    pub fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn grant_count(&self) -> usize {
        self.grants.lock().unwrap().len()
    }

    pub fn grants(&self) -> Vec<(StudentId, Vec<CourseId>, Vec<ModuleId>)> {
        self.grants.lock().unwrap().clone()
    }
}

#[async_trait]
impl AccessGrantor for MockAccessGrantor {
    async fn grant_access(
        &self,
        student_id: &StudentId,
        course_ids: &[CourseId],
        module_ids: &[ModuleId],
    ) -> Result<(), DomainError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(DomainError::database("students table unavailable"));
        }
        self.grants
            .lock()
            .unwrap()
            .push((*student_id, course_ids.to_vec(), module_ids.to_vec()));
        Ok(())
    }
}

#[derive(Default)]
pub struct MockNotificationSender {
    sent: Mutex<Vec<EmailMessage>>,
    fail: AtomicBool,
}

impl MockNotificationSender {
    pub fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSender for MockNotificationSender {
    async fn send(&self, message: &EmailMessage) -> Result<(), DomainError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(DomainError::new(
                ErrorCode::ExternalServiceError,
                "mail service unavailable",
            ));
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

/// Mail service that accepts the connection and never answers.
#[derive(Default)]
pub struct StalledNotificationSender;

#[async_trait]
impl NotificationSender for StalledNotificationSender {
    async fn send(&self, _message: &EmailMessage) -> Result<(), DomainError> {
        std::future::pending().await
    }
}

/// Verifies callbacks for real; link generation is scripted.
pub struct MockPaymentProvider {
    verifier: CallbackVerifier,
    link_failure: Mutex<Option<String>>,
    link_requests: Mutex<Vec<GeneratePaymentLinkInput>>,
}

impl Default for MockPaymentProvider {
    fn default() -> Self {
        Self {
            verifier: CallbackVerifier::new(SecretString::new(TEST_SECRET.to_string())),
            link_failure: Mutex::new(None),
            link_requests: Mutex::new(Vec::new()),
        }
    }
}

impl MockPaymentProvider {
    pub fn fail_links_with(&self, message: &str) {
        *self.link_failure.lock().unwrap() = Some(message.to_string());
    }

    pub fn link_requests(&self) -> Vec<GeneratePaymentLinkInput> {
        self.link_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentProvider for MockPaymentProvider {
    async fn generate_payment_link(
        &self,
        input: GeneratePaymentLinkInput,
    ) -> Result<String, PaymentError> {
        let order_id = input.order_id;
        self.link_requests.lock().unwrap().push(input);
        match self.link_failure.lock().unwrap().clone() {
            Some(message) => Err(PaymentError::provider(message)),
            None => Ok(format!("https://pay.test/checkout/{}", order_id)),
        }
    }

    fn verify_callback(&self, payload: &[u8]) -> Result<ValidatedCallback, PaymentError> {
        self.verifier.verify_and_parse(payload)
    }
}

/// Order store that is down. Counts how often it was asked.
#[derive(Default)]
pub struct FailingOrderRepository {
    calls: AtomicUsize,
}

impl FailingOrderRepository {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn fail(&self) -> DomainError {
        self.calls.fetch_add(1, Ordering::SeqCst);
        DomainError::database("connection refused")
    }
}

#[async_trait]
impl OrderRepository for FailingOrderRepository {
    async fn create(&self, _order: &Order) -> Result<(), DomainError> {
        Err(self.fail())
    }

    async fn find_by_id(&self, _id: &OrderId) -> Result<Option<Order>, DomainError> {
        Err(self.fail())
    }

    async fn transition_if_created(
        &self,
        _id: &OrderId,
        _target: OrderStatus,
        _transaction: Transaction,
    ) -> Result<TransitionResult, DomainError> {
        Err(self.fail())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Fixture
// ════════════════════════════════════════════════════════════════════════════

pub struct Fixture {
    pub orders: Arc<InMemoryOrderRepository>,
    pub offers: Arc<InMemoryOfferCatalog>,
    pub access: Arc<MockAccessGrantor>,
    pub notifier: Arc<MockNotificationSender>,
    pub backlog: Arc<InMemoryFulfillmentBacklog>,
    pub provider: Arc<MockPaymentProvider>,
}

impl Fixture {
    /// The order store enqueues paid orders into `backlog`.
    pub fn new() -> Self {
        let backlog = Arc::new(InMemoryFulfillmentBacklog::new());
        Self {
            orders: Arc::new(InMemoryOrderRepository::with_backlog(backlog.clone())),
            offers: Arc::new(InMemoryOfferCatalog::new()),
            access: Arc::new(MockAccessGrantor::default()),
            notifier: Arc::new(MockNotificationSender::default()),
            backlog,
            provider: Arc::new(MockPaymentProvider::default()),
        }
    }

    /// Catalog knows the order's offer: one course, two modules.
    pub async fn with_offer_for(order: &Order) -> Self {
        let fx = Self::new();
        fx.offers
            .insert_offer(OfferEntitlements {
                offer_id: order.offer.id,
                school_id: order.school_id,
                name: order.offer.name.clone(),
                amount: order.amount,
                currency: order.currency.clone(),
                course_ids: vec![CourseId::new()],
                module_ids: vec![ModuleId::new(), ModuleId::new()],
            })
            .await;
        fx
    }

    /// Stores the order and registers its offer.
    pub async fn with_order(order: &Order) -> Self {
        let fx = Self::with_offer_for(order).await;
        fx.orders.create(order).await.unwrap();
        fx
    }

    pub fn fulfiller(&self) -> Arc<OrderFulfiller> {
        Arc::new(OrderFulfiller::new(
            self.offers.clone(),
            self.access.clone(),
            self.notifier.clone(),
        ))
    }

    pub fn link_settings(&self) -> PaymentLinkSettings {
        PaymentLinkSettings {
            callback_url: Some("https://api.test/api/v1/callback/fondy".to_string()),
            response_url: Some("https://school.test/thanks".to_string()),
        }
    }

    pub async fn stored(&self, id: &OrderId) -> Order {
        self.orders.find_by_id(id).await.unwrap().unwrap()
    }
}

/// A correctly signed callback body for `order_id` with `order_status`.
pub fn signed_callback(order_id: OrderId, order_status: &str) -> Vec<u8> {
    let mut callback = approved_callback(order_id);
    callback.order_status = order_status.to_string();
    sign_test_callback(&mut callback, TEST_SECRET);
    serde_json::to_vec(&callback).unwrap()
}
