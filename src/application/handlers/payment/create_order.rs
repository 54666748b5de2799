//! CreateOrderHandler - Command handler for starting a purchase.
//!
//! Prices the offer (applying a promo code if given), stores a `Created`
//! order with student/offer/promo snapshots, then asks the provider for a
//! checkout link.

use std::sync::Arc;

use crate::domain::foundation::{OfferId, OrderId, SchoolId};
use crate::domain::order::{discounted_amount, OfferSnapshot, Order, PromoSnapshot, StudentSnapshot};
use crate::domain::payment::PaymentError;
use crate::ports::{OfferCatalog, OrderRepository, PaymentProvider};

use super::generate_payment_link::PaymentLinkSettings;

/// Command to create an order.
#[derive(Debug, Clone)]
pub struct CreateOrderCommand {
    pub school_id: SchoolId,
    pub student: StudentSnapshot,
    pub offer_id: OfferId,
    pub promo_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateOrderResult {
    pub order_id: OrderId,
    pub amount: u64,
    pub currency: String,
    pub checkout_url: String,
}

/// Handler for creating orders.
pub struct CreateOrderHandler {
    orders: Arc<dyn OrderRepository>,
    offers: Arc<dyn OfferCatalog>,
    payment_provider: Arc<dyn PaymentProvider>,
    settings: PaymentLinkSettings,
}

impl CreateOrderHandler {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        offers: Arc<dyn OfferCatalog>,
        payment_provider: Arc<dyn PaymentProvider>,
        settings: PaymentLinkSettings,
    ) -> Self {
        Self {
            orders,
            offers,
            payment_provider,
            settings,
        }
    }

    pub async fn handle(&self, cmd: CreateOrderCommand) -> Result<CreateOrderResult, PaymentError> {
        // 1. Resolve the offer within the school
        let offer = self
            .offers
            .find_entitlements(&cmd.offer_id)
            .await?
            .filter(|o| o.school_id == cmd.school_id)
            .ok_or(PaymentError::OfferNotFound(cmd.offer_id))?;

        // 2. Price it
        let mut amount = offer.amount;
        let mut promo = None;
        if let Some(code) = cmd.promo_code.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            let found = self
                .offers
                .find_promo(&cmd.school_id, code)
                .await?
                .filter(|p| p.applies_to(&offer.offer_id))
                .ok_or_else(|| PaymentError::Validation {
                    field: "promo_code".to_string(),
                    message: format!("Promo code '{}' is not valid for this offer", code),
                })?;
            amount = discounted_amount(amount, found.discount_percentage)?;
            promo = Some(PromoSnapshot {
                id: found.id,
                code: found.code,
            });
        }

        // 3. Persist
        let order = Order::create(
            OrderId::new(),
            cmd.school_id,
            cmd.student,
            OfferSnapshot {
                id: offer.offer_id,
                name: offer.name,
            },
            promo,
            amount,
            offer.currency,
        )?;
        self.orders.create(&order).await?;

        tracing::info!(
            order_id = %order.id,
            offer_id = %order.offer.id,
            amount = order.amount,
            currency = %order.currency,
            promo = order.promo.as_ref().map(|p| p.code.as_str()).unwrap_or(""),
            "Order created"
        );

        // 4. Checkout link; the order stays `Created` if this fails and a
        //    link can be requested again later.
        let checkout_url = self
            .payment_provider
            .generate_payment_link(self.settings.input_for(&order))
            .await?;

        Ok(CreateOrderResult {
            order_id: order.id,
            amount: order.amount,
            currency: order.currency.to_string(),
            checkout_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::domain::foundation::{CourseId, PromoId};
    use crate::domain::order::{fixtures::student, Currency, OrderStatus};
    use crate::ports::{OfferEntitlements, PromoCode};

    struct Setup {
        fx: Fixture,
        school_id: SchoolId,
        offer_id: OfferId,
    }

    async fn setup() -> Setup {
        let fx = Fixture::new();
        let school_id = SchoolId::new();
        let offer_id = OfferId::new();
        fx.offers
            .insert_offer(OfferEntitlements {
                offer_id,
                school_id,
                name: "Backend course".to_string(),
                amount: 10_000,
                currency: Currency::new("UAH").unwrap(),
                course_ids: vec![CourseId::new()],
                module_ids: vec![],
            })
            .await;
        Setup {
            fx,
            school_id,
            offer_id,
        }
    }

    fn handler(fx: &Fixture) -> CreateOrderHandler {
        CreateOrderHandler::new(
            fx.orders.clone(),
            fx.offers.clone(),
            fx.provider.clone(),
            fx.link_settings(),
        )
    }

    fn command(s: &Setup, promo: Option<&str>) -> CreateOrderCommand {
        CreateOrderCommand {
            school_id: s.school_id,
            student: student(),
            offer_id: s.offer_id,
            promo_code: promo.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn creates_order_at_full_price() {
        let s = setup().await;

        let result = handler(&s.fx).handle(command(&s, None)).await.unwrap();

        assert_eq!(result.amount, 10_000);
        assert_eq!(result.currency, "UAH");
        let stored = s.fx.stored(&result.order_id).await;
        assert_eq!(stored.status, OrderStatus::Created);
        assert_eq!(stored.offer.name, "Backend course");
        assert!(stored.promo.is_none());
        assert_eq!(s.fx.provider.link_requests()[0].order_id, result.order_id);
    }

    #[tokio::test]
    async fn applies_promo_discount() {
        let s = setup().await;
        s.fx.offers
            .insert_promo(
                s.school_id,
                PromoCode {
                    id: PromoId::new(),
                    code: "SPRING".to_string(),
                    discount_percentage: 25,
                    offer_ids: vec![s.offer_id],
                },
            )
            .await;

        let result = handler(&s.fx)
            .handle(command(&s, Some(" SPRING ")))
            .await
            .unwrap();

        assert_eq!(result.amount, 7_500);
        let stored = s.fx.stored(&result.order_id).await;
        assert_eq!(stored.promo.unwrap().code, "SPRING");
    }

    #[tokio::test]
    async fn unknown_promo_is_validation_error() {
        let s = setup().await;

        let result = handler(&s.fx).handle(command(&s, Some("NOPE"))).await;

        match result {
            Err(PaymentError::Validation { field, .. }) => assert_eq!(field, "promo_code"),
            other => panic!("unexpected {:?}", other),
        }
        assert!(s.fx.orders.is_empty().await);
    }

    #[tokio::test]
    async fn promo_for_another_offer_is_rejected() {
        let s = setup().await;
        s.fx.offers
            .insert_promo(
                s.school_id,
                PromoCode {
                    id: PromoId::new(),
                    code: "OTHER".to_string(),
                    discount_percentage: 50,
                    offer_ids: vec![OfferId::new()],
                },
            )
            .await;

        let result = handler(&s.fx).handle(command(&s, Some("OTHER"))).await;
        assert!(matches!(result, Err(PaymentError::Validation { .. })));
    }

    #[tokio::test]
    async fn full_discount_is_rejected() {
        let s = setup().await;
        s.fx.offers
            .insert_promo(
                s.school_id,
                PromoCode {
                    id: PromoId::new(),
                    code: "FREE".to_string(),
                    discount_percentage: 100,
                    offer_ids: vec![],
                },
            )
            .await;

        let result = handler(&s.fx).handle(command(&s, Some("FREE"))).await;

        match result {
            Err(PaymentError::Validation { field, .. }) => assert_eq!(field, "amount"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn offer_of_another_school_is_not_found() {
        let s = setup().await;
        let mut cmd = command(&s, None);
        cmd.school_id = SchoolId::new();

        let result = handler(&s.fx).handle(cmd).await;
        assert!(matches!(result, Err(PaymentError::OfferNotFound(_))));
    }

    #[tokio::test]
    async fn provider_failure_leaves_created_order() {
        let s = setup().await;
        s.fx.provider.fail_links_with("Invalid merchant_id");

        let result = handler(&s.fx).handle(command(&s, None)).await;

        assert!(matches!(result, Err(PaymentError::ProviderError { .. })));
        assert_eq!(s.fx.orders.len().await, 1);
    }
}
