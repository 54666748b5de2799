//! Offer catalog port.
//!
//! Read-only view of what can be bought: an offer's price and the courses
//! and modules it unlocks, plus the school's promo codes.

use async_trait::async_trait;

use crate::domain::foundation::{CourseId, DomainError, ModuleId, OfferId, PromoId, SchoolId};
use crate::domain::order::Currency;

/// What buying an offer gives the student.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfferEntitlements {
    pub offer_id: OfferId,
    pub school_id: SchoolId,
    pub name: String,
    /// Price in minor currency units.
    pub amount: u64,
    pub currency: Currency,
    pub course_ids: Vec<CourseId>,
    pub module_ids: Vec<ModuleId>,
}

/// A promo code that discounts an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromoCode {
    pub id: PromoId,
    pub code: String,
    /// Whole percent, 0 to 100.
    pub discount_percentage: u8,
    /// Offers the code applies to. Empty means every offer of the school.
    pub offer_ids: Vec<OfferId>,
}

impl PromoCode {
    pub fn applies_to(&self, offer_id: &OfferId) -> bool {
        self.offer_ids.is_empty() || self.offer_ids.contains(offer_id)
    }
}

/// Port for resolving offers and promo codes.
#[async_trait]
pub trait OfferCatalog: Send + Sync {
    /// Returns `None` if the offer doesn't exist.
    async fn find_entitlements(
        &self,
        offer_id: &OfferId,
    ) -> Result<Option<OfferEntitlements>, DomainError>;

    /// Looks up an active promo code by its text within a school.
    ///
    /// Returns `None` if the code is unknown or expired.
    async fn find_promo(
        &self,
        school_id: &SchoolId,
        code: &str,
    ) -> Result<Option<PromoCode>, DomainError>;
}
