//! In-memory offer catalog.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, OfferId, SchoolId};
use crate::ports::{OfferCatalog, OfferEntitlements, PromoCode};

#[derive(Default)]
pub struct InMemoryOfferCatalog {
    offers: RwLock<HashMap<OfferId, OfferEntitlements>>,
    promos: RwLock<HashMap<(SchoolId, String), PromoCode>>,
}

impl InMemoryOfferCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_offer(&self, offer: OfferEntitlements) {
        self.offers.write().await.insert(offer.offer_id, offer);
    }

    pub async fn insert_promo(&self, school_id: SchoolId, promo: PromoCode) {
        self.promos
            .write()
            .await
            .insert((school_id, promo.code.clone()), promo);
    }
}

#[async_trait]
impl OfferCatalog for InMemoryOfferCatalog {
    async fn find_entitlements(
        &self,
        offer_id: &OfferId,
    ) -> Result<Option<OfferEntitlements>, DomainError> {
        Ok(self.offers.read().await.get(offer_id).cloned())
    }

    async fn find_promo(
        &self,
        school_id: &SchoolId,
        code: &str,
    ) -> Result<Option<PromoCode>, DomainError> {
        Ok(self
            .promos
            .read()
            .await
            .get(&(*school_id, code.to_string()))
            .cloned())
    }
}
