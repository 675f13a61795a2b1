//! Price list and the price-change approval workflow
//!
//! ```text
//! minister:  propose(changes) ──► pending request(s)
//! admin:     approve(id) ──► approved, newPrice copied into the catalog
//!            reject(id, reason) ──► rejected, catalog untouched
//! admin:     update(changes) ──► catalog changed directly, no requests
//! ```
//!
//! Requests leave the pending state exactly once.

use serde::Serialize;

use crate::store::error::{Entity, StoreError, StoreResult};
use crate::store::review::{self, ReviewStatus, ReviewTrail};
use crate::store::types::{next_id, today, Actor};

/// Reason stored when a rejection does not give one
pub const DEFAULT_REJECTION_REASON: &str = "Отклонено администрацией";

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Service {
    pub id: u64,
    pub name: String,
    pub price: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ServiceCategory {
    pub id: String,
    pub name: String,
    pub services: Vec<Service>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PriceChangeRequest {
    pub id: u64,
    pub service_id: u64,
    pub service_name: String,
    pub old_price: i64,
    pub new_price: i64,
    pub requested_by: Option<String>,
    pub requested_by_id: Option<u64>,
    pub requested_by_name: Option<String>,
    pub status: ReviewStatus,
    pub created_at: String,
    #[serde(flatten)]
    pub review: ReviewTrail,
}

/// A requested price for one service
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceChange {
    pub service_id: u64,
    pub new_price: i64,
}

#[derive(Debug, Default)]
pub struct PriceBook {
    categories: Vec<ServiceCategory>,
    requests: Vec<PriceChangeRequest>,
}

impl PriceBook {
    pub fn new(categories: Vec<ServiceCategory>) -> Self {
        Self {
            categories,
            requests: Vec::new(),
        }
    }

    pub fn catalog(&self) -> &[ServiceCategory] {
        &self.categories
    }

    pub fn category(&self, id: &str) -> Option<&ServiceCategory> {
        self.categories.iter().find(|c| c.id == id)
    }

    /// Every live service, in catalog order
    pub fn all_services(&self) -> Vec<Service> {
        self.categories
            .iter()
            .flat_map(|c| c.services.iter().cloned())
            .collect()
    }

    /// Services of one category; empty when the category is unknown
    pub fn services_in(&self, category: &str) -> Vec<Service> {
        self.category(category)
            .map(|c| c.services.clone())
            .unwrap_or_default()
    }

    pub fn service(&self, id: u64) -> Option<&Service> {
        self.categories
            .iter()
            .flat_map(|c| c.services.iter())
            .find(|s| s.id == id)
    }

    fn service_mut(&mut self, id: u64) -> Option<&mut Service> {
        self.categories
            .iter_mut()
            .flat_map(|c| c.services.iter_mut())
            .find(|s| s.id == id)
    }

    pub fn requests(&self) -> &[PriceChangeRequest] {
        &self.requests
    }

    pub fn pending_count(&self) -> usize {
        self.requests
            .iter()
            .filter(|r| r.status == ReviewStatus::Pending)
            .count()
    }

    /// Check every change before anything is written
    fn validate(&self, changes: &[PriceChange]) -> StoreResult<()> {
        if changes.is_empty() {
            return Err(StoreError::invalid("Нет изменений цен"));
        }
        for change in changes {
            if change.new_price <= 0 {
                return Err(StoreError::invalid(
                    "Цена должна быть положительным числом",
                ));
            }
            if self.service(change.service_id).is_none() {
                return Err(StoreError::NotFound(Entity::Service));
            }
        }
        Ok(())
    }

    /// Open a pending request per change. Nothing is created if any service
    /// is unknown.
    pub fn propose(
        &mut self,
        changes: &[PriceChange],
        requester: &Actor,
    ) -> StoreResult<Vec<PriceChangeRequest>> {
        self.validate(changes)?;

        let mut created = Vec::with_capacity(changes.len());
        for change in changes {
            let Some(service) = self.service(change.service_id) else {
                return Err(StoreError::NotFound(Entity::Service));
            };

            let request = PriceChangeRequest {
                id: next_id(self.requests.iter().map(|r| r.id)),
                service_id: service.id,
                service_name: service.name.clone(),
                old_price: service.price,
                new_price: change.new_price,
                requested_by: requester.role.clone(),
                requested_by_id: requester.id,
                requested_by_name: requester.name.clone(),
                status: ReviewStatus::Pending,
                created_at: today(),
                review: ReviewTrail::default(),
            };
            self.requests.push(request.clone());
            created.push(request);
        }

        Ok(created)
    }

    /// Approve a pending request and apply its price to the catalog
    pub fn approve(&mut self, request_id: u64, reviewer: &Actor) -> StoreResult<PriceChangeRequest> {
        let index = self.request_index(request_id)?;
        let (service_id, new_price) = {
            let request = &self.requests[index];
            (request.service_id, request.new_price)
        };

        if self.service(service_id).is_none() {
            return Err(StoreError::NotFound(Entity::Service));
        }

        let request = &mut self.requests[index];
        review::approve(
            &mut request.status,
            &mut request.review,
            reviewer,
            Entity::PriceRequest,
        )?;
        let approved = request.clone();

        if let Some(service) = self.service_mut(service_id) {
            service.price = new_price;
        }

        Ok(approved)
    }

    /// Reject a pending request; the catalog is left unchanged
    pub fn reject(
        &mut self,
        request_id: u64,
        reviewer: &Actor,
        reason: Option<String>,
    ) -> StoreResult<PriceChangeRequest> {
        let index = self.request_index(request_id)?;
        let reason = reason
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_REJECTION_REASON.to_string());

        let request = &mut self.requests[index];
        review::reject(
            &mut request.status,
            &mut request.review,
            reviewer,
            Some(reason),
            Entity::PriceRequest,
        )?;
        Ok(request.clone())
    }

    /// Set prices directly, bypassing the request workflow
    pub fn update(&mut self, changes: &[PriceChange]) -> StoreResult<usize> {
        self.validate(changes)?;
        for change in changes {
            if let Some(service) = self.service_mut(change.service_id) {
                service.price = change.new_price;
            }
        }
        Ok(changes.len())
    }

    fn request_index(&self, id: u64) -> StoreResult<usize> {
        self.requests
            .iter()
            .position(|r| r.id == id)
            .ok_or(StoreError::NotFound(Entity::PriceRequest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book() -> PriceBook {
        PriceBook::new(vec![
            ServiceCategory {
                id: "basic".to_string(),
                name: "Основные услуги".to_string(),
                services: vec![
                    Service { id: 1, name: "Лечение".to_string(), price: 60000 },
                    Service { id: 4, name: "Вывод наркозависимости".to_string(), price: 150000 },
                ],
            },
            ServiceCategory {
                id: "additional".to_string(),
                name: "Дополнительные услуги".to_string(),
                services: vec![Service { id: 3, name: "Рецепт (1 шт.)".to_string(), price: 30000 }],
            },
        ])
    }

    fn minister() -> Actor {
        Actor::new(4, "minister", "Елена Смирнова")
    }

    fn admin() -> Actor {
        Actor::new(1, "main_supervisor", "Admin")
    }

    fn change(service_id: u64, new_price: i64) -> PriceChange {
        PriceChange { service_id, new_price }
    }

    #[test]
    fn test_propose_creates_pending_requests() {
        let mut book = book();
        let created = book
            .propose(&[change(1, 65000), change(3, 35000)], &minister())
            .unwrap();

        assert_eq!(created.len(), 2);
        assert_eq!(created[0].id, 1);
        assert_eq!(created[1].id, 2);
        assert_eq!(created[0].old_price, 60000);
        assert_eq!(created[0].service_name, "Лечение");
        assert!(created.iter().all(|r| r.status == ReviewStatus::Pending));
        // catalog untouched until approval
        assert_eq!(book.service(1).unwrap().price, 60000);
        assert_eq!(book.pending_count(), 2);
    }

    #[test]
    fn test_propose_unknown_service_creates_nothing() {
        let mut book = book();
        let err = book
            .propose(&[change(1, 65000), change(99, 1)], &minister())
            .unwrap_err();
        assert_eq!(err, StoreError::NotFound(Entity::Service));
        assert!(book.requests().is_empty());
    }

    #[test]
    fn test_propose_rejects_non_positive_price() {
        let mut book = book();
        assert!(matches!(
            book.propose(&[change(1, 0)], &minister()),
            Err(StoreError::Invalid(_))
        ));
        assert!(book.propose(&[], &minister()).is_err());
    }

    #[test]
    fn test_approve_updates_only_target_service() {
        let mut book = book();
        let before: Vec<Service> = book.all_services();
        let request = book.propose(&[change(4, 175000)], &minister()).unwrap().remove(0);

        let approved = book.approve(request.id, &admin()).unwrap();
        assert_eq!(approved.status, ReviewStatus::Approved);
        assert_eq!(approved.review.approved_by_name.as_deref(), Some("Admin"));

        for service in book.all_services() {
            let original = before.iter().find(|s| s.id == service.id).unwrap();
            if service.id == 4 {
                assert_eq!(service.price, 175000);
            } else {
                assert_eq!(service.price, original.price);
            }
        }
    }

    #[test]
    fn test_approve_twice_conflicts() {
        let mut book = book();
        let request = book.propose(&[change(1, 70000)], &minister()).unwrap().remove(0);
        book.approve(request.id, &admin()).unwrap();
        assert_eq!(
            book.approve(request.id, &admin()).unwrap_err(),
            StoreError::AlreadyReviewed(Entity::PriceRequest)
        );
        assert!(book.reject(request.id, &admin(), None).is_err());
    }

    #[test]
    fn test_reject_keeps_price_and_defaults_reason() {
        let mut book = book();
        let request = book.propose(&[change(1, 1)], &minister()).unwrap().remove(0);

        let rejected = book.reject(request.id, &admin(), None).unwrap();
        assert_eq!(rejected.status, ReviewStatus::Rejected);
        assert_eq!(
            rejected.review.rejection_reason.as_deref(),
            Some(DEFAULT_REJECTION_REASON)
        );
        assert_eq!(book.service(1).unwrap().price, 60000);
        assert_eq!(book.pending_count(), 0);
    }

    #[test]
    fn test_review_unknown_request() {
        let mut book = book();
        assert_eq!(
            book.approve(7, &admin()).unwrap_err(),
            StoreError::NotFound(Entity::PriceRequest)
        );
    }

    #[test]
    fn test_direct_update() {
        let mut book = book();
        assert_eq!(book.update(&[change(3, 31000), change(1, 61000)]).unwrap(), 2);
        assert_eq!(book.service(3).unwrap().price, 31000);
        assert_eq!(book.service(1).unwrap().price, 61000);
        assert!(book.requests().is_empty());

        assert!(book.update(&[change(1, 1), change(100, 5)]).is_err());
        assert_eq!(book.service(1).unwrap().price, 61000);
    }

    #[test]
    fn test_services_in_category() {
        let book = book();
        assert_eq!(book.services_in("basic").len(), 2);
        assert!(book.services_in("cards").is_empty());
    }

    #[test]
    fn test_request_json_shape() {
        let mut book = book();
        let request = book.propose(&[change(1, 65000)], &minister()).unwrap().remove(0);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["serviceId"], 1);
        assert_eq!(json["newPrice"], 65000);
        assert_eq!(json["status"], "pending");
        assert!(json.get("approvedAt").is_none());
    }
}
