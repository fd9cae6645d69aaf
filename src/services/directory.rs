//! Customer directory cache
//!
//! Ownership-scoped replacement for the old ambient client-side cache:
//! one TTL, one refresh path, snapshots swapped atomically. Readers get
//! stale data while a refresh is pending (stale-while-revalidate); a
//! failed refresh degrades to the existing snapshot.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};

use crate::{client::BookingApi, error::AppResult, models::CustomerRecord};

const MAX_SUGGESTIONS: usize = 10;

struct Snapshot {
    customers: Arc<Vec<CustomerRecord>>,
    fetched_at: Option<Instant>,
}

pub struct CustomerDirectory {
    inner: RwLock<Snapshot>,
    ttl: Duration,
}

impl CustomerDirectory {
    pub fn new(ttl_minutes: u64) -> Self {
        Self {
            inner: RwLock::new(Snapshot {
                customers: Arc::new(Vec::new()),
                fetched_at: None,
            }),
            ttl: Duration::from_secs(ttl_minutes * 60),
        }
    }

    /// Current snapshot, possibly stale. Cheap: clones an `Arc`.
    pub fn snapshot(&self) -> Arc<Vec<CustomerRecord>> {
        let state = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&state.customers)
    }

    pub fn is_expired(&self) -> bool {
        let state = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        match state.fetched_at {
            Some(at) => at.elapsed() >= self.ttl,
            None => true,
        }
    }

    /// Whether the submitted identity is already known; used to skip the
    /// post-submission refresh for repeat customers.
    pub fn contains_identity(&self, email: &str, phone: &str) -> bool {
        let email = email.trim().to_ascii_lowercase();
        let phone = phone.trim();
        self.snapshot().iter().any(|c| {
            (!email.is_empty() && c.email.trim().to_ascii_lowercase() == email)
                || (!phone.is_empty() && c.phone.trim() == phone)
        })
    }

    /// Prefix suggestions over name/email/phone for the form inputs
    pub fn suggestions(&self, query: &str) -> Vec<CustomerRecord> {
        let query = query.trim().to_ascii_lowercase();
        if query.is_empty() {
            return Vec::new();
        }
        self.snapshot()
            .iter()
            .filter(|c| {
                c.name.to_ascii_lowercase().starts_with(&query)
                    || c.email.to_ascii_lowercase().starts_with(&query)
                    || c.phone.starts_with(&query)
            })
            .take(MAX_SUGGESTIONS)
            .cloned()
            .collect()
    }

    /// Fetch the directory and swap the snapshot in one step. On failure
    /// the previous snapshot stays readable.
    pub async fn refresh(&self, api: &dyn BookingApi, vendor: &str) -> AppResult<()> {
        let customers = api.fetch_customers(vendor).await?;
        let mut state = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        state.customers = Arc::new(customers);
        state.fetched_at = Some(Instant::now());
        Ok(())
    }

    /// Refresh only when the TTL has lapsed; fetch failures are absorbed
    /// (the suggestion inputs degrade to the stale or empty list).
    pub async fn ensure_fresh(&self, api: &dyn BookingApi, vendor: &str) {
        if !self.is_expired() {
            return;
        }
        if let Err(e) = self.refresh(api, vendor).await {
            tracing::warn!(error = %e, "customer directory refresh failed; serving stale data");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockBookingApi;

    fn record(name: &str, email: &str, phone: &str) -> CustomerRecord {
        CustomerRecord {
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
        }
    }

    #[tokio::test]
    async fn refresh_swaps_snapshot_atomically() {
        let directory = CustomerDirectory::new(10);
        assert!(directory.is_expired());
        let stale = directory.snapshot();
        assert!(stale.is_empty());

        let mut api = MockBookingApi::new();
        api.expect_fetch_customers()
            .returning(|_| Ok(vec![record("Ravi", "ravi@example.com", "9876543210")]));
        directory.refresh(&api, "vendor-1").await.unwrap();

        assert!(!directory.is_expired());
        assert_eq!(directory.snapshot().len(), 1);
        // The snapshot taken before the refresh is unaffected
        assert!(stale.is_empty());
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_snapshot() {
        let directory = CustomerDirectory::new(10);
        let mut api = MockBookingApi::new();
        api.expect_fetch_customers()
            .times(1)
            .returning(|_| Ok(vec![record("Ravi", "ravi@example.com", "9876543210")]));
        directory.refresh(&api, "vendor-1").await.unwrap();

        let mut failing = MockBookingApi::new();
        failing.expect_fetch_customers().returning(|_| {
            Err(crate::AppError::ServiceUnavailable("down".to_string()))
        });
        directory.ensure_fresh(&failing, "vendor-1").await;
        assert_eq!(directory.snapshot().len(), 1);
    }

    #[tokio::test]
    async fn identity_lookup_matches_email_or_phone() {
        let directory = CustomerDirectory::new(10);
        let mut api = MockBookingApi::new();
        api.expect_fetch_customers()
            .returning(|_| Ok(vec![record("Ravi", "Ravi@Example.com", "9876543210")]));
        directory.refresh(&api, "vendor-1").await.unwrap();

        assert!(directory.contains_identity("ravi@example.com", ""));
        assert!(directory.contains_identity("", "9876543210"));
        assert!(!directory.contains_identity("asha@example.com", "1112223334"));
        // Empty identity never matches
        assert!(!directory.contains_identity("", ""));
    }

    #[tokio::test]
    async fn suggestions_are_prefix_matched_and_capped() {
        let directory = CustomerDirectory::new(10);
        let mut api = MockBookingApi::new();
        api.expect_fetch_customers().returning(|_| {
            Ok((0..20)
                .map(|i| record(&format!("Ravi {}", i), &format!("r{}@x.in", i), "9"))
                .collect())
        });
        directory.refresh(&api, "vendor-1").await.unwrap();

        assert_eq!(directory.suggestions("ravi").len(), MAX_SUGGESTIONS);
        assert!(directory.suggestions("zz").is_empty());
        assert!(directory.suggestions("  ").is_empty());
    }
}
