//! Quota Gate: the external rate limit plus the monthly allowance, both
//! checked before any extraction or model call.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::store::{GenerationStore, Reservation};
use crate::quota::rate_limit::{RateDecision, RateLimiter};

pub mod rate_limit;

/// Rate-limiter units charged per generation request.
pub const GENERATION_COST: u32 = 5;

#[derive(Clone)]
pub struct QuotaGate {
    rate_limiter: Arc<dyn RateLimiter>,
    store: Arc<dyn GenerationStore>,
}

impl QuotaGate {
    pub fn new(rate_limiter: Arc<dyn RateLimiter>, store: Arc<dyn GenerationStore>) -> Self {
        Self {
            rate_limiter,
            store,
        }
    }

    /// Admits one generation for `user_id`, reserving it against the monthly allowance.
    /// The returned guard refunds the reservation unless it is committed.
    pub async fn admit(&self, user_id: Uuid) -> Result<PendingGeneration, AppError> {
        let key = user_id.to_string();
        if let RateDecision::Denied { reason } =
            self.rate_limiter.check(&key, GENERATION_COST).await?
        {
            warn!("Rate limit denied user {user_id}: {reason}");
            return Err(AppError::RateLimited { reason });
        }

        match self.store.reserve_generation(user_id).await? {
            Reservation::Reserved { used, allowance } => {
                info!("Reserved generation {used}/{allowance} for user {user_id}");
                Ok(PendingGeneration {
                    gate: Some(self.clone()),
                    user_id,
                })
            }
            Reservation::Exhausted { used, allowance } => {
                info!("User {user_id} has exhausted their allowance ({used}/{allowance})");
                Err(AppError::QuotaExceeded { used, allowance })
            }
            Reservation::UnknownUser => Err(AppError::NotFound(format!("User {user_id} not found"))),
        }
    }

    /// Refunds a reservation. Failure leaves the user charged for one
    /// generation they did not receive, so it is logged rather than propagated.
    pub async fn release(&self, user_id: Uuid) {
        if let Err(e) = self.store.release_generation(user_id).await {
            warn!("Failed to release generation reservation for user {user_id}: {e}");
        }
    }
}

/// A reserved generation that has not been persisted yet.
///
/// Dropping it uncommitted (timeout, client disconnect) refunds the
/// reservation on a background task.
pub struct PendingGeneration {
    gate: Option<QuotaGate>,
    user_id: Uuid,
}

impl std::fmt::Debug for PendingGeneration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingGeneration")
            .field("user_id", &self.user_id)
            .field("armed", &self.gate.is_some())
            .finish()
    }
}

impl PendingGeneration {
    /// The artifact was persisted: keep the charge.
    pub fn commit(mut self) {
        self.gate = None;
    }

    /// Refunds the reservation before returning.
    pub async fn refund(mut self) {
        if let Some(gate) = self.gate.take() {
            gate.release(self.user_id).await;
        }
    }
}

impl Drop for PendingGeneration {
    fn drop(&mut self) {
        let Some(gate) = self.gate.take() else {
            return;
        };
        let user_id = self.user_id;
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                warn!("Generation for user {user_id} abandoned; refunding reservation");
                handle.spawn(async move { gate.release(user_id).await });
            }
            Err(_) => {
                warn!("No runtime to refund abandoned generation for user {user_id}");
            }
        }
    }
}
