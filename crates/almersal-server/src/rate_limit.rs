//! Token-bucket rate limiting.
//!
//! [`RateLimiter`] is keyed by any hashable value. The HTTP middleware keys
//! it by client IP; sign-in additionally keys a stricter limiter by email so
//! password guessing is throttled even across addresses.

use std::collections::HashMap;
use std::hash::Hash;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{ConnectInfo, State},
    http::Request,
    middleware::Next,
    response::Response,
};
use tokio::sync::Mutex;
use tracing::warn;

use crate::error::ServerError;

#[derive(Debug, Clone)]
struct TokenBucket {
    tokens: f64,
    last_refill: Instant,
}

impl TokenBucket {
    fn full(capacity: f64) -> Self {
        Self {
            tokens: capacity,
            last_refill: Instant::now(),
        }
    }

    fn refill_and_take(&mut self, per_sec: f64, capacity: f64) -> bool {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();
        self.last_refill = now;
        self.tokens = (self.tokens + elapsed * per_sec).min(capacity);

        if self.tokens < 1.0 {
            return false;
        }
        self.tokens -= 1.0;
        true
    }
}

#[derive(Clone)]
pub struct RateLimiter<K = IpAddr> {
    buckets: Arc<Mutex<HashMap<K, TokenBucket>>>,
    per_sec: f64,
    burst: f64,
}

impl<K: Eq + Hash> RateLimiter<K> {
    pub fn new(per_sec: f64, burst: f64) -> Self {
        Self {
            buckets: Arc::new(Mutex::new(HashMap::new())),
            per_sec,
            burst,
        }
    }

    /// Take one token for `key`. `false` means the caller is over the limit.
    pub async fn check(&self, key: K) -> bool {
        let mut buckets = self.buckets.lock().await;
        buckets
            .entry(key)
            .or_insert_with(|| TokenBucket::full(self.burst))
            .refill_and_take(self.per_sec, self.burst)
    }

    /// Drop buckets untouched for `max_idle_secs`.
    pub async fn purge_stale(&self, max_idle_secs: f64) {
        let now = Instant::now();
        self.buckets
            .lock()
            .await
            .retain(|_, b| now.duration_since(b.last_refill).as_secs_f64() < max_idle_secs);
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.buckets.lock().await.len()
    }
}

impl Default for RateLimiter<IpAddr> {
    /// 10 requests per second sustained, bursts of 30.
    fn default() -> Self {
        Self::new(10.0, 30.0)
    }
}

/// Sign-in attempts per email: one every 10 seconds, bursts of 5.
pub fn signin_limiter() -> RateLimiter<String> {
    RateLimiter::new(0.1, 5.0)
}

pub async fn rate_limit_middleware(
    State(limiter): State<RateLimiter>,
    req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ServerError> {
    if let Some(ip) = client_ip(&req) {
        if !limiter.check(ip).await {
            warn!(ip = %ip, "Rate limit exceeded");
            return Err(ServerError::RateLimited);
        }
    }

    Ok(next.run(req).await)
}

/// Peer address, or the first `X-Forwarded-For` hop behind a proxy.
fn client_ip<B>(req: &Request<B>) -> Option<IpAddr> {
    if let Some(ConnectInfo(addr)) = req.extensions().get::<ConnectInfo<std::net::SocketAddr>>() {
        return Some(addr.ip());
    }

    req.headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|first| first.trim().parse().ok())
}
