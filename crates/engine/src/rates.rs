//! Time-boxed cache in front of an exchange-rate service.
//!
//! Rates are refreshed at most once per `max_age` (24h by default) or when
//! the requested anchor changes. A failed refresh never reaches the caller:
//! reporting falls back to the stale table, or to an empty one, and conversions
//! degrade as described in [`convert`](crate::convert).

use std::future::Future;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::{Currency, RateTable, ResultEngine};

/// Source of fresh exchange rates, e.g. an HTTP client.
pub trait RateProvider {
    /// Latest rates expressed as units per one `anchor`.
    fn latest(&self, anchor: Currency) -> impl Future<Output = ResultEngine<RateTable>> + Send;
}

/// A rate table together with when it was fetched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CachedRates {
    pub anchor: Currency,
    pub fetched_at: DateTime<Utc>,
    pub rates: RateTable,
}

/// Where the rates handed out by [`RateCache::get_or_refresh`] came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RateOrigin {
    Cached,
    Fetched,
    /// Refresh failed, an expired table for the same anchor was reused.
    Stale,
    /// Refresh failed and nothing usable was cached.
    Unavailable,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RateLookup {
    pub rates: RateTable,
    pub origin: RateOrigin,
}

#[derive(Clone, Debug)]
pub struct RateCache {
    entry: Option<CachedRates>,
    max_age: TimeDelta,
}

impl Default for RateCache {
    fn default() -> Self {
        Self::new(TimeDelta::hours(24))
    }
}

impl RateCache {
    #[must_use]
    pub fn new(max_age: TimeDelta) -> Self {
        Self {
            entry: None,
            max_age,
        }
    }

    /// Seeds the cache, typically with an entry persisted by a previous run.
    #[must_use]
    pub fn with_entry(mut self, entry: Option<CachedRates>) -> Self {
        self.entry = entry;
        self
    }

    #[must_use]
    pub fn entry(&self) -> Option<&CachedRates> {
        self.entry.as_ref()
    }

    #[must_use]
    pub fn max_age(&self) -> TimeDelta {
        self.max_age
    }

    /// Cached table for `anchor` if it is younger than `max_age`.
    #[must_use]
    pub fn fresh(&self, anchor: Currency, now: DateTime<Utc>) -> Option<&RateTable> {
        self.entry
            .as_ref()
            .filter(|entry| entry.anchor == anchor && now - entry.fetched_at < self.max_age)
            .map(|entry| &entry.rates)
    }

    pub fn store(&mut self, rates: RateTable, now: DateTime<Utc>) {
        self.entry = Some(CachedRates {
            anchor: rates.anchor(),
            fetched_at: now,
            rates,
        });
    }

    /// Returns fresh rates for `anchor`, asking `provider` only when needed.
    pub async fn get_or_refresh<P: RateProvider>(
        &mut self,
        provider: &P,
        anchor: Currency,
        now: DateTime<Utc>,
    ) -> RateLookup {
        if let Some(rates) = self.fresh(anchor, now) {
            return RateLookup {
                rates: rates.clone(),
                origin: RateOrigin::Cached,
            };
        }

        match provider.latest(anchor).await {
            Ok(rates) => {
                if rates.anchor() != anchor {
                    tracing::warn!(
                        "requested rates anchored at {anchor}, provider answered with {}",
                        rates.anchor()
                    );
                }
                tracing::debug!("fetched {} rates anchored at {}", rates.len(), rates.anchor());
                self.store(rates.clone(), now);
                RateLookup {
                    rates,
                    origin: RateOrigin::Fetched,
                }
            }
            Err(err) => {
                tracing::warn!("failed to refresh rates for {anchor}: {err}");
                match self.entry.as_ref().filter(|entry| entry.anchor == anchor) {
                    Some(entry) => RateLookup {
                        rates: entry.rates.clone(),
                        origin: RateOrigin::Stale,
                    },
                    None => RateLookup {
                        rates: RateTable::new(anchor),
                        origin: RateOrigin::Unavailable,
                    },
                }
            }
        }
    }
}
