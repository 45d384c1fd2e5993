// ABOUTME: Read-through daily step goals service over the Fitbit client
// ABOUTME: Serves a short-lived cached snapshot; failures are never cached
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! Daily step goal derivation with a read-through cache.
//!
//! One fixed cache key, one short TTL. A hit is served with zero remote I/O;
//! a miss fetches today's activity summary, and only a fully successful
//! fetch-and-decode is written back, so a failed request is retried on the
//! very next call instead of being served stale.

use crate::cache::InMemoryCache;
use crate::errors::AppResult;
use crate::models::DailyStepGoals;
use crate::providers::fitbit::FitbitClient;
use chrono::{Local, NaiveDate};
use std::time::Duration;
use tracing::debug;

/// Fixed cache key of the goals snapshot
const DAILY_GOALS_KEY: &str = "daily_goals";

/// How long a goals snapshot is served before the next remote fetch
pub const DAILY_GOALS_TTL: Duration = Duration::from_secs(10);

/// Read-through cache over "today's step goal progress"
#[derive(Clone)]
pub struct GoalsService {
    fitbit: FitbitClient,
    cache: InMemoryCache,
    ttl: Duration,
}

impl GoalsService {
    /// Create a service with the standard snapshot TTL
    #[must_use]
    pub fn new(fitbit: FitbitClient, cache: InMemoryCache) -> Self {
        Self::with_ttl(fitbit, cache, DAILY_GOALS_TTL)
    }

    /// Create a service with a custom snapshot TTL
    #[must_use]
    pub fn with_ttl(fitbit: FitbitClient, cache: InMemoryCache, ttl: Duration) -> Self {
        Self { fitbit, cache, ttl }
    }

    /// Today's goal progress, served from cache when fresh.
    ///
    /// "Today" is the local calendar date evaluated at call time. A snapshot
    /// cached just before local midnight is still served for up to one TTL
    /// into the next day; the cache key carries no date.
    ///
    /// # Errors
    ///
    /// Propagates authorization, transport, and decode failures; none of
    /// them are cached.
    pub async fn daily_step_goals(&self) -> AppResult<DailyStepGoals> {
        self.daily_step_goals_for(Local::now().date_naive()).await
    }

    /// Goal progress for a specific calendar date, through the same cache
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Self::daily_step_goals`].
    pub async fn daily_step_goals_for(&self, date: NaiveDate) -> AppResult<DailyStepGoals> {
        if let Some(snapshot) = self.cache.get::<DailyStepGoals>(DAILY_GOALS_KEY).await? {
            debug!("serving cached goals snapshot");
            return Ok(snapshot);
        }

        let activity = self.fitbit.daily_activity(date).await?;
        let snapshot = DailyStepGoals {
            current: activity.summary.steps,
            goal: activity.goals.steps,
        };

        self.cache.set(DAILY_GOALS_KEY, &snapshot, self.ttl).await?;
        debug!(current = snapshot.current, goal = snapshot.goal, "goals snapshot refreshed");

        Ok(snapshot)
    }
}
