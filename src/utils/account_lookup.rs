//! Fast username-availability checks for account registration.
//!
//! Layered lookup: a cuckoo filter answers definite negatives without I/O, a
//! moka cache answers recent positives, and the users table is the fallback.

use anyhow::{Result, anyhow};
use autoscale_cuckoo_filter::CuckooFilter;
use futures_util::StreamExt;
use moka::future::Cache;
use once_cell::sync::Lazy;
use sqlx::MySqlPool;
use std::sync::RwLock;
use std::time::Duration;

/// Expected roster size and false-positive rate; tune to real account counts.
const FILTER_CAPACITY: usize = 100_000;
const FALSE_POSITIVE_RATE: f64 = 0.001;

const CACHE_CAPACITY: u64 = 500_000;
const CACHE_TTL_SECS: u64 = 86_400;

static TAKEN_FILTER: Lazy<RwLock<CuckooFilter<String>>> =
    Lazy::new(|| RwLock::new(CuckooFilter::new(FILTER_CAPACITY, FALSE_POSITIVE_RATE)));

/// Value is always `true`; presence means "taken".
static TAKEN_CACHE: Lazy<Cache<String, bool>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(CACHE_CAPACITY)
        .time_to_live(Duration::from_secs(CACHE_TTL_SECS))
        .build()
});

#[inline]
fn normalize(username: &str) -> String {
    username.to_lowercase()
}

/// Record a newly registered username in both layers.
pub async fn note_taken(username: &str) {
    let username = normalize(username);
    TAKEN_FILTER
        .write()
        .expect("username filter poisoned")
        .add(&username);
    TAKEN_CACHE.insert(username, true).await;
}

/// true  => username AVAILABLE
/// false => username TAKEN
pub async fn is_available(username: &str, pool: &MySqlPool) -> bool {
    let username = normalize(username);

    // definite negative: the filter has never seen this name
    if !TAKEN_FILTER
        .read()
        .expect("username filter poisoned")
        .contains(&username)
    {
        return true;
    }

    // fast positive from the cache
    if TAKEN_CACHE.get(&username).await.unwrap_or(false) {
        return false;
    }

    // database fallback; fail-safe toward "taken" on error
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM users WHERE username = ? LIMIT 1)",
    )
    .bind(&username)
    .fetch_one(pool)
    .await
    .unwrap_or(true);

    !exists
}

/// Stream every username into the filter, and usernames active in the last
/// `recent_days` into the cache. Run once at startup.
pub async fn warm_start(pool: &MySqlPool, recent_days: u32, batch_size: usize) -> Result<()> {
    let mut stream = sqlx::query_as::<_, (String, bool)>(
        r#"
        SELECT username, COALESCE(last_login_at >= NOW() - INTERVAL ? DAY, FALSE) AS recent
        FROM users
        "#,
    )
    .bind(recent_days)
    .fetch(pool);

    let mut filter_batch = Vec::with_capacity(batch_size);
    let mut cache_batch = Vec::with_capacity(batch_size);
    let mut total = 0usize;
    let mut recent_total = 0usize;

    while let Some(row) = stream.next().await {
        let (username, recent) = row.map_err(|e| anyhow!("user row fetch failed: {}", e))?;
        let username = normalize(&username);

        if recent {
            cache_batch.push(username.clone());
            recent_total += 1;
        }
        filter_batch.push(username);
        total += 1;

        if filter_batch.len() == batch_size {
            flush(&mut filter_batch, &mut cache_batch).await;
        }
    }
    flush(&mut filter_batch, &mut cache_batch).await;

    log::info!(
        "Username lookup warmup complete: {} accounts, {} recent (last {} days)",
        total,
        recent_total,
        recent_days
    );
    Ok(())
}

async fn flush(filter_batch: &mut Vec<String>, cache_batch: &mut Vec<String>) {
    {
        let mut filter = TAKEN_FILTER.write().expect("username filter poisoned");
        for username in filter_batch.iter() {
            filter.add(username);
        }
    }
    filter_batch.clear();

    let inserts: Vec<_> = cache_batch
        .drain(..)
        .map(|u| TAKEN_CACHE.insert(u, true))
        .collect();
    futures::future::join_all(inserts).await;
}
