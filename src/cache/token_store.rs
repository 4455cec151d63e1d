use super::CacheError;
use super::connection::get_cache_connection;
use chrono::{DateTime, Utc};
use redis::Commands;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const REFRESH_PREFIX: &str = "refresh:";
const BLACKLIST_PREFIX: &str = "blacklist:";

/// Value stored under `refresh:{hash}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshRecord {
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Namespaced token state over the ephemeral store. Two key families:
/// `refresh:{hash}` holds the single-use refresh record for its full
/// lifetime, `blacklist:{hash}` is a revocation tombstone that outlives
/// the access token it kills.
pub struct TokenStore;

impl TokenStore {
    pub fn store_refresh_token(
        token_hash: &str,
        user_id: Uuid,
        ttl_secs: u64,
    ) -> Result<(), CacheError> {
        let record = RefreshRecord {
            user_id,
            created_at: Utc::now(),
        };
        let payload = serde_json::to_string(&record)?;

        let mut conn = get_cache_connection()?;
        conn.set_ex::<_, _, ()>(format!("{REFRESH_PREFIX}{token_hash}"), payload, ttl_secs)?;

        Ok(())
    }

    /// `Ok(None)` means the record does not exist (expired or rotated);
    /// errors are reserved for transport failures.
    pub fn get_refresh_token(token_hash: &str) -> Result<Option<RefreshRecord>, CacheError> {
        let mut conn = get_cache_connection()?;
        let payload: Option<String> = conn.get(format!("{REFRESH_PREFIX}{token_hash}"))?;

        match payload {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Single-shot delete; the `true` return is what makes refresh
    /// rotation at-most-once under races.
    pub fn delete_refresh_token(token_hash: &str) -> Result<bool, CacheError> {
        let mut conn = get_cache_connection()?;
        let removed: i64 = conn.del(format!("{REFRESH_PREFIX}{token_hash}"))?;

        Ok(removed == 1)
    }

    pub fn blacklist_token(token_hash: &str, ttl_secs: u64) -> Result<(), CacheError> {
        let mut conn = get_cache_connection()?;
        conn.set_ex::<_, _, ()>(format!("{BLACKLIST_PREFIX}{token_hash}"), "1", ttl_secs)?;

        Ok(())
    }

    /// Absent tombstone is `Ok(false)`; transport failures propagate so
    /// callers can fail closed.
    pub fn is_token_blacklisted(token_hash: &str) -> Result<bool, CacheError> {
        let mut conn = get_cache_connection()?;
        let present: bool = conn.exists(format!("{BLACKLIST_PREFIX}{token_hash}"))?;

        Ok(present)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::connection::init_test_cache;

    fn unique_hash() -> String {
        format!("{:0>64}", Uuid::new_v4().simple())
    }

    #[test]
    fn refresh_record_round_trips() {
        init_test_cache();

        let hash = unique_hash();
        let user_id = Uuid::new_v4();
        TokenStore::store_refresh_token(&hash, user_id, 60).expect("store");

        let record = TokenStore::get_refresh_token(&hash)
            .expect("get")
            .expect("record present");
        assert_eq!(record.user_id, user_id);

        assert!(TokenStore::delete_refresh_token(&hash).expect("delete"));
    }

    #[test]
    fn delete_is_single_shot() {
        init_test_cache();

        let hash = unique_hash();
        TokenStore::store_refresh_token(&hash, Uuid::new_v4(), 60).expect("store");

        assert!(TokenStore::delete_refresh_token(&hash).expect("first delete"));
        assert!(
            !TokenStore::delete_refresh_token(&hash).expect("second delete"),
            "second delete must observe an absent key"
        );
        assert!(TokenStore::get_refresh_token(&hash).expect("get").is_none());
    }

    #[test]
    fn blacklist_membership() {
        init_test_cache();

        let hash = unique_hash();
        assert!(!TokenStore::is_token_blacklisted(&hash).expect("check absent"));

        TokenStore::blacklist_token(&hash, 60).expect("blacklist");
        assert!(TokenStore::is_token_blacklisted(&hash).expect("check present"));
    }
}
