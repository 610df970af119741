use redis::RedisResult;
use tracing::info;

/// Secondary datastore client. Only the request rate limiter uses it.
#[derive(Clone)]
pub struct RedisClient {
    client: redis::Client,
}

impl RedisClient {
    pub async fn new(connection_string: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(connection_string)?;
        info!("Redis client configured");
        Ok(Self { client })
    }

    /// Fixed-window counter: true while `key` has been hit at most `limit`
    /// times in the current window.
    pub async fn check_rate_limit(&self, key: &str, limit: i64, window_seconds: i64) -> RedisResult<bool> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let (count,): (i64,) = redis::pipe()
            .atomic()
            .incr(key, 1)
            .expire(key, window_seconds)
            .ignore()
            .query_async(&mut conn)
            .await?;

        Ok(count <= limit)
    }
}

pub fn rate_limit_key(client_ip: &str) -> String {
    format!("ratelimit:{}", client_ip)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_key() {
        assert_eq!(rate_limit_key("10.0.0.1"), "ratelimit:10.0.0.1");
    }
}
