// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Production [`StoreAdapter`] backed by a Redis-compatible server.
//!
//! Three logical connections per spec.md §4.1: `command` (a
//! [`redis::aio::ConnectionManager`], auto-reconnecting, used for every
//! read/write/script call and cloned cheaply per call), `publisher` (a
//! second `ConnectionManager` so a slow publish never contends with
//! subscriber dispatch), and `subscriber` (a dedicated task owning the one
//! `PubSub` connection redis-rs allows, fanning out to per-pattern
//! `mpsc` channels so a blocked `PSUBSCRIBE` read loop can never starve the
//! command path).

use crate::adapter::{PubSubMessage, ScoredMember, StoreAdapter, StreamEntry};
use crate::error::StoreError;
use crate::retry::with_retry;
use async_trait::async_trait;
use parking_lot::Mutex;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;

struct SubscriberRegistry {
    /// pattern -> senders waiting on messages matching it.
    routes: HashMap<String, Vec<mpsc::Sender<PubSubMessage>>>,
}

pub struct RedisStore {
    command: ConnectionManager,
    publisher: ConnectionManager,
    client: redis::Client,
    subscriber: Arc<Mutex<SubscriberRegistry>>,
    /// Patterns the background task has already issued `PSUBSCRIBE` for.
    active_patterns: Arc<Mutex<std::collections::HashSet<String>>>,
}

impl RedisStore {
    pub async fn connect(redis_url: &str) -> Result<Self, StoreError> {
        let client = redis::Client::open(redis_url).map_err(StoreError::from)?;
        let command = ConnectionManager::new(client.clone()).await.map_err(StoreError::from)?;
        let publisher = ConnectionManager::new(client.clone()).await.map_err(StoreError::from)?;
        Ok(Self {
            command,
            publisher,
            client,
            subscriber: Arc::new(Mutex::new(SubscriberRegistry { routes: HashMap::new() })),
            active_patterns: Arc::new(Mutex::new(std::collections::HashSet::new())),
        })
    }

    fn command(&self) -> ConnectionManager {
        self.command.clone()
    }
}

#[async_trait]
impl StoreAdapter for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let key = key.to_string();
        with_retry(|| {
            let mut conn = self.command();
            let key = key.clone();
            async move { Ok(conn.get(&key).await?) }
        })
        .await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let (key, value) = (key.to_string(), value.to_string());
        with_retry(|| {
            let mut conn = self.command();
            let (key, value) = (key.clone(), value.clone());
            async move {
                let _: () = conn.set(&key, &value).await?;
                Ok(())
            }
        })
        .await
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), StoreError> {
        let (key, value) = (key.to_string(), value.to_string());
        with_retry(|| {
            let mut conn = self.command();
            let (key, value) = (key.clone(), value.clone());
            async move {
                let _: () = conn.set_ex(&key, &value, ttl_secs).await?;
                Ok(())
            }
        })
        .await
    }

    async fn set_nx_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<bool, StoreError> {
        let (key, value) = (key.to_string(), value.to_string());
        with_retry(|| {
            let mut conn = self.command();
            let (key, value) = (key.clone(), value.clone());
            async move {
                let reply: Option<String> = redis::cmd("SET")
                    .arg(&key)
                    .arg(&value)
                    .arg("NX")
                    .arg("EX")
                    .arg(ttl_secs)
                    .query_async(&mut conn)
                    .await?;
                Ok(reply.is_some())
            }
        })
        .await
    }

    async fn expire(&self, key: &str, ttl_secs: u64) -> Result<(), StoreError> {
        let key = key.to_string();
        with_retry(|| {
            let mut conn = self.command();
            let key = key.clone();
            async move {
                let _: () = conn.expire(&key, ttl_secs as i64).await?;
                Ok(())
            }
        })
        .await
    }

    async fn ttl(&self, key: &str) -> Result<i64, StoreError> {
        let key = key.to_string();
        with_retry(|| {
            let mut conn = self.command();
            let key = key.clone();
            async move { Ok(conn.ttl(&key).await?) }
        })
        .await
    }

    async fn del(&self, key: &str) -> Result<bool, StoreError> {
        let key = key.to_string();
        with_retry(|| {
            let mut conn = self.command();
            let key = key.clone();
            async move {
                let n: i64 = conn.del(&key).await?;
                Ok(n > 0)
            }
        })
        .await
    }

    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        let key = key.to_string();
        with_retry(|| {
            let mut conn = self.command();
            let key = key.clone();
            async move { Ok(conn.exists(&key).await?) }
        })
        .await
    }

    async fn hset(&self, key: &str, field: &str, value: &str) -> Result<(), StoreError> {
        let (key, field, value) = (key.to_string(), field.to_string(), value.to_string());
        with_retry(|| {
            let mut conn = self.command();
            let (key, field, value) = (key.clone(), field.clone(), value.clone());
            async move {
                let _: () = conn.hset(&key, &field, &value).await?;
                Ok(())
            }
        })
        .await
    }

    async fn hget(&self, key: &str, field: &str) -> Result<Option<String>, StoreError> {
        let (key, field) = (key.to_string(), field.to_string());
        with_retry(|| {
            let mut conn = self.command();
            let (key, field) = (key.clone(), field.clone());
            async move { Ok(conn.hget(&key, &field).await?) }
        })
        .await
    }

    async fn hgetall(&self, key: &str) -> Result<HashMap<String, String>, StoreError> {
        let key = key.to_string();
        with_retry(|| {
            let mut conn = self.command();
            let key = key.clone();
            async move { Ok(conn.hgetall(&key).await?) }
        })
        .await
    }

    async fn hincrby(&self, key: &str, field: &str, delta: i64) -> Result<i64, StoreError> {
        let (key, field) = (key.to_string(), field.to_string());
        with_retry(|| {
            let mut conn = self.command();
            let (key, field) = (key.clone(), field.clone());
            async move { Ok(conn.hincr(&key, &field, delta).await?) }
        })
        .await
    }

    async fn hdel(&self, key: &str, field: &str) -> Result<(), StoreError> {
        let (key, field) = (key.to_string(), field.to_string());
        with_retry(|| {
            let mut conn = self.command();
            let (key, field) = (key.clone(), field.clone());
            async move {
                let _: () = conn.hdel(&key, &field).await?;
                Ok(())
            }
        })
        .await
    }

    async fn zadd(&self, key: &str, member: &str, score: f64) -> Result<(), StoreError> {
        let (key, member) = (key.to_string(), member.to_string());
        with_retry(|| {
            let mut conn = self.command();
            let (key, member) = (key.clone(), member.clone());
            async move {
                let _: () = conn.zadd(&key, &member, score).await?;
                Ok(())
            }
        })
        .await
    }

    async fn zrange(&self, key: &str, start: i64, stop: i64) -> Result<Vec<String>, StoreError> {
        let key = key.to_string();
        with_retry(|| {
            let mut conn = self.command();
            let key = key.clone();
            async move { Ok(conn.zrange(&key, start as isize, stop as isize).await?) }
        })
        .await
    }

    async fn zrange_withscores(
        &self,
        key: &str,
        start: i64,
        stop: i64,
    ) -> Result<Vec<ScoredMember>, StoreError> {
        let key = key.to_string();
        let raw: Vec<(String, f64)> = with_retry(|| {
            let mut conn = self.command();
            let key = key.clone();
            async move { Ok(conn.zrange_withscores(&key, start as isize, stop as isize).await?) }
        })
        .await?;
        Ok(raw.into_iter().map(|(member, score)| ScoredMember { member, score }).collect())
    }

    async fn zrem(&self, key: &str, member: &str) -> Result<bool, StoreError> {
        let (key, member) = (key.to_string(), member.to_string());
        with_retry(|| {
            let mut conn = self.command();
            let (key, member) = (key.clone(), member.clone());
            async move {
                let n: i64 = conn.zrem(&key, &member).await?;
                Ok(n > 0)
            }
        })
        .await
    }

    async fn zscore(&self, key: &str, member: &str) -> Result<Option<f64>, StoreError> {
        let (key, member) = (key.to_string(), member.to_string());
        with_retry(|| {
            let mut conn = self.command();
            let (key, member) = (key.clone(), member.clone());
            async move { Ok(conn.zscore(&key, &member).await?) }
        })
        .await
    }

    async fn zcard(&self, key: &str) -> Result<i64, StoreError> {
        let key = key.to_string();
        with_retry(|| {
            let mut conn = self.command();
            let key = key.clone();
            async move { Ok(conn.zcard(&key).await?) }
        })
        .await
    }

    async fn lpush(&self, key: &str, value: &str) -> Result<i64, StoreError> {
        let (key, value) = (key.to_string(), value.to_string());
        with_retry(|| {
            let mut conn = self.command();
            let (key, value) = (key.clone(), value.clone());
            async move { Ok(conn.lpush(&key, &value).await?) }
        })
        .await
    }

    async fn rpush(&self, key: &str, value: &str) -> Result<i64, StoreError> {
        let (key, value) = (key.to_string(), value.to_string());
        with_retry(|| {
            let mut conn = self.command();
            let (key, value) = (key.clone(), value.clone());
            async move { Ok(conn.rpush(&key, &value).await?) }
        })
        .await
    }

    async fn lrange(&self, key: &str, start: i64, stop: i64) -> Result<Vec<String>, StoreError> {
        let key = key.to_string();
        with_retry(|| {
            let mut conn = self.command();
            let key = key.clone();
            async move { Ok(conn.lrange(&key, start as isize, stop as isize).await?) }
        })
        .await
    }

    async fn lrem(&self, key: &str, count: i64, value: &str) -> Result<i64, StoreError> {
        let (key, value) = (key.to_string(), value.to_string());
        with_retry(|| {
            let mut conn = self.command();
            let (key, value) = (key.clone(), value.clone());
            async move { Ok(conn.lrem(&key, count as isize, &value).await?) }
        })
        .await
    }

    async fn ltrim(&self, key: &str, start: i64, stop: i64) -> Result<(), StoreError> {
        let key = key.to_string();
        with_retry(|| {
            let mut conn = self.command();
            let key = key.clone();
            async move {
                let _: () = conn.ltrim(&key, start as isize, stop as isize).await?;
                Ok(())
            }
        })
        .await
    }

    async fn llen(&self, key: &str) -> Result<i64, StoreError> {
        let key = key.to_string();
        with_retry(|| {
            let mut conn = self.command();
            let key = key.clone();
            async move { Ok(conn.llen(&key).await?) }
        })
        .await
    }

    async fn sadd(&self, key: &str, member: &str) -> Result<bool, StoreError> {
        let (key, member) = (key.to_string(), member.to_string());
        with_retry(|| {
            let mut conn = self.command();
            let (key, member) = (key.clone(), member.clone());
            async move {
                let n: i64 = conn.sadd(&key, &member).await?;
                Ok(n > 0)
            }
        })
        .await
    }

    async fn srem(&self, key: &str, member: &str) -> Result<bool, StoreError> {
        let (key, member) = (key.to_string(), member.to_string());
        with_retry(|| {
            let mut conn = self.command();
            let (key, member) = (key.clone(), member.clone());
            async move {
                let n: i64 = conn.srem(&key, &member).await?;
                Ok(n > 0)
            }
        })
        .await
    }

    async fn sismember(&self, key: &str, member: &str) -> Result<bool, StoreError> {
        let (key, member) = (key.to_string(), member.to_string());
        with_retry(|| {
            let mut conn = self.command();
            let (key, member) = (key.clone(), member.clone());
            async move { Ok(conn.sismember(&key, &member).await?) }
        })
        .await
    }

    async fn smembers(&self, key: &str) -> Result<Vec<String>, StoreError> {
        let key = key.to_string();
        with_retry(|| {
            let mut conn = self.command();
            let key = key.clone();
            async move { Ok(conn.smembers(&key).await?) }
        })
        .await
    }

    async fn xadd(&self, key: &str, fields: &[(&str, &str)]) -> Result<String, StoreError> {
        let key = key.to_string();
        let fields: Vec<(String, String)> =
            fields.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        with_retry(|| {
            let mut conn = self.command();
            let (key, fields) = (key.clone(), fields.clone());
            async move {
                let pairs: Vec<(&str, &str)> =
                    fields.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
                Ok(conn.xadd(&key, "*", &pairs).await?)
            }
        })
        .await
    }

    async fn xrange(
        &self,
        key: &str,
        start: &str,
        end: &str,
        count: usize,
    ) -> Result<Vec<StreamEntry>, StoreError> {
        let (key, start, end) = (key.to_string(), start.to_string(), end.to_string());
        with_retry(|| {
            let mut conn = self.command();
            let (key, start, end) = (key.clone(), start.clone(), end.clone());
            async move {
                let reply: redis::streams::StreamRangeReply = redis::cmd("XRANGE")
                    .arg(&key)
                    .arg(&start)
                    .arg(&end)
                    .arg("COUNT")
                    .arg(count)
                    .query_async(&mut conn)
                    .await?;
                Ok(reply
                    .ids
                    .into_iter()
                    .map(|id| {
                        let fields = id
                            .map
                            .into_iter()
                            .filter_map(|(k, v)| match v {
                                redis::Value::BulkString(bytes) => {
                                    Some((k, String::from_utf8_lossy(&bytes).into_owned()))
                                }
                                redis::Value::SimpleString(s) => Some((k, s)),
                                _ => None,
                            })
                            .collect();
                        StreamEntry { id: id.id, fields }
                    })
                    .collect())
            }
        })
        .await
    }

    async fn xlen(&self, key: &str) -> Result<i64, StoreError> {
        let key = key.to_string();
        with_retry(|| {
            let mut conn = self.command();
            let key = key.clone();
            async move { Ok(conn.xlen(&key).await?) }
        })
        .await
    }

    async fn publish(&self, channel: &str, message: &str) -> Result<i64, StoreError> {
        let (channel, message) = (channel.to_string(), message.to_string());
        with_retry(|| {
            let mut conn = self.publisher.clone();
            let (channel, message) = (channel.clone(), message.clone());
            async move { Ok(conn.publish(&channel, &message).await?) }
        })
        .await
    }

    async fn eval_script(
        &self,
        name: &'static str,
        source: &'static str,
        keys: &[String],
        args: &[String],
    ) -> Result<String, StoreError> {
        let sha = crate::scripts::sha1_hex(source);
        let (keys, args) = (keys.to_vec(), args.to_vec());
        let reply: String = with_retry(|| {
            let mut conn = self.command();
            let (keys, args) = (keys.clone(), args.clone());
            let sha = sha.clone();
            async move {
                let mut cmd = redis::cmd("EVALSHA");
                cmd.arg(&sha).arg(keys.len());
                for k in &keys {
                    cmd.arg(k);
                }
                for a in &args {
                    cmd.arg(a);
                }
                match cmd.query_async::<String>(&mut conn).await {
                    Ok(v) => Ok(v),
                    Err(e) if e.to_string().contains("NOSCRIPT") => {
                        let mut cmd = redis::cmd("EVAL");
                        cmd.arg(source).arg(keys.len());
                        for k in &keys {
                            cmd.arg(k);
                        }
                        for a in &args {
                            cmd.arg(a);
                        }
                        Ok(cmd.query_async::<String>(&mut conn).await?)
                    }
                    Err(e) => Err(StoreError::from(e)),
                }
            }
        })
        .await
        .map_err(|e| StoreError::Script { name: name.to_string(), detail: e.to_string() })?;
        Ok(reply)
    }

    async fn script_load(&self, source: &'static str) -> Result<String, StoreError> {
        let mut conn = self.command();
        let sha: String = redis::cmd("SCRIPT")
            .arg("LOAD")
            .arg(source)
            .query_async(&mut conn)
            .await
            .map_err(StoreError::from)?;
        Ok(sha)
    }

    async fn subscribe(
        &self,
        pattern: &str,
    ) -> Result<mpsc::Receiver<PubSubMessage>, StoreError> {
        let (tx, rx) = mpsc::channel(256);
        self.subscriber.lock().routes.entry(pattern.to_string()).or_default().push(tx);

        let already_active = {
            let mut active = self.active_patterns.lock();
            !active.insert(pattern.to_string())
        };
        if already_active {
            return Ok(rx);
        }

        let client = self.client.clone();
        let registry = self.subscriber.clone();
        let pattern = pattern.to_string();
        tokio::spawn(async move {
            let mut pubsub = match client.get_async_pubsub().await {
                Ok(p) => p,
                Err(e) => {
                    tracing::error!(%pattern, error = %e, "subscriber connection failed");
                    return;
                }
            };
            if let Err(e) = pubsub.psubscribe(&pattern).await {
                tracing::error!(%pattern, error = %e, "psubscribe failed");
                return;
            }
            let mut stream = pubsub.on_message();
            use futures_util::StreamExt;
            while let Some(msg) = stream.next().await {
                let channel: String = msg.get_channel_name().to_string();
                let payload: String = match msg.get_payload() {
                    Ok(p) => p,
                    Err(_) => continue,
                };
                let routes = registry.lock();
                for (pat, senders) in routes.routes.iter() {
                    if cb_core::Event::matches_pattern(&channel, pat) {
                        for sender in senders {
                            let _ = sender.try_send(PubSubMessage {
                                channel: channel.clone(),
                                payload: payload.clone(),
                            });
                        }
                    }
                }
            }
        });

        Ok(rx)
    }
}

#[cfg(test)]
#[path = "redis_store_tests.rs"]
mod tests;
