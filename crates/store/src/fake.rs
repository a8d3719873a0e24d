// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory [`StoreAdapter`] for tests, gated behind `test-support`
//! (mirrors the teacher's `FakeAgentAdapter`/`FakeClock` pattern so every
//! other crate's unit tests run without a live Redis, per spec.md §6.4).
//!
//! Plain key/hash/zset/list/set/stream operations are a faithful in-memory
//! reimplementation of the Redis commands they stand in for. TTL is
//! evaluated against an injected [`FakeClock`] rather than wall time, so
//! failover/lease-expiry scenarios (spec.md §8) can be driven deterministically.
//!
//! `eval_script` has no Lua interpreter behind it: each named script from
//! `cb-scripts/lua/*.lua` is mirrored here as a `match` arm built from the
//! trait's own other methods. Keep any change to a `.lua` asset's semantics
//! in sync with its arm below.

use crate::adapter::{PubSubMessage, ScoredMember, StoreAdapter, StreamEntry};
use crate::error::StoreError;
use async_trait::async_trait;
use cb_core::{Clock, FakeClock};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet, VecDeque};
use tokio::sync::mpsc;

#[derive(Default)]
struct FakeData {
    strings: HashMap<String, (String, Option<u64>)>,
    hashes: HashMap<String, HashMap<String, String>>,
    zsets: HashMap<String, Vec<(String, f64)>>,
    lists: HashMap<String, VecDeque<String>>,
    sets: HashMap<String, HashSet<String>>,
    streams: HashMap<String, Vec<(String, HashMap<String, String>)>>,
    stream_seq: HashMap<String, u64>,
    subscriptions: Vec<(String, mpsc::Sender<PubSubMessage>)>,
}

pub struct FakeStore {
    clock: FakeClock,
    data: Mutex<FakeData>,
}

impl FakeStore {
    pub fn new(clock: FakeClock) -> Self {
        Self { clock, data: Mutex::new(FakeData::default()) }
    }

    fn is_live(data: &FakeData, key: &str, now: u64) -> bool {
        match data.strings.get(key) {
            Some((_, Some(expiry))) => *expiry > now,
            _ => true,
        }
    }

    fn sweep_expired(data: &mut FakeData, now: u64) {
        let expired: Vec<String> = data
            .strings
            .iter()
            .filter_map(|(k, (_, exp))| match exp {
                Some(e) if *e <= now => Some(k.clone()),
                _ => None,
            })
            .collect();
        for k in expired {
            data.strings.remove(&k);
        }
    }
}

#[async_trait]
impl StoreAdapter for FakeStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let now = self.clock.epoch_ms();
        let mut data = self.data.lock();
        Self::sweep_expired(&mut data, now);
        Ok(data.strings.get(key).map(|(v, _)| v.clone()))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.data.lock().strings.insert(key.to_string(), (value.to_string(), None));
        Ok(())
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), StoreError> {
        let expiry = self.clock.epoch_ms() + ttl_secs * 1000;
        self.data.lock().strings.insert(key.to_string(), (value.to_string(), Some(expiry)));
        Ok(())
    }

    async fn set_nx_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<bool, StoreError> {
        let now = self.clock.epoch_ms();
        let mut data = self.data.lock();
        Self::sweep_expired(&mut data, now);
        if data.strings.contains_key(key) {
            return Ok(false);
        }
        let expiry = now + ttl_secs * 1000;
        data.strings.insert(key.to_string(), (value.to_string(), Some(expiry)));
        Ok(true)
    }

    async fn expire(&self, key: &str, ttl_secs: u64) -> Result<(), StoreError> {
        let expiry = self.clock.epoch_ms() + ttl_secs * 1000;
        if let Some(entry) = self.data.lock().strings.get_mut(key) {
            entry.1 = Some(expiry);
        }
        Ok(())
    }

    async fn ttl(&self, key: &str) -> Result<i64, StoreError> {
        let now = self.clock.epoch_ms();
        let data = self.data.lock();
        Ok(match data.strings.get(key) {
            Some((_, Some(exp))) if *exp > now => ((*exp - now) / 1000) as i64,
            Some((_, None)) => -1,
            _ => -2,
        })
    }

    async fn del(&self, key: &str) -> Result<bool, StoreError> {
        let mut data = self.data.lock();
        let mut removed = data.strings.remove(key).is_some();
        removed |= data.hashes.remove(key).is_some();
        removed |= data.zsets.remove(key).is_some();
        removed |= data.lists.remove(key).is_some();
        removed |= data.sets.remove(key).is_some();
        Ok(removed)
    }

    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        let now = self.clock.epoch_ms();
        let data = self.data.lock();
        Ok((data.strings.contains_key(key) && Self::is_live(&data, key, now))
            || data.hashes.contains_key(key)
            || data.zsets.contains_key(key)
            || data.lists.contains_key(key)
            || data.sets.contains_key(key))
    }

    async fn hset(&self, key: &str, field: &str, value: &str) -> Result<(), StoreError> {
        self.data
            .lock()
            .hashes
            .entry(key.to_string())
            .or_default()
            .insert(field.to_string(), value.to_string());
        Ok(())
    }

    async fn hget(&self, key: &str, field: &str) -> Result<Option<String>, StoreError> {
        Ok(self.data.lock().hashes.get(key).and_then(|h| h.get(field).cloned()))
    }

    async fn hgetall(&self, key: &str) -> Result<HashMap<String, String>, StoreError> {
        Ok(self.data.lock().hashes.get(key).cloned().unwrap_or_default())
    }

    async fn hincrby(&self, key: &str, field: &str, delta: i64) -> Result<i64, StoreError> {
        let mut data = self.data.lock();
        let hash = data.hashes.entry(key.to_string()).or_default();
        let current: i64 = hash.get(field).and_then(|v| v.parse().ok()).unwrap_or(0);
        let next = current + delta;
        hash.insert(field.to_string(), next.to_string());
        Ok(next)
    }

    async fn hdel(&self, key: &str, field: &str) -> Result<(), StoreError> {
        if let Some(hash) = self.data.lock().hashes.get_mut(key) {
            hash.remove(field);
        }
        Ok(())
    }

    async fn zadd(&self, key: &str, member: &str, score: f64) -> Result<(), StoreError> {
        let mut data = self.data.lock();
        let set = data.zsets.entry(key.to_string()).or_default();
        if let Some(entry) = set.iter_mut().find(|(m, _)| m == member) {
            entry.1 = score;
        } else {
            set.push((member.to_string(), score));
        }
        Ok(())
    }

    async fn zrange(&self, key: &str, start: i64, stop: i64) -> Result<Vec<String>, StoreError> {
        Ok(self
            .zrange_withscores(key, start, stop)
            .await?
            .into_iter()
            .map(|m| m.member)
            .collect())
    }

    async fn zrange_withscores(
        &self,
        key: &str,
        start: i64,
        stop: i64,
    ) -> Result<Vec<ScoredMember>, StoreError> {
        let data = self.data.lock();
        let mut set = data.zsets.get(key).cloned().unwrap_or_default();
        set.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        let len = set.len() as i64;
        let norm = |i: i64| -> i64 {
            if i < 0 {
                (len + i).max(0)
            } else {
                i.min(len)
            }
        };
        let (s, e) = (norm(start), norm(stop));
        if s > e || len == 0 {
            return Ok(vec![]);
        }
        Ok(set[s as usize..=(e.min(len - 1)) as usize]
            .iter()
            .map(|(member, score)| ScoredMember { member: member.clone(), score: *score })
            .collect())
    }

    async fn zrem(&self, key: &str, member: &str) -> Result<bool, StoreError> {
        let mut data = self.data.lock();
        if let Some(set) = data.zsets.get_mut(key) {
            let before = set.len();
            set.retain(|(m, _)| m != member);
            return Ok(set.len() != before);
        }
        Ok(false)
    }

    async fn zscore(&self, key: &str, member: &str) -> Result<Option<f64>, StoreError> {
        Ok(self
            .data
            .lock()
            .zsets
            .get(key)
            .and_then(|set| set.iter().find(|(m, _)| m == member).map(|(_, s)| *s)))
    }

    async fn zcard(&self, key: &str) -> Result<i64, StoreError> {
        Ok(self.data.lock().zsets.get(key).map(|s| s.len() as i64).unwrap_or(0))
    }

    async fn lpush(&self, key: &str, value: &str) -> Result<i64, StoreError> {
        let mut data = self.data.lock();
        let list = data.lists.entry(key.to_string()).or_default();
        list.push_front(value.to_string());
        Ok(list.len() as i64)
    }

    async fn rpush(&self, key: &str, value: &str) -> Result<i64, StoreError> {
        let mut data = self.data.lock();
        let list = data.lists.entry(key.to_string()).or_default();
        list.push_back(value.to_string());
        Ok(list.len() as i64)
    }

    async fn lrange(&self, key: &str, start: i64, stop: i64) -> Result<Vec<String>, StoreError> {
        let data = self.data.lock();
        let list = match data.lists.get(key) {
            Some(l) => l,
            None => return Ok(vec![]),
        };
        let len = list.len() as i64;
        if len == 0 {
            return Ok(vec![]);
        }
        let norm = |i: i64| -> i64 {
            if i < 0 {
                (len + i).max(0)
            } else {
                i.min(len - 1)
            }
        };
        let (s, e) = (norm(start), norm(stop));
        if s > e {
            return Ok(vec![]);
        }
        Ok(list.iter().skip(s as usize).take((e - s + 1) as usize).cloned().collect())
    }

    async fn lrem(&self, key: &str, count: i64, value: &str) -> Result<i64, StoreError> {
        let mut data = self.data.lock();
        let list = match data.lists.get_mut(key) {
            Some(l) => l,
            None => return Ok(0),
        };
        let mut removed = 0;
        if count >= 0 {
            let limit = if count == 0 { usize::MAX } else { count as usize };
            let mut kept = VecDeque::new();
            for v in list.drain(..) {
                if v == value && removed < limit {
                    removed += 1;
                } else {
                    kept.push_back(v);
                }
            }
            *list = kept;
        } else {
            let limit = (-count) as usize;
            let mut kept: VecDeque<String> = VecDeque::new();
            for v in list.drain(..).rev() {
                if v == value && removed < limit {
                    removed += 1;
                } else {
                    kept.push_front(v);
                }
            }
            *list = kept;
        }
        Ok(removed as i64)
    }

    async fn ltrim(&self, key: &str, start: i64, stop: i64) -> Result<(), StoreError> {
        let kept = self.lrange(key, start, stop).await?;
        let mut data = self.data.lock();
        data.lists.insert(key.to_string(), kept.into_iter().collect());
        Ok(())
    }

    async fn llen(&self, key: &str) -> Result<i64, StoreError> {
        Ok(self.data.lock().lists.get(key).map(|l| l.len() as i64).unwrap_or(0))
    }

    async fn sadd(&self, key: &str, member: &str) -> Result<bool, StoreError> {
        Ok(self.data.lock().sets.entry(key.to_string()).or_default().insert(member.to_string()))
    }

    async fn srem(&self, key: &str, member: &str) -> Result<bool, StoreError> {
        Ok(self.data.lock().sets.get_mut(key).map(|s| s.remove(member)).unwrap_or(false))
    }

    async fn sismember(&self, key: &str, member: &str) -> Result<bool, StoreError> {
        Ok(self.data.lock().sets.get(key).map(|s| s.contains(member)).unwrap_or(false))
    }

    async fn smembers(&self, key: &str) -> Result<Vec<String>, StoreError> {
        Ok(self.data.lock().sets.get(key).map(|s| s.iter().cloned().collect()).unwrap_or_default())
    }

    async fn xadd(&self, key: &str, fields: &[(&str, &str)]) -> Result<String, StoreError> {
        let now = self.clock.epoch_ms();
        let mut data = self.data.lock();
        let seq = data.stream_seq.entry(key.to_string()).or_insert(0);
        let id = format!("{now}-{seq}");
        *seq += 1;
        let map = fields.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        data.streams.entry(key.to_string()).or_default().push((id.clone(), map));
        Ok(id)
    }

    async fn xrange(
        &self,
        key: &str,
        _start: &str,
        _end: &str,
        count: usize,
    ) -> Result<Vec<StreamEntry>, StoreError> {
        let data = self.data.lock();
        Ok(data
            .streams
            .get(key)
            .map(|entries| {
                entries
                    .iter()
                    .take(count)
                    .map(|(id, fields)| StreamEntry { id: id.clone(), fields: fields.clone() })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn xlen(&self, key: &str) -> Result<i64, StoreError> {
        Ok(self.data.lock().streams.get(key).map(|s| s.len() as i64).unwrap_or(0))
    }

    async fn publish(&self, channel: &str, message: &str) -> Result<i64, StoreError> {
        let data = self.data.lock();
        let mut delivered = 0;
        for (pattern, sender) in &data.subscriptions {
            if cb_core::Event::matches_pattern(channel, pattern) {
                let _ = sender.try_send(PubSubMessage {
                    channel: channel.to_string(),
                    payload: message.to_string(),
                });
                delivered += 1;
            }
        }
        Ok(delivered)
    }

    async fn eval_script(
        &self,
        name: &'static str,
        _source: &'static str,
        keys: &[String],
        args: &[String],
    ) -> Result<String, StoreError> {
        crate::fake_scripts::dispatch(self, name, keys, args).await
    }

    async fn script_load(&self, _source: &'static str) -> Result<String, StoreError> {
        Ok("fake-sha".to_string())
    }

    async fn subscribe(
        &self,
        pattern: &str,
    ) -> Result<mpsc::Receiver<PubSubMessage>, StoreError> {
        let (tx, rx) = mpsc::channel(256);
        self.data.lock().subscriptions.push((pattern.to_string(), tx));
        Ok(rx)
    }
}

impl FakeStore {
    pub(crate) fn clock(&self) -> &FakeClock {
        &self.clock
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
