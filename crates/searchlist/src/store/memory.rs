//! In-memory store implementation.
//!
//! Mirrors the Redis backend's observable behavior so tests exercise
//! the same protocol the production store sees:
//! - TTLs expire lazily on access
//! - a set or list whose last member is removed ceases to exist
//! - an empty union removes the destination key
//! - rev-range breaks score ties by member, descending

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use searchlist_core::store::{pattern_matches, Result, Store, StoreError};

#[derive(Debug, Clone)]
enum Value {
    Set(HashSet<String>),
    Sorted(HashMap<String, f64>),
    List(VecDeque<String>),
}

impl Value {
    fn kind(&self) -> &'static str {
        match self {
            Value::Set(_) => "set",
            Value::Sorted(_) => "sorted set",
            Value::List(_) => "list",
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    value: Value,
    expires_at: Option<Instant>,
}

impl Entry {
    fn new(value: Value) -> Self {
        Self {
            value,
            expires_at: None,
        }
    }

    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|exp| Instant::now() > exp)
    }
}

/// In-memory store backend.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Drops the entry if its TTL has lapsed. Expiry is lazy, applied on
/// access just like the Redis backend observes it.
fn purge_expired(entries: &mut HashMap<String, Entry>, key: &str) {
    if entries.get(key).is_some_and(Entry::is_expired) {
        entries.remove(key);
    }
}

fn wrong_type(key: &str, expected: &str, found: &Value) -> StoreError {
    StoreError::OperationFailed(format!(
        "key {key} holds a {}, expected a {expected}",
        found.kind()
    ))
}

#[async_trait]
impl Store for MemoryStore {
    async fn set_add(&self, key: &str, member: &str) -> Result<()> {
        let mut entries = self.entries.write().await;
        purge_expired(&mut entries, key);
        let entry = entries
            .entry(key.to_string())
            .or_insert_with(|| Entry::new(Value::Set(HashSet::new())));
        match &mut entry.value {
            Value::Set(set) => {
                set.insert(member.to_string());
                Ok(())
            }
            other => Err(wrong_type(key, "set", other)),
        }
    }

    async fn set_remove(&self, key: &str, member: &str) -> Result<()> {
        let mut entries = self.entries.write().await;
        purge_expired(&mut entries, key);
        let emptied = match entries.get_mut(key) {
            None => return Ok(()),
            Some(entry) => match &mut entry.value {
                Value::Set(set) => {
                    set.remove(member);
                    set.is_empty()
                }
                other => return Err(wrong_type(key, "set", other)),
            },
        };
        if emptied {
            entries.remove(key);
        }
        Ok(())
    }

    async fn set_members(&self, key: &str) -> Result<Vec<String>> {
        let mut entries = self.entries.write().await;
        purge_expired(&mut entries, key);
        match entries.get(key) {
            Some(entry) => match &entry.value {
                Value::Set(set) => Ok(set.iter().cloned().collect()),
                other => Err(wrong_type(key, "set", other)),
            },
            None => Ok(Vec::new()),
        }
    }

    async fn set_size(&self, key: &str) -> Result<u64> {
        let mut entries = self.entries.write().await;
        purge_expired(&mut entries, key);
        match entries.get(key) {
            Some(entry) => match &entry.value {
                Value::Set(set) => Ok(set.len() as u64),
                other => Err(wrong_type(key, "set", other)),
            },
            None => Ok(0),
        }
    }

    async fn set_pop(&self, key: &str) -> Result<Option<String>> {
        let mut entries = self.entries.write().await;
        purge_expired(&mut entries, key);
        let (member, emptied) = match entries.get_mut(key) {
            None => return Ok(None),
            Some(entry) => match &mut entry.value {
                Value::Set(set) => {
                    let member = set.iter().next().cloned();
                    if let Some(member) = &member {
                        set.remove(member);
                    }
                    (member, set.is_empty())
                }
                other => return Err(wrong_type(key, "set", other)),
            },
        };
        if emptied {
            entries.remove(key);
        }
        Ok(member)
    }

    async fn sorted_insert(&self, key: &str, new_entries: &[(f64, String)]) -> Result<()> {
        if new_entries.is_empty() {
            return Ok(());
        }
        let mut entries = self.entries.write().await;
        purge_expired(&mut entries, key);
        let entry = entries
            .entry(key.to_string())
            .or_insert_with(|| Entry::new(Value::Sorted(HashMap::new())));
        match &mut entry.value {
            Value::Sorted(members) => {
                for (score, member) in new_entries {
                    members.insert(member.clone(), *score);
                }
                Ok(())
            }
            other => Err(wrong_type(key, "sorted set", other)),
        }
    }

    async fn sorted_size(&self, key: &str) -> Result<u64> {
        let mut entries = self.entries.write().await;
        purge_expired(&mut entries, key);
        match entries.get(key) {
            Some(entry) => match &entry.value {
                Value::Sorted(members) => Ok(members.len() as u64),
                other => Err(wrong_type(key, "sorted set", other)),
            },
            None => Ok(0),
        }
    }

    async fn sorted_trim(&self, key: &str, max: usize) -> Result<()> {
        let mut entries = self.entries.write().await;
        purge_expired(&mut entries, key);
        let Some(entry) = entries.get_mut(key) else {
            return Ok(());
        };
        match &mut entry.value {
            Value::Sorted(members) => {
                if members.len() > max {
                    let mut ranked: Vec<(String, f64)> =
                        members.iter().map(|(m, s)| (m.clone(), *s)).collect();
                    ranked.sort_by(|a, b| {
                        a.1.partial_cmp(&b.1)
                            .unwrap_or(std::cmp::Ordering::Equal)
                            .then_with(|| a.0.cmp(&b.0))
                    });
                    let excess = ranked.len() - max;
                    for (member, _) in ranked.into_iter().take(excess) {
                        members.remove(&member);
                    }
                }
                Ok(())
            }
            other => Err(wrong_type(key, "sorted set", other)),
        }
    }

    async fn sorted_union(&self, dest: &str, sources: &[String]) -> Result<()> {
        let mut entries = self.entries.write().await;
        let mut union: HashMap<String, f64> = HashMap::new();
        for source in sources {
            purge_expired(&mut entries, source);
            let Some(entry) = entries.get(source) else {
                continue;
            };
            match &entry.value {
                Value::Sorted(members) => {
                    for (member, score) in members {
                        *union.entry(member.clone()).or_insert(0.0) += score;
                    }
                }
                other => return Err(wrong_type(source, "sorted set", other)),
            }
        }
        if union.is_empty() {
            entries.remove(dest);
        } else {
            entries.insert(dest.to_string(), Entry::new(Value::Sorted(union)));
        }
        Ok(())
    }

    async fn sorted_rev_range(&self, key: &str, limit: usize) -> Result<Vec<String>> {
        let mut entries = self.entries.write().await;
        purge_expired(&mut entries, key);
        match entries.get(key) {
            Some(entry) => match &entry.value {
                Value::Sorted(members) => {
                    let mut ranked: Vec<(String, f64)> =
                        members.iter().map(|(m, s)| (m.clone(), *s)).collect();
                    ranked.sort_by(|a, b| {
                        b.1.partial_cmp(&a.1)
                            .unwrap_or(std::cmp::Ordering::Equal)
                            .then_with(|| b.0.cmp(&a.0))
                    });
                    Ok(ranked.into_iter().take(limit).map(|(m, _)| m).collect())
                }
                other => Err(wrong_type(key, "sorted set", other)),
            },
            None => Ok(Vec::new()),
        }
    }

    async fn list_push(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.write().await;
        purge_expired(&mut entries, key);
        let entry = entries
            .entry(key.to_string())
            .or_insert_with(|| Entry::new(Value::List(VecDeque::new())));
        match &mut entry.value {
            Value::List(list) => {
                list.push_back(value.to_string());
                Ok(())
            }
            other => Err(wrong_type(key, "list", other)),
        }
    }

    async fn list_pop(&self, key: &str) -> Result<Option<String>> {
        let mut entries = self.entries.write().await;
        purge_expired(&mut entries, key);
        let (value, emptied) = match entries.get_mut(key) {
            None => return Ok(None),
            Some(entry) => match &mut entry.value {
                Value::List(list) => (list.pop_front(), list.is_empty()),
                other => return Err(wrong_type(key, "list", other)),
            },
        };
        if emptied {
            entries.remove(key);
        }
        Ok(value)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<()> {
        let mut entries = self.entries.write().await;
        purge_expired(&mut entries, key);
        if let Some(entry) = entries.get_mut(key) {
            entry.expires_at = Some(Instant::now() + ttl);
        }
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let mut entries = self.entries.write().await;
        purge_expired(&mut entries, key);
        Ok(entries.contains_key(key))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.remove(key);
        Ok(())
    }

    async fn scan(&self, pattern: &str) -> Result<Vec<String>> {
        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| !entry.is_expired());
        Ok(entries
            .keys()
            .filter(|key| pattern_matches(pattern, key))
            .cloned()
            .collect())
    }
}
