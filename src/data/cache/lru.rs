//! 带过期时间的 LRU 存储
//!
//! `QueryCache` 的底层存储：
//! - 容量限制：超过容量淘汰最久未使用的条目
//! - 过期时间：条目写入后超过 `stale_time` 视为失效，读取时顺带删除
//!
//! 时间取自 `tokio::time::Instant`，测试中可以用暂停的时钟推进。
//!
//! # 使用示例
//!
//! ```rust
//! use std::time::Duration;
//! use tablescope::data::cache::LruCache;
//!
//! let mut cache = LruCache::new(100, Duration::from_secs(300));
//! cache.insert("db1", vec!["main".to_string()]);
//! assert!(cache.get(&"db1").is_some());
//! ```

use linked_hash_map::LinkedHashMap;
use std::hash::Hash;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    updated_at: Instant,
}

impl<V> Entry<V> {
    fn is_stale(&self, stale_time: Duration) -> bool {
        self.updated_at.elapsed() >= stale_time
    }
}

/// LRU 存储
///
/// `LinkedHashMap` 维护访问顺序，队首为最久未使用的条目。
#[derive(Debug)]
pub struct LruCache<K: Eq + Hash, V> {
    entries: LinkedHashMap<K, Entry<V>>,
    capacity: usize,
    stale_time: Duration,
}

impl<K: Eq + Hash, V> LruCache<K, V> {
    /// 创建新的 LRU 存储
    ///
    /// # 参数
    ///
    /// - `capacity`: 最大条目数（至少为 1）
    /// - `stale_time`: 条目的有效期
    pub fn new(capacity: usize, stale_time: Duration) -> Self {
        Self {
            entries: LinkedHashMap::new(),
            capacity: capacity.max(1),
            stale_time,
        }
    }

    /// 获取未过期的条目，并将其移到最近使用位置
    ///
    /// 过期条目会被删除并返回 `None`。
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let stale = self.entries.get(key)?.is_stale(self.stale_time);
        if stale {
            self.entries.remove(key);
            return None;
        }

        self.entries.get_refresh(key).map(|entry| &entry.value)
    }

    /// 写入条目
    ///
    /// 已存在的键会被替换并重新计时；容量已满时淘汰最久未使用的条目。
    pub fn insert(&mut self, key: K, value: V) {
        self.entries.remove(&key);

        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }

        self.entries.insert(
            key,
            Entry {
                value,
                updated_at: Instant::now(),
            },
        );
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.entries.remove(key).map(|entry| entry.value)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// 当前条目数（包含尚未被读取清理的过期条目）
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn stale_time(&self) -> Duration {
        self.stale_time
    }
}
