//! 按 key 缓存的异步查询
//!
//! 在 `LruCache` 之上提供：
//! - `get_or_fetch`：命中未过期条目直接返回，否则发起请求并写入缓存
//! - 请求去重：同一 key 同时只有一个进行中的请求，后来的调用者共享它的结果
//! - `refresh`：无视缓存强制发起新请求，结果替换缓存条目
//! - `invalidate` / `invalidate_all`：删除条目，并让进行中的请求结果不再写入
//!
//! 每个请求带一个递增的 generation，只有仍登记在 `in_flight` 中的请求才能
//! 写回缓存；被替换或被清除的请求只把结果交给自己的等待者。

use super::LruCache;
use crate::core::error::{FetchError, FetchResult};
use futures_util::future::{BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

type SharedRequest<V> = Shared<BoxFuture<'static, FetchResult<V>>>;

struct InFlight<V> {
    generation: u64,
    request: SharedRequest<V>,
}

struct State<K: Eq + Hash, V> {
    entries: LruCache<K, V>,
    in_flight: HashMap<K, InFlight<V>>,
    next_generation: u64,
}

impl<K, V> State<K, V>
where
    K: Eq + Hash + Clone + Debug,
    V: Clone,
{
    /// 请求完成后写回缓存
    ///
    /// 只有仍登记在 `in_flight` 中的那一代请求才会写入。
    fn settle(&mut self, name: &str, key: &K, generation: u64, result: &FetchResult<V>) {
        let current = self.in_flight.get(key).map(|in_flight| in_flight.generation);
        if current != Some(generation) {
            tracing::debug!(cache = name, key = ?key, generation, "请求已被替换或清除，结果不写入缓存");
            return;
        }
        self.in_flight.remove(key);

        match result {
            Ok(value) => self.entries.insert(key.clone(), value.clone()),
            Err(e) => {
                tracing::warn!(cache = name, key = ?key, error = %e, "请求失败，不写入缓存")
            }
        }
    }
}

/// 异步查询缓存
///
/// 克隆后共享同一份状态。
pub struct QueryCache<K: Eq + Hash, V> {
    name: &'static str,
    state: Arc<Mutex<State<K, V>>>,
}

impl<K: Eq + Hash, V> Clone for QueryCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            state: Arc::clone(&self.state),
        }
    }
}

fn lock_state<K: Eq + Hash, V>(state: &Mutex<State<K, V>>) -> MutexGuard<'_, State<K, V>> {
    // 临界区内不会 panic，中毒时直接沿用内部状态
    state.lock().unwrap_or_else(|e| e.into_inner())
}

impl<K, V> QueryCache<K, V>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// 创建新的查询缓存
    ///
    /// # 参数
    ///
    /// - `name`: 日志中使用的缓存名称
    /// - `capacity`: 最大条目数
    /// - `stale_time`: 条目有效期
    pub fn new(name: &'static str, capacity: usize, stale_time: Duration) -> Self {
        Self {
            name,
            state: Arc::new(Mutex::new(State {
                entries: LruCache::new(capacity, stale_time),
                in_flight: HashMap::new(),
                next_generation: 0,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State<K, V>> {
        lock_state(&self.state)
    }

    /// 登记一个新请求，替换同 key 下已有的进行中请求
    ///
    /// 请求在独立任务中运行并自行写回缓存，等待者全部放弃后也会完成。
    fn start<Fut>(&self, state: &mut State<K, V>, key: K, request: Fut) -> SharedRequest<V>
    where
        Fut: Future<Output = FetchResult<V>> + Send + 'static,
    {
        state.next_generation += 1;
        let generation = state.next_generation;

        let name = self.name;
        let shared_state = Arc::clone(&self.state);
        let task_key = key.clone();
        let handle = tokio::spawn(async move {
            // panic 也要结算，否则 in_flight 中会留下永远失败的请求
            let result = AssertUnwindSafe(request)
                .catch_unwind()
                .await
                .unwrap_or_else(|_| Err(FetchError::Request("请求任务 panic".to_string())));
            lock_state(&shared_state).settle(name, &task_key, generation, &result);
            result
        });

        let request = async move {
            handle
                .await
                .unwrap_or_else(|e| Err(FetchError::Request(format!("请求任务异常终止: {e}"))))
        }
        .boxed()
        .shared();

        state.in_flight.insert(
            key,
            InFlight {
                generation,
                request: request.clone(),
            },
        );
        request
    }

    /// 读取缓存，未命中时调用 `fetcher` 发起请求
    ///
    /// 同一 key 已有进行中的请求时直接等待它，`fetcher` 不会被调用。
    /// 请求失败不写入缓存。
    pub async fn get_or_fetch<F, Fut>(&self, key: K, fetcher: F) -> FetchResult<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = FetchResult<V>> + Send + 'static,
    {
        let request = {
            let mut state = self.lock();

            if let Some(value) = state.entries.get(&key) {
                tracing::debug!(cache = self.name, key = ?key, "缓存命中");
                return Ok(value.clone());
            }

            let running = state
                .in_flight
                .get(&key)
                .map(|in_flight| in_flight.request.clone());

            match running {
                Some(running) => {
                    tracing::debug!(cache = self.name, key = ?key, "复用进行中的请求");
                    running
                }
                None => {
                    tracing::debug!(cache = self.name, key = ?key, "缓存未命中，发起请求");
                    self.start(&mut state, key, fetcher())
                }
            }
        };

        request.await
    }

    /// 无视缓存强制发起请求，成功后替换缓存条目
    ///
    /// 之后到达的 `get_or_fetch` 调用会等待这次请求。
    pub async fn refresh<Fut>(&self, key: K, request: Fut) -> FetchResult<V>
    where
        Fut: Future<Output = FetchResult<V>> + Send + 'static,
    {
        let request = {
            let mut state = self.lock();
            tracing::debug!(cache = self.name, key = ?key, "强制刷新");
            self.start(&mut state, key, request)
        };

        request.await
    }

    /// 读取未过期的缓存条目，不发起请求
    pub fn peek(&self, key: &K) -> Option<V> {
        self.lock().entries.get(key).cloned()
    }

    /// 该 key 是否有进行中的请求
    pub fn is_fetching(&self, key: &K) -> bool {
        self.lock().in_flight.contains_key(key)
    }

    /// 删除单个 key 的缓存
    pub fn invalidate(&self, key: &K) {
        let mut state = self.lock();
        state.entries.remove(key);
        state.in_flight.remove(key);
        tracing::debug!(cache = self.name, key = ?key, "缓存已失效");
    }

    /// 删除全部缓存
    pub fn invalidate_all(&self) {
        let mut state = self.lock();
        state.entries.clear();
        state.in_flight.clear();
        tracing::debug!(cache = self.name, "缓存已清空");
    }

    /// 当前缓存条目数
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
