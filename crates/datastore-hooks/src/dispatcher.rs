//! Hook dispatcher: registers filter callbacks by name and folds them over values.
//!
//! - Callbacks run in ascending priority order.
//! - Equal priorities run in registration order.
//! - A callback sees the output of the one before it.

use std::any::{type_name, Any};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, info, warn};

/// Priority given to callbacks registered without one.
pub const DEFAULT_PRIORITY: i32 = 10;

/// A filter callback for values of type `T`.
type Filter<T> = Arc<dyn Fn(T) -> T + Send + Sync>;

/// Entry in a hook's callback list.
#[derive(Clone)]
struct HookEntry {
    /// Priority (lower = earlier execution).
    priority: i32,
    /// Type name of the filtered value, for diagnostics.
    value_type: &'static str,
    /// A boxed `Filter<T>`.
    callback: Arc<dyn Any + Send + Sync>,
}

/// All callbacks for one hook name.
#[derive(Default)]
struct HookSlot {
    /// Sorted by priority; stable within a priority.
    entries: Vec<HookEntry>,
    /// Bumped on every change to `entries`.
    generation: u64,
}

#[derive(Default)]
struct Inner {
    hooks: RwLock<HashMap<String, HookSlot>>,
    registrations: AtomicU64,
}

/// Name-keyed filter hook registry.
///
/// Cloning is cheap and clones share callbacks. Registration and invocation
/// are each atomic with respect to one another.
#[derive(Clone, Default)]
pub struct HookDispatcher {
    inner: Arc<Inner>,
}

impl HookDispatcher {
    /// Create a dispatcher with no callbacks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback under `hook` at [`DEFAULT_PRIORITY`].
    pub fn register<T, F>(&self, hook: impl Into<String>, callback: F)
    where
        T: 'static,
        F: Fn(T) -> T + Send + Sync + 'static,
    {
        self.register_with_priority(hook, DEFAULT_PRIORITY, callback);
    }

    /// Register a callback under `hook` with an explicit priority.
    pub fn register_with_priority<T, F>(&self, hook: impl Into<String>, priority: i32, callback: F)
    where
        T: 'static,
        F: Fn(T) -> T + Send + Sync + 'static,
    {
        let hook = hook.into();
        let filter: Filter<T> = Arc::new(callback);
        let entry = HookEntry {
            priority,
            value_type: type_name::<T>(),
            callback: Arc::new(filter),
        };

        let count = {
            let mut hooks = self.inner.hooks.write().unwrap_or_else(PoisonError::into_inner);
            let slot = hooks.entry(hook.clone()).or_default();
            let pos = slot.entries.partition_point(|e| e.priority <= priority);
            slot.entries.insert(pos, entry);
            slot.generation += 1;
            slot.entries.len()
        };
        self.inner.registrations.fetch_add(1, Ordering::Relaxed);

        info!(
            hook = %hook,
            priority = priority,
            value_type = type_name::<T>(),
            callbacks = count,
            "Hook callback registered"
        );
    }

    /// Fold every callback registered under `hook` over `initial`.
    ///
    /// Returns `initial` unchanged when nothing is registered. The callback
    /// list is captured before the first call, so callbacks may register
    /// hooks themselves; those run from the next invocation on.
    pub fn invoke<T: 'static>(&self, hook: &str, initial: T) -> T {
        let entries = self.snapshot(hook);
        if entries.is_empty() {
            return initial;
        }

        debug!(hook = %hook, callbacks = entries.len(), "Invoking hook");

        let mut value = initial;
        for entry in &entries {
            match entry.callback.downcast_ref::<Filter<T>>() {
                Some(filter) => value = (**filter)(value),
                None => warn!(
                    hook = %hook,
                    expected = type_name::<T>(),
                    registered = entry.value_type,
                    "Skipping hook callback registered for a different value type"
                ),
            }
        }
        value
    }

    /// Remove every callback registered under `hook`.
    pub fn clear(&self, hook: &str) {
        let removed = {
            let mut hooks = self.inner.hooks.write().unwrap_or_else(PoisonError::into_inner);
            match hooks.get_mut(hook) {
                Some(slot) if !slot.entries.is_empty() => {
                    let removed = slot.entries.len();
                    slot.entries.clear();
                    slot.generation += 1;
                    removed
                }
                _ => 0,
            }
        };

        if removed > 0 {
            info!(hook = %hook, removed = removed, "Hook callbacks cleared");
        }
    }

    /// Whether any callback is registered under `hook`.
    pub fn has_callbacks(&self, hook: &str) -> bool {
        self.callback_count(hook) > 0
    }

    /// Number of callbacks registered under `hook`.
    pub fn callback_count(&self, hook: &str) -> usize {
        let hooks = self.inner.hooks.read().unwrap_or_else(PoisonError::into_inner);
        hooks.get(hook).map(|slot| slot.entries.len()).unwrap_or(0)
    }

    /// Change counter for `hook`; `0` if it was never touched.
    ///
    /// Anything cached from an invocation of `hook` is stale once this moves.
    pub fn generation(&self, hook: &str) -> u64 {
        let hooks = self.inner.hooks.read().unwrap_or_else(PoisonError::into_inner);
        hooks.get(hook).map(|slot| slot.generation).unwrap_or(0)
    }

    /// Total registrations made through this dispatcher and its clones.
    pub fn registrations(&self) -> u64 {
        self.inner.registrations.load(Ordering::Relaxed)
    }

    fn snapshot(&self, hook: &str) -> Vec<HookEntry> {
        let hooks = self.inner.hooks.read().unwrap_or_else(PoisonError::into_inner);
        hooks.get(hook).map(|slot| slot.entries.clone()).unwrap_or_default()
    }
}

impl fmt::Debug for HookDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hooks = self.inner.hooks.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<(&str, usize)> = hooks
            .iter()
            .filter(|(_, slot)| !slot.entries.is_empty())
            .map(|(name, slot)| (name.as_str(), slot.entries.len()))
            .collect();
        names.sort_unstable();
        f.debug_struct("HookDispatcher").field("hooks", &names).finish()
    }
}
