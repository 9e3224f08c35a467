//! Memoization of fallible lookups against the shared cache store
//!
//! A `Memoizer` binds a cache tag and a key function. Wrapping an operation
//! with it gives at-most-one successful call per key: hits are answered from
//! the cache, misses run the operation and store its result. Failures are
//! returned as-is and never cached.
//!
//! The default key function renders arguments the same way cache files
//! written by earlier tooling expect: a single positional argument becomes its
//! plain string form, anything else becomes a tuple such as `('Q42', 'en')`.

use crate::cache::store::FileBackedCacheStore;
use crate::cache::types::{CacheKey, CacheTag};
use crate::error::Result;
use serde::{de::DeserializeOwned, Serialize};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Cache store shared between the client and its memoizers
pub type SharedCacheStore = Arc<RwLock<FileBackedCacheStore>>;

/// Key function: call arguments to cache key
pub type KeyFn = fn(&CallArgs) -> CacheKey;

/// A single call argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgValue {
    Str(String),
    Bool(bool),
}

impl ArgValue {
    /// Quoted form used inside tuple keys
    pub fn repr(&self) -> String {
        match self {
            ArgValue::Str(s) => quote(s),
            ArgValue::Bool(true) => "True".to_string(),
            ArgValue::Bool(false) => "False".to_string(),
        }
    }
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::Str(s) => write!(f, "{}", s),
            ArgValue::Bool(true) => write!(f, "True"),
            ArgValue::Bool(false) => write!(f, "False"),
        }
    }
}

impl From<&str> for ArgValue {
    fn from(s: &str) -> Self {
        ArgValue::Str(s.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(s: String) -> Self {
        ArgValue::Str(s)
    }
}

impl From<&String> for ArgValue {
    fn from(s: &String) -> Self {
        ArgValue::Str(s.clone())
    }
}

impl From<bool> for ArgValue {
    fn from(b: bool) -> Self {
        ArgValue::Bool(b)
    }
}

/// Ordered positional and keyword arguments of a cached call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallArgs {
    positional: Vec<ArgValue>,
    keyword: Vec<(String, ArgValue)>,
}

impl CallArgs {
    /// No arguments
    pub fn new() -> Self {
        Self::default()
    }

    /// A single positional argument
    pub fn of(arg: impl Into<ArgValue>) -> Self {
        Self::new().arg(arg)
    }

    /// Append a positional argument
    pub fn arg(mut self, arg: impl Into<ArgValue>) -> Self {
        self.positional.push(arg.into());
        self
    }

    /// Append a keyword argument; keywords keep call order
    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<ArgValue>) -> Self {
        self.keyword.push((name.into(), value.into()));
        self
    }

    pub fn positional(&self) -> &[ArgValue] {
        &self.positional
    }

    pub fn keyword(&self) -> &[(String, ArgValue)] {
        &self.keyword
    }

    /// Tuple rendering: positional items followed by `('name', value)` pairs
    pub fn tuple_repr(&self) -> String {
        let items: Vec<String> = self
            .positional
            .iter()
            .map(ArgValue::repr)
            .chain(
                self.keyword
                    .iter()
                    .map(|(name, value)| format!("({}, {})", quote(name), value.repr())),
            )
            .collect();

        match items.len() {
            1 => format!("({},)", items[0]),
            _ => format!("({})", items.join(", ")),
        }
    }
}

/// Default key normalization
///
/// One positional argument and no keywords: the argument's plain form.
/// Otherwise the tuple rendering. A lone string that starts with `(` is
/// rendered as a tuple so it cannot alias a multi-argument key.
pub fn default_key(args: &CallArgs) -> CacheKey {
    match (args.positional.as_slice(), args.keyword.is_empty()) {
        ([ArgValue::Str(s)], true) if s.starts_with('(') => args.tuple_repr(),
        ([only], true) => only.to_string(),
        _ => args.tuple_repr(),
    }
}

fn quote(s: &str) -> String {
    let q = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };

    let mut out = String::with_capacity(s.len() + 2);
    out.push(q);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == q => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(q);
    out
}

/// Binds a cache tag and key function to a shared store
#[derive(Clone)]
pub struct Memoizer {
    cache: SharedCacheStore,
    tag: CacheTag,
    key_fn: KeyFn,
}

impl Memoizer {
    /// Memoizer for `tag` using `default_key`
    pub fn new(cache: SharedCacheStore, tag: impl Into<CacheTag>) -> Self {
        Self {
            cache,
            tag: tag.into(),
            key_fn: default_key,
        }
    }

    /// Replace the key function
    pub fn with_key_fn(mut self, key_fn: KeyFn) -> Self {
        self.key_fn = key_fn;
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Cache key for `args`
    pub fn key_for(&self, args: &CallArgs) -> CacheKey {
        (self.key_fn)(args)
    }

    /// Return the cached value for `args`, or run `operation` and cache its result
    ///
    /// The store lock is not held while `operation` runs, so the operation may
    /// itself call other memoized lookups.
    pub async fn call<T, F, Fut>(&self, args: &CallArgs, operation: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let key = self.key_for(args);

        let cached = {
            let store = self.cache.read().await;
            store.get(&self.tag, &key).cloned()
        };

        if let Some(value) = cached {
            match serde_json::from_value::<T>(value) {
                Ok(hit) => {
                    debug!("{}: cache hit for '{}'", self.tag, key);
                    self.cache.write().await.record_hit();
                    return Ok(hit);
                }
                Err(e) => {
                    warn!(
                        "{}: cached value for '{}' has unexpected shape ({}); refetching",
                        self.tag, key, e
                    );
                }
            }
        }

        info!(
            "{}: '{}' not found in cache. Making API request.",
            self.tag, key
        );
        self.cache.write().await.record_miss();

        let value = operation().await?;
        let stored = serde_json::to_value(&value)?;
        self.cache.write().await.put(&self.tag, key, stored);

        Ok(value)
    }

    /// Wrap `operation` so every call goes through this memoizer
    pub fn wrap<F>(self, operation: F) -> Memoized<F> {
        Memoized {
            memoizer: self,
            operation,
        }
    }
}

/// An operation bundled with its memoizer
pub struct Memoized<F> {
    memoizer: Memoizer,
    operation: F,
}

impl<F> Memoized<F> {
    /// Call the wrapped operation through the cache
    pub async fn call<T, Fut>(&self, args: CallArgs) -> Result<T>
    where
        F: Fn(CallArgs) -> Fut,
        Fut: Future<Output = Result<T>>,
        T: Serialize + DeserializeOwned,
    {
        let key_args = args.clone();
        let operation = &self.operation;
        self.memoizer.call(&key_args, move || operation(args)).await
    }

    pub fn memoizer(&self) -> &Memoizer {
        &self.memoizer
    }
}
