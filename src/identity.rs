use crate::env;
use std::collections::HashMap;

/// Deployment identity values the enricher may attach to a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentityKey {
    AccountId,
    EnvName,
    Node,
    Stripe,
    Cluster,
}

impl IdentityKey {
    /// Environment variable consulted by [`EnvIdentity`].
    pub fn env_var(self) -> &'static str {
        match self {
            IdentityKey::AccountId => env::JSON_LOGGING_ACCID_ENV,
            IdentityKey::EnvName => env::JSON_LOGGING_ENVNAME_ENV,
            IdentityKey::Node => env::JSON_LOGGING_NODE_ENV,
            IdentityKey::Stripe => env::JSON_LOGGING_STRIPE_ENV,
            IdentityKey::Cluster => env::JSON_LOGGING_CLUSTER_ENV,
        }
    }
}

/// Read-only lookup of deployment identity values.
///
/// Injected into the enricher so that it never reaches into global
/// process state directly. Lookups happen once per enriched event, from
/// whatever thread emits it.
pub trait IdentitySource: Send + Sync {
    /// Return the value for `key`, or `None` when it is not configured.
    fn lookup(&self, key: IdentityKey) -> Option<String>;
}

/// Identity read from `JSON_LOGGING_*` environment variables.
///
/// Variables are read on every lookup. A variable that is set is a
/// supplied value even when empty; only an unset (or non-UTF-8) variable
/// counts as absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvIdentity;

impl IdentitySource for EnvIdentity {
    fn lookup(&self, key: IdentityKey) -> Option<String> {
        std::env::var(key.env_var()).ok()
    }
}

/// Fixed identity values, set up front.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity {
    values: HashMap<IdentityKey, String>,
}

impl StaticIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: IdentityKey, value: impl Into<String>) -> Self {
        self.values.insert(key, value.into());
        self
    }
}

impl IdentitySource for StaticIdentity {
    fn lookup(&self, key: IdentityKey) -> Option<String> {
        self.values.get(&key).cloned()
    }
}

/// An identity source with nothing configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoIdentity;

impl IdentitySource for NoIdentity {
    fn lookup(&self, _key: IdentityKey) -> Option<String> {
        None
    }
}
