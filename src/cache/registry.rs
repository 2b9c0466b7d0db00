//! Per-domain cache manager registry
//!
//! One `CacheManager` per business domain, each with its own key prefix
//! (`vendhub:auth:`, `vendhub:machines:`, ...). The set of domains is fixed;
//! call sites that don't know their domain get an ad-hoc manager under a
//! generic prefix.

use crate::cache::backend::SharedBackend;
use crate::cache::manager::CacheManager;
use crate::config::CacheConfig;

/// Business domains with their own cache namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    /// Users, sessions, roles
    Auth,
    /// Machine fleet and models
    Machines,
    /// Ingredients, products, stock
    Inventory,
    /// Service and refill tasks
    Tasks,
    /// Sales and telemetry reports
    Reports,
    /// Telegram messaging channel
    Telegram,
}

impl Domain {
    /// All registered domains
    pub const ALL: [Domain; 6] = [
        Domain::Auth,
        Domain::Machines,
        Domain::Inventory,
        Domain::Tasks,
        Domain::Reports,
        Domain::Telegram,
    ];

    /// Lowercase name used inside cache key prefixes
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Auth => "auth",
            Domain::Machines => "machines",
            Domain::Inventory => "inventory",
            Domain::Tasks => "tasks",
            Domain::Reports => "reports",
            Domain::Telegram => "telegram",
        }
    }

    /// Parse a service name into a domain, if it names one
    pub fn from_service_name(name: &str) -> Option<Self> {
        Domain::ALL.iter().copied().find(|d| d.as_str() == name)
    }
}

/// Fixed, process-wide mapping from domain to cache manager
#[derive(Clone)]
pub struct CacheRegistry {
    namespace: String,
    default_ttl: u64,
    backend: SharedBackend,
    auth: CacheManager,
    machines: CacheManager,
    inventory: CacheManager,
    tasks: CacheManager,
    reports: CacheManager,
    telegram: CacheManager,
}

impl CacheRegistry {
    /// Build one manager per domain over the shared backing store
    pub fn new(config: &CacheConfig, backend: SharedBackend) -> Self {
        let make = |domain: Domain| {
            CacheManager::new(
                format!("{}:{}:", config.namespace, domain.as_str()),
                config.default_ttl_secs,
                backend.clone(),
            )
        };
        Self {
            namespace: config.namespace.clone(),
            default_ttl: config.default_ttl_secs,
            backend: backend.clone(),
            auth: make(Domain::Auth),
            machines: make(Domain::Machines),
            inventory: make(Domain::Inventory),
            tasks: make(Domain::Tasks),
            reports: make(Domain::Reports),
            telegram: make(Domain::Telegram),
        }
    }

    /// The manager owning `domain`'s namespace
    pub fn manager(&self, domain: Domain) -> &CacheManager {
        match domain {
            Domain::Auth => &self.auth,
            Domain::Machines => &self.machines,
            Domain::Inventory => &self.inventory,
            Domain::Tasks => &self.tasks,
            Domain::Reports => &self.reports,
            Domain::Telegram => &self.telegram,
        }
    }

    /// Resolve a manager by service name, falling back to an ad-hoc manager
    /// under a generic prefix for services without a registered domain
    pub fn for_service(&self, name: &str) -> CacheManager {
        match Domain::from_service_name(name) {
            Some(domain) => self.manager(domain).clone(),
            None => CacheManager::new(
                format!("{}:app:", self.namespace),
                self.default_ttl,
                self.backend.clone(),
            ),
        }
    }
}
