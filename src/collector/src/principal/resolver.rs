//! Memoizing principal-name resolver

use crate::gateway::commands;
use crate::records::PrincipalNameRecord;
use azgraph_core::{CommandGateway, CommandOutput};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use once_cell::sync::OnceCell;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

/// IDs per filtered bulk query
pub const DEFAULT_BATCH_SIZE: usize = 7;

/// Statistics about resolver cache use
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolverStats {
    /// IDs answered from the cache
    pub hits: usize,
    /// IDs that needed a directory lookup
    pub misses: usize,
    /// IDs no lookup could name, cached as themselves
    pub fallbacks: usize,
    /// Entries in the cache
    pub entries: usize,
}

impl ResolverStats {
    /// Fraction of requested IDs served from the cache
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Resolves principal IDs to display names, caching every answer
///
/// Lookups for an uncached ID are tried in order: user, service principal,
/// group. The first non-empty display name is cached; if none answers, the
/// ID is cached as its own name. A cached ID never reaches the gateway again.
///
/// With batching enabled, uncached IDs first go through filtered bulk
/// queries (users, then service principals) in chunks; whatever the bulk
/// queries do not name falls through to the single lookups. The resulting
/// mapping is the same as without batching.
///
/// The resolver is shared by every subscription worker. The first caller to
/// request an uncached ID claims it and performs the lookup; concurrent
/// callers asking for the same ID wait for that answer.
pub struct PrincipalNameResolver {
    gateway: Arc<dyn CommandGateway>,
    /// principal ID -> display name, filled once by the claiming caller
    cache: Arc<DashMap<String, Arc<OnceCell<String>>>>,
    /// Chunk size for bulk queries; `None` disables batching
    batch_size: Option<usize>,
    stats: Arc<DashMap<&'static str, usize>>,
}

/// An uncached ID and the cell its claiming caller fills
type ClaimedCell = (String, Arc<OnceCell<String>>);

impl PrincipalNameResolver {
    /// Creates a resolver that looks IDs up one at a time
    pub fn new(gateway: Arc<dyn CommandGateway>) -> Self {
        Self {
            gateway,
            cache: Arc::new(DashMap::new()),
            batch_size: None,
            stats: Arc::new(DashMap::new()),
        }
    }

    /// Creates a resolver that tries bulk queries of `batch_size` IDs first
    pub fn with_batching(gateway: Arc<dyn CommandGateway>, batch_size: usize) -> Self {
        Self {
            batch_size: Some(batch_size.max(1)),
            ..Self::new(gateway)
        }
    }

    /// Resolve every ID in `ids` to a display name
    ///
    /// Duplicates in `ids` are looked up once. The returned map has one entry
    /// per distinct ID.
    pub fn resolve(&self, ids: &[String]) -> HashMap<String, String> {
        let mut seen = HashSet::new();
        let mut cells = Vec::new();
        let mut claimed: Vec<ClaimedCell> = Vec::new();

        for id in ids {
            if !seen.insert(id.as_str()) {
                continue;
            }
            let (cell, owner) = self.claim(id);
            if owner {
                self.increment_stat("misses");
                claimed.push((id.clone(), Arc::clone(&cell)));
            } else {
                self.increment_stat("hits");
            }
            cells.push((id.clone(), cell));
        }

        // Claimed cells are filled before waiting on anyone else's
        if !claimed.is_empty() {
            debug!("Resolving {} uncached principal(s)", claimed.len());
            if let Some(size) = self.batch_size {
                self.prefetch(&claimed, size);
            }
            for (id, cell) in &claimed {
                cell.get_or_init(|| self.lookup_single(id));
            }
        }

        cells
            .into_iter()
            .map(|(id, cell)| {
                let name = cell.wait().clone();
                (id, name)
            })
            .collect()
    }

    /// Resolve a single ID
    pub fn resolve_one(&self, id: &str) -> String {
        let id = id.to_string();
        self.resolve(std::slice::from_ref(&id))
            .remove(&id)
            .unwrap_or(id)
    }

    /// Cached name for an ID, without any lookup
    pub fn cached(&self, id: &str) -> Option<String> {
        self.cache.get(id).and_then(|cell| cell.get().cloned())
    }

    /// Number of resolved IDs
    pub fn len(&self) -> usize {
        self.cache.iter().filter(|entry| entry.value().get().is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns cache statistics
    pub fn stats(&self) -> ResolverStats {
        ResolverStats {
            hits: self.get_stat("hits"),
            misses: self.get_stat("misses"),
            fallbacks: self.get_stat("fallbacks"),
            entries: self.len(),
        }
    }

    /// Cell for `id`, and whether this caller created it
    fn claim(&self, id: &str) -> (Arc<OnceCell<String>>, bool) {
        match self.cache.entry(id.to_string()) {
            Entry::Occupied(entry) => (Arc::clone(entry.get()), false),
            Entry::Vacant(entry) => {
                let cell = Arc::new(OnceCell::new());
                entry.insert(Arc::clone(&cell));
                (cell, true)
            }
        }
    }

    /// Bulk-resolve claimed IDs in chunks, users before service principals
    fn prefetch(&self, claimed: &[ClaimedCell], size: usize) {
        for chunk in claimed.chunks(size) {
            let requested: Vec<String> = chunk.iter().map(|(id, _)| id.clone()).collect();
            let users = self.gateway.execute(&commands::bulk_user_names(&requested));
            store_bulk(chunk, users);

            let remaining: Vec<String> = chunk
                .iter()
                .filter(|(_, cell)| cell.get().is_none())
                .map(|(id, _)| id.clone())
                .collect();
            if remaining.is_empty() {
                continue;
            }

            let principals = self.gateway.execute(&commands::bulk_service_principal_names(&remaining));
            store_bulk(chunk, principals);
        }
    }

    /// Ordered one-shot lookup: user, service principal, group, then the ID
    fn lookup_single(&self, id: &str) -> String {
        let lookups = [
            commands::user_display_name(id),
            commands::service_principal_display_name(id),
            commands::group_display_name(id),
        ];

        for command in &lookups {
            if let Some(name) = self.gateway.execute(command).scalar_text() {
                return name;
            }
        }

        debug!("No directory object named {}, using the ID", id);
        self.increment_stat("fallbacks");
        id.to_string()
    }

    /// Increments a statistic counter
    fn increment_stat(&self, key: &'static str) {
        self.stats
            .entry(key)
            .and_modify(|count| *count += 1)
            .or_insert(1);
    }

    fn get_stat(&self, key: &'static str) -> usize {
        self.stats.get(key).map(|v| *v).unwrap_or(0)
    }
}

/// Fill claimed cells from bulk rows; rows nobody claimed are ignored
fn store_bulk(claimed: &[ClaimedCell], output: CommandOutput) {
    for row in output.into_records() {
        match PrincipalNameRecord::try_from(&row) {
            Ok(record) => match claimed.iter().find(|(id, _)| *id == record.id) {
                Some((_, cell)) => {
                    let _ = cell.set(record.name);
                }
                None => debug!("Ignoring unrequested principal {}", record.id),
            },
            Err(e) => debug!("Skipping principal row: {}", e),
        }
    }
}
