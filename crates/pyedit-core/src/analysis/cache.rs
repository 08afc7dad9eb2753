use super::{CompletionItem, Query, ReferenceHit, ResolvedSymbol};
use crate::Position;
use dashmap::DashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    Definition,
    References,
    CallTip,
    Hover,
    Completions,
}

#[derive(Debug, Clone)]
pub(crate) enum CachedAnswer {
    Definition(Option<ResolvedSymbol>),
    References(Vec<ReferenceHit>),
    CallTip(Vec<String>),
    Hover(Option<String>),
    Completions(Vec<CompletionItem>),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    path: PathBuf,
    content_hash: u64,
    kind: QueryKind,
    position: Position,
}

/// Memoised analysis answers.
///
/// Keys include a hash of the full buffer text, so any edit misses. Entries for a
/// path are dropped as soon as a query arrives with different content for it, which
/// keeps at most one buffer revision per file alive.
#[derive(Debug, Default)]
pub struct AnalysisCache {
    entries: DashMap<CacheKey, CachedAnswer>,
    /// Content hash currently cached for each path
    revisions: DashMap<PathBuf, u64>,
}

impl AnalysisCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
        self.revisions.clear();
    }

    pub(crate) fn get(&self, query: &Query<'_>, kind: QueryKind) -> Option<CachedAnswer> {
        let key = Self::key(query, kind);
        self.entries.get(&key).map(|entry| entry.value().clone())
    }

    pub(crate) fn insert(&self, query: &Query<'_>, kind: QueryKind, answer: CachedAnswer) {
        let key = Self::key(query, kind);

        let previous = self
            .revisions
            .insert(key.path.clone(), key.content_hash);
        if previous.is_some_and(|hash| hash != key.content_hash) {
            let path = key.path.clone();
            let current = key.content_hash;
            self.entries
                .retain(|k, _| k.path != path || k.content_hash == current);
            tracing::debug!("Dropped stale analysis answers for {}", path.display());
        }

        self.entries.insert(key, answer);
    }

    fn key(query: &Query<'_>, kind: QueryKind) -> CacheKey {
        let mut hasher = DefaultHasher::new();
        query.source.hash(&mut hasher);

        CacheKey {
            path: query.path.to_path_buf(),
            content_hash: hasher.finish(),
            kind,
            position: query.position,
        }
    }
}
