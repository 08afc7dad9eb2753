//! Static analysis on top of a pluggable engine.
//!
//! [`AnalysisClient`] answers definition, reference, call tip, hover and completion
//! queries for a buffer. The buffer is usually mid-edit and therefore often invalid
//! source, so every engine failure is logged and turned into an empty answer.

mod cache;
mod jedi;

pub use cache::{AnalysisCache, QueryKind};
pub use jedi::JediEngine;

use crate::Position;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A single analysis request: the buffer text, its path and the cursor.
#[derive(Debug, Clone, Copy)]
pub struct Query<'a> {
    pub source: &'a str,
    pub path: &'a Path,
    pub position: Position,
}

impl<'a> Query<'a> {
    #[must_use]
    pub const fn new(source: &'a str, path: &'a Path, position: Position) -> Self {
        Self {
            source,
            path,
            position,
        }
    }
}

/// A name location as reported by the engine, before any policy is applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineLocation {
    /// Missing for builtins and compiled modules
    pub module_path: Option<PathBuf>,
    pub line: Option<usize>,
    #[serde(default)]
    pub column: usize,
    /// Source text of the line holding the name
    #[serde(default)]
    pub code: Option<String>,
}

/// A callable signature as reported by the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSignature {
    pub name: String,
    /// Parameter descriptions (`x`, `y=1`, `*args`); `None` when the engine has no metadata
    pub params: Option<Vec<String>>,
}

/// The black-box static-analysis service.
///
/// Positions are 1-based lines and 0-based columns. Implementations report failures
/// through `Err`; callers never see them.
pub trait AnalysisEngine: Send + Sync {
    fn goto(&self, query: &Query<'_>) -> anyhow::Result<Vec<EngineLocation>>;

    fn references(&self, query: &Query<'_>) -> anyhow::Result<Vec<EngineLocation>>;

    fn signatures(&self, query: &Query<'_>) -> anyhow::Result<Vec<EngineSignature>>;

    /// Docstrings of the symbols under the cursor, best match first
    fn help(&self, query: &Query<'_>) -> anyhow::Result<Vec<String>>;

    fn completions(&self, query: &Query<'_>) -> anyhow::Result<Vec<CompletionItem>>;
}

/// Definition site of the symbol under the cursor
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolvedSymbol {
    pub file_path: PathBuf,
    pub position: Position,
}

impl ResolvedSymbol {
    #[must_use]
    pub const fn new(file_path: PathBuf, position: Position) -> Self {
        Self {
            file_path,
            position,
        }
    }
}

/// One usage of the symbol under the cursor
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReferenceHit {
    pub file_path: PathBuf,
    pub position: Position,
    pub source_line_text: String,
}

impl ReferenceHit {
    /// Entry text for the reference picker: file name, line, source line
    #[must_use]
    pub fn menu_label(&self) -> String {
        let file = self
            .file_path
            .file_name()
            .map_or_else(
                || self.file_path.display().to_string(),
                |name| name.to_string_lossy().into_owned(),
            );
        format!(
            "{file}    {}   {}",
            self.position.line,
            self.source_line_text.trim()
        )
    }

    /// Treat the hit as a jump target
    #[must_use]
    pub fn to_symbol(&self) -> ResolvedSymbol {
        ResolvedSymbol::new(self.file_path.clone(), self.position)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompletionItem {
    pub label: String,

    /// Engine's kind tag, e.g. `function`, `module`, `keyword`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl CompletionItem {
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            kind: None,
            detail: None,
        }
    }
}

/// Answer types the client can memoise, one per [`QueryKind`]
trait Answer: Clone + Default {
    const KIND: QueryKind;

    fn into_cached(self) -> cache::CachedAnswer;

    fn from_cached(answer: cache::CachedAnswer) -> Option<Self>;
}

macro_rules! impl_answer {
    ($ty:ty, $kind:ident) => {
        impl Answer for $ty {
            const KIND: QueryKind = QueryKind::$kind;

            fn into_cached(self) -> cache::CachedAnswer {
                cache::CachedAnswer::$kind(self)
            }

            fn from_cached(answer: cache::CachedAnswer) -> Option<Self> {
                match answer {
                    cache::CachedAnswer::$kind(value) => Some(value),
                    _ => None,
                }
            }
        }
    };
}

impl_answer!(Option<ResolvedSymbol>, Definition);
impl_answer!(Vec<ReferenceHit>, References);
impl_answer!(Vec<String>, CallTip);
impl_answer!(Option<String>, Hover);
impl_answer!(Vec<CompletionItem>, Completions);

/// Policy layer over an [`AnalysisEngine`]
pub struct AnalysisClient<E> {
    engine: E,
    cache: Option<AnalysisCache>,
}

impl<E: AnalysisEngine> AnalysisClient<E> {
    #[must_use]
    pub const fn new(engine: E) -> Self {
        Self {
            engine,
            cache: None,
        }
    }

    /// Memoise answers per `(path, content hash, query)`
    #[must_use]
    pub fn with_cache(mut self, cache: AnalysisCache) -> Self {
        self.cache = Some(cache);
        self
    }

    #[must_use]
    pub const fn engine(&self) -> &E {
        &self.engine
    }

    /// Where the symbol under the cursor is defined.
    ///
    /// Returns `None` when the definition is on the query's own line in the same file:
    /// the user clicked the definition itself.
    #[must_use]
    pub fn resolve_definition(
        &self,
        source: &str,
        file_path: &Path,
        position: Position,
    ) -> Option<ResolvedSymbol> {
        self.answer(&Query::new(source, file_path, position), |engine, query| {
            let locations = engine.goto(query)?;
            let Some(location) = locations.into_iter().find(|l| l.module_path.is_some()) else {
                return Ok(None);
            };

            let symbol = to_symbol(location);
            if is_query_site(&symbol.file_path, symbol.position, query) {
                tracing::debug!("Definition is the query site itself, ignoring");
                return Ok(None);
            }

            Ok(Some(symbol))
        })
    }

    /// Usages of the symbol under the cursor, in engine order, minus the query site.
    #[must_use]
    pub fn find_references(
        &self,
        source: &str,
        file_path: &Path,
        position: Position,
    ) -> Vec<ReferenceHit> {
        self.answer(&Query::new(source, file_path, position), |engine, query| {
            Ok(engine
                .references(query)?
                .into_iter()
                .filter(|l| l.module_path.is_some())
                .map(|location| {
                    let code = location.code.clone().unwrap_or_default();
                    let symbol = to_symbol(location);
                    ReferenceHit {
                        file_path: symbol.file_path,
                        position: symbol.position,
                        source_line_text: code,
                    }
                })
                .filter(|hit| !is_query_site(&hit.file_path, hit.position, query))
                .collect())
        })
    }

    /// Call tips as `name(param, ...)`.
    ///
    /// A signature without parameter metadata still produces an entry, `name ` with a
    /// blank placeholder in place of the parameter list.
    #[must_use]
    pub fn get_call_tip(&self, source: &str, file_path: &Path, position: Position) -> Vec<String> {
        self.answer(&Query::new(source, file_path, position), |engine, query| {
            Ok(engine
                .signatures(query)?
                .into_iter()
                .map(|signature| match signature.params {
                    Some(params) => format!("{}({})", signature.name, params.join(", ")),
                    None => format!("{} ", signature.name),
                })
                .collect())
        })
    }

    /// Docstring of the first symbol under the cursor
    #[must_use]
    pub fn get_hover_documentation(
        &self,
        source: &str,
        file_path: &Path,
        position: Position,
    ) -> Option<String> {
        self.answer(&Query::new(source, file_path, position), |engine, query| {
            Ok(engine.help(query)?.into_iter().next())
        })
    }

    #[must_use]
    pub fn get_completions(
        &self,
        source: &str,
        file_path: &Path,
        position: Position,
    ) -> Vec<CompletionItem> {
        self.answer(&Query::new(source, file_path, position), |engine, query| {
            engine.completions(query)
        })
    }

    fn answer<T: Answer>(
        &self,
        query: &Query<'_>,
        compute: impl FnOnce(&E, &Query<'_>) -> anyhow::Result<T>,
    ) -> T {
        if let Some(hit) = self
            .cache
            .as_ref()
            .and_then(|cache| cache.get(query, T::KIND))
            .and_then(T::from_cached)
        {
            return hit;
        }

        match compute(&self.engine, query) {
            Ok(answer) => {
                if let Some(cache) = &self.cache {
                    cache.insert(query, T::KIND, answer.clone().into_cached());
                }
                answer
            }
            Err(e) => {
                tracing::warn!(
                    "{:?} query failed for {} at {}:{}: {e:#}",
                    T::KIND,
                    query.path.display(),
                    query.position.line,
                    query.position.column
                );
                T::default()
            }
        }
    }
}

fn to_symbol(location: EngineLocation) -> ResolvedSymbol {
    ResolvedSymbol::new(
        location.module_path.unwrap_or_default(),
        Position::new(location.line.unwrap_or(0), location.column),
    )
}

fn is_query_site(file_path: &Path, position: Position, query: &Query<'_>) -> bool {
    file_path == query.path && position.line == query.position.line
}
