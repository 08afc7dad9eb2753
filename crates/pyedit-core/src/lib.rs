//! Code intelligence for a Python editor: analysis queries, debounced lint checks,
//! diagnostic indicators and ctrl-click navigation.

pub mod analysis;
mod annotations;
mod buffer;
mod debounce;
mod diagnostics;
mod error;
pub mod lint;
mod navigation;
mod position;
mod run;
mod session;
mod worker;

pub use analysis::{
    AnalysisCache, AnalysisClient, AnalysisEngine, CompletionItem, JediEngine, ReferenceHit,
    ResolvedSymbol,
};
pub use annotations::{Annotation, AnnotationRenderer};
pub use buffer::AnalysisBuffer;
pub use debounce::{ChangeDebouncer, CheckOutcome, DebounceState};
pub use diagnostics::{Diagnostic, IndicatorStyle, Severity};
pub use error::{CoreError, NavigationError, PositionError, Result};
pub use lint::{DiagnosticsClient, LintRun, Linter, Pylint};
pub use navigation::{decide, Host, NavigationController, NavigationIntent};
pub use position::{offset_to_position, position_to_offset, word_at, LineIndex, Position, Range};
pub use run::{RunOutput, Runner};
pub use session::{BufferId, CheckCompleted, CheckRequest, EditorSession};
pub use worker::CheckWorker;

// Re-export common types from dependencies
pub use pyedit_config::IdeConfig;
