use crate::analysis::{AnalysisClient, AnalysisEngine, ReferenceHit, ResolvedSymbol};
use crate::{NavigationError, Position};
use std::path::{Path, PathBuf};

/// What the host should do in response to a ctrl-click
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationIntent {
    OpenAndJump { file_path: PathBuf, position: Position },
    JumpWithinBuffer { position: Position },
    ShowReferenceMenu { hits: Vec<ReferenceHit> },
    Nothing,
}

/// Choose a navigation for an analysis result.
///
/// A resolved definition wins over references; references are only offered when
/// nothing resolved.
#[must_use]
pub fn decide(
    resolved: Option<&ResolvedSymbol>,
    references: &[ReferenceHit],
    current_file_path: &Path,
) -> NavigationIntent {
    match resolved {
        Some(symbol) if symbol.file_path == current_file_path => {
            NavigationIntent::JumpWithinBuffer {
                position: symbol.position,
            }
        }
        Some(symbol) => NavigationIntent::OpenAndJump {
            file_path: symbol.file_path.clone(),
            position: symbol.position,
        },
        None if !references.is_empty() => NavigationIntent::ShowReferenceMenu {
            hits: references.to_vec(),
        },
        None => NavigationIntent::Nothing,
    }
}

/// The editor surface navigation drives (tab container, cursor)
pub trait Host {
    type Handle;

    /// Open `path` in a tab, or focus its tab if already open
    fn open_and_focus(&mut self, path: &Path) -> Result<Self::Handle, NavigationError>;

    fn set_cursor(&mut self, handle: &Self::Handle, position: Position);

    /// Path of the focused buffer, if any
    fn current_buffer_path(&self) -> Option<PathBuf>;
}

/// Applies [`NavigationIntent`]s to a [`Host`]
pub struct NavigationController<H> {
    host: H,
}

impl<H: Host> NavigationController<H> {
    #[must_use]
    pub const fn new(host: H) -> Self {
        Self { host }
    }

    #[must_use]
    pub const fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    #[must_use]
    pub fn into_host(self) -> H {
        self.host
    }

    /// Resolve the symbol at `position` of the focused buffer and navigate to it.
    ///
    /// Returns the intent that was applied. A [`NavigationIntent::ShowReferenceMenu`] is
    /// left to the host to render; the user's choice comes back through
    /// [`select_reference`](Self::select_reference).
    pub fn ctrl_click<E: AnalysisEngine>(
        &mut self,
        client: &AnalysisClient<E>,
        source: &str,
        position: Position,
    ) -> Result<NavigationIntent, NavigationError> {
        let current = self
            .host
            .current_buffer_path()
            .ok_or(NavigationError::NoActiveBuffer)?;

        let resolved = client.resolve_definition(source, &current, position);
        let references = if resolved.is_none() {
            client.find_references(source, &current, position)
        } else {
            Vec::new()
        };

        let intent = decide(resolved.as_ref(), &references, &current);
        tracing::debug!("Ctrl-click at {}:{} -> {intent:?}", position.line, position.column);
        self.apply(&intent)?;
        Ok(intent)
    }

    /// Carry out an intent on the host
    pub fn apply(&mut self, intent: &NavigationIntent) -> Result<(), NavigationError> {
        match intent {
            NavigationIntent::OpenAndJump { file_path, position } => {
                if !file_path.exists() {
                    tracing::warn!("Navigation target {} is missing", file_path.display());
                    return Err(NavigationError::TargetMissing(file_path.clone()));
                }
                let handle = self.host.open_and_focus(file_path)?;
                self.host.set_cursor(&handle, *position);
            }
            NavigationIntent::JumpWithinBuffer { position } => {
                let current = self
                    .host
                    .current_buffer_path()
                    .ok_or(NavigationError::NoActiveBuffer)?;
                let handle = self.host.open_and_focus(&current)?;
                self.host.set_cursor(&handle, *position);
            }
            NavigationIntent::ShowReferenceMenu { .. } | NavigationIntent::Nothing => {}
        }
        Ok(())
    }

    /// The user picked an entry from the reference menu
    pub fn select_reference(
        &mut self,
        hit: &ReferenceHit,
    ) -> Result<NavigationIntent, NavigationError> {
        let current = self
            .host
            .current_buffer_path()
            .ok_or(NavigationError::NoActiveBuffer)?;
        let intent = decide(Some(&hit.to_symbol()), &[], &current);
        self.apply(&intent)?;
        Ok(intent)
    }
}
