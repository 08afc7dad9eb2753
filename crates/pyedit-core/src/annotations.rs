use crate::{Diagnostic, IndicatorStyle, LineIndex};
use std::ops::Range as OffsetRange;

/// One painted squiggle, in buffer byte offsets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub range: OffsetRange<usize>,
    pub style: IndicatorStyle,
    pub code: String,
    pub message: String,
}

impl Annotation {
    #[must_use]
    pub const fn color(&self) -> &'static str {
        self.style.color()
    }
}

/// Indicator layers of one buffer: diagnostic squiggles and the hover underline.
///
/// The host reads the layers after each change; [`revision`](Self::revision) only moves
/// when the diagnostics layer actually changed.
#[derive(Debug, Default, Clone)]
pub struct AnnotationRenderer {
    annotations: Vec<Annotation>,
    underline: Option<OffsetRange<usize>>,
    revision: u64,
}

impl AnnotationRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    #[must_use]
    pub fn underline(&self) -> Option<OffsetRange<usize>> {
        self.underline.clone()
    }

    /// Replace the diagnostics layer with `diagnostics` painted over `text`.
    ///
    /// A finding whose start no longer maps onto `text` is skipped. Ends past the line
    /// or the text are clamped, and an empty range at the end of a line marks the
    /// character before it.
    pub fn apply(&mut self, text: &str, diagnostics: &[Diagnostic]) {
        let index = LineIndex::new(text);

        self.annotations = diagnostics
            .iter()
            .filter(|diagnostic| diagnostic.is_rendered())
            .filter_map(|diagnostic| {
                let range = paint_range(text, &index, diagnostic)?;
                Some(Annotation {
                    range,
                    style: diagnostic.indicator_style(),
                    code: diagnostic.code.clone(),
                    message: diagnostic.message.clone(),
                })
            })
            .collect();
        self.revision += 1;
    }

    /// Remove every diagnostic indicator
    pub fn clear(&mut self) {
        if self.annotations.is_empty() {
            return;
        }
        self.annotations.clear();
        self.revision += 1;
    }

    pub fn underline_word(&mut self, range: OffsetRange<usize>) {
        self.underline = Some(range);
    }

    pub fn clear_underline(&mut self) {
        self.underline = None;
    }
}

fn paint_range(
    text: &str,
    index: &LineIndex,
    diagnostic: &Diagnostic,
) -> Option<OffsetRange<usize>> {
    let mut start = match index.position_to_offset(diagnostic.range.start) {
        Ok(start) => start,
        Err(e) => {
            tracing::debug!("Not painting {}: {e}", diagnostic.code);
            return None;
        }
    };
    let end = index.clamped_offset(diagnostic.range.resolved_end());
    if end < start {
        tracing::debug!("Not painting {}: inverted range", diagnostic.code);
        return None;
    }

    if start == end {
        let line_start = index.line_start(diagnostic.range.start.line).unwrap_or(start);
        let before = text.get(line_start..start).and_then(|line| line.chars().next_back());
        if let Some(last) = before {
            start -= last.len_utf8();
        }
    }
    Some(start..end)
}
