// src/timeline/hover.rs

//! Hover highlighting of timeline rectangles.

use serde::Serialize;
use tracing::trace;

use crate::timeline::layout::{IntervalKind, RecordRef, TimelineLayout};

/// Normal and highlight colour of one phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseColors {
    pub normal: &'static str,
    pub highlight: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Palette;

impl Palette {
    pub fn colors(&self, kind: IntervalKind) -> PhaseColors {
        let (normal, highlight) = match kind {
            IntervalKind::Worker => ("lightgrey", "orange"),
            IntervalKind::Queued => ("lightblue", "#72bbb0"),
            IntervalKind::Executing => ("steelblue", "orange"),
            IntervalKind::WaitingRetrieval => ("#40909f", "#bed380"),
            IntervalKind::Failed => ("#ad2c23", "orange"),
            IntervalKind::RecoveryExecuting => ("#ea67a9", "orange"),
        };
        PhaseColors { normal, highlight }
    }

    pub fn normal(&self, kind: IntervalKind) -> &'static str {
        self.colors(kind).normal
    }

    pub fn highlight(&self, kind: IntervalKind) -> &'static str {
        self.colors(kind).highlight
    }
}

/// Fill assignment for every rectangle of `record` with phase `kind`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RectFill {
    pub record: RecordRef,
    pub kind: IntervalKind,
    pub fill: String,
}

/// The record currently under the pointer, if any.
#[derive(Debug, Clone, Default)]
pub struct HoverState {
    palette: Palette,
    hovered: Option<RecordRef>,
}

impl HoverState {
    pub fn hovered(&self) -> Option<RecordRef> {
        self.hovered
    }

    /// Highlight all rectangles of `record`. A previously hovered record is
    /// restored first.
    pub fn enter(&mut self, record: RecordRef, layout: &TimelineLayout) -> Vec<RectFill> {
        if self.hovered == Some(record) {
            return Vec::new();
        }
        let mut fills = self.leave(layout);
        fills.extend(self.fills_for(record, layout, true));
        self.hovered = Some(record);
        trace!(?record, "hover enter");
        fills
    }

    /// Restore the normal colour of the hovered record.
    pub fn leave(&mut self, layout: &TimelineLayout) -> Vec<RectFill> {
        match self.hovered.take() {
            Some(record) => self.fills_for(record, layout, false),
            None => Vec::new(),
        }
    }

    /// Forget the hovered record without emitting fills, e.g. when the
    /// layout it belonged to is replaced.
    pub fn reset(&mut self) {
        self.hovered = None;
    }

    fn fills_for(&self, record: RecordRef, layout: &TimelineLayout, highlight: bool) -> Vec<RectFill> {
        let mut fills: Vec<RectFill> = Vec::new();
        for rect in layout.rects_of(record) {
            if fills.iter().any(|f| f.kind == rect.kind) {
                continue;
            }
            let colors = self.palette.colors(rect.kind);
            fills.push(RectFill {
                record,
                kind: rect.kind,
                fill: if highlight { colors.highlight } else { colors.normal }.to_string(),
            });
        }
        fills
    }
}
