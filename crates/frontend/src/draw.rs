//! The AOI draw-interaction controller.
//!
//! An explicit state machine replaces scattered drawstart/drawend
//! callbacks: the host feeds it toggle commands and synthetic pointer
//! events, and acts on the returned [`DrawEffect`]. Nothing here touches
//! the DOM, so the full gesture lifecycle is testable without a map
//! widget.

use prospect_shared::geo::ProjectedPoint;
use prospect_shared::square::{self, SizeConstraint, SquareDraft};
use tracing::info;

use crate::layers::AoiFeature;

/// A synthetic pointer event in projected map coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawEvent {
    PointerDown(ProjectedPoint),
    PointerMove(ProjectedPoint),
    PointerUp(ProjectedPoint),
}

/// What the host must do after feeding the controller an input.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawEffect {
    /// Input not relevant in the current state.
    Ignored,
    /// Draw mode armed: clear the committed AOI polygon (points stay),
    /// install pointer listeners, show the measurement readout.
    Started,
    /// Draw mode left without a feature: remove listeners and readout.
    Cancelled,
    /// Live draft changed: update the transient polygon and readout.
    DraftUpdated { draft: SquareDraft, label: String },
    /// Gesture ended valid: commit the feature, freeze the valid style,
    /// advance the workflow to data selection.
    Committed { feature: AoiFeature, size_km: f64 },
    /// Gesture ended invalid: drop the drawn feature and tell the user.
    Rejected { message: String },
}

#[derive(Debug, Clone, PartialEq)]
enum State {
    Idle,
    /// Draw mode on, waiting for the drag to start.
    Armed,
    /// Pointer down, square being dragged out.
    Dragging {
        start: ProjectedPoint,
        draft: SquareDraft,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawController {
    constraint: SizeConstraint,
    state: State,
}

impl DrawController {
    pub fn new(constraint: SizeConstraint) -> Self {
        DrawController {
            constraint,
            state: State::Idle,
        }
    }

    /// Whether draw mode is active (armed or mid-gesture).
    pub fn is_drawing(&self) -> bool {
        !matches!(self.state, State::Idle)
    }

    /// The in-progress square, for rendering.
    pub fn draft(&self) -> Option<&SquareDraft> {
        match &self.state {
            State::Dragging { draft, .. } => Some(draft),
            _ => None,
        }
    }

    /// Toggle draw mode. Invoking this while drawing cancels the gesture
    /// instead of stacking a second listener.
    pub fn toggle(&mut self) -> DrawEffect {
        match self.state {
            State::Idle => {
                self.state = State::Armed;
                DrawEffect::Started
            }
            _ => {
                self.state = State::Idle;
                DrawEffect::Cancelled
            }
        }
    }

    /// Feed one pointer event through the state machine.
    pub fn handle(&mut self, event: DrawEvent) -> DrawEffect {
        match (&self.state, event) {
            (State::Armed, DrawEvent::PointerDown(p)) => {
                let draft = square::build_square(p, p, self.constraint);
                let effect = Self::draft_effect(&draft);
                self.state = State::Dragging { start: p, draft };
                effect
            }
            (State::Dragging { start, .. }, DrawEvent::PointerMove(p)) => {
                let start = *start;
                let draft = square::build_square(start, p, self.constraint);
                let effect = Self::draft_effect(&draft);
                self.state = State::Dragging { start, draft };
                effect
            }
            (State::Dragging { start, .. }, DrawEvent::PointerUp(p)) => {
                let start = *start;
                let draft = square::build_square(start, p, self.constraint);
                self.state = State::Idle;
                self.finish(draft)
            }
            _ => DrawEffect::Ignored,
        }
    }

    fn draft_effect(draft: &SquareDraft) -> DrawEffect {
        DrawEffect::DraftUpdated {
            draft: draft.clone(),
            label: square::format_size_label(draft.size_km),
        }
    }

    /// Terminal validation at gesture end. The reported size comes from
    /// the committed geometry's diagonal extent, not the last live
    /// readout; validity still honors the raw measured drag, so a drag
    /// that rendered at the clamped boundary is rejected.
    fn finish(&self, draft: SquareDraft) -> DrawEffect {
        let commit_km = square::commit_size_km(&draft.polygon);
        let valid = draft.is_valid
            && commit_km >= self.constraint.min_km * (1.0 - COMMIT_TOLERANCE)
            && commit_km <= self.constraint.max_km * (1.0 + COMMIT_TOLERANCE);

        if valid {
            let feature = AoiFeature::from_ring(draft.polygon);
            info!(size_km = commit_km, "AOI committed");
            DrawEffect::Committed {
                feature,
                size_km: commit_km,
            }
        } else {
            let message = format!(
                "Selection must be between {} km and {} km per side (drawn: {:.1} km). \
                 Please draw the area again.",
                self.constraint.min_km, self.constraint.max_km, draft.raw_km
            );
            info!(raw_km = draft.raw_km, "AOI rejected");
            DrawEffect::Rejected { message }
        }
    }
}

/// The diagonal re-measurement disagrees with the axis measurement by a
/// fraction of a percent; without this slack a maximal drag clamped to
/// the boundary would fail its own commit check.
const COMMIT_TOLERANCE: f64 = 0.01;
