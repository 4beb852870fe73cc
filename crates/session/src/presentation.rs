//! Client-local pending selection and the display overlay

use cake_engine::{Category, Ingredient, Phase, SessionState};
use serde::Serialize;

/// An ingredient the player is previewing for the current step.
/// Never reaches the engine except folded into a confirm.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct PresentationState {
    pending: Option<Ingredient>,
}

impl PresentationState {
    pub fn pending(&self) -> Option<Ingredient> {
        self.pending
    }

    /// Preview `ingredient` for the step at `current_step`.
    /// Returns false (and changes nothing) if there is no such step or the
    /// ingredient does not belong to it.
    pub fn select(&mut self, state: &SessionState, ingredient: Ingredient) -> bool {
        if state.phase != Phase::Playing {
            return false;
        }
        match state.current_category() {
            Some(category) if category.accepts(ingredient) => {
                self.pending = Some(ingredient);
                true
            }
            _ => false,
        }
    }

    /// Returns whether there was something to clear
    pub fn clear(&mut self) -> bool {
        self.pending.take().is_some()
    }
}

/// One drawn layer of a cake
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Layer {
    pub category: Category,
    pub ingredient: Ingredient,
    /// Previewed but not yet confirmed
    pub pending: bool,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepStatus {
    Completed,
    Current { has_pending: bool },
    Upcoming,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub struct StepMarker {
    pub category: Category,
    pub status: StepStatus,
}

/// What the "advance" control does right now
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvanceAction {
    Disabled,
    Confirm,
    Submit,
}

/// Everything a renderer needs, derived from one SessionState and an
/// optional pending selection
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct DisplaySnapshot {
    pub phase: Phase,
    pub order_number: u32,
    pub max_orders: u32,
    pub score: u32,
    pub lives_remaining: u32,
    pub max_mistakes: u32,
    /// Target cake, bottom layer first
    pub target: Vec<Layer>,
    /// Cake under assembly, bottom layer first
    pub assembly: Vec<Layer>,
    pub steps: Vec<StepMarker>,
    /// Ingredients selectable for the current step
    pub choices: Vec<Ingredient>,
    pub selected: Option<Ingredient>,
    pub can_go_back: bool,
    pub advance: AdvanceAction,
}

/// Overlay `pending` onto the confirmed layers of `state`
pub fn compose(state: &SessionState, pending: Option<Ingredient>) -> DisplaySnapshot {
    let playing = state.phase == Phase::Playing;
    // A pending pick only means something while a step is open
    let pending = pending.filter(|_| playing && state.current_category().is_some());

    let target = state
        .step_categories
        .iter()
        .filter_map(|&category| {
            state.order.get(&category).map(|&ingredient| Layer {
                category,
                ingredient,
                pending: false,
            })
        })
        .collect();

    let mut assembly = Vec::with_capacity(state.total_steps());
    let mut steps = Vec::with_capacity(state.total_steps());
    for (i, &category) in state.step_categories.iter().enumerate() {
        if let Some(&ingredient) = state.current.get(&category) {
            assembly.push(Layer {
                category,
                ingredient,
                pending: false,
            });
        } else if i == state.current_step {
            if let Some(ingredient) = pending {
                assembly.push(Layer {
                    category,
                    ingredient,
                    pending: true,
                });
            }
        }

        let status = if i < state.current_step {
            StepStatus::Completed
        } else if i == state.current_step {
            StepStatus::Current {
                has_pending: pending.is_some(),
            }
        } else {
            StepStatus::Upcoming
        };
        steps.push(StepMarker { category, status });
    }

    let choices = match state.current_category() {
        Some(category) if playing => category.ingredients().to_vec(),
        _ => Vec::new(),
    };

    let advance = if !playing {
        AdvanceAction::Disabled
    } else if state.is_assembled() {
        AdvanceAction::Submit
    } else if pending.is_some() {
        AdvanceAction::Confirm
    } else {
        AdvanceAction::Disabled
    };

    DisplaySnapshot {
        phase: state.phase,
        order_number: state.order_number,
        max_orders: state.max_orders,
        score: state.score,
        lives_remaining: state.lives_remaining(),
        max_mistakes: state.max_mistakes,
        target,
        assembly,
        steps,
        choices,
        selected: pending,
        can_go_back: playing && (state.current_step > 0 || pending.is_some()),
        advance,
    }
}
