use std::fmt::Write as _;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use wasm_bindgen::prelude::*;

use cake_engine::labels::{category_label, ingredient_label};
use cake_engine::{AssemblyEngine, GameConfig, Ingredient, Phase, RandomOrders};
use cake_session::{
    AdvanceAction, Client, ClientConfig, ClientError, DisplaySnapshot, Layer, LocalTransport,
    Outcome, SessionHost, StepStatus,
};

type BrowserClient = Client<LocalTransport<RandomOrders<StdRng>>>;

fn outcome_name(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Suppressed => "suppressed",
        Outcome::Ignored => "ignored",
        Outcome::Previewed => "previewed",
        Outcome::PendingCleared => "pending_cleared",
        Outcome::Applied => "applied",
        Outcome::SubmissionHeld { .. } => "submission_held",
    }
}

fn to_js_error(err: ClientError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

#[derive(Serialize)]
struct LayerView {
    category: String,
    category_label: String,
    ingredient: String,
    label: String,
    pending: bool,
}

impl From<&Layer> for LayerView {
    fn from(layer: &Layer) -> Self {
        LayerView {
            category: layer.category.as_str().to_string(),
            category_label: category_label(layer.category).to_string(),
            ingredient: layer.ingredient.as_str().to_string(),
            label: ingredient_label(layer.category, layer.ingredient).to_string(),
            pending: layer.pending,
        }
    }
}

#[derive(Serialize)]
struct StepView {
    category: String,
    label: String,
    status: String,
    has_pending: bool,
}

#[derive(Serialize)]
struct ChoiceView {
    ingredient: String,
    label: String,
    selected: bool,
}

#[derive(Serialize)]
struct BoardView {
    phase: String,
    order_number: u32,
    max_orders: u32,
    score: u32,
    lives_remaining: u32,
    max_mistakes: u32,
    target: Vec<LayerView>,
    assembly: Vec<LayerView>,
    steps: Vec<StepView>,
    choices: Vec<ChoiceView>,
    can_go_back: bool,
    advance: String,
    busy: bool,
    /// Set while a submission result is being shown
    feedback: Option<bool>,
}

fn phase_name(phase: Phase) -> &'static str {
    match phase {
        Phase::Playing => "playing",
        Phase::GameOver => "gameover",
        Phase::GameClear => "gameclear",
    }
}

fn board_view(snapshot: &DisplaySnapshot, busy: bool, feedback: Option<bool>) -> BoardView {
    let steps = snapshot
        .steps
        .iter()
        .map(|marker| {
            let (status, has_pending) = match marker.status {
                StepStatus::Completed => ("completed", false),
                StepStatus::Current { has_pending } => ("current", has_pending),
                StepStatus::Upcoming => ("upcoming", false),
            };
            StepView {
                category: marker.category.as_str().to_string(),
                label: category_label(marker.category).to_string(),
                status: status.to_string(),
                has_pending,
            }
        })
        .collect();

    let current = snapshot
        .steps
        .iter()
        .find(|m| matches!(m.status, StepStatus::Current { .. }))
        .map(|m| m.category);
    let choices = match current {
        Some(category) => snapshot
            .choices
            .iter()
            .map(|&ingredient| ChoiceView {
                ingredient: ingredient.as_str().to_string(),
                label: ingredient_label(category, ingredient).to_string(),
                selected: snapshot.selected == Some(ingredient),
            })
            .collect(),
        None => Vec::new(),
    };

    let advance = match snapshot.advance {
        AdvanceAction::Disabled => "disabled",
        AdvanceAction::Confirm => "confirm",
        AdvanceAction::Submit => "submit",
    };

    BoardView {
        phase: phase_name(snapshot.phase).to_string(),
        order_number: snapshot.order_number,
        max_orders: snapshot.max_orders,
        score: snapshot.score,
        lives_remaining: snapshot.lives_remaining,
        max_mistakes: snapshot.max_mistakes,
        target: snapshot.target.iter().map(LayerView::from).collect(),
        assembly: snapshot.assembly.iter().map(LayerView::from).collect(),
        steps,
        choices,
        can_go_back: snapshot.can_go_back,
        advance: advance.to_string(),
        busy,
        feedback,
    }
}

fn render_board_text(snapshot: &DisplaySnapshot, feedback: Option<bool>) -> String {
    let mut out = String::new();

    let hearts: String = (0..snapshot.max_mistakes)
        .map(|i| if i < snapshot.lives_remaining { '♥' } else { '♡' })
        .collect();
    let _ = writeln!(
        out,
        "Order {}/{}  Score {}  {}",
        snapshot.order_number, snapshot.max_orders, snapshot.score, hearts
    );

    let _ = writeln!(out, "Order:");
    for layer in snapshot.target.iter().rev() {
        let _ = writeln!(
            out,
            "  {}: {}",
            category_label(layer.category),
            ingredient_label(layer.category, layer.ingredient)
        );
    }
    let _ = writeln!(out, "Cake:");
    for layer in snapshot.assembly.iter().rev() {
        let marker = if layer.pending { " ?" } else { "" };
        let _ = writeln!(
            out,
            "  {}: {}{}",
            category_label(layer.category),
            ingredient_label(layer.category, layer.ingredient),
            marker
        );
    }

    match (feedback, snapshot.phase) {
        (Some(true), _) => out.push_str("Correct!\n"),
        (Some(false), _) => out.push_str("Not quite...\n"),
        (None, Phase::GameOver) => out.push_str("GAME OVER\n"),
        (None, Phase::GameClear) => out.push_str("GAME CLEAR!\n"),
        (None, Phase::Playing) => {}
    }

    out
}

#[wasm_bindgen]
pub struct SessionHandle {
    client: BrowserClient,
}

/// Open a local game session. Zero limits fall back to the defaults.
#[wasm_bindgen]
pub fn new_session(seed: u64, max_mistakes: u32, max_orders: u32) -> Result<SessionHandle, JsValue> {
    open_session(seed, max_mistakes, max_orders).map_err(|e| JsValue::from_str(&e))
}

fn open_session(seed: u64, max_mistakes: u32, max_orders: u32) -> Result<SessionHandle, String> {
    let defaults = GameConfig::default();
    let config = GameConfig {
        max_mistakes: if max_mistakes == 0 {
            defaults.max_mistakes
        } else {
            max_mistakes
        },
        max_orders: if max_orders == 0 {
            defaults.max_orders
        } else {
            max_orders
        },
    };

    let engine = AssemblyEngine::new(config, RandomOrders::new(StdRng::seed_from_u64(seed)))
        .map_err(|e| format!("Invalid config: {e}"))?;
    let host = SessionHost::new(engine, seed.wrapping_add(1));
    let mut client = Client::new(LocalTransport::new(host), ClientConfig::default());
    client
        .new_game()
        .map_err(|e| format!("Failed to start game: {e}"))?;
    Ok(SessionHandle { client })
}

impl SessionHandle {
    fn snapshot(&self) -> Result<DisplaySnapshot, ClientError> {
        self.client.display().ok_or(ClientError::NoSession)
    }

    fn select_id(&mut self, ingredient: &str) -> Outcome {
        match Ingredient::from_id(ingredient) {
            Some(ingredient) => self.client.select(ingredient),
            None => Outcome::Ignored,
        }
    }
}

#[wasm_bindgen]
impl SessionHandle {
    #[wasm_bindgen]
    pub fn session_id(&self) -> Option<String> {
        self.client.session_id().map(|id| id.to_string())
    }

    /// Milliseconds the caller should wait before `finish_submission`
    #[wasm_bindgen]
    pub fn hold_ms(&self) -> u32 {
        self.client.config().submission_hold.as_millis() as u32
    }

    #[wasm_bindgen]
    pub fn is_busy(&self) -> bool {
        self.client.is_busy()
    }

    #[wasm_bindgen]
    pub fn select(&mut self, ingredient: &str) -> String {
        outcome_name(self.select_id(ingredient)).to_string()
    }

    #[wasm_bindgen]
    pub fn go_back(&mut self) -> Result<String, JsValue> {
        self.client
            .go_back()
            .map(|o| outcome_name(o).to_string())
            .map_err(to_js_error)
    }

    #[wasm_bindgen]
    pub fn advance(&mut self) -> Result<String, JsValue> {
        self.client
            .advance()
            .map(|o| outcome_name(o).to_string())
            .map_err(to_js_error)
    }

    /// Result of the held submission: `Some(true)` for a match
    #[wasm_bindgen]
    pub fn feedback(&self) -> Option<bool> {
        self.client.held_feedback()
    }

    #[wasm_bindgen]
    pub fn finish_submission(&mut self) -> String {
        outcome_name(self.client.finish_submission()).to_string()
    }

    #[wasm_bindgen]
    pub fn new_game(&mut self) -> Result<String, JsValue> {
        self.client
            .new_game()
            .map(|o| outcome_name(o).to_string())
            .map_err(to_js_error)
    }

    #[wasm_bindgen]
    pub fn render_text(&self) -> Result<String, JsValue> {
        let snapshot = self.snapshot().map_err(to_js_error)?;
        Ok(render_board_text(&snapshot, self.client.held_feedback()))
    }

    #[wasm_bindgen]
    pub fn view(&self) -> Result<JsValue, JsValue> {
        let snapshot = self.snapshot().map_err(to_js_error)?;
        let view = board_view(&snapshot, self.client.is_busy(), self.client.held_feedback());
        serde_wasm_bindgen::to_value(&view)
            .map_err(|e| JsValue::from_str(&format!("Failed to serialize view: {e}")))
    }
}
