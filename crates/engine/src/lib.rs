//! Cake Factory Game Engine
//!
//! The authoritative state machine for the cake assembly game. A player rebuilds
//! a target cake by confirming one ingredient per step, then submits the assembly
//! for scoring. The core object is a single `SessionState` (plain data); every
//! transition is a pure function that takes the current state by reference and
//! returns a new one, so a rejected transition never touches the caller's copy.

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod labels;

// =============================================================================
// Section 1: Catalog (categories and ingredients)
// =============================================================================

pub const CATEGORY_COUNT: usize = 5;

/// Default number of wrong submissions before the game is lost
pub const DEFAULT_MAX_MISTAKES: u32 = 5;

/// Default number of orders to complete for a clear
pub const DEFAULT_MAX_ORDERS: u32 = 3;

/// A layer of the cake. Declaration order is the stacking order.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Base,
    Cream,
    Topping,
    Decoration,
    Sauce,
}

pub const ALL_CATEGORIES: [Category; CATEGORY_COUNT] = [
    Category::Base,
    Category::Cream,
    Category::Topping,
    Category::Decoration,
    Category::Sauce,
];

/// Steps every order starts with. The final order adds decoration and sauce.
pub const STANDARD_STEPS: [Category; 3] = [Category::Base, Category::Cream, Category::Topping];

#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ingredient {
    Vanilla,
    Chocolate,
    Strawberry,
    Whipped,
    Cherry,
    Cookie,
    Nuts,
    Sprinkles,
    ChocolateChips,
    Star,
    Caramel,
}

pub const ALL_INGREDIENTS: [Ingredient; 11] = [
    Ingredient::Vanilla,
    Ingredient::Chocolate,
    Ingredient::Strawberry,
    Ingredient::Whipped,
    Ingredient::Cherry,
    Ingredient::Cookie,
    Ingredient::Nuts,
    Ingredient::Sprinkles,
    Ingredient::ChocolateChips,
    Ingredient::Star,
    Ingredient::Caramel,
];

pub const BASES: [Ingredient; 3] = [
    Ingredient::Vanilla,
    Ingredient::Chocolate,
    Ingredient::Strawberry,
];
pub const CREAMS: [Ingredient; 3] = [
    Ingredient::Whipped,
    Ingredient::Chocolate,
    Ingredient::Strawberry,
];
pub const TOPPINGS: [Ingredient; 3] = [Ingredient::Cherry, Ingredient::Cookie, Ingredient::Nuts];
pub const DECORATIONS: [Ingredient; 3] = [
    Ingredient::Sprinkles,
    Ingredient::ChocolateChips,
    Ingredient::Star,
];
pub const SAUCES: [Ingredient; 3] = [
    Ingredient::Caramel,
    Ingredient::Chocolate,
    Ingredient::Strawberry,
];

impl Category {
    /// Ingredients that may be placed on this layer
    pub fn ingredients(self) -> &'static [Ingredient] {
        match self {
            Category::Base => &BASES,
            Category::Cream => &CREAMS,
            Category::Topping => &TOPPINGS,
            Category::Decoration => &DECORATIONS,
            Category::Sauce => &SAUCES,
        }
    }

    pub fn accepts(self, ingredient: Ingredient) -> bool {
        self.ingredients().contains(&ingredient)
    }

    /// Wire identifier (matches the serde form)
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Base => "base",
            Category::Cream => "cream",
            Category::Topping => "topping",
            Category::Decoration => "decoration",
            Category::Sauce => "sauce",
        }
    }

    pub fn from_id(id: &str) -> Option<Category> {
        ALL_CATEGORIES.into_iter().find(|c| c.as_str() == id)
    }
}

impl Ingredient {
    /// Wire identifier (matches the serde form)
    pub fn as_str(self) -> &'static str {
        match self {
            Ingredient::Vanilla => "vanilla",
            Ingredient::Chocolate => "chocolate",
            Ingredient::Strawberry => "strawberry",
            Ingredient::Whipped => "whipped",
            Ingredient::Cherry => "cherry",
            Ingredient::Cookie => "cookie",
            Ingredient::Nuts => "nuts",
            Ingredient::Sprinkles => "sprinkles",
            Ingredient::ChocolateChips => "chocolate_chips",
            Ingredient::Star => "star",
            Ingredient::Caramel => "caramel",
        }
    }

    pub fn from_id(id: &str) -> Option<Ingredient> {
        ALL_INGREDIENTS.into_iter().find(|i| i.as_str() == id)
    }
}

/// Category -> ingredient mapping, used both for targets and confirmed layers
pub type Assembly = BTreeMap<Category, Ingredient>;

// =============================================================================
// Section 2: Orders and order generation
// =============================================================================

/// Reasons an order cannot be built
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum OrderError {
    #[error("order has no steps")]
    Empty,
    #[error("category {0:?} appears more than once in the step sequence")]
    RepeatedCategory(Category),
    #[error("no target ingredient for step {0:?}")]
    MissingTarget(Category),
    #[error("target given for {0:?}, which is not a step of this order")]
    ExtraTarget(Category),
    #[error("{ingredient:?} is not a valid {category:?} ingredient")]
    InvalidIngredient {
        category: Category,
        ingredient: Ingredient,
    },
}

/// A target cake: the ordered steps and the ingredient wanted for each.
///
/// Only constructible through [`Order::new`], so every `Order` in circulation
/// has a non-empty step list without repeats and exactly one valid target per step.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Order {
    steps: Vec<Category>,
    targets: Assembly,
}

impl Order {
    pub fn new(steps: Vec<Category>, targets: Assembly) -> Result<Self, OrderError> {
        if steps.is_empty() {
            return Err(OrderError::Empty);
        }

        let mut seen = [false; CATEGORY_COUNT];
        for &category in &steps {
            if seen[category as usize] {
                return Err(OrderError::RepeatedCategory(category));
            }
            seen[category as usize] = true;

            let ingredient = *targets
                .get(&category)
                .ok_or(OrderError::MissingTarget(category))?;
            if !category.accepts(ingredient) {
                return Err(OrderError::InvalidIngredient {
                    category,
                    ingredient,
                });
            }
        }

        if let Some(&extra) = targets.keys().find(|c| !seen[**c as usize]) {
            return Err(OrderError::ExtraTarget(extra));
        }

        Ok(Order { steps, targets })
    }

    /// Build an order from `(step, target)` pairs in step order
    pub fn from_picks(picks: &[(Category, Ingredient)]) -> Result<Self, OrderError> {
        let steps = picks.iter().map(|&(c, _)| c).collect();
        let mut targets = Assembly::new();
        for &(category, ingredient) in picks {
            if targets.insert(category, ingredient).is_some() {
                return Err(OrderError::RepeatedCategory(category));
            }
        }
        Order::new(steps, targets)
    }

    pub fn steps(&self) -> &[Category] {
        &self.steps
    }

    pub fn targets(&self) -> &Assembly {
        &self.targets
    }

    pub fn into_parts(self) -> (Vec<Category>, Assembly) {
        (self.steps, self.targets)
    }
}

/// Source of target orders. The engine treats it as an external collaborator
/// and only relies on the guarantees carried by [`Order`].
pub trait OrderGenerator {
    /// Produce the order for `order_number` (1-based) out of `max_orders`.
    /// Implementations are free to ignore both arguments.
    fn next_order(&mut self, order_number: u32, max_orders: u32) -> Order;
}

impl<G: OrderGenerator + ?Sized> OrderGenerator for &mut G {
    fn next_order(&mut self, order_number: u32, max_orders: u32) -> Order {
        (**self).next_order(order_number, max_orders)
    }
}

impl<G: OrderGenerator + ?Sized> OrderGenerator for Box<G> {
    fn next_order(&mut self, order_number: u32, max_orders: u32) -> Order {
        (**self).next_order(order_number, max_orders)
    }
}

/// Random orders: base, cream and topping every time; the final order of a
/// session also asks for decoration and sauce.
#[derive(Clone, Debug)]
pub struct RandomOrders<R> {
    rng: R,
}

impl<R: Rng> RandomOrders<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

fn pick_random(items: &[Ingredient], rng: &mut impl Rng) -> Ingredient {
    items[rng.random_range(0..items.len())]
}

impl<R: Rng> OrderGenerator for RandomOrders<R> {
    fn next_order(&mut self, order_number: u32, max_orders: u32) -> Order {
        let steps: Vec<Category> = if order_number >= max_orders {
            ALL_CATEGORIES.to_vec()
        } else {
            STANDARD_STEPS.to_vec()
        };

        let targets: Assembly = steps
            .iter()
            .map(|&c| (c, pick_random(c.ingredients(), &mut self.rng)))
            .collect();

        // Valid by construction: distinct steps, one in-catalog target each
        Order { steps, targets }
    }
}

/// Replays a fixed list of orders, wrapping around at the end
#[derive(Clone, Debug)]
pub struct ScriptedOrders {
    orders: Vec<Order>,
    next: usize,
}

impl ScriptedOrders {
    pub fn new(orders: Vec<Order>) -> Self {
        assert!(!orders.is_empty(), "ScriptedOrders needs at least one order");
        Self { orders, next: 0 }
    }
}

impl OrderGenerator for ScriptedOrders {
    fn next_order(&mut self, _order_number: u32, _max_orders: u32) -> Order {
        let order = self.orders[self.next % self.orders.len()].clone();
        self.next += 1;
        order
    }
}

// =============================================================================
// Section 3: Session configuration
// =============================================================================

#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum ConfigError {
    #[error("max_mistakes must be at least 1")]
    ZeroMaxMistakes,
    #[error("max_orders must be at least 1")]
    ZeroMaxOrders,
}

/// Limits fixed at session creation
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub max_mistakes: u32,
    pub max_orders: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            max_mistakes: DEFAULT_MAX_MISTAKES,
            max_orders: DEFAULT_MAX_ORDERS,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_mistakes == 0 {
            return Err(ConfigError::ZeroMaxMistakes);
        }
        if self.max_orders == 0 {
            return Err(ConfigError::ZeroMaxOrders);
        }
        Ok(())
    }
}

// =============================================================================
// Section 4: SessionState
// =============================================================================

/// Session phase. `GameOver` and `GameClear` are terminal until a new game.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Playing,
    GameOver,
    GameClear,
}

/// Authoritative record of one session
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub phase: Phase,
    /// 1-based index of the order being assembled
    pub order_number: u32,
    pub score: u32,
    pub mistakes: u32,
    pub max_mistakes: u32,
    pub max_orders: u32,
    /// Steps of the current order, in confirmation order
    pub step_categories: Vec<Category>,
    /// Index of the next unconfirmed step; equals `total_steps()` once assembled
    pub current_step: usize,
    /// Target for the current order
    pub order: Assembly,
    /// Confirmed layers so far
    pub current: Assembly,
}

impl SessionState {
    pub fn total_steps(&self) -> usize {
        self.step_categories.len()
    }

    pub fn is_terminal(&self) -> bool {
        self.phase != Phase::Playing
    }

    /// Every step confirmed, waiting for submission
    pub fn is_assembled(&self) -> bool {
        self.current_step >= self.total_steps()
    }

    /// Category of the step awaiting confirmation, if any
    pub fn current_category(&self) -> Option<Category> {
        self.step_categories.get(self.current_step).copied()
    }

    pub fn lives_remaining(&self) -> u32 {
        self.max_mistakes.saturating_sub(self.mistakes)
    }
}

// =============================================================================
// Section 5: State transitions as pure functions
// =============================================================================

/// The precondition a rejected transition violated
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum Rejection {
    #[error("session is not in play ({0:?})")]
    NotPlaying(Phase),
    #[error("every step is already confirmed")]
    AllStepsConfirmed,
    #[error("expected a {expected:?} selection, got {got:?}")]
    WrongCategory { expected: Category, got: Category },
    #[error("{ingredient:?} is not a valid {category:?} ingredient")]
    IngredientNotInCategory {
        category: Category,
        ingredient: Ingredient,
    },
    #[error("no confirmed step to undo")]
    NothingToUndo,
    #[error("{remaining} step(s) still unconfirmed")]
    StepsRemaining { remaining: usize },
}

/// Error type for every transition. There is a single kind; the attached
/// [`Rejection`] is diagnostic only.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum TransitionError {
    #[error("invalid transition: {0}")]
    InvalidTransition(Rejection),
}

impl TransitionError {
    pub fn rejection(&self) -> &Rejection {
        match self {
            TransitionError::InvalidTransition(r) => r,
        }
    }
}

impl From<Rejection> for TransitionError {
    fn from(rejection: Rejection) -> Self {
        TransitionError::InvalidTransition(rejection)
    }
}

/// Result of a submission: the only transition that reports more than the new state
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct SubmitOutcome {
    pub state: SessionState,
    pub correct: bool,
}

fn ensure_playing(state: &SessionState) -> Result<(), Rejection> {
    if state.phase != Phase::Playing {
        return Err(Rejection::NotPlaying(state.phase));
    }
    Ok(())
}

/// Load the next order into `state` and rewind assembly progress
fn start_order(state: &mut SessionState, generator: &mut impl OrderGenerator) {
    let (steps, targets) = generator
        .next_order(state.order_number, state.max_orders)
        .into_parts();
    state.step_categories = steps;
    state.order = targets;
    state.current.clear();
    state.current_step = 0;
}

/// Start a fresh session
pub fn new_session(config: GameConfig, generator: &mut impl OrderGenerator) -> SessionState {
    let mut state = SessionState {
        phase: Phase::Playing,
        order_number: 1,
        score: 0,
        mistakes: 0,
        max_mistakes: config.max_mistakes,
        max_orders: config.max_orders,
        step_categories: Vec::new(),
        current_step: 0,
        order: Assembly::new(),
        current: Assembly::new(),
    };
    start_order(&mut state, generator);
    state
}

/// Commit `ingredient` for the step at `current_step`
pub fn confirm(
    state: &SessionState,
    category: Category,
    ingredient: Ingredient,
) -> Result<SessionState, TransitionError> {
    ensure_playing(state)?;

    let expected = state
        .current_category()
        .ok_or(Rejection::AllStepsConfirmed)?;
    if category != expected {
        return Err(Rejection::WrongCategory {
            expected,
            got: category,
        }
        .into());
    }
    if !category.accepts(ingredient) {
        return Err(Rejection::IngredientNotInCategory {
            category,
            ingredient,
        }
        .into());
    }

    let mut next = state.clone();
    next.current.insert(category, ingredient);
    next.current_step += 1;
    Ok(next)
}

/// Reverse the most recent confirmation
pub fn undo(state: &SessionState) -> Result<SessionState, TransitionError> {
    ensure_playing(state)?;
    if state.current_step == 0 {
        return Err(Rejection::NothingToUndo.into());
    }

    let mut next = state.clone();
    next.current_step -= 1;
    let category = next.step_categories[next.current_step];
    next.current.remove(&category);
    Ok(next)
}

/// True when every step's confirmed ingredient equals the target
pub fn assembly_matches(state: &SessionState) -> bool {
    state
        .step_categories
        .iter()
        .all(|c| state.current.get(c).is_some() && state.current.get(c) == state.order.get(c))
}

/// Score the completed assembly against the order
pub fn submit(
    state: &SessionState,
    generator: &mut impl OrderGenerator,
) -> Result<SubmitOutcome, TransitionError> {
    ensure_playing(state)?;
    if !state.is_assembled() {
        return Err(Rejection::StepsRemaining {
            remaining: state.total_steps() - state.current_step,
        }
        .into());
    }

    let correct = assembly_matches(state);
    let mut next = state.clone();

    if correct {
        next.score += 1;
        if next.order_number >= next.max_orders {
            next.phase = Phase::GameClear;
        } else {
            next.order_number += 1;
            start_order(&mut next, generator);
        }
    } else {
        next.mistakes += 1;
        if next.mistakes >= next.max_mistakes {
            next.phase = Phase::GameOver;
        } else {
            // Same order, start the assembly over
            next.current.clear();
            next.current_step = 0;
        }
    }

    Ok(SubmitOutcome {
        state: next,
        correct,
    })
}

// =============================================================================
// Section 6: AssemblyEngine
// =============================================================================

/// Owns the session limits and the order generator; the only writer of
/// `SessionState`.
#[derive(Clone, Debug)]
pub struct AssemblyEngine<G> {
    config: GameConfig,
    generator: G,
}

impl<G: OrderGenerator> AssemblyEngine<G> {
    pub fn new(config: GameConfig, generator: G) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config, generator })
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn new_game(&mut self) -> SessionState {
        new_session(self.config, &mut self.generator)
    }

    pub fn confirm(
        &self,
        state: &SessionState,
        category: Category,
        ingredient: Ingredient,
    ) -> Result<SessionState, TransitionError> {
        confirm(state, category, ingredient)
    }

    pub fn undo(&self, state: &SessionState) -> Result<SessionState, TransitionError> {
        undo(state)
    }

    pub fn submit(&mut self, state: &SessionState) -> Result<SubmitOutcome, TransitionError> {
        submit(state, &mut self.generator)
    }
}

// =============================================================================
// Section 7: Invariant checks
// =============================================================================

/// Panics if `state` breaks any structural invariant of a session
pub fn assert_session_invariants(state: &SessionState) {
    let total = state.total_steps();
    assert!(
        state.current_step <= total,
        "current_step {} exceeds total_steps {total}",
        state.current_step
    );

    let confirmed = &state.step_categories[..state.current_step];
    for category in state.current.keys() {
        assert!(
            confirmed.contains(category),
            "current holds {category:?}, which is not among the first {} steps",
            state.current_step
        );
    }

    for (i, category) in state.step_categories.iter().enumerate() {
        assert!(
            !state.step_categories[..i].contains(category),
            "step category {category:?} repeats"
        );
        assert!(
            state.order.contains_key(category),
            "order has no target for step {category:?}"
        );
    }
    assert_eq!(
        state.order.len(),
        total,
        "order has targets outside the step sequence"
    );

    assert!(
        state.mistakes <= state.max_mistakes,
        "mistakes {} exceed max {}",
        state.mistakes,
        state.max_mistakes
    );
    if state.phase == Phase::Playing {
        assert!(
            (1..=state.max_orders).contains(&state.order_number),
            "order_number {} outside 1..={}",
            state.order_number,
            state.max_orders
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn random_engine(config: GameConfig, seed: u64) -> AssemblyEngine<RandomOrders<StdRng>> {
        AssemblyEngine::new(config, RandomOrders::new(StdRng::seed_from_u64(seed))).unwrap()
    }

    fn config(max_mistakes: u32, max_orders: u32) -> GameConfig {
        GameConfig {
            max_mistakes,
            max_orders,
        }
    }

    /// Confirm every remaining step with the target ingredient
    fn assemble_correct(state: &SessionState) -> SessionState {
        let mut state = state.clone();
        while let Some(category) = state.current_category() {
            let target = state.order[&category];
            state = confirm(&state, category, target).unwrap();
            assert_session_invariants(&state);
        }
        state
    }

    /// Confirm every remaining step, getting the first one wrong
    fn assemble_wrong(state: &SessionState) -> SessionState {
        let mut state = state.clone();
        while let Some(category) = state.current_category() {
            let target = state.order[&category];
            let pick = if state.current_step == 0 {
                *category.ingredients().iter().find(|&&i| i != target).unwrap()
            } else {
                target
            };
            state = confirm(&state, category, pick).unwrap();
        }
        state
    }

    // =========================================================================
    // Catalog and order tests
    // =========================================================================

    #[test]
    fn test_every_category_has_three_ingredients() {
        for category in ALL_CATEGORIES {
            assert_eq!(category.ingredients().len(), 3, "{category:?}");
        }
    }

    #[test]
    fn test_ids_match_serde_form() {
        for category in ALL_CATEGORIES {
            let json = serde_json::to_string(&category).unwrap();
            assert_eq!(json, format!("\"{}\"", category.as_str()));
            assert_eq!(Category::from_id(category.as_str()), Some(category));
        }
        for ingredient in ALL_INGREDIENTS {
            let json = serde_json::to_string(&ingredient).unwrap();
            assert_eq!(json, format!("\"{}\"", ingredient.as_str()));
            assert_eq!(Ingredient::from_id(ingredient.as_str()), Some(ingredient));
        }
        assert_eq!(Ingredient::from_id("marzipan"), None);
    }

    #[test]
    fn test_order_rejects_empty_steps() {
        assert_eq!(Order::new(Vec::new(), Assembly::new()), Err(OrderError::Empty));
    }

    #[test]
    fn test_order_rejects_repeated_category() {
        let result = Order::from_picks(&[
            (Category::Base, Ingredient::Vanilla),
            (Category::Base, Ingredient::Chocolate),
        ]);
        assert_eq!(result, Err(OrderError::RepeatedCategory(Category::Base)));
    }

    #[test]
    fn test_order_rejects_out_of_category_target() {
        let result = Order::from_picks(&[(Category::Topping, Ingredient::Vanilla)]);
        assert_eq!(
            result,
            Err(OrderError::InvalidIngredient {
                category: Category::Topping,
                ingredient: Ingredient::Vanilla,
            })
        );
    }

    #[test]
    fn test_order_rejects_missing_and_extra_targets() {
        let mut targets = Assembly::new();
        targets.insert(Category::Base, Ingredient::Vanilla);
        assert_eq!(
            Order::new(vec![Category::Base, Category::Cream], targets.clone()),
            Err(OrderError::MissingTarget(Category::Cream))
        );

        targets.insert(Category::Sauce, Ingredient::Caramel);
        assert_eq!(
            Order::new(vec![Category::Base], targets),
            Err(OrderError::ExtraTarget(Category::Sauce))
        );
    }

    #[test]
    fn test_random_orders_final_order_is_longer() {
        let mut orders = RandomOrders::new(StdRng::seed_from_u64(7));

        let first = orders.next_order(1, 3);
        assert_eq!(first.steps(), &STANDARD_STEPS);

        let last = orders.next_order(3, 3);
        assert_eq!(last.steps(), &ALL_CATEGORIES);
        for (category, ingredient) in last.targets() {
            assert!(category.accepts(*ingredient));
        }
    }

    #[test]
    fn test_scripted_orders_wrap_around() {
        let a = Order::from_picks(&[(Category::Base, Ingredient::Vanilla)]).unwrap();
        let b = Order::from_picks(&[(Category::Sauce, Ingredient::Caramel)]).unwrap();
        let mut orders = ScriptedOrders::new(vec![a.clone(), b.clone()]);

        assert_eq!(orders.next_order(1, 3), a);
        assert_eq!(orders.next_order(2, 3), b);
        assert_eq!(orders.next_order(3, 3), a);
    }

    #[test]
    fn test_config_validation() {
        assert!(GameConfig::default().validate().is_ok());
        assert_eq!(config(0, 3).validate(), Err(ConfigError::ZeroMaxMistakes));
        assert_eq!(config(3, 0).validate(), Err(ConfigError::ZeroMaxOrders));

        let engine = AssemblyEngine::new(config(0, 1), RandomOrders::new(StdRng::seed_from_u64(1)));
        assert!(engine.is_err());
    }

    // =========================================================================
    // New game tests
    // =========================================================================

    #[test]
    fn test_new_game_initial_state() {
        let mut engine = random_engine(GameConfig::default(), 42);
        let state = engine.new_game();

        assert_eq!(state.phase, Phase::Playing);
        assert_eq!(state.score, 0);
        assert_eq!(state.mistakes, 0);
        assert_eq!(state.order_number, 1);
        assert_eq!(state.current_step, 0);
        assert!(state.current.is_empty());
        assert_eq!(state.max_mistakes, DEFAULT_MAX_MISTAKES);
        assert_eq!(state.max_orders, DEFAULT_MAX_ORDERS);
        assert!(!state.step_categories.is_empty());
        assert_session_invariants(&state);
    }

    #[test]
    fn test_new_game_resets_terminal_session() {
        let mut engine = random_engine(config(1, 1), 42);
        let state = engine.new_game();
        let over = engine.submit(&assemble_wrong(&state)).unwrap().state;
        assert_eq!(over.phase, Phase::GameOver);

        let fresh = engine.new_game();
        assert_eq!(fresh.phase, Phase::Playing);
        assert_eq!(fresh.mistakes, 0);
        assert_eq!(fresh.order_number, 1);
    }

    // =========================================================================
    // Confirm tests
    // =========================================================================

    #[test]
    fn test_confirm_advances_step() {
        let mut engine = random_engine(GameConfig::default(), 42);
        let state = engine.new_game();
        let category = state.step_categories[0];
        let pick = category.ingredients()[0];

        let next = engine.confirm(&state, category, pick).unwrap();
        assert_eq!(next.current_step, 1);
        assert_eq!(next.current.get(&category), Some(&pick));
        assert_session_invariants(&next);
    }

    #[test]
    fn test_confirm_sequence_has_no_gaps() {
        let mut engine = random_engine(GameConfig::default(), 3);
        let mut state = engine.new_game();

        while let Some(category) = state.current_category() {
            state = confirm(&state, category, category.ingredients()[1]).unwrap();
            assert_eq!(state.current.len(), state.current_step);
            assert_session_invariants(&state);
        }
        assert!(state.is_assembled());
    }

    #[test]
    fn test_confirm_wrong_category_rejected() {
        let mut engine = random_engine(GameConfig::default(), 42);
        let state = engine.new_game();
        let wrong = state.step_categories[1];

        let err = confirm(&state, wrong, wrong.ingredients()[0]).unwrap_err();
        assert_eq!(
            err,
            TransitionError::InvalidTransition(Rejection::WrongCategory {
                expected: state.step_categories[0],
                got: wrong,
            })
        );
    }

    #[test]
    fn test_confirm_invalid_ingredient_rejected() {
        let mut engine = random_engine(GameConfig::default(), 42);
        let state = engine.new_game();
        assert_eq!(state.step_categories[0], Category::Base);

        let err = confirm(&state, Category::Base, Ingredient::Cherry).unwrap_err();
        assert!(matches!(
            err.rejection(),
            Rejection::IngredientNotInCategory { .. }
        ));
    }

    #[test]
    fn test_confirm_after_assembly_rejected() {
        let mut engine = random_engine(GameConfig::default(), 42);
        let state = assemble_correct(&engine.new_game());

        let last = *state.step_categories.last().unwrap();
        let err = confirm(&state, last, last.ingredients()[0]).unwrap_err();
        assert_eq!(err.rejection(), &Rejection::AllStepsConfirmed);
    }

    // =========================================================================
    // Undo tests
    // =========================================================================

    #[test]
    fn test_undo_round_trips_confirm() {
        let mut engine = random_engine(GameConfig::default(), 11);
        let mut state = engine.new_game();

        for _ in 0..state.total_steps() {
            let category = state.current_category().unwrap();
            let confirmed = confirm(&state, category, category.ingredients()[2]).unwrap();
            let restored = undo(&confirmed).unwrap();
            assert_eq!(restored, state);
            state = confirmed;
        }
    }

    #[test]
    fn test_undo_at_step_zero_rejected_repeatedly() {
        let mut engine = random_engine(config(3, 2), 42);
        let state = engine.new_game();

        for _ in 0..5 {
            let err = undo(&state).unwrap_err();
            assert_eq!(err.rejection(), &Rejection::NothingToUndo);
        }
        assert_eq!(state.mistakes, 0);
        assert_eq!(state.score, 0);
        assert_eq!(state.phase, Phase::Playing);
    }

    #[test]
    fn test_undo_after_full_assembly() {
        let mut engine = random_engine(GameConfig::default(), 42);
        let state = assemble_correct(&engine.new_game());
        let last = *state.step_categories.last().unwrap();

        let next = undo(&state).unwrap();
        assert_eq!(next.current_step, state.total_steps() - 1);
        assert!(!next.current.contains_key(&last));
        assert_session_invariants(&next);
    }

    // =========================================================================
    // Submit tests
    // =========================================================================

    #[test]
    fn test_submit_before_completion_rejected() {
        let mut engine = random_engine(GameConfig::default(), 42);
        let mut state = engine.new_game();

        while let Some(category) = state.current_category() {
            let before = state.clone();
            let err = engine.submit(&state).unwrap_err();
            assert!(matches!(err.rejection(), Rejection::StepsRemaining { .. }));
            assert_eq!(state, before);
            state = confirm(&state, category, state.order[&category]).unwrap();
        }
        assert!(engine.submit(&state).is_ok());
    }

    #[test]
    fn test_three_wrong_submissions_end_game() {
        let mut engine = random_engine(config(3, 3), 5);
        let mut state = engine.new_game();
        let first_order = state.order.clone();

        for expected in 1..=3 {
            let outcome = engine.submit(&assemble_wrong(&state)).unwrap();
            assert!(!outcome.correct);
            assert_eq!(outcome.state.mistakes, expected);
            if expected < 3 {
                assert_eq!(outcome.state.phase, Phase::Playing);
                assert_eq!(outcome.state.current_step, 0);
                assert!(outcome.state.current.is_empty());
                assert_eq!(outcome.state.order, first_order, "same order is retried");
            } else {
                assert_eq!(outcome.state.phase, Phase::GameOver);
            }
            assert_session_invariants(&outcome.state);
            state = outcome.state;
        }
    }

    #[test]
    fn test_single_order_clear() {
        let mut engine = random_engine(config(3, 1), 42);
        let state = engine.new_game();
        assert_eq!(state.step_categories, ALL_CATEGORIES.to_vec());

        let outcome = engine.submit(&assemble_correct(&state)).unwrap();
        assert!(outcome.correct);
        assert_eq!(outcome.state.phase, Phase::GameClear);
        assert_eq!(outcome.state.score, 1);
    }

    #[test]
    fn test_correct_submission_starts_next_order() {
        let mut engine = random_engine(config(3, 2), 42);
        let state = engine.new_game();

        let outcome = engine.submit(&assemble_correct(&state)).unwrap();
        assert!(outcome.correct);
        let next = outcome.state;
        assert_eq!(next.order_number, 2);
        assert_eq!(next.phase, Phase::Playing);
        assert_eq!(next.current_step, 0);
        assert!(next.current.is_empty());
        assert_eq!(next.order.len(), next.total_steps());
        assert_eq!(next.score, 1);
        assert_session_invariants(&next);
    }

    #[test]
    fn test_terminal_state_is_frozen() {
        let mut engine = random_engine(config(1, 1), 9);
        let state = engine.new_game();
        let cleared = engine.submit(&assemble_correct(&state)).unwrap().state;
        assert_eq!(cleared.phase, Phase::GameClear);

        let category = cleared.step_categories[0];
        let not_playing = TransitionError::InvalidTransition(Rejection::NotPlaying(Phase::GameClear));
        assert_eq!(
            confirm(&cleared, category, category.ingredients()[0]),
            Err(not_playing.clone())
        );
        assert_eq!(undo(&cleared), Err(not_playing.clone()));
        assert_eq!(engine.submit(&cleared), Err(not_playing));
    }

    #[test]
    fn test_scripted_session_walkthrough() {
        let cake = Order::from_picks(&[
            (Category::Base, Ingredient::Chocolate),
            (Category::Sauce, Ingredient::Strawberry),
        ])
        .unwrap();
        let mut engine = AssemblyEngine::new(config(2, 2), ScriptedOrders::new(vec![cake])).unwrap();

        let state = engine.new_game();
        assert_eq!(state.step_categories, vec![Category::Base, Category::Sauce]);

        let state = confirm(&state, Category::Base, Ingredient::Chocolate).unwrap();
        let state = confirm(&state, Category::Sauce, Ingredient::Strawberry).unwrap();
        let outcome = engine.submit(&state).unwrap();
        assert!(outcome.correct);
        assert_eq!(outcome.state.order_number, 2);

        let state = confirm(&outcome.state, Category::Base, Ingredient::Chocolate).unwrap();
        let state = confirm(&state, Category::Sauce, Ingredient::Strawberry).unwrap();
        let outcome = engine.submit(&state).unwrap();
        assert_eq!(outcome.state.phase, Phase::GameClear);
        assert_eq!(outcome.state.score, 2);
    }

    // =========================================================================
    // Full session simulation
    // =========================================================================

    #[test]
    fn test_random_play_keeps_invariants() {
        let mut rng = StdRng::seed_from_u64(2024);
        let mut engine = random_engine(GameConfig::default(), 77);

        for _ in 0..20 {
            let mut state = engine.new_game();
            let mut moves = 0;
            while state.phase == Phase::Playing && moves < 500 {
                assert_session_invariants(&state);
                let roll = rng.random_range(0..10);
                state = if state.is_assembled() {
                    engine.submit(&state).unwrap().state
                } else if roll == 0 && state.current_step > 0 {
                    undo(&state).unwrap()
                } else {
                    let category = state.current_category().unwrap();
                    let target = state.order[&category];
                    let pick = if roll < 8 {
                        target
                    } else {
                        pick_random(category.ingredients(), &mut rng)
                    };
                    confirm(&state, category, pick).unwrap()
                };
                moves += 1;
            }
            assert!(state.is_terminal(), "session should finish");
            assert_session_invariants(&state);
        }
    }

    #[test]
    fn test_session_state_json_shape() {
        let mut engine = random_engine(GameConfig::default(), 42);
        let state = engine.new_game();
        let value = serde_json::to_value(&state).unwrap();

        assert_eq!(value["phase"], "playing");
        assert_eq!(value["orderNumber"], 1);
        assert_eq!(value["currentStep"], 0);
        assert_eq!(value["stepCategories"][0], "base");
        assert!(value["order"]["base"].is_string());

        let back: SessionState = serde_json::from_value(value).unwrap();
        assert_eq!(back, state);
    }
}
