//! Terminal rendering for Cake Factory
//!
//! Projects a `DisplaySnapshot` into colorized text. Confirmed layers are drawn
//! solid, a pending (unconfirmed) layer is drawn dim with a `?` marker.

use std::fmt::Write as _;

use cake_engine::labels::{category_label, ingredient_label};
use cake_engine::{Ingredient, Phase};
use cake_session::{AdvanceAction, DisplaySnapshot, Layer, StepStatus};

// ANSI codes for layer display
pub const CREAM: &str = "\x1b[97m";
pub const BROWN: &str = "\x1b[33m";
pub const PINK: &str = "\x1b[95m";
pub const RED: &str = "\x1b[91m";
pub const YELLOW: &str = "\x1b[93m";
pub const GREEN: &str = "\x1b[92m";
pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";
pub const DIM: &str = "\x1b[2m";

pub fn ingredient_color(ingredient: Ingredient) -> &'static str {
    match ingredient {
        Ingredient::Vanilla | Ingredient::Whipped => CREAM,
        Ingredient::Chocolate | Ingredient::ChocolateChips | Ingredient::Cookie => BROWN,
        Ingredient::Strawberry => PINK,
        Ingredient::Cherry => RED,
        Ingredient::Nuts | Ingredient::Caramel | Ingredient::Star => YELLOW,
        Ingredient::Sprinkles => GREEN,
    }
}

/// One cake layer, e.g. `Cream: Whipped`
pub fn format_layer(layer: &Layer) -> String {
    let name = ingredient_label(layer.category, layer.ingredient);
    if layer.pending {
        format!(
            "{DIM}{}: {} ?{RESET}",
            category_label(layer.category),
            name
        )
    } else {
        format!(
            "{}: {}{}{}",
            category_label(layer.category),
            ingredient_color(layer.ingredient),
            name,
            RESET
        )
    }
}

/// Full hearts for remaining lives, hollow ones for lost lives
pub fn format_lives(remaining: u32, max: u32) -> String {
    (0..max)
        .map(|i| if i < remaining { "♥" } else { "♡" })
        .collect::<Vec<_>>()
        .join(" ")
}

fn write_cake(out: &mut String, layers: &[Layer]) {
    if layers.is_empty() {
        let _ = writeln!(out, "  {DIM}(empty plate){RESET}");
        return;
    }
    // Top layer first, the way a cake is looked at
    for layer in layers.iter().rev() {
        let _ = writeln!(out, "  {}", format_layer(layer));
    }
}

fn format_steps(snapshot: &DisplaySnapshot) -> String {
    snapshot
        .steps
        .iter()
        .map(|marker| {
            let name = category_label(marker.category);
            match marker.status {
                StepStatus::Completed => format!("[x] {name}"),
                StepStatus::Current { has_pending: true } => format!("{BOLD}[?] {name}{RESET}"),
                StepStatus::Current { has_pending: false } => format!("{BOLD}[>] {name}{RESET}"),
                StepStatus::Upcoming => format!("{DIM}[ ] {name}{RESET}"),
            }
        })
        .collect::<Vec<_>>()
        .join(" - ")
}

/// Render the whole board as text
pub fn render_snapshot(snapshot: &DisplaySnapshot) -> String {
    let mut out = String::new();
    let rule = "══════════════════════════════════════════════════════════════";

    let _ = writeln!(out, "\n{BOLD}{rule}{RESET}");
    let _ = writeln!(
        out,
        "{BOLD}  Order {}/{}{RESET}   |   Score: {}   |   Lives: {}",
        snapshot.order_number,
        snapshot.max_orders,
        snapshot.score,
        format_lives(snapshot.lives_remaining, snapshot.max_mistakes)
    );
    let _ = writeln!(out, "{BOLD}{rule}{RESET}\n");

    let _ = writeln!(out, "{BOLD}ORDER:{RESET}");
    write_cake(&mut out, &snapshot.target);

    let _ = writeln!(out, "\n{BOLD}STEPS:{RESET} {}", format_steps(snapshot));

    let _ = writeln!(out, "\n{BOLD}YOUR CAKE:{RESET}");
    write_cake(&mut out, &snapshot.assembly);

    match snapshot.phase {
        Phase::Playing => {}
        Phase::GameOver => {
            let _ = writeln!(out, "\n{BOLD}{RED}GAME OVER{RESET}   Score: {}", snapshot.score);
        }
        Phase::GameClear => {
            let _ = writeln!(
                out,
                "\n{BOLD}{GREEN}GAME CLEAR!{RESET}   Every order delivered."
            );
        }
    }

    out
}

/// Numbered ingredient choices plus the controls that are live right now
pub fn render_controls(snapshot: &DisplaySnapshot) -> String {
    let mut out = String::new();

    if let Some(marker) = snapshot
        .steps
        .iter()
        .find(|m| matches!(m.status, StepStatus::Current { .. }))
    {
        if !snapshot.choices.is_empty() {
            let _ = writeln!(out, "\n{BOLD}Pick a {}:{RESET}", category_label(marker.category));
            for (i, &ingredient) in snapshot.choices.iter().enumerate() {
                let selected = if snapshot.selected == Some(ingredient) {
                    " <"
                } else {
                    ""
                };
                let _ = writeln!(
                    out,
                    "  {}: {}{}{}{}",
                    i + 1,
                    ingredient_color(ingredient),
                    ingredient_label(marker.category, ingredient),
                    RESET,
                    selected
                );
            }
        }
    }

    let mut controls = Vec::new();
    match snapshot.advance {
        AdvanceAction::Confirm => controls.push("n: confirm"),
        AdvanceAction::Submit => controls.push("n: submit"),
        AdvanceAction::Disabled => {}
    }
    if snapshot.can_go_back {
        controls.push("b: back");
    }
    controls.push("r: new game");
    controls.push("q: quit");
    let _ = writeln!(out, "\n{DIM}{}{RESET}", controls.join("   "));

    out
}

pub fn format_feedback(correct: bool) -> String {
    if correct {
        format!("{BOLD}{GREEN}Correct!{RESET}")
    } else {
        format!("{BOLD}{RED}Not quite...{RESET}")
    }
}
