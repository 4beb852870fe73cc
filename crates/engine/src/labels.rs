//! Human-readable names for categories and ingredients.
//!
//! Pure data: renderers look identifiers up here. Nothing in the state machine
//! reads these tables.

use crate::{Category, Ingredient};

pub const CATEGORY_LABELS: [(Category, &str); 5] = [
    (Category::Base, "Sponge"),
    (Category::Cream, "Cream"),
    (Category::Topping, "Topping"),
    (Category::Decoration, "Decoration"),
    (Category::Sauce, "Sauce"),
];

/// Some ingredients read differently depending on the layer they sit on,
/// so labels are keyed by (category, ingredient).
pub const INGREDIENT_LABELS: [(Category, Ingredient, &str); 15] = [
    (Category::Base, Ingredient::Vanilla, "Vanilla"),
    (Category::Base, Ingredient::Chocolate, "Chocolate"),
    (Category::Base, Ingredient::Strawberry, "Strawberry"),
    (Category::Cream, Ingredient::Whipped, "Whipped"),
    (Category::Cream, Ingredient::Chocolate, "Choco Cream"),
    (Category::Cream, Ingredient::Strawberry, "Berry Cream"),
    (Category::Topping, Ingredient::Cherry, "Cherry"),
    (Category::Topping, Ingredient::Cookie, "Cookie"),
    (Category::Topping, Ingredient::Nuts, "Nuts"),
    (Category::Decoration, Ingredient::Sprinkles, "Sprinkles"),
    (Category::Decoration, Ingredient::ChocolateChips, "Choco Chips"),
    (Category::Decoration, Ingredient::Star, "Star"),
    (Category::Sauce, Ingredient::Caramel, "Caramel"),
    (Category::Sauce, Ingredient::Chocolate, "Choco Sauce"),
    (Category::Sauce, Ingredient::Strawberry, "Berry Sauce"),
];

pub fn category_label(category: Category) -> &'static str {
    CATEGORY_LABELS
        .iter()
        .find(|(c, _)| *c == category)
        .map(|(_, label)| *label)
        .unwrap_or(category.as_str())
}

/// Falls back to the raw identifier for pairs the catalog does not contain
pub fn ingredient_label(category: Category, ingredient: Ingredient) -> &'static str {
    INGREDIENT_LABELS
        .iter()
        .find(|(c, i, _)| *c == category && *i == ingredient)
        .map(|(_, _, label)| *label)
        .unwrap_or(ingredient.as_str())
}
