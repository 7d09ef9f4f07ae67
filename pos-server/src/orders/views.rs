//! Kitchen, bar and general projections of the canonical order

use shared::models::{Audience, Order, OrderLine, OrderView};

/// Category fragments that route a line to the bar
const DRINK_CATEGORIES: &[&str] = &[
    "drink",
    "beverage",
    "cocktail",
    "wine",
    "beer",
    "alcohol",
    "soft drink",
    "spirit",
];

/// Whole words in a line name that route it to the bar
const DRINK_KEYWORDS: &[&str] = &[
    "coffee",
    "tea",
    "soda",
    "juice",
    "smoothie",
    "cocktail",
    "mocktail",
    "wine",
    "beer",
    "alcohol",
    "latte",
    "espresso",
    "cappuccino",
    "lemonade",
    "cola",
    "water",
    "shake",
];

/// Dishes whose names contain a drink word
const FOOD_EXCEPTIONS: &[&str] = &[
    "coffee cake",
    "coffee ice cream",
    "tea sandwich",
    "tea cookies",
    "tea cake",
    "beer battered",
    "wine sauce",
];

/// Whether a line is prepared at the bar rather than in the kitchen
pub fn is_drink(line: &OrderLine) -> bool {
    let category = line.category.to_lowercase();
    if DRINK_CATEGORIES.iter().any(|c| category.contains(c)) {
        return true;
    }

    let name = line.name.to_lowercase();
    if FOOD_EXCEPTIONS.iter().any(|e| name.contains(e)) {
        return false;
    }
    name.split(|c: char| !c.is_alphanumeric())
        .any(|word| DRINK_KEYWORDS.contains(&word))
}

fn visible(audience: Audience, line: &OrderLine) -> bool {
    match audience {
        Audience::Kitchen => !is_drink(line),
        Audience::Bar => is_drink(line),
        Audience::General => true,
    }
}

/// Project an order for one audience
///
/// Pure function of the stored order: the status is copied verbatim, so two
/// views built from the same read can never disagree on it.
pub fn project(order: &Order, audience: Audience) -> OrderView {
    OrderView {
        order_id: order.id,
        audience,
        status: order.status,
        order_type: order.order_type,
        table_number: order.table_number,
        customer_name: order.customer_name.clone(),
        special_requests: order.special_requests.clone(),
        lines: order
            .lines
            .iter()
            .filter(|line| visible(audience, line))
            .cloned()
            .collect(),
        total: (audience == Audience::General).then_some(order.total),
        created_at: order.created_at,
        updated_at: order.updated_at,
        version: order.version,
    }
}

/// Whether a station has anything to prepare for this order
pub fn has_work_for(order: &Order, audience: Audience) -> bool {
    order.lines.iter().any(|line| visible(audience, line))
}
