mod menu_page;
mod nutrition_page;
pub mod static_selector;
mod text;

pub use menu_page::{LocationDayRecord, MenuPage};
#[cfg(test)]
pub use menu_page::{MealEntry, MealSlot, MenuItem};
pub use nutrition_page::NutritionFacts;

/// Placeholder for a title, name, or nutrition field the page did not have.
pub const NOT_FOUND: &str = "Not found";
/// Placeholder for a restriction icon without a `title` attribute.
pub const NO_TITLE: &str = "No title";
