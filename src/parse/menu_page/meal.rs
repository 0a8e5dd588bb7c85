use super::food_item::MenuItem;
use crate::parse::{text::stripped_text, NOT_FOUND};
use crate::static_selector;

#[derive(
    Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum MealSlot {
    Breakfast,
    Brunch,
    Lunch,
    Dinner,
}

impl MealSlot {
    /// Labels for the three meal panes (`pane-1`, `pane-2`, `pane-3`) given
    /// which of them exist on the page. A page with only the first two panes
    /// serves brunch and dinner; every other layout keeps the default
    /// breakfast/lunch/dinner labels and absent panes get no label.
    pub const fn pane_labels(present: [bool; 3]) -> [Option<Self>; 3] {
        match present {
            [true, true, false] => [Some(Self::Brunch), Some(Self::Dinner), None],
            [b, l, d] => [
                if b { Some(Self::Breakfast) } else { None },
                if l { Some(Self::Lunch) } else { None },
                if d { Some(Self::Dinner) } else { None },
            ],
        }
    }
}

/// One card on the menu page, usually a station like "Grill" or "Bakery".
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MealEntry {
    pub card_title: String,
    pub menu_items: Vec<MenuItem>,
}

impl MealEntry {
    pub fn from_html_element(card: scraper::ElementRef<'_>) -> Self {
        static_selector!(TITLE_SELECTOR <- ".card-title");
        static_selector!(CARD_TEXT_SELECTOR <- ".card-text");
        static_selector!(ROW_SELECTOR <- ".row.menu-item-row");

        let card_title = card
            .select(&TITLE_SELECTOR)
            .next()
            .map_or_else(|| NOT_FOUND.to_owned(), stripped_text);

        let menu_items = card
            .select(&CARD_TEXT_SELECTOR)
            .next()
            .map(|text| {
                text.select(&ROW_SELECTOR)
                    .map(MenuItem::from_html_element)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            card_title,
            menu_items,
        }
    }
}
