mod food_item;
mod meal;

use std::collections::BTreeMap;

pub use food_item::MenuItem;
pub use meal::{MealEntry, MealSlot};
use scraper::{ElementRef, Html};

use crate::parse::{static_selector::StaticSelector, text::trimmed_text, NutritionFacts};
use crate::static_selector;

static_selector!(PANE_1 <- "#pane-1");
static_selector!(PANE_2 <- "#pane-2");
static_selector!(PANE_3 <- "#pane-3");

/// The meal panes in page order; labels come from [`MealSlot::pane_labels`].
fn pane_selectors() -> [&'static StaticSelector; 3] {
    [&PANE_1, &PANE_2, &PANE_3]
}

/// Everything served at one location on one day, keyed by meal.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct LocationDayRecord(BTreeMap<MealSlot, Vec<MealEntry>>);

impl LocationDayRecord {
    #[cfg(test)]
    pub fn meals(&self) -> impl Iterator<Item = (MealSlot, &[MealEntry])> {
        self.0.iter().map(|(slot, entries)| (*slot, entries.as_slice()))
    }

    #[cfg(test)]
    pub fn meal(&self, slot: MealSlot) -> Option<&[MealEntry]> {
        self.0.get(&slot).map(Vec::as_slice)
    }

    pub fn push(&mut self, slot: MealSlot, entry: MealEntry) {
        self.0.entry(slot).or_default().push(entry);
    }

    #[cfg(test)]
    pub fn items(&self) -> impl Iterator<Item = &MenuItem> {
        self.0
            .values()
            .flatten()
            .flat_map(|entry| entry.menu_items.iter())
    }

    fn items_mut(&mut self) -> impl Iterator<Item = &mut MenuItem> {
        self.0
            .values_mut()
            .flatten()
            .flat_map(|entry| entry.menu_items.iter_mut())
    }

    /// Attaches `facts` to every item named exactly `food`, in every meal.
    /// Returns how many items were updated.
    pub fn apply_nutrition(&mut self, food: &str, facts: &NutritionFacts) -> usize {
        let mut updated = 0;
        for item in self.items_mut().filter(|item| item.food == food) {
            item.apply_nutrition(facts);
            updated += 1;
        }
        updated
    }
}

/// A dish name together with the relative link to its nutrition label page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DishLink {
    pub food: String,
    pub href: String,
}

/// The result of parsing one location/date menu page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MenuPage {
    pub record: LocationDayRecord,
    /// Distinct dish links in page order.
    pub links: Vec<DishLink>,
}

impl MenuPage {
    /// Parses a whole menu page. The document tree is dropped before returning.
    pub fn parse(html: &str) -> Self {
        Self::from_html_element(Html::parse_document(html).root_element())
    }

    pub fn from_html_element(root: ElementRef<'_>) -> Self {
        static_selector!(CARD_SELECTOR <- ".card");

        let panes: Vec<Option<ElementRef<'_>>> =
            pane_selectors().iter().map(|sel| root.select(sel).next()).collect();
        let present = [panes[0].is_some(), panes[1].is_some(), panes[2].is_some()];
        let labels = MealSlot::pane_labels(present);

        let mut record = LocationDayRecord::default();
        for ((pane, label), selector) in panes.iter().zip(labels).zip(pane_selectors()) {
            let (Some(pane), Some(slot)) = (pane, label) else {
                log::debug!("Element {} not found.", selector.as_str());
                continue;
            };
            record.0.entry(slot).or_default();
            for card in pane.select(&CARD_SELECTOR) {
                record.push(slot, MealEntry::from_html_element(card));
            }
        }

        let links = Self::dish_links(panes.iter().flatten().copied());
        Self { record, links }
    }

    fn dish_links<'a>(panes: impl Iterator<Item = ElementRef<'a>>) -> Vec<DishLink> {
        static_selector!(LINK_SELECTOR <- "a.menu-item-name");
        let mut links: Vec<DishLink> = Vec::new();
        for pane in panes {
            for anchor in pane.select(&LINK_SELECTOR) {
                let Some(href) = anchor.attr("href") else {
                    continue;
                };
                let link = DishLink {
                    food: trimmed_text(anchor),
                    href: href.to_owned(),
                };
                if !links.contains(&link) {
                    links.push(link);
                }
            }
        }
        links
    }
}
