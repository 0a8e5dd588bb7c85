use std::collections::BTreeMap;

use scraper::{ElementRef, Html};

use crate::parse::{text::trimmed_text, NOT_FOUND};
use crate::static_selector;

/// Facts scraped from a dish's nutrition label page.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct NutritionFacts {
    pub nutrient_information: BTreeMap<String, String>,
    pub serving_size: String,
    pub calories_per_serving: String,
}

impl Default for NutritionFacts {
    fn default() -> Self {
        Self {
            nutrient_information: BTreeMap::new(),
            serving_size: NOT_FOUND.to_owned(),
            calories_per_serving: NOT_FOUND.to_owned(),
        }
    }
}

impl NutritionFacts {
    pub fn parse(html: &str) -> Self {
        Self::from_html_element(Html::parse_document(html).root_element())
    }

    pub fn from_html_element(root: ElementRef<'_>) -> Self {
        Self {
            nutrient_information: Self::nutrients(root),
            serving_size: Self::serving_size(root).unwrap_or_else(|| NOT_FOUND.to_owned()),
            calories_per_serving: Self::calories_per_serving(root)
                .unwrap_or_else(|| NOT_FOUND.to_owned()),
        }
    }

    // <div class="nutfactstopnutrient"><b>Sodium</b> 170mg</div>
    fn nutrients(root: ElementRef<'_>) -> BTreeMap<String, String> {
        static_selector!(NUTRIENT_SELECTOR <- ".nutfactstopnutrient");
        static_selector!(NAME_SELECTOR <- "b");

        let mut nutrients = BTreeMap::new();
        for nutrient in root.select(&NUTRIENT_SELECTOR) {
            let Some(name) = nutrient.select(&NAME_SELECTOR).next() else {
                continue;
            };
            let name = trimmed_text(name);
            let value = trimmed_text(nutrient).replace(&name, "");
            let value = value.trim();
            if !value.is_empty() {
                nutrients.insert(name, value.to_owned());
            }
        }
        nutrients
    }

    /// The first `.nutfactsservsize` is the "Serving size" label, the second holds the amount.
    fn serving_size(root: ElementRef<'_>) -> Option<String> {
        static_selector!(SERVING_SIZE_SELECTOR <- ".nutfactsservsize");
        root.select(&SERVING_SIZE_SELECTOR).nth(1).map(trimmed_text)
    }

    /// Second paragraph of the first table cell on the page.
    fn calories_per_serving(root: ElementRef<'_>) -> Option<String> {
        static_selector!(CELL_SELECTOR <- "td");
        static_selector!(PARAGRAPH_SELECTOR <- "p");
        let Some(cell) = root.select(&CELL_SELECTOR).next() else {
            log::debug!("nutrition page has no table cell, calories left as {NOT_FOUND:?}");
            return None;
        };
        cell.select(&PARAGRAPH_SELECTOR).nth(1).map(trimmed_text)
    }
}
