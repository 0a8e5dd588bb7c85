use std::collections::BTreeMap;

use crate::parse::{text::stripped_text, NutritionFacts, NOT_FOUND, NO_TITLE};
use crate::static_selector;

/// One dish on a menu card. The nutrition fields stay `None` until the
/// dish's detail page has been merged in.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MenuItem {
    pub food: String,
    pub restrictions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nutrient_information: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serving_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calories_per_serving: Option<String>,
}

impl MenuItem {
    pub fn new(food: impl Into<String>, restrictions: Vec<String>) -> Self {
        Self {
            food: food.into(),
            restrictions,
            nutrient_information: None,
            serving_size: None,
            calories_per_serving: None,
        }
    }

    /// `row` is a `.menu-item-row` element.
    pub fn from_html_element(row: scraper::ElementRef<'_>) -> Self {
        static_selector!(NAME_SELECTOR <- ".menu-item-name");
        static_selector!(ICON_SELECTOR <- ".nutri-icon");

        let food = row
            .select(&NAME_SELECTOR)
            .next()
            .map_or_else(|| NOT_FOUND.to_owned(), stripped_text);
        let restrictions = row
            .select(&ICON_SELECTOR)
            .map(|icon| icon.attr("title").unwrap_or(NO_TITLE).to_owned())
            .collect();

        Self::new(food, restrictions)
    }

    pub fn apply_nutrition(&mut self, facts: &NutritionFacts) {
        self.nutrient_information = Some(facts.nutrient_information.clone());
        self.serving_size = Some(facts.serving_size.clone());
        self.calories_per_serving = Some(facts.calories_per_serving.clone());
    }

    #[cfg(test)]
    pub const fn has_nutrition(&self) -> bool {
        self.nutrient_information.is_some()
    }
}
