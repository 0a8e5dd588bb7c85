use std::sync::OnceLock;

use scraper::Selector;

/// A CSS selector compiled on first use and shared for the life of the process.
#[derive(Debug)]
pub struct StaticSelector {
    cell: OnceLock<Selector>,
    selector: &'static str,
}

impl StaticSelector {
    pub const fn new(selector: &'static str) -> Self {
        Self {
            cell: OnceLock::new(),
            selector,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        self.selector
    }
}

impl core::ops::Deref for StaticSelector {
    type Target = Selector;

    fn deref(&self) -> &Self::Target {
        // selectors are literals in this crate, a bad one is a programming error
        self.cell
            .get_or_init(|| match Selector::parse(self.selector) {
                Ok(sel) => sel,
                Err(e) => panic!("Error parsing static selector {}: {:?}", self.selector, e),
            })
    }
}

#[macro_export]
macro_rules! static_selector {
    ($x: ident <- $sel: literal) => {
        static $x: $crate::parse::static_selector::StaticSelector =
            $crate::parse::static_selector::StaticSelector::new($sel);
    };
}
