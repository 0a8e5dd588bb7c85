mod date_key;
mod location;

pub use date_key::DateKey;
pub use location::Location;
