//! Market index adjustment of historical property values.

pub mod growth;
pub mod indexation;

pub use growth::{annualized_growth, growth_percent, GrowthSummary};
pub use indexation::{index_value_to_date, index_value_to_date_str, nearest_entry};
