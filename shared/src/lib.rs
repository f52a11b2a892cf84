pub mod colors;
pub mod config;
pub mod entity;
pub mod error;
pub mod filter;
#[cfg(any(test, feature = "test-fixtures"))]
pub mod fixtures;
pub mod labels;
pub mod markup;
pub mod projection;
pub mod store;

pub use colors::category_color;
pub use config::MapConfig;
pub use entity::*;
pub use error::DataLoadFailure;
pub use filter::CategoryFilter;
pub use markup::{escape_html, popup_html};
pub use projection::{ViewState, project, project_view};
pub use store::DataStore;
