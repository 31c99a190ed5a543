//! Services shared by storefront handlers.
//!
//! - `catalog` - Cached category and product reads
//! - `cart_events` - Cart count fan-out for open pages
//! - `notify` - `HX-Trigger` notices for fragment responses

pub mod cart_events;
pub mod catalog;
pub mod notify;

pub use cart_events::{CartEvent, CartEvents};
pub use catalog::{CatalogService, ProductGroup, group_by_subcategory};
pub use notify::HxTrigger;
