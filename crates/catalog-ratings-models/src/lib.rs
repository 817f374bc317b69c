pub mod item_id;
pub mod item_type;
pub mod rating;

pub use item_id::{ItemId, InvalidItemId};
pub use item_type::ItemType;
pub use rating::{RatingRecord, RatingValue, RatingsResponse};
