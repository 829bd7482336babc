pub mod blocked;
pub mod cascade;
pub mod price;

pub use blocked::is_access_denied;
pub use cascade::{PriceCascade, PriceStrategy};
pub use price::parse_price;
