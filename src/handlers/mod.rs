pub mod health;
pub mod wines;

pub use health::health_check;
pub use wines::{add_wine, delete_wine, get_wines, update_wine};
