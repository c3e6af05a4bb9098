pub mod wines;

pub use wines::{NewWine, UpdateWine, WineResponse};
