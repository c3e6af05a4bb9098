pub mod wine;

pub use wine::{Wine, WineType};
