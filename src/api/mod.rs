pub mod types;

mod counter_api;

pub use counter_api::*;
