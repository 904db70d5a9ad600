#![forbid(unsafe_code)]

pub mod answer_key;
pub mod gamification;
pub mod model;
pub mod time;

pub use time::Clock;
