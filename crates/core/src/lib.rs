#![forbid(unsafe_code)]

pub mod error;
pub mod model;
pub mod question;
pub mod selector;
pub mod time;
pub mod tracker;

pub use error::Error;
pub use time::Clock;
