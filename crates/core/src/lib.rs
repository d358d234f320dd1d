#![forbid(unsafe_code)]

pub mod builtin;
pub mod error;
pub mod model;
pub mod navigation;
pub mod time;

pub use error::Error;
pub use navigation::{Navigator, View};
pub use time::Clock;
