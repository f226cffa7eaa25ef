#![forbid(unsafe_code)]

pub mod error;
pub mod model;
pub mod navigator;

pub use error::Error;
pub use navigator::Position;
