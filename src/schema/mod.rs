pub mod rows;
pub mod tables;
pub mod types;

pub use rows::*;
pub use tables::*;
pub use types::*;
