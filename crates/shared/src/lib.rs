mod field;
mod settle;

pub use field::*;
pub use settle::*;
