pub mod series;
pub mod types;

pub use series::*;
pub use types::*;
