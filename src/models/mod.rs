pub mod photo;
pub mod row_model;

pub use photo::*;
pub use row_model::*;
