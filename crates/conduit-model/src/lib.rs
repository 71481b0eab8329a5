pub mod batch;
pub mod row;
pub mod template;
pub mod value;

pub use batch::Batch;
pub use row::Row;
pub use template::{Dialect, InsertTemplate};
pub use value::Value;
