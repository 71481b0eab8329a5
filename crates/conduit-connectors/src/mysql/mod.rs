mod params;
mod row;
mod source;
mod target;

pub use source::MySqlSourceConnector;
pub use target::MySqlTargetConnector;
