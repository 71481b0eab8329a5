mod connect;
mod params;
mod row;
mod source;
mod target;

pub use connect::connect_client;
pub use source::PgSourceConnector;
pub use target::PgTargetConnector;
