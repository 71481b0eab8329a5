pub mod engine;
pub mod error;
mod mysql;
mod postgres;
pub mod source;
pub mod table_utils;
pub mod target;

pub use engine::{DbEngine, MetadataHandle, connect_source, connect_target};
pub use error::ConnectorError;
pub use source::{SourceConnector, StreamingCursor};
pub use target::{RawTargetConnection, TargetConnector};
