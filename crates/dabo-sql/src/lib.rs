pub mod builder;
pub use builder::{Connector, SqlBuilder, DEFAULT_LIMIT};

pub mod serializer;
pub use serializer::{Params, Placeholder, Serializer};

pub mod stmt;
pub use stmt::Statement;
