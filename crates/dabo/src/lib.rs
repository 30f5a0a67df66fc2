pub mod bizobj;
pub use bizobj::Bizobj;

pub mod config;
pub use config::ConnectionDefs;

mod connect_info;
pub use connect_info::ConnectInfo;

pub mod connection;
pub use connection::Connection;

pub mod cursor;
pub use cursor::Cursor;

pub mod driver;

mod memento;
pub use memento::Memento;

pub mod registry;
pub use registry::{TableDef, TableRegistry};

mod row;
pub use row::Row;

pub use dabo_core::{
    bail, err,
    stmt::{self, FieldType, Value},
    Error, Result,
};

pub use dabo_sql::{Connector, SqlBuilder};
