mod exec_log;
pub use exec_log::ExecLog;

mod logging_connection;
pub use logging_connection::{ExecOp, LoggingConnection};

mod setup;
pub use setup::TestDb;

pub use std_util::*;
