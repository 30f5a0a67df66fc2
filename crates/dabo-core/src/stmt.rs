mod convert;

mod field_type;
pub use field_type::FieldType;

mod value;
pub use value::Value;

mod value_chrono;
pub use value_chrono::{parse_date, parse_date_time};

mod value_cmp;
