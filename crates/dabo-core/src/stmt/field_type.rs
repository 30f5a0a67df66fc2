use super::Value;

/// The abstract type set every backend type is mapped onto.
///
/// Each variant has a single-character code (`I`, `N`, `F`, `C`, `M`, `B`,
/// `D`, `T`, `L`, `?`) that is stable across backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FieldType {
    /// Integer
    Int,

    /// Fixed-point numeric / decimal
    Numeric,

    /// Floating point
    Float,

    /// Character data
    Char,

    /// Memo / unbounded text
    Memo,

    /// Boolean
    Bool,

    /// Calendar date
    Date,

    /// Date and time without a zone
    DateTime,

    /// Binary large object
    Blob,

    /// The backend reported a type that does not map onto the set
    #[default]
    Unknown,
}

impl FieldType {
    pub const fn code(self) -> char {
        match self {
            FieldType::Int => 'I',
            FieldType::Numeric => 'N',
            FieldType::Float => 'F',
            FieldType::Char => 'C',
            FieldType::Memo => 'M',
            FieldType::Bool => 'B',
            FieldType::Date => 'D',
            FieldType::DateTime => 'T',
            FieldType::Blob => 'L',
            FieldType::Unknown => '?',
        }
    }

    pub fn from_code(code: char) -> Option<FieldType> {
        Some(match code.to_ascii_uppercase() {
            'I' => FieldType::Int,
            'N' => FieldType::Numeric,
            'F' => FieldType::Float,
            'C' => FieldType::Char,
            'M' => FieldType::Memo,
            'B' => FieldType::Bool,
            'D' => FieldType::Date,
            'T' => FieldType::DateTime,
            'L' => FieldType::Blob,
            '?' => FieldType::Unknown,
            _ => return None,
        })
    }

    /// Maps a native column type name (`VARCHAR(20)`, `int4`, `DATETIME`,
    /// ...) onto the abstract set.
    ///
    /// The match is on the leading keyword, case-insensitively, following the
    /// affinity rules SQLite uses for declared types.
    pub fn from_native(name: &str) -> FieldType {
        let name = name.trim().to_ascii_lowercase();
        let base = name.split(['(', ' ']).next().unwrap_or("");

        match base {
            "bool" | "boolean" | "bit" => FieldType::Bool,
            "tinyint" if name.starts_with("tinyint(1)") => FieldType::Bool,
            "int" | "integer" | "int2" | "int4" | "int8" | "smallint" | "mediumint"
            | "bigint" | "tinyint" | "serial" | "bigserial" | "smallserial" | "year" => {
                FieldType::Int
            }
            "decimal" | "numeric" | "money" | "newdecimal" => FieldType::Numeric,
            "real" | "float" | "float4" | "float8" | "double" => FieldType::Float,
            "char" | "varchar" | "character" | "nchar" | "nvarchar" | "bpchar" | "name"
            | "uuid" | "enum" | "set" | "varying" => FieldType::Char,
            "text" | "tinytext" | "mediumtext" | "longtext" | "clob" | "json" | "jsonb" => {
                FieldType::Memo
            }
            "date" => FieldType::Date,
            "datetime" | "timestamp" | "timestamptz" => FieldType::DateTime,
            "blob" | "tinyblob" | "mediumblob" | "longblob" | "bytea" | "binary"
            | "varbinary" => FieldType::Blob,
            _ if base.contains("int") => FieldType::Int,
            _ if base.contains("char") || base.contains("clob") => FieldType::Char,
            _ if base.contains("text") => FieldType::Memo,
            _ => FieldType::Unknown,
        }
    }

    /// Infers the abstract type of a fetched value.
    pub fn of(value: &Value) -> FieldType {
        match value {
            Value::Null | Value::List(_) => FieldType::Unknown,
            Value::Bool(_) => FieldType::Bool,
            Value::Int(_) => FieldType::Int,
            Value::Decimal(_) => FieldType::Numeric,
            Value::Float(_) => FieldType::Float,
            Value::String(_) => FieldType::Char,
            Value::Date(_) => FieldType::Date,
            Value::DateTime(_) => FieldType::DateTime,
            Value::Bytes(_) => FieldType::Blob,
        }
    }

    /// The value placed in a field of this type when a blank record is added.
    pub fn blank(self) -> Value {
        match self {
            FieldType::Char | FieldType::Memo => Value::String(String::new()),
            _ => Value::Null,
        }
    }

    pub fn is_text(self) -> bool {
        matches!(self, FieldType::Char | FieldType::Memo)
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, FieldType::Int | FieldType::Numeric | FieldType::Float)
    }

    pub fn is_temporal(self) -> bool {
        matches!(self, FieldType::Date | FieldType::DateTime)
    }
}

impl core::fmt::Display for FieldType {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let name = match self {
            FieldType::Int => "int",
            FieldType::Numeric => "numeric",
            FieldType::Float => "float",
            FieldType::Char => "char",
            FieldType::Memo => "memo",
            FieldType::Bool => "bool",
            FieldType::Date => "date",
            FieldType::DateTime => "datetime",
            FieldType::Blob => "blob",
            FieldType::Unknown => "unknown",
        };
        write!(f, "{name} ({})", self.code())
    }
}
