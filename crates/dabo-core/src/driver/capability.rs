/// Describes the SQL dialect spoken by a backend.
///
/// The cursor and the SQL builder consult these fields instead of branching on
/// the backend's identity. Custom dialects are declared by overriding the
/// fields that differ, e.g. `Capability { limit_word: "TOP", ..Capability::SQLITE }`.
#[derive(Debug)]
pub struct Capability {
    /// Backend name, as accepted by `ConnectInfo::set_backend_name`.
    pub name: &'static str,

    /// How single quotes inside string literals are escaped.
    pub quote_style: QuoteStyle,

    /// Character used to quote identifiers.
    pub identifier_quote: char,

    /// When true, date literals are written `DATE '...'` / `TIMESTAMP '...'`.
    pub typed_date_literals: bool,

    /// Literals for `true` and `false`.
    pub bool_literals: (&'static str, &'static str),

    /// Keyword restricting the number of rows returned.
    pub limit_word: &'static str,

    /// Where the row-count restriction goes in a SELECT.
    pub limit_position: LimitPosition,

    /// Qualify columns with the table name in UPDATE/DELETE WHERE clauses.
    pub table_prefix_in_where: bool,

    /// Qualify columns with the table name in UPDATE SET lists.
    pub table_prefix_in_update: bool,

    /// Parameter placeholder syntax.
    pub placeholder: PlaceholderStyle,

    /// The backend cannot return generated keys after an insert, so keys are
    /// generated before it.
    pub pregen_pk: bool,

    /// The backend reports affected rows for UPDATE.
    pub row_counts_on_save: bool,

    /// The backend reports affected rows for DELETE.
    pub row_counts_on_delete: bool,

    /// Statement opening a transaction.
    pub begin_stmt: &'static str,

    /// Tail of an INSERT that names no column.
    pub empty_insert: &'static str,

    /// Native column types used when rendering DDL.
    pub storage_types: StorageTypes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteStyle {
    /// `'` becomes `''`
    Doubled,

    /// `'` becomes `\'` and `\` becomes `\\`
    Backslash,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitPosition {
    /// `SELECT <limit> n <fields> ...`
    Head,

    /// `... ORDER BY x <limit> n`
    Tail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderStyle {
    /// `?`
    Question,

    /// `$1`, `$2`, ...
    Numbered,
}

#[derive(Debug)]
pub struct StorageTypes {
    pub int: &'static str,
    pub numeric: &'static str,
    pub float: &'static str,
    pub char: &'static str,
    pub memo: &'static str,
    pub bool: &'static str,
    pub date: &'static str,
    pub datetime: &'static str,
    pub blob: &'static str,

    /// Column definition (minus the name) of an auto-populated primary key.
    pub auto_pk: &'static str,
}

impl Capability {
    /// SQLite capabilities.
    pub const SQLITE: Self = Self {
        name: "sqlite",
        quote_style: QuoteStyle::Doubled,
        identifier_quote: '"',
        typed_date_literals: false,
        bool_literals: ("1", "0"),
        limit_word: "LIMIT",
        limit_position: LimitPosition::Tail,
        // SQLite accepts `table.col` in WHERE but not in SET
        table_prefix_in_where: false,
        table_prefix_in_update: false,
        placeholder: PlaceholderStyle::Question,
        pregen_pk: false,
        row_counts_on_save: true,
        row_counts_on_delete: true,
        begin_stmt: "BEGIN",
        empty_insert: "DEFAULT VALUES",
        storage_types: StorageTypes::SQLITE,
    };

    /// MySQL capabilities
    pub const MYSQL: Self = Self {
        name: "mysql",
        quote_style: QuoteStyle::Backslash,
        identifier_quote: '`',
        table_prefix_in_where: true,
        table_prefix_in_update: true,
        begin_stmt: "START TRANSACTION",
        empty_insert: "() VALUES ()",
        storage_types: StorageTypes::MYSQL,
        ..Self::SQLITE
    };

    /// PostgreSQL capabilities
    pub const POSTGRESQL: Self = Self {
        name: "postgresql",
        typed_date_literals: true,
        bool_literals: ("TRUE", "FALSE"),
        table_prefix_in_where: true,
        placeholder: PlaceholderStyle::Numbered,
        // Keys come from the column's sequence before the insert
        pregen_pk: true,
        storage_types: StorageTypes::POSTGRESQL,
        ..Self::SQLITE
    };
}

impl StorageTypes {
    pub const SQLITE: StorageTypes = StorageTypes {
        int: "INTEGER",
        numeric: "NUMERIC",
        float: "REAL",
        char: "TEXT",
        memo: "TEXT",
        bool: "BOOLEAN",
        date: "DATE",
        datetime: "DATETIME",
        blob: "BLOB",
        auto_pk: "INTEGER PRIMARY KEY AUTOINCREMENT",
    };

    pub const MYSQL: StorageTypes = StorageTypes {
        int: "INT",
        numeric: "DECIMAL(18,4)",
        float: "DOUBLE",
        char: "VARCHAR(191)",
        memo: "TEXT",
        bool: "TINYINT(1)",
        date: "DATE",
        datetime: "DATETIME",
        blob: "LONGBLOB",
        auto_pk: "INT NOT NULL AUTO_INCREMENT PRIMARY KEY",
    };

    pub const POSTGRESQL: StorageTypes = StorageTypes {
        int: "INTEGER",
        numeric: "NUMERIC(18,4)",
        float: "DOUBLE PRECISION",
        char: "VARCHAR(255)",
        memo: "TEXT",
        bool: "BOOLEAN",
        date: "DATE",
        datetime: "TIMESTAMP",
        blob: "BYTEA",
        auto_pk: "SERIAL PRIMARY KEY",
    };
}
