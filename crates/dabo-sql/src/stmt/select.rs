/// The clause fragments of a SELECT, as assembled by the builder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Select {
    pub fields: String,
    pub from: String,
    pub filter: String,
    pub group_by: String,
    pub order_by: String,

    /// Row count restriction. Empty for none.
    pub limit: String,
}
