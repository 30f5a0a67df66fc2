mod create_table;
mod flavor;
mod ident;

mod params;
pub use params::{Params, Placeholder};

mod statement;
mod value;

use crate::stmt::Select;

use dabo_core::driver::{Capability, LimitPosition};

/// Renders SQL text for one dialect.
///
/// All dialect differences are read from the [`Capability`]; the serializer
/// itself never branches on the backend's name.
#[derive(Debug, Clone, Copy)]
pub struct Serializer<'a> {
    capability: &'a Capability,
}

impl<'a> Serializer<'a> {
    pub fn new(capability: &'a Capability) -> Serializer<'a> {
        Serializer { capability }
    }

    pub fn capability(&self) -> &'a Capability {
        self.capability
    }

    /// Qualifier placed before column names in UPDATE/DELETE WHERE clauses.
    pub fn where_table_prefix(&self, table: &str) -> String {
        if self.capability.table_prefix_in_where {
            format!("{table}.")
        } else {
            String::new()
        }
    }

    /// Qualifier placed before column names in UPDATE SET lists.
    pub fn update_table_prefix(&self, table: &str) -> String {
        if self.capability.table_prefix_in_update {
            format!("{table}.")
        } else {
            String::new()
        }
    }

    pub fn limit_word(&self) -> &'static str {
        self.capability.limit_word
    }

    /// True when UPDATE statements report no usable row count.
    pub fn no_results_on_save(&self) -> bool {
        !self.capability.row_counts_on_save
    }

    /// True when DELETE statements report no usable row count.
    pub fn no_results_on_delete(&self) -> bool {
        !self.capability.row_counts_on_delete
    }

    /// Assembles a SELECT from its clause fragments, placing the row count
    /// restriction where the dialect expects it.
    pub fn form_sql(&self, select: &Select) -> String {
        let mut sql = String::from("SELECT ");

        let limit = (!select.limit.is_empty())
            .then(|| format!("{} {}", self.limit_word(), select.limit));

        if let (Some(limit), LimitPosition::Head) = (&limit, self.capability.limit_position) {
            sql.push_str(limit);
            sql.push(' ');
        }

        sql.push_str(&select.fields);
        sql.push_str(" FROM ");
        sql.push_str(&select.from);

        for (keyword, clause) in [
            ("WHERE", &select.filter),
            ("GROUP BY", &select.group_by),
            ("ORDER BY", &select.order_by),
        ] {
            if !clause.is_empty() {
                sql.push(' ');
                sql.push_str(keyword);
                sql.push(' ');
                sql.push_str(clause);
            }
        }

        if let (Some(limit), LimitPosition::Tail) = (&limit, self.capability.limit_position) {
            sql.push(' ');
            sql.push_str(limit);
        }

        sql
    }
}
