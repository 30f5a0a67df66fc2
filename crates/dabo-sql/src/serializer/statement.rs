use super::{Params, Serializer};

use crate::stmt::{Delete, Insert, Statement, Update};

impl Serializer<'_> {
    /// Serialize a statement to a SQL string, pushing its parameters into
    /// `params`.
    pub fn serialize(&self, stmt: &Statement, params: &mut impl Params) -> String {
        match stmt {
            Statement::CreateTable(stmt) => self.create_table(stmt),
            Statement::Delete(stmt) => self.delete(stmt),
            Statement::Insert(stmt) => self.insert(stmt, params),
            Statement::Select(stmt) => self.form_sql(stmt),
            Statement::Update(stmt) => self.update(stmt, params),
        }
    }

    fn insert(&self, stmt: &Insert, params: &mut impl Params) -> String {
        if stmt.columns.is_empty() {
            return format!("INSERT INTO {} {}", stmt.table, self.capability.empty_insert);
        }

        let placeholders: Vec<_> = stmt
            .values
            .iter()
            .map(|value| self.placeholder(params.push(value)))
            .collect();

        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            stmt.table,
            stmt.columns.join(", "),
            placeholders.join(", ")
        )
    }

    fn update(&self, stmt: &Update, params: &mut impl Params) -> String {
        let prefix = self.update_table_prefix(&stmt.table);
        let assignments: Vec<_> = stmt
            .assignments
            .iter()
            .map(|(field, value)| {
                let placeholder = self.placeholder(params.push(value));
                format!("{prefix}{field} = {placeholder}")
            })
            .collect();

        format!(
            "UPDATE {} SET {} WHERE {}",
            stmt.table,
            assignments.join(", "),
            stmt.filter
        )
    }

    fn delete(&self, stmt: &Delete) -> String {
        format!("DELETE FROM {} WHERE {}", stmt.table, stmt.filter)
    }
}
