use super::Serializer;

use crate::stmt::{ColumnDef, CreateTable};

use dabo_core::stmt::FieldType;

impl Serializer<'_> {
    pub(super) fn create_table(&self, stmt: &CreateTable) -> String {
        let pk: Vec<_> = stmt.columns.iter().filter(|c| c.primary_key).collect();
        let single_auto_pk = pk.len() == 1 && pk[0].auto_increment;

        let mut defs: Vec<_> = stmt
            .columns
            .iter()
            .map(|column| self.column_def(column, single_auto_pk))
            .collect();

        if !pk.is_empty() && !single_auto_pk {
            let names: Vec<_> = pk.iter().map(|c| self.quote_ident(&c.name)).collect();
            defs.push(format!("PRIMARY KEY ({})", names.join(", ")));
        }

        format!(
            "CREATE TABLE {} ({})",
            self.quote_ident(&stmt.name),
            defs.join(", ")
        )
    }

    fn column_def(&self, column: &ColumnDef, single_auto_pk: bool) -> String {
        let name = self.quote_ident(&column.name);
        if single_auto_pk && column.primary_key {
            return format!("{name} {}", self.capability.storage_types.auto_pk);
        }
        format!("{name} {}", self.storage_type(column.ty))
    }

    /// Native column type for an abstract field type.
    pub fn storage_type(&self, ty: FieldType) -> &'static str {
        let types = &self.capability.storage_types;
        match ty {
            FieldType::Int => types.int,
            FieldType::Numeric => types.numeric,
            FieldType::Float => types.float,
            FieldType::Char | FieldType::Unknown => types.char,
            FieldType::Memo => types.memo,
            FieldType::Bool => types.bool,
            FieldType::Date => types.date,
            FieldType::DateTime => types.datetime,
            FieldType::Blob => types.blob,
        }
    }
}
