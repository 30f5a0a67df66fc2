mod defaults;
pub use defaults::DefaultValue;

mod delete;

mod events;
pub use events::{Event, Handler, Operation, Phase};
use events::Events;

mod navigate;

mod policy;
pub use policy::{Policies, RiPolicy};

mod rules;
pub use rules::BizRules;

mod save;

use crate::{
    connection::TEMP_PK_SUFFIX,
    cursor::{Encoding, KeyChange},
    stmt::Value,
    Connection, Cursor, Error, Result, Row,
};

use dabo_sql::{Connector, SqlBuilder};
use indexmap::IndexMap;
use std::{collections::HashSet, sync::Arc};

/// A node of the business-object tree.
///
/// A bizobj owns a cursor over its data source and the bizobjs of its child
/// tables. A child keeps one cursor per parent key, so moving the parent
/// between rows never disturbs the pending edits of a sibling.
#[derive(Debug)]
pub struct Bizobj {
    conn: Connection,
    data_source: String,
    key_field: String,

    /// Field of this table referencing the parent
    link_field: Option<String>,

    /// Field of the parent the link refers to, the parent's key by default
    parent_link_field: Option<String>,

    auto_populate_pk: bool,
    restore_position: bool,
    encoding: Encoding,

    /// Clauses every cursor of this bizobj starts from
    template: SqlBuilder,

    /// Cursor for `current_key`
    cursor: Cursor,
    current_key: String,

    /// Cursors of other parent rows, keyed by parent key
    parked: IndexMap<String, Cursor>,

    parent: Option<ParentLink>,
    children: Vec<Bizobj>,

    defaults: IndexMap<String, DefaultValue>,
    policies: Policies,
    requery_child_on_save: bool,
    new_child_on_new: bool,
    fill_link_from_parent: bool,

    events: Events,
    rules: Option<Box<dyn BizRules>>,
}

/// The parent row a child is positioned under.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ParentLink {
    pub(crate) value: Value,
    pub(crate) is_new: bool,
}

impl Bizobj {
    pub fn new(conn: &Connection, data_source: &str, key_field: &str) -> Bizobj {
        let mut cursor = conn.cursor(data_source);
        cursor.set_key_field(key_field);

        Bizobj {
            conn: conn.clone(),
            data_source: data_source.to_string(),
            key_field: key_field.to_string(),
            link_field: None,
            parent_link_field: None,
            auto_populate_pk: true,
            restore_position: false,
            encoding: Encoding::default(),
            template: SqlBuilder::new(),
            cursor,
            current_key: String::new(),
            parked: IndexMap::new(),
            parent: None,
            children: vec![],
            defaults: IndexMap::new(),
            policies: Policies::default(),
            requery_child_on_save: false,
            new_child_on_new: false,
            fill_link_from_parent: true,
            events: Events::default(),
            rules: None,
        }
    }

    /// Makes this bizobj a child linked to its parent through `link_field`.
    pub fn with_link_field(mut self, link_field: &str) -> Bizobj {
        self.link_field = Some(link_field.to_string());
        self
    }

    pub fn data_source(&self) -> &str {
        &self.data_source
    }

    pub fn key_field(&self) -> &str {
        &self.key_field
    }

    pub fn set_key_field(&mut self, key_field: &str) {
        self.key_field = key_field.to_string();
        self.each_cursor(|cursor| cursor.set_key_field(key_field));
    }

    pub fn link_field(&self) -> Option<&str> {
        self.link_field.as_deref()
    }

    pub fn set_link_field(&mut self, link_field: &str) {
        self.link_field = Some(link_field.to_string());
    }

    pub fn parent_link_field(&self) -> Option<&str> {
        self.parent_link_field.as_deref()
    }

    pub fn set_parent_link_field(&mut self, field: &str) {
        self.parent_link_field = Some(field.to_string());
    }

    pub fn auto_populate_pk(&self) -> bool {
        self.auto_populate_pk
    }

    pub fn set_auto_populate_pk(&mut self, auto_populate_pk: bool) {
        self.auto_populate_pk = auto_populate_pk;
        self.each_cursor(|cursor| cursor.set_auto_populate_pk(auto_populate_pk));
    }

    pub fn set_restore_position_on_requery(&mut self, restore: bool) {
        self.restore_position = restore;
        self.each_cursor(|cursor| cursor.set_restore_position_on_requery(restore));
    }

    pub fn set_encoding(&mut self, encoding: Encoding) {
        self.encoding = encoding;
        self.each_cursor(|cursor| cursor.set_encoding(encoding));
    }

    pub fn policies(&self) -> Policies {
        self.policies
    }

    pub fn set_delete_policy(&mut self, policy: RiPolicy) {
        self.policies.delete = policy;
    }

    pub fn set_update_policy(&mut self, policy: RiPolicy) {
        self.policies.update = policy;
    }

    pub fn set_insert_policy(&mut self, policy: RiPolicy) {
        self.policies.insert = policy;
    }

    pub fn set_requery_child_on_save(&mut self, requery: bool) {
        self.requery_child_on_save = requery;
    }

    /// Adds a child record whenever a record is added here.
    pub fn set_new_child_on_new(&mut self, new_child: bool) {
        self.new_child_on_new = new_child;
    }

    /// Puts the parent key into the link field of new child records.
    pub fn set_fill_link_from_parent(&mut self, fill: bool) {
        self.fill_link_from_parent = fill;
    }

    pub fn set_default_value(&mut self, field: &str, value: impl Into<Value>) {
        self.defaults
            .insert(field.to_string(), DefaultValue::Value(value.into()));
    }

    pub fn set_default_fn<F>(&mut self, field: &str, f: F)
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.defaults
            .insert(field.to_string(), DefaultValue::Fn(Arc::new(f)));
    }

    pub fn set_rules(&mut self, rules: impl BizRules + 'static) {
        self.rules = Some(Box::new(rules));
    }

    /// Subscribes to an event. See [`Handler`] for veto semantics.
    pub fn on<F>(&mut self, operation: Operation, phase: Phase, handler: F)
    where
        F: Fn(&Event<'_>) -> std::result::Result<(), String> + Send + Sync + 'static,
    {
        self.events.subscribe(operation, phase, Box::new(handler));
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// The cursor of the current parent row.
    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn cursor_mut(&mut self) -> &mut Cursor {
        &mut self.cursor
    }

    /// Number of cursors held, one per parent row visited.
    pub fn cursor_count(&self) -> usize {
        self.parked.len() + 1
    }

    pub fn row_count(&self) -> usize {
        self.cursor.row_count()
    }

    pub fn row_number(&self) -> Option<usize> {
        self.cursor.row_number()
    }

    pub fn current_pk(&self) -> Option<Value> {
        self.cursor.current_pk()
    }

    pub fn is_adding(&self) -> bool {
        self.cursor.is_adding()
    }

    pub fn get_sql(&self) -> String {
        self.cursor.get_sql()
    }

    pub fn get_field_val(&self, field: &str) -> Result<&Value> {
        self.cursor.get_field_val(field)
    }

    pub fn children(&self) -> &[Bizobj] {
        &self.children
    }

    pub fn child(&self, data_source: &str) -> Option<&Bizobj> {
        self.children
            .iter()
            .find(|child| child.data_source == data_source)
    }

    pub fn child_mut(&mut self, data_source: &str) -> Option<&mut Bizobj> {
        self.children
            .iter_mut()
            .find(|child| child.data_source == data_source)
    }

    /// Adds a child bizobj, positioned under the current row.
    ///
    /// The child must have a link field.
    pub fn add_child(&mut self, mut child: Bizobj) -> Result<()> {
        if child.link_field.is_none() {
            return Err(Error::invalid_configuration(format!(
                "child `{}` of `{}` has no link field",
                child.data_source, self.data_source
            )));
        }

        let link = self.parent_link_for(&child);
        child.attach(link)?;
        self.children.push(child);
        Ok(())
    }

    /// True when the current row, or any child, has unsaved changes.
    pub fn is_changed(&self) -> bool {
        self.cursor.is_changed(false) || self.children.iter().any(Bizobj::is_any_changed)
    }

    /// True when any row of any cursor, here or below, has unsaved changes.
    pub fn is_any_changed(&self) -> bool {
        self.cursors().any(|cursor| cursor.is_changed(true))
            || self.children.iter().any(Bizobj::is_any_changed)
    }

    /// Visits each row of the current cursor with the pointer on it.
    pub fn scan<F>(&mut self, f: F) -> Result<()>
    where
        F: FnMut(&mut Cursor) -> Result<()>,
    {
        self.cursor.scan(f)
    }

    /// Scans the rows and returns the first row failing `validate_record`.
    pub fn validate_all(&self) -> Result<()> {
        for row in self.cursor.rows().iter().filter(|row| row.is_changed()) {
            self.validate_row(row)?;
        }
        Ok(())
    }

    pub fn field_clause(&self) -> &str {
        self.template.field_clause()
    }

    pub fn set_field_clause(&mut self, clause: &str) {
        self.each_builder(|builder| builder.set_field_clause(clause));
    }

    pub fn add_field(&mut self, expr: &str) {
        self.each_builder(|builder| builder.add_field(expr));
    }

    pub fn from_clause(&self) -> &str {
        self.template.from_clause()
    }

    pub fn set_from_clause(&mut self, clause: &str) {
        self.each_builder(|builder| builder.set_from_clause(clause));
    }

    pub fn add_from(&mut self, expr: &str) {
        self.each_builder(|builder| builder.add_from(expr));
    }

    pub fn where_clause(&self) -> &str {
        self.template.where_clause()
    }

    pub fn set_where_clause(&mut self, clause: &str) {
        self.each_builder(|builder| builder.set_where_clause(clause));
    }

    pub fn add_where(&mut self, expr: &str, connector: Connector) {
        self.each_builder(|builder| builder.add_where(expr, connector));
    }

    pub fn set_group_by_clause(&mut self, clause: &str) {
        self.each_builder(|builder| builder.set_group_by_clause(clause));
    }

    pub fn set_order_by_clause(&mut self, clause: &str) {
        self.each_builder(|builder| builder.set_order_by_clause(clause));
    }

    pub fn set_limit_clause(&mut self, clause: &str) {
        self.each_builder(|builder| builder.set_limit_clause(clause));
    }

    fn cursors(&self) -> impl Iterator<Item = &Cursor> {
        std::iter::once(&self.cursor).chain(self.parked.values())
    }

    fn each_cursor(&mut self, mut f: impl FnMut(&mut Cursor)) {
        f(&mut self.cursor);
        self.parked.values_mut().for_each(f);
    }

    fn each_builder(&mut self, f: impl Fn(&mut SqlBuilder)) {
        f(&mut self.template);
        self.each_cursor(|cursor| f(cursor.sql_builder_mut()));
    }

    fn event(&self, operation: Operation, phase: Phase) -> Event<'_> {
        Event {
            operation,
            phase,
            data_source: &self.data_source,
            row_number: self.cursor.row_number(),
            pk: self.cursor.current_pk(),
        }
    }

    /// Fires a `Before` event; a veto aborts the calling operation.
    fn before(&self, operation: Operation) -> Result<()> {
        self.events.fire(&self.event(operation, Phase::Before))
    }

    fn after(&self, operation: Operation) {
        // After-event failures are logged by `fire` and never surface
        let _ = self.events.fire(&self.event(operation, Phase::After));
    }

    fn validate_row(&self, row: &Row) -> Result<()> {
        let Some(rules) = &self.rules else {
            return Ok(());
        };

        rules.validate_record(row).map_err(|message| {
            tracing::info!(data_source = %self.data_source, reason = %message, "validation failed");
            Error::business_rule(message)
        })
    }

    /// The link a child sees for the current row of this bizobj.
    fn parent_link_for(&self, child: &Bizobj) -> Option<ParentLink> {
        let row = self.cursor.current_row()?;
        let field = child.parent_link_field.as_deref().unwrap_or(self.key_field.as_str());
        Some(ParentLink {
            value: row.get(field)?.clone(),
            is_new: row.is_new(),
        })
    }

    fn link_key(link: Option<&ParentLink>) -> String {
        link.map(|link| link.value.to_key_string()).unwrap_or_default()
    }

    /// Positions this child under `link`, swapping in the cursor for that
    /// parent key. Does not query.
    fn attach(&mut self, link: Option<ParentLink>) -> Result<()> {
        let key = Bizobj::link_key(link.as_ref());
        self.parent = link;

        if key == self.current_key {
            return Ok(());
        }

        let cursor = match self.parked.shift_remove(&key) {
            Some(cursor) => cursor,
            None => self.create_cursor()?,
        };

        let previous = std::mem::replace(&mut self.cursor, cursor);
        let previous_key = std::mem::replace(&mut self.current_key, key);
        self.parked.insert(previous_key, previous);
        Ok(())
    }

    fn create_cursor(&self) -> Result<Cursor> {
        self.before(Operation::CreateCursor)?;

        let mut cursor = self.conn.cursor(&self.data_source);
        cursor.set_key_field(&self.key_field);
        cursor.set_auto_populate_pk(self.auto_populate_pk);
        cursor.set_restore_position_on_requery(self.restore_position);
        cursor.set_encoding(self.encoding);
        *cursor.sql_builder_mut() = self.template.clone();

        self.after(Operation::CreateCursor);
        Ok(cursor)
    }

    /// `table.link = <parent key>`, or an always-false filter while the
    /// parent row is missing or not inserted yet.
    fn child_filter(&self) -> Option<String> {
        let link_field = self.link_field.as_ref()?;
        Some(match &self.parent {
            Some(ParentLink {
                value,
                is_new: false,
            }) => format!(
                "{}.{} = {}",
                self.data_source,
                link_field,
                self.conn.serializer().literal(value)
            ),
            _ => "1 = 0".to_string(),
        })
    }

    /// Moves the cursor of parent key `change.old` to `change.new` and
    /// rewrites the link field of rows still holding the old key.
    ///
    /// `parent_key` is the parent's key field. A child linked to another
    /// parent field does not follow key changes.
    fn rekey_parent(&mut self, parent_key: &str, change: &KeyChange) -> Result<()> {
        if self
            .parent_link_field
            .as_deref()
            .is_some_and(|field| field != parent_key)
        {
            return Ok(());
        }

        let old = change.old.to_key_string();
        let new = change.new.to_key_string();

        if self.current_key == old {
            self.current_key = new;
            self.parent = Some(ParentLink {
                value: change.new.clone(),
                is_new: false,
            });
            if let Some(link_field) = &self.link_field {
                self.cursor.relink(link_field, change)?;
            }
        } else if let Some(mut cursor) = self.parked.shift_remove(&old) {
            if let Some(link_field) = &self.link_field {
                cursor.relink(link_field, change)?;
            }
            self.parked.insert(new, cursor);
        }
        Ok(())
    }

    /// Drops the children's cursors parked under temp keys of parent rows
    /// that no longer exist, such as a new row that was cancelled.
    fn prune_children(&mut self) {
        for idx in 0..self.children.len() {
            let field = self.children[idx]
                .parent_link_field
                .as_deref()
                .unwrap_or(self.key_field.as_str());

            let live: HashSet<String> = self
                .cursors()
                .flat_map(|cursor| cursor.rows())
                .filter_map(|row| row.get(field))
                .map(Value::to_key_string)
                .collect();

            let child = &mut self.children[idx];
            child
                .parked
                .retain(|key, _| !Bizobj::is_temp_key(key) || live.contains(key));
            child.prune_children();
        }
    }

    fn is_temp_key(key: &str) -> bool {
        key.ends_with(TEMP_PK_SUFFIX)
    }
}
