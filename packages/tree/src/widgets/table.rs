//! Table views and their replicating parts
//!
//! Three replicating call sites live here:
//!
//! * [`WIDGET_CELL_RENDERER`] clones its prototype once per displayed record,
//!   scoped by its own id.
//! * [`INPUT_CELL`] clones its prototype once per input row, scoped by the id of
//!   the table's first [`TABLE_VIEW_INPUT_ROW`].
//! * [`TABLE_VIEW_INPUT_ROW`] owns the persisted replicator-id set and drives
//!   the input cells of every column through [`InputRow`].

use super::{CONTROL, UI_OBJECT};
use crate::binding::Record;
use crate::capability::Stateful;
use crate::component::{Capabilities, ComponentSpec, PropertySpec};
use crate::descendants::TypeFilter;
use crate::error::{TreeError, TreeResult};
use crate::node::Node;
use crate::replicator::clone_suffix;
use crate::state::StateMap;
use crate::value::PropertyKind;
use std::cell::RefCell;
use tracing::{debug, warn};
use trellis_form::{
    is_valid_replicator_id, replicator_field_name, FormData, FormError, HiddenFields, ReplicatorSet,
};

/// Rows an input row starts with when nothing was submitted
pub const DEFAULT_INPUT_ROWS: i64 = 1;

/// Rows a client may add in one submission
pub const DEFAULT_MAX_ADDED_ROWS: i64 = 10;

/// Upper bound for `number` and `max_added_rows`
pub const MAX_INPUT_ROWS: i64 = 1000;

pub static TABLE_VIEW: ComponentSpec = ComponentSpec {
    parent: Some(&CONTROL),
    capabilities: Capabilities::PARENT.union(Capabilities::AUTO_ID),
    ..ComponentSpec::base("TableView")
};

pub static TABLE_VIEW_COLUMN: ComponentSpec = ComponentSpec {
    parent: Some(&UI_OBJECT),
    capabilities: Capabilities::PARENT.union(Capabilities::AUTO_ID),
    properties: &[PropertySpec::new("title", PropertyKind::String)],
    ..ComponentSpec::base("TableViewColumn")
};

pub static CELL_RENDERER: ComponentSpec = ComponentSpec {
    parent: Some(&UI_OBJECT),
    ..ComponentSpec::base("CellRenderer")
};

pub static TEXT_CELL_RENDERER: ComponentSpec = ComponentSpec {
    parent: Some(&CELL_RENDERER),
    properties: &[
        PropertySpec::new("text", PropertyKind::String),
        PropertySpec::new("content_type", PropertyKind::String),
    ],
    ..ComponentSpec::base("TextCellRenderer")
};

pub static WIDGET_CELL_RENDERER: ComponentSpec = ComponentSpec {
    parent: Some(&CELL_RENDERER),
    capabilities: Capabilities::REPLICATOR.union(Capabilities::AUTO_ID),
    properties: &[PropertySpec::new("replicator_field", PropertyKind::String)],
    replication_scope: Some(own_id),
    ..ComponentSpec::base("WidgetCellRenderer")
};

fn own_id(node: &Node) -> Option<String> {
    node.id()
}

pub static INPUT_CELL: ComponentSpec = ComponentSpec {
    parent: Some(&UI_OBJECT),
    capabilities: Capabilities::REPLICATOR,
    replication_scope: Some(input_row_id),
    ..ComponentSpec::base("InputCell")
};

fn input_row_id(cell: &Node) -> Option<String> {
    cell.first_ancestor(&TypeFilter::of_type("TableView"))?
        .get_first_descendant(&TypeFilter::of_type("TableViewInputRow"))?
        .id()
}

pub static TABLE_VIEW_ROW: ComponentSpec = ComponentSpec {
    parent: Some(&UI_OBJECT),
    ..ComponentSpec::base("TableViewRow")
};

pub static TABLE_VIEW_INPUT_ROW: ComponentSpec = ComponentSpec {
    parent: Some(&TABLE_VIEW_ROW),
    capabilities: Capabilities::REPLICATOR_SET.union(Capabilities::AUTO_ID),
    properties: &[
        PropertySpec::new("number", PropertyKind::Integer).bounded(0, MAX_INPUT_ROWS),
        PropertySpec::new("max_added_rows", PropertyKind::Integer).bounded(0, MAX_INPUT_ROWS),
        PropertySpec::new("enter_text", PropertyKind::String),
    ],
    ..ComponentSpec::base("TableViewInputRow")
};

/// Typed view over a `WidgetCellRenderer` node
#[derive(Debug, Clone)]
pub struct WidgetCellRenderer(Node);

impl WidgetCellRenderer {
    pub fn from_node(node: &Node) -> Option<Self> {
        node.is_a(WIDGET_CELL_RENDERER.name).then(|| Self(node.clone()))
    }

    pub fn node(&self) -> &Node {
        &self.0
    }

    /// Replicator id of a record, read from the field named by `replicator_field`
    pub fn replicator_id(&self, record: &dyn Record) -> TreeResult<String> {
        let field = self
            .0
            .string_property("replicator_field")
            .ok_or_else(|| TreeError::MissingProperty {
                node: self.0.describe(),
                property: "replicator_field".to_string(),
            })?;

        let value = record.field(&field).ok_or_else(|| TreeError::MissingRecordField {
            node: self.0.describe(),
            property: "replicator_field".to_string(),
            field: field.clone(),
        })?;

        let id = match value.as_str() {
            Some(s) => s.to_string(),
            None => value.to_string(),
        };
        if !is_valid_replicator_id(&id) {
            return Err(FormError::InvalidReplicatorId { id }.into());
        }
        Ok(id)
    }

    /// The clone for this record, with its data bindings filled from the record
    pub fn render_record(&self, record: &dyn Record) -> TreeResult<Node> {
        let replicator_id = self.replicator_id(record)?;
        let clone = self.0.replicate(&replicator_id)?;
        clone.apply_bindings(record)?;
        Ok(clone)
    }

    /// Clone descendant for a record that was already rendered
    pub fn widget(&self, replicator_id: &str, original_id: &str) -> TreeResult<Node> {
        if !self.0.replicator_ids().iter().any(|id| id == replicator_id) {
            return Err(TreeError::RowNotFound {
                replicator_id: replicator_id.to_string(),
                row: self.0.describe(),
            });
        }
        self.0
            .replicated_widget(replicator_id, original_id)?
            .ok_or_else(|| TreeError::WidgetNotFound {
                id: original_id.to_string(),
            })
    }
}

/// One replicated input row: the clone of every input cell for one replicator id
#[derive(Debug, Clone)]
pub struct InputRowClones {
    pub replicator_id: String,
    /// `(column id, clone)` in column order
    pub cells: Vec<(String, Node)>,
}

/// Typed view over a `TableViewInputRow` node
#[derive(Debug, Clone)]
pub struct InputRow(Node);

impl InputRow {
    pub fn from_node(node: &Node) -> Option<Self> {
        node.is_a(TABLE_VIEW_INPUT_ROW.name).then(|| Self(node.clone()))
    }

    pub fn node(&self) -> &Node {
        &self.0
    }

    fn set(&self) -> TreeResult<&RefCell<ReplicatorSet>> {
        self.0
            .0
            .replicator_set
            .as_ref()
            .ok_or_else(|| TreeError::NotReplicating {
                host: self.0.describe(),
            })
    }

    fn scope_id(&self) -> TreeResult<String> {
        self.0.id().ok_or_else(|| TreeError::MissingScope {
            host: self.0.describe(),
        })
    }

    pub fn table_view(&self) -> Option<Node> {
        self.0.first_ancestor(&TypeFilter::of_type(TABLE_VIEW.name))
    }

    /// `(column id, input cell)` for every column of the table that has one
    pub fn input_cells(&self) -> Vec<(String, Node)> {
        let Some(table) = self.table_view() else {
            return Vec::new();
        };
        let columns = table.get_descendants(Some(&TypeFilter::of_type(TABLE_VIEW_COLUMN.name)));
        columns
            .iter()
            .filter_map(|column| {
                let id = column.id()?;
                let cell = column.get_first_descendant(&TypeFilter::of_type(INPUT_CELL.name))?;
                Some((id, cell))
            })
            .collect()
    }

    fn input_cell(&self, column_id: &str) -> TreeResult<Node> {
        self.input_cells()
            .into_iter()
            .find(|(id, _)| id == column_id)
            .map(|(_, cell)| cell)
            .ok_or_else(|| TreeError::WidgetNotFound {
                id: column_id.to_string(),
            })
    }

    /// Field the replicator set is persisted under
    pub fn field_name(&self) -> TreeResult<String> {
        Ok(replicator_field_name(&self.scope_id()?))
    }

    /// Field a client uses to ask for extra rows
    pub fn added_rows_field(&self) -> TreeResult<String> {
        Ok(format!("{}_added", self.scope_id()?))
    }

    /// Rebuild the live row set for this request
    ///
    /// A submitted form restores exactly the persisted set; a first request
    /// starts with `number` rows. Rows the client asked for through the
    /// `_added` field are then appended within `max_added_rows`.
    pub fn initialize(&self, form: &FormData) -> TreeResult<()> {
        let field = self.field_name()?;
        let set = match form.hidden_field::<ReplicatorSet>(&field)? {
            Some(set) => {
                debug!(row = %self.0.describe(), rows = set.len(), "Restored replicator set");
                set
            }
            None => {
                let number = self
                    .0
                    .integer_property("number")
                    .unwrap_or(DEFAULT_INPUT_ROWS)
                    .clamp(0, MAX_INPUT_ROWS);
                ReplicatorSet::seeded(number as usize)
            }
        };
        *self.set()?.borrow_mut() = set;

        let requested = match form.raw(&self.added_rows_field()?) {
            Some(raw) if form.is_submitted() => match raw.trim().parse::<usize>() {
                Ok(count) => count,
                Err(_) => {
                    warn!(row = %self.0.describe(), value = %raw, "Ignoring malformed added-row count");
                    0
                }
            },
            _ => 0,
        };
        for replicator_id in self.replicator_ids()? {
            self.materialize(&replicator_id)?;
        }
        if requested > 0 {
            self.accept_added_rows(requested)?;
        }
        Ok(())
    }

    fn materialize(&self, replicator_id: &str) -> TreeResult<()> {
        for (_, cell) in self.input_cells() {
            cell.replicate(replicator_id)?;
        }
        Ok(())
    }

    pub fn replicator_ids(&self) -> TreeResult<Vec<String>> {
        Ok(self.set()?.borrow().iter().map(str::to_string).collect())
    }

    pub fn contains(&self, replicator_id: &str) -> TreeResult<bool> {
        Ok(self.set()?.borrow().contains(replicator_id))
    }

    /// Add one row under the next free integer id
    pub fn add_row(&self) -> TreeResult<String> {
        let replicator_id = {
            let mut set = self.set()?.borrow_mut();
            let next = set.next_id();
            set.push(next.clone())?;
            next
        };
        self.materialize(&replicator_id)?;
        debug!(row = %self.0.describe(), replicator_id = %replicator_id, "Added input row");
        Ok(replicator_id)
    }

    /// Add rows a client requested, never more than `max_added_rows`
    pub fn accept_added_rows(&self, count: usize) -> TreeResult<Vec<String>> {
        let limit = self
            .0
            .integer_property("max_added_rows")
            .unwrap_or(DEFAULT_MAX_ADDED_ROWS)
            .clamp(0, MAX_INPUT_ROWS) as usize;
        if count > limit {
            warn!(row = %self.0.describe(), requested = count, limit, "Clamping client-added rows");
        }
        (0..count.min(limit)).map(|_| self.add_row()).collect()
    }

    /// Drop a row and its clones in every input cell
    pub fn remove_row(&self, replicator_id: &str) -> TreeResult<()> {
        if !self.set()?.borrow_mut().remove(replicator_id) {
            return Err(TreeError::RowNotFound {
                replicator_id: replicator_id.to_string(),
                row: self.0.describe(),
            });
        }
        for (_, cell) in self.input_cells() {
            cell.unset_replicator(replicator_id)?;
        }
        Ok(())
    }

    /// Clone of `original_id` in the given column and row
    ///
    /// Only ids of the live row set resolve; anything else is `RowNotFound`.
    pub fn widget(&self, column_id: &str, replicator_id: &str, original_id: &str) -> TreeResult<Node> {
        if !self.contains(replicator_id)? {
            return Err(TreeError::RowNotFound {
                replicator_id: replicator_id.to_string(),
                row: self.0.describe(),
            });
        }
        self.input_cell(column_id)?
            .replicated_widget(replicator_id, original_id)?
            .ok_or_else(|| TreeError::WidgetNotFound {
                id: original_id.to_string(),
            })
    }

    /// Every live row, in replicator-set order
    pub fn rows(&self) -> TreeResult<Vec<InputRowClones>> {
        let cells = self.input_cells();
        self.replicator_ids()?
            .into_iter()
            .map(|replicator_id| {
                let clones = cells
                    .iter()
                    .map(|(column_id, cell)| Ok((column_id.clone(), cell.replicate(&replicator_id)?)))
                    .collect::<TreeResult<Vec<_>>>()?;
                Ok(InputRowClones {
                    replicator_id,
                    cells: clones,
                })
            })
            .collect()
    }

    /// State of one row's stateful widgets, keyed by their original ids
    pub fn row_state(&self, replicator_id: &str) -> TreeResult<StateMap> {
        let suffix = clone_suffix(&self.scope_id()?, replicator_id);
        let row = self
            .rows()?
            .into_iter()
            .find(|row| row.replicator_id == replicator_id)
            .ok_or_else(|| TreeError::RowNotFound {
                replicator_id: replicator_id.to_string(),
                row: self.0.describe(),
            })?;

        let mut state = StateMap::new();
        for (_, clone) in row.cells {
            let nodes = std::iter::once(clone.clone()).chain(clone.get_descendants(None));
            for node in nodes {
                let (Some(id), Some(stateful)) = (node.id(), node.as_stateful()) else {
                    continue;
                };
                let original = id.strip_suffix(&suffix).unwrap_or(&id).to_string();
                state.insert(original, stateful.state());
            }
        }
        Ok(state)
    }

    /// Write the live row set for the next request
    pub fn persist(&self, hidden: &mut HiddenFields) -> TreeResult<()> {
        let field = self.field_name()?;
        hidden.add(field, &*self.set()?.borrow())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::PropertyBinding;
    use crate::value::PropertyValue;
    use crate::widgets::{BUTTON, ENTRY, INTEGER_ENTRY};
    use serde_json::json;

    const SECRET: &str = "test-secret";

    /// TableView#items { Column#name { InputCell { Entry#name_entry } }
    ///                   Column#qty { InputCell { IntegerEntry#quantity } }
    ///                   TableViewInputRow#new_items }
    fn table(number: i64) -> (Node, InputRow) {
        let table = Node::with_id(&TABLE_VIEW, "items");
        for (column_id, prototype) in [
            ("name", Node::with_id(&ENTRY, "name_entry")),
            ("qty", Node::with_id(&INTEGER_ENTRY, "quantity")),
        ] {
            let column = Node::with_id(&TABLE_VIEW_COLUMN, column_id);
            let cell = Node::new(&INPUT_CELL);
            cell.set_prototype(prototype).unwrap();
            column.append(cell).unwrap();
            table.append(column).unwrap();
        }

        let row = Node::with_id(&TABLE_VIEW_INPUT_ROW, "new_items");
        row.set_property("number", PropertyValue::Integer(number))
            .unwrap();
        row.set_property("max_added_rows", PropertyValue::Integer(2))
            .unwrap();
        table.append(row.clone()).unwrap();

        (table, InputRow::from_node(&row).unwrap())
    }

    #[test]
    fn test_first_request_seeds_rows() {
        let (_table, row) = table(3);
        row.initialize(&FormData::new(SECRET)).unwrap();

        assert_eq!(row.replicator_ids().unwrap(), vec!["0", "1", "2"]);
        let qty = row.widget("qty", "1", "quantity").unwrap();
        assert_eq!(qty.id().as_deref(), Some("quantity_new_items_1"));
    }

    #[test]
    fn test_persist_round_trip_after_remove() {
        let (_table, row) = table(3);
        row.initialize(&FormData::new(SECRET)).unwrap();
        row.remove_row("1").unwrap();

        let mut hidden = HiddenFields::new(SECRET);
        row.persist(&mut hidden).unwrap();
        assert!(hidden.raw("new_items_replicators").is_some());

        let (_table, next) = table(3);
        next.initialize(&hidden.into_submission()).unwrap();
        assert_eq!(next.replicator_ids().unwrap(), vec!["0", "2"]);
        assert!(matches!(
            next.widget("name", "1", "name_entry"),
            Err(TreeError::RowNotFound { .. })
        ));
    }

    #[test]
    fn test_tampered_set_rejected() {
        let (_table, row) = table(2);
        row.initialize(&FormData::new(SECRET)).unwrap();
        let mut hidden = HiddenFields::new(SECRET);
        row.persist(&mut hidden).unwrap();

        let envelope = hidden.raw("new_items_replicators").unwrap().to_string();
        let forged = envelope.replace(r#""1""#, r#""9""#);
        assert_ne!(envelope, forged);

        let (_table, next) = table(2);
        let form = FormData::submitted(SECRET, [("new_items_replicators", forged)]);
        assert!(matches!(next.initialize(&form), Err(TreeError::Form(_))));
    }

    #[test]
    fn test_added_rows_are_bounded() {
        let (_table, row) = table(1);
        let form = FormData::submitted(SECRET, [("new_items_added", "50")]);
        row.initialize(&form).unwrap();
        assert_eq!(row.replicator_ids().unwrap(), vec!["0", "1", "2"]);

        let (_table, row) = table(1);
        let form = FormData::submitted(SECRET, [("new_items_added", "lots")]);
        row.initialize(&form).unwrap();
        assert_eq!(row.replicator_ids().unwrap(), vec!["0"]);
    }

    #[test]
    fn test_row_counts_are_bounded() {
        let row = Node::with_id(&TABLE_VIEW_INPUT_ROW, "new_items");
        for property in ["number", "max_added_rows"] {
            assert!(matches!(
                row.set_property(property, PropertyValue::Integer(MAX_INPUT_ROWS + 1)),
                Err(TreeError::PropertyOutOfRange { max: MAX_INPUT_ROWS, .. })
            ));
            assert!(matches!(
                row.set_property(property, PropertyValue::Integer(-1)),
                Err(TreeError::PropertyOutOfRange { min: 0, .. })
            ));
        }
        row.set_property("number", PropertyValue::Integer(MAX_INPUT_ROWS))
            .unwrap();
        assert_eq!(row.integer_property("number"), Some(MAX_INPUT_ROWS));
    }

    #[test]
    fn test_rows_and_row_state() {
        let (_table, row) = table(2);
        row.initialize(&FormData::new(SECRET)).unwrap();
        row.widget("qty", "0", "quantity")
            .unwrap()
            .set_property("value", PropertyValue::Integer(4))
            .unwrap();

        let rows = row.rows().unwrap();
        assert_eq!(rows.len(), 2);
        let columns: Vec<_> = rows[0].cells.iter().map(|(c, _)| c.as_str()).collect();
        assert_eq!(columns, vec!["name", "qty"]);

        let state = row.row_state("0").unwrap();
        assert_eq!(state["quantity"], json!(4));
        assert_eq!(state["name_entry"], serde_json::Value::Null);

        let added = row.add_row().unwrap();
        assert_eq!(added, "2");
    }

    #[test]
    fn test_widget_cell_renderer_binds_records() {
        let renderer = Node::with_id(&WIDGET_CELL_RENDERER, "actions");
        renderer
            .set_property("replicator_field", PropertyValue::String("id".into()))
            .unwrap();
        let button = Node::with_id(&BUTTON, "edit");
        button.bind(PropertyBinding::new("title", "label")).unwrap();
        renderer.set_prototype(button).unwrap();

        let view = WidgetCellRenderer::from_node(&renderer).unwrap();
        let clone = view
            .render_record(&json!({ "id": 7, "label": "Edit seven" }))
            .unwrap();
        assert_eq!(clone.id().as_deref(), Some("edit_actions_7"));
        assert_eq!(clone.string_property("title").as_deref(), Some("Edit seven"));
        assert!(view.widget("7", "edit").unwrap().ptr_eq(&clone));

        // the prototype keeps its binding and no value
        assert!(renderer.prototype().unwrap().string_property("title").is_none());

        assert!(matches!(
            view.render_record(&json!({ "id": "a_b", "label": "x" })),
            Err(TreeError::Form(FormError::InvalidReplicatorId { .. }))
        ));
        assert!(matches!(
            view.widget("8", "edit"),
            Err(TreeError::RowNotFound { .. })
        ));
    }
}
