//! Loading whole documents from disk and driving the resulting trees

use std::fs;
use tempfile::TempDir;
use trellis_form::{FormData, HiddenFields};
use trellis_loader::{LoadError, Loader};
use trellis_tree::widgets::CONTAINER;
use trellis_tree::{InputRow, Node, PropertyValue, TypeFilter};

const SECRET: &str = "integration-secret";

const ORDER_FORM: &str = r#"
// Order entry with an editable line table
widget Form#order {
    action: string = "/orders";
    widget Frame#customer {
        title: string translatable = "Customer";
        widget Entry#customer_name { maxlength: integer = 120; }
        widget FileEntry#purchase_order { accept_mime_types: string = "application/pdf"; }
    }
    widget TableView#lines {
        object TableViewColumn#product {
            title: string = "Product";
            object TextCellRenderer { text: data = "name"; }
            object InputCell { widget Entry#product_name { } }
        }
        object TableViewColumn#quantity {
            object InputCell { widget IntegerEntry#amount { value: integer = 1; } }
        }
        object TableViewInputRow#new_lines {
            number: integer = 2;
            max_added_rows: integer = 3;
        }
    }
}
"#;

fn load_order(dir: &TempDir) -> (Node, InputRow) {
    let path = dir.path().join("order.trellis");
    if !path.exists() {
        fs::write(&path, ORDER_FORM).unwrap();
    }

    let root = Node::new(&CONTAINER);
    let report = Loader::standard().load_file(&path, &root).unwrap();
    assert!(report.diagnostics.is_empty());

    let row = root
        .get_first_descendant(&TypeFilter::of_type("TableViewInputRow"))
        .and_then(|node| InputRow::from_node(&node))
        .unwrap();
    (root, row)
}

#[test]
fn test_load_file_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let (root, _) = load_order(&dir);

    let form = root.child("order").unwrap();
    assert_eq!(
        form.string_property("encoding_type").as_deref(),
        Some("multipart/form-data")
    );
    let widgets = root.get_descendants(None);
    assert!(widgets.get("customer_name").is_some());
    // prototypes live in their input cells, not in the tree
    assert!(widgets.get("product_name").is_none());
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = Loader::standard()
        .load_file(&dir.path().join("absent.trellis"), &Node::new(&CONTAINER))
        .unwrap_err();
    assert!(matches!(err, LoadError::FileNotFound { .. }));
}

#[test]
fn test_malformed_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.trellis");
    fs::write(&path, "widget Form#f { action: = ; }").unwrap();

    let err = Loader::standard()
        .load_file(&path, &Node::new(&CONTAINER))
        .unwrap_err();
    match err {
        LoadError::MalformedDocument { path: reported, .. } => {
            assert!(reported.ends_with("broken.trellis"));
        }
        other => panic!("expected malformed document, got {other:?}"),
    }
}

#[test]
fn test_input_rows_survive_a_request_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let (_, row) = load_order(&dir);
    row.initialize(&FormData::new(SECRET)).unwrap();
    assert_eq!(row.replicator_ids().unwrap(), vec!["0", "1"]);

    let amount = row.widget("quantity", "1", "amount").unwrap();
    assert_eq!(amount.id().as_deref(), Some("amount_new_lines_1"));
    assert_eq!(amount.integer_property("value"), Some(1));
    amount
        .set_property("value", PropertyValue::Integer(12))
        .unwrap();
    assert_eq!(
        row.row_state("1").unwrap().get("amount"),
        Some(&serde_json::json!(12))
    );

    row.remove_row("0").unwrap();
    let mut hidden = HiddenFields::new(SECRET);
    row.persist(&mut hidden).unwrap();
    let mut submission = hidden.into_submission();
    submission.set_raw("new_lines_added", "5");

    let (_, next) = load_order(&dir);
    next.initialize(&submission).unwrap();

    // one kept row plus three of the five requested
    assert_eq!(next.replicator_ids().unwrap(), vec!["1", "2", "3", "4"]);
    let rows = next.rows().unwrap();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0].cells.len(), 2);
    assert_eq!(rows[0].cells[0].0, "product");
    assert_eq!(
        rows[3].cells[1].1.id().as_deref(),
        Some("amount_new_lines_4")
    );
}

#[test]
fn test_malformed_added_count_is_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let (_, row) = load_order(&dir);
    row.initialize(&FormData::new(SECRET)).unwrap();

    let mut hidden = HiddenFields::new(SECRET);
    row.persist(&mut hidden).unwrap();
    let mut submission = hidden.into_submission();
    submission.set_raw("new_lines_added", "lots");

    let (_, next) = load_order(&dir);
    next.initialize(&submission).unwrap();
    assert_eq!(next.replicator_ids().unwrap(), vec!["0", "1"]);
}
