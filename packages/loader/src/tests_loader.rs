use crate::*;
use trellis_common::MockFileSystem;
use trellis_tree::widgets::{BUTTON, CONTAINER, FRAME};
use trellis_tree::{Node, PropertyValue, TreeError, TypeFilter};
use std::path::Path;

fn root() -> Node {
    Node::new(&CONTAINER)
}

fn load(source: &str) -> LoadResult<(Node, LoadReport)> {
    let root = root();
    let report = Loader::standard().load_str(source, &root)?;
    Ok((root, report))
}

#[test]
fn test_builds_nested_tree() {
    let (root, report) = load(
        r#"
        widget Form#edit {
            action: string = "/save";
            autocomplete: boolean = false;
            widget Frame#details {
                title: string = "Details";
                widget Entry#name { maxlength: integer = 40; }
                widget FloatEntry#price { value: float = 9.5; }
            }
            widget Button#submit { title: string = "Save"; }
        }
    "#,
    )
    .unwrap();

    let ids: Vec<_> = report.widgets.keys().cloned().collect();
    assert_eq!(ids, vec!["edit", "details", "name", "price", "submit"]);

    let form = report.widget("edit").unwrap();
    assert!(form.parent().unwrap().ptr_eq(&root));
    assert_eq!(form.string_property("action").as_deref(), Some("/save"));
    assert_eq!(form.bool_property("autocomplete"), Some(false));
    assert_eq!(
        report.widget("price").unwrap().property("value"),
        Some(PropertyValue::Float(9.5))
    );
    assert!(report.diagnostics.is_empty());
}

#[test]
fn test_only_widgets_are_indexed() {
    let (_, report) = load("widget TableView#t { object TableViewColumn#c { } }").unwrap();
    let ids: Vec<_> = report.widgets.keys().cloned().collect();
    assert_eq!(ids, vec!["t"]);
    assert!(matches!(report.widget("c"), Err(TreeError::WidgetNotFound { .. })));
}

#[test]
fn test_duplicate_sibling_ids_fail() {
    let err = load(
        r#"
        widget Frame#outer {
            widget Entry#x { }
            widget Entry#x { }
        }
    "#,
    )
    .unwrap_err();
    assert!(matches!(err, LoadError::DuplicateId { ref id, .. } if id == "x"));
}

#[test]
fn test_same_id_in_unrelated_containers_loads() {
    let loader = Loader::standard();
    let first = Node::with_id(&FRAME, "first");
    let second = Node::with_id(&FRAME, "second");

    loader.load_str("widget Entry#x { }", &first).unwrap();
    loader.load_str("widget Entry#x { }", &second).unwrap();

    assert!(first.child("x").is_some());
    assert!(second.child("x").is_some());
}

#[test]
fn test_duplicate_ids_across_loads_in_one_session() {
    let loader = Loader::standard();
    let mut ui = loader.session();
    ui.load_str("widget Entry#x { }", &Node::new(&FRAME)).unwrap();

    let err = ui
        .load_str("widget Entry#x { }", &Node::new(&FRAME))
        .unwrap_err();
    assert!(matches!(err, LoadError::DuplicateId { .. }));
    assert!(ui.widget("x").is_ok());
    assert!(matches!(
        ui.widget("y"),
        Err(TreeError::WidgetNotFound { .. })
    ));
}

#[test]
fn test_failed_load_leaves_target_untouched() {
    let root = root();
    let err = Loader::standard()
        .load_str("widget Frame#first { } widget NoSuchType#second { }", &root)
        .unwrap_err();
    assert!(matches!(err, LoadError::UnknownType { .. }));
    assert_eq!(root.child_count(), 0);

    // the second node clashes with a child the target already holds
    root.append(Node::with_id(&BUTTON, "taken")).unwrap();
    let err = Loader::standard()
        .load_str("widget Frame#first { } widget Entry#taken { }", &root)
        .unwrap_err();
    assert!(matches!(err, LoadError::Tree(TreeError::DuplicateId { ref id, .. }) if id == "taken"));
    let ids: Vec<_> = root.children().iter().filter_map(|c| c.id()).collect();
    assert_eq!(ids, vec!["taken"]);
}

#[test]
fn test_failed_load_rolls_back_session() {
    let loader = Loader::standard();
    let mut ui = loader.session();
    let target = Node::new(&FRAME);

    assert!(ui
        .load_str("widget Form { widget Entry#name { } } widget Marquee { }", &target)
        .is_err());
    assert!(ui.widget("name").is_err());
    assert_eq!(ui.widgets().count(), 0);

    ui.load_str("widget Form { widget Entry#name { } }", &target).unwrap();
    let ids: Vec<_> = ui.widgets().map(|(id, _)| id.to_string()).collect();
    assert_eq!(ids, vec!["form1", "name"]);
    assert_eq!(target.child_count(), 1);
}

#[test]
fn test_unknown_type_and_wrong_kind() {
    assert!(matches!(
        load("widget Marquee#m { }").unwrap_err(),
        LoadError::UnknownType { ref type_name, .. } if type_name == "Marquee"
    ));
    assert!(matches!(
        load("object Entry#e { }").unwrap_err(),
        LoadError::WrongNodeKind { .. }
    ));
    assert!(matches!(
        load("widget TableViewColumn#c { }").unwrap_err(),
        LoadError::WrongNodeKind { .. }
    ));
}

#[test]
fn test_property_name_errors() {
    assert!(matches!(
        load(r#"widget Entry#e { colour: string = "red"; }"#).unwrap_err(),
        LoadError::InvalidPropertyName { .. }
    ));
    assert!(matches!(
        load(r#"widget Entry#e { maxlength[a]: integer = 1; }"#).unwrap_err(),
        LoadError::InvalidPropertyName { reason: Some(_), .. }
    ));
    assert!(matches!(
        load(r#"widget Flydown#f { options: string = "x"; }"#).unwrap_err(),
        LoadError::InvalidPropertyName { reason: Some(_), .. }
    ));
}

#[test]
fn test_property_type_errors() {
    assert!(matches!(
        load(r#"widget Entry#e { maxlength: integer = "forty"; }"#).unwrap_err(),
        LoadError::InvalidPropertyType { .. }
    ));
    assert!(matches!(
        load(r#"widget Entry#e { maxlength: string = "40"; }"#).unwrap_err(),
        LoadError::InvalidPropertyType { .. }
    ));
    assert!(matches!(
        load(r#"widget Checkbox#c { value: boolean = maybe; }"#).unwrap_err(),
        LoadError::InvalidPropertyType { .. }
    ));
    assert!(matches!(
        load(r#"widget DateEntry#d { value: date = "someday"; }"#).unwrap_err(),
        LoadError::InvalidPropertyType { .. }
    ));
    assert!(matches!(
        load(r#"widget Entry#e { maxlength: integer translatable = 4; }"#).unwrap_err(),
        LoadError::InvalidPropertyType { .. }
    ));
}

#[test]
fn test_row_count_out_of_range() {
    let source = |number: &str| {
        format!(
            "widget TableView#t {{ object TableViewInputRow#r {{ number: integer = {}; }} }}",
            number
        )
    };
    let err = load(&source("99999999999")).unwrap_err();
    assert!(
        matches!(err, LoadError::InvalidPropertyType { ref property, ref reason, .. }
            if property == "number" && reason.contains("0..=1000"))
    );
    assert!(matches!(
        load(&source("-3")).unwrap_err(),
        LoadError::InvalidPropertyType { .. }
    ));
    assert!(load(&source("1000")).is_ok());
}

#[test]
fn test_indexed_and_date_properties() {
    let (_, report) = load(
        r#"
        widget Flydown#country {
            options[ca]: string = "Canada";
            options["us"]: string = "United States";
        }
        widget DateEntry#birthday {
            value: date = "1990-04-01";
            valid_range_start: date = "1900-01-01 00:00:00";
        }
    "#,
    )
    .unwrap();

    let options = report.widget("country").unwrap().property("options").unwrap();
    let keys: Vec<_> = options.as_map().unwrap().keys().cloned().collect();
    assert_eq!(keys, vec!["ca", "us"]);

    let birthday = report.widget("birthday").unwrap();
    assert_eq!(
        birthday.property("value").unwrap().to_string(),
        "1990-04-01 00:00:00"
    );
}

#[test]
fn test_constant_expressions() {
    let (_, report) = load(
        r#"
        widget DateEntry#a { display_parts: constant = "YEAR | MONTH"; }
        widget DateEntry#b { display_parts: constant = "DateEntry::DAY | DateEntry::CALENDAR"; }
        widget Entry#c { maxlength: constant = "(4 + 4) * 2"; }
    "#,
    )
    .unwrap();

    assert_eq!(report.widget("a").unwrap().integer_property("display_parts"), Some(3));
    assert_eq!(report.widget("b").unwrap().integer_property("display_parts"), Some(20));
    assert_eq!(report.widget("c").unwrap().integer_property("maxlength"), Some(16));

    let err = load(r#"widget DateEntry#d { display_parts: constant = "YEAR | WEEK"; }"#).unwrap_err();
    match err {
        LoadError::Expression { property, source, .. } => {
            assert_eq!(property, "display_parts");
            assert!(matches!(source, ExprError::UndefinedConstant { ref name, .. } if name == "WEEK"));
        }
        other => panic!("expected expression error, got {other:?}"),
    }
}

#[test]
fn test_implicit_strings() {
    let (_, report) = load(
        r#"
        widget Entry#e { value = "42"; }
        widget Button#b { title = "Save"; }
    "#,
    )
    .unwrap();
    assert_eq!(report.diagnostics.len(), 1);
    let diagnostic = &report.diagnostics[0];
    assert_eq!(diagnostic.level, DiagnosticLevel::Warning);
    assert_eq!(diagnostic.element.as_deref(), Some("Entry#e"));
    assert_eq!(
        report.widget("e").unwrap().string_property("value").as_deref(),
        Some("42")
    );

    // implicit strings never fill non-string properties
    assert!(matches!(
        load(r#"widget Entry#e { maxlength = "42"; }"#).unwrap_err(),
        LoadError::InvalidPropertyType { .. }
    ));

    let strict = Loader::standard().with_options(LoaderOptions {
        strict_implicit_strings: true,
    });
    assert!(matches!(
        strict.load_str(r#"widget Entry#e { value = "true"; }"#, &root()),
        Err(LoadError::InvalidPropertyType { .. })
    ));
}

#[test]
fn test_translatable_strings() {
    let loader = Loader::standard().with_translator(CatalogTranslator::new().with("Save", "Enregistrer"));
    let report = loader
        .load_str(
            r#"widget Button#b { title: string translatable = "Save"; stock_id: string = "Save"; }"#,
            &root(),
        )
        .unwrap();
    let button = report.widget("b").unwrap();
    assert_eq!(button.string_property("title").as_deref(), Some("Enregistrer"));
    assert_eq!(button.string_property("stock_id").as_deref(), Some("Save"));
}

#[test]
fn test_data_properties_become_bindings() {
    let (root, _) = load(
        r#"
        widget TableView#t {
            object TableViewColumn#c {
                object TextCellRenderer { text: data = "title"; }
            }
        }
    "#,
    )
    .unwrap();
    let renderer = root
        .get_first_descendant(&TypeFilter::of_type("TextCellRenderer"))
        .unwrap();
    let bindings = renderer.bindings();
    assert_eq!(bindings.len(), 1);
    assert_eq!(bindings[0].property, "text");
    assert_eq!(bindings[0].field, "title");
    assert!(renderer.property("text").is_none());
}

#[test]
fn test_parent_capability_required() {
    let err = load("widget Button#b { widget Entry#e { } }").unwrap_err();
    assert!(matches!(err, LoadError::DoesNotImplementParent { .. }));

    let button = Node::with_id(&BUTTON, "target");
    assert!(matches!(
        Loader::standard().load_str("widget Entry#e { }", &button),
        Err(LoadError::DoesNotImplementParent { .. })
    ));
}

#[test]
fn test_auto_ids_skip_declared_ids() {
    let (_, report) = load(
        r#"
        widget Form { }
        widget Form#form2 { }
        widget Form { }
        widget TableView { object TableViewInputRow { } }
    "#,
    )
    .unwrap();
    let ids: Vec<_> = report.widgets.keys().cloned().collect();
    assert_eq!(ids, vec!["form1", "form2", "form3", "tableview1"]);
}

#[test]
fn test_replicating_declarations() {
    let (root, report) = load(
        r#"
        widget TableView#items {
            object TableViewColumn#qty {
                object InputCell { widget IntegerEntry#quantity { } }
            }
            object TableViewInputRow#new_rows { number: integer = 2; }
        }
    "#,
    )
    .unwrap();

    let cell = root
        .get_first_descendant(&TypeFilter::of_type("InputCell"))
        .unwrap();
    assert_eq!(cell.child_count(), 0);
    assert!(cell.prototype().unwrap().ptr_eq(&report.widget("quantity").unwrap()));

    let row = root
        .get_first_descendant(&TypeFilter::of_type("TableViewInputRow"))
        .unwrap();
    assert_eq!(row.id().as_deref(), Some("new_rows"));
    assert!(matches!(
        load(r#"widget TableView#t { object TableViewColumn#c { object InputCell { widget Entry#a { } widget Entry#b { } } } }"#),
        Err(LoadError::Tree(TreeError::PrototypeAlreadySet { .. }))
    ));
}

#[test]
fn test_load_file_errors() {
    let mut fs = MockFileSystem::new();
    fs.add_file("/ui/broken.trellis", "widget Form#f {");
    fs.add_file("/ui/ok.trellis", "widget Form#f { }");
    let loader = Loader::standard().with_file_system(fs);

    assert!(matches!(
        loader.load_file(Path::new("/ui/missing.trellis"), &root()),
        Err(LoadError::FileNotFound { .. })
    ));
    assert!(matches!(
        loader.load_file(Path::new("/ui/broken.trellis"), &root()),
        Err(LoadError::MalformedDocument { .. })
    ));
    assert!(loader.load_file(Path::new("/ui/ok.trellis"), &root()).is_ok());
}
