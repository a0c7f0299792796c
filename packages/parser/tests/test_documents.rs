use trellis_parser::ast::{NodeKind, PropertyType};
use trellis_parser::{format_error, parse, parse_with_path, ParseError};

const ORDER_FORM: &str = r#"
/* Order entry */
widget Form#order {
    action: string = "/orders";
    widget DateEntry#delivery {
        display_parts: constant = "DateEntry::YEAR | MONTH | DAY";
        valid_range_start: date = "2024-01-01";
    }
    widget TableView#lines {
        object TableViewColumn#product {
            title: string translatable = "Product";
            object TextCellRenderer { text: data = "name"; }
            object InputCell { widget Entry#product_name { } }
        }
        object TableViewInputRow#new_lines { number: integer = 2; }
    }
    widget Flydown#carrier {
        options[ups]: string = 'UPS';
        options["dhl-express"]: string = "DHL Express";
        show_blank = true;
    }
}
"#;

#[test]
fn test_parse_order_form() {
    let doc = parse(ORDER_FORM).unwrap();
    assert_eq!(doc.nodes.len(), 1);
    assert_eq!(doc.node_count(), 9);

    let form = &doc.nodes[0];
    assert_eq!(form.kind, NodeKind::Widget);
    let names: Vec<_> = form.children.iter().map(|c| c.type_name.as_str()).collect();
    assert_eq!(names, vec!["DateEntry", "TableView", "Flydown"]);

    let delivery = &form.children[0].properties[0];
    assert_eq!(delivery.ty, PropertyType::Constant);
    assert_eq!(delivery.value, "DateEntry::YEAR | MONTH | DAY");

    let carrier = &form.children[2];
    let keys: Vec<_> = carrier
        .properties
        .iter()
        .map(|p| p.qualified_name())
        .collect();
    assert_eq!(keys, vec!["options[ups]", "options[dhl-express]", "show_blank"]);
    assert_eq!(carrier.properties[2].ty, PropertyType::Implicit);
    assert_eq!(carrier.properties[2].value, "true");
}

#[test]
fn test_document_as_json() {
    let doc = parse_with_path(ORDER_FORM, "/forms/order.trellis").unwrap();
    let json = serde_json::to_value(&doc).unwrap();

    let column = &json["nodes"][0]["children"][1]["children"][0];
    assert_eq!(column["kind"], "object");
    assert_eq!(column["properties"][0]["type"], "string");
    assert_eq!(column["properties"][0]["translatable"], true);

    let back: trellis_parser::ast::Document = serde_json::from_value(json).unwrap();
    assert_eq!(back, doc);
}

#[test]
fn test_span_ids_are_stable_per_path() {
    let first = parse_with_path(ORDER_FORM, "/forms/order.trellis").unwrap();
    let again = parse_with_path(ORDER_FORM, "/forms/order.trellis").unwrap();
    let other = parse_with_path(ORDER_FORM, "/forms/other.trellis").unwrap();

    assert_eq!(first.nodes[0].span.id, again.nodes[0].span.id);
    assert_ne!(first.nodes[0].span.id, other.nodes[0].span.id);
}

#[test]
fn test_pretty_error_names_the_file() {
    let source = "widget Form#f {\n    action: strng = \"/x\";\n}\n";
    let err = parse(source).unwrap_err();
    assert!(matches!(err, ParseError::InvalidSyntax { .. }));

    let rendered = format_error(source, "broken.trellis", &err);
    assert!(rendered.contains("broken.trellis"));
    assert!(rendered.contains("strng"));
}
