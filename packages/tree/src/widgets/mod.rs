//! The standard component library
//!
//! Abstract base types live here; concrete types are grouped by area.

mod controls;
mod table;

pub use controls::*;
pub use table::*;

use crate::component::{Capabilities, ComponentSpec, PropertySpec};
use crate::value::PropertyKind;

pub static UI_OBJECT: ComponentSpec = ComponentSpec {
    properties: &[
        PropertySpec::new("visible", PropertyKind::Boolean),
        PropertySpec::new("classes", PropertyKind::String),
    ],
    ..ComponentSpec::base("UIObject")
};

pub static WIDGET: ComponentSpec = ComponentSpec {
    parent: Some(&UI_OBJECT),
    capabilities: Capabilities::WIDGET,
    ..ComponentSpec::base("Widget")
};

pub static CONTROL: ComponentSpec = ComponentSpec {
    parent: Some(&WIDGET),
    ..ComponentSpec::base("Control")
};

pub static INPUT_CONTROL: ComponentSpec = ComponentSpec {
    parent: Some(&CONTROL),
    properties: &[PropertySpec::new("required", PropertyKind::Boolean)],
    ..ComponentSpec::base("InputControl")
};

pub static CONTAINER: ComponentSpec = ComponentSpec {
    parent: Some(&WIDGET),
    capabilities: Capabilities::PARENT,
    ..ComponentSpec::base("Container")
};

/// Every concrete type of the standard library
pub fn standard_library() -> Vec<&'static ComponentSpec> {
    vec![
        &CONTAINER,
        &FORM,
        &FRAME,
        &ENTRY,
        &INTEGER_ENTRY,
        &FLOAT_ENTRY,
        &CHECKBOX,
        &DATE_ENTRY,
        &TIME_ENTRY,
        &CALENDAR,
        &FLYDOWN,
        &FILE_ENTRY,
        &BUTTON,
        &CONTENT_BLOCK,
        &TABLE_VIEW,
        &TABLE_VIEW_COLUMN,
        &TEXT_CELL_RENDERER,
        &WIDGET_CELL_RENDERER,
        &INPUT_CELL,
        &TABLE_VIEW_INPUT_ROW,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_library_names_are_unique() {
        let library = standard_library();
        let names: HashSet<_> = library.iter().map(|spec| spec.name).collect();
        assert_eq!(names.len(), library.len());
    }

    #[test]
    fn test_every_type_is_a_ui_object() {
        for spec in standard_library() {
            assert!(spec.is_a("UIObject"), "{} is not a UIObject", spec.name);
        }
    }
}
