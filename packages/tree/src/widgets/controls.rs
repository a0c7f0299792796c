use super::{CONTAINER, CONTROL, INPUT_CONTROL};
use crate::component::{Capabilities, ComponentSpec, PropertySpec};
use crate::descendants::TypeFilter;
use crate::error::TreeResult;
use crate::node::Node;
use crate::value::{PropertyKind, PropertyValue};
use chrono::Datelike;
use tracing::{debug, warn};

const MULTIPART: &str = "multipart/form-data";

pub static FORM: ComponentSpec = ComponentSpec {
    parent: Some(&CONTAINER),
    capabilities: Capabilities::AUTO_ID,
    properties: &[
        PropertySpec::new("action", PropertyKind::String),
        PropertySpec::new("method", PropertyKind::String),
        PropertySpec::new("encoding_type", PropertyKind::String),
        PropertySpec::new("autocomplete", PropertyKind::Boolean),
    ],
    descendant_added: Some(form_descendant_added),
    ..ComponentSpec::base("Form")
};

fn form_descendant_added(form: &Node, added: &Node) {
    let uploads = TypeFilter::Capability(Capabilities::FILE_UPLOAD);
    if !uploads.matches(added) && added.get_first_descendant(&uploads).is_none() {
        return;
    }
    if form.string_property("encoding_type").as_deref() == Some(MULTIPART) {
        return;
    }

    debug!(form = %form.describe(), upload = %added.describe(), "Switching form to multipart encoding");
    if let Err(e) = form.set_property("encoding_type", PropertyValue::String(MULTIPART.to_string())) {
        warn!(form = %form.describe(), error = %e, "Could not switch form encoding");
    }
}

pub static FRAME: ComponentSpec = ComponentSpec {
    parent: Some(&CONTAINER),
    properties: &[
        PropertySpec::new("title", PropertyKind::String),
        PropertySpec::new("subtitle", PropertyKind::String),
        PropertySpec::new("header_level", PropertyKind::Integer),
    ],
    ..ComponentSpec::base("Frame")
};

pub static ENTRY: ComponentSpec = ComponentSpec {
    parent: Some(&INPUT_CONTROL),
    capabilities: Capabilities::STATEFUL,
    state_property: Some("value"),
    properties: &[
        PropertySpec::new("value", PropertyKind::String),
        PropertySpec::new("size", PropertyKind::Integer),
        PropertySpec::new("maxlength", PropertyKind::Integer),
        PropertySpec::new("minlength", PropertyKind::Integer),
        PropertySpec::new("read_only", PropertyKind::Boolean),
    ],
    ..ComponentSpec::base("Entry")
};

pub static INTEGER_ENTRY: ComponentSpec = ComponentSpec {
    parent: Some(&ENTRY),
    properties: &[
        PropertySpec::new("value", PropertyKind::Integer),
        PropertySpec::new("minimum_value", PropertyKind::Integer),
        PropertySpec::new("maximum_value", PropertyKind::Integer),
    ],
    ..ComponentSpec::base("IntegerEntry")
};

pub static FLOAT_ENTRY: ComponentSpec = ComponentSpec {
    parent: Some(&ENTRY),
    properties: &[
        PropertySpec::new("value", PropertyKind::Float),
        PropertySpec::new("minimum_value", PropertyKind::Float),
        PropertySpec::new("maximum_value", PropertyKind::Float),
    ],
    ..ComponentSpec::base("FloatEntry")
};

pub static CHECKBOX: ComponentSpec = ComponentSpec {
    parent: Some(&INPUT_CONTROL),
    capabilities: Capabilities::STATEFUL,
    state_property: Some("value"),
    properties: &[PropertySpec::new("value", PropertyKind::Boolean)],
    ..ComponentSpec::base("Checkbox")
};

pub static FLYDOWN: ComponentSpec = ComponentSpec {
    parent: Some(&INPUT_CONTROL),
    capabilities: Capabilities::STATEFUL,
    state_property: Some("value"),
    properties: &[
        PropertySpec::new("value", PropertyKind::String),
        PropertySpec::indexed("options", PropertyKind::String),
        PropertySpec::new("show_blank", PropertyKind::Boolean),
    ],
    ..ComponentSpec::base("Flydown")
};

pub static TIME_ENTRY: ComponentSpec = ComponentSpec {
    parent: Some(&INPUT_CONTROL),
    capabilities: Capabilities::STATEFUL,
    state_property: Some("value"),
    properties: &[PropertySpec::new("value", PropertyKind::Date)],
    ..ComponentSpec::base("TimeEntry")
};

pub static CALENDAR: ComponentSpec = ComponentSpec {
    parent: Some(&CONTROL),
    properties: &[
        PropertySpec::new("valid_range_start", PropertyKind::Date),
        PropertySpec::new("valid_range_end", PropertyKind::Date),
    ],
    ..ComponentSpec::base("Calendar")
};

pub const DATE_YEAR: i64 = 1;
pub const DATE_MONTH: i64 = 2;
pub const DATE_DAY: i64 = 4;
pub const DATE_TIME: i64 = 8;
pub const DATE_CALENDAR: i64 = 16;

pub static DATE_ENTRY: ComponentSpec = ComponentSpec {
    parent: Some(&INPUT_CONTROL),
    capabilities: Capabilities::STATEFUL,
    state_property: Some("value"),
    properties: &[
        PropertySpec::new("value", PropertyKind::Date),
        PropertySpec::new("display_parts", PropertyKind::Integer),
        PropertySpec::new("valid_range_start", PropertyKind::Date),
        PropertySpec::new("valid_range_end", PropertyKind::Date),
    ],
    constants: &[
        ("YEAR", DATE_YEAR),
        ("MONTH", DATE_MONTH),
        ("DAY", DATE_DAY),
        ("TIME", DATE_TIME),
        ("CALENDAR", DATE_CALENDAR),
    ],
    create_composites: Some(date_entry_composites),
    ..ComponentSpec::base("DateEntry")
};

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

fn date_entry_composites(host: &Node) -> TreeResult<Vec<(String, Node)>> {
    let parts = host
        .integer_property("display_parts")
        .unwrap_or(DATE_YEAR | DATE_MONTH | DATE_DAY);
    let composite = |key: &str, spec: &'static ComponentSpec| match host.id() {
        Some(id) => Node::with_id(spec, format!("{}_{}", id, key)),
        None => Node::new(spec),
    };
    let mut composites = Vec::new();

    if parts & DATE_YEAR != 0 {
        let year = composite("year", &FLYDOWN);
        let start = host.property("valid_range_start").and_then(|v| match v {
            PropertyValue::Date(d) => Some(d.year()),
            _ => None,
        });
        let end = host.property("valid_range_end").and_then(|v| match v {
            PropertyValue::Date(d) => Some(d.year()),
            _ => None,
        });
        if let (Some(start), Some(end)) = (start, end) {
            for y in start..=end {
                year.set_indexed_property("options", &y.to_string(), PropertyValue::String(y.to_string()))?;
            }
        }
        composites.push(("year".to_string(), year));
    }

    if parts & DATE_MONTH != 0 {
        let month = composite("month", &FLYDOWN);
        for (index, name) in MONTHS.iter().enumerate() {
            month.set_indexed_property("options", &(index + 1).to_string(), PropertyValue::String(name.to_string()))?;
        }
        composites.push(("month".to_string(), month));
    }

    if parts & DATE_DAY != 0 {
        let day = composite("day", &FLYDOWN);
        for d in 1..=31 {
            day.set_indexed_property("options", &d.to_string(), PropertyValue::String(d.to_string()))?;
        }
        composites.push(("day".to_string(), day));
    }

    if parts & DATE_TIME != 0 {
        composites.push(("time".to_string(), composite("time", &TIME_ENTRY)));
    }

    if parts & DATE_CALENDAR != 0 {
        let calendar = composite("calendar", &CALENDAR);
        for bound in ["valid_range_start", "valid_range_end"] {
            if let Some(value) = host.property(bound) {
                calendar.set_property(bound, value)?;
            }
        }
        composites.push(("calendar".to_string(), calendar));
    }

    Ok(composites)
}

pub static FILE_ENTRY: ComponentSpec = ComponentSpec {
    parent: Some(&INPUT_CONTROL),
    capabilities: Capabilities::FILE_UPLOAD,
    properties: &[PropertySpec::new("accept_mime_types", PropertyKind::String)],
    ..ComponentSpec::base("FileEntry")
};

pub static BUTTON: ComponentSpec = ComponentSpec {
    parent: Some(&CONTROL),
    properties: &[
        PropertySpec::new("title", PropertyKind::String),
        PropertySpec::new("stock_id", PropertyKind::String),
    ],
    ..ComponentSpec::base("Button")
};

pub static CONTENT_BLOCK: ComponentSpec = ComponentSpec {
    parent: Some(&CONTROL),
    properties: &[
        PropertySpec::new("content", PropertyKind::String),
        PropertySpec::new("content_type", PropertyKind::String),
    ],
    ..ComponentSpec::base("ContentBlock")
};
