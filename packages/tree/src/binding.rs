//! Data bindings
//!
//! A `data` property in a document does not hold a literal. It records a
//! [`PropertyBinding`] on the node: "fill `property` from the record field
//! `field`". Bindings are applied per record, usually to a fresh clone.

use crate::error::{TreeError, TreeResult};
use crate::node::Node;
use crate::value::PropertyValue;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyBinding {
    pub property: String,
    /// Entry of an indexed property
    pub key: Option<String>,
    pub field: String,
}

impl PropertyBinding {
    pub fn new(property: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            key: None,
            field: field.into(),
        }
    }

    pub fn indexed(property: impl Into<String>, key: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            key: Some(key.into()),
            field: field.into(),
        }
    }
}

/// A row of data bound properties are read from
pub trait Record {
    fn field(&self, name: &str) -> Option<PropertyValue>;
}

impl Record for serde_json::Value {
    fn field(&self, name: &str) -> Option<PropertyValue> {
        self.get(name).and_then(PropertyValue::from_json)
    }
}

impl Record for HashMap<String, PropertyValue> {
    fn field(&self, name: &str) -> Option<PropertyValue> {
        self.get(name).cloned()
    }
}

impl Record for IndexMap<String, PropertyValue> {
    fn field(&self, name: &str) -> Option<PropertyValue> {
        self.get(name).cloned()
    }
}

impl Node {
    /// Record a binding. The property must exist on this node's type.
    pub fn bind(&self, binding: PropertyBinding) -> TreeResult<()> {
        let spec = self.property_spec(&binding.property)?;
        match (&binding.key, spec.indexed) {
            (Some(_), false) => {
                return Err(TreeError::NotIndexed {
                    type_name: self.type_name().to_string(),
                    property: binding.property,
                })
            }
            (None, true) => {
                return Err(TreeError::KeyRequired {
                    type_name: self.type_name().to_string(),
                    property: binding.property,
                })
            }
            _ => {}
        }
        self.0.bindings.borrow_mut().push(binding);
        Ok(())
    }

    pub fn bindings(&self) -> Vec<PropertyBinding> {
        self.0.bindings.borrow().clone()
    }

    /// Fill every bound property of this node and its children from `record`
    pub fn apply_bindings(&self, record: &dyn Record) -> TreeResult<()> {
        for binding in self.bindings() {
            let raw = record.field(&binding.field).ok_or_else(|| TreeError::MissingRecordField {
                node: self.describe(),
                property: binding.property.clone(),
                field: binding.field.clone(),
            })?;

            let spec = self.property_spec(&binding.property)?;
            let found = raw.kind_name();
            let value = raw.coerce(spec.kind).ok_or_else(|| TreeError::PropertyTypeMismatch {
                type_name: self.type_name().to_string(),
                property: binding.property.clone(),
                expected: spec.kind,
                found: found.to_string(),
            })?;

            match &binding.key {
                Some(key) => self.set_indexed_property(&binding.property, key, value)?,
                None => self.set_property(&binding.property, value)?,
            }
        }

        for child in self.children() {
            child.apply_bindings(record)?;
        }
        Ok(())
    }
}
