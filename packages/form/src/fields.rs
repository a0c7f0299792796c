use crate::envelope::{sign_value, unsign_value};
use crate::error::{FormError, FormResult};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Signed hidden fields written while rendering a form
#[derive(Debug, Clone)]
pub struct HiddenFields {
    secret: String,
    fields: IndexMap<String, String>,
}

impl HiddenFields {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            fields: IndexMap::new(),
        }
    }

    /// Serialize, sign and store a value. A later write to the same name replaces it.
    pub fn add<T: Serialize + ?Sized>(&mut self, name: impl Into<String>, value: &T) -> FormResult<()> {
        let name = name.into();
        let envelope = sign_value(value, &self.secret)?;
        debug!(field = %name, "Persisting hidden field");
        self.fields.insert(name, envelope);
        Ok(())
    }

    /// The signed envelope as it will appear in the output
    pub fn raw(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// What the client sends back when it submits the rendered form unchanged
    pub fn into_submission(self) -> FormData {
        FormData {
            secret: self.secret,
            submitted: true,
            fields: self.fields.into_iter().collect(),
        }
    }
}

/// Request data of a (possibly) submitted form
#[derive(Debug, Clone)]
pub struct FormData {
    secret: String,
    submitted: bool,
    fields: HashMap<String, String>,
}

impl FormData {
    /// A first request: nothing was submitted
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            submitted: false,
            fields: HashMap::new(),
        }
    }

    /// A submitted request carrying raw, untrusted field values
    pub fn submitted<I, K, V>(secret: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            secret: secret.into(),
            submitted: true,
            fields: fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    /// Raw submitted value of a field
    pub fn raw(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn set_raw(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Verify and decode a hidden field written by [`HiddenFields::add`]
    ///
    /// Returns `Ok(None)` when the form was not submitted or the field is absent.
    pub fn hidden_field<T: DeserializeOwned>(&self, name: &str) -> FormResult<Option<T>> {
        if !self.submitted {
            return Ok(None);
        }

        let Some(envelope) = self.fields.get(name) else {
            return Ok(None);
        };

        unsign_value(envelope, &self.secret).map(Some).map_err(|e| {
            warn!(field = %name, error = %e, "Rejected hidden field");
            FormError::HiddenField {
                field: name.to_string(),
                source: Box::new(e),
            }
        })
    }
}
