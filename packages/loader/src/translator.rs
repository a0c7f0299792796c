use std::collections::HashMap;

/// Translation hook for `translatable` string properties
pub trait Translator {
    fn translate(&self, text: &str) -> String;
}

/// Leaves every string as written
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityTranslator;

impl Translator for IdentityTranslator {
    fn translate(&self, text: &str) -> String {
        text.to_string()
    }
}

/// Looks strings up in a message catalog, falling back to the source text
#[derive(Debug, Default, Clone)]
pub struct CatalogTranslator {
    messages: HashMap<String, String>,
}

impl CatalogTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, source: impl Into<String>, translation: impl Into<String>) -> Self {
        self.messages.insert(source.into(), translation.into());
        self
    }
}

impl Translator for CatalogTranslator {
    fn translate(&self, text: &str) -> String {
        self.messages
            .get(text)
            .cloned()
            .unwrap_or_else(|| text.to_string())
    }
}
