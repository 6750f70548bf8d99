use std::collections::BTreeMap;

use serde_json::Value;

use super::rules::Rule;
use crate::error::ApiError;

/// Rules for one form field. Dotted names (`endereco.cep`) address nested objects.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: &'static str,
    pub rules: Vec<Rule>,
}

/// Field table for one form.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: Vec<FieldSpec>,
}

impl Schema {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn field(mut self, name: &'static str, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.fields.push(FieldSpec {
            name,
            rules: rules.into_iter().collect(),
        });
        self
    }

    #[must_use]
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Validate a form payload. Each field reports its first failing rule.
    ///
    /// # Errors
    ///
    /// Returns every failing field with its message.
    pub fn validate(&self, record: &Value) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        for field in &self.fields {
            let value = lookup(record, field.name).unwrap_or(&Value::Null);
            if let Some(message) = field.rules.iter().find_map(|rule| rule.check(value).err()) {
                errors.0.insert(field.name.to_owned(), message.into_owned());
            }
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

fn lookup<'a>(record: &'a Value, name: &str) -> Option<&'a Value> {
    name.split('.').try_fold(record, |value, key| value.get(key))
}

/// Field → message map, the same shape as the server's 422 `errors` payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, thiserror::Error)]
#[error("validation failed: {} field(s)", .0.len())]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn into_map(self) -> BTreeMap<String, String> {
        self.0
    }
}

/// Server-side field errors (first message per field), so forms display
/// client and server validation the same way.
impl From<&ApiError> for ValidationErrors {
    fn from(error: &ApiError) -> Self {
        Self(
            error
                .field_errors
                .iter()
                .filter_map(|(field, messages)| Some((field.clone(), messages.first()?.clone())))
                .collect(),
        )
    }
}
