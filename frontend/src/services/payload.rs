//! Multipart payload assembly.
//!
//! The file travels under the picker's id; every configured extra field
//! that exists in the page travels with its current value.

use std::collections::HashMap;

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{File, FormData, HtmlInputElement, HtmlSelectElement, HtmlTextAreaElement};

use crate::config::{element_id, DropAreaOptions};

/// Looks up the current value of a form element by id.
pub trait FieldLookup {
    /// `None` when no element has this id.
    fn value_of(&self, id: &str) -> Option<String>;
}

impl FieldLookup for HashMap<String, String> {
    fn value_of(&self, id: &str) -> Option<String> {
        self.get(id).cloned()
    }
}

/// Reads form elements from the live document.
pub struct DocumentFields;

impl FieldLookup for DocumentFields {
    fn value_of(&self, id: &str) -> Option<String> {
        let element = gloo_utils::document().get_element_by_id(id)?;

        let value = if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
            input.value()
        } else if let Some(select) = element.dyn_ref::<HtmlSelectElement>() {
            select.value()
        } else if let Some(area) = element.dyn_ref::<HtmlTextAreaElement>() {
            area.value()
        } else {
            element.get_attribute("value").unwrap_or_default()
        };

        Some(value)
    }
}

/// Everything sent alongside the file.
#[derive(Clone, Debug, PartialEq)]
pub struct UploadPayload {
    /// Multipart name of the file part
    pub file_field: String,
    /// Extra `(name, value)` pairs, in configuration order
    pub fields: Vec<(String, String)>,
}

impl UploadPayload {
    /// Collect the payload at submission time. Unknown extra ids are skipped.
    pub fn build(options: &DropAreaOptions, lookup: &impl FieldLookup) -> Self {
        let fields = options
            .extra
            .iter()
            .map(|raw| element_id(raw))
            .filter(|id| !id.is_empty())
            .filter_map(|id| match lookup.value_of(id) {
                Some(value) => Some((id.to_string(), value)),
                None => {
                    log::debug!("Extra field '{}' not found, skipped", id);
                    None
                }
            })
            .collect();

        Self {
            file_field: options.file_holder_id().to_string(),
            fields,
        }
    }

    pub fn to_form_data(&self, file: &File) -> Result<FormData, JsValue> {
        let form_data = FormData::new()?;
        form_data.append_with_blob_and_filename(&self.file_field, file, &file.name())?;

        for (name, value) in &self.fields {
            form_data.append_with_str(name, value)?;
        }

        Ok(form_data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_file_field_from_holder() {
        let options = DropAreaOptions {
            file_holder: "#avatar".to_string(),
            ..Default::default()
        };
        let payload = UploadPayload::build(&options, &lookup(&[]));
        assert_eq!(payload.file_field, "avatar");
        assert!(payload.fields.is_empty());
    }

    #[test]
    fn test_missing_extra_fields_are_skipped() {
        let options = DropAreaOptions {
            extra: vec!["#user_id".into(), "ghost".into(), "token".into()],
            ..Default::default()
        };
        let payload = UploadPayload::build(&options, &lookup(&[("user_id", "42"), ("token", "abc")]));
        assert_eq!(
            payload.fields,
            vec![
                ("user_id".to_string(), "42".to_string()),
                ("token".to_string(), "abc".to_string()),
            ]
        );
    }

    #[test]
    fn test_empty_values_are_kept() {
        let options = DropAreaOptions {
            extra: vec!["comment".into(), "#".into()],
            ..Default::default()
        };
        let payload = UploadPayload::build(&options, &lookup(&[("comment", "")]));
        assert_eq!(payload.fields, vec![("comment".to_string(), String::new())]);
    }
}
