//! User input collection and readiness checks
//!
//! Tracks the selected file and any required free-text fields for one
//! task type. The file is tracked by name only; the byte payload stays
//! on the JS side until submission. No network access here.

use crate::error::FlowError;

#[derive(Debug, Clone, PartialEq, Eq)]
struct TextField {
    label: String,
    value: String,
}

/// Collects the inputs for one task type: a single file constrained to
/// one extension, plus zero or more required text fields.
#[derive(Debug, Clone)]
pub struct InputCollector {
    accept_extension: String,
    file_name: Option<String>,
    fields: Vec<TextField>,
}

impl InputCollector {
    /// `accept_extension` includes the dot, e.g. `".csv"`.
    pub fn new(accept_extension: &str) -> Self {
        Self {
            accept_extension: accept_extension.to_lowercase(),
            file_name: None,
            fields: Vec::new(),
        }
    }

    /// Add a required non-empty text field.
    pub fn require_field(mut self, label: &str) -> Self {
        self.fields.push(TextField {
            label: label.to_string(),
            value: String::new(),
        });
        self
    }

    /// Record the selected file. Rejects names that do not match the
    /// accepted extension (case-insensitive).
    pub fn set_file(&mut self, name: &str) -> Result<(), FlowError> {
        if !name.to_lowercase().ends_with(&self.accept_extension) {
            return Err(FlowError::Validation(format!(
                "File must be a {} file",
                self.extension_label()
            )));
        }
        self.file_name = Some(name.to_string());
        Ok(())
    }

    pub fn clear_file(&mut self) {
        self.file_name = None;
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    /// Set the value of a required field. Unknown labels are rejected.
    pub fn set_field(&mut self, label: &str, value: &str) -> Result<(), FlowError> {
        match self.fields.iter_mut().find(|f| f.label == label) {
            Some(field) => {
                field.value = value.to_string();
                Ok(())
            }
            None => Err(FlowError::Validation(format!("Unknown field: {}", label))),
        }
    }

    pub fn field(&self, label: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.label == label)
            .map(|f| f.value.as_str())
    }

    /// True only when a file is selected and every required field is
    /// non-empty.
    pub fn is_ready(&self) -> bool {
        self.first_missing().is_none()
    }

    /// Readiness as a result, suitable for handing straight to
    /// [`crate::TaskController::begin_submit`].
    pub fn check_ready(&self) -> Result<(), FlowError> {
        match self.first_missing() {
            None => Ok(()),
            Some(msg) => Err(FlowError::Validation(msg)),
        }
    }

    fn first_missing(&self) -> Option<String> {
        if self.file_name.is_none() {
            return Some(format!("Please upload a {} file", self.extension_label()));
        }
        self.fields
            .iter()
            .find(|f| f.value.trim().is_empty())
            .map(|f| format!("Please fill in the {} field", f.label))
    }

    fn extension_label(&self) -> String {
        self.accept_extension
            .trim_start_matches('.')
            .to_uppercase()
    }
}
