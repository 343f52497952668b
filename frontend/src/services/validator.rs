//! Decides whether a candidate file may be submitted.

use crate::config::{Accepted, DropAreaOptions, I18n};
use crate::types::{CandidateFile, ValidationError};

/// Outcome of checking a candidate against a widget's options.
#[derive(Clone, Debug, PartialEq)]
pub enum Admission {
    /// Passed every check; submit it.
    Submit,
    /// Refused; show the error and stop.
    Rejected(ValidationError),
    /// Upload disabled: send the user to the manual picker instead.
    RedirectToPicker,
}

impl Admission {
    /// What the widget does about this outcome.
    pub fn reaction(self, i18n: &I18n) -> Reaction {
        match self {
            Admission::Submit => Reaction::Submit,
            Admission::Rejected(e) => Reaction::Notify {
                message: e.message(i18n),
                autohide: true,
                open_picker: false,
            },
            // Stays on screen until dismissed or until a preview replaces it.
            Admission::RedirectToPicker => Reaction::Notify {
                message: ValidationError::UploadDisabled.message(i18n),
                autohide: false,
                open_picker: true,
            },
        }
    }
}

/// Widget response to an admission outcome.
#[derive(Clone, Debug, PartialEq)]
pub enum Reaction {
    Submit,
    Notify {
        message: String,
        autohide: bool,
        open_picker: bool,
    },
}

/// Extension of a file name, from the last `.` to the end, lowercased.
///
/// Names without a dot have no extension.
pub fn extension_of(name: &str) -> String {
    name.rfind('.')
        .map(|idx| name[idx..].to_lowercase())
        .unwrap_or_default()
}

/// Size in kilobytes.
pub fn size_kb(bytes: u64) -> f64 {
    bytes as f64 / 1024.0
}

/// Check the extension against the whitelist.
pub fn check_type(accepted: &Accepted, candidate: &CandidateFile) -> Result<(), ValidationError> {
    if accepted.allows(&extension_of(&candidate.name)) {
        Ok(())
    } else {
        Err(ValidationError::WrongType {
            accepted: accepted.configured(),
        })
    }
}

/// Check the size against the limit. A file of exactly the limit passes.
pub fn check_size(max_kb: f64, candidate: &CandidateFile) -> Result<(), ValidationError> {
    if size_kb(candidate.size) > max_kb {
        Err(ValidationError::WrongSize { max_kb })
    } else {
        Ok(())
    }
}

/// Run the admission rules in order: upload mode, type, size.
pub fn admit(options: &DropAreaOptions, candidate: &CandidateFile) -> Admission {
    if !options.upload {
        return Admission::RedirectToPicker;
    }

    let checked = check_type(&options.accepted, candidate)
        .and_then(|_| check_size(options.file_max_size, candidate));

    match checked {
        Ok(()) => Admission::Submit,
        Err(e) => {
            log::info!("Rejected '{}': {}", candidate.name, e);
            Admission::Rejected(e)
        }
    }
}
