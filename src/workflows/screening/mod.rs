//! Entry-level screening: an ordered chain of regex rules over a posting's title and
//! qualification text. The first rule that fires rejects the posting.

mod config;
mod policy;
mod rules;

pub use config::{QualificationSource, Strictness};
pub use policy::DisqualifyReason;

use crate::workflows::postings::JobRecord;
use policy::{first_disqualification, ScreeningInput};
use serde::{Deserialize, Serialize};

/// Outcome of screening one posting. Associated with a record by key, never stored
/// on the record itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationVerdict {
    pub is_entry_level: bool,
    /// Free text explanation, filled by the resume matcher when it runs.
    pub matched_reason: Option<String>,
    pub strictness: Strictness,
    pub qualification_source: QualificationSource,
    pub disqualification: Option<DisqualifyReason>,
}

impl ClassificationVerdict {
    pub fn summary(&self) -> String {
        match (&self.disqualification, &self.matched_reason) {
            (Some(reason), _) => reason.summary(),
            (None, Some(reason)) => format!("entry level: {reason}"),
            (None, None) => "entry level".to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClassifyError {
    #[error("posting is missing a required field: {field}")]
    InvalidInput { field: &'static str },
}

/// Stateless classifier; patterns are compiled once per process.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntryLevelClassifier;

impl EntryLevelClassifier {
    pub fn new() -> Self {
        Self
    }

    pub fn classify(
        &self,
        record: &JobRecord,
        strictness: Strictness,
    ) -> Result<ClassificationVerdict, ClassifyError> {
        if record.title.trim().is_empty() {
            return Err(ClassifyError::InvalidInput { field: "title" });
        }

        let (source, lines) = qualification_lines(record, strictness);
        let degree_policy = match source {
            QualificationSource::ExtraQualifications => Strictness::Strict,
            _ => Strictness::Lenient,
        };
        let text = lines.map(|lines| lines.join("\n").to_lowercase());

        let disqualification = first_disqualification(&ScreeningInput {
            title: &record.title,
            qualifications: text.as_deref(),
            degree_policy,
            requested: strictness,
        });

        Ok(ClassificationVerdict {
            is_entry_level: disqualification.is_none(),
            matched_reason: None,
            strictness,
            qualification_source: source,
            disqualification,
        })
    }
}

/// Picks the qualification field for the requested policy. Strict screening reads
/// `extra_qualifications` whenever the adapter populated it, even with no lines.
/// Several adapters never populate it at all (`None`), so strict screening then
/// falls back to `requirements` with the lenient degree rule.
fn qualification_lines(
    record: &JobRecord,
    strictness: Strictness,
) -> (QualificationSource, Option<&[String]>) {
    fn present(lines: &Option<Vec<String>>) -> Option<&[String]> {
        lines.as_deref().filter(|lines| !lines.is_empty())
    }

    if strictness.is_strict() {
        if let Some(lines) = record.extra_qualifications.as_deref() {
            let lines = (!lines.is_empty()).then_some(lines);
            return (QualificationSource::ExtraQualifications, lines);
        }
    }

    match present(&record.requirements) {
        Some(lines) => (QualificationSource::Requirements, Some(lines)),
        None => (QualificationSource::Missing, None),
    }
}
