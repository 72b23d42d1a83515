use serde::{Deserialize, Serialize};

/// Which qualification field the classifier trusts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strictness {
    /// Read only the explicitly labeled required qualifications.
    Strict,
    /// Read the broader requirements bag, which may include preferred items.
    Lenient,
}

impl Strictness {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Lenient => "lenient",
        }
    }

    pub const fn is_strict(self) -> bool {
        matches!(self, Self::Strict)
    }
}

/// Field the qualification rules actually read for a given record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualificationSource {
    ExtraQualifications,
    Requirements,
    Missing,
}

impl QualificationSource {
    pub const fn label(self) -> &'static str {
        match self {
            Self::ExtraQualifications => "extra_qualifications",
            Self::Requirements => "requirements",
            Self::Missing => "missing",
        }
    }
}
