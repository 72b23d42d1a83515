use std::sync::OnceLock;

use regex::Regex;

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("screening pattern compiles")
}

/// Graduate credentials spelled the way postings put them in titles. Case matters
/// here: a bare "MS" is left alone because it collides with Microsoft and with
/// sentence endings.
pub(crate) fn title_mentions_graduate_degree(title: &str) -> bool {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            compile(r"M\.S\.?|Ph\.?\s?D\.?|[Mm]aster(?:'|’|\\u0027)?s\b|[Dd]octorate")
        })
        .is_match(title)
}

/// "3+ years", "5 yrs", "2-4 years", "three years", including `&#43;`/`&nbsp;`
/// artifacts left behind by HTML scraping. Expects lowercased text.
pub(crate) fn mentions_years_of_experience(text: &str) -> bool {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            compile(concat!(
                r"\b\d+\s*(?:\+|&#43;|-|–)?\s*(?:&nbsp;|\s)*(?:years?|yrs?)\b",
                r"|\b(?:one|two|three|four|five|six|seven|eight|nine|ten)\s*(?:\+|&#43;)?\s*(?:&nbsp;|\s)*(?:years?|yrs?)\b",
            ))
        })
        .is_match(text)
}

/// Graduate credentials inside qualification text. Expects lowercased text.
pub(crate) fn mentions_graduate_degree(text: &str) -> bool {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            compile(r"\bm\.s\.|\bph\.?\s?d\b|\bmaster(?:'|’|\\u0027)?s\b|\bdoctorate\b")
        })
        .is_match(text)
}

/// Bachelor credentials inside qualification text. Expects lowercased text.
pub(crate) fn mentions_bachelor_degree(text: &str) -> bool {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN
        .get_or_init(|| compile(r"\b(?:ba|bs)\b|\bb\.[as]\.|\bbachelor"))
        .is_match(text)
}

pub(crate) fn title_is_research_role(title: &str) -> bool {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN
        .get_or_init(|| compile(r"(?i)\bresearch(?:er|ers)?\b|\bscientists?\b"))
        .is_match(title)
}

/// Seniority words match anywhere in the title, so "TechLead", "SrSoftware" and
/// "Managerial" count. Only the longer suffix words need a word boundary.
pub(crate) fn title_is_leadership_role(title: &str) -> bool {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            compile(concat!(
                r"(?i)senior|sr|manager|lead|mngr",
                r"|\b(?:management|mgr|directors?)\b",
                r"|\bhead\s+of\b",
            ))
        })
        .is_match(title)
}
