//! Structured analysis results and artifact naming policy

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One structured finding returned by the analysis service.
///
/// Wire field names follow the service contract (`name`, `count`,
/// `average`, `text`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(rename = "name")]
    pub subject: String,
    pub count: u64,
    pub average: f64,
    #[serde(rename = "text")]
    pub narrative: String,
}

impl AnalysisResult {
    /// Narrative split on line breaks for rendering. Display-only; the
    /// narrative is never re-parsed.
    pub fn narrative_paragraphs(&self) -> Vec<&str> {
        self.narrative.split('\n').collect()
    }
}

/// Per-task-type policy for naming the downloadable artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactNaming {
    /// `<prefix>_<YYYY-MM-DD>.<extension>`
    DateStamped { prefix: String, extension: String },
    /// Always the same name.
    Fixed(String),
}

impl ArtifactNaming {
    pub fn date_stamped(prefix: &str, extension: &str) -> Self {
        ArtifactNaming::DateStamped {
            prefix: prefix.to_string(),
            extension: extension.to_string(),
        }
    }

    pub fn fixed(name: &str) -> Self {
        ArtifactNaming::Fixed(name.to_string())
    }

    /// Suggested filename for an artifact produced on `date`.
    pub fn filename(&self, date: NaiveDate) -> String {
        match self {
            ArtifactNaming::DateStamped { prefix, extension } => {
                format!("{}_{}.{}", prefix, date.format("%Y-%m-%d"), extension)
            }
            ArtifactNaming::Fixed(name) => name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 9).unwrap()
    }

    #[test]
    fn test_result_deserializes_wire_names() {
        let json = r#"{"name":"X","count":12,"average":30.2,"text":"para1\npara2"}"#;
        let result: AnalysisResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.subject, "X");
        assert_eq!(result.count, 12);
        assert_eq!(result.average, 30.2);
    }

    #[test]
    fn test_narrative_paragraphs_preserved() {
        let result = AnalysisResult {
            subject: "X".to_string(),
            count: 1,
            average: 0.0,
            narrative: "para1\npara2\npara3".to_string(),
        };
        assert_eq!(result.narrative_paragraphs(), vec!["para1", "para2", "para3"]);
    }

    #[test]
    fn test_single_paragraph_narrative() {
        let result = AnalysisResult {
            subject: "X".to_string(),
            count: 1,
            average: 0.0,
            narrative: "just one".to_string(),
        };
        assert_eq!(result.narrative_paragraphs(), vec!["just one"]);
    }

    #[test]
    fn test_date_stamped_filename() {
        let naming = ArtifactNaming::date_stamped("analysis_report", "txt");
        assert_eq!(naming.filename(sample_date()), "analysis_report_2025-03-09.txt");
    }

    #[test]
    fn test_fixed_filename_ignores_date() {
        let naming = ArtifactNaming::fixed("processed_document.pdf");
        assert_eq!(naming.filename(sample_date()), "processed_document.pdf");
    }
}
