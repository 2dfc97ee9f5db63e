//! Core data model types for nexuslearn.
//!
//! Subjects, lessons, quizzes and questions. All of these are immutable once
//! loaded from the catalog.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The three subjects NexusLearn covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubjectSlug {
    Physics,
    Chemistry,
    Math,
}

impl SubjectSlug {
    /// All slugs in dashboard order.
    pub const ALL: [SubjectSlug; 3] = [
        SubjectSlug::Physics,
        SubjectSlug::Chemistry,
        SubjectSlug::Math,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SubjectSlug::Physics => "physics",
            SubjectSlug::Chemistry => "chemistry",
            SubjectSlug::Math => "math",
        }
    }

    /// Exact match on the canonical key, as written in catalog and score files.
    ///
    /// Unlike [`FromStr`], no trimming, case folding or aliases.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|slug| slug.as_str() == key)
    }
}

impl fmt::Display for SubjectSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubjectSlug {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "physics" => Ok(SubjectSlug::Physics),
            "chemistry" | "chem" => Ok(SubjectSlug::Chemistry),
            "math" | "maths" | "mathematics" => Ok(SubjectSlug::Math),
            other => Err(format!("unknown subject: {other}")),
        }
    }
}

/// A static lesson shown on a subject page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    pub title: String,
    pub content: String,
}

/// A subject with its ordered lessons.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    pub slug: SubjectSlug,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
}

/// A multiple-choice question.
///
/// `answer` must be one of `options`; the catalog loader and the explanation
/// contract both reject questions that break this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub question: String,
    pub options: Vec<String>,
    pub answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl Question {
    /// Whether `option` is exactly the canonical answer. No normalization.
    pub fn is_correct(&self, option: &str) -> bool {
        self.answer == option
    }

    /// Whether `option` is one of this question's options.
    pub fn has_option(&self, option: &str) -> bool {
        self.options.iter().any(|o| o == option)
    }
}

/// A subject's quiz.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quiz {
    pub title: String,
    #[serde(default)]
    pub questions: Vec<Question>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_display_and_parse() {
        assert_eq!(SubjectSlug::Physics.to_string(), "physics");
        assert_eq!("Chemistry".parse::<SubjectSlug>().unwrap(), SubjectSlug::Chemistry);
        assert_eq!("maths".parse::<SubjectSlug>().unwrap(), SubjectSlug::Math);
        assert!("biology".parse::<SubjectSlug>().is_err());
    }

    #[test]
    fn slug_key_is_exact() {
        assert_eq!(SubjectSlug::from_key("math"), Some(SubjectSlug::Math));
        assert_eq!(SubjectSlug::from_key("maths"), None);
        assert_eq!(SubjectSlug::from_key("Physics"), None);
        assert_eq!(SubjectSlug::from_key(" chemistry"), None);
    }

    #[test]
    fn slug_serde_is_lowercase() {
        let json = serde_json::to_string(&SubjectSlug::Math).unwrap();
        assert_eq!(json, "\"math\"");
    }

    #[test]
    fn correctness_is_exact_match() {
        let q = Question {
            question: "What is the SI unit of force?".into(),
            options: vec!["Joule".into(), "Newton".into()],
            answer: "Newton".into(),
            explanation: None,
        };
        assert!(q.is_correct("Newton"));
        assert!(!q.is_correct("newton"));
        assert!(!q.is_correct("Newton "));
        assert!(q.has_option("Joule"));
        assert!(!q.has_option("Watt"));
    }
}
