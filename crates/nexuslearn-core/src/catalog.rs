//! Static subject and quiz catalog.
//!
//! The built-in catalog ships inside the crate as TOML. A replacement catalog
//! with the same shape can be loaded from disk and checked with
//! [`validate_catalog`].

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::error::CatalogError;
use crate::model::{Lesson, Question, Quiz, Subject, SubjectSlug};

const BUILTIN_CATALOG: &str = include_str!("../catalog/nexuslearn.toml");

/// Subjects and their quizzes, immutable after loading.
#[derive(Debug, Clone)]
pub struct Catalog {
    subjects: Vec<Subject>,
    quizzes: BTreeMap<SubjectSlug, Quiz>,
}

impl Catalog {
    /// The catalog bundled with the binary.
    pub fn builtin() -> Result<Self, CatalogError> {
        parse_catalog_str(BUILTIN_CATALOG)
    }

    /// Subjects in display order.
    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    pub fn subject(&self, slug: SubjectSlug) -> Option<&Subject> {
        self.subjects.iter().find(|s| s.slug == slug)
    }

    pub fn quiz(&self, slug: SubjectSlug) -> Option<&Quiz> {
        self.quizzes.get(&slug)
    }

    pub fn quizzes(&self) -> impl Iterator<Item = (SubjectSlug, &Quiz)> {
        self.quizzes.iter().map(|(slug, quiz)| (*slug, quiz))
    }
}

#[derive(Debug, Deserialize)]
struct TomlCatalog {
    #[serde(default)]
    subjects: Vec<TomlSubject>,
    #[serde(default)]
    quizzes: BTreeMap<String, TomlQuiz>,
}

#[derive(Debug, Deserialize)]
struct TomlSubject {
    slug: String,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    lessons: Vec<Lesson>,
}

#[derive(Debug, Deserialize)]
struct TomlQuiz {
    title: String,
    #[serde(default)]
    questions: Vec<Question>,
}

fn parse_slug(raw: &str) -> Result<SubjectSlug, CatalogError> {
    SubjectSlug::from_key(raw).ok_or_else(|| CatalogError::UnknownSubject(raw.to_string()))
}

/// Read and parse a catalog file.
pub fn parse_catalog(path: &Path) -> Result<Catalog> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read catalog file: {}", path.display()))?;

    parse_catalog_str(&content)
        .with_context(|| format!("invalid catalog: {}", path.display()))
}

/// Parse a catalog from a TOML string.
///
/// Fails on unknown subject slugs and on any question whose answer is not
/// one of its options. Softer problems are left to [`validate_catalog`].
pub fn parse_catalog_str(content: &str) -> Result<Catalog, CatalogError> {
    let parsed: TomlCatalog = toml::from_str(content)?;

    let subjects = parsed
        .subjects
        .into_iter()
        .map(|s| {
            Ok(Subject {
                slug: parse_slug(&s.slug)?,
                name: s.name,
                description: s.description,
                lessons: s.lessons,
            })
        })
        .collect::<Result<Vec<_>, CatalogError>>()?;

    let mut quizzes = BTreeMap::new();
    for (raw_slug, quiz) in parsed.quizzes {
        let slug = parse_slug(&raw_slug)?;
        for (index, question) in quiz.questions.iter().enumerate() {
            if !question.has_option(&question.answer) {
                return Err(CatalogError::DanglingAnswer {
                    subject: slug,
                    index,
                    answer: question.answer.clone(),
                });
            }
        }
        quizzes.insert(
            slug,
            Quiz {
                title: quiz.title,
                questions: quiz.questions,
            },
        );
    }

    Ok(Catalog { subjects, quizzes })
}

/// A warning from catalog validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The subject the warning concerns, if any.
    pub subject: Option<SubjectSlug>,
    pub message: String,
}

/// Check a catalog for problems that do not stop it from loading.
pub fn validate_catalog(catalog: &Catalog) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    let mut seen = HashSet::new();
    for subject in catalog.subjects() {
        if !seen.insert(subject.slug) {
            warnings.push(ValidationWarning {
                subject: Some(subject.slug),
                message: format!("duplicate subject: {}", subject.slug),
            });
        }
        if catalog.quiz(subject.slug).is_none() {
            warnings.push(ValidationWarning {
                subject: Some(subject.slug),
                message: "subject has no quiz".into(),
            });
        }
        if subject.lessons.is_empty() {
            warnings.push(ValidationWarning {
                subject: Some(subject.slug),
                message: "subject has no lessons".into(),
            });
        }
    }

    for (slug, quiz) in catalog.quizzes() {
        if catalog.subject(slug).is_none() {
            warnings.push(ValidationWarning {
                subject: Some(slug),
                message: "quiz has no matching subject".into(),
            });
        }
        if quiz.questions.is_empty() {
            warnings.push(ValidationWarning {
                subject: Some(slug),
                message: "quiz has no questions".into(),
            });
        }
        for (i, question) in quiz.questions.iter().enumerate() {
            if question.question.trim().is_empty() {
                warnings.push(ValidationWarning {
                    subject: Some(slug),
                    message: format!("question {} has empty text", i + 1),
                });
            }
            if question.options.len() < 2 {
                warnings.push(ValidationWarning {
                    subject: Some(slug),
                    message: format!("question {} has fewer than 2 options", i + 1),
                });
            }
            let mut options = HashSet::new();
            for option in &question.options {
                if !options.insert(option.as_str()) {
                    warnings.push(ValidationWarning {
                        subject: Some(slug),
                        message: format!("question {} repeats option {option:?}", i + 1),
                    });
                }
            }
        }
    }

    warnings
}
