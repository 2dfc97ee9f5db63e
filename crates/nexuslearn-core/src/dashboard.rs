//! Progress dashboard rows built from stored scores.

use crate::catalog::Catalog;
use crate::model::SubjectSlug;
use crate::scores::{ScoreStore, Scores};

/// Scores shown before any quiz has been taken.
pub const DEMO_SCORES: [(SubjectSlug, u8); 3] = [
    (SubjectSlug::Physics, 70),
    (SubjectSlug::Chemistry, 50),
    (SubjectSlug::Math, 90),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardRow {
    pub slug: SubjectSlug,
    pub name: String,
    pub score: u8,
}

#[derive(Debug, Clone)]
pub struct Dashboard {
    pub rows: Vec<DashboardRow>,
    /// True when no score record exists and the demo scores are displayed.
    pub is_demo: bool,
}

impl Dashboard {
    /// Rows for whatever `store` holds.
    ///
    /// Any existing record, even one with no known subject in it, turns the
    /// demo scores off.
    pub fn from_store(catalog: &Catalog, store: &dyn ScoreStore) -> Self {
        Self::build(catalog, &store.load(), !store.has_record())
    }

    /// Rows for an already loaded score map; an empty map shows the demo scores.
    pub fn from_scores(catalog: &Catalog, scores: &Scores) -> Self {
        Self::build(catalog, scores, scores.is_empty())
    }

    /// One row per catalog subject, in catalog order. Outside demo mode a
    /// subject without a stored score shows 0.
    fn build(catalog: &Catalog, scores: &Scores, is_demo: bool) -> Self {
        let rows = catalog
            .subjects()
            .iter()
            .map(|subject| {
                let score = if is_demo {
                    DEMO_SCORES
                        .iter()
                        .find(|(slug, _)| *slug == subject.slug)
                        .map(|(_, s)| *s)
                        .unwrap_or(0)
                } else {
                    scores.get(&subject.slug).copied().unwrap_or(0)
                };
                DashboardRow {
                    slug: subject.slug,
                    name: subject.name.clone(),
                    score,
                }
            })
            .collect();

        Self { rows, is_demo }
    }

    /// e.g. "Physics: 70%, Chemistry: 50%, Math: 90%"
    pub fn performance_summary(&self) -> String {
        self.rows
            .iter()
            .map(|row| format!("{}: {}%", row.name, row.score))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
