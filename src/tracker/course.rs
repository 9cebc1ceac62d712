use std::collections::HashSet;

use futures_locks::RwLock;
use scraper::Html;

use crate::parse::{self, Assignment, CourseKey};

/// What a freshly extracted assignment list means for a course.
#[derive(Debug, PartialEq, Eq)]
pub enum Change {
    /// Nothing was stored for the course yet.
    First,
    /// More entries than stored; holds the ones with an unseen `(date, name)`.
    Grew(Vec<Assignment>),
    Unchanged,
}

/// One tracked course and the last assignment list seen for it.
#[derive(Debug)]
pub struct Course {
    key: CourseKey,
    name: Option<String>,
    /// `None` until a summary page of the course has been extracted.
    assignments: RwLock<Option<Vec<Assignment>>>,
}

impl Course {
    pub fn new(key: CourseKey) -> Self {
        Self {
            key,
            name: None,
            assignments: RwLock::new(None),
        }
    }

    pub const fn key(&self) -> CourseKey {
        self.key
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Name for messages; falls back to the course key while unresolved.
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("Course {}", self.key))
    }

    /// Takes the course name from its summary page. Best effort: on failure
    /// the name stays unset.
    pub fn resolve_name(&mut self, summary_page: &str) {
        let document = Html::parse_document(summary_page);
        match parse::course_name(&document, self.key) {
            Ok(name) => self.name = Some(name),
            Err(e) => log::warn!("Could not resolve the name of course {}: {e}", self.key),
        }
    }

    pub async fn is_populated(&self) -> bool {
        self.assignments.read().await.is_some()
    }

    #[cfg(test)]
    pub async fn assignment_count(&self) -> usize {
        self.assignments.read().await.as_ref().map_or(0, Vec::len)
    }

    #[cfg(test)]
    pub async fn assignments(&self) -> Vec<Assignment> {
        self.assignments.read().await.clone().unwrap_or_default()
    }

    /// Compares `fresh` with the stored list without storing it.
    ///
    /// Only a longer list counts as a change, so a grade change on a known
    /// assignment goes unnoticed.
    pub async fn changes(&self, fresh: &[Assignment]) -> Change {
        let guard = self.assignments.read().await;
        let Some(stored) = guard.as_ref() else {
            return Change::First;
        };
        if fresh.len() <= stored.len() {
            return Change::Unchanged;
        }
        let known: HashSet<(&str, &str)> = stored.iter().map(Assignment::key).collect();
        Change::Grew(
            fresh
                .iter()
                .filter(|assignment| !known.contains(&assignment.key()))
                .cloned()
                .collect(),
        )
    }

    /// Stores `fresh` if nothing is stored yet or it holds more entries than
    /// the stored list. The stored count never decreases.
    pub async fn commit(&self, fresh: Vec<Assignment>) {
        let mut guard = self.assignments.write().await;
        if guard.as_ref().map_or(true, |stored| fresh.len() > stored.len()) {
            *guard = Some(fresh);
        }
    }
}
