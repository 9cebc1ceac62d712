mod course;
mod poll_loop;

pub use course::{Change, Course};
pub use poll_loop::PollLoop;

use std::collections::HashSet;

use futures::StreamExt;
use scraper::Html;
use url::Url;

use crate::{
    error::Result,
    fetch::{Portal, SubPage},
    notify::{Notification, Notify},
    parse::{self, remove_excess_whitespace},
};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    /// Until every course has been populated once.
    Bootstrapping,
    Steady,
}

/// Everything the scraper knows about the student's courses.
#[derive(Debug)]
pub struct Tracker {
    courses: Vec<Course>,
    phase: Phase,
}

impl Tracker {
    pub const fn new(courses: Vec<Course>) -> Self {
        Self {
            courses,
            phase: Phase::Bootstrapping,
        }
    }

    /// Discovers the enrolled courses from the weekly summary and names each
    /// one from its own summary page. Courses are visited one at a time.
    pub async fn build(portal: &Portal, watched: &HashSet<String>) -> Result<Self> {
        let weekly = portal.fetch(SubPage::WeeklySummary).await?;
        let keys = parse::course_keys(&weekly);
        log::debug!("Weekly summary lists {} courses", keys.len());

        let courses: Vec<Course> = futures::stream::iter(keys)
            .then(|key| async move {
                let mut course = Course::new(key);
                match portal.fetch(SubPage::CourseSummary(key)).await {
                    Ok(page) => course.resolve_name(&page),
                    Err(e) => log::warn!("Could not fetch the summary of course {key}: {e}"),
                }
                course
            })
            .collect()
            .await;

        Ok(Self::new(only_watched(courses, watched)))
    }

    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    #[cfg(test)]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_bootstrapping(&self) -> bool {
        self.phase == Phase::Bootstrapping
    }

    /// Ends the startup phase once every course has been populated. Returns
    /// whether this call ended it.
    pub async fn finish_cycle(&mut self) -> bool {
        if !self.is_bootstrapping() {
            return false;
        }
        for course in &self.courses {
            if !course.is_populated().await {
                return false;
            }
        }
        self.phase = Phase::Steady;
        true
    }

    /// Applies a freshly fetched summary page to `course` and announces its
    /// new assignments through `notifier`. Returns whether anything was
    /// announced.
    ///
    /// The first list extracted for a course is stored silently. A grown
    /// list is stored only once the announcement went out, so a failed
    /// delivery is repeated on the next cycle.
    pub async fn ingest<N: Notify>(
        &self,
        course: &Course,
        summary_page: &str,
        summary_url: Url,
        notifier: &N,
    ) -> Result<bool> {
        let fresh = {
            let document = Html::parse_document(summary_page);
            parse::assignments(&document)?
        };
        let announced = match course.changes(&fresh).await {
            Change::Unchanged => return Ok(false),
            Change::First => {
                log::debug!(
                    "Recorded {} assignments for {}",
                    fresh.len(),
                    course.display_name()
                );
                false
            }
            Change::Grew(delta) if delta.is_empty() => false,
            Change::Grew(delta) => {
                log::info!(
                    "{} received updates with {} new assignments!",
                    course.display_name(),
                    delta.len()
                );
                let notification = Notification::new(course.display_name(), summary_url, &delta);
                notifier.notify(&notification).await?;
                true
            }
        };
        course.commit(fresh).await;
        Ok(announced)
    }
}

/// Keeps the courses named in `watched`; an empty set keeps them all.
fn only_watched(courses: Vec<Course>, watched: &HashSet<String>) -> Vec<Course> {
    if watched.is_empty() {
        return courses;
    }
    let watched: HashSet<String> = watched
        .iter()
        .map(|name| remove_excess_whitespace(name).into_owned())
        .collect();
    courses
        .into_iter()
        .filter(|course| {
            let keep = course.name().is_some_and(|name| watched.contains(name));
            if !keep {
                log::info!("Not tracking {}", course.display_name());
            }
            keep
        })
        .collect()
}
