use std::{collections::HashSet, future::Future, time::Duration};

use chrono::{DateTime, Utc};
use tokio::time::{sleep, timeout};

use super::{Course, Tracker};
use crate::{
    error::Result,
    fetch::{Portal, SubPage},
    notify::Notify,
};

pub const POLL_INTERVAL: Duration = Duration::from_secs(60);
/// Upper bound on one pass over every course.
pub const CYCLE_DEADLINE: Duration = Duration::from_secs(5 * 60);

/// Outcome of one pass over the tracked courses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CycleReport {
    pub polled: usize,
    pub failed: usize,
    pub notified: usize,
}

/// Logs in, builds the course index, then polls every course forever.
#[derive(Debug)]
pub struct PollLoop<N> {
    portal: Portal,
    notifier: N,
    watched: HashSet<String>,
    interval: Duration,
    deadline: Duration,
}

impl<N: Notify> PollLoop<N> {
    pub fn new(portal: Portal, notifier: N, watched: HashSet<String>) -> Self {
        Self {
            portal,
            notifier,
            watched,
            interval: POLL_INTERVAL,
            deadline: CYCLE_DEADLINE,
        }
    }

    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Runs until `shutdown` resolves. Only login or index failures end the
    /// loop early; a failing course is skipped for that cycle.
    pub async fn run(self, shutdown: impl Future<Output = ()>) -> Result<()> {
        tokio::pin!(shutdown);
        let started_at: DateTime<Utc> = Utc::now();

        let mut tracker = tokio::select! {
            biased;
            () = &mut shutdown => {
                log::info!("Shutting down before the course index was built");
                return Ok(());
            }
            tracker = self.bootstrap() => tracker?,
        };
        log::info!("Please wait as we rebuild course indexes...");

        loop {
            tokio::select! {
                biased;
                () = &mut shutdown => break,
                report = timeout(self.deadline, self.poll_once(&tracker)) => match report {
                    Ok(report) => log::debug!(
                        "Polled {} courses, {} failed, {} announced",
                        report.polled,
                        report.failed,
                        report.notified
                    ),
                    Err(_) => tracing::warn!(
                        "Cycle exceeded {:?}, remaining courses wait for the next one",
                        self.deadline
                    ),
                },
            }

            if tracker.finish_cycle().await {
                log::info!(
                    "Rebuilt assignment indexes. Took {} seconds to initialize the app.",
                    Utc::now().signed_duration_since(started_at).num_seconds()
                );
                log::info!(
                    "Assignment indexes will be updated every {:?}.",
                    self.interval
                );
            }

            tokio::select! {
                biased;
                () = &mut shutdown => break,
                () = sleep(self.interval) => {}
            }
        }

        log::info!("Shutting down");
        self.portal.session().close();
        Ok(())
    }

    async fn bootstrap(&self) -> Result<Tracker> {
        self.portal.authenticate_with_retries().await?;
        let tracker = Tracker::build(&self.portal, &self.watched).await?;
        log::info!(
            "Built course indexes. {} courses found.",
            tracker.courses().len()
        );
        Ok(tracker)
    }

    /// Polls each course in turn. Failures are logged and counted.
    pub async fn poll_once(&self, tracker: &Tracker) -> CycleReport {
        let mut report = CycleReport::default();
        for course in tracker.courses() {
            report.polled += 1;
            match self.poll_course(tracker, course).await {
                Ok(true) => report.notified += 1,
                Ok(false) => {}
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!(
                        "Skipping {} this cycle: {e}",
                        course.display_name()
                    );
                }
            }
        }
        report
    }

    async fn poll_course(&self, tracker: &Tracker, course: &Course) -> Result<bool> {
        let page = SubPage::CourseSummary(course.key());
        let summary = self.portal.fetch(page).await?;
        let announced = tracker
            .ingest(course, &summary, self.portal.sub_page_url(page), &self.notifier)
            .await?;
        if announced {
            log::info!("Webhook message sent for {}.", course.display_name());
        }
        Ok(announced)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    };

    use super::*;
    use crate::{
        notify::Sink,
        parse::CourseKey,
        test_support::{config, fixture, Recorder, Response, TestServer},
    };

    fn offline_portal() -> Portal {
        // nothing listens here, so no request leaves the machine
        let base: url::Url = "http://127.0.0.1:9".parse().unwrap();
        Portal::new(&config(&base)).unwrap()
    }

    #[tokio::test]
    async fn test_shutdown_before_bootstrap() {
        let poll_loop = PollLoop::new(offline_portal(), Sink::Log, HashSet::new());
        poll_loop.run(async {}).await.unwrap();
    }

    #[tokio::test]
    async fn test_empty_tracker_cycle() {
        let poll_loop = PollLoop::new(offline_portal(), Sink::Log, HashSet::new())
            .with_interval(Duration::from_millis(10));
        let tracker = Tracker::new(vec![]);
        assert_eq!(poll_loop.poll_once(&tracker).await, CycleReport::default());
    }

    #[tokio::test]
    async fn test_failing_course_is_isolated() {
        let summary = fixture("course_summary/course_summary.html");
        let appended = fixture("course_summary/course_summary_appended.html");
        let later = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&later);
        let server = TestServer::start(move |req| {
            let later = flag.load(Ordering::SeqCst);
            match req.query_param("courseCode") {
                Some("101") if later => Response::ok(appended.clone()),
                // under maintenance during the first cycle
                Some("205") if !later => Response::ok("<html><body>Down</body></html>"),
                Some(_) => Response::ok(summary.clone()),
                None => Response::status(404),
            }
        })
        .await;

        let portal = Portal::new(&config(server.url())).unwrap();
        let poll_loop = PollLoop::new(portal, Recorder::default(), HashSet::new());
        let mut tracker = Tracker::new(vec![
            Course::new(CourseKey::new(101, 2)),
            Course::new(CourseKey::new(205, 1)),
            Course::new(CourseKey::new(3120, 4)),
        ]);

        let report = poll_loop.poll_once(&tracker).await;
        assert_eq!(
            report,
            CycleReport {
                polled: 3,
                failed: 1,
                notified: 0
            }
        );
        assert!(!tracker.finish_cycle().await);
        assert_eq!(tracker.courses()[2].assignment_count().await, 2);

        later.store(true, Ordering::SeqCst);
        let report = poll_loop.poll_once(&tracker).await;
        assert_eq!(
            report,
            CycleReport {
                polled: 3,
                failed: 0,
                notified: 1
            }
        );
        assert!(tracker.finish_cycle().await);

        let sent = poll_loop.notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].description, "> Unit 2 Test: **You Did Fine.**");
        assert_eq!(
            sent[0].title_url,
            poll_loop
                .portal
                .sub_page_url(SubPage::CourseSummary(CourseKey::new(101, 2)))
        );
        assert_eq!(server.requests().len(), 6);
    }
}
