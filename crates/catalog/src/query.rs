use std::collections::BTreeSet;

use crate::{Project, ProjectStatus};

/// List view over projects: optional status filter, newest first.
///
/// An empty status set shows everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectQuery {
    pub statuses: BTreeSet<ProjectStatus>,
}

impl ProjectQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, status: ProjectStatus) -> Self {
        self.statuses.insert(status);
        self
    }

    /// Flips one status filter on or off.
    pub fn toggle(&mut self, status: ProjectStatus) {
        if !self.statuses.remove(&status) {
            self.statuses.insert(status);
        }
    }

    pub fn matches(&self, project: &Project) -> bool {
        self.statuses.is_empty() || self.statuses.contains(&project.status)
    }

    pub fn apply<'a>(&self, projects: &'a [Project]) -> Vec<&'a Project> {
        let mut out: Vec<&Project> = projects.iter().filter(|p| self.matches(p)).collect();
        // Stable sort keeps insertion order among equal timestamps.
        out.sort_by(|a, b| b.created_at_ms.cmp(&a.created_at_ms));
        out
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub verified: usize,
    pub pending: usize,
    pub unverified: usize,
}

impl StatusCounts {
    pub fn of(projects: &[Project]) -> Self {
        projects.iter().fold(Self::default(), |mut c, p| {
            match p.status {
                ProjectStatus::Verified => c.verified += 1,
                ProjectStatus::Pending => c.pending += 1,
                ProjectStatus::Unverified => c.unverified += 1,
            }
            c
        })
    }

    pub fn get(&self, status: ProjectStatus) -> usize {
        match status {
            ProjectStatus::Verified => self.verified,
            ProjectStatus::Pending => self.pending,
            ProjectStatus::Unverified => self.unverified,
        }
    }
}
