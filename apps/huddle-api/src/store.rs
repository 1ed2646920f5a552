//! In-memory project store (non-persistent, process lifetime).

use parking_lot::RwLock;

use crate::models::project::Project;

/// Insertion-ordered store of project records, backed by a `Vec` behind an
/// `RwLock`. List order is creation order, reset on restart.
pub struct ProjectStore {
    projects: RwLock<Vec<Project>>,
}

impl ProjectStore {
    pub fn new() -> Self {
        Self {
            projects: RwLock::new(Vec::new()),
        }
    }

    pub fn insert(&self, project: Project) {
        self.projects.write().push(project);
    }

    pub fn list(&self) -> Vec<Project> {
        self.projects.read().clone()
    }

    pub fn get(&self, id: &str) -> Option<Project> {
        self.projects.read().iter().find(|p| p.id == id).cloned()
    }
}
