//! Guide and project persistence
//!
//! Storage is scoped per user: every `GuideStore` asks its
//! `IdentityProvider` who is logged in and keeps a separate set of guides
//! and projects for that user, or for `guest` when nobody is.

pub mod json_file;

use serde::{Deserialize, Serialize};

use crate::domain::{Guide, GuideId, Project, ProjectId, UserId};
use crate::error::StoreError;

pub use json_file::JsonFileStore;

/// Storage scope used when nobody is logged in
pub const GUEST_SCOPE: &str = "guest";

/// Source of the logged-in user
pub trait IdentityProvider {
    fn current_user(&self) -> Option<UserId>;

    /// Name of the storage scope for the current user
    fn scope(&self) -> String {
        self.current_user()
            .map_or_else(|| GUEST_SCOPE.to_string(), |user| user.to_string())
    }
}

/// Fixed identity, for hosts without accounts and for tests
#[derive(Clone, Debug, Default)]
pub struct StaticIdentity(pub Option<UserId>);

impl StaticIdentity {
    pub fn guest() -> Self {
        Self(None)
    }

    pub fn user(id: impl Into<UserId>) -> Self {
        Self(Some(id.into()))
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_user(&self) -> Option<UserId> {
        self.0.clone()
    }
}

/// Whole-state export document
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub guides: Vec<Guide>,
    pub projects: Vec<Project>,
}

impl StateSnapshot {
    /// Suggested file name for a backup, e.g. `stepguide_alice_2024-05-01.json`
    pub fn file_name(username: Option<&str>) -> String {
        format!(
            "stepguide_{}_{}.json",
            username.unwrap_or("backup"),
            chrono::Local::now().format("%Y-%m-%d")
        )
    }
}

/// Persistence of guides and projects for the current user
pub trait GuideStore {
    fn list_guides(&self) -> Result<Vec<Guide>, StoreError>;

    /// Insert or replace by id
    fn save_guide(&self, guide: &Guide) -> Result<(), StoreError>;

    /// Remove a guide and drop its id from every project
    fn delete_guide(&self, id: &GuideId) -> Result<(), StoreError>;

    fn list_projects(&self) -> Result<Vec<Project>, StoreError>;

    /// Insert or replace by id
    fn save_project(&self, project: &Project) -> Result<(), StoreError>;

    /// Remove a project. Its guides are kept.
    fn delete_project(&self, id: &ProjectId) -> Result<(), StoreError>;

    /// Replace the stored arrays that are present in `json`. An array that
    /// is missing from the document leaves the stored one untouched.
    fn import_state(&self, json: &str) -> Result<(), StoreError>;

    /// Remove everything stored for the current user
    fn clear_all(&self) -> Result<(), StoreError>;

    fn get_guide(&self, id: &GuideId) -> Result<Option<Guide>, StoreError> {
        Ok(self.list_guides()?.into_iter().find(|g| &g.id == id))
    }

    fn get_project(&self, id: &ProjectId) -> Result<Option<Project>, StoreError> {
        Ok(self.list_projects()?.into_iter().find(|p| &p.id == id))
    }

    fn export_state(&self) -> Result<StateSnapshot, StoreError> {
        Ok(StateSnapshot {
            guides: self.list_guides()?,
            projects: self.list_projects()?,
        })
    }

    /// `export_state` as pretty JSON
    fn export_json(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string_pretty(&self.export_state()?)?)
    }
}
