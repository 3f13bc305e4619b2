//! JSON file backed guide store
//!
//! One file per entity kind and user under the data directory:
//! `guides_<scope>.json` and `projects_<scope>.json`. Files are replaced
//! atomically through a temp file in the same directory.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::{GuideStore, IdentityProvider};
use crate::config::EditorConfig;
use crate::domain::{Guide, GuideId, Project, ProjectId};
use crate::error::StoreError;

#[derive(Clone, Debug)]
pub struct JsonFileStore<I> {
    root: PathBuf,
    identity: I,
}

impl<I: IdentityProvider> JsonFileStore<I> {
    pub fn with_root(root: impl Into<PathBuf>, identity: I) -> Self {
        Self {
            root: root.into(),
            identity,
        }
    }

    /// Store under the configured data directory
    pub fn from_config(config: &EditorConfig, identity: I) -> Result<Self, StoreError> {
        let root = config.data_dir().ok_or(StoreError::NoDataDirectory)?;
        Ok(Self::with_root(root, identity))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn identity(&self) -> &I {
        &self.identity
    }

    fn guides_path(&self) -> PathBuf {
        self.root.join(format!("guides_{}.json", self.file_scope()))
    }

    fn projects_path(&self) -> PathBuf {
        self.root.join(format!("projects_{}.json", self.file_scope()))
    }

    fn file_scope(&self) -> String {
        self.identity
            .scope()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect()
    }

    fn write_guides(&self, guides: &[Guide]) -> Result<(), StoreError> {
        write_atomic(&self.root, &self.guides_path(), guides)
    }

    fn write_projects(&self, projects: &[Project]) -> Result<(), StoreError> {
        write_atomic(&self.root, &self.projects_path(), projects)
    }
}

impl<I: IdentityProvider> GuideStore for JsonFileStore<I> {
    fn list_guides(&self) -> Result<Vec<Guide>, StoreError> {
        read_list(&self.guides_path())
    }

    fn save_guide(&self, guide: &Guide) -> Result<(), StoreError> {
        let mut guides = self.list_guides()?;
        match guides.iter_mut().find(|g| g.id == guide.id) {
            Some(existing) => *existing = guide.clone(),
            None => guides.push(guide.clone()),
        }
        self.write_guides(&guides)
    }

    fn delete_guide(&self, id: &GuideId) -> Result<(), StoreError> {
        let mut guides = self.list_guides()?;
        guides.retain(|g| &g.id != id);
        self.write_guides(&guides)?;

        let mut projects = self.list_projects()?;
        let mut changed = false;
        for project in &mut projects {
            let before = project.guide_ids.len();
            project.guide_ids.retain(|gid| gid != id);
            changed |= project.guide_ids.len() != before;
        }
        if changed {
            self.write_projects(&projects)?;
        }
        Ok(())
    }

    fn list_projects(&self) -> Result<Vec<Project>, StoreError> {
        read_list(&self.projects_path())
    }

    fn save_project(&self, project: &Project) -> Result<(), StoreError> {
        let mut projects = self.list_projects()?;
        match projects.iter_mut().find(|p| p.id == project.id) {
            Some(existing) => *existing = project.clone(),
            None => projects.push(project.clone()),
        }
        self.write_projects(&projects)
    }

    fn delete_project(&self, id: &ProjectId) -> Result<(), StoreError> {
        let mut projects = self.list_projects()?;
        projects.retain(|p| &p.id != id);
        self.write_projects(&projects)
    }

    fn import_state(&self, json: &str) -> Result<(), StoreError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let serde_json::Value::Object(mut doc) = value else {
            return Err(StoreError::InvalidImport(
                "expected an object with guides and projects".to_string(),
            ));
        };

        // Parse both before writing either so a bad document changes nothing
        let guides = match doc.remove("guides") {
            Some(v @ serde_json::Value::Array(_)) => Some(serde_json::from_value::<Vec<Guide>>(v)?),
            _ => None,
        };
        let projects = match doc.remove("projects") {
            Some(v @ serde_json::Value::Array(_)) => {
                Some(serde_json::from_value::<Vec<Project>>(v)?)
            }
            _ => None,
        };

        if let Some(guides) = &guides {
            self.write_guides(guides)?;
        }
        if let Some(projects) = &projects {
            self.write_projects(projects)?;
        }
        log::info!(
            "Imported {} guides and {} projects",
            guides.as_ref().map_or(0, Vec::len),
            projects.as_ref().map_or(0, Vec::len)
        );
        Ok(())
    }

    fn clear_all(&self) -> Result<(), StoreError> {
        for path in [self.guides_path(), self.projects_path()] {
            match fs::remove_file(&path) {
                Ok(()) => {}
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => return Err(err.into()),
            }
        }
        Ok(())
    }
}

/// Missing file reads as an empty list
fn read_list<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, StoreError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => {
            log::error!("Failed to read {}: {}", path.display(), err);
            return Err(err.into());
        }
    };
    serde_json::from_slice(&bytes).map_err(|err| {
        log::error!("Corrupt store file {}: {}", path.display(), err);
        err.into()
    })
}

fn write_atomic<T: Serialize + ?Sized>(dir: &Path, path: &Path, value: &T) -> Result<(), StoreError> {
    fs::create_dir_all(dir)?;
    let bytes = serde_json::to_vec(value)?;
    let mut file = tempfile::Builder::new()
        .prefix(".store-")
        .suffix(".json")
        .tempfile_in(dir)?;
    file.write_all(&bytes)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|err| StoreError::Io(err.error))?;
    log::debug!("Wrote {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ProjectMetadata;
    use crate::store::StaticIdentity;

    fn guide(title: &str) -> Guide {
        Guide::new(ProjectMetadata {
            title: title.to_string(),
            author: "Tester".to_string(),
            date: "2024-05-01".to_string(),
        })
    }

    fn store(dir: &Path) -> JsonFileStore<StaticIdentity> {
        JsonFileStore::with_root(dir, StaticIdentity::user("alice"))
    }

    #[test]
    fn test_empty_store_lists_nothing() {
        let temp = tempfile::tempdir().unwrap();
        let store = store(temp.path());
        assert!(store.list_guides().unwrap().is_empty());
        assert!(store.list_projects().unwrap().is_empty());
    }

    #[test]
    fn test_save_replaces_by_id() {
        let temp = tempfile::tempdir().unwrap();
        let store = store(temp.path());
        let mut g = guide("First");
        store.save_guide(&g).unwrap();
        g.metadata.title = "Renamed".to_string();
        store.save_guide(&g).unwrap();

        let guides = store.list_guides().unwrap();
        assert_eq!(guides.len(), 1);
        assert_eq!(store.get_guide(&g.id).unwrap().unwrap().metadata.title, "Renamed");
        assert!(temp.path().join("guides_alice.json").exists());
    }

    #[test]
    fn test_users_are_isolated() {
        let temp = tempfile::tempdir().unwrap();
        store(temp.path()).save_guide(&guide("Alice's")).unwrap();

        let guest = JsonFileStore::with_root(temp.path(), StaticIdentity::guest());
        assert!(guest.list_guides().unwrap().is_empty());
        assert!(!temp.path().join("guides_guest.json").exists());
    }

    #[test]
    fn test_delete_guide_unlinks_from_projects() {
        let temp = tempfile::tempdir().unwrap();
        let store = store(temp.path());
        let keep = guide("Keep");
        let gone = guide("Gone");
        store.save_guide(&keep).unwrap();
        store.save_guide(&gone).unwrap();
        let mut project = Project::new("Onboarding");
        project.guide_ids = vec![keep.id.clone(), gone.id.clone()];
        store.save_project(&project).unwrap();

        store.delete_guide(&gone.id).unwrap();

        assert_eq!(store.list_guides().unwrap(), vec![keep.clone()]);
        let project = store.get_project(&project.id).unwrap().unwrap();
        assert_eq!(project.guide_ids, vec![keep.id]);
    }

    #[test]
    fn test_import_replaces_only_present_arrays() {
        let temp = tempfile::tempdir().unwrap();
        let store = store(temp.path());
        store.save_guide(&guide("Existing")).unwrap();
        store.save_project(&Project::new("Existing")).unwrap();

        let snapshot = serde_json::json!({ "projects": [] }).to_string();
        store.import_state(&snapshot).unwrap();

        assert_eq!(store.list_guides().unwrap().len(), 1);
        assert!(store.list_projects().unwrap().is_empty());
    }

    #[test]
    fn test_export_import_round_trip() {
        let temp = tempfile::tempdir().unwrap();
        let source = store(temp.path());
        source.save_guide(&guide("Exported")).unwrap();
        source.save_project(&Project::new("Exported")).unwrap();
        let json = source.export_json().unwrap();

        let other = tempfile::tempdir().unwrap();
        let target = store(other.path());
        target.import_state(&json).unwrap();
        assert_eq!(target.export_state().unwrap(), source.export_state().unwrap());
    }

    #[test]
    fn test_import_rejects_non_object() {
        let temp = tempfile::tempdir().unwrap();
        let store = store(temp.path());
        assert!(matches!(
            store.import_state("[1, 2]"),
            Err(StoreError::InvalidImport(_))
        ));
        assert!(matches!(store.import_state("{"), Err(StoreError::Json(_))));
    }

    #[test]
    fn test_clear_all() {
        let temp = tempfile::tempdir().unwrap();
        let store = store(temp.path());
        store.save_guide(&guide("Doomed")).unwrap();
        store.clear_all().unwrap();
        assert!(store.list_guides().unwrap().is_empty());
        // Clearing twice is fine
        store.clear_all().unwrap();
    }
}
