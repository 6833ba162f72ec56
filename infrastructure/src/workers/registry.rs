//! Worker registry: worker id -> profile.

use huddle_domain::{Group, Peer, WorkerId, WorkerProfile};
use std::collections::HashMap;
use std::path::PathBuf;

/// In-memory registry of worker profiles, built from configuration
#[derive(Debug, Clone, Default)]
pub struct WorkerRegistry {
    profiles: HashMap<WorkerId, WorkerProfile>,
}

impl WorkerRegistry {
    /// Build a registry. A later profile with the same id replaces an
    /// earlier one; configuration validation reports duplicates.
    pub fn new(profiles: impl IntoIterator<Item = WorkerProfile>) -> Self {
        let profiles = profiles
            .into_iter()
            .map(|mut profile| {
                profile.workspace_dir = expand_home(&profile.workspace_dir);
                (profile.id.clone(), profile)
            })
            .collect();
        Self { profiles }
    }

    pub fn get(&self, worker_id: &WorkerId) -> Option<&WorkerProfile> {
        self.profiles.get(worker_id)
    }

    pub fn contains(&self, worker_id: &WorkerId) -> bool {
        self.profiles.contains_key(worker_id)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Profiles sorted by id.
    pub fn profiles(&self) -> Vec<&WorkerProfile> {
        let mut profiles: Vec<_> = self.profiles.values().collect();
        profiles.sort_by(|a, b| a.id.cmp(&b.id));
        profiles
    }

    /// The other workers of `group`, as described to `worker_id`.
    pub fn peers_of(&self, worker_id: &WorkerId, group: &Group) -> Vec<Peer> {
        group
            .worker_ids()
            .into_iter()
            .filter(|id| id != worker_id)
            .map(|id| Peer {
                name: group.worker_display_name(&id),
                skills: self
                    .get(&id)
                    .map(|p| p.skills.clone())
                    .unwrap_or_default(),
                worker_id: id,
            })
            .collect()
    }
}

/// Expand a leading `~` and default an empty path to the current directory.
fn expand_home(path: &std::path::Path) -> PathBuf {
    if path.as_os_str().is_empty() {
        return PathBuf::from(".");
    }
    if let Ok(rest) = path.strip_prefix("~")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    path.to_path_buf()
}
