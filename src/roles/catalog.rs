//! The role catalog and its JSON file store.
//!
//! Roles are indexed twice: by key, and by normalized display name
//! pointing back at a key. Both indices are rebuilt from the same map
//! on every mutation so they can't drift apart. A mutation is staged on
//! a copy, written to disk, and only then swapped in, so a failed write
//! leaves the catalog exactly as it was.
//!
//! On disk the catalog is a single pretty-printed document:
//!
//! ```json
//! {"roles": {"business": {"name": "Business Analyst", ...}}}
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::models::{RoleDefinition, default_roles, normalize_key};
use crate::core::{Error, Result};

#[derive(Serialize, Deserialize)]
struct CatalogFile {
    roles: BTreeMap<String, RoleDefinition>,
}

#[derive(Debug, Default)]
pub struct RoleCatalog {
    path: Option<PathBuf>,
    by_key: BTreeMap<String, RoleDefinition>,
    by_name: HashMap<String, String>,
}

fn read_catalog(path: &Path) -> Result<BTreeMap<String, RoleDefinition>> {
    let data = fs::read_to_string(path)?;
    let file: CatalogFile = serde_json::from_str(&data)?;
    Ok(file
        .roles
        .into_iter()
        .map(|(key, role)| {
            let role = RoleDefinition { key: key.clone(), ..role }.normalized();
            (key, role)
        })
        .collect())
}

fn write_catalog(path: &Path, roles: &BTreeMap<String, RoleDefinition>) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    let file = CatalogFile {
        roles: roles.clone(),
    };
    fs::write(path, serde_json::to_string_pretty(&file)?)?;
    Ok(())
}

impl RoleCatalog {
    /// A catalog that lives only in memory.
    pub fn in_memory(roles: Vec<RoleDefinition>) -> Self {
        let mut catalog = Self::default();
        catalog.replace(
            roles
                .into_iter()
                .map(RoleDefinition::normalized)
                .map(|r| (r.key.clone(), r))
                .collect(),
        );
        catalog
    }

    /// Load the catalog from `path`, seeding it with the default roles
    /// if the file doesn't exist yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let roles = if path.exists() {
            read_catalog(&path)?
        } else {
            tracing::info!("No role catalog at {}, seeding defaults", path.display());
            let roles = default_roles()
                .into_iter()
                .map(|r| (r.key.clone(), r))
                .collect();
            write_catalog(&path, &roles)?;
            roles
        };

        let mut catalog = Self {
            path: Some(path),
            ..Self::default()
        };
        catalog.replace(roles);
        Ok(catalog)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    fn replace(&mut self, roles: BTreeMap<String, RoleDefinition>) {
        let mut by_name = HashMap::new();
        for (key, role) in roles.iter() {
            by_name
                .entry(normalize_key(&role.name))
                .or_insert_with(|| key.clone());
        }
        self.by_key = roles;
        self.by_name = by_name;
    }

    fn commit(&mut self, roles: BTreeMap<String, RoleDefinition>) -> Result<()> {
        if let Some(path) = &self.path {
            write_catalog(path, &roles)?;
        }
        self.replace(roles);
        Ok(())
    }

    /// Resolve a key or display name to the key it's stored under.
    fn resolve_key(&self, key_or_name: &str) -> Option<String> {
        if self.by_key.contains_key(key_or_name) {
            return Some(key_or_name.to_string());
        }
        let normalized = normalize_key(key_or_name);
        if let Some(key) = self.by_name.get(&normalized) {
            return Some(key.clone());
        }
        self.by_key.contains_key(&normalized).then_some(normalized)
    }

    /// Look up a role by exact key, then display name, then the key
    /// derived from the name.
    pub fn get(&self, key_or_name: &str) -> Option<&RoleDefinition> {
        self.resolve_key(key_or_name)
            .and_then(|key| self.by_key.get(&key))
    }

    /// All roles ordered by key.
    pub fn list(&self) -> Vec<RoleDefinition> {
        self.by_key.values().cloned().collect()
    }

    /// Insert a new role. Fails if its key is already taken.
    pub fn add(&mut self, role: RoleDefinition) -> Result<RoleDefinition> {
        let role = role.normalized();
        if role.name.is_empty() {
            return Err(Error::InvalidRequest("Role name is required".to_string()));
        }
        if self.by_key.contains_key(&role.key) {
            return Err(Error::RoleExists(role.key));
        }
        self.upsert(role)
    }

    /// Insert or replace the role stored under `role.key`.
    pub fn upsert(&mut self, role: RoleDefinition) -> Result<RoleDefinition> {
        let role = role.normalized();
        let mut next = self.by_key.clone();
        next.insert(role.key.clone(), role.clone());
        self.commit(next)?;
        Ok(role)
    }

    /// Replace an existing role. The role is located by `original_name`
    /// when given (an unknown name is `RoleNotFound`), otherwise by its
    /// own key or name. If the display name changed the role moves to
    /// the key derived from the new name; the old entry is removed in
    /// the same commit.
    pub fn update(
        &mut self,
        role: RoleDefinition,
        original_name: Option<&str>,
    ) -> Result<RoleDefinition> {
        let mut role = role.normalized();
        let existing_key = match original_name.map(str::trim).filter(|n| !n.is_empty()) {
            Some(original) => self
                .resolve_key(original)
                .ok_or_else(|| Error::RoleNotFound(original.to_string()))?,
            None => self
                .resolve_key(&role.key)
                .or_else(|| self.resolve_key(&role.name))
                .ok_or_else(|| Error::RoleNotFound(role.name.clone()))?,
        };
        let existing = &self.by_key[&existing_key];

        role.key = if normalize_key(&existing.name) == normalize_key(&role.name) {
            existing_key.clone()
        } else {
            normalize_key(&role.name)
        };
        if role.key != existing_key && self.by_key.contains_key(&role.key) {
            return Err(Error::RoleExists(role.key));
        }

        let mut next = self.by_key.clone();
        next.remove(&existing_key);
        next.insert(role.key.clone(), role.clone());
        self.commit(next)?;

        if role.key != existing_key {
            tracing::debug!("Renamed role {} to {}", existing_key, role.key);
        }
        Ok(role)
    }

    /// Remove a role by key or display name.
    pub fn delete(&mut self, key_or_name: &str) -> Result<RoleDefinition> {
        let key = self
            .resolve_key(key_or_name)
            .ok_or_else(|| Error::RoleNotFound(key_or_name.to_string()))?;
        let mut next = self.by_key.clone();
        let removed = next
            .remove(&key)
            .ok_or_else(|| Error::RoleNotFound(key_or_name.to_string()))?;
        self.commit(next)?;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn role(name: &str) -> RoleDefinition {
        RoleDefinition::new("", name, "A test role", "Be helpful.")
    }

    #[test]
    fn test_get_falls_back_to_name_then_normalized_key() {
        let mut catalog = RoleCatalog::in_memory(default_roles());
        assert_eq!(catalog.get("business").unwrap().name, "Business Analyst");
        assert_eq!(catalog.get("Business Analyst").unwrap().key, "business");

        catalog.add(role("Product Owner")).unwrap();
        assert_eq!(catalog.get("product_owner").unwrap().name, "Product Owner");
        assert_eq!(catalog.get("PRODUCT OWNER").unwrap().key, "product_owner");
        assert!(catalog.get("Astronaut").is_none());
    }

    #[test]
    fn test_add_rejects_existing_key() {
        let mut catalog = RoleCatalog::in_memory(default_roles());
        let before = catalog.len();
        catalog.add(role("Visionary Two")).unwrap();
        assert_eq!(catalog.len(), before + 1);

        let dup = RoleDefinition {
            key: "critic".to_string(),
            ..role("Another Critic")
        };
        assert!(matches!(catalog.add(dup), Err(Error::RoleExists(k)) if k == "critic"));
        assert_eq!(catalog.len(), before + 1);
    }

    #[test]
    fn test_update_in_place_keeps_key() {
        let mut catalog = RoleCatalog::in_memory(default_roles());
        let mut updated = catalog.get("business").unwrap().clone();
        updated.description = "Money matters".to_string();
        updated.key = String::new();

        let saved = catalog.update(updated, Some("Business Analyst")).unwrap();
        assert_eq!(saved.key, "business");
        assert_eq!(catalog.get("business").unwrap().description, "Money matters");
    }

    #[test]
    fn test_update_rename_moves_key() {
        let mut catalog = RoleCatalog::in_memory(vec![]);
        catalog.add(role("Data Scientist")).unwrap();

        let renamed = catalog
            .update(role("ML Engineer"), Some("Data Scientist"))
            .unwrap();
        assert_eq!(renamed.key, "ml_engineer");
        assert_eq!(catalog.len(), 1);
        assert!(catalog.get("data_scientist").is_none());
        assert!(catalog.get("Data Scientist").is_none());
        assert_eq!(catalog.get("ml_engineer").unwrap().name, "ML Engineer");
    }

    #[test]
    fn test_update_rename_onto_existing_role_fails() {
        let mut catalog = RoleCatalog::in_memory(vec![role("Alpha"), role("Beta")]);
        let result = catalog.update(role("Beta"), Some("Alpha"));
        assert!(matches!(result, Err(Error::RoleExists(_))));
        assert_eq!(catalog.len(), 2);
        assert!(catalog.get("alpha").is_some());
    }

    #[test]
    fn test_update_missing_role() {
        let mut catalog = RoleCatalog::in_memory(default_roles());
        let result = catalog.update(role("Ghost"), Some("Nobody"));
        assert!(matches!(result, Err(Error::RoleNotFound(n)) if n == "Nobody"));
    }

    #[test]
    fn test_update_unknown_original_name_does_not_touch_other_roles() {
        let mut catalog = RoleCatalog::in_memory(vec![role("Alpha"), role("Beta")]);
        let edited = RoleDefinition::new("", "Beta", "edited", "X");

        let result = catalog.update(edited, Some("Alpah"));
        assert!(matches!(result, Err(Error::RoleNotFound(n)) if n == "Alpah"));
        assert_eq!(catalog.get("beta").unwrap().description, "A test role");
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_update_without_original_name_uses_own_name() {
        let mut catalog = RoleCatalog::in_memory(vec![role("Alpha")]);
        let edited = RoleDefinition::new("", "Alpha", "edited", "X");

        let saved = catalog.update(edited, None).unwrap();
        assert_eq!(saved.key, "alpha");
        assert_eq!(catalog.get("alpha").unwrap().description, "edited");
    }

    #[test]
    fn test_delete_by_name_or_key() {
        let mut catalog = RoleCatalog::in_memory(default_roles());
        let before = catalog.len();
        assert_eq!(catalog.delete("Visionary").unwrap().key, "dreamer");
        assert_eq!(catalog.delete("critic").unwrap().name, "Critical Thinker");
        assert_eq!(catalog.len(), before - 2);
        assert!(matches!(catalog.delete("critic"), Err(Error::RoleNotFound(_))));
    }

    #[test]
    fn test_open_seeds_defaults_and_persists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config").join("roles.json");

        let mut catalog = RoleCatalog::open(&path).unwrap();
        assert!(path.exists());
        assert_eq!(catalog.len(), default_roles().len());

        catalog.add(role("Security Auditor")).unwrap();
        catalog
            .update(role("Security Lead"), Some("Security Auditor"))
            .unwrap();
        catalog.delete("critic").unwrap();

        let reloaded = RoleCatalog::open(&path).unwrap();
        assert_eq!(reloaded.list(), catalog.list());
        assert!(reloaded.get("security_lead").is_some());
        assert!(reloaded.get("security_auditor").is_none());
        assert!(reloaded.get("critic").is_none());

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["roles"]["business"]["name"], "Business Analyst");
        // Pretty printed
        assert!(fs::read_to_string(&path).unwrap().contains("\n  "));
    }

    #[test]
    fn test_failed_write_leaves_catalog_unchanged() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("roles.json");
        let mut catalog = RoleCatalog::open(&path).unwrap();
        let before = catalog.list();

        // Replace the file with a directory so the next write fails
        fs::remove_file(&path).unwrap();
        fs::create_dir(&path).unwrap();

        let result = catalog.add(role("Doomed"));
        assert!(matches!(result, Err(Error::CatalogPersistence(_))));
        assert_eq!(catalog.list(), before);
        assert!(catalog.get("doomed").is_none());
    }
}
