//! Catalog of brew profiles known to the machine.
//!
//! The machine identifies profiles by opaque ids while Home Assistant's
//! select entity speaks display names, so the catalog keeps the id → name
//! mapping and offers the reverse lookup used by profile selection.

use std::collections::BTreeMap;

/// Ordered id → display-name map of the machine's profiles.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProfileCatalog {
    profiles: BTreeMap<String, String>,
}

/// Outcome of a catalog refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogDiff {
    pub added: usize,
    pub removed: usize,
    /// True when the new map differs in any way, including renames.
    pub changed: bool,
}

impl ProfileCatalog {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Replace the catalog with a fresh listing.
    ///
    /// Entries with an empty id fall back to the name as id (matching the
    /// machine's own behavior for unsaved profiles); entries with neither
    /// are dropped. Returns what changed relative to the previous catalog.
    pub fn replace<I>(&mut self, entries: I) -> CatalogDiff
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut next = BTreeMap::new();
        for (id, name) in entries {
            let id = if id.is_empty() { name.clone() } else { id };
            if id.is_empty() {
                continue;
            }
            next.insert(id, name);
        }

        let added = next
            .keys()
            .filter(|id| !self.profiles.contains_key(*id))
            .count();
        let removed = self
            .profiles
            .keys()
            .filter(|id| !next.contains_key(*id))
            .count();
        let changed = next != self.profiles;

        self.profiles = next;
        CatalogDiff {
            added,
            removed,
            changed,
        }
    }

    /// Resolve a display name back to its profile id.
    #[must_use]
    pub fn id_for_name(&self, name: &str) -> Option<&str> {
        self.profiles
            .iter()
            .find(|(_, n)| n.as_str() == name)
            .map(|(id, _)| id.as_str())
    }

    /// The display name for a profile id.
    #[must_use]
    pub fn name_for_id(&self, id: &str) -> Option<&str> {
        self.profiles.get(id).map(String::as_str)
    }

    /// Display names in catalog order — the select entity's option list.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.profiles.values().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(entries: &[(&str, &str)]) -> ProfileCatalog {
        let mut catalog = ProfileCatalog::default();
        catalog.replace(
            entries
                .iter()
                .map(|(id, name)| ((*id).to_string(), (*name).to_string())),
        );
        catalog
    }

    #[test]
    fn should_resolve_name_to_id() {
        let catalog = catalog(&[("id1", "Espresso"), ("id2", "Americano")]);
        assert_eq!(catalog.id_for_name("Espresso"), Some("id1"));
        assert_eq!(catalog.id_for_name("Americano"), Some("id2"));
    }

    #[test]
    fn should_not_resolve_unknown_name() {
        let catalog = catalog(&[("id1", "Espresso")]);
        assert_eq!(catalog.id_for_name("Ristretto"), None);
    }

    #[test]
    fn should_report_additions_and_removals() {
        let mut catalog = catalog(&[("id1", "Espresso"), ("id2", "Americano")]);
        let diff = catalog.replace([
            ("id2".to_string(), "Americano".to_string()),
            ("id3".to_string(), "Lungo".to_string()),
        ]);
        assert_eq!(diff.added, 1);
        assert_eq!(diff.removed, 1);
        assert!(diff.changed);
    }

    #[test]
    fn should_detect_renames_as_changes() {
        let mut catalog = catalog(&[("id1", "Espresso")]);
        let diff = catalog.replace([("id1".to_string(), "Espresso v2".to_string())]);
        assert_eq!(diff.added, 0);
        assert_eq!(diff.removed, 0);
        assert!(diff.changed);
    }

    #[test]
    fn should_report_no_change_for_identical_listing() {
        let mut catalog = catalog(&[("id1", "Espresso")]);
        let diff = catalog.replace([("id1".to_string(), "Espresso".to_string())]);
        assert!(!diff.changed);
    }

    #[test]
    fn should_fall_back_to_name_when_id_missing() {
        let mut catalog = ProfileCatalog::default();
        catalog.replace([(String::new(), "Scratch".to_string())]);
        assert_eq!(catalog.id_for_name("Scratch"), Some("Scratch"));
    }

    #[test]
    fn should_drop_entries_without_id_or_name() {
        let mut catalog = ProfileCatalog::default();
        catalog.replace([(String::new(), String::new())]);
        assert!(catalog.is_empty());
    }

    #[test]
    fn should_list_names_in_stable_order() {
        let catalog = catalog(&[("b", "Beta"), ("a", "Alpha")]);
        assert_eq!(catalog.names(), vec!["Alpha", "Beta"]);
    }
}
