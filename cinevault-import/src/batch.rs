//! Discovery pass over one batch of export entries.
//!
//! Box-set children name their parent only through external identifiers, and
//! a child may appear in the document before its parent. Before anything is
//! written, one read-only pass records which internal key every external
//! identifier will receive and which entries each box set contains. The
//! resulting [`ImportBatch`] is borrowed by the transactional phase and
//! dropped when the import call returns.

use std::collections::HashMap;

use cinevault_export::ExportEntry;

/// Declared box-set contents: a parent external id and its children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationGroup {
    pub parent: String,
    pub children: Vec<String>,
}

/// How an entry's parent reference resolved against the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParentResolution {
    /// No box set in the batch lists this entry.
    None,
    /// The containing box set maps to this internal key.
    Resolved { parent_external_id: String, key: i64 },
    /// A box set lists this entry, but its own key is unknown.
    Unresolved { parent_external_id: String },
}

impl ParentResolution {
    pub fn key(&self) -> Option<i64> {
        match self {
            Self::Resolved { key, .. } => Some(*key),
            _ => None,
        }
    }
}

/// Identifier map and relation groups for one import call.
#[derive(Debug, Default)]
pub struct ImportBatch {
    identifiers: HashMap<String, i64>,
    relations: Vec<RelationGroup>,
    /// child external id → index into `relations`
    child_index: HashMap<String, usize>,
    usable_entries: usize,
}

impl ImportBatch {
    /// Build the identifier map and relation groups in one pass.
    ///
    /// The first occurrence of an external identifier wins, both as a key
    /// mapping and as a box-set parent. Performs no writes.
    pub fn discover(entries: &[ExportEntry]) -> Self {
        let mut batch = Self::default();

        for entry in entries {
            let key = entry.internal_key.filter(|k| *k > 0);
            if key.is_some() {
                batch.usable_entries += 1;
            }

            let Some(external_id) = entry
                .external_id
                .as_deref()
                .map(str::trim)
                .filter(|id| !id.is_empty())
            else {
                if !entry.contents.is_empty() {
                    log::warn!(
                        "Box set {:?} has no external id; its {} children stay unlinked",
                        entry.title.as_deref().unwrap_or("<untitled>"),
                        entry.contents.len(),
                    );
                }
                continue;
            };

            if let Some(key) = key {
                if batch.identifiers.contains_key(external_id) {
                    log::debug!("Duplicate external id {} ignored", external_id);
                } else {
                    batch.identifiers.insert(external_id.to_string(), key);
                }
            }

            let children: Vec<String> = entry
                .contents
                .iter()
                .map(|c| c.trim())
                .filter(|c| !c.is_empty())
                .map(str::to_string)
                .collect();
            if children.is_empty() {
                continue;
            }
            if batch.relations.iter().any(|g| g.parent == external_id) {
                log::debug!("Duplicate box set {} ignored", external_id);
                continue;
            }

            let group = batch.relations.len();
            for child in &children {
                batch.child_index.entry(child.clone()).or_insert(group);
            }
            batch.relations.push(RelationGroup {
                parent: external_id.to_string(),
                children,
            });
        }

        log::debug!(
            "Discovered {} identifiers and {} box sets in {} entries",
            batch.identifiers.len(),
            batch.relations.len(),
            entries.len(),
        );

        batch
    }

    /// Internal key an external identifier will receive, if known.
    pub fn internal_key(&self, external_id: &str) -> Option<i64> {
        self.identifiers.get(external_id).copied()
    }

    /// External id of the first box set (in document order) listing `child`.
    pub fn parent_of(&self, child: &str) -> Option<&str> {
        self.child_index
            .get(child)
            .map(|&group| self.relations[group].parent.as_str())
    }

    /// Resolve the parent internal key for an entry's external id.
    pub fn resolve_parent(&self, external_id: Option<&str>) -> ParentResolution {
        let Some(parent) = external_id.and_then(|id| self.parent_of(id.trim())) else {
            return ParentResolution::None;
        };
        match self.internal_key(parent) {
            Some(key) => ParentResolution::Resolved {
                parent_external_id: parent.to_string(),
                key,
            },
            None => ParentResolution::Unresolved {
                parent_external_id: parent.to_string(),
            },
        }
    }

    pub fn relations(&self) -> &[RelationGroup] {
        &self.relations
    }

    pub fn identifier_count(&self) -> usize {
        self.identifiers.len()
    }

    /// Number of entries carrying a positive internal key.
    pub fn usable_entries(&self) -> usize {
        self.usable_entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(ext: &str, key: Option<i64>, contents: &[&str]) -> ExportEntry {
        ExportEntry {
            external_id: Some(ext.to_string()),
            internal_key: key,
            title: Some(format!("Title {ext}")),
            contents: contents.iter().map(|c| c.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn maps_external_ids_to_keys() {
        let batch = ImportBatch::discover(&[entry("a", Some(1), &[]), entry("b", Some(2), &[])]);
        assert_eq!(batch.internal_key("a"), Some(1));
        assert_eq!(batch.internal_key("b"), Some(2));
        assert_eq!(batch.internal_key("c"), None);
        assert_eq!(batch.usable_entries(), 2);
        assert!(batch.relations().is_empty());
    }

    #[test]
    fn first_occurrence_wins() {
        let batch = ImportBatch::discover(&[entry("a", Some(1), &[]), entry("a", Some(7), &[])]);
        assert_eq!(batch.internal_key("a"), Some(1));
        assert_eq!(batch.identifier_count(), 1);
    }

    #[test]
    fn non_positive_keys_are_not_mapped() {
        let batch = ImportBatch::discover(&[entry("a", Some(0), &[]), entry("b", None, &[])]);
        assert_eq!(batch.internal_key("a"), None);
        assert_eq!(batch.usable_entries(), 0);
    }

    #[test]
    fn relation_groups_skip_empty_children() {
        let batch = ImportBatch::discover(&[entry("box", Some(10), &["a", "", "  ", "b"])]);
        assert_eq!(
            batch.relations(),
            &[RelationGroup {
                parent: "box".to_string(),
                children: vec!["a".to_string(), "b".to_string()],
            }]
        );
        assert_eq!(batch.parent_of("a"), Some("box"));
        assert_eq!(batch.parent_of("box"), None);
    }

    #[test]
    fn forward_reference_resolves() {
        // Child listed before its box set
        let batch = ImportBatch::discover(&[entry("c", Some(3), &[]), entry("box", Some(10), &["c"])]);
        assert_eq!(
            batch.resolve_parent(Some("c")),
            ParentResolution::Resolved {
                parent_external_id: "box".to_string(),
                key: 10
            }
        );
    }

    #[test]
    fn parent_without_key_is_unresolved() {
        let batch = ImportBatch::discover(&[entry("box", None, &["c"]), entry("c", Some(3), &[])]);
        assert_eq!(
            batch.resolve_parent(Some("c")),
            ParentResolution::Unresolved {
                parent_external_id: "box".to_string()
            }
        );
        assert_eq!(batch.resolve_parent(Some("c")).key(), None);
    }

    #[test]
    fn first_box_set_listing_a_child_wins() {
        let batch = ImportBatch::discover(&[
            entry("box1", Some(10), &["c"]),
            entry("box2", Some(11), &["c"]),
        ]);
        assert_eq!(batch.parent_of("c"), Some("box1"));
    }

    #[test]
    fn empty_batch() {
        let batch = ImportBatch::discover(&[]);
        assert_eq!(batch.usable_entries(), 0);
        assert_eq!(batch.resolve_parent(None), ParentResolution::None);
    }
}
