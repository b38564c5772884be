//! In-memory membership set synchronised with its backing store.
//!
//! The set only ever changes in two ways: a successful [`MembershipStore::load`]
//! replaces it wholesale, and a mutation is kept if and only if the
//! following [`MembershipStore::persist`] succeeds. A failed read or write
//! therefore leaves the set exactly as it was.

use std::collections::HashSet;
use tracing::{debug, error, info};

use crate::error::StorageResult;
use crate::storage::BackingStore;
use crate::types::Identity;

/// Set of identities backed by a newline-delimited list.
#[derive(Debug)]
pub struct MembershipStore {
    members: HashSet<Identity>,
    store: Box<dyn BackingStore>,
}

impl MembershipStore {
    /// Create an empty store. Nothing is read until [`load`](Self::load).
    pub fn new(store: Box<dyn BackingStore>) -> Self {
        Self {
            members: HashSet::new(),
            store,
        }
    }

    /// Replace the set with the contents of the backing store.
    ///
    /// Each line is trimmed and blank results are dropped. A missing store
    /// is created empty. On any read failure the current set is kept
    /// untouched and the error is returned.
    ///
    /// Returns the number of members after the load.
    pub fn load(&mut self) -> StorageResult<usize> {
        let contents = match self.store.read() {
            Ok(Some(contents)) => contents,
            Ok(None) => {
                info!("📋 No identity list at {}, creating an empty one", self.store.location());
                self.store.write("")?;
                self.members.clear();
                return Ok(0);
            }
            Err(e) => {
                error!("Failed to load identity list from {}: {}", self.store.location(), e);
                return Err(e);
            }
        };

        self.members = parse_members(&contents);
        info!(
            "📋 Loaded {} identities from {}",
            self.members.len(),
            self.store.location()
        );
        Ok(self.members.len())
    }

    /// Insert `identity` verbatim and persist.
    ///
    /// Returns `Ok(false)` without touching the store when it was already
    /// present, or when it is blank and would not survive the next load.
    /// If persisting fails the insertion is undone.
    pub fn add(&mut self, identity: Identity) -> StorageResult<bool> {
        if identity.as_str().trim().is_empty() {
            debug!("Ignoring blank identity");
            return Ok(false);
        }
        if self.members.contains(&identity) {
            return Ok(false);
        }

        self.members.insert(identity.clone());
        if let Err(e) = self.persist() {
            self.members.remove(&identity);
            return Err(e);
        }

        debug!("Added {} to the identity list", identity);
        Ok(true)
    }

    /// Delete `identity` and persist.
    ///
    /// Returns `Ok(false)` when it was not a member. If persisting fails the
    /// identity is restored.
    pub fn remove(&mut self, identity: &str) -> StorageResult<bool> {
        let Some(removed) = self.members.take(identity) else {
            return Ok(false);
        };

        if let Err(e) = self.persist() {
            self.members.insert(removed);
            return Err(e);
        }

        debug!("Removed {} from the identity list", removed);
        Ok(true)
    }

    /// Overwrite the backing store with the current set, sorted, one
    /// identity per line.
    pub fn persist(&self) -> StorageResult<()> {
        let mut contents = String::new();
        for identity in self.iter_sorted() {
            contents.push_str(identity.as_str());
            contents.push('\n');
        }

        self.store.write(&contents).map_err(|e| {
            error!("Failed to save identity list to {}: {}", self.store.location(), e);
            e
        })
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.members.contains(identity)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Members in ascending order
    pub fn iter_sorted(&self) -> impl Iterator<Item = &Identity> {
        let mut sorted: Vec<&Identity> = self.members.iter().collect();
        sorted.sort();
        sorted.into_iter()
    }
}

fn parse_members(contents: &str) -> HashSet<Identity> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(Identity::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryStore;
    use crate::storage::TextFileStore;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn memory_backed(contents: Option<&str>) -> (MembershipStore, Arc<MemoryStore>) {
        let backing = Arc::new(match contents {
            Some(contents) => MemoryStore::with_contents(contents),
            None => MemoryStore::default(),
        });
        (MembershipStore::new(Box::new(backing.clone())), backing)
    }

    fn sorted(store: &MembershipStore) -> Vec<String> {
        store.iter_sorted().map(|i| i.to_string()).collect()
    }

    #[test]
    fn test_load_trims_and_drops_blank_lines() {
        let (mut store, _) = memory_backed(Some("76500001\n\n  76500002  \n"));

        assert_eq!(store.load().unwrap(), 2);
        assert_eq!(sorted(&store), vec!["76500001", "76500002"]);
    }

    #[test]
    fn test_load_tolerates_crlf_and_whitespace_only_lines() {
        let (mut store, _) = memory_backed(Some("a\r\n \t \r\nb\r\n\r\n"));

        store.load().unwrap();
        assert_eq!(sorted(&store), vec!["a", "b"]);
        assert!(!store.contains(""));
    }

    #[test]
    fn test_load_collapses_duplicates() {
        let (mut store, _) = memory_backed(Some("a\na\n a \n"));

        assert_eq!(store.load().unwrap(), 1);
    }

    #[test]
    fn test_load_creates_missing_store() {
        let (mut store, backing) = memory_backed(None);

        assert_eq!(store.load().unwrap(), 0);
        assert!(store.is_empty());
        assert_eq!(backing.contents().as_deref(), Some(""));
    }

    #[test]
    fn test_load_replaces_previous_contents() {
        let (mut store, backing) = memory_backed(Some("a\nb\n"));
        store.load().unwrap();

        backing.set_contents("c\n");
        store.load().unwrap();

        assert_eq!(sorted(&store), vec!["c"]);
    }

    #[test]
    fn test_load_is_idempotent() {
        let (mut store, _) = memory_backed(Some("x\ny\nz\n"));

        store.load().unwrap();
        let first = sorted(&store);
        store.load().unwrap();

        assert_eq!(first, sorted(&store));
    }

    #[test]
    fn test_failed_load_keeps_previous_set() {
        let (mut store, backing) = memory_backed(Some("a\nb\n"));
        store.load().unwrap();

        backing.set_contents("c\n");
        backing.fail_reads(true);

        assert!(store.load().is_err());
        assert_eq!(sorted(&store), vec!["a", "b"]);
    }

    #[test]
    fn test_add_and_remove() {
        let (mut store, backing) = memory_backed(None);
        store.load().unwrap();

        assert!(store.add(Identity::from("76500001")).unwrap());
        assert!(store.contains("76500001"));
        assert_eq!(backing.contents().as_deref(), Some("76500001\n"));

        assert!(store.remove("76500001").unwrap());
        assert!(!store.contains("76500001"));
        assert_eq!(backing.contents().as_deref(), Some(""));
    }

    #[test]
    fn test_add_is_idempotent() {
        let (mut store, backing) = memory_backed(None);
        store.load().unwrap();

        assert!(store.add(Identity::from("a")).unwrap());
        backing.fail_writes(true);

        // Second add must not even try to persist
        assert!(!store.add(Identity::from("a")).unwrap());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_remove_missing_identity() {
        let (mut store, backing) = memory_backed(Some("a\n"));
        store.load().unwrap();
        backing.fail_writes(true);

        assert!(!store.remove("b").unwrap());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_failed_persist_rolls_back_mutations() {
        let (mut store, backing) = memory_backed(Some("a\n"));
        store.load().unwrap();
        backing.fail_writes(true);

        assert!(store.add(Identity::from("b")).is_err());
        assert!(!store.contains("b"));

        assert!(store.remove("a").is_err());
        assert!(store.contains("a"));
    }

    #[test]
    fn test_blank_identities_are_never_members() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("whitelist.txt");
        let mut store = MembershipStore::new(Box::new(TextFileStore::new(&path)));
        store.load().unwrap();

        assert!(!store.add(Identity::from("")).unwrap());
        assert!(!store.add(Identity::from("   ")).unwrap());
        assert!(!store.add(Identity::from("\t")).unwrap());

        assert!(store.is_empty());
        assert!(!store.contains(""));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");

        store.load().unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_blank_add_does_not_persist() {
        let (mut store, backing) = memory_backed(Some("a\n"));
        store.load().unwrap();
        backing.fail_writes(true);

        assert!(!store.add(Identity::from(" ")).unwrap());
        assert_eq!(sorted(&store), vec!["a"]);
    }

    #[test]
    fn test_identity_stored_verbatim() {
        let (mut store, _) = memory_backed(None);
        store.load().unwrap();

        store.add(Identity::from(" padded ")).unwrap();
        assert!(store.contains(" padded "));
        assert!(!store.contains("padded"));
    }

    #[test]
    fn test_persist_then_load_round_trip_on_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("whitelist.txt");

        let mut writer = MembershipStore::new(Box::new(TextFileStore::new(&path)));
        writer.load().unwrap();
        for id in ["76500003", "76500001", "76500002"] {
            writer.add(Identity::from(id)).unwrap();
        }

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "76500001\n76500002\n76500003\n"
        );

        let mut reader = MembershipStore::new(Box::new(TextFileStore::new(&path)));
        reader.load().unwrap();
        assert_eq!(sorted(&reader), sorted(&writer));
    }
}
