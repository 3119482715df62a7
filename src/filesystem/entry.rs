use derive_more::{Display, From, Into};
use hashlink::LinkedHashMap;

/// Index of an [`Entry`] inside the [`FileTree`] that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, From, Into)]
#[display("#{_0}")]
pub struct EntryId(usize);

/// One file or directory of the reconstructed tree.
///
/// Sizes are taken from the listing as-is. Directories keep a size of 0,
/// ncdu sums up the children on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    name: String,
    size: i64,
    children: Vec<EntryId>,
}

impl Entry {
    pub fn from_path(path: &str, size: i64) -> Self {
        Self {
            name: base_name(path).to_string(),
            size,
            children: Vec::new(),
        }
    }

    pub fn directory(path: &str) -> Self {
        Self::from_path(path, 0)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> i64 {
        self.size
    }

    pub fn children(&self) -> &[EntryId] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn add_child(&mut self, child: EntryId) {
        self.children.push(child);
    }
}

/// Final `/`-separated component of `path`, or the whole path when it has no separator.
pub fn base_name(path: &str) -> &str {
    path.rsplit_once('/').map_or(path, |(_, name)| name)
}

/// `path` without its final component, empty for top-level paths.
pub fn parent_dir(path: &str) -> &str {
    path.rsplit_once('/').map_or("", |(parent, _)| parent)
}

/// Arena holding every entry of one run, the ordered root list and the path index.
///
/// Entries are only ever appended: an entry gets exactly one parent (or a
/// slot in the root list) at insertion time and keeps it.
#[derive(Debug, Clone, Default)]
pub struct FileTree {
    entries: Vec<Entry>,
    roots: Vec<EntryId>,
    index: LinkedHashMap<String, EntryId>,
}

impl FileTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn roots(&self) -> &[EntryId] {
        &self.roots
    }

    /// Panics if `id` was not handed out by this tree.
    pub fn entry(&self, id: EntryId) -> &Entry {
        &self.entries[id.0]
    }

    pub fn lookup(&self, path: &str) -> Option<EntryId> {
        self.index.get(path).copied()
    }

    pub fn contains_path(&self, path: &str) -> bool {
        self.index.contains_key(path)
    }

    /// Indexed paths in the order they were first registered.
    pub fn indexed_paths(&self) -> impl Iterator<Item = &str> {
        self.index.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Adds `entry` under `parent` (or to the root list) and registers it under `path`.
    pub(crate) fn insert_indexed(
        &mut self,
        path: &str,
        entry: Entry,
        parent: Option<EntryId>,
    ) -> EntryId {
        let id = self.insert(entry, parent);
        self.index.insert(path.to_string(), id);
        id
    }

    /// Adds `entry` without making it reachable through the path index.
    pub(crate) fn insert(&mut self, entry: Entry, parent: Option<EntryId>) -> EntryId {
        let id = EntryId(self.entries.len());
        self.entries.push(entry);
        match parent {
            Some(parent) => self.entries[parent.0].add_child(id),
            None => self.roots.push(id),
        }
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[rstest]
    #[case("a.txt", "a.txt", "")]
    #[case("home/user/a.txt", "a.txt", "home/user")]
    #[case("home", "home", "")]
    #[case("home/", "", "home")]
    #[case("a//b", "b", "a/")]
    #[case("", "", "")]
    fn splits_path_at_last_separator(
        #[case] path: &str,
        #[case] expected_name: &str,
        #[case] expected_parent: &str,
    ) {
        assert_eq!(base_name(path), expected_name);
        assert_eq!(parent_dir(path), expected_parent);
    }

    #[test]
    fn entry_from_path_keeps_declared_size() {
        let entry = Entry::from_path("var/log/syslog", 4096);
        assert_eq!(entry.name(), "syslog");
        assert_eq!(entry.size(), 4096);
        assert!(entry.is_leaf());
    }

    #[test]
    fn entry_size_is_not_validated() {
        let entry = Entry::from_path("weird", -17);
        assert_eq!(entry.size(), -17);
    }

    #[test]
    fn directory_entry_has_zero_size() {
        let entry = Entry::directory("var/log");
        assert_eq!(entry.name(), "log");
        assert_eq!(entry.size(), 0);
    }

    #[test]
    fn insert_attaches_to_parent_in_order() {
        let mut tree = FileTree::new();
        let root = tree.insert_indexed("etc", Entry::directory("etc"), None);
        let first = tree.insert(Entry::from_path("etc/hosts", 10), Some(root));
        let second = tree.insert(Entry::from_path("etc/fstab", 20), Some(root));

        assert_eq!(tree.roots(), &[root]);
        assert_eq!(tree.entry(root).children(), &[first, second]);
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.lookup("etc"), Some(root));
        assert_eq!(tree.lookup("etc/hosts"), None);
    }

    #[test]
    fn indexed_paths_keep_registration_order() {
        let mut tree = FileTree::new();
        tree.insert_indexed("b", Entry::directory("b"), None);
        tree.insert_indexed("a", Entry::directory("a"), None);

        assert_eq!(tree.indexed_paths().collect::<Vec<_>>(), vec!["b", "a"]);
    }

    #[test]
    fn entry_id_display() {
        assert_eq!(EntryId::from(3).to_string(), "#3");
    }
}
