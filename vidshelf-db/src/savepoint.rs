//! Mapping of caller-chosen savepoint names onto generated engine names.
//!
//! Only generated names (`Savepoint00001`, `Savepoint00002`, ...) ever reach
//! the SQL text, so any string is a valid caller name.

/// Caller name to internal name mapping for one transaction.
///
/// Entries are kept in creation order. The engine invalidates every savepoint
/// created after the one being released or rolled back, and the namespace
/// mirrors that by truncating its stack at the matching entry.
#[derive(Debug)]
pub struct SavepointNamespace {
    next: u32,
    stack: Vec<(String, String)>,
}

impl Default for SavepointNamespace {
    fn default() -> Self {
        Self::new()
    }
}

impl SavepointNamespace {
    pub fn new() -> Self {
        Self {
            next: 1,
            stack: Vec::new(),
        }
    }

    /// Generate the next internal name without registering it.
    pub fn allocate(&mut self) -> String {
        let name = format!("Savepoint{:05}", self.next);
        self.next = self.next.wrapping_add(1);
        name
    }

    /// Register `internal` under the caller's `name`. A name that is already
    /// registered is shadowed until the newer entry goes away.
    pub fn push(&mut self, name: &str, internal: String) {
        self.stack.push((name.to_string(), internal));
    }

    /// Find the most recent entry for `name`, returning its stack position
    /// and internal name.
    pub fn lookup(&self, name: &str) -> Option<(usize, &str)> {
        self.stack
            .iter()
            .enumerate()
            .rev()
            .find(|(_, (caller, _))| caller == name)
            .map(|(index, (_, internal))| (index, internal.as_str()))
    }

    /// Drop the entry at `index` and every entry created after it.
    pub fn unregister(&mut self, index: usize) {
        self.stack.truncate(index);
    }

    /// Forget every entry and restart the counter.
    pub fn reset(&mut self) {
        self.next = 1;
        self.stack.clear();
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(ns: &mut SavepointNamespace, name: &str) -> String {
        let internal = ns.allocate();
        ns.push(name, internal.clone());
        internal
    }

    #[test]
    fn internal_names_are_fixed_width_and_increasing() {
        let mut ns = SavepointNamespace::new();
        assert_eq!(ns.allocate(), "Savepoint00001");
        assert_eq!(ns.allocate(), "Savepoint00002");
    }

    #[test]
    fn caller_names_never_reach_internal_names() {
        let mut ns = SavepointNamespace::new();
        let internal = register(&mut ns, "x\"; DROP TABLE file; --");
        assert_eq!(internal, "Savepoint00001");
        assert_eq!(ns.lookup("x\"; DROP TABLE file; --"), Some((0, "Savepoint00001")));
    }

    #[test]
    fn unknown_name_is_not_found() {
        let ns = SavepointNamespace::new();
        assert_eq!(ns.lookup("missing"), None);
    }

    #[test]
    fn unregister_drops_later_entries() {
        let mut ns = SavepointNamespace::new();
        register(&mut ns, "a");
        register(&mut ns, "b");
        register(&mut ns, "c");

        let (index, _) = ns.lookup("b").unwrap();
        ns.unregister(index);

        assert!(ns.lookup("a").is_some());
        assert!(ns.lookup("b").is_none());
        assert!(ns.lookup("c").is_none());
        assert_eq!(ns.len(), 1);
    }

    #[test]
    fn duplicate_name_shadows_older_entry() {
        let mut ns = SavepointNamespace::new();
        register(&mut ns, "a");
        register(&mut ns, "a");
        assert_eq!(ns.lookup("a"), Some((1, "Savepoint00002")));

        ns.unregister(1);
        assert_eq!(ns.lookup("a"), Some((0, "Savepoint00001")));
    }

    #[test]
    fn reset_restarts_counter() {
        let mut ns = SavepointNamespace::new();
        register(&mut ns, "a");
        register(&mut ns, "b");
        ns.reset();
        assert!(ns.is_empty());
        assert!(ns.lookup("a").is_none());
        assert_eq!(ns.allocate(), "Savepoint00001");
    }

    #[test]
    fn counter_wraps_instead_of_overflowing() {
        let mut ns = SavepointNamespace::new();
        ns.next = u32::MAX;
        assert_eq!(ns.allocate(), format!("Savepoint{}", u32::MAX));
        assert_eq!(ns.allocate(), "Savepoint00000");
    }
}
