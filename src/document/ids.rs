/// Hands out document-unique ids of the form `<prefix>-<n>`.
///
/// The counter only ever grows; ids are never reused within a process, even
/// after the object they named is deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdGenerator {
    next: u64,
}

impl Default for IdGenerator {
    fn default() -> Self {
        IdGenerator { next: 1 }
    }
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self, prefix: &str) -> String {
        let n = self.next;
        self.next += 1;
        format!("{prefix}-{n}")
    }

    /// Move the counter past an id that came from outside (an imported
    /// document), so later ids cannot collide with it.
    pub fn observe(&mut self, id: &str) {
        let suffix = id.rsplit('-').next().and_then(|n| n.parse::<u64>().ok());
        if let Some(n) = suffix {
            self.next = self.next.max(n.saturating_add(1));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_monotonic() {
        let mut ids = IdGenerator::new();
        assert_eq!(ids.next_id("ent"), "ent-1");
        assert_eq!(ids.next_id("aoe"), "aoe-2");
    }

    #[test]
    fn observing_foreign_ids_skips_past_them() {
        let mut ids = IdGenerator::new();
        ids.observe("ent-41");
        ids.observe("custom");
        ids.observe("aoe-3");
        assert_eq!(ids.next_id("act"), "act-42");
    }
}
