// src/app/shortcuts.rs

/// What a global key binding asks the app to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShortcutAction {
    CloseDetail,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ShortcutId(u64);

/// Process-wide key listener table.
///
/// Owners register on open and must unregister on close; nothing here
/// expires on its own.
#[derive(Debug, Default)]
pub struct ShortcutRegistry {
    next_id: u64,
    bindings: Vec<(ShortcutId, String, ShortcutAction)>,
}

impl ShortcutRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, key: &str, action: ShortcutAction) -> ShortcutId {
        self.next_id += 1;
        let id = ShortcutId(self.next_id);
        self.bindings.push((id, key.to_ascii_lowercase(), action));
        id
    }

    pub fn unregister(&mut self, id: ShortcutId) -> bool {
        let before = self.bindings.len();
        self.bindings.retain(|(bid, _, _)| *bid != id);
        self.bindings.len() != before
    }

    /// Actions bound to `key` (case-insensitive), in registration order.
    pub fn dispatch(&self, key: &str) -> Vec<ShortcutAction> {
        let key = key.to_ascii_lowercase();
        self.bindings
            .iter()
            .filter(|(_, k, _)| *k == key)
            .map(|(_, _, action)| *action)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
