use crate::models::view::ViewMode;

/// Handle returned by [`ViewPreferenceStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn Fn(ViewMode) + Send + Sync>;

/// Session-wide display density preference.
///
/// Owned by the caller and passed by reference to whatever renders funds;
/// there is no global instance. Writes are applied and broadcast
/// synchronously, so the next read always sees the new value.
pub struct ViewPreferenceStore {
    mode: ViewMode,
    revision: u64,
    next_listener: u64,
    listeners: Vec<(ListenerId, Listener)>,
}

impl std::fmt::Debug for ViewPreferenceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewPreferenceStore")
            .field("mode", &self.mode)
            .field("revision", &self.revision)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl ViewPreferenceStore {
    pub fn new() -> Self {
        Self::with_mode(ViewMode::default())
    }

    pub fn with_mode(mode: ViewMode) -> Self {
        Self {
            mode,
            revision: 0,
            next_listener: 0,
            listeners: Vec::new(),
        }
    }

    #[must_use]
    pub fn get(&self) -> ViewMode {
        self.mode
    }

    /// Number of effective changes so far. Renderers can compare it with the
    /// revision they last drew to detect staleness.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Set the mode. Setting the current value again is a no-op.
    /// Returns `true` if the value changed.
    pub fn set(&mut self, mode: ViewMode) -> bool {
        if self.mode == mode {
            return false;
        }
        self.mode = mode;
        self.revision += 1;
        tracing::debug!(%mode, revision = self.revision, "view mode changed");
        for (_, listener) in &self.listeners {
            listener(mode);
        }
        true
    }

    /// Flip between simple and advanced. Returns the new mode.
    pub fn toggle(&mut self) -> ViewMode {
        let next = self.mode.toggled();
        self.set(next);
        next
    }

    /// Register a callback invoked with the new mode after every change.
    pub fn subscribe(&mut self, listener: impl Fn(ViewMode) + Send + Sync + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns `false` if it was already gone.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }
}

impl Default for ViewPreferenceStore {
    fn default() -> Self {
        Self::new()
    }
}
