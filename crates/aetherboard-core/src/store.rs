//! Global workspace state with reducer-style updates.
//!
//! The store owns the theme, sidebar and module flags and the whiteboard
//! preferences. Every dispatched action goes through [`reduce`]; when the
//! state changes, subscribers are notified and the persisted subset is
//! written to the attached [`PreferenceStorage`].

use crate::config::{WhiteboardConfig, WhiteboardPreferences};
use crate::storage::{PreferenceStorage, StorageError, StorageResult};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Storage key of the persisted workspace state.
pub const WORKSPACE_STORAGE_KEY: &str = "aether-workspace";

/// Application theme; `System` follows the platform preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
    System,
}

impl Theme {
    /// Whether the dark palette applies, given the platform preference.
    pub fn is_dark(&self, system_prefers_dark: bool) -> bool {
        match self {
            Theme::Light => false,
            Theme::Dark => true,
            Theme::System => system_prefers_dark,
        }
    }
}

/// Workspace modules that can be enabled or disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleId {
    Docs,
    Tasks,
    Chat,
    Whiteboard,
    Analytics,
}

impl ModuleId {
    pub const ALL: [ModuleId; 5] = [
        ModuleId::Docs,
        ModuleId::Tasks,
        ModuleId::Chat,
        ModuleId::Whiteboard,
        ModuleId::Analytics,
    ];
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkspaceState {
    pub theme: Theme,
    pub sidebar_collapsed: bool,
    pub active_module: Option<ModuleId>,
    pub enabled_modules: Vec<ModuleId>,
    pub whiteboard: WhiteboardPreferences,
}

impl Default for WorkspaceState {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            sidebar_collapsed: false,
            active_module: None,
            enabled_modules: ModuleId::ALL.to_vec(),
            whiteboard: WhiteboardPreferences::default(),
        }
    }
}

impl WorkspaceState {
    pub fn is_enabled(&self, module: ModuleId) -> bool {
        self.enabled_modules.contains(&module)
    }

    /// Session config derived from the stored whiteboard preferences.
    pub fn whiteboard_config(&self) -> WhiteboardConfig {
        WhiteboardConfig::from_preferences(&self.whiteboard)
    }
}

/// The part of the state that survives restarts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct PersistedWorkspace {
    theme: Theme,
    sidebar_collapsed: bool,
    enabled_modules: Vec<ModuleId>,
    whiteboard: WhiteboardPreferences,
}

impl Default for PersistedWorkspace {
    fn default() -> Self {
        Self::from(&WorkspaceState::default())
    }
}

impl From<&WorkspaceState> for PersistedWorkspace {
    fn from(state: &WorkspaceState) -> Self {
        Self {
            theme: state.theme,
            sidebar_collapsed: state.sidebar_collapsed,
            enabled_modules: state.enabled_modules.clone(),
            whiteboard: state.whiteboard.clone(),
        }
    }
}

/// State transitions accepted by the store.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkspaceAction {
    SetTheme(Theme),
    SetSidebarCollapsed(bool),
    ToggleSidebar,
    SetActiveModule(Option<ModuleId>),
    /// Enable a disabled module or disable an enabled one.
    ToggleModule(ModuleId),
    SetWhiteboardPreferences(WhiteboardPreferences),
}

/// Pure transition function.
pub fn reduce(state: &WorkspaceState, action: &WorkspaceAction) -> WorkspaceState {
    let mut next = state.clone();
    match action {
        WorkspaceAction::SetTheme(theme) => next.theme = *theme,
        WorkspaceAction::SetSidebarCollapsed(collapsed) => next.sidebar_collapsed = *collapsed,
        WorkspaceAction::ToggleSidebar => next.sidebar_collapsed = !state.sidebar_collapsed,
        WorkspaceAction::SetActiveModule(module) => next.active_module = *module,
        WorkspaceAction::ToggleModule(module) => {
            if let Some(pos) = next.enabled_modules.iter().position(|m| m == module) {
                next.enabled_modules.remove(pos);
            } else {
                next.enabled_modules.push(*module);
            }
        }
        WorkspaceAction::SetWhiteboardPreferences(prefs) => next.whiteboard = prefs.clone(),
    }
    next
}

type Subscriber = Box<dyn FnMut(&WorkspaceState) + Send>;

/// Handle returned by [`WorkspaceStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

/// Owner of the workspace state.
pub struct WorkspaceStore {
    state: WorkspaceState,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
    storage: Option<Arc<dyn PreferenceStorage>>,
}

impl Default for WorkspaceStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for WorkspaceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkspaceStore")
            .field("state", &self.state)
            .field("subscribers", &self.subscribers.len())
            .field("persistent", &self.storage.is_some())
            .finish()
    }
}

impl WorkspaceStore {
    /// A store with default state and no persistence.
    pub fn new() -> Self {
        Self {
            state: WorkspaceState::default(),
            subscribers: Vec::new(),
            next_subscription: 0,
            storage: None,
        }
    }

    /// A store backed by `storage`, restoring any previously saved state.
    ///
    /// A missing entry yields the defaults; other storage failures and
    /// unreadable entries are returned.
    pub fn with_storage(storage: Arc<dyn PreferenceStorage>) -> StorageResult<Self> {
        let mut store = Self::new();
        match storage.load(WORKSPACE_STORAGE_KEY) {
            Ok(json) => {
                let persisted: PersistedWorkspace = serde_json::from_str(&json)
                    .map_err(|e| StorageError::Serialization(e.to_string()))?;
                store.state.theme = persisted.theme;
                store.state.sidebar_collapsed = persisted.sidebar_collapsed;
                store.state.enabled_modules = persisted.enabled_modules;
                store.state.whiteboard = persisted.whiteboard;
                debug!("restored workspace state");
            }
            Err(StorageError::NotFound(_)) => {}
            Err(e) => return Err(e),
        }
        store.storage = Some(storage);
        Ok(store)
    }

    pub fn state(&self) -> &WorkspaceState {
        &self.state
    }

    /// Apply an action. Subscribers run and state is persisted only when
    /// the action actually changed something.
    pub fn dispatch(&mut self, action: WorkspaceAction) {
        let next = reduce(&self.state, &action);
        if next == self.state {
            return;
        }
        debug!("workspace action {:?}", action);
        let persisted_changed = PersistedWorkspace::from(&next) != PersistedWorkspace::from(&self.state);
        self.state = next;
        if persisted_changed {
            self.persist();
        }
        for (_, subscriber) in &mut self.subscribers {
            subscriber(&self.state);
        }
    }

    pub fn subscribe(&mut self, subscriber: impl FnMut(&WorkspaceState) + Send + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(subscriber)));
        id
    }

    /// Remove a subscriber; returns false if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub, _)| *sub != id);
        self.subscribers.len() != before
    }

    fn persist(&self) {
        let Some(storage) = &self.storage else {
            return;
        };
        let result = serde_json::to_string(&PersistedWorkspace::from(&self.state))
            .map_err(|e| StorageError::Serialization(e.to_string()))
            .and_then(|json| storage.save(WORKSPACE_STORAGE_KEY, &json));
        if let Err(e) = result {
            warn!("failed to persist workspace state: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use std::sync::Mutex;

    #[test]
    fn test_reduce_toggles() {
        let state = WorkspaceState::default();
        let state = reduce(&state, &WorkspaceAction::ToggleSidebar);
        assert!(state.sidebar_collapsed);
        let state = reduce(&state, &WorkspaceAction::ToggleModule(ModuleId::Chat));
        assert!(!state.is_enabled(ModuleId::Chat));
        let state = reduce(&state, &WorkspaceAction::ToggleModule(ModuleId::Chat));
        assert!(state.is_enabled(ModuleId::Chat));
    }

    #[test]
    fn test_theme_resolution() {
        assert!(Theme::default().is_dark(false));
        assert!(!Theme::Light.is_dark(true));
        assert!(Theme::System.is_dark(true));
    }

    #[test]
    fn test_subscribers_notified_on_change_only() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut store = WorkspaceStore::new();
        let sink = Arc::clone(&seen);
        let id = store.subscribe(move |state| sink.lock().unwrap().push(state.theme));

        store.dispatch(WorkspaceAction::SetTheme(Theme::Light));
        store.dispatch(WorkspaceAction::SetTheme(Theme::Light));
        assert_eq!(*seen.lock().unwrap(), vec![Theme::Light]);

        assert!(store.unsubscribe(id));
        store.dispatch(WorkspaceAction::SetTheme(Theme::Dark));
        assert_eq!(seen.lock().unwrap().len(), 1);
        assert!(!store.unsubscribe(id));
    }

    #[test]
    fn test_persists_and_restores() {
        let storage: Arc<dyn PreferenceStorage> = Arc::new(MemoryStorage::new());
        let mut store = WorkspaceStore::with_storage(Arc::clone(&storage)).unwrap();
        store.dispatch(WorkspaceAction::SetTheme(Theme::System));
        store.dispatch(WorkspaceAction::SetActiveModule(Some(ModuleId::Whiteboard)));
        store.dispatch(WorkspaceAction::SetWhiteboardPreferences(WhiteboardPreferences {
            snap_to_grid: true,
            ..WhiteboardPreferences::default()
        }));

        let restored = WorkspaceStore::with_storage(storage).unwrap();
        assert_eq!(restored.state().theme, Theme::System);
        assert!(restored.state().whiteboard.snap_to_grid);
        assert!(restored.state().whiteboard_config().snap_to_grid);
        // The active module is session state and is not persisted.
        assert_eq!(restored.state().active_module, None);
    }

    #[test]
    fn test_corrupt_entry_is_an_error() {
        let storage = Arc::new(MemoryStorage::new());
        storage.save(WORKSPACE_STORAGE_KEY, "not json").unwrap();
        let result = WorkspaceStore::with_storage(storage);
        assert!(matches!(result, Err(StorageError::Serialization(_))));
    }
}
