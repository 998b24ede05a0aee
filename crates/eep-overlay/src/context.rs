//! Handles shared by the control layer, windows and tabs.

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::rc::Rc;

use eep_core::host::EventHost;
use eep_core::id::PlayerId;
use eep_core::widgets::UiContext;
use eep_data::{OverlayConfig, SettingsStore};

use crate::state::GlobalState;
use crate::stats::FlowStatistics;
use crate::window::MainWindow;

/// Everything a listener may need to reach. Clones share all handles.
#[derive(Clone)]
pub struct OverlayContext {
    pub ui: UiContext,
    pub host: Rc<dyn EventHost>,
    pub config: Rc<OverlayConfig>,
    pub stats: Rc<dyn FlowStatistics>,
    pub settings: Rc<RefCell<SettingsStore>>,
    pub state: Rc<RefCell<GlobalState>>,
    players: Rc<RefCell<BTreeSet<PlayerId>>>,
    pub(crate) windows: Rc<RefCell<HashMap<PlayerId, Rc<MainWindow>>>>,
}

impl fmt::Debug for OverlayContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverlayContext")
            .field("players", &self.players.borrow())
            .field("windows", &self.windows.borrow().len())
            .finish_non_exhaustive()
    }
}

impl OverlayContext {
    pub fn new(
        ui: UiContext,
        host: Rc<dyn EventHost>,
        config: OverlayConfig,
        stats: Rc<dyn FlowStatistics>,
    ) -> Self {
        let settings = config.settings_store();
        Self {
            ui,
            host,
            config: Rc::new(config),
            stats,
            settings: Rc::new(RefCell::new(settings)),
            state: Rc::new(RefCell::new(GlobalState::default())),
            players: Rc::new(RefCell::new(BTreeSet::new())),
            windows: Rc::new(RefCell::new(HashMap::new())),
        }
    }

    /// Replace the persisted state, e.g. after loading a save.
    pub fn with_state(self, state: GlobalState) -> Self {
        *self.state.borrow_mut() = state;
        self
    }

    /// Install host handlers for any channel that gained listeners.
    pub fn install(&self) -> usize {
        self.ui.events.install(&*self.host)
    }

    /// Register a player the game already knows about.
    pub fn add_player(&self, player: PlayerId) -> bool {
        self.players.borrow_mut().insert(player)
    }

    pub fn players(&self) -> Vec<PlayerId> {
        self.players.borrow().iter().copied().collect()
    }

    pub fn window(&self, player: PlayerId) -> Option<Rc<MainWindow>> {
        self.windows.borrow().get(&player).cloned()
    }
}
