//! Page widgets whose state lives on the server between requests.

pub mod menu;
pub mod panel;

use std::sync::{Mutex, PoisonError};

pub use menu::{MenuEvent, MenuMarkers, MobileMenu};
pub use panel::{AutoOpenPolicy, CartPanel, PanelAction};

/// The widgets of one visitor's page.
#[derive(Debug)]
pub struct PageWidgets {
    pub panel: CartPanel,
    menu: Mutex<MobileMenu>,
}

impl PageWidgets {
    #[must_use]
    pub fn new(policy: AutoOpenPolicy) -> Self {
        Self {
            panel: CartPanel::new(policy),
            menu: Mutex::new(MobileMenu::new()),
        }
    }

    /// Current menu state.
    #[must_use]
    pub fn menu(&self) -> MobileMenu {
        *self.menu.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply a menu event and return the new state.
    pub fn apply_menu(&self, event: MenuEvent) -> MobileMenu {
        let mut menu = self.menu.lock().unwrap_or_else(PoisonError::into_inner);
        menu.apply(event);
        *menu
    }
}
