//! Hamburger-style mobile navigation menu.
//!
//! Open state is shown by an `active` class on the hamburger icon, the menu
//! panel and its overlay, plus a `menu-open` class on `<body>` that locks page
//! scrolling. Nothing is persisted.

use serde::Deserialize;

/// Element ids of the menu markup.
pub mod dom {
    pub const HAMBURGER: &str = "hamburger";
    pub const MENU: &str = "mobileMenu";
    pub const OVERLAY: &str = "mobileMenuOverlay";
}

/// Class toggled on the icon, menu and overlay.
pub const ACTIVE_CLASS: &str = "active";

/// Class toggled on `<body>` while the menu is open.
pub const BODY_OPEN_CLASS: &str = "menu-open";

/// Interactions the menu reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MenuEvent {
    /// Hamburger icon click.
    Icon,
    /// Close button inside the menu.
    Close,
    Overlay,
    /// Any link inside the menu.
    Link,
    Escape,
}

/// Classes the page renders for the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuMarkers {
    pub hamburger: &'static str,
    pub menu: &'static str,
    pub overlay: &'static str,
    pub body: &'static str,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MobileMenu {
    open: bool,
}

impl MobileMenu {
    #[must_use]
    pub const fn new() -> Self {
        Self { open: false }
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.open
    }

    /// React to `event`. Returns whether the open state changed.
    pub fn apply(&mut self, event: MenuEvent) -> bool {
        let next = match event {
            MenuEvent::Icon => !self.open,
            MenuEvent::Close | MenuEvent::Overlay | MenuEvent::Link | MenuEvent::Escape => false,
        };
        let changed = next != self.open;
        self.open = next;
        changed
    }

    #[must_use]
    pub const fn markers(&self) -> MenuMarkers {
        if self.open {
            MenuMarkers {
                hamburger: ACTIVE_CLASS,
                menu: ACTIVE_CLASS,
                overlay: ACTIVE_CLASS,
                body: BODY_OPEN_CLASS,
            }
        } else {
            MenuMarkers {
                hamburger: "",
                menu: "",
                overlay: "",
                body: "",
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_icon_toggles() {
        let mut menu = MobileMenu::new();
        assert!(menu.apply(MenuEvent::Icon));
        assert!(menu.is_open());
        assert!(menu.apply(MenuEvent::Icon));
        assert!(!menu.is_open());
    }

    #[test]
    fn test_every_dismissal_closes() {
        for event in [
            MenuEvent::Close,
            MenuEvent::Overlay,
            MenuEvent::Link,
            MenuEvent::Escape,
        ] {
            let mut menu = MobileMenu::new();
            menu.apply(MenuEvent::Icon);
            assert!(menu.apply(event), "{event:?} should close the menu");
            assert!(!menu.is_open());
        }
    }

    #[test]
    fn test_escape_when_closed_is_noop() {
        let mut menu = MobileMenu::new();
        assert!(!menu.apply(MenuEvent::Escape));
        assert!(!menu.is_open());
    }

    #[test]
    fn test_markers_follow_state() {
        let mut menu = MobileMenu::new();
        assert_eq!(menu.markers().body, "");

        menu.apply(MenuEvent::Icon);
        let markers = menu.markers();
        assert_eq!(markers.hamburger, "active");
        assert_eq!(markers.menu, "active");
        assert_eq!(markers.overlay, "active");
        assert_eq!(markers.body, "menu-open");
    }
}
