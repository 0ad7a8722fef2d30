//! Selection state shared between the side panel and the map.

use std::fmt;

use cartroute_core::{RouteId, StoreId};

use crate::phase::Phase;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Store,
    Route,
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tab::Store => f.write_str("store"),
            Tab::Route => f.write_str("route"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionState {
    pub selected_store: Option<StoreId>,
    pub selected_route: Option<RouteId>,
    pub active_tab: Tab,
    pub sidebar_collapsed: bool,
}

impl SelectionState {
    /// A store marker was clicked. Only jumps back to the store tab when the
    /// route tab is showing during planning.
    pub fn store_clicked(&mut self, store: StoreId, phase: Phase) {
        self.selected_store = Some(store);
        if phase == Phase::Planning && self.active_tab == Tab::Route {
            self.active_tab = Tab::Store;
        }
    }

    /// A route path was clicked.
    pub fn route_clicked(&mut self, route: RouteId) {
        self.selected_route = Some(route);
        self.active_tab = Tab::Route;
        self.sidebar_collapsed = false;
    }

    /// Switches tabs without touching either selection. Discovery has only
    /// the store tab; returns `false` when the switch is refused.
    pub fn select_tab(&mut self, tab: Tab, phase: Phase) -> bool {
        if phase == Phase::Discovery && tab == Tab::Route {
            return false;
        }
        self.active_tab = tab;
        true
    }

    pub fn toggle_collapsed(&mut self) {
        self.sidebar_collapsed = !self.sidebar_collapsed;
    }

    /// Reset applied when planning is abandoned.
    pub fn clear_for_discovery(&mut self) {
        self.selected_store = None;
        self.selected_route = None;
        self.active_tab = Tab::Store;
    }
}
