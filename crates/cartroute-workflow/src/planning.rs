//! Per-session state of the planning phase: candidates, their memoized
//! colors, and the hover/click emphasis that drives path styles.

use std::collections::HashMap;

use cartroute_core::{GeoPosition, RouteCandidate, RouteId, StoreResult};

use crate::error::PathResolutionError;
use crate::map::PathStyle;
use crate::services::{PathRequest, PathResolver, RoutePlanner};

/// Colors cycled by candidate index.
pub const ROUTE_PALETTE: [&str; 5] = ["#4285F4", "#FBBC05", "#A142F4", "#00ACC1", "#FF7043"];

/// Accent for the selected candidate, whatever its palette slot.
pub const SELECTED_ROUTE_COLOR: &str = "#00B14F";

const DEFAULT_WEIGHT: u32 = 5;
const DEFAULT_OPACITY: f64 = 0.7;
const DEFAULT_Z: i32 = 1;
const SELECTED_WEIGHT: u32 = 8;
const SELECTED_Z: i32 = 10;
const HOVER_EXTRA_WEIGHT: u32 = 3;
const HOVER_Z: i32 = 20;
const CLICK_FEEDBACK_EXTRA_WEIGHT: u32 = 4;

/// Transient and persistent emphasis applied on top of a route's base color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Emphasis {
    pub selected: bool,
    pub hovered: bool,
    pub click_feedback: bool,
}

#[must_use]
pub fn path_style(palette_color: &'static str, emphasis: Emphasis) -> PathStyle {
    let mut style = if emphasis.selected {
        PathStyle {
            color: SELECTED_ROUTE_COLOR,
            weight: SELECTED_WEIGHT,
            opacity: 1.0,
            z_index: SELECTED_Z,
        }
    } else {
        PathStyle {
            color: palette_color,
            weight: DEFAULT_WEIGHT,
            opacity: DEFAULT_OPACITY,
            z_index: DEFAULT_Z,
        }
    };
    if emphasis.hovered {
        style.weight += HOVER_EXTRA_WEIGHT;
        style.opacity = 1.0;
        style.z_index = HOVER_Z;
    }
    if emphasis.click_feedback {
        style.weight += CLICK_FEEDBACK_EXTRA_WEIGHT;
    }
    style
}

/// First-assignment-wins color memo, keyed by route id.
#[derive(Debug, Default)]
pub struct ColorMemo {
    colors: HashMap<RouteId, &'static str>,
}

impl ColorMemo {
    pub fn assign(&mut self, route: RouteId, index: usize) -> &'static str {
        *self
            .colors
            .entry(route)
            .or_insert(ROUTE_PALETTE[index % ROUTE_PALETTE.len()])
    }

    #[must_use]
    pub fn get(&self, route: RouteId) -> Option<&'static str> {
        self.colors.get(&route).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

/// Everything that lives exactly as long as one planning session.
#[derive(Debug, Default)]
pub struct PlanningSession {
    candidates: Vec<RouteCandidate>,
    colors: ColorMemo,
    hovered: Option<RouteId>,
    click_feedback: Option<(RouteId, u64)>,
}

impl PlanningSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the planner's candidates and assigns each drawable one its
    /// palette color by position.
    pub fn set_candidates(&mut self, candidates: Vec<RouteCandidate>) {
        for (index, candidate) in candidates.iter().enumerate() {
            if candidate.error_message.is_none() {
                self.colors.assign(candidate.id, index);
            }
        }
        self.candidates = candidates;
    }

    #[must_use]
    pub fn candidates(&self) -> &[RouteCandidate] {
        &self.candidates
    }

    #[must_use]
    pub fn contains(&self, route: RouteId) -> bool {
        self.candidates.iter().any(|c| c.id == route)
    }

    #[must_use]
    pub fn color(&self, route: RouteId) -> Option<&'static str> {
        self.colors.get(route)
    }

    #[must_use]
    pub fn hovered(&self) -> Option<RouteId> {
        self.hovered
    }

    pub fn hover_started(&mut self, route: RouteId) -> Option<RouteId> {
        self.hovered.replace(route).filter(|previous| *previous != route)
    }

    /// Returns `true` if `route` was the hovered one.
    pub fn hover_ended(&mut self, route: RouteId) -> bool {
        if self.hovered == Some(route) {
            self.hovered = None;
            true
        } else {
            false
        }
    }

    /// Starts click emphasis on `route`; returns the route that lost it.
    pub fn start_click_feedback(&mut self, route: RouteId, token: u64) -> Option<RouteId> {
        self.click_feedback
            .replace((route, token))
            .map(|(previous, _)| previous)
            .filter(|previous| *previous != route)
    }

    /// Ends click emphasis if `token` is still the latest one for `route`.
    pub fn end_click_feedback(&mut self, route: RouteId, token: u64) -> bool {
        if self.click_feedback == Some((route, token)) {
            self.click_feedback = None;
            true
        } else {
            false
        }
    }

    /// Current style of `route`, or `None` if it has no color in this session.
    #[must_use]
    pub fn style(&self, route: RouteId, selected: Option<RouteId>) -> Option<PathStyle> {
        let color = self.colors.get(route)?;
        Some(path_style(
            color,
            Emphasis {
                selected: selected == Some(route),
                hovered: self.hovered == Some(route),
                click_feedback: self.click_feedback.is_some_and(|(r, _)| r == route),
            },
        ))
    }
}

/// Asks the planner for candidates. A failed or empty plan becomes a single
/// sentinel candidate so the phase transition still completes.
pub async fn request_candidates(
    planner: &dyn RoutePlanner,
    stores: &[StoreResult],
    position: GeoPosition,
) -> Vec<RouteCandidate> {
    match planner.plan(stores, position).await {
        Ok(candidates) if candidates.is_empty() => {
            tracing::warn!(store_count = stores.len(), "planner returned no candidates");
            vec![RouteCandidate::sentinel("no route could be planned")]
        }
        Ok(candidates) => candidates,
        Err(e) => {
            tracing::warn!(error = %e, store_count = stores.len(), "route planning failed");
            vec![RouteCandidate::sentinel(e.message)]
        }
    }
}

/// Resolves one candidate's drawable path.
///
/// # Errors
///
/// Returns the resolver's [`PathResolutionError`], or
/// [`PathResolutionError::EmptyPath`] when it answers with no points.
pub async fn resolve_path(
    resolver: &dyn PathResolver,
    request: PathRequest,
) -> Result<Vec<GeoPosition>, PathResolutionError> {
    let path = resolver.resolve(&request).await?;
    if path.is_empty() {
        return Err(PathResolutionError::EmptyPath);
    }
    Ok(path)
}

#[cfg(test)]
#[path = "planning_test.rs"]
mod tests;
