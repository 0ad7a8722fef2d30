//! Conversion between backend wire types and `cartroute_core` domain types.

use cartroute_core::{
    GeoPosition, ItemMatch, ProductCandidate, RouteCandidate, RouteId, StoreId, StoreResult,
    Waypoint,
};

use crate::types::{
    PlanCandidateBody, PlanItemBody, PlanRequestBody, PlanStoreBody, RawCandidate, RawItem,
    RawPlan, RawStore,
};

/// Normalizes every raw store, skipping those that cannot be placed on a map.
#[must_use]
pub fn normalize_stores(raw: Vec<RawStore>) -> Vec<StoreResult> {
    raw.into_iter()
        .enumerate()
        .filter_map(|(index, store)| normalize_store(index, store))
        .collect()
}

/// Converts one raw store. Returns `None` (with a warning) when the store has
/// no usable coordinates.
///
/// Stores without a backend id get a positional fallback id so markers stay
/// addressable.
#[must_use]
pub fn normalize_store(index: usize, raw: RawStore) -> Option<StoreResult> {
    let name = raw
        .name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| format!("Store {}", index + 1));

    let (Some(lat), Some(lng)) = (raw.lat, raw.lng) else {
        tracing::warn!(store = %name, "skipping store without coordinates");
        return None;
    };
    let position = GeoPosition::new(lat, lng);
    if !position.is_valid() {
        tracing::warn!(store = %name, %position, "skipping store with out-of-range coordinates");
        return None;
    }

    let id = raw
        .id
        .map_or_else(|| format!("store-{index}"), |id| id.as_str().to_string());

    Some(StoreResult {
        id: StoreId(id),
        name,
        address: raw.address.unwrap_or_default(),
        position,
        items: raw.items.into_iter().filter_map(normalize_item).collect(),
    })
}

fn normalize_item(raw: RawItem) -> Option<ItemMatch> {
    let product_name = raw.product_name.filter(|n| !n.trim().is_empty())?;
    Some(ItemMatch {
        product_name,
        requested_quantity: raw.quantity.unwrap_or(1.0),
        unit: raw.unit,
        candidates: raw
            .candidates
            .into_iter()
            .filter_map(normalize_candidate)
            .collect(),
    })
}

fn normalize_candidate(raw: RawCandidate) -> Option<ProductCandidate> {
    let name = raw.name.filter(|n| !n.trim().is_empty())?;
    Some(ProductCandidate {
        id: raw.id,
        name,
        price: raw.price,
        unit: raw.unit,
        category: raw.category,
        image_ref: raw.img_url,
    })
}

/// Builds the planning request body from discovered stores.
#[must_use]
pub fn plan_request_body(stores: &[StoreResult], origin: GeoPosition) -> PlanRequestBody {
    let stores = stores
        .iter()
        .map(|store| PlanStoreBody {
            address: store.address.clone(),
            lat: store.position.lat,
            lng: store.position.lng,
            items: store
                .items
                .iter()
                .map(|item| PlanItemBody {
                    product_name: item.product_name.clone(),
                    quantity: item.requested_quantity,
                    unit: item.unit.clone(),
                    candidates: item
                        .candidates
                        .iter()
                        .map(|c| PlanCandidateBody {
                            id: c.id.clone(),
                            name: c.name.clone(),
                            price: c.price.unwrap_or(0.0),
                            unit: c.unit.clone(),
                        })
                        .collect(),
                })
                .collect(),
        })
        .collect();

    PlanRequestBody {
        stores,
        user_loc: [origin.lat, origin.lng],
    }
}

/// Normalizes the planning response, preserving its order.
#[must_use]
pub fn normalize_plans(raw: Vec<RawPlan>) -> Vec<RouteCandidate> {
    raw.into_iter()
        .enumerate()
        .map(|(index, plan)| normalize_plan(index, plan))
        .collect()
}

/// Converts one raw plan into a [`RouteCandidate`].
///
/// Waypoints come from `coordinates` when present (the first one is the
/// user's start position), otherwise from the address list.
#[must_use]
pub fn normalize_plan(index: usize, raw: RawPlan) -> RouteCandidate {
    #[allow(clippy::cast_possible_truncation)]
    let fallback_id = index as u32;
    let id = RouteId(raw.id.unwrap_or(fallback_id));

    let ordered_waypoints = if raw.coordinates.is_empty() {
        raw.waypoints
            .iter()
            .map(|address| Waypoint::Address(address.clone()))
            .collect()
    } else {
        raw.coordinates
            .iter()
            .map(|[lat, lng]| Waypoint::Position(GeoPosition::new(*lat, *lng)))
            .collect()
    };

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let duration_minutes = raw.duration.unwrap_or(0.0).max(0.0).round() as u32;

    RouteCandidate {
        id,
        ordered_waypoints,
        stop_labels: raw.waypoints,
        distance_km: raw.distance.unwrap_or(0.0),
        duration_minutes,
        cost: raw.cost.unwrap_or(0.0),
        error_message: raw.error_message.filter(|m| !m.trim().is_empty()),
    }
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
