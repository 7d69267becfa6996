use crate::models::{CategoryFilter, Listing, Preference};

/// Decide whether a new listing matches a user's stored preferences
///
/// Pure and total: missing optional fields mean "no constraint on that
/// axis", never an error. Short-circuits at the first failed condition;
/// callers must not rely on evaluation order beyond the eligibility gate.
#[inline]
pub fn matches_listing(pref: &Preference, listing: &Listing) -> bool {
    // Eligibility gate: users without a delivery token or housing type
    // never finished subscribing and are skipped before any filter runs.
    if pref.delivery_token.is_none() {
        return false;
    }
    let category = match &pref.category {
        Some(c) => c,
        None => return false,
    };

    if listing.kind != category.housing_type() {
        return false;
    }

    if !matches_universal(pref, listing) {
        return false;
    }

    matches_category(category, listing)
}

/// Universal filters applied to every housing category
#[inline]
fn matches_universal(pref: &Preference, listing: &Listing) -> bool {
    // Case-insensitive exact match; fuzzy location search is out of scope
    if let Some(location) = &pref.location {
        if location.to_lowercase() != listing.location.to_lowercase() {
            return false;
        }
    }

    // Budget bounds are inclusive on both ends
    if let Some(min) = pref.min_budget {
        if listing.price < min {
            return false;
        }
    }
    if let Some(max) = pref.max_budget {
        if listing.price > max {
            return false;
        }
    }

    // Bedrooms and bathrooms are minimum thresholds, not exact matches
    if let Some(min) = pref.min_bedrooms {
        if listing.bedrooms < min {
            return false;
        }
    }
    if let Some(min) = pref.min_bathrooms {
        if listing.bathrooms < min {
            return false;
        }
    }

    true
}

/// Category-specific filters, dispatched on the preference's housing type
#[inline]
fn matches_category(category: &CategoryFilter, listing: &Listing) -> bool {
    match category {
        CategoryFilter::Permanent { house_type } => {
            if let Some(wanted) = house_type {
                if listing.house_type.as_deref() != Some(wanted.as_str()) {
                    return false;
                }
            }
            true
        }
        CategoryFilter::Rental {
            self_contained,
            fenced,
        } => {
            // Equality is enforced only when both sides define the field: a
            // listing that omits selfContained or fenced passes a preference
            // that sets it. Intentional policy carried over from the app's
            // original matching rules, not a gap to tighten.
            if let (Some(want), Some(have)) = (*self_contained, listing.self_contained) {
                if want != have {
                    return false;
                }
            }
            if let (Some(want), Some(have)) = (*fenced, listing.fenced) {
                if want != have {
                    return false;
                }
            }
            true
        }
        CategoryFilter::Airbnb {
            min_guests,
            required_amenities,
        } => {
            // Guest capacity follows the same both-sides rule as the rental
            // booleans; when both are present the listing must accommodate
            // at least the requested head count.
            if let (Some(min), Some(capacity)) = (*min_guests, listing.guest_capacity) {
                if capacity < min {
                    return false;
                }
            }

            // Every amenity the user marked as required must be present and
            // true on the listing. A listing with no amenity map at all
            // fails any required amenity.
            if let Some(required) = required_amenities {
                for (amenity, wanted) in required {
                    if !*wanted {
                        continue;
                    }
                    let present = listing
                        .amenities
                        .as_ref()
                        .and_then(|a| a.get(amenity))
                        .copied()
                        .unwrap_or(false);
                    if !present {
                        return false;
                    }
                }
            }
            true
        }
    }
}
