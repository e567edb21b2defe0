use lazy_static::lazy_static;
use regex::Regex;

use crate::models::filters::{FilterSet, SortOrder, StorageRoomFilter};
use crate::models::property::Property;

lazy_static! {
    static ref NON_DIGITS: Regex = Regex::new(r"[^0-9]").unwrap();
}

/// Numeric suffix of a listing id ("A-000042" -> 42). Ids without any
/// digits sort as 0.
pub fn id_sequence(id: &str) -> u64 {
    NON_DIGITS.replace_all(id, "").parse().unwrap_or(0)
}

/// A property passes when it satisfies every active predicate. Inactive
/// predicates (zero/empty sentinels) impose no constraint.
pub fn matches_filters(property: &Property, filters: &FilterSet) -> bool {
    if filters.bedrooms > 0 && property.bedrooms != filters.bedrooms {
        return false;
    }
    if filters.bathrooms > 0 {
        // 5 is the open-ended option on the dialog: five or more.
        if filters.bathrooms == 5 {
            if property.bathrooms < 5 {
                return false;
            }
        } else if property.bathrooms != filters.bathrooms {
            return false;
        }
    }
    if filters.square_meters > 0.0 && property.square_meters != filters.square_meters {
        return false;
    }
    if filters.lower_price_range > 0.0 && property.price < filters.lower_price_range {
        return false;
    }
    if filters.upper_price_range > 0.0 && property.price > filters.upper_price_range {
        return false;
    }
    if let Some(wanted) = filters.property_type {
        if property.property_type != wanted {
            return false;
        }
    }
    if let Some(wanted) = filters.transaction {
        if property.transaction != wanted {
            return false;
        }
    }
    if filters.parking_spaces > 0 && property.parking_spaces.unwrap_or(0) != filters.parking_spaces
    {
        return false;
    }
    match filters.storage_room {
        StorageRoomFilter::Indifferent => {}
        StorageRoomFilter::Si => {
            if property.storage_room != Some(true) {
                return false;
            }
        }
        StorageRoomFilter::No => {
            if property.storage_room.unwrap_or(false) {
                return false;
            }
        }
    }
    true
}

pub fn apply_filters(properties: &[Property], filters: &FilterSet) -> Vec<Property> {
    properties
        .iter()
        .filter(|property| matches_filters(property, filters))
        .cloned()
        .collect()
}

fn matches_search(property: &Property, needle: &str) -> bool {
    if property.address.to_lowercase().contains(needle) {
        return true;
    }
    if property.property_type.label().to_lowercase().contains(needle) {
        return true;
    }
    match &property.description {
        Some(description) => description.to_lowercase().contains(needle),
        None => false,
    }
}

/// Case-insensitive substring match over address, type and description.
/// An empty search passes everything through.
pub fn apply_search(properties: &[Property], search: &str) -> Vec<Property> {
    if search.is_empty() {
        return properties.to_vec();
    }
    let needle = search.to_lowercase();
    properties
        .iter()
        .filter(|property| matches_search(property, &needle))
        .cloned()
        .collect()
}

/// Stable sort by the selected key.
pub fn apply_sort(mut properties: Vec<Property>, order: SortOrder) -> Vec<Property> {
    match order {
        SortOrder::Newest => {
            properties.sort_by_key(|property| std::cmp::Reverse(id_sequence(&property.id)))
        }
        SortOrder::PriceAsc => properties.sort_by(|a, b| a.price.total_cmp(&b.price)),
        SortOrder::PriceDesc => properties.sort_by(|a, b| b.price.total_cmp(&a.price)),
        SortOrder::SqmAsc => {
            properties.sort_by(|a, b| a.square_meters.total_cmp(&b.square_meters))
        }
        SortOrder::SqmDesc => {
            properties.sort_by(|a, b| b.square_meters.total_cmp(&a.square_meters))
        }
    }
    properties
}

/// The displayed list as a pure function of the full collection, the filter
/// set, the search text and the sort order. Always recomputed from the full
/// source, never incrementally.
pub fn derive_view(
    properties: &[Property],
    filters: &FilterSet,
    search: &str,
    order: SortOrder,
) -> Vec<Property> {
    let filtered = apply_filters(properties, filters);
    let searched = apply_search(&filtered, search);
    apply_sort(searched, order)
}
