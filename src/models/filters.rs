use serde::{Deserialize, Serialize};

use super::property::{PropertyType, TransactionType};

/// Storage-room filter. The empty string is the "indifferent" sentinel the
/// filter dialog persists when the user picks neither option.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageRoomFilter {
    #[default]
    #[serde(rename = "")]
    Indifferent,
    Si,
    No,
}

/// Sparse record of optional predicates. Zero and empty values are
/// sentinels meaning the predicate is inactive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterSet {
    pub bedrooms: u32,
    /// 5 is open-ended: "5 or more".
    pub bathrooms: u32,
    pub square_meters: f64,
    pub lower_price_range: f64,
    pub upper_price_range: f64,
    #[serde(rename = "type")]
    pub property_type: Option<PropertyType>,
    pub transaction: Option<TransactionType>,
    pub parking_spaces: u32,
    pub storage_room: StorageRoomFilter,
}

impl FilterSet {
    /// Number of currently-active predicates, shown on the filter badge.
    pub fn active_count(&self) -> usize {
        let mut count = 0;
        if self.bedrooms > 0 {
            count += 1;
        }
        if self.bathrooms > 0 {
            count += 1;
        }
        if self.square_meters > 0.0 {
            count += 1;
        }
        if self.lower_price_range > 0.0 {
            count += 1;
        }
        if self.upper_price_range > 0.0 {
            count += 1;
        }
        if self.property_type.is_some() {
            count += 1;
        }
        if self.transaction.is_some() {
            count += 1;
        }
        if self.parking_spaces > 0 {
            count += 1;
        }
        if self.storage_room != StorageRoomFilter::Indifferent {
            count += 1;
        }
        count
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
    SqmAsc,
    SqmDesc,
}
