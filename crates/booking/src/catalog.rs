//! Service catalog
//!
//! The fixed list of bookable service types. The catalog is a compile-time
//! constant: prices and units never change at runtime, and a deploy is the
//! only way to alter them.

use serde::{Deserialize, Serialize};

/// Native pricing unit of a catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceUnit {
    PerDay,
    PerHour,
    PerThreeHours,
    PerEvent,
}

impl PriceUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceUnit::PerDay => "per_day",
            PriceUnit::PerHour => "per_hour",
            PriceUnit::PerThreeHours => "per_3_hours",
            PriceUnit::PerEvent => "per_event",
        }
    }
}

/// Unit-conversion rule applied when a selection's duration unit differs
/// from the entry's native unit. Keyed per entry so a new rule is one new
/// variant plus one table cell, not another branch in the price function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionRule {
    /// Duration multiplies the base price as-is, whatever the unit.
    Linear,
    /// Native unit is a block of `block_hours` hours. A duration given in
    /// hours bills in whole blocks, partial blocks rounding up; a duration
    /// in any other unit is already a block count.
    HourlyBlocks { block_hours: u32 },
    /// Native unit is days. A duration given in weeks converts at 7 days
    /// per week; anything else is taken as days.
    WeeksToDays,
}

/// One entry in the service catalog.
#[derive(Debug, Clone, Copy)]
pub struct ServiceCatalogEntry {
    pub id: &'static str,
    pub display_name: &'static str,
    /// Base price in whole rupiah (minor currency units).
    pub base_price: i64,
    pub unit: PriceUnit,
    pub conversion: ConversionRule,
}

/// The complete catalog. Order is presentation order in the booking UI.
pub const SERVICE_CATALOG: &[ServiceCatalogEntry] = &[
    ServiceCatalogEntry {
        id: "chat",
        display_name: "Chat",
        base_price: 25_000,
        unit: PriceUnit::PerDay,
        conversion: ConversionRule::Linear,
    },
    ServiceCatalogEntry {
        id: "call",
        display_name: "Voice Call",
        base_price: 40_000,
        unit: PriceUnit::PerHour,
        conversion: ConversionRule::Linear,
    },
    ServiceCatalogEntry {
        id: "video-call",
        display_name: "Video Call",
        base_price: 65_000,
        unit: PriceUnit::PerHour,
        conversion: ConversionRule::Linear,
    },
    ServiceCatalogEntry {
        id: "rent-a-lover",
        display_name: "Rent a Lover",
        base_price: 85_000,
        unit: PriceUnit::PerDay,
        conversion: ConversionRule::WeeksToDays,
    },
    ServiceCatalogEntry {
        id: "offline-date",
        display_name: "Offline Date",
        base_price: 285_000,
        unit: PriceUnit::PerThreeHours,
        conversion: ConversionRule::HourlyBlocks { block_hours: 3 },
    },
    ServiceCatalogEntry {
        id: "party-buddy",
        display_name: "Party Buddy",
        base_price: 1_000_000,
        unit: PriceUnit::PerEvent,
        conversion: ConversionRule::Linear,
    },
];

/// Look up a catalog entry by service id.
pub fn catalog_entry(id: &str) -> Option<&'static ServiceCatalogEntry> {
    SERVICE_CATALOG.iter().find(|entry| entry.id == id)
}

/// Whether a service id exists in the catalog.
pub fn is_known_service(id: &str) -> bool {
    catalog_entry(id).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_six_services() {
        assert_eq!(SERVICE_CATALOG.len(), 6);
    }

    #[test]
    fn catalog_ids_are_unique() {
        for (i, a) in SERVICE_CATALOG.iter().enumerate() {
            for b in &SERVICE_CATALOG[i + 1..] {
                assert_ne!(a.id, b.id);
            }
        }
    }

    #[test]
    fn lookup_by_id() {
        let entry = catalog_entry("offline-date").unwrap();
        assert_eq!(entry.base_price, 285_000);
        assert_eq!(entry.unit, PriceUnit::PerThreeHours);
        assert!(catalog_entry("spa-day").is_none());
    }
}
