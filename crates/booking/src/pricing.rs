//! Price calculation for booking selections
//!
//! Pure functions over the static catalog. A selection whose id is not in
//! the catalog prices at zero rather than erroring; callers that cannot
//! accept zero-priced line items validate ids before quoting (the booking
//! create path does).

use serde::{Deserialize, Serialize};

use crate::catalog::{catalog_entry, ConversionRule};

/// Unit the caller expressed a booking duration in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationUnit {
    Hours,
    Days,
    Weeks,
}

impl DurationUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            DurationUnit::Hours => "hours",
            DurationUnit::Days => "days",
            DurationUnit::Weeks => "weeks",
        }
    }

    pub fn parse_str(s: &str) -> Option<Self> {
        match s {
            "hours" => Some(DurationUnit::Hours),
            "days" => Some(DurationUnit::Days),
            "weeks" => Some(DurationUnit::Weeks),
            _ => None,
        }
    }
}

/// One service picked for a booking attempt. Transient; nothing here is
/// persisted until a transaction row is created from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceSelection {
    /// Catalog service id (e.g. "offline-date")
    pub id: String,
    /// Positive duration in `unit`
    pub duration: u32,
    pub unit: DurationUnit,
}

impl ServiceSelection {
    pub fn new(id: impl Into<String>, duration: u32, unit: DurationUnit) -> Self {
        Self {
            id: id.into(),
            duration,
            unit,
        }
    }
}

/// Duration multiplier for an entry's conversion rule.
///
/// A duration that is already in the entry's native unit passes through
/// unconverted; only the mismatched unit named by the rule converts.
fn duration_multiplier(rule: ConversionRule, duration: u32, unit: DurationUnit) -> i64 {
    let duration = i64::from(duration);
    match rule {
        ConversionRule::Linear => duration,
        ConversionRule::HourlyBlocks { block_hours } => {
            if unit == DurationUnit::Hours {
                // Partial blocks bill as whole blocks: a 4-hour booking
                // against a 3-hour block is 2 blocks.
                let block_hours = i64::from(block_hours);
                (duration + block_hours - 1) / block_hours
            } else {
                duration
            }
        }
        ConversionRule::WeeksToDays => {
            if unit == DurationUnit::Weeks {
                duration * 7
            } else {
                duration
            }
        }
    }
}

/// Price one selection in whole rupiah. Unknown ids price at zero.
pub fn calculate_service_price(selection: &ServiceSelection) -> i64 {
    let Some(entry) = catalog_entry(&selection.id) else {
        return 0;
    };
    let multiplier = duration_multiplier(entry.conversion, selection.duration, selection.unit);
    entry.base_price * multiplier
}

/// Total price of a selection list, summed in input order.
pub fn calculate_total_price(selections: &[ServiceSelection]) -> i64 {
    selections.iter().map(calculate_service_price).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_service_prices_at_zero() {
        let selection = ServiceSelection::new("massage", 2, DurationUnit::Hours);
        assert_eq!(calculate_service_price(&selection), 0);
    }

    #[test]
    fn chat_three_days() {
        let selection = ServiceSelection::new("chat", 3, DurationUnit::Days);
        assert_eq!(calculate_service_price(&selection), 75_000);
    }

    #[test]
    fn offline_date_rounds_partial_blocks_up() {
        // 4 hours against 3-hour blocks bills 2 blocks
        let selection = ServiceSelection::new("offline-date", 4, DurationUnit::Hours);
        assert_eq!(calculate_service_price(&selection), 570_000);
    }

    #[test]
    fn offline_date_native_blocks_pass_through() {
        // Duration not in hours is already a block count
        let selection = ServiceSelection::new("offline-date", 2, DurationUnit::Days);
        assert_eq!(calculate_service_price(&selection), 570_000);
    }

    #[test]
    fn rent_a_lover_converts_weeks_to_days() {
        let selection = ServiceSelection::new("rent-a-lover", 2, DurationUnit::Weeks);
        assert_eq!(calculate_service_price(&selection), 1_190_000);
    }

    #[test]
    fn rent_a_lover_days_unconverted() {
        let selection = ServiceSelection::new("rent-a-lover", 3, DurationUnit::Days);
        assert_eq!(calculate_service_price(&selection), 255_000);
    }

    #[test]
    fn empty_total_is_zero() {
        assert_eq!(calculate_total_price(&[]), 0);
    }

    #[test]
    fn total_is_order_independent() {
        let a = ServiceSelection::new("chat", 1, DurationUnit::Days);
        let b = ServiceSelection::new("party-buddy", 1, DurationUnit::Days);
        let c = ServiceSelection::new("call", 2, DurationUnit::Hours);
        let forward = calculate_total_price(&[a.clone(), b.clone(), c.clone()]);
        let reverse = calculate_total_price(&[c, b, a]);
        assert_eq!(forward, reverse);
        assert_eq!(forward, 25_000 + 1_000_000 + 80_000);
    }
}
