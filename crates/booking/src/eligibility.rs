//! Booking eligibility gate
//!
//! In-person service categories require a fully verified account. The
//! restricted set is a static constant, deliberately independent of the
//! catalog: adding a catalog entry never silently restricts or unrestricts
//! anything.

use crate::pricing::ServiceSelection;

/// Restricted services as `(service_id, display_name)` pairs. Both public
/// views below derive from this one table so the id list and the label
/// list cannot drift apart.
const RESTRICTED_SERVICES: &[(&str, &str)] = &[
    ("offline-date", "Offline Date"),
    ("party-buddy", "Party Buddy"),
];

/// Display names of the services a user may not book.
///
/// Empty for verified users. The returned labels are presentation-facing
/// strings, suitable for direct rendering in a restriction notice.
pub fn service_restrictions(is_verified: bool) -> Vec<&'static str> {
    if is_verified {
        return Vec::new();
    }
    RESTRICTED_SERVICES.iter().map(|(_, name)| *name).collect()
}

/// Whether a service id is in the restricted set.
pub fn is_restricted_service(id: &str) -> bool {
    RESTRICTED_SERVICES.iter().any(|(rid, _)| *rid == id)
}

/// Whether a selection set contains any service the user may not book.
///
/// Verified users are never blocked, whatever the selections contain.
pub fn has_restricted_services(selections: &[ServiceSelection], is_verified: bool) -> bool {
    if is_verified {
        return false;
    }
    selections
        .iter()
        .any(|selection| is_restricted_service(&selection.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::DurationUnit;

    #[test]
    fn verified_users_have_no_restrictions() {
        assert!(service_restrictions(true).is_empty());
    }

    #[test]
    fn unverified_users_see_both_labels() {
        let names = service_restrictions(false);
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"Offline Date"));
        assert!(names.contains(&"Party Buddy"));
    }

    #[test]
    fn unrestricted_selection_passes() {
        let selections = [ServiceSelection::new("chat", 1, DurationUnit::Days)];
        assert!(!has_restricted_services(&selections, false));
    }

    #[test]
    fn restricted_selection_blocks_unverified() {
        let selections = [ServiceSelection::new("party-buddy", 1, DurationUnit::Days)];
        assert!(has_restricted_services(&selections, false));
    }

    #[test]
    fn verification_overrides_everything() {
        let selections = [
            ServiceSelection::new("offline-date", 3, DurationUnit::Hours),
            ServiceSelection::new("party-buddy", 1, DurationUnit::Days),
        ];
        assert!(!has_restricted_services(&selections, true));
    }
}
