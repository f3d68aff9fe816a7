use std::collections::HashMap;

use crate::db::MemberInteraction;

/// Group decision rows by property, keeping each member's most recent one.
///
/// Recency is `(created_at, id)`, so rows recorded within the same instant
/// still order by insertion. Input order does not matter. Views must already
/// be filtered out by the caller.
pub fn latest_decisions(
    rows: &[MemberInteraction],
) -> HashMap<&str, HashMap<&str, &MemberInteraction>> {
    let mut by_property: HashMap<&str, HashMap<&str, &MemberInteraction>> = HashMap::new();
    for row in rows {
        let per_user = by_property.entry(row.property_id.as_str()).or_default();
        per_user
            .entry(row.user_id.as_str())
            .and_modify(|current| {
                if (row.created_at, row.id) > (current.created_at, current.id) {
                    *current = row;
                }
            })
            .or_insert(row);
    }
    by_property
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{DateTime, TimeZone, Utc};

    use crate::db::MemberInteraction;
    use crate::types::InteractionType;

    pub fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, minute, 0).unwrap()
    }

    pub fn row(
        id: i64,
        user: &str,
        property: &str,
        kind: InteractionType,
        minute: u32,
    ) -> MemberInteraction {
        MemberInteraction {
            id,
            user_id: user.to_string(),
            display_name: Some(user.to_uppercase()),
            property_id: property.to_string(),
            interaction_type: kind,
            created_at: at(minute),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::row;
    use super::*;
    use crate::types::InteractionType::*;

    #[test]
    fn keeps_most_recent_decision_per_member() {
        let rows = vec![
            row(3, "bob", "p1", Like, 5),
            row(1, "ann", "p1", Like, 1),
            row(2, "ann", "p1", Dislike, 2),
        ];
        let grouped = latest_decisions(&rows);
        let p1 = &grouped["p1"];
        assert_eq!(p1.len(), 2);
        assert_eq!(p1["ann"].interaction_type, Dislike);
        assert_eq!(p1["bob"].interaction_type, Like);
    }

    #[test]
    fn same_timestamp_falls_back_to_insertion_order() {
        let rows = vec![row(8, "ann", "p1", Skip, 3), row(7, "ann", "p1", Like, 3)];
        let grouped = latest_decisions(&rows);
        assert_eq!(grouped["p1"]["ann"].id, 8);
    }
}
