use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;

use crate::db::{DbProperty, MemberInteraction};
use crate::service::decisions::latest_decisions;
use crate::types::InteractionType;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub user_id: String,
    pub display_name: Option<String>,
    #[serde(rename = "type")]
    pub interaction_type: InteractionType,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DisputedProperty {
    pub property_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property: Option<DbProperty>,
    pub votes: Vec<Vote>,
    pub last_activity_at: DateTime<Utc>,
}

/// Properties on which household members currently disagree.
///
/// Each member's latest decision counts. A property is disputed when those
/// decisions include a like and at least one dislike or skip. Properties in
/// `resolved` are left out. Newest disagreement first.
pub fn find_disputes(
    rows: &[MemberInteraction],
    resolved: &HashSet<String>,
) -> Vec<DisputedProperty> {
    let mut disputes: Vec<DisputedProperty> = latest_decisions(rows)
        .into_iter()
        .filter(|(property_id, _)| !resolved.contains(*property_id))
        .filter(|(_, per_user)| {
            let liked = per_user
                .values()
                .any(|r| r.interaction_type == InteractionType::Like);
            let rejected = per_user.values().any(|r| r.interaction_type.is_negative());
            liked && rejected
        })
        .map(|(property_id, per_user)| {
            let mut votes: Vec<Vote> = per_user
                .into_values()
                .map(|r| Vote {
                    user_id: r.user_id.clone(),
                    display_name: r.display_name.clone(),
                    interaction_type: r.interaction_type,
                    at: r.created_at,
                })
                .collect();
            votes.sort_by(|a, b| a.at.cmp(&b.at).then_with(|| a.user_id.cmp(&b.user_id)));
            let last_activity_at = votes.iter().map(|v| v.at).max().unwrap_or_default();
            DisputedProperty {
                property_id: property_id.to_string(),
                property: None,
                votes,
                last_activity_at,
            }
        })
        .collect();

    disputes.sort_by(|a, b| {
        b.last_activity_at
            .cmp(&a.last_activity_at)
            .then_with(|| a.property_id.cmp(&b.property_id))
    });
    disputes
}
