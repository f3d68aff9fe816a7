use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::{DbProperty, MemberInteraction};
use crate::service::decisions::latest_decisions;
use crate::types::InteractionType;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Liker {
    pub user_id: String,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MutualLike {
    pub property_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property: Option<DbProperty>,
    pub liked_by: Vec<Liker>,
    pub like_count: usize,
    pub first_liked_at: DateTime<Utc>,
    pub last_liked_at: DateTime<Utc>,
}

/// Another member who already likes the property just liked.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Partner {
    pub user_id: String,
    pub display_name: Option<String>,
    pub liked_at: DateTime<Utc>,
}

/// Properties whose latest decision is a like for two or more members.
/// Most recently completed match first.
pub fn find_mutual_likes(rows: &[MemberInteraction]) -> Vec<MutualLike> {
    let mut mutual: Vec<MutualLike> = latest_decisions(rows)
        .into_iter()
        .filter_map(|(property_id, per_user)| {
            let mut likes: Vec<&MemberInteraction> = per_user
                .into_values()
                .filter(|r| r.interaction_type == InteractionType::Like)
                .collect();
            if likes.len() < 2 {
                return None;
            }
            likes.sort_by_key(|r| (r.created_at, r.id));
            let first_liked_at = likes.first()?.created_at;
            let last_liked_at = likes.last()?.created_at;
            Some(MutualLike {
                property_id: property_id.to_string(),
                property: None,
                like_count: likes.len(),
                liked_by: likes
                    .into_iter()
                    .map(|r| Liker {
                        user_id: r.user_id.clone(),
                        display_name: r.display_name.clone(),
                    })
                    .collect(),
                first_liked_at,
                last_liked_at,
            })
        })
        .collect();

    mutual.sort_by(|a, b| {
        b.last_liked_at
            .cmp(&a.last_liked_at)
            .then_with(|| a.property_id.cmp(&b.property_id))
    });
    mutual
}

/// Members other than `user_id` whose latest decision on `property_id` is a like.
pub fn mutual_partners(
    rows: &[MemberInteraction],
    property_id: &str,
    user_id: &str,
) -> Vec<Partner> {
    let grouped = latest_decisions(rows);
    let Some(per_user) = grouped.get(property_id) else {
        return Vec::new();
    };
    let mut partners: Vec<Partner> = per_user
        .values()
        .filter(|r| r.user_id != user_id && r.interaction_type == InteractionType::Like)
        .map(|r| Partner {
            user_id: r.user_id.clone(),
            display_name: r.display_name.clone(),
            liked_at: r.created_at,
        })
        .collect();
    partners.sort_by(|a, b| a.liked_at.cmp(&b.liked_at));
    partners
}
