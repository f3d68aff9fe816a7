use serde::{Deserialize, Serialize};

use crate::error::HomeMatchError;

pub const MAX_PAGE_SIZE: u32 = 100;

/// Listing filters shared by the property feed and saved searches.
///
/// Query strings carry `propertyTypes` as a comma-separated list; stored
/// saved searches keep it as a JSON array.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_min: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_max: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bedrooms_min: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bathrooms_min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub property_types: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neighborhood_id: Option<String>,
}

impl PropertyFilters {
    pub fn validate(&self) -> Result<(), HomeMatchError> {
        if let Some(min) = self.price_min
            && min < 0
        {
            return Err(HomeMatchError::validation("priceMin must not be negative"));
        }
        if let (Some(min), Some(max)) = (self.price_min, self.price_max)
            && min > max
        {
            return Err(HomeMatchError::validation(
                "priceMin must not exceed priceMax",
            ));
        }
        if let Some(beds) = self.bedrooms_min
            && beds < 0
        {
            return Err(HomeMatchError::validation("bedroomsMin must not be negative"));
        }
        if let Some(baths) = self.bathrooms_min
            && !(baths.is_finite() && baths >= 0.0)
        {
            return Err(HomeMatchError::validation(
                "bathroomsMin must be a non-negative number",
            ));
        }
        Ok(())
    }
}

/// Flat query-string form of [`PropertyFilters`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedQuery {
    pub price_min: Option<i64>,
    pub price_max: Option<i64>,
    pub bedrooms_min: Option<i64>,
    pub bathrooms_min: Option<f64>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub property_types: Option<String>,
    pub neighborhood_id: Option<String>,
    pub limit: Option<u32>,
}

impl FeedQuery {
    pub fn into_parts(self) -> (PropertyFilters, Option<u32>) {
        let property_types = self
            .property_types
            .as_deref()
            .map(|s| {
                s.split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        let filters = PropertyFilters {
            price_min: self.price_min,
            price_max: self.price_max,
            bedrooms_min: self.bedrooms_min,
            bathrooms_min: self.bathrooms_min,
            city: non_empty(self.city),
            state: non_empty(self.state),
            property_types,
            neighborhood_id: non_empty(self.neighborhood_id),
        };
        (filters, self.limit)
    }
}

/// `limit`/`offset` paging used by list endpoints.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Page {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl Page {
    pub fn resolve(self, default_limit: u32) -> Result<(u32, u32), HomeMatchError> {
        let limit = resolve_limit(self.limit, default_limit)?;
        Ok((limit, self.offset.unwrap_or(0)))
    }
}

pub fn resolve_limit(limit: Option<u32>, default_limit: u32) -> Result<u32, HomeMatchError> {
    match limit {
        None => Ok(default_limit.clamp(1, MAX_PAGE_SIZE)),
        Some(n) if (1..=MAX_PAGE_SIZE).contains(&n) => Ok(n),
        Some(_) => Err(HomeMatchError::validation(format!(
            "limit must be between 1 and {MAX_PAGE_SIZE}"
        ))),
    }
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feed_query_splits_property_types() {
        let q = FeedQuery {
            property_types: Some("house, condo,,".to_string()),
            city: Some("  ".to_string()),
            ..Default::default()
        };
        let (filters, limit) = q.into_parts();
        assert_eq!(filters.property_types, vec!["house", "condo"]);
        assert_eq!(filters.city, None);
        assert_eq!(limit, None);
    }

    #[test]
    fn inverted_price_range_is_rejected() {
        let f = PropertyFilters {
            price_min: Some(500_000),
            price_max: Some(100_000),
            ..Default::default()
        };
        assert!(f.validate().is_err());
    }

    #[test]
    fn limit_bounds() {
        assert_eq!(resolve_limit(None, 20).unwrap(), 20);
        assert!(resolve_limit(Some(0), 20).is_err());
        assert!(resolve_limit(Some(101), 20).is_err());
    }
}
