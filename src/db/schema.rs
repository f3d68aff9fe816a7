//! SQL DDL for initializing the HomeMatch database.
//! SQLite-first; every statement is idempotent so it runs on each startup.
//!
//! Statements are separated by `;` and executed one at a time, so the DDL
//! must not contain semicolons anywhere else (including comments).

/// SQLite schema:
/// - `user_profiles.id` is the identity provider's subject
/// - `households.invite_code` UNIQUE
/// - `user_property_interactions.id` autoincrement, breaks timestamp ties
/// - `household_property_resolutions` keyed by (household, property)
/// - `neighborhoods` unique per (name, city, state) ignoring case, bounds stored as GeoJSON
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS households (
    id TEXT PRIMARY KEY,
    name TEXT NULL,
    invite_code TEXT NOT NULL UNIQUE,
    created_by TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS user_profiles (
    id TEXT PRIMARY KEY,
    email TEXT NULL,
    display_name TEXT NULL,
    household_id TEXT NULL REFERENCES households(id) ON DELETE SET NULL,
    avatar_url TEXT NULL,
    preferences TEXT NOT NULL DEFAULT '{}',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_user_profiles_household ON user_profiles(household_id);

CREATE TABLE IF NOT EXISTS neighborhoods (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL COLLATE NOCASE,
    city TEXT NOT NULL COLLATE NOCASE,
    state TEXT NOT NULL COLLATE NOCASE,
    bounds TEXT NOT NULL, -- GeoJSON MultiPolygon
    created_at TEXT NOT NULL,
    UNIQUE (name, city, state)
);

CREATE TABLE IF NOT EXISTS properties (
    id TEXT PRIMARY KEY,
    address TEXT NOT NULL,
    city TEXT NOT NULL,
    state TEXT NOT NULL,
    zip_code TEXT NOT NULL,
    price INTEGER NOT NULL,
    bedrooms INTEGER NOT NULL,
    bathrooms REAL NOT NULL,
    square_feet INTEGER NULL,
    property_type TEXT NULL,
    listing_status TEXT NOT NULL DEFAULT 'active',
    images TEXT NOT NULL DEFAULT '[]', -- JSON array of URLs
    latitude REAL NULL,
    longitude REAL NULL,
    neighborhood_id TEXT NULL REFERENCES neighborhoods(id) ON DELETE SET NULL,
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_properties_city_state ON properties(city, state);

CREATE TABLE IF NOT EXISTS property_vibes (
    property_id TEXT PRIMARY KEY REFERENCES properties(id) ON DELETE CASCADE,
    tagline TEXT NOT NULL,
    vibe_justification TEXT NOT NULL,
    primary_vibes TEXT NOT NULL DEFAULT '[]',
    lifestyle_fits TEXT NOT NULL DEFAULT '[]',
    suggested_activities TEXT NOT NULL DEFAULT '[]',
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS user_property_interactions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id TEXT NOT NULL REFERENCES user_profiles(id) ON DELETE CASCADE,
    property_id TEXT NOT NULL REFERENCES properties(id) ON DELETE CASCADE,
    household_id TEXT NULL REFERENCES households(id) ON DELETE SET NULL,
    interaction_type TEXT NOT NULL CHECK (interaction_type IN ('like', 'dislike', 'skip', 'view')),
    score_data TEXT NULL, -- opaque JSON
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_interactions_user ON user_property_interactions(user_id, created_at);
CREATE INDEX IF NOT EXISTS idx_interactions_household ON user_property_interactions(household_id, created_at);

CREATE TABLE IF NOT EXISTS household_property_resolutions (
    household_id TEXT NOT NULL REFERENCES households(id) ON DELETE CASCADE,
    property_id TEXT NOT NULL REFERENCES properties(id) ON DELETE CASCADE,
    resolution TEXT NOT NULL CHECK (resolution IN ('saved', 'passed', 'scheduled_viewing', 'discussion_needed')),
    resolved_by TEXT NOT NULL,
    resolved_at TEXT NOT NULL,
    PRIMARY KEY (household_id, property_id)
);

CREATE TABLE IF NOT EXISTS saved_searches (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL REFERENCES user_profiles(id) ON DELETE CASCADE,
    household_id TEXT NULL REFERENCES households(id) ON DELETE SET NULL,
    name TEXT NOT NULL,
    filters TEXT NOT NULL, -- JSON PropertyFilters
    is_active INTEGER NOT NULL DEFAULT 1,
    notify_on_new_matches INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL,
    last_viewed_at TEXT NULL
);

CREATE INDEX IF NOT EXISTS idx_saved_searches_user ON saved_searches(user_id)
"#;
