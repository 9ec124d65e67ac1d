//! Profile store database schema.

/// SQL to create the player profile table.
pub const CREATE_PLAYER_PROFILES_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS player_profiles (
    visitor_id   VARCHAR(128) PRIMARY KEY,
    document     JSONB NOT NULL,
    revision     BIGINT NOT NULL,
    phone_number VARCHAR(16),
    updated_at   TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX IF NOT EXISTS idx_player_profiles_phone_number
    ON player_profiles (phone_number);
";
