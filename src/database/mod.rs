pub mod friendship_repo;
pub mod post_repo;
pub mod user_repo;

use sqlx::SqlitePool;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
  user_id                  TEXT PRIMARY KEY,
  email                    TEXT NOT NULL UNIQUE,
  username                 TEXT UNIQUE,
  username_last_changed    TEXT,
  password_hash            TEXT NOT NULL,
  bio                      TEXT,
  profile_image_url        TEXT,
  friends_list_visibility  TEXT NOT NULL DEFAULT 'public',
  discoverable_for_friends INTEGER NOT NULL DEFAULT 1,
  created_at               TEXT NOT NULL,
  updated_at               TEXT
);

CREATE TABLE IF NOT EXISTS friendships (
  friendship_id TEXT PRIMARY KEY,
  requester_id  TEXT NOT NULL REFERENCES users(user_id),
  addressee_id  TEXT NOT NULL REFERENCES users(user_id),
  user_lo       TEXT NOT NULL,
  user_hi       TEXT NOT NULL,
  status        TEXT NOT NULL DEFAULT 'pending',
  created_at    TEXT NOT NULL,
  updated_at    TEXT,
  UNIQUE (user_lo, user_hi)
);

CREATE INDEX IF NOT EXISTS idx_friendships_requester ON friendships (requester_id);
CREATE INDEX IF NOT EXISTS idx_friendships_addressee ON friendships (addressee_id);

CREATE TABLE IF NOT EXISTS posts (
  post_id          TEXT PRIMARY KEY,
  user_id          TEXT NOT NULL REFERENCES users(user_id),
  title            TEXT NOT NULL,
  description      TEXT,
  ingredients      TEXT,
  instructions     TEXT NOT NULL,
  prep_time        INTEGER,
  cook_time        INTEGER,
  servings         INTEGER,
  difficulty_level TEXT,
  cuisine_type     TEXT,
  image_url        TEXT,
  status           TEXT NOT NULL DEFAULT 'draft',
  is_featured      INTEGER NOT NULL DEFAULT 0,
  created_at       TEXT NOT NULL,
  updated_at       TEXT,
  published_at     TEXT,
  archived_at      TEXT
);

CREATE INDEX IF NOT EXISTS idx_posts_user ON posts (user_id);
"#;

/// Create the schema on a fresh database. Safe to call on every startup;
/// every statement is IF NOT EXISTS.
pub async fn init_db(pool: &SqlitePool) -> sqlx::Result<()> {
    sqlx::raw_sql(SCHEMA).execute(pool).await?;
    Ok(())
}
