use serde::Serialize;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PostRow {
    pub post_id: String,
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub ingredients: Option<String>,
    pub instructions: String,
    pub prep_time: Option<i64>,
    pub cook_time: Option<i64>,
    pub servings: Option<i64>,
    pub difficulty_level: Option<String>,
    pub cuisine_type: Option<String>,
    pub image_url: Option<String>,
    pub status: String,
    pub is_featured: i64,
    pub created_at: String,
    pub updated_at: Option<String>,
    pub published_at: Option<String>,
    pub archived_at: Option<String>,
}

impl PostRow {
    pub fn status(&self) -> PostStatus {
        PostStatus::parse(&self.status)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PostStatus {
    Draft,
    Published,
    Archived,
}

impl PostStatus {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "published" => Self::Published,
            "archived" => Self::Archived,
            _ => Self::Draft,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Archived => "archived",
        }
    }
}
