use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::validation::ValidationError;

macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident, $field:literal { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            #[default]
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($text => Ok($name::$variant),)+
                    other => Err(ValidationError::UnknownVariant {
                        field: $field,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

string_enum!(
    /// The kind of piece the article prompt asks for
    ContentType, "contentType" {
        Article => "article",
        Tutorial => "tutorial",
        News => "news",
        Video => "video",
        Podcast => "podcast",
    }
);

string_enum!(
    /// Intended audience level
    DifficultyLevel, "difficultyLevel" {
        Beginner => "beginner",
        Intermediate => "intermediate",
        Advanced => "advanced",
    }
);

string_enum!(
    /// Publication state; generated articles start out published
    ArticleStatus, "status" {
        Published => "published",
        Draft => "draft",
        Archived => "archived",
    }
);

#[derive(Debug, Clone, Queryable, Selectable, Serialize)]
#[diesel(table_name = crate::schema::articles)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Article {
    pub id: String,
    pub title: String,
    pub url: String,
    pub description: String,
    pub content: String,
    pub excerpt: String,
    pub image_url: Option<String>,
    pub word_count: i32,
    pub read_time_minutes: i32,
    pub content_type: String,
    pub difficulty_level: String,
    pub slug: String,
    pub meta_title: String,
    pub meta_description: String,
    pub status: String,
    pub featured: bool,
    pub trending: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub publish_date: Option<NaiveDateTime>,
}

/// Listing projection: everything except the HTML body
#[derive(Debug, Clone, Queryable, Selectable, Serialize)]
#[diesel(table_name = crate::schema::articles)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ArticleSummary {
    pub id: String,
    pub title: String,
    pub url: String,
    pub description: String,
    pub excerpt: String,
    pub image_url: Option<String>,
    pub word_count: i32,
    pub read_time_minutes: i32,
    pub content_type: String,
    pub difficulty_level: String,
    pub slug: String,
    pub meta_title: String,
    pub meta_description: String,
    pub status: String,
    pub featured: bool,
    pub trending: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub publish_date: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::articles)]
pub struct NewArticle {
    pub id: String,
    pub title: String,
    pub url: String,
    pub description: String,
    pub content: String,
    pub excerpt: String,
    pub image_url: Option<String>,
    pub word_count: i32,
    pub read_time_minutes: i32,
    pub content_type: String,
    pub difficulty_level: String,
    pub slug: String,
    pub meta_title: String,
    pub meta_description: String,
    pub status: String,
    pub featured: bool,
    pub trending: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub publish_date: Option<NaiveDateTime>,
}

/// Partial update of an article row; `None` leaves the column untouched
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = crate::schema::articles)]
pub struct ArticleChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub image_url: Option<String>,
    pub word_count: Option<i32>,
    pub read_time_minutes: Option<i32>,
    pub content_type: Option<String>,
    pub difficulty_level: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub status: Option<String>,
    pub featured: Option<bool>,
    pub trending: Option<bool>,
    pub updated_at: Option<NaiveDateTime>,
    pub publish_date: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Queryable, Selectable, Serialize)]
#[diesel(table_name = crate::schema::job_postings)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct JobPosting {
    pub id: i32,
    pub title: Option<String>,
    pub location: Option<String>,
    #[serde(serialize_with = "serialize_skills")]
    pub skills: String,
    pub description: Option<String>,
    pub created_at: NaiveDateTime,
}

impl JobPosting {
    pub fn skills(&self) -> Vec<String> {
        serde_json::from_str(&self.skills).unwrap_or_default()
    }
}

// skills are stored as a JSON array in a text column
fn serialize_skills<S: Serializer>(skills: &str, serializer: S) -> Result<S::Ok, S::Error> {
    let parsed: Vec<String> = serde_json::from_str(skills).unwrap_or_default();
    parsed.serialize(serializer)
}

/// Structured job data as extracted by the completion model
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct JobPostingDraft {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::job_postings)]
pub struct NewJobPosting {
    pub title: Option<String>,
    pub location: Option<String>,
    pub skills: String,
    pub description: Option<String>,
}

impl From<JobPostingDraft> for NewJobPosting {
    fn from(draft: JobPostingDraft) -> Self {
        let skills: Vec<String> = draft
            .skills
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        NewJobPosting {
            title: draft.title,
            location: draft.location,
            skills: serde_json::to_string(&skills).unwrap_or_else(|_| "[]".to_string()),
            description: draft.description,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Serialize)]
#[diesel(table_name = crate::schema::news_summaries)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct NewsSummary {
    pub id: i32,
    pub title: String,
    pub source: Option<String>,
    pub url: Option<String>,
    pub summary: String,
    pub approved: bool,
    pub created_at: NaiveDateTime,
    pub approved_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::news_summaries)]
pub struct NewNewsSummary {
    pub title: String,
    pub source: Option<String>,
    pub url: Option<String>,
    pub summary: String,
}
