use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of catalog item
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Ebook,
    Audiobook,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Ebook => "ebook",
            ContentType::Audiobook => "audiobook",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ebook" => Some(ContentType::Ebook),
            "audiobook" => Some(ContentType::Audiobook),
            _ => None,
        }
    }
}

/// A catalog item: an ebook or audiobook with price and category metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Content {
    /// Unique identifier for the catalog item
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub category: String,
    pub content_type: ContentType,
    /// Price in cents
    pub price_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl Content {
    /// Creates a new catalog item
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        category: impl Into<String>,
        content_type: ContentType,
        price_cents: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            author: author.into(),
            category: category.into(),
            content_type,
            price_cents,
            created_at: Utc::now(),
        }
    }
}

/// Which aggregator branch produced a recommendation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationSource {
    ContentBased,
    Collaborative,
    Trending,
    Popular,
}

/// A catalog item tagged with the branch that suggested it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendedContent {
    #[serde(flatten)]
    pub content: Content,
    pub source: RecommendationSource,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_content() {
        let content = Content::new("Dune", "Frank Herbert", "Sci-Fi", ContentType::Ebook, 1299);
        assert_eq!(content.title, "Dune");
        assert_eq!(content.content_type, ContentType::Ebook);
        assert_eq!(content.price_cents, 1299);
    }

    #[test]
    fn test_content_type_round_trip() {
        assert_eq!(ContentType::parse("ebook"), Some(ContentType::Ebook));
        assert_eq!(ContentType::parse("audiobook"), Some(ContentType::Audiobook));
        assert_eq!(ContentType::parse("vinyl"), None);
        assert_eq!(ContentType::Audiobook.as_str(), "audiobook");
    }

    #[test]
    fn test_recommendation_source_serialization() {
        let json = serde_json::to_string(&RecommendationSource::ContentBased).unwrap();
        assert_eq!(json, "\"content_based\"");
        let json = serde_json::to_string(&RecommendationSource::Popular).unwrap();
        assert_eq!(json, "\"popular\"");
    }

    #[test]
    fn test_recommended_content_flattens() {
        let content = Content::new("Dune", "Frank Herbert", "Sci-Fi", ContentType::Ebook, 1299);
        let recommended = RecommendedContent {
            content: content.clone(),
            source: RecommendationSource::Trending,
        };
        let value = serde_json::to_value(&recommended).unwrap();
        assert_eq!(value["title"], "Dune");
        assert_eq!(value["source"], "trending");
    }
}
