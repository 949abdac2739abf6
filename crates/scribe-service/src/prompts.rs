//! Prompt templates sent to the completion model.

use serde::Deserialize;

use crate::models::{ContentType, DifficultyLevel};

/// Keywords arrive either as a comma separated string or as a list
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Keywords {
    Text(String),
    List(Vec<String>),
}

impl Keywords {
    /// Joined keyword line, `None` when there is nothing to include
    pub fn joined(&self) -> Option<String> {
        let joined = match self {
            Keywords::Text(text) => text.trim().to_string(),
            Keywords::List(items) => items
                .iter()
                .map(|k| k.trim())
                .filter(|k| !k.is_empty())
                .collect::<Vec<_>>()
                .join(", "),
        };

        (!joined.is_empty()).then_some(joined)
    }
}

/// A news item handed to the summarizer
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NewsItem {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

pub fn blog_post(topic: &str, keywords: Option<&Keywords>) -> String {
    let mut prompt = format!("Write a detailed SEO-friendly blog post about \"{topic}\".\n");
    if let Some(keywords) = keywords.and_then(Keywords::joined) {
        prompt.push_str(&format!("Include the following keywords: {keywords}.\n"));
    }
    prompt.push_str(
        "Use clear headings (H2/H3), bullet points, and a conclusion.\n\
         Make it engaging, professional, and optimized for Google SEO.",
    );
    prompt
}

fn content_type_instruction(content_type: ContentType) -> &'static str {
    match content_type {
        ContentType::Article => "Write a comprehensive, well-researched article",
        ContentType::Tutorial => {
            "Write a step-by-step tutorial with clear instructions and examples"
        }
        ContentType::News => "Write a news article with facts, quotes, and current relevance",
        ContentType::Video => "Write a detailed video script with timestamps and visual cues",
        ContentType::Podcast => {
            "Write a podcast episode script with engaging dialogue and segments"
        }
    }
}

fn audience(difficulty: DifficultyLevel) -> &'static str {
    match difficulty {
        DifficultyLevel::Beginner => "suitable for beginners with no prior knowledge",
        DifficultyLevel::Intermediate => "for readers with some background knowledge",
        DifficultyLevel::Advanced => "for expert-level audience with deep technical knowledge",
    }
}

const ARTICLE_REQUIREMENTS: &[&str] = &[
    "Use clear H1, H2, and H3 headings with proper hierarchy",
    "Include an engaging introduction that hooks the reader",
    "Provide detailed, actionable content with examples",
    "Add relevant bullet points and numbered lists where appropriate",
    "Include a strong conclusion with key takeaways",
    "Aim for 1500-2500 words for comprehensive coverage",
    "Write in a professional yet engaging tone",
    "Optimize for SEO with natural keyword integration",
    "Include relevant examples, case studies, or practical applications",
];

const TUTORIAL_REQUIREMENTS: &[&str] = &[
    "Number each main step clearly",
    "Include prerequisites section",
    "Add troubleshooting tips",
    "Provide expected outcomes for each step",
];

const NEWS_REQUIREMENTS: &[&str] = &[
    "Start with the most important information (inverted pyramid)",
    "Include relevant background context",
    "Use present tense for recent events",
    "Maintain journalistic objectivity",
];

fn bullet_list(items: &[&str]) -> String {
    items
        .iter()
        .map(|item| format!("- {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone)]
pub struct ArticlePrompt<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub keywords: Option<&'a Keywords>,
    pub content_type: ContentType,
    pub difficulty: DifficultyLevel,
}

impl ArticlePrompt<'_> {
    pub fn render(&self) -> String {
        let mut prompt = format!(
            "{} about \"{}\".\n\nDescription: {}\n",
            content_type_instruction(self.content_type),
            self.title,
            self.description
        );

        if let Some(keywords) = self.keywords.and_then(Keywords::joined) {
            prompt.push_str(&format!("Keywords to include: {keywords}\n"));
        }

        prompt.push_str(&format!(
            "\nRequirements:\n- Target audience: {}\n- Content type: {}\n{}\n",
            audience(self.difficulty),
            self.content_type,
            bullet_list(ARTICLE_REQUIREMENTS)
        ));

        match self.content_type {
            ContentType::Tutorial => prompt.push_str(&format!(
                "\nAdditional Tutorial Requirements:\n{}\n",
                bullet_list(TUTORIAL_REQUIREMENTS)
            )),
            ContentType::News => prompt.push_str(&format!(
                "\nAdditional News Requirements:\n{}\n",
                bullet_list(NEWS_REQUIREMENTS)
            )),
            _ => {}
        }

        prompt.push_str(
            "\nFormat the response in clean HTML with proper heading tags (h1, h2, h3), \
             paragraphs (p), lists (ul, ol), and emphasis tags (strong, em) where appropriate.",
        );

        prompt
    }
}

pub fn article_image(title: &str) -> String {
    format!(
        "Create a professional, clean illustration for an article titled \"{title}\". \
         Style: modern, minimalist, suitable for a blog header."
    )
}

pub fn tweets_from_job_posting(content: &str) -> String {
    format!(
        "Convert the following job posting into 2-3 professional, catchy tweets.\n\
         - Keep each tweet under 280 characters.\n\
         - Use simple language and engaging tone.\n\
         - Add relevant hashtags and a call to action (like \"Apply now!\").\n\
         - Avoid repeating the same phrasing in every tweet.\n\n\
         Job Posting:\n{content}"
    )
}

pub const JOB_TWEETS_SYSTEM: &str = "You are a copywriter who creates engaging tweets.";

pub fn job_post_tweets(content: &str) -> String {
    format!("Turn this job posting into 3 short, catchy tweets:\n\n{content}")
}

pub const JOB_EXTRACTION_SYSTEM: &str = "You extract structured job data in JSON format.";

pub fn job_extraction(content: &str) -> String {
    format!(
        "Extract JSON with fields: title, location, skills (array), description from:\n\n{content}"
    )
}

pub fn news_digest(items: &[NewsItem]) -> String {
    let listing = items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            format!(
                "{}. {}\n{}",
                i + 1,
                item.title,
                item.description.as_deref().unwrap_or_default()
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "Summarize the following news articles into concise, easy-to-read points (2-3 sentences each).\n\
         Focus on the key information only. Return results in Markdown format.\n\n\
         Articles:\n{listing}"
    )
}

pub fn news_article_summary(title: &str, description: Option<&str>) -> String {
    format!(
        "Summarize the following news article in 2-3 concise sentences. \
         Focus on the key information only and return plain text.\n\n\
         Title: {title}\n{}",
        description.unwrap_or_default()
    )
}

/// Input text for single-article summarization models
pub fn summarization_input(item: &NewsItem) -> String {
    format!(
        "{}\n{}",
        item.title,
        item.description.as_deref().unwrap_or_default()
    )
}
