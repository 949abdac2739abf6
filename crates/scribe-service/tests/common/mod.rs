#![allow(dead_code)]

use async_trait::async_trait;
use diesel::sqlite::SqliteConnection;
use scribe_service::{
    ServiceState,
    config::Settings,
    db,
    llm::{CompletionClient, CompletionRequest, LlmError, SummarizationClient},
    news::{NewsArticle, NewsClient, NewsError, NewsFeed, NewsQuery, NewsSource},
};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

pub const SITE_BASE_URL: &str = "https://blog.test";
pub const STUB_IMAGE_URL: &str = "https://images.test/header.png";

pub const STUB_ARTICLE_HTML: &str = "<h1>Stub</h1>\n\n<p>Generated body text for the article.</p>\n\n<p>Second paragraph.</p>";
pub const STUB_JOB_JSON: &str =
    r#"{"title":"Backend Engineer","location":"Remote","skills":["rust","sql"],"description":"Build services"}"#;

pub fn establish_test_connection() -> SqliteConnection {
    db::establish_connection(":memory:").expect("Failed to create in-memory database")
}

pub fn test_settings() -> Settings {
    let vars = [
        ("DATABASE_URL", ":memory:"),
        ("OPENAI_API_KEY", "test-key"),
        ("SITE_BASE_URL", SITE_BASE_URL),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect::<HashMap<_, _>>();

    Settings::from_vars(vars).expect("test settings should be valid")
}

#[derive(Debug, Clone)]
pub enum ImageOutcome {
    Url(String),
    Missing,
    Fail,
}

/// Completion stub: replays queued replies, then falls back to canned output.
/// A queued `None` fails the call.
#[derive(Clone)]
pub struct StubCompletions {
    replies: Arc<Mutex<VecDeque<Option<String>>>>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
    image: Arc<Mutex<ImageOutcome>>,
    image_prompts: Arc<Mutex<Vec<String>>>,
}

impl Default for StubCompletions {
    fn default() -> Self {
        Self {
            replies: Arc::default(),
            requests: Arc::default(),
            image: Arc::new(Mutex::new(ImageOutcome::Url(STUB_IMAGE_URL.to_string()))),
            image_prompts: Arc::default(),
        }
    }
}

impl StubCompletions {
    pub fn reply(&self, text: impl Into<String>) {
        self.replies.lock().unwrap().push_back(Some(text.into()));
    }

    pub fn fail_next(&self) {
        self.replies.lock().unwrap().push_back(None);
    }

    pub fn set_image(&self, outcome: ImageOutcome) {
        *self.image.lock().unwrap() = outcome;
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn image_prompts(&self) -> Vec<String> {
        self.image_prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionClient for StubCompletions {
    async fn complete(&self, request: CompletionRequest) -> Result<String, LlmError> {
        let json = request.json_response;
        self.requests.lock().unwrap().push(request);

        match self.replies.lock().unwrap().pop_front() {
            Some(Some(text)) => Ok(text),
            Some(None) => Err(LlmError::Api {
                status: 500,
                message: "stubbed failure".to_string(),
            }),
            None if json => Ok(STUB_JOB_JSON.to_string()),
            None => Ok(STUB_ARTICLE_HTML.to_string()),
        }
    }

    async fn generate_image(&self, prompt: &str) -> Result<Option<String>, LlmError> {
        self.image_prompts.lock().unwrap().push(prompt.to_string());

        match self.image.lock().unwrap().clone() {
            ImageOutcome::Url(url) => Ok(Some(url)),
            ImageOutcome::Missing => Ok(None),
            ImageOutcome::Fail => Err(LlmError::EmptyResponse),
        }
    }
}

/// Summarizer stub: queued replies, then `Stub summary`
#[derive(Clone, Default)]
pub struct StubSummarizer {
    replies: Arc<Mutex<VecDeque<Option<String>>>>,
    inputs: Arc<Mutex<Vec<String>>>,
}

impl StubSummarizer {
    pub fn reply(&self, summary: Option<&str>) {
        self.replies
            .lock()
            .unwrap()
            .push_back(summary.map(str::to_string));
    }

    pub fn inputs(&self) -> Vec<String> {
        self.inputs.lock().unwrap().clone()
    }
}

#[async_trait]
impl SummarizationClient for StubSummarizer {
    async fn summarize(&self, text: &str) -> Result<Option<String>, LlmError> {
        self.inputs.lock().unwrap().push(text.to_string());
        Ok(self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Some("Stub summary".to_string())))
    }
}

#[derive(Clone, Default)]
pub struct StubNews {
    queries: Arc<Mutex<Vec<NewsQuery>>>,
}

impl StubNews {
    pub fn queries(&self) -> Vec<NewsQuery> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl NewsClient for StubNews {
    async fn search(&self, query: &NewsQuery) -> Result<NewsFeed, NewsError> {
        self.queries.lock().unwrap().push(query.clone());
        Ok(NewsFeed {
            status: "ok".to_string(),
            total_results: 1,
            articles: vec![NewsArticle {
                source: NewsSource {
                    id: None,
                    name: Some("Wire".to_string()),
                },
                title: Some(format!("Headline about {}", query.q)),
                description: Some("Short description".to_string()),
                url: Some("https://news.test/story".to_string()),
                ..NewsArticle::default()
            }],
        })
    }
}

pub type TestState = ServiceState<StubCompletions, StubSummarizer, StubNews>;

/// Handles on the stubs behind a running test server
pub struct Harness {
    pub db: Arc<Mutex<SqliteConnection>>,
    pub completions: StubCompletions,
    pub summarizer: StubSummarizer,
    pub news: StubNews,
}

pub mod server_utils {
    use super::*;
    use axum_test::TestServer;
    use scribe_service::create_app;

    pub fn create_test_server() -> (TestServer, Harness) {
        let db = Arc::new(Mutex::new(establish_test_connection()));
        let harness = Harness {
            db: db.clone(),
            completions: StubCompletions::default(),
            summarizer: StubSummarizer::default(),
            news: StubNews::default(),
        };

        let state: TestState = ServiceState::new(
            db,
            harness.completions.clone(),
            harness.summarizer.clone(),
            harness.news.clone(),
            test_settings(),
        );

        let server = TestServer::new(create_app(state)).unwrap();
        (server, harness)
    }
}
