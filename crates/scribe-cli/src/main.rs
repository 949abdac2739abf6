use clap::{Parser, Subcommand};
use reqwest::{Client, Method, RequestBuilder};
use serde::Serialize;
use serde_json::{Value, json};
use std::error::Error;
use std::process;
use url::Url;

#[derive(Parser)]
#[command(name = "scribe")]
#[command(about = "Generate and manage content through the Scribe service")]
struct Cli {
    /// Base URL for the Scribe service
    #[arg(long, default_value = "http://localhost:3000")]
    service_url: Url,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a blog post on a topic
    Blog {
        topic: String,
        /// Keyword to work into the post (repeatable)
        #[arg(short, long = "keyword")]
        keywords: Vec<String>,
    },
    /// Turn a job posting into tweets
    Tweets { content: String },
    /// Generate tweets and store structured data for a job posting
    Job { content: String },
    /// Generate and store an article
    Article {
        title: String,
        #[arg(short, long)]
        description: String,
        #[arg(short, long = "keyword")]
        keywords: Vec<String>,
        /// article, tutorial, news, video or podcast
        #[arg(long)]
        content_type: Option<String>,
        /// beginner, intermediate or advanced
        #[arg(long)]
        difficulty: Option<String>,
        #[arg(long)]
        featured: bool,
        /// Also generate a header image
        #[arg(long)]
        image: bool,
    },
    /// Fetch an article by id or slug
    Get { identifier: String },
    /// List stored articles
    List {
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        sort_by: Option<String>,
        #[arg(long)]
        sort_order: Option<String>,
    },
    /// Edit a stored article
    Update {
        identifier: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Path to a file with the new HTML content
        #[arg(long)]
        content_file: Option<std::path::PathBuf>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        featured: Option<bool>,
        #[arg(long)]
        trending: Option<bool>,
    },
    /// Search recent news
    News {
        #[arg(short, long)]
        query: Option<String>,
        /// Earliest publish date, YYYY-MM-DD
        #[arg(long)]
        from: Option<String>,
    },
    /// Summarize the news returned for a query
    Summarize {
        #[arg(short, long)]
        query: Option<String>,
        /// Use the per-article inference summarizer
        #[arg(long)]
        per_article: bool,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ArticleRequest {
    title: String,
    description: String,
    keywords: Vec<String>,
    content_type: Option<String>,
    difficulty_level: Option<String>,
    featured: bool,
    generate_image: bool,
}

#[derive(Serialize)]
struct ArticleUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    featured: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    trending: Option<bool>,
}

struct ScribeClient {
    http: Client,
    base: Url,
}

impl ScribeClient {
    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, Box<dyn Error>> {
        let url = self.base.join(path)?;
        Ok(self.http.request(method, url))
    }

    /// Send the request and return the JSON body, exiting on a non-success status
    async fn send(&self, request: RequestBuilder) -> Result<Value, Box<dyn Error>> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            eprintln!("Request failed: {status}");
            eprintln!("Response: {}", response.text().await?);
            process::exit(1);
        }

        Ok(response.json().await?)
    }
}

fn print_json(value: &Value) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn news_items(feed: &Value) -> Vec<Value> {
    feed["articles"]
        .as_array()
        .map(|articles| {
            articles
                .iter()
                .filter(|article| article["title"].is_string())
                .map(|article| {
                    json!({
                        "title": article["title"],
                        "description": article["description"],
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let client = ScribeClient {
        http: Client::new(),
        base: cli.service_url,
    };

    let output = match cli.command {
        Commands::Blog { topic, keywords } => {
            let request = client
                .request(Method::POST, "/api/generate")?
                .json(&json!({ "topic": topic, "keywords": keywords }));
            client.send(request).await?
        }
        Commands::Tweets { content } => {
            let request = client
                .request(Method::POST, "/api/generate-tweet")?
                .json(&json!({ "content": content }));
            client.send(request).await?
        }
        Commands::Job { content } => {
            let request = client
                .request(Method::POST, "/api/generate-job-post")?
                .json(&json!({ "content": content }));
            client.send(request).await?
        }
        Commands::Article {
            title,
            description,
            keywords,
            content_type,
            difficulty,
            featured,
            image,
        } => {
            let payload = ArticleRequest {
                title,
                description,
                keywords,
                content_type,
                difficulty_level: difficulty,
                featured,
                generate_image: image,
            };
            let request = client.request(Method::POST, "/api/article")?.json(&payload);
            client.send(request).await?
        }
        Commands::Get { identifier } => {
            let request = client.request(Method::GET, &format!("/api/article/get/{identifier}"))?;
            client.send(request).await?
        }
        Commands::List {
            page,
            limit,
            status,
            search,
            sort_by,
            sort_order,
        } => {
            let mut params: Vec<(&str, String)> = Vec::new();
            if let Some(page) = page {
                params.push(("page", page.to_string()));
            }
            if let Some(limit) = limit {
                params.push(("limit", limit.to_string()));
            }
            for (key, value) in [
                ("status", status),
                ("search", search),
                ("sort_by", sort_by),
                ("sort_order", sort_order),
            ] {
                if let Some(value) = value {
                    params.push((key, value));
                }
            }

            let request = client.request(Method::GET, "/api/article/get")?.query(&params);
            client.send(request).await?
        }
        Commands::Update {
            identifier,
            title,
            description,
            content_file,
            status,
            featured,
            trending,
        } => {
            let content = match content_file {
                Some(path) => Some(tokio::fs::read_to_string(path).await?),
                None => None,
            };
            let payload = ArticleUpdate {
                title,
                description,
                content,
                status,
                featured,
                trending,
            };
            let request = client
                .request(Method::PUT, &format!("/api/article/{identifier}"))?
                .json(&payload);
            client.send(request).await?
        }
        Commands::News { query, from } => {
            let mut params: Vec<(&str, String)> = Vec::new();
            if let Some(query) = query {
                params.push(("q", query));
            }
            if let Some(from) = from {
                params.push(("from", from));
            }
            let request = client.request(Method::GET, "/api/news")?.query(&params);
            client.send(request).await?
        }
        Commands::Summarize { query, per_article } => {
            let mut search = client.request(Method::GET, "/api/news")?;
            if let Some(query) = query {
                search = search.query(&[("q", query)]);
            }
            let feed = client.send(search).await?;

            let articles = news_items(&feed);
            if articles.is_empty() {
                eprintln!("No news articles to summarize");
                process::exit(1);
            }

            let path = if per_article {
                "/api/hf-summarize"
            } else {
                "/api/summarize"
            };
            let request = client
                .request(Method::POST, path)?
                .json(&json!({ "articles": articles }));
            client.send(request).await?
        }
    };

    print_json(&output)
}
