// src/services/fetcher.rs

//! Registrar schedule fetcher.
//!
//! Posts a templated search form to the registrar and hands back the raw
//! result page. Scraping is best-effort: a non-success status is logged and
//! turned into an empty page rather than an error.

use std::fs;
use std::path::Path;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;

use crate::error::Result;
use crate::models::{RegistrarConfig, Term};
use crate::utils::http;

/// Built-in search form used when the template file cannot be read.
pub const DEFAULT_TEMPLATE: &str = include_str!("../../data/schedule_request.txt");

/// Request body template with `{year}` and `{term}` placeholders.
#[derive(Debug, Clone)]
pub struct RequestTemplate {
    body: String,
}

impl RequestTemplate {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into().trim_end().to_string(),
        }
    }

    /// Read a template file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(fs::read_to_string(path)?))
    }

    /// Read a template file, falling back to [`DEFAULT_TEMPLATE`].
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Request template load failed from {:?}: {}. Using built-in template.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Substitute the year and the term's registrar code.
    pub fn render(&self, year: &str, term: Term) -> String {
        self.body
            .replace("{year}", year)
            .replace("{term}", term.registrar_code())
    }
}

impl Default for RequestTemplate {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPLATE)
    }
}

/// Source of raw schedule markup for a term.
#[async_trait]
pub trait ScheduleSource: Send + Sync {
    /// Fetch the schedule page. An empty string means nothing was available.
    async fn fetch(&self, year: &str, term: Term) -> Result<String>;
}

/// HTTP client for the registrar's schedule search.
pub struct RegistrarClient {
    client: Client,
    endpoint: String,
    template: RequestTemplate,
}

impl RegistrarClient {
    pub fn new(config: &RegistrarConfig, template: RequestTemplate) -> Result<Self> {
        Ok(Self {
            client: http::create_async_client(config)?,
            endpoint: config.endpoint.clone(),
            template,
        })
    }

    /// Build a client, reading the request template named by the config.
    pub fn from_config(config: &RegistrarConfig) -> Result<Self> {
        let template = RequestTemplate::load_or_default(&config.template_path);
        Self::new(config, template)
    }
}

#[async_trait]
impl ScheduleSource for RegistrarClient {
    async fn fetch(&self, year: &str, term: Term) -> Result<String> {
        let data = self.template.render(year, term);
        log::debug!("data = {}", data);

        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(data.clone())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            log::warn!("{} returned for {}", status.as_u16(), data);
            return Ok(String::new());
        }

        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> RegistrarConfig {
        RegistrarConfig {
            endpoint: format!("{}/schedule", server.uri()),
            timeout_secs: 5,
            ..RegistrarConfig::default()
        }
    }

    #[test]
    fn test_render_substitutes_year_and_code() {
        let template = RequestTemplate::new("term_in={year}{term}&sel_subj=%25\n");
        assert_eq!(template.render("2021", Term::Fall), "term_in=202108&sel_subj=%25");
        assert_eq!(template.render("2022", Term::Summer), "term_in=202205&sel_subj=%25");
    }

    #[test]
    fn test_default_template_has_placeholders() {
        let rendered = RequestTemplate::default().render("2021", Term::Spring);
        assert!(rendered.starts_with("term_in=202102&"));
        assert!(!rendered.contains('{'));
    }

    #[test]
    fn test_load_or_default_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("template.txt");
        std::fs::write(&file, "year={year}").unwrap();

        let template = RequestTemplate::load_or_default(&file);
        assert_eq!(template.render("2020", Term::Fall), "year=2020");

        let fallback = RequestTemplate::load_or_default(dir.path().join("missing"));
        assert!(fallback.render("2020", Term::Fall).contains("term_in=202008"));
    }

    #[tokio::test]
    async fn test_fetch_posts_rendered_form() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/schedule"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string_contains("term_in=202108"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
            .expect(1)
            .mount(&server)
            .await;

        let client = RegistrarClient::new(
            &config_for(&server),
            RequestTemplate::new("term_in={year}{term}"),
        )
        .unwrap();
        let markup = client.fetch("2021", Term::Fall).await.unwrap();
        assert_eq!(markup, "<html>ok</html>");
    }

    #[tokio::test]
    async fn test_fetch_non_success_returns_empty() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("down"))
            .mount(&server)
            .await;

        let client = RegistrarClient::new(&config_for(&server), RequestTemplate::default()).unwrap();
        let markup = client.fetch("2021", Term::Spring).await.unwrap();
        assert!(markup.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_accepts_any_2xx() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("term_in=202102"))
            .respond_with(ResponseTemplate::new(201).set_body_string("<html>created</html>"))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(body_string_contains("term_in=202105"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let client = RegistrarClient::new(
            &config_for(&server),
            RequestTemplate::new("term_in={year}{term}"),
        )
        .unwrap();
        assert_eq!(
            client.fetch("2021", Term::Spring).await.unwrap(),
            "<html>created</html>"
        );
        assert!(client.fetch("2021", Term::Summer).await.unwrap().is_empty());
    }
}
