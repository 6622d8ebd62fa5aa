// Relay client module: request shapes and a small blocking HTTP client for
// the Teleput relay. One call per invocation, no retries.

use anyhow::Context;
use reqwest::blocking::{multipart, Client};
use serde::Serialize;
use std::fs::File;
use std::path::PathBuf;

use crate::error::Result;

/// Plain text message, sent form-encoded to `/post`.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct TextPost {
    pub key: String,
    pub text: String,
}

/// File upload with an optional caption, sent as multipart to `/upload`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaPost {
    pub key: String,
    pub text: Option<String>,
    /// Ask the relay to skip recompressing the media.
    pub raw: bool,
    pub file_path: PathBuf,
    pub file_name: String,
    pub mime_type: Option<String>,
}

/// Status and body of the relay's answer. Only 200 counts as success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayResponse {
    pub status: u16,
    pub body: String,
}

impl RelayResponse {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

pub trait Relay {
    fn post_text(&self, post: &TextPost) -> Result<RelayResponse>;

    fn upload(&self, post: &MediaPost) -> Result<RelayResponse>;
}

/// Relay implementation over `reqwest`'s blocking client.
#[derive(Clone)]
pub struct RelayClient {
    client: Client,
    base_url: String,
}

impl RelayClient {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("teleput-cli/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(RelayClient {
            client,
            base_url: base_url.to_string(),
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint)
    }

    fn read_response(res: reqwest::blocking::Response) -> Result<RelayResponse> {
        let status = res.status().as_u16();
        let body = res.text().unwrap_or_default();
        log::debug!("relay answered {}", status);
        Ok(RelayResponse { status, body })
    }
}

impl Relay for RelayClient {
    fn post_text(&self, post: &TextPost) -> Result<RelayResponse> {
        let url = self.url("post");
        log::debug!("POST {} ({} bytes of text)", url, post.text.len());
        let res = self.client.post(&url).form(post).send()?;
        Self::read_response(res)
    }

    fn upload(&self, post: &MediaPost) -> Result<RelayResponse> {
        let url = self.url("upload");
        log::debug!(
            "POST {} with {} ({})",
            url,
            post.file_path.display(),
            post.mime_type.as_deref().unwrap_or("no content type")
        );

        let file = File::open(&post.file_path)?;
        let len = file.metadata()?.len();
        let mut part =
            multipart::Part::reader_with_length(file, len).file_name(post.file_name.clone());
        if let Some(mime) = &post.mime_type {
            part = part.mime_str(mime)?;
        }

        let mut form = multipart::Form::new().text("key", post.key.clone());
        if post.raw {
            form = form.text("raw", "1");
        }
        if let Some(text) = &post.text {
            form = form.text("text", text.clone());
        }
        let form = form.part("media", part);

        let res = self.client.post(&url).multipart(form).send()?;
        Self::read_response(res)
    }
}
