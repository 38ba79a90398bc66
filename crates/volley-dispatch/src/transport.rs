//! Outbound delivery seam.
//!
//! The cycle executor talks to [`Transport`] only; [`DiscordTransport`] is
//! the production implementation against the Discord REST API, and tests
//! substitute a recording mock.

use async_trait::async_trait;

use crate::error::{DispatchError, Result};

/// Cap on upstream error bodies quoted into log messages.
const ERROR_BODY_MAX: usize = 200;

/// A resolved attachment ready for multipart upload.
#[derive(Debug, Clone)]
pub struct FilePart {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// One-shot message delivery to a single channel.
///
/// Both methods resolve to `Ok(())` only on transport success plus an
/// upstream-acknowledged (2xx) status.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send_text(&self, token: &str, channel_id: &str, content: &str) -> Result<()>;

    async fn send_with_files(
        &self,
        token: &str,
        channel_id: &str,
        content: &str,
        files: Vec<FilePart>,
    ) -> Result<()>;
}

/// Delivery via `POST {api_base}/channels/{id}/messages`.
pub struct DiscordTransport {
    client: reqwest::Client,
    api_base: String,
}

impl DiscordTransport {
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: api_base.into(),
        }
    }

    fn messages_url(&self, channel_id: &str) -> String {
        format!("{}/channels/{}/messages", self.api_base, channel_id.trim())
    }
}

#[async_trait]
impl Transport for DiscordTransport {
    async fn send_text(&self, token: &str, channel_id: &str, content: &str) -> Result<()> {
        let resp = self
            .client
            .post(self.messages_url(channel_id))
            .header("Authorization", token)
            .json(&serde_json::json!({ "content": content }))
            .send()
            .await?;
        check_status(resp).await
    }

    async fn send_with_files(
        &self,
        token: &str,
        channel_id: &str,
        content: &str,
        files: Vec<FilePart>,
    ) -> Result<()> {
        let mut form = reqwest::multipart::Form::new().text("content", content.to_string());
        for (i, file) in files.into_iter().enumerate() {
            form = form.part(
                format!("files[{i}]"),
                reqwest::multipart::Part::bytes(file.bytes).file_name(file.filename),
            );
        }

        let resp = self
            .client
            .post(self.messages_url(channel_id))
            .header("Authorization", token)
            .multipart(form)
            .send()
            .await?;
        check_status(resp).await
    }
}

/// Map a non-2xx response to `Upstream` with a clipped body for the log.
async fn check_status(resp: reqwest::Response) -> Result<()> {
    let status = resp.status();
    if status.is_success() {
        return Ok(());
    }
    let body = resp.text().await.unwrap_or_default();
    Err(DispatchError::Upstream {
        status: status.as_u16(),
        body: clip(&body),
    })
}

fn clip(body: &str) -> String {
    if body.len() <= ERROR_BODY_MAX {
        return body.to_string();
    }
    let mut end = ERROR_BODY_MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &body[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_bodies_pass_through() {
        assert_eq!(clip("{\"code\": 50001}"), "{\"code\": 50001}");
    }

    #[test]
    fn long_bodies_are_clipped() {
        let body = "x".repeat(500);
        let clipped = clip(&body);
        assert!(clipped.len() < body.len());
        assert!(clipped.ends_with('…'));
    }

    #[test]
    fn clip_respects_char_boundaries() {
        let body = "é".repeat(ERROR_BODY_MAX);
        let clipped = clip(&body);
        assert!(clipped.ends_with('…'));
    }

    #[test]
    fn messages_url_trims_channel_whitespace() {
        let t = DiscordTransport::new("https://discord.com/api/v10");
        assert_eq!(
            t.messages_url(" 12345 "),
            "https://discord.com/api/v10/channels/12345/messages"
        );
    }
}
