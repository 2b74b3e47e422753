/// Video provider backed by the YouTube Data API search endpoint
///
/// Only embeddable videos are requested; the first hit becomes an embed URL.
use reqwest::Client as HttpClient;

use crate::{
    error::{AppError, AppResult},
    models::{recipe_api::VideoSearchResponse, VideoRef},
    services::providers::VideoProvider,
};

const EMBED_BASE_URL: &str = "https://www.youtube.com/embed/";

#[derive(Clone)]
pub struct YouTubeProvider {
    http_client: HttpClient,
    api_url: String,
    api_key: Option<String>,
}

impl YouTubeProvider {
    pub fn new(http_client: HttpClient, api_url: String, api_key: Option<String>) -> Self {
        Self {
            http_client,
            api_url,
            api_key: api_key.filter(|key| !key.trim().is_empty()),
        }
    }
}

#[async_trait::async_trait]
impl VideoProvider for YouTubeProvider {
    async fn find_video(&self, recipe_name: &str) -> AppResult<VideoRef> {
        let Some(api_key) = &self.api_key else {
            return Ok(VideoRef::unavailable("Video search is not configured"));
        };

        let query = format!("{} recipe", recipe_name.trim());
        let response = self
            .http_client
            .get(&self.api_url)
            .query(&[
                ("q", query.as_str()),
                ("videoEmbeddable", "true"),
                ("type", "video"),
                ("key", api_key.as_str()),
                ("maxResults", "1"),
                ("part", "snippet"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(AppError::ExternalApi(format!(
                "Video search returned status {}",
                status
            )));
        }

        let body = response.text().await?;
        let results: VideoSearchResponse = serde_json::from_str(&body)
            .map_err(|e| AppError::Parse(format!("Unexpected video search response: {}", e)))?;

        let video = results
            .items
            .into_iter()
            .find_map(|item| item.id.video_id)
            .map(|id| VideoRef::Available {
                url: format!("{}{}", EMBED_BASE_URL, id),
            })
            .unwrap_or_else(|| VideoRef::unavailable(format!("No video found for '{}'", recipe_name)));

        tracing::info!(
            recipe = %recipe_name,
            found = video.is_available(),
            provider = self.name(),
            "Video search completed"
        );

        Ok(video)
    }

    fn name(&self) -> &'static str {
        "youtube"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn provider(server: &mockito::ServerGuard, key: Option<&str>) -> YouTubeProvider {
        YouTubeProvider::new(
            HttpClient::new(),
            format!("{}/youtube/v3/search", server.url()),
            key.map(str::to_string),
        )
    }

    #[tokio::test]
    async fn test_first_result_becomes_embed_url() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/youtube/v3/search")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("q".into(), "Veggie chilli recipe".into()),
                Matcher::UrlEncoded("videoEmbeddable".into(), "true".into()),
                Matcher::UrlEncoded("type".into(), "video".into()),
                Matcher::UrlEncoded("key".into(), "yt-key".into()),
            ]))
            .with_status(200)
            .with_body(
                json!({"items": [
                    {"id": {"kind": "youtube#video", "videoId": "abc123"}},
                    {"id": {"kind": "youtube#video", "videoId": "def456"}}
                ]})
                .to_string(),
            )
            .create_async()
            .await;

        let video = provider(&server, Some("yt-key"))
            .find_video("Veggie chilli")
            .await
            .unwrap();

        assert_eq!(
            video,
            VideoRef::Available {
                url: "https://www.youtube.com/embed/abc123".to_string()
            }
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_key_is_unavailable_without_request() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let video = provider(&server, None).find_video("Soup").await.unwrap();

        assert!(!video.is_available());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_blank_key_counts_as_missing() {
        let server = mockito::Server::new_async().await;
        let video = provider(&server, Some("  ")).find_video("Soup").await.unwrap();
        assert!(!video.is_available());
    }

    #[tokio::test]
    async fn test_no_results_is_unavailable() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/youtube/v3/search")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(json!({"items": []}).to_string())
            .create_async()
            .await;

        let video = provider(&server, Some("yt-key")).find_video("Soup").await.unwrap();
        assert!(matches!(video, VideoRef::Unavailable { .. }));
    }

    #[tokio::test]
    async fn test_quota_error_propagates() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/youtube/v3/search")
            .match_query(Matcher::Any)
            .with_status(403)
            .with_body(r#"{"error": {"code": 403}}"#)
            .create_async()
            .await;

        let result = provider(&server, Some("yt-key")).find_video("Soup").await;
        assert!(matches!(result, Err(AppError::ExternalApi(_))));
    }
}
