use async_trait::async_trait;
use reqwest::{
    Client, RequestBuilder, Response,
    header::{ACCEPT, AUTHORIZATION, USER_AGENT},
};
use serde::{Deserialize, Serialize};

use crate::domain::post::Post;
use crate::domain::trigger::ThreadId;
use crate::error::{AppError, AppResult};
use crate::services::ThreadStore;

const PAGE_SIZE: usize = 100;

pub struct GitHubClient {
    http: Client,
    api_url: String,
    token: Option<String>,
}

impl GitHubClient {
    pub fn new(api_url: String, token: Option<String>) -> Self {
        Self {
            http: Client::new(),
            api_url,
            token,
        }
    }

    fn token(&self) -> AppResult<&str> {
        self.token
            .as_deref()
            .filter(|token| !token.is_empty())
            .ok_or_else(|| AppError::Reconciliation("GitHub token not configured".to_string()))
    }

    fn comments_endpoint(&self, thread: &ThreadId) -> String {
        format!(
            "{}/repos/{}/{}/issues/{}/comments",
            self.api_url.trim_end_matches('/'),
            thread.owner,
            thread.repo,
            thread.number
        )
    }

    fn comment_endpoint(&self, thread: &ThreadId, comment_id: u64) -> String {
        format!(
            "{}/repos/{}/{}/issues/comments/{}",
            self.api_url.trim_end_matches('/'),
            thread.owner,
            thread.repo,
            comment_id
        )
    }

    fn authorized(&self, request: RequestBuilder) -> AppResult<RequestBuilder> {
        let token = self.token()?;
        Ok(request
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .header(ACCEPT, "application/vnd.github+json")
            .header(USER_AGENT, concat!("apidiff-gate/", env!("CARGO_PKG_VERSION")))
            .header("X-GitHub-Api-Version", "2022-11-28"))
    }

    async fn send(request: RequestBuilder) -> AppResult<Response> {
        let response = request
            .send()
            .await
            .map_err(|err| AppError::Reconciliation(format!("failed to call GitHub: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unable to read response>".to_string());
            return Err(AppError::Reconciliation(format!(
                "GitHub responded with {status}: {body}"
            )));
        }
        Ok(response)
    }

    async fn fetch_page(&self, endpoint: &str, page: usize) -> AppResult<Vec<IssueComment>> {
        let request = self.http.get(endpoint).query(&[
            ("per_page", PAGE_SIZE.to_string()),
            ("page", page.to_string()),
        ]);
        let response = Self::send(self.authorized(request)?).await?;
        Self::decode(response).await
    }

    async fn decode<T: for<'de> Deserialize<'de>>(response: Response) -> AppResult<T> {
        response.json().await.map_err(|err| {
            AppError::Reconciliation(format!("failed to parse GitHub response: {err}"))
        })
    }
}

#[async_trait]
impl ThreadStore for GitHubClient {
    async fn list_posts(&self, thread: &ThreadId) -> AppResult<Vec<Post>> {
        let endpoint = self.comments_endpoint(thread);
        let endpoint = endpoint.as_str();
        let comments = collect_pages(move |page| self.fetch_page(endpoint, page)).await?;
        Ok(comments.into_iter().map(IssueComment::into_post).collect())
    }

    async fn create_post(&self, thread: &ThreadId, body: &str) -> AppResult<Post> {
        let request = self
            .http
            .post(self.comments_endpoint(thread))
            .json(&CommentRequest { body });
        let response = Self::send(self.authorized(request)?).await?;
        let comment: IssueComment = Self::decode(response).await?;
        Ok(comment.into_post())
    }

    async fn update_post(&self, thread: &ThreadId, post_id: u64, body: &str) -> AppResult<Post> {
        let request = self
            .http
            .patch(self.comment_endpoint(thread, post_id))
            .json(&CommentRequest { body });
        let response = Self::send(self.authorized(request)?).await?;
        let comment: IssueComment = Self::decode(response).await?;
        Ok(comment.into_post())
    }
}

/// Requests pages 1, 2, ... until one comes back shorter than [`PAGE_SIZE`].
async fn collect_pages<T, F, Fut>(mut fetch: F) -> AppResult<Vec<T>>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = AppResult<Vec<T>>>,
{
    let mut items = Vec::new();
    let mut page = 1usize;
    loop {
        let batch = fetch(page).await?;
        let fetched = batch.len();
        items.extend(batch);
        if fetched < PAGE_SIZE {
            return Ok(items);
        }
        page += 1;
    }
}

#[derive(Serialize)]
struct CommentRequest<'a> {
    body: &'a str,
}

#[derive(Deserialize)]
struct IssueComment {
    id: u64,
    body: Option<String>,
}

impl IssueComment {
    fn into_post(self) -> Post {
        Post {
            id: self.id,
            body: self.body.unwrap_or_default(),
        }
    }
}
