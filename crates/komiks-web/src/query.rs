use std::rc::Rc;

use anyhow::{bail, Context};
use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::common::{AccessToken, ComicBase, ComicDetail, Page};
use crate::storage::{TokenStorage, TOKEN_KEY};

/// Backend endpoints the reader store depends on.
#[async_trait(?Send)]
pub trait ComicApi {
    async fn fetch_comic(&self, comic_id: i64) -> Result<ComicDetail, anyhow::Error>;

    /// Pages of a chapter in server order. A `null` body is an empty chapter.
    async fn fetch_chapter_pages(&self, chapter_id: i64) -> Result<Vec<Page>, anyhow::Error>;
}

/// Comic listings served by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComicList {
    All,
    Recommended,
    Newest,
}

impl ComicList {
    fn path(&self) -> &'static str {
        match self {
            ComicList::All => "comic/",
            ComicList::Recommended => "comic/recomm",
            ComicList::Newest => "comic/new_5",
        }
    }
}

pub struct RestClient {
    host: String,
    client: reqwest::Client,
    storage: Rc<dyn TokenStorage>,
}

impl RestClient {
    pub fn new(host: String, storage: Rc<dyn TokenStorage>) -> Self {
        Self {
            host,
            client: reqwest::Client::new(),
            storage,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.host, path)
    }

    fn with_token(&self, req: RequestBuilder) -> RequestBuilder {
        let token = self
            .storage
            .get(TOKEN_KEY)
            .ok()
            .flatten()
            .unwrap_or_else(|| "".to_string());

        if token.is_empty() {
            req
        } else {
            req.header("Authorization", format!("Bearer {}", token))
        }
    }

    async fn get(&self, path: &str) -> Result<Response, anyhow::Error> {
        let url = self.url(path);
        debug!("GET {}", url);

        let res = self.with_token(self.client.get(&url)).send().await?;
        check_status(&url, res.status())?;

        Ok(res)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, anyhow::Error> {
        self.get(path)
            .await?
            .json()
            .await
            .with_context(|| format!("error parse response of {}", path))
    }

    pub async fn fetch_comics(&self, list: ComicList) -> Result<Vec<ComicBase>, anyhow::Error> {
        self.get_json(list.path()).await
    }

    /// Exchanges credentials for a bearer token.
    pub async fn user_login(&self, username: String, password: String) -> Result<String, anyhow::Error> {
        let url = self.url("user/login");
        let res = self
            .client
            .post(&url)
            .form(&[("username", username), ("password", password)])
            .send()
            .await?;
        check_status(&url, res.status())?;
        let token: AccessToken = res.json().await?;

        Ok(token.access_token)
    }
}

fn check_status(url: &str, status: StatusCode) -> Result<(), anyhow::Error> {
    if !status.is_success() {
        bail!("request to {} failed: {}", url, status);
    }

    Ok(())
}

/// The chapter endpoint answers `null` for a chapter without pages.
fn decode_pages(body: &[u8]) -> Result<Vec<Page>, anyhow::Error> {
    let pages: Option<Vec<Page>> =
        serde_json::from_slice(body).context("error parse chapter pages")?;

    Ok(pages.unwrap_or_default())
}

#[async_trait(?Send)]
impl ComicApi for RestClient {
    async fn fetch_comic(&self, comic_id: i64) -> Result<ComicDetail, anyhow::Error> {
        self.get_json(&format!("comic/comics/{}", comic_id)).await
    }

    async fn fetch_chapter_pages(&self, chapter_id: i64) -> Result<Vec<Page>, anyhow::Error> {
        let body = self
            .get(&format!("comic/chapters/{}", chapter_id))
            .await?
            .bytes()
            .await?;

        decode_pages(&body)
    }
}
