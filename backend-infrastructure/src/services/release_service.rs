// Mapped almanax data published as a GitHub release asset

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use tracing::info;

use backend_domain::{MappedMultilangNpcAlmanax, ReleaseAssetSource, SourceConfig};

const GITHUB_API: &str = "https://api.github.com";

#[derive(Debug, Deserialize)]
struct Release {
    #[serde(default)]
    assets: Vec<ReleaseAsset>,
}

#[derive(Debug, Deserialize)]
struct ReleaseAsset {
    id: u64,
    name: String,
    url: String,
}

pub struct GithubReleaseSource {
    client: Client,
    owner: String,
    repo: String,
    asset: String,
    token: Option<String>,
}

impl GithubReleaseSource {
    pub fn new(config: &SourceConfig, client: Client) -> Self {
        Self {
            client,
            owner: config.release_owner.clone(),
            repo: config.release_repo.clone(),
            asset: config.release_asset.clone(),
            token: config.github_token.clone(),
        }
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn release_url(&self, tag: &str) -> String {
        format!(
            "{}/repos/{}/{}/releases/tags/{}",
            GITHUB_API, self.owner, self.repo, tag
        )
    }
}

fn select_asset<'a>(release: &'a Release, name: &str) -> Result<&'a ReleaseAsset> {
    release
        .assets
        .iter()
        .find(|asset| asset.name == name)
        .ok_or_else(|| anyhow!("could not find asset with name {}", name))
}

#[async_trait]
impl ReleaseAssetSource for GithubReleaseSource {
    async fn fetch_mapped_almanax(&self, tag: &str) -> Result<Vec<MappedMultilangNpcAlmanax>> {
        let release: Release = self
            .authorized(self.client.get(self.release_url(tag)))
            .header(ACCEPT, "application/vnd.github+json")
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        let asset = select_asset(&release, &self.asset)?;
        info!(tag, asset_id = asset.id, "downloading release asset");

        let bytes = self
            .authorized(self.client.get(&asset.url))
            .header(ACCEPT, "application/octet-stream")
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        let records = serde_json::from_slice(&bytes)
            .map_err(|err| anyhow!("malformed {}: {}", self.asset, err))?;
        Ok(records)
    }
}
