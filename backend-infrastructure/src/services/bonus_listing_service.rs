use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::info;

use backend_domain::{AlmanaxBonusListing, BonusListingSource, Language, SourceConfig};

use crate::utils::join_url;

/// Live catalog of bonus types per language edition.
pub struct HttpBonusListingSource {
    client: Client,
    base_url: String,
}

impl HttpBonusListingSource {
    pub fn new(config: &SourceConfig, client: Client) -> Self {
        Self {
            client,
            base_url: config.bonus_listing_url.clone(),
        }
    }

    pub fn listing_url(&self, lang: Language) -> String {
        join_url(&self.base_url, &format!("meta/{}/almanax/bonuses", lang))
    }
}

#[async_trait]
impl BonusListingSource for HttpBonusListingSource {
    async fn fetch_bonus_listing(&self, lang: Language) -> Result<Vec<AlmanaxBonusListing>> {
        let url = self.listing_url(lang);
        info!(lang = %lang, url = %url, "fetching bonus listing");
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(anyhow!("GET {} responded {}", url, response.status()));
        }
        let listing = response
            .json::<Vec<AlmanaxBonusListing>>()
            .await
            .map_err(|err| anyhow!("malformed bonus listing from {}: {}", url, err))?;
        Ok(listing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(url: &str) -> SourceConfig {
        SourceConfig {
            bonus_listing_url: url.to_string(),
            release_owner: "dofusdude".to_string(),
            release_repo: "dofus3-main".to_string(),
            release_asset: "MAPPED_ALMANAX.json".to_string(),
            github_token: None,
            request_timeout_seconds: 1,
        }
    }

    #[test]
    fn builds_language_url() {
        let source = HttpBonusListingSource::new(&config("https://api.dofusdu.de/dofus2/"), Client::new());
        assert_eq!(
            source.listing_url(Language::Fr),
            "https://api.dofusdu.de/dofus2/meta/fr/almanax/bonuses"
        );
    }

    #[tokio::test]
    async fn transport_failure_is_error() {
        let source = HttpBonusListingSource::new(&config("http://127.0.0.1:9"), Client::new());
        assert!(source.fetch_bonus_listing(Language::En).await.is_err());
    }
}
