use std::collections::BTreeSet;

use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;
use reqwest::Client;
use tracing::{info, warn};

use crate::classify::Classification;
use crate::config::FeedConfig;
use crate::error::{FeedError, FetchError};
use crate::model::{FeedDocument, LineId};

/// The document and the instant it was fetched, always replaced together.
#[derive(Debug)]
struct Snapshot {
    document: FeedDocument,
    refreshed_at: DateTime<Tz>,
}

/// Owns the alerts endpoint and the last successfully fetched document.
#[derive(Debug)]
pub struct FeedSource {
    config: FeedConfig,
    tz: Tz,
    client: Client,
    snapshot: Option<Snapshot>,
}

impl FeedSource {
    /// Builds the source without fetching; reads fail with
    /// [`FeedError::NotYetFetched`] until the first [`refresh`](Self::refresh).
    pub fn new(config: FeedConfig) -> Result<Self, FeedError> {
        config.validate()?;
        let tz = config.tz()?;

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(FetchError::from)?;

        Ok(Self {
            config,
            tz,
            client,
            snapshot: None,
        })
    }

    /// Builds the source and performs the initial refresh.
    pub async fn connect(config: FeedConfig) -> Result<Self, FeedError> {
        let mut source = Self::new(config)?;
        source.refresh().await?;
        Ok(source)
    }

    /// Fetches the feed and swaps in the new document. On error the previous
    /// document and refresh time stay as they were.
    pub async fn refresh(&mut self) -> Result<(), FetchError> {
        let document = match self.fetch().await {
            Ok(document) => document,
            Err(e) => {
                warn!(endpoint = %self.config.endpoint, error = %e, "alert feed refresh failed");
                return Err(e);
            }
        };
        let refreshed_at = Utc::now().with_timezone(&self.tz);

        info!(
            entities = document.entities.len(),
            %refreshed_at,
            "alert feed refreshed"
        );
        self.snapshot = Some(Snapshot {
            document,
            refreshed_at,
        });
        Ok(())
    }

    async fn fetch(&self) -> Result<FeedDocument, FetchError> {
        let mut request = self.client.get(&self.config.endpoint);
        if let Some(key) = &self.config.api_key {
            request = request.query(&[("apikey", key)]);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let body = response.bytes().await?;
        Ok(FeedDocument::from_slice(&body)?)
    }

    pub fn current_document(&self) -> Result<&FeedDocument, FeedError> {
        self.snapshot
            .as_ref()
            .map(|snapshot| &snapshot.document)
            .ok_or(FeedError::NotYetFetched)
    }

    pub fn refreshed_at(&self) -> Result<DateTime<Tz>, FeedError> {
        self.snapshot
            .as_ref()
            .map(|snapshot| snapshot.refreshed_at)
            .ok_or(FeedError::NotYetFetched)
    }

    pub fn valid_lines(&self) -> &BTreeSet<LineId> {
        &self.config.lines
    }

    pub fn agency_id(&self) -> &str {
        &self.config.agency_id
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// Classifies the current document at `at`.
    pub fn classify<Z: TimeZone>(&self, at: &DateTime<Z>) -> Result<Classification, FeedError> {
        let document = self.current_document()?;
        Ok(Classification::evaluate(
            document,
            self.valid_lines(),
            self.agency_id(),
            at,
        ))
    }

    /// Classifies the current document at the present instant in the feed's zone.
    pub fn classify_now(&self) -> Result<Classification, FeedError> {
        self.classify(&Utc::now().with_timezone(&self.tz))
    }
}
