use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use reqwest::Client;

use crate::errors::TelemetryError;
use crate::fields::Schema;
use crate::host::HostContext;
use crate::local::introspect;
use crate::lookups::RemoteLookup;
use crate::snapshot::{Partial, SummaryLayout, TelemetrySnapshot};
use crate::types::Config;
use crate::utils::fetch_record;

#[cfg(feature = "tracing")]
use tracing::{debug, info, warn, instrument};

pub struct TelemetryCollector<H: HostContext> {
    pub config: Arc<Config>,
    host: Arc<H>,
    schema: Schema,
    lookups: Vec<RemoteLookup>,
    client: Client,
}

impl<H: HostContext> Clone for TelemetryCollector<H> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            host: self.host.clone(),
            schema: self.schema.clone(),
            lookups: self.lookups.clone(),
            client: self.client.clone(),
        }
    }
}

impl<H: HostContext> TelemetryCollector<H> {
    pub fn new(host: H, config: Option<Config>) -> Result<Self, TelemetryError> {
        let config = Arc::new(config.unwrap_or_default());
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(TelemetryError::Client)?;
        Ok(Self {
            lookups: RemoteLookup::standard(&config),
            schema: Schema::standard(),
            host: Arc::new(host),
            client,
            config,
        })
    }

    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schema = schema;
        self
    }

    pub fn with_lookups(mut self, lookups: Vec<RemoteLookup>) -> Self {
        self.lookups = lookups;
        self
    }

    /// A collector for another host sharing this one's config, lookups,
    /// schema and HTTP connection pool.
    pub fn with_host<H2: HostContext>(&self, host: H2) -> TelemetryCollector<H2> {
        TelemetryCollector {
            config: self.config.clone(),
            host: Arc::new(host),
            schema: self.schema.clone(),
            lookups: self.lookups.clone(),
            client: self.client.clone(),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn collect_local(&self) -> Partial {
        let mini_app = self.host.mini_app();
        introspect(&self.host.device(), mini_app.as_ref())
            .into_iter()
            .collect()
    }

    /// Runs one lookup. Never fails: on any error every field the lookup owns
    /// carries its fallback.
    #[cfg_attr(feature = "tracing", instrument(skip(self, lookup), fields(lookup = lookup.name)))]
    pub async fn collect_remote(&self, lookup: &RemoteLookup) -> Partial {
        let mapped = fetch_record(&self.client, &lookup.endpoint)
            .await
            .and_then(|record| lookup.map_record(&record));
        match mapped {
            Ok(values) => values.into_iter().collect(),
            Err(_e) => {
                #[cfg(feature = "tracing")]
                warn!(error = %_e, endpoint = %lookup.endpoint, "Lookup failed, using fallbacks");
                lookup.fallbacks().into_iter().collect()
            }
        }
    }

    /// Builds a complete snapshot: local values first, then every relevant
    /// lookup concurrently, each merged as soon as it resolves.
    pub async fn collect(&self) -> TelemetrySnapshot {
        let mut snapshot = TelemetrySnapshot::new(self.schema.clone());
        merge(&mut snapshot, &self.collect_local());

        let mut pending: FuturesUnordered<_> = self
            .lookups
            .iter()
            .filter(|lookup| lookup.targets().any(|f| self.schema.contains(f)))
            .map(|lookup| self.collect_remote(lookup))
            .collect();

        #[cfg(feature = "tracing")]
        debug!(id = %snapshot.id(), lookups = pending.len(), "Collecting snapshot");

        while let Some(partial) = pending.next().await {
            merge(&mut snapshot, &partial);
        }

        // Declared fields no lookup owns still get a value.
        let uncovered: Partial = snapshot
            .pending()
            .into_iter()
            .map(|field| (field, field.fallback().to_string()))
            .collect();
        if !uncovered.is_empty() {
            #[cfg(feature = "tracing")]
            debug!(
                id = %snapshot.id(),
                fields = uncovered.len(),
                "No lookup owns some fields, using fallbacks"
            );
            merge(&mut snapshot, &uncovered);
        }

        #[cfg(feature = "tracing")]
        info!(id = %snapshot.id(), state = ?snapshot.state(), "Snapshot collected");
        snapshot
    }

    /// Hands the summary of a Ready snapshot to the host's bridge.
    pub fn send(
        &self,
        snapshot: &TelemetrySnapshot,
        layout: &SummaryLayout,
    ) -> Result<String, TelemetryError> {
        let bridge = self.host.bridge().ok_or(TelemetryError::NoBridge)?;
        let payload = snapshot.serialize(layout)?;
        #[cfg(feature = "tracing")]
        debug!(id = %snapshot.id(), %payload, "Sending summary");
        bridge.send_data(payload.clone());
        Ok(payload)
    }

    /// Collects a fresh snapshot and sends it once every field has resolved.
    pub async fn collect_and_send(
        &self,
        layout: &SummaryLayout,
    ) -> Result<TelemetrySnapshot, TelemetryError> {
        if self.host.bridge().is_none() {
            return Err(TelemetryError::NoBridge);
        }
        let snapshot = self.collect().await;
        self.send(&snapshot, layout)?;
        Ok(snapshot)
    }
}

fn merge(snapshot: &mut TelemetrySnapshot, partial: &Partial) {
    // Lookups own disjoint fields, so a snapshot only seals on the last merge.
    if let Err(_e) = snapshot.merge_into(partial) {
        #[cfg(feature = "tracing")]
        warn!(error = %_e, "Dropped values for a sealed snapshot");
    }
}
