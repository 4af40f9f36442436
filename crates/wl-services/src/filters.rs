//! Filter service
//!
//! Save, load, rename, and delete saved filters, and start collections.
//! Mutations are relayed to the collector before the local store is touched,
//! so a collector failure leaves the store unchanged.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};
use tracing::{info, instrument, warn};
use wl_contracts::{
    filter_changes, Contract, CreateFilterContract, RenameFilterContract, UpdateFilterContract,
};
use wl_core::config::{AppConfig, BuilderConfig};
use wl_core::error::{ValidationErrors, WlError};
use wl_core::result::WlResult;
use wl_core::traits::Id;
use wl_queries::compiler::compile;
use wl_queries::conditions::Condition;
use wl_queries::filter::{Filter, FilterConfig};

use crate::collector::{commands, CollectionRequest, CommandExecutor};
use crate::store::FilterStore;

/// Filter service
pub struct FilterService<S: FilterStore, E: CommandExecutor> {
    store: Arc<S>,
    executor: Arc<E>,
    config: BuilderConfig,
}

impl<S: FilterStore, E: CommandExecutor> FilterService<S, E> {
    pub fn new(store: Arc<S>, executor: Arc<E>) -> Self {
        Self {
            store,
            executor,
            config: AppConfig::default().builder,
        }
    }

    pub fn with_config(mut self, config: BuilderConfig) -> Self {
        self.config = config;
        self
    }

    /// All saved filters, newest first
    pub async fn list(&self) -> WlResult<Vec<Filter>> {
        Ok(self.store.list().await?)
    }

    /// Filters whose title or query contains `term`, ignoring case
    pub async fn search(&self, term: &str) -> WlResult<Vec<Filter>> {
        let term = term.trim();
        let mut filters = self.store.list().await?;
        filters.retain(|f| f.matches_search(term));
        Ok(filters)
    }

    /// Title and conditions of a saved filter, ready for the builder
    #[instrument(skip(self))]
    pub async fn load(&self, id: Id) -> WlResult<(String, Vec<Condition>)> {
        let filter = self.find(id).await?;
        let conditions = filter.conditions();
        Ok((filter.title, conditions))
    }

    /// Save under `title`, overwriting a filter that already uses it
    #[instrument(skip(self, title, conditions), fields(title = %title.trim()))]
    pub async fn save(&self, title: &str, conditions: &[Condition]) -> WlResult<Filter> {
        let title = title.trim();
        let existing = self.store.list().await?;
        let current = existing.iter().find(|f| f.title == title);

        let filter = Filter::from_conditions(title, conditions).with_id(current.and_then(|f| f.id));
        match current {
            Some(stored) => UpdateFilterContract::new(&existing, filter_changes(stored, &filter))
                .validate(&filter)?,
            None => CreateFilterContract::new(&existing).validate(&filter)?,
        }

        self.persist(filter).await
    }

    /// Save as a new filter; an existing title is a conflict
    #[instrument(skip(self, title, conditions), fields(title = %title.trim()))]
    pub async fn save_as(&self, title: &str, conditions: &[Condition]) -> WlResult<Filter> {
        let title = title.trim();
        if self.store.find_by_title(title).await?.is_some() {
            return Err(duplicate_title(title));
        }

        let existing = self.store.list().await?;
        let filter = Filter::from_conditions(title, conditions);
        CreateFilterContract::new(&existing).validate(&filter)?;

        self.persist(filter).await
    }

    /// Rename a saved filter; the unchanged title is a no-op
    #[instrument(skip(self))]
    pub async fn rename(&self, id: Id, new_title: &str) -> WlResult<Filter> {
        let stored = self.find(id).await?;
        let title = new_title.trim();
        if title == stored.title {
            return Ok(stored);
        }

        let existing = self.store.list().await?;
        if existing.iter().any(|f| f.title == title && f.id != Some(id)) {
            return Err(duplicate_title(title));
        }

        let mut filter = stored.clone();
        filter.title = title.to_string();
        RenameFilterContract::new(&existing, filter_changes(&stored, &filter)).validate(&filter)?;

        self.persist(filter).await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Id) -> WlResult<()> {
        let filter = self.find(id).await?;

        self.relay(commands::DELETE_FILTER, json!({ "id": id }))
            .await?;
        self.store.delete(id).await?;

        info!(id, title = %filter.title, "Filter deleted");
        Ok(())
    }

    /// Ask the collector to collect worklogs for the compiled conditions
    ///
    /// A blank title falls back to the configured collection title.
    #[instrument(skip(self, conditions))]
    pub async fn trigger_collection(
        &self,
        title: Option<&str>,
        conditions: &[Condition],
    ) -> WlResult<Value> {
        let jql = compile(conditions);
        if jql.is_empty() {
            let mut errors = ValidationErrors::new();
            errors.add("jql_query", "can't be blank");
            return Err(errors.into());
        }

        let title = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(self.config.default_collection_title.as_str());
        let request = CollectionRequest::new(jql)
            .titled(title)
            .with_config(FilterConfig::new(conditions.to_vec()));

        let reply = self
            .relay(commands::TRIGGER_COLLECTION, to_value(&request)?)
            .await?;

        info!(title = %request.filter_title, jql = %request.jql, "Collection triggered");
        Ok(reply)
    }

    /// Title a builder shows before the first save
    pub fn default_filter_title(&self) -> &str {
        &self.config.default_filter_title
    }

    async fn find(&self, id: Id) -> WlResult<Filter> {
        self.store
            .find(id)
            .await?
            .ok_or_else(|| WlError::not_found("Filter", "id", id))
    }

    async fn persist(&self, filter: Filter) -> WlResult<Filter> {
        self.relay(commands::SAVE_FILTER, to_value(&filter)?).await?;
        let saved = self.store.save(filter).await?;

        info!(id = ?saved.id, title = %saved.title, "Filter saved");
        Ok(saved)
    }

    async fn relay(&self, command: &str, data: Value) -> WlResult<Value> {
        self.executor.execute(command, data).await.map_err(|err| {
            warn!(command, error = %err, "Collector command failed");
            WlError::from(err)
        })
    }
}

fn duplicate_title(title: &str) -> WlError {
    WlError::conflict(format!("a filter named '{title}' already exists"))
}

fn to_value<T: Serialize>(value: &T) -> WlResult<Value> {
    serde_json::to_value(value).map_err(|e| WlError::Internal(e.to_string()))
}
