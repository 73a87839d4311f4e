use std::sync::Arc;

use itertools::Itertools;
use log::{debug, error, info};
use serde_json::Value;

use crate::config::PaginationConfig;
use crate::error::CoreError;
use crate::logic::filter::build_filters;
use crate::logic::mutation::{resolve_outcome, validate_mutation};
use crate::logic::pagination::{envelope, LinkTemplate, PageWindow};
use crate::logic::registry::ResourceRegistry;
use crate::logic::sort::resolve_sort;
use crate::model::{MutationRequest, PageEnvelope, QuerySpec};
use crate::store::traits::RecordStore;

/// Query parameters that control paging and ordering rather than filtering.
pub const RESERVED_PARAMS: &[&str] = &["limit", "offset", "sort_by", "sort_order"];

/// Validates list and mutation requests and runs them against a store.
///
/// Holds no per-request state; one instance is shared by every request.
#[derive(Debug)]
pub struct QueryEngine<S> {
    registry: ResourceRegistry,
    store: Arc<S>,
    default_limit: i64,
    prefix: String,
}

impl<S: RecordStore> QueryEngine<S> {
    pub fn new(registry: ResourceRegistry, store: Arc<S>, pagination: &PaginationConfig, prefix: impl Into<String>) -> Self {
        Self {
            registry,
            store,
            default_limit: pagination.default_limit,
            prefix: prefix.into(),
        }
    }

    pub fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Validate raw query pairs into a query. Never touches the store.
    pub fn plan(&self, resource: &str, params: &[(String, String)]) -> Result<QuerySpec, CoreError> {
        let descriptor = self.registry.describe(resource)?;

        if let Some(key) = params.iter().map(|(k, _)| k).duplicates().next() {
            return Err(CoreError::invalid_parameter(key.as_str(), "given more than once"));
        }
        let lookup = |name: &str| params.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str());

        let window = PageWindow::parse(
            lookup("limit"),
            lookup("offset"),
            self.default_limit.min(descriptor.max_limit),
            descriptor.max_limit,
        )?;
        let filters = build_filters(
            descriptor,
            params
                .iter()
                .filter(|(k, _)| !RESERVED_PARAMS.contains(&k.as_str()))
                .map(|(k, v)| (k.as_str(), v.as_str())),
        )?;
        let sort = resolve_sort(descriptor, lookup("sort_by"), lookup("sort_order"));

        Ok(QuerySpec {
            resource: descriptor.name,
            table: descriptor.table.clone(),
            filters,
            sort,
            limit: window.limit,
            offset: window.offset,
        })
    }

    /// List one page of a resource. The count and the page share one
    /// predicate; a window past the end skips the page query entirely.
    pub async fn list(&self, resource: &str, params: &[(String, String)]) -> Result<PageEnvelope, CoreError> {
        let query = self.plan(resource, params).inspect_err(|e| debug!("Rejected {} query: {}", resource, e))?;
        let window = PageWindow {
            limit: query.limit,
            offset: query.offset,
        };

        let total = self
            .store
            .count(&query)
            .await
            .map_err(|e| store_failure(resource, "count", e))?;
        let data = if window.is_past_end(total) {
            Vec::new()
        } else {
            self.store
                .fetch(&query)
                .await
                .map_err(|e| store_failure(resource, "fetch", e))?
        };

        info!(
            "Fetched {} {} records (limit={}, offset={}, total={})",
            data.len(),
            resource,
            window.limit,
            window.offset,
            total
        );

        let path = format!("{}/{}", self.prefix, resource);
        let links = LinkTemplate { path: &path, params };
        Ok(envelope(data, total, window, &links))
    }

    /// Apply `PATCH /{resource}/{id}/{segment}` with a JSON body. Returns
    /// the field's success message.
    pub async fn mutate(&self, resource: &str, id: &str, segment: &str, body: &Value) -> Result<&'static str, CoreError> {
        let descriptor = self.registry.describe(resource)?;
        if !body.is_object() {
            return Err(CoreError::invalid_parameter("body", "expected a JSON object"));
        }
        let field = descriptor.mutable_field(segment);
        let value_field = field.map_or(segment, |f| f.column);
        let mut request = MutationRequest::from_body(id, segment, descriptor.id_field, value_field, body);
        if let Some(companion) = field.and_then(|f| f.companion.as_ref()) {
            request = request.with_companion(companion.column, body);
        }

        let validated = validate_mutation(descriptor, &request)
            .inspect_err(|e| debug!("Rejected {} {} update for {}: {}", resource, segment, id, e))?;
        let result = self
            .store
            .update(&validated.statement)
            .await
            .map_err(|e| store_failure(resource, "update", e))?;
        resolve_outcome(descriptor, id, result)?;

        info!("Updated {} of {} {}", validated.field.column, resource, id);
        Ok(validated.field.success_message)
    }
}

fn store_failure(resource: &str, operation: &str, err: anyhow::Error) -> CoreError {
    error!("Error during {} {}: {:#}", resource, operation, err);
    CoreError::from(err)
}
