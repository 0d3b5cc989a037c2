use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};
use tracing::{event, Level};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Product,
    User,
}

impl Resource {
    fn label(self) -> &'static str {
        match self {
            Resource::Product => "product",
            Resource::User => "user",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Create,
    Update,
    Delete,
}

impl MutationKind {
    fn label(self) -> &'static str {
        match self {
            MutationKind::Create => "create",
            MutationKind::Update => "update",
            MutationKind::Delete => "delete",
        }
    }
}

pub trait MetricsService: Send + Sync {
    fn record_mutation(&self, resource: Resource, kind: MutationKind, succeeded: bool);
    fn render(&self) -> String;
}

/// Counts entity mutations in a registry owned by the service.
pub struct PrometheusMetricsService {
    registry: Registry,
    mutations: IntCounterVec,
}

impl PrometheusMetricsService {
    pub fn new() -> Result<PrometheusMetricsService, prometheus::Error> {
        let registry = Registry::new();
        let mutations = IntCounterVec::new(
            Opts::new(
                "inventory_mutations_total",
                "Entity mutations by resource, operation and outcome",
            ),
            &["resource", "operation", "outcome"],
        )?;
        registry.register(Box::new(mutations.clone()))?;

        Ok(PrometheusMetricsService {
            registry,
            mutations,
        })
    }
}

impl MetricsService for PrometheusMetricsService {
    fn record_mutation(&self, resource: Resource, kind: MutationKind, succeeded: bool) {
        let outcome = if succeeded { "success" } else { "failure" };
        self.mutations
            .with_label_values(&[resource.label(), kind.label(), outcome])
            .inc();
    }

    fn render(&self) -> String {
        let mut buffer = vec![];
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
            event!(Level::WARN, "Error occurred while encoding metrics: {}", e);
            return String::new();
        }

        String::from_utf8(buffer).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mutations_are_rendered_with_labels() {
        let metrics = PrometheusMetricsService::new().unwrap();
        metrics.record_mutation(Resource::Product, MutationKind::Delete, true);
        metrics.record_mutation(Resource::Product, MutationKind::Delete, true);
        metrics.record_mutation(Resource::User, MutationKind::Create, false);

        let text = metrics.render();
        assert!(text.contains(
            r#"inventory_mutations_total{operation="delete",outcome="success",resource="product"} 2"#
        ));
        assert!(text.contains(
            r#"inventory_mutations_total{operation="create",outcome="failure",resource="user"} 1"#
        ));
    }
}
