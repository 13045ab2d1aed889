//! Named-entity extraction with light post-processing.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;

use crate::model::{EntityModel, EntitySpan};

/// A deduplicated named entity found in a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Entity {
    /// Surface text of the entity.
    pub text: String,
    /// Entity label, e.g. `PER`, `ORG`, or `LOC`.
    pub label: String,
}

/// Extracts named entities through the NER sidecar.
pub struct EntityExtractor {
    model: Arc<dyn EntityModel>,
}

impl EntityExtractor {
    /// Create an extractor backed by `model`.
    pub fn new(model: Arc<dyn EntityModel>) -> Self {
        Self { model }
    }

    /// Extract entities from `text`.
    ///
    /// Extraction failures degrade to an empty list with a logged warning;
    /// document processing never fails because NER did.
    pub async fn extract(&self, text: &str) -> Vec<Entity> {
        match self.model.extract(text).await {
            Ok(spans) => normalize(spans),
            Err(error) => {
                tracing::warn!(error = %error, "Entity extraction failed; continuing without entities");
                Vec::new()
            }
        }
    }
}

/// Trim spans, drop empties, and dedupe (text, label) pairs preserving order.
fn normalize(spans: Vec<EntitySpan>) -> Vec<Entity> {
    let mut seen = HashSet::new();
    let mut entities = Vec::new();
    for span in spans {
        let text = span.text.trim();
        if text.is_empty() {
            continue;
        }
        let entity = Entity {
            text: text.to_string(),
            label: span.label.trim().to_string(),
        };
        if seen.insert(entity.clone()) {
            entities.push(entity);
        }
    }
    entities
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelClientError;
    use async_trait::async_trait;

    struct FixedModel {
        spans: Vec<EntitySpan>,
    }

    #[async_trait]
    impl EntityModel for FixedModel {
        async fn extract(&self, _text: &str) -> Result<Vec<EntitySpan>, ModelClientError> {
            Ok(self.spans.clone())
        }
    }

    struct BrokenModel;

    #[async_trait]
    impl EntityModel for BrokenModel {
        async fn extract(&self, _text: &str) -> Result<Vec<EntitySpan>, ModelClientError> {
            Err(ModelClientError::InvalidResponse("no pipeline".into()))
        }
    }

    fn span(text: &str, label: &str) -> EntitySpan {
        EntitySpan {
            text: text.to_string(),
            label: label.to_string(),
        }
    }

    #[tokio::test]
    async fn dedupes_while_preserving_order() {
        let extractor = EntityExtractor::new(Arc::new(FixedModel {
            spans: vec![
                span("Paris", "LOC"),
                span("Marie Curie", "PER"),
                span("Paris", "LOC"),
                span("Paris", "ORG"),
            ],
        }));

        let entities = extractor.extract("some text").await;

        assert_eq!(entities.len(), 3);
        assert_eq!(entities[0].text, "Paris");
        assert_eq!(entities[0].label, "LOC");
        assert_eq!(entities[1].text, "Marie Curie");
        assert_eq!(entities[2].label, "ORG");
    }

    #[tokio::test]
    async fn trims_and_drops_empty_spans() {
        let extractor = EntityExtractor::new(Arc::new(FixedModel {
            spans: vec![span("  Geneva  ", " LOC "), span("   ", "ORG")],
        }));

        let entities = extractor.extract("some text").await;

        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].text, "Geneva");
        assert_eq!(entities[0].label, "LOC");
    }

    #[tokio::test]
    async fn failures_degrade_to_an_empty_list() {
        let extractor = EntityExtractor::new(Arc::new(BrokenModel));
        let entities = extractor.extract("some text").await;
        assert!(entities.is_empty());
    }
}
