//! Change-stream dispatch.
//!
//! Decodes batches of [`StreamRecord`]s into typed [`EntityChange`]s and hands each one
//! to a [`ChangeHandler`]. Records no entity schema claims are skipped.

use async_trait::async_trait;

use slackmap_core::stream::{decode_stream_record, EntityChange, StreamRecord};

/// Receives decoded table changes.
#[async_trait]
pub trait ChangeHandler: Send + Sync {
    async fn handle(&self, change: EntityChange) -> anyhow::Result<()>;
}

/// Outcome of dispatching one batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    pub dispatched: usize,
    pub skipped: usize,
}

pub struct StreamDispatcher<H> {
    handler: H,
}

impl<H: ChangeHandler> StreamDispatcher<H> {
    pub fn new(handler: H) -> Self {
        Self { handler }
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Dispatches records in order, stopping at the first decode or handler error.
    pub async fn dispatch(&self, records: &[StreamRecord]) -> anyhow::Result<DispatchSummary> {
        let mut summary = DispatchSummary::default();

        for record in records {
            match decode_stream_record(record)? {
                Some(change) => {
                    tracing::debug!(entity = %change.kind(), change = ?change.change(), "Dispatching change");
                    self.handler.handle(change).await?;
                    summary.dispatched += 1;
                }
                None => {
                    tracing::debug!(keys = ?record.keys, "Skipping record with no matching schema");
                    summary.skipped += 1;
                }
            }
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use slackmap_core::entities::{
        CountryInfoAttrs, CountryKeys, EditorAttrs, EditorKeys, EditorType, EntityKind,
        FeatureType, COUNTRY_INFO, FEATURE_EDITOR,
    };
    use slackmap_core::storage::FlatRecord;
    use slackmap_core::stream::ChangeKind;
    use slackmap_core::transform::Entity;
    use tokio::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<(EntityKind, ChangeKind)>>,
    }

    #[async_trait]
    impl ChangeHandler for Recorder {
        async fn handle(&self, change: EntityChange) -> anyhow::Result<()> {
            self.seen.lock().await.push((change.kind(), change.change()));
            Ok(())
        }
    }

    struct Failing;

    #[async_trait]
    impl ChangeHandler for Failing {
        async fn handle(&self, _: EntityChange) -> anyhow::Result<()> {
            anyhow::bail!("downstream unavailable")
        }
    }

    fn editor_image() -> FlatRecord {
        FEATURE_EDITOR
            .item_to_attrs(&Entity::new(
                EditorKeys::for_feature("abc123", FeatureType::Line)
                    .with_user("u1")
                    .with_editor_type(EditorType::Owner),
                EditorAttrs {
                    created_date_time: Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap(),
                    granted_by: None,
                },
            ))
            .unwrap()
    }

    fn country_image() -> FlatRecord {
        COUNTRY_INFO
            .item_to_attrs(&Entity::new(
                CountryKeys::new("pl"),
                CountryInfoAttrs {
                    name: "Poland".to_string(),
                    line_count: 12,
                    spot_count: 3,
                    guide_count: 1,
                    updated_at: None,
                },
            ))
            .unwrap()
    }

    fn primary_key(image: &FlatRecord) -> FlatRecord {
        image
            .iter()
            .filter(|(name, _)| name.as_str() == "PK" || name.as_str() == "SK_GSI")
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }

    fn records() -> Vec<StreamRecord> {
        let editor = editor_image();
        let country = country_image();
        let mut unknown = FlatRecord::new();
        unknown.insert("PK".to_string(), json!("session:s1"));
        unknown.insert("SK_GSI".to_string(), json!("session"));

        vec![
            StreamRecord {
                change: ChangeKind::Inserted,
                keys: primary_key(&editor),
                before: None,
                after: Some(editor.clone()),
            },
            StreamRecord {
                change: ChangeKind::Removed,
                keys: unknown.clone(),
                before: Some(unknown),
                after: None,
            },
            StreamRecord {
                change: ChangeKind::Modified,
                keys: primary_key(&country),
                before: Some(country.clone()),
                after: Some(country),
            },
        ]
    }

    #[tokio::test]
    async fn test_dispatch_routes_and_skips() {
        let dispatcher = StreamDispatcher::new(Recorder::default());
        let summary = dispatcher.dispatch(&records()).await.unwrap();

        assert_eq!(
            summary,
            DispatchSummary {
                dispatched: 2,
                skipped: 1
            }
        );
        assert_eq!(
            *dispatcher.handler().seen.lock().await,
            vec![
                (EntityKind::FeatureEditor, ChangeKind::Inserted),
                (EntityKind::CountryInfo, ChangeKind::Modified),
            ]
        );
    }

    #[tokio::test]
    async fn test_dispatch_propagates_handler_errors() {
        let dispatcher = StreamDispatcher::new(Failing);
        let err = dispatcher.dispatch(&records()).await.unwrap_err();
        assert_eq!(err.to_string(), "downstream unavailable");
    }

    #[tokio::test]
    async fn test_dispatch_empty_batch() {
        let dispatcher = StreamDispatcher::new(Recorder::default());
        assert_eq!(
            dispatcher.dispatch(&[]).await.unwrap(),
            DispatchSummary::default()
        );
    }
}
