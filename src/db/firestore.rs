// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore-backed [`DocumentStore`].
//!
//! One collection per record kind. The document ID is the URL-encoded
//! natural key, so Firestore itself enforces key uniqueness and an update
//! of an existing ID replaces the document in place.

use serde::Deserialize;
use serde_json::Value;
use std::future::Future;
use std::time::Duration;

use crate::db::{collections, inclusive_upper_bound, DocumentStore, StoreError};
use crate::models::RecordKind;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreStore {
    client: Option<firestore::FirestoreDb>,
    timeout: Duration,
}

impl FirestoreStore {
    /// Connect to Firestore.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str, timeout: Duration) -> Result<Self, StoreError> {
        // The emulator accepts any token; skip credential discovery.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id, timeout).await;
        }

        let client = firestore::FirestoreDb::new(project_id).await.map_err(|e| {
            StoreError::Connection(format!("Failed to connect to Firestore: {}", e))
        })?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
            timeout,
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str, timeout: Duration) -> Result<Self, StoreError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJmaXR2YXVsdCJ9."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            StoreError::Connection(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
            timeout,
        })
    }

    /// Offline store: every operation fails with a connection error.
    pub fn new_mock() -> Self {
        Self {
            client: None,
            timeout: Duration::from_secs(1),
        }
    }

    fn get_client(&self) -> Result<&firestore::FirestoreDb, StoreError> {
        self.client.as_ref().ok_or_else(|| {
            StoreError::Connection("Database not connected (offline mode)".to_string())
        })
    }

    /// Run one Firestore call under the configured deadline.
    async fn timed<T>(
        &self,
        op: impl Future<Output = Result<T, firestore::errors::FirestoreError>>,
    ) -> Result<T, StoreError> {
        match tokio::time::timeout(self.timeout, op).await {
            Err(_) => Err(StoreError::Timeout(self.timeout)),
            Ok(result) => result.map_err(map_firestore_error),
        }
    }
}

fn map_firestore_error(e: firestore::errors::FirestoreError) -> StoreError {
    match e {
        firestore::errors::FirestoreError::NetworkError(_) => StoreError::Connection(e.to_string()),
        other => StoreError::Operation(other.to_string()),
    }
}

const COUNT_ALIAS: &str = "count";

/// Result row of a count aggregation, keyed by [`COUNT_ALIAS`].
#[derive(Debug, Deserialize)]
struct DocumentCount {
    count: u64,
}

fn document_id(key: &str) -> String {
    urlencoding::encode(key).into_owned()
}

impl DocumentStore for FirestoreStore {
    async fn ensure_index(&self, kind: RecordKind) -> Result<(), StoreError> {
        // Uniqueness comes from the document ID and single-field indexes are
        // automatic; probe the collection so a dead connection surfaces here.
        let collection = collections::for_kind(kind);
        let client = self.get_client()?;
        let _: Option<Value> = self
            .timed(
                client
                    .fluent()
                    .select()
                    .by_id_in(collection)
                    .obj()
                    .one("__fitvault_probe__"),
            )
            .await?;

        tracing::debug!(collection, key_field = kind.key_field(), "Natural key index ready");
        Ok(())
    }

    async fn upsert(&self, kind: RecordKind, key: &str, document: &Value) -> Result<(), StoreError> {
        let client = self.get_client()?;
        let _: () = self
            .timed(
                client
                    .fluent()
                    .update()
                    .in_col(collections::for_kind(kind))
                    .document_id(document_id(key))
                    .object(document)
                    .execute(),
            )
            .await?;
        Ok(())
    }

    async fn query_by_date_range(
        &self,
        kind: RecordKind,
        start: &str,
        end: &str,
    ) -> Result<Vec<Value>, StoreError> {
        let field = kind.date_field();
        let start = start.to_string();
        let upper = inclusive_upper_bound(end);
        let client = self.get_client()?;

        self.timed(
            client
                .fluent()
                .select()
                .from(collections::for_kind(kind))
                .filter(move |q| {
                    q.for_all([
                        q.field(field).greater_than_or_equal(start.clone()),
                        q.field(field).less_than_or_equal(upper.clone()),
                    ])
                })
                .order_by([(field, firestore::FirestoreQueryDirection::Ascending)])
                .obj::<Value>()
                .query(),
        )
        .await
    }

    /// Server-side count aggregation; no documents are transferred.
    async fn count(&self, kind: RecordKind) -> Result<u64, StoreError> {
        let client = self.get_client()?;
        let rows: Vec<DocumentCount> = self
            .timed(
                client
                    .fluent()
                    .select()
                    .from(collections::for_kind(kind))
                    .aggregate(|a| a.fields([a.field(COUNT_ALIAS).count()]))
                    .obj()
                    .query(),
            )
            .await?;
        Ok(rows.first().map_or(0, |row| row.count))
    }
}
