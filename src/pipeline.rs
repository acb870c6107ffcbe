//! One pipeline run: extract -> transform -> load, fail-fast. Scheduling
//! and retries belong to whatever invokes the binary.

use chrono::NaiveDate;
use sqlx::PgPool;

use crate::errors::{PipelineError, StoreError};
use crate::model::Article;
use crate::sources::guardian::GuardianClient;
use crate::sources::Source;
use crate::store::Gateway;
use crate::transform;

/// Upsert a transformed batch, keyed on the provider handle so repeated
/// runs over overlapping date windows converge instead of duplicating rows.
#[tracing::instrument(skip_all, fields(count = articles.len()))]
pub async fn load(pool: &PgPool, articles: &[Article]) -> Result<(), StoreError> {
    let gateway = Gateway::<Article>::new(pool.clone());
    gateway.ensure_table().await?;
    gateway.upsert(articles, "handle").await
}

/// Run the pipeline of one source for one target day. Any stage failure
/// aborts the run; stages already persisted are not rolled back.
#[tracing::instrument(skip(pool, client))]
pub async fn run(
    pool: &PgPool,
    client: &GuardianClient,
    source: Source,
    date: NaiveDate,
) -> Result<(), PipelineError> {
    let raw = client.extract(date).await?;
    let articles = transform::transform(raw, source.tag())?;
    load(pool, &articles).await?;

    tracing::info!("Run done, {} articles persisted", articles.len());
    Ok(())
}
