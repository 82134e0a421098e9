//! SQLite implementation of the asset repository
//!
//! Bulk inserts are one transaction per batch using multi-row `INSERT`
//! statements. Reads build the filter, sort and limit clauses with
//! `QueryBuilder`; the sort column always comes from the closed
//! `SortField` enum, never from caller text.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use tracing::debug;

use crate::domain::asset::{AssetRecord, MediaKind};
use crate::domain::errors::PersistenceError;
use crate::domain::pagination::{Page, PageRequest, SortDirection, SortField};
use crate::domain::repositories::AssetRepository;

/// Rows per `INSERT` statement; 4 binds each keeps us far below SQLite's
/// bind-parameter limit.
const MAX_ROWS_PER_STATEMENT: usize = 200;

const SELECT_COLUMNS: &str = "SELECT id, original_url, media_url, type, created_at FROM media_item";

#[derive(Debug, Clone, Copy)]
enum Filter<'a> {
    All,
    Kind(MediaKind),
    KindAndOrigin(MediaKind, &'a str),
}

#[derive(Clone)]
pub struct SqliteAssetRepository {
    pool: SqlitePool,
}

impl SqliteAssetRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn push_filter<'a>(builder: &mut QueryBuilder<'a, Sqlite>, filter: Filter<'a>) {
        match filter {
            Filter::All => {}
            Filter::Kind(kind) => {
                builder.push(" WHERE type = ").push_bind(kind.as_str());
            }
            Filter::KindAndOrigin(kind, substring) => {
                // instr() is case-sensitive, unlike LIKE
                builder
                    .push(" WHERE type = ")
                    .push_bind(kind.as_str())
                    .push(" AND instr(original_url, ")
                    .push_bind(substring)
                    .push(") > 0");
            }
        }
    }

    fn sort_column(field: SortField) -> &'static str {
        match field {
            SortField::Id => "id",
            SortField::CreatedAt => "created_at",
            SortField::OriginalUrl => "original_url",
            SortField::MediaUrl => "media_url",
            SortField::Kind => "type",
        }
    }

    fn map_row(row: &SqliteRow) -> Result<AssetRecord, PersistenceError> {
        let id: i64 = row.try_get("id")?;
        let original_url: String = row.try_get("original_url")?;
        let media_url: String = row.try_get("media_url")?;
        let kind: String = row.try_get("type")?;
        let created_at: DateTime<Utc> = row.try_get("created_at")?;

        let kind = kind
            .parse::<MediaKind>()
            .map_err(|e| PersistenceError::CorruptRow(format!("row {id}: {e}")))?;
        AssetRecord::stored(id, original_url, media_url, kind, created_at)
            .map_err(|e| PersistenceError::CorruptRow(format!("row {id}: {e}")))
    }

    async fn fetch_page(
        &self,
        filter: Filter<'_>,
        request: &PageRequest,
    ) -> Result<Page<AssetRecord>, PersistenceError> {
        let mut count_query = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM media_item");
        Self::push_filter(&mut count_query, filter);
        let total = count_query
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;
        let total = u64::try_from(total).unwrap_or_default();

        if request.size == 0 || request.offset() >= total {
            return Ok(Page::new(Vec::new(), total, request));
        }

        let direction = match request.sort.direction {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        };
        let column = Self::sort_column(request.sort.field);

        let mut select = QueryBuilder::<Sqlite>::new(SELECT_COLUMNS);
        Self::push_filter(&mut select, filter);
        select.push(format!(" ORDER BY {column} {direction}"));
        if column != "id" {
            select.push(format!(", id {direction}"));
        }
        select
            .push(" LIMIT ")
            .push_bind(i64::from(request.size))
            .push(" OFFSET ")
            .push_bind(i64::try_from(request.offset()).unwrap_or(i64::MAX));

        let rows = select.build().fetch_all(&self.pool).await?;
        let content = rows
            .iter()
            .map(Self::map_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page::new(content, total, request))
    }
}

#[async_trait]
impl AssetRepository for SqliteAssetRepository {
    async fn bulk_insert(&self, records: Vec<AssetRecord>) -> Result<Vec<i64>, PersistenceError> {
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let mut tx = self.pool.begin().await?;
        let mut ids = Vec::with_capacity(records.len());

        for chunk in records.chunks(MAX_ROWS_PER_STATEMENT) {
            let mut insert = QueryBuilder::<Sqlite>::new(
                "INSERT INTO media_item (original_url, media_url, type, created_at) ",
            );
            insert.push_values(chunk, |mut row, record| {
                row.push_bind(record.original_url())
                    .push_bind(record.media_url())
                    .push_bind(record.kind().as_str())
                    .push_bind(record.created_at());
            });
            insert.push(" RETURNING id");

            let mut chunk_ids = insert
                .build_query_scalar::<i64>()
                .fetch_all(&mut *tx)
                .await?;
            // AUTOINCREMENT hands out ids in row order; RETURNING order is unspecified.
            chunk_ids.sort_unstable();
            ids.extend(chunk_ids);
        }

        tx.commit().await?;
        debug!("Inserted {} media rows", ids.len());
        Ok(ids)
    }

    async fn find_all(&self, page: &PageRequest) -> Result<Page<AssetRecord>, PersistenceError> {
        self.fetch_page(Filter::All, page).await
    }

    async fn find_by_kind(
        &self,
        kind: MediaKind,
        page: &PageRequest,
    ) -> Result<Page<AssetRecord>, PersistenceError> {
        self.fetch_page(Filter::Kind(kind), page).await
    }

    async fn find_by_kind_and_original_url_containing(
        &self,
        kind: MediaKind,
        substring: &str,
        page: &PageRequest,
    ) -> Result<Page<AssetRecord>, PersistenceError> {
        self.fetch_page(Filter::KindAndOrigin(kind, substring), page)
            .await
    }

    async fn count(&self) -> Result<u64, PersistenceError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM media_item")
            .fetch_one(&self.pool)
            .await?;
        Ok(u64::try_from(total).unwrap_or_default())
    }
}
