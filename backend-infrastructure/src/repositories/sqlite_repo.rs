use async_trait::async_trait;
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use tokio::sync::OnceCell;
use tracing::{error, info};

use backend_domain::{
    AlmanaxRepository, AlmanaxUpdate, BonusType, DbConfig, MappedAlmanax, NewAlmanax, NewBonus,
    NewBonusType, NewTribute, RepositoryError, RepositoryResult,
};

use crate::repositories::almanax_mapper::{
    map_almanax_row, map_bonus_type_row, MAPPED_ALMANAX_COLUMNS,
};

static MIGRATOR: Migrator = sqlx::migrate!("../migrations");

const MAPPED_ALMANAX_FROM: &str = "
    FROM almanax AS a
    JOIN bonus AS b ON a.bonus_id = b.id
    JOIN bonus_types AS bt ON b.bonus_type_id = bt.id
    JOIN tribute AS t ON a.tribute_id = t.id
    WHERE a.date >= ? AND a.date <= ?
      AND a.deleted_at IS NULL AND b.deleted_at IS NULL
      AND bt.deleted_at IS NULL AND t.deleted_at IS NULL";

/// SQLite backed store. The pool is opened on first use.
pub struct SqliteAlmanaxRepository {
    config: DbConfig,
    pool: OnceCell<SqlitePool>,
}

impl SqliteAlmanaxRepository {
    pub fn new(config: DbConfig) -> Self {
        Self {
            config,
            pool: OnceCell::new(),
        }
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Self {
            config: DbConfig {
                database_path: String::new(),
            },
            pool: OnceCell::new_with(Some(pool)),
        }
    }

    pub async fn pool(&self) -> RepositoryResult<&SqlitePool> {
        self.pool
            .get_or_try_init(|| connect(&self.config.database_path))
            .await
            .map_err(classify)
    }

    pub async fn migrate_up(&self) -> RepositoryResult<()> {
        let pool = self.pool().await?;
        MIGRATOR
            .run(pool)
            .await
            .map_err(|err| RepositoryError::Database(format!("migration failed: {}", err)))?;
        info!("migrations applied");
        Ok(())
    }

    pub async fn migrate_down(&self) -> RepositoryResult<()> {
        let pool = self.pool().await?;
        MIGRATOR
            .undo(pool, 0)
            .await
            .map_err(|err| RepositoryError::Database(format!("migration revert failed: {}", err)))?;
        info!("migrations reverted");
        Ok(())
    }

    async fn fetch_mapped(
        &self,
        from: &str,
        to: &str,
        slug: Option<&str>,
    ) -> RepositoryResult<Vec<MappedAlmanax>> {
        let pool = self.pool().await?;
        let mut sql = format!("SELECT {} {}", MAPPED_ALMANAX_COLUMNS, MAPPED_ALMANAX_FROM);
        if slug.is_some() {
            sql.push_str(" AND bt.name_id = ?");
        }
        sql.push_str(" ORDER BY a.date ASC");

        let mut query = sqlx::query(&sql).bind(from).bind(to);
        if let Some(slug) = slug {
            query = query.bind(slug);
        }
        let rows = query.fetch_all(pool).await.map_err(classify)?;
        rows.iter()
            .map(|row| map_almanax_row(row).map_err(classify))
            .collect()
    }
}

pub async fn connect(database_path: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::new()
        .filename(database_path)
        .create_if_missing(true)
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;
    info!(path = database_path, "sqlite store opened");
    Ok(pool)
}

fn classify(err: sqlx::Error) -> RepositoryError {
    match &err {
        sqlx::Error::Database(db_err)
            if db_err.is_foreign_key_violation()
                || db_err.is_unique_violation()
                || db_err.is_check_violation() =>
        {
            RepositoryError::Integrity(db_err.message().to_string())
        }
        sqlx::Error::RowNotFound => RepositoryError::NotFound(err.to_string()),
        _ => {
            error!("sqlite error: {}", err);
            RepositoryError::Database(err.to_string())
        }
    }
}

#[async_trait]
impl AlmanaxRepository for SqliteAlmanaxRepository {
    async fn get_by_date_range(&self, from: &str, to: &str) -> RepositoryResult<Vec<MappedAlmanax>> {
        self.fetch_mapped(from, to, None).await
    }

    async fn get_by_date_range_and_bonus_slug(
        &self,
        from: &str,
        to: &str,
        slug: &str,
    ) -> RepositoryResult<Vec<MappedAlmanax>> {
        self.fetch_mapped(from, to, Some(slug)).await
    }

    async fn has_live_almanax(&self, date: &str) -> RepositoryResult<bool> {
        let pool = self.pool().await?;
        let row = sqlx::query("SELECT 1 FROM almanax WHERE date = ? AND deleted_at IS NULL LIMIT 1")
            .bind(date)
            .fetch_optional(pool)
            .await
            .map_err(classify)?;
        Ok(row.is_some())
    }

    async fn create(&self, almanax: &NewAlmanax) -> RepositoryResult<i64> {
        let pool = self.pool().await?;
        let result = sqlx::query(
            "INSERT INTO almanax (bonus_id, tribute_id, date, reward_kamas, created_at, updated_at)
             VALUES (?, ?, ?, ?, datetime('now'), datetime('now'))",
        )
        .bind(almanax.bonus_id)
        .bind(almanax.tribute_id)
        .bind(&almanax.date)
        .bind(almanax.reward_kamas)
        .execute(pool)
        .await
        .map_err(classify)?;
        Ok(result.last_insert_rowid())
    }

    async fn update(&self, almanax: &AlmanaxUpdate) -> RepositoryResult<()> {
        let pool = self.pool().await?;
        let result = sqlx::query(
            "UPDATE almanax
             SET bonus_id = ?, tribute_id = ?, date = ?, reward_kamas = ?, updated_at = datetime('now')
             WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(almanax.bonus_id)
        .bind(almanax.tribute_id)
        .bind(&almanax.date)
        .bind(almanax.reward_kamas)
        .bind(almanax.id)
        .execute(pool)
        .await
        .map_err(classify)?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("almanax {}", almanax.id)));
        }
        Ok(())
    }

    async fn create_bonus_type(&self, bonus_type: &NewBonusType) -> RepositoryResult<i64> {
        let pool = self.pool().await?;
        let result = sqlx::query(
            "INSERT INTO bonus_types (name_id, name_en, name_fr, name_es, name_de, name_it, name_pt, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, datetime('now'), datetime('now'))",
        )
        .bind(&bonus_type.name_id)
        .bind(&bonus_type.name_en)
        .bind(&bonus_type.name_fr)
        .bind(&bonus_type.name_es)
        .bind(&bonus_type.name_de)
        .bind(&bonus_type.name_it)
        .bind(&bonus_type.name_pt)
        .execute(pool)
        .await
        .map_err(classify)?;
        Ok(result.last_insert_rowid())
    }

    async fn list_bonus_types(&self) -> RepositoryResult<Vec<BonusType>> {
        let pool = self.pool().await?;
        let rows = sqlx::query(
            "SELECT id, name_id, name_en, name_fr, name_es, name_de, name_it, name_pt,
                    created_at, updated_at, deleted_at
             FROM bonus_types WHERE deleted_at IS NULL ORDER BY name_id ASC",
        )
        .fetch_all(pool)
        .await
        .map_err(classify)?;
        rows.iter()
            .map(|row| map_bonus_type_row(row).map_err(classify))
            .collect()
    }

    async fn find_bonus_type_id(&self, slug: &str) -> RepositoryResult<Option<i64>> {
        let pool = self.pool().await?;
        let row = sqlx::query("SELECT id FROM bonus_types WHERE name_id = ? AND deleted_at IS NULL")
            .bind(slug)
            .fetch_optional(pool)
            .await
            .map_err(classify)?;
        row.map(|row| row.try_get::<i64, _>("id").map_err(classify))
            .transpose()
    }

    async fn create_bonus(&self, bonus: &NewBonus) -> RepositoryResult<i64> {
        let pool = self.pool().await?;
        let result = sqlx::query(
            "INSERT INTO bonus (bonus_type_id, description_en, description_fr, description_es, description_de, description_it, description_pt, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, datetime('now'), datetime('now'))",
        )
        .bind(bonus.bonus_type_id)
        .bind(&bonus.description_en)
        .bind(&bonus.description_fr)
        .bind(&bonus.description_es)
        .bind(&bonus.description_de)
        .bind(&bonus.description_it)
        .bind(&bonus.description_pt)
        .execute(pool)
        .await
        .map_err(classify)?;
        Ok(result.last_insert_rowid())
    }

    async fn create_tribute(&self, tribute: &NewTribute) -> RepositoryResult<i64> {
        let pool = self.pool().await?;
        let result = sqlx::query(
            "INSERT INTO tribute (item_name_en, item_name_fr, item_name_es, item_name_de, item_name_it, item_name_pt,
                                  item_icon, item_sd, item_hq, item_hd, item_ankama_id, item_subtype,
                                  item_doduapi_uri, quantity, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, datetime('now'), datetime('now'))",
        )
        .bind(&tribute.item_name_en)
        .bind(&tribute.item_name_fr)
        .bind(&tribute.item_name_es)
        .bind(&tribute.item_name_de)
        .bind(&tribute.item_name_it)
        .bind(&tribute.item_name_pt)
        .bind(&tribute.item_icon)
        .bind(&tribute.item_sd)
        .bind(&tribute.item_hq)
        .bind(&tribute.item_hd)
        .bind(tribute.item_ankama_id)
        .bind(&tribute.item_subtype)
        .bind(&tribute.item_doduapi_uri)
        .bind(tribute.quantity)
        .execute(pool)
        .await
        .map_err(classify)?;
        Ok(result.last_insert_rowid())
    }

    async fn ping(&self) -> RepositoryResult<()> {
        let pool = self.pool().await?;
        sqlx::query("SELECT 1")
            .execute(pool)
            .await
            .map_err(classify)?;
        Ok(())
    }
}
