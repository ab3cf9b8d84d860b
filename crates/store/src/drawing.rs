use async_trait::async_trait;
use chartdesk_core::common::normalize_symbol;
use chartdesk_core::drawing::entity::{Drawing, DrawingPatch, NewDrawing, Point, Series};
use chartdesk_core::drawing::port::DrawingStore;
use chartdesk_core::store::error::StoreError;
use chrono::Utc;
use serde_json::Value;
use sqlx::{
    SqliteConnection, SqlitePool,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous},
};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// 默认图形数据库文件名
const DEFAULT_DRAWING_DB: &str = "drawings.db";

/// 首次出现的交易对默认周期
const DEFAULT_TIMEFRAME: &str = "15m";

/// 图形主表查询的列，与 `DrawingRow` 一一对应
const DRAWING_COLUMNS: &str = "d.id, d.name, d.type, d.color, d.metadata, d.is_incomplete, p.symbol";

type DrawingRow = (String, String, String, String, Option<String>, bool, String);

/// 写锁等待上限
const BUSY_TIMEOUT: Duration = Duration::from_secs(10);

fn db_err(e: sqlx::Error) -> StoreError {
    StoreError::Database(e.to_string())
}

/// DrawingStore 的 SQLite 实现。
///
/// # Summary
/// 在单个 SQLite 数据库 (`drawings.db`) 中保存交易对、图形、序列与点四张表。
///
/// # Invariants
/// * 数据库结构在存储实例创建时初始化，外键约束开启，删除图形会级联删除其序列与点。
/// * 每个写操作都在一个事务中完成。
/// * 连接池只有一个连接 (WAL 模式)，写事务在池上排队而不是争抢数据库锁。
pub struct SqliteDrawingStore {
    pool: SqlitePool,
}

impl SqliteDrawingStore {
    /// 创建新的 SqliteDrawingStore 并初始化表结构。
    ///
    /// # Logic
    /// 1. 确保数据目录存在。
    /// 2. 配置 SQLite 连接选项：`create_if_missing`、外键约束、WAL 与忙等待超时；
    ///    连接池限制为单连接，使并发写入串行执行。
    /// 3. 执行 DDL 初始化表结构。
    ///
    /// # Arguments
    /// * `data_dir` - 数据库文件所在目录。
    ///
    /// # Returns
    /// * `Result<Self, StoreError>` - 存储实例或数据库错误。
    pub async fn new(data_dir: &Path) -> Result<Self, StoreError> {
        std::fs::create_dir_all(data_dir).map_err(|e| StoreError::Database(e.to_string()))?;

        let options = SqliteConnectOptions::new()
            .filename(data_dir.join(DEFAULT_DRAWING_DB))
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(BUSY_TIMEOUT);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(db_err)?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS pairs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                symbol TEXT NOT NULL UNIQUE,
                timeframe TEXT NOT NULL,
                description TEXT,
                is_active INTEGER NOT NULL DEFAULT 1
            );

            CREATE TABLE IF NOT EXISTS drawings (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                type TEXT NOT NULL,
                color TEXT NOT NULL,
                metadata TEXT,
                is_incomplete INTEGER NOT NULL DEFAULT 0,
                pair_id INTEGER NOT NULL REFERENCES pairs(id) ON DELETE CASCADE,
                created_at DATETIME NOT NULL,
                updated_at DATETIME NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_drawings_pair ON drawings(pair_id);

            CREATE TABLE IF NOT EXISTS series (
                drawing_id TEXT NOT NULL REFERENCES drawings(id) ON DELETE CASCADE,
                id TEXT NOT NULL,
                name TEXT,
                style TEXT,
                order_index INTEGER NOT NULL,
                PRIMARY KEY (drawing_id, id)
            );

            CREATE TABLE IF NOT EXISTS points (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                drawing_id TEXT NOT NULL,
                series_id TEXT NOT NULL,
                x REAL NOT NULL,
                y REAL NOT NULL,
                order_index INTEGER NOT NULL,
                FOREIGN KEY (drawing_id, series_id) REFERENCES series(drawing_id, id) ON DELETE CASCADE
            );
            CREATE INDEX IF NOT EXISTS idx_points_series ON points(drawing_id, series_id);
            "#,
        )
        .execute(&pool)
        .await
        .map_err(db_err)?;

        info!("Drawing store ready at {}", data_dir.display());
        Ok(Self { pool })
    }

    /// # Summary
    /// 将图形主表记录补全为完整实体。
    ///
    /// # Logic
    /// 1. 按 `order_index` 读取序列。
    /// 2. 按 `order_index` 读取全部点，并归入所属序列。
    async fn hydrate(
        conn: &mut SqliteConnection,
        row: DrawingRow,
    ) -> Result<Drawing, StoreError> {
        let (id, name, kind, color, metadata, is_incomplete, pair) = row;

        let series_rows = sqlx::query_as::<_, (String, Option<String>, Option<String>)>(
            "SELECT id, name, style FROM series WHERE drawing_id = ? ORDER BY order_index ASC",
        )
        .bind(&id)
        .fetch_all(&mut *conn)
        .await
        .map_err(db_err)?;

        let point_rows = sqlx::query_as::<_, (i64, String, f64, f64)>(
            "SELECT id, series_id, x, y FROM points WHERE drawing_id = ? ORDER BY order_index ASC",
        )
        .bind(&id)
        .fetch_all(&mut *conn)
        .await
        .map_err(db_err)?;

        let mut series = Vec::with_capacity(series_rows.len());
        for (series_id, series_name, style) in series_rows {
            let points = point_rows
                .iter()
                .filter(|p| p.1 == series_id)
                .map(|p| Point {
                    id: Some(p.0),
                    x: p.2,
                    y: p.3,
                })
                .collect();
            series.push(Series {
                id: series_id,
                name: series_name,
                style: parse_json(style)?,
                points,
            });
        }

        Ok(Drawing {
            id,
            name,
            kind,
            color,
            series,
            metadata: parse_json(metadata)?,
            is_incomplete,
            pair,
        })
    }

    async fn fetch_one(
        conn: &mut SqliteConnection,
        id: &str,
    ) -> Result<Option<Drawing>, StoreError> {
        let row = sqlx::query_as::<_, DrawingRow>(&format!(
            "SELECT {} FROM drawings d JOIN pairs p ON p.id = d.pair_id WHERE d.id = ?",
            DRAWING_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(db_err)?;

        match row {
            Some(row) => Ok(Some(Self::hydrate(conn, row).await?)),
            None => Ok(None),
        }
    }

    /// 获取或创建交易对，返回其主键。
    async fn pair_id(conn: &mut SqliteConnection, symbol: &str) -> Result<i64, StoreError> {
        sqlx::query(
            "INSERT INTO pairs (symbol, timeframe, description, is_active) VALUES (?, ?, ?, 1)
             ON CONFLICT(symbol) DO NOTHING",
        )
        .bind(symbol)
        .bind(DEFAULT_TIMEFRAME)
        .bind(format!("{} Trading Pair", symbol))
        .execute(&mut *conn)
        .await
        .map_err(db_err)?;

        sqlx::query_scalar::<_, i64>("SELECT id FROM pairs WHERE symbol = ?")
            .bind(symbol)
            .fetch_one(&mut *conn)
            .await
            .map_err(db_err)
    }

    /// 按提交顺序写入序列与点。
    async fn insert_series(
        conn: &mut SqliteConnection,
        drawing_id: &str,
        series: &[Series],
    ) -> Result<(), StoreError> {
        for (series_idx, s) in series.iter().enumerate() {
            sqlx::query(
                "INSERT INTO series (drawing_id, id, name, style, order_index) VALUES (?, ?, ?, ?, ?)",
            )
            .bind(drawing_id)
            .bind(&s.id)
            .bind(&s.name)
            .bind(to_json(&s.style)?)
            .bind(index_to_i64(series_idx))
            .execute(&mut *conn)
            .await
            .map_err(db_err)?;

            for (point_idx, p) in s.points.iter().enumerate() {
                sqlx::query(
                    "INSERT INTO points (drawing_id, series_id, x, y, order_index) VALUES (?, ?, ?, ?, ?)",
                )
                .bind(drawing_id)
                .bind(&s.id)
                .bind(p.x)
                .bind(p.y)
                .bind(index_to_i64(point_idx))
                .execute(&mut *conn)
                .await
                .map_err(db_err)?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl DrawingStore for SqliteDrawingStore {
    async fn list(&self, pair: Option<&str>) -> Result<Vec<Drawing>, StoreError> {
        let mut conn = self.pool.acquire().await.map_err(db_err)?;

        let rows = match pair {
            Some(pair) => {
                sqlx::query_as::<_, DrawingRow>(&format!(
                    "SELECT {} FROM drawings d JOIN pairs p ON p.id = d.pair_id
                     WHERE p.symbol = ? ORDER BY d.created_at ASC, d.id ASC",
                    DRAWING_COLUMNS
                ))
                .bind(normalize_symbol(pair))
                .fetch_all(&mut *conn)
                .await
            }
            None => {
                sqlx::query_as::<_, DrawingRow>(&format!(
                    "SELECT {} FROM drawings d JOIN pairs p ON p.id = d.pair_id
                     ORDER BY d.created_at ASC, d.id ASC",
                    DRAWING_COLUMNS
                ))
                .fetch_all(&mut *conn)
                .await
            }
        }
        .map_err(db_err)?;

        let mut drawings = Vec::with_capacity(rows.len());
        for row in rows {
            drawings.push(Self::hydrate(&mut conn, row).await?);
        }
        Ok(drawings)
    }

    async fn get(&self, id: &str) -> Result<Option<Drawing>, StoreError> {
        let mut conn = self.pool.acquire().await.map_err(db_err)?;
        Self::fetch_one(&mut conn, id).await
    }

    /// # Summary
    /// 新建图形。
    ///
    /// # Logic
    /// 1. 校验必填字段与序列 ID 唯一性。
    /// 2. 开启事务，检查图形 ID 是否冲突。
    /// 3. 获取或创建交易对，写入图形、序列与点后提交。
    async fn create(&self, drawing: NewDrawing) -> Result<Drawing, StoreError> {
        validate_new(&drawing)?;
        let pair = normalize_symbol(&drawing.pair);
        let now = Utc::now();

        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM drawings WHERE id = ?")
            .bind(&drawing.id)
            .fetch_one(&mut *tx)
            .await
            .map_err(db_err)?;
        if exists > 0 {
            return Err(StoreError::Conflict(format!(
                "Drawing with id {} already exists",
                drawing.id
            )));
        }

        let pair_id = Self::pair_id(&mut tx, &pair).await?;

        sqlx::query(
            r#"
            INSERT INTO drawings (id, name, type, color, metadata, is_incomplete, pair_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&drawing.id)
        .bind(&drawing.name)
        .bind(&drawing.kind)
        .bind(&drawing.color)
        .bind(to_json(&drawing.metadata)?)
        .bind(drawing.is_incomplete)
        .bind(pair_id)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| match e {
            // 其他进程可能在检查之后抢先写入同一 ID
            sqlx::Error::Database(ref db) if db.is_unique_violation() => StoreError::Conflict(
                format!("Drawing with id {} already exists", drawing.id),
            ),
            other => db_err(other),
        })?;

        Self::insert_series(&mut tx, &drawing.id, &drawing.series).await?;

        let created = Self::fetch_one(&mut tx, &drawing.id)
            .await?
            .ok_or(StoreError::NotFound)?;
        tx.commit().await.map_err(db_err)?;

        debug!("Drawing created: {} ({})", created.id, created.pair);
        Ok(created)
    }

    /// # Summary
    /// 局部更新图形。
    ///
    /// # Logic
    /// 1. 图形不存在时返回 None。
    /// 2. 使用 `COALESCE` 只覆盖补丁中出现的标量字段，并刷新 `updated_at`。
    /// 3. 补丁带有 `series` 时，删除旧序列（级联删除点）后整体重写。
    async fn update(&self, id: &str, patch: DrawingPatch) -> Result<Option<Drawing>, StoreError> {
        if let Some(series) = &patch.series {
            validate_series(series)?;
        }

        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let result = sqlx::query(
            r#"
            UPDATE drawings SET
                name = COALESCE(?, name),
                color = COALESCE(?, color),
                metadata = COALESCE(?, metadata),
                is_incomplete = COALESCE(?, is_incomplete),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&patch.name)
        .bind(&patch.color)
        .bind(to_json(&patch.metadata)?)
        .bind(patch.is_incomplete)
        .bind(Utc::now())
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        if let Some(series) = &patch.series {
            sqlx::query("DELETE FROM series WHERE drawing_id = ?")
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(db_err)?;
            Self::insert_series(&mut tx, id, series).await?;
        }

        let updated = Self::fetch_one(&mut tx, id).await?;
        tx.commit().await.map_err(db_err)?;
        Ok(updated)
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM drawings WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_all(&self, pair: Option<&str>) -> Result<u64, StoreError> {
        let result = match pair {
            Some(pair) => {
                sqlx::query(
                    "DELETE FROM drawings WHERE pair_id IN (SELECT id FROM pairs WHERE symbol = ?)",
                )
                .bind(normalize_symbol(pair))
                .execute(&self.pool)
                .await
            }
            None => sqlx::query("DELETE FROM drawings").execute(&self.pool).await,
        }
        .map_err(db_err)?;

        info!(
            "Deleted {} drawing(s){}",
            result.rows_affected(),
            pair.map(|p| format!(" for pair {}", p)).unwrap_or_default()
        );
        Ok(result.rows_affected())
    }
}

fn validate_new(drawing: &NewDrawing) -> Result<(), StoreError> {
    for (field, value) in [
        ("id", &drawing.id),
        ("name", &drawing.name),
        ("type", &drawing.kind),
        ("pair", &drawing.pair),
    ] {
        if value.trim().is_empty() {
            return Err(StoreError::InvalidArgument(format!("{} must not be empty", field)));
        }
    }
    validate_series(&drawing.series)
}

/// 序列 ID 在同一图形内必须唯一。
fn validate_series(series: &[Series]) -> Result<(), StoreError> {
    let mut seen = HashSet::new();
    for s in series {
        if !seen.insert(s.id.as_str()) {
            return Err(StoreError::InvalidArgument(format!(
                "Duplicate series id: {}",
                s.id
            )));
        }
    }
    Ok(())
}

fn to_json(value: &Option<Value>) -> Result<Option<String>, StoreError> {
    value
        .as_ref()
        .map(serde_json::to_string)
        .transpose()
        .map_err(|e| StoreError::Database(e.to_string()))
}

fn parse_json(raw: Option<String>) -> Result<Option<Value>, StoreError> {
    raw.map(|s| serde_json::from_str(&s))
        .transpose()
        .map_err(|e| StoreError::Database(e.to_string()))
}

fn index_to_i64(idx: usize) -> i64 {
    i64::try_from(idx).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(id: &str) -> Series {
        Series {
            id: id.to_string(),
            name: None,
            style: None,
            points: vec![],
        }
    }

    #[test]
    fn test_validate_series_rejects_duplicates() {
        assert!(validate_series(&[series("a"), series("b")]).is_ok());
        assert!(matches!(
            validate_series(&[series("a"), series("a")]),
            Err(StoreError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_json_roundtrip_helpers() {
        let value = Some(serde_json::json!({ "width": 2 }));
        let raw = to_json(&value).unwrap();
        assert_eq!(parse_json(raw).unwrap(), value);
        assert_eq!(to_json(&None).unwrap(), None);
    }
}
