use crate::drawing::entity::{Drawing, DrawingPatch, NewDrawing};
use crate::store::error::StoreError;
use async_trait::async_trait;

/// # Summary
/// 图表标注的持久化接口。
///
/// # Invariants
/// - 每个写操作必须是原子的：要么图形、序列与点全部落库，要么全部回滚。
/// - 交易对代码在存取时统一为大写。
#[async_trait]
pub trait DrawingStore: Send + Sync {
    /// 列出全部图形，可按交易对过滤。
    async fn list(&self, pair: Option<&str>) -> Result<Vec<Drawing>, StoreError>;

    /// 按 ID 获取单个图形。
    async fn get(&self, id: &str) -> Result<Option<Drawing>, StoreError>;

    /// # Summary
    /// 新建图形。
    ///
    /// # Logic
    /// 1. 检查 ID 是否已存在，存在则返回 `StoreError::Conflict`。
    /// 2. 获取或创建所属交易对。
    /// 3. 依次写入图形、序列与点。
    ///
    /// # Returns
    /// 落库后的图形（点带有数据库 ID）。
    async fn create(&self, drawing: NewDrawing) -> Result<Drawing, StoreError>;

    /// # Summary
    /// 局部更新图形。
    ///
    /// # Returns
    /// 图形不存在返回 `Ok(None)`。
    async fn update(&self, id: &str, patch: DrawingPatch) -> Result<Option<Drawing>, StoreError>;

    /// 删除单个图形，返回是否存在并被删除。
    async fn delete(&self, id: &str) -> Result<bool, StoreError>;

    /// 删除全部图形（可按交易对过滤），返回删除数量。
    async fn delete_all(&self, pair: Option<&str>) -> Result<u64, StoreError>;
}
