use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// 序列中的一个点，`x` 通常为 Unix 秒，`y` 为价格。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Point {
    /// 数据库自增 ID，新建时可省略
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[schema(example = 1_704_067_200.0)]
    pub x: f64,
    #[schema(example = 1.1043)]
    pub y: f64,
}

/// # Summary
/// 点序列，一个图形由一个或多个序列组成（例如通道由上下两条线组成）。
///
/// # Invariants
/// - `id` 在所属图形内唯一。
/// - `points` 保持客户端提交时的顺序。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Series {
    #[schema(example = "series-1")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// 前端渲染样式 (线宽、虚线等)，原样存取
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub style: Option<Value>,
    pub points: Vec<Point>,
}

/// # Summary
/// 用户在图表上绘制的标注图形。
///
/// # Invariants
/// - `id` 由客户端生成并全局唯一。
/// - `pair` 始终为大写交易对代码。
/// - `series` 保持提交时的顺序。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Drawing {
    #[schema(example = "d7c1f0e2-4a4b-4a43-9d0b-3c1f3c2f9d11")]
    pub id: String,
    #[schema(example = "Support")]
    pub name: String,
    /// 图形类型: dot, line, channel, hline 等
    #[serde(rename = "type")]
    #[schema(example = "line")]
    pub kind: String,
    #[schema(example = "#ff9800")]
    pub color: String,
    pub series: Vec<Series>,
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<Value>,
    /// 是否仍处于绘制中（点数不足）
    #[serde(default)]
    pub is_incomplete: bool,
    #[schema(example = "EURUSD")]
    pub pair: String,
}

/// 新建图形的请求载荷。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NewDrawing {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub color: String,
    #[serde(default)]
    pub series: Vec<Series>,
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<Value>,
    #[serde(default)]
    pub is_incomplete: bool,
    pub pair: String,
}

/// # Summary
/// 图形的局部更新载荷。
///
/// # Invariants
/// - 只有出现的字段会被修改。
/// - `series` 一旦出现即整体替换原有序列与点。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DrawingPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub series: Option<Vec<Series>>,
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<Value>,
    #[serde(default)]
    pub is_incomplete: Option<bool>,
}

impl DrawingPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.color.is_none()
            && self.series.is_none()
            && self.metadata.is_none()
            && self.is_incomplete.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drawing_wire_format_uses_type() {
        let json = serde_json::json!({
            "id": "d1",
            "name": "Trend",
            "type": "line",
            "color": "#fff",
            "series": [{ "id": "s1", "points": [{ "x": 1.0, "y": 2.0 }] }],
            "pair": "EURUSD"
        });
        let drawing: NewDrawing = serde_json::from_value(json).unwrap();
        assert_eq!(drawing.kind, "line");
        assert!(!drawing.is_incomplete);
        assert_eq!(drawing.series[0].points[0].id, None);

        let out = serde_json::to_value(Drawing {
            id: drawing.id,
            name: drawing.name,
            kind: drawing.kind,
            color: drawing.color,
            series: drawing.series,
            metadata: None,
            is_incomplete: false,
            pair: drawing.pair,
        })
        .unwrap();
        assert_eq!(out["type"], "line");
    }

    #[test]
    fn test_empty_patch() {
        assert!(DrawingPatch::default().is_empty());
        let patch = DrawingPatch {
            color: Some("#000".to_string()),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }
}
