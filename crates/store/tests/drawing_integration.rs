use chartdesk_core::drawing::entity::{DrawingPatch, NewDrawing, Point, Series};
use chartdesk_core::drawing::port::DrawingStore;
use chartdesk_core::store::error::StoreError;
use chartdesk_store::drawing::SqliteDrawingStore;
use serde_json::json;
use std::sync::Arc;
use tempfile::tempdir;

fn point(x: f64, y: f64) -> Point {
    Point { id: None, x, y }
}

fn new_drawing(id: &str, pair: &str) -> NewDrawing {
    NewDrawing {
        id: id.to_string(),
        name: format!("Drawing {}", id),
        kind: "channel".to_string(),
        color: "#2962ff".to_string(),
        series: vec![
            Series {
                id: "upper".to_string(),
                name: Some("Upper".to_string()),
                style: Some(json!({ "width": 2, "dash": [4, 2] })),
                points: vec![point(100.0, 1.2), point(200.0, 1.3)],
            },
            Series {
                id: "lower".to_string(),
                name: None,
                style: None,
                points: vec![point(100.0, 1.0), point(200.0, 1.1), point(300.0, 1.15)],
            },
        ],
        metadata: Some(json!({ "locked": false })),
        is_incomplete: false,
        pair: pair.to_string(),
    }
}

#[tokio::test]
async fn test_drawing_store_full_lifecycle() {
    // 1. 初始化临时测试环境
    let tmp_dir = tempdir().expect("Failed to create temp dir");
    let store = SqliteDrawingStore::new(tmp_dir.path())
        .await
        .expect("Failed to create drawing store");

    // 2. 新建：交易对统一大写，序列与点保持顺序
    let created = store.create(new_drawing("d1", "eurusd")).await.unwrap();
    assert_eq!(created.pair, "EURUSD");
    assert_eq!(created.kind, "channel");
    assert_eq!(created.series.len(), 2);
    assert_eq!(created.series[0].id, "upper");
    assert_eq!(created.series[0].style, Some(json!({ "width": 2, "dash": [4, 2] })));
    let xs: Vec<f64> = created.series[1].points.iter().map(|p| p.x).collect();
    assert_eq!(xs, vec![100.0, 200.0, 300.0]);
    assert!(created.series[1].points.iter().all(|p| p.id.is_some()));

    // 3. 重复 ID 冲突
    let err = store.create(new_drawing("d1", "EURUSD")).await.unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));

    // 4. 按交易对过滤
    store.create(new_drawing("d2", "GBPUSD")).await.unwrap();
    store.create(new_drawing("d3", "EURUSD")).await.unwrap();
    assert_eq!(store.list(None).await.unwrap().len(), 3);
    let eur = store.list(Some("EurUsd")).await.unwrap();
    let ids: Vec<&str> = eur.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["d1", "d3"]);

    // 5. 局部更新：只修改颜色，其余字段不变
    let updated = store
        .update(
            "d1",
            DrawingPatch {
                color: Some("#000000".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .expect("Drawing should exist");
    assert_eq!(updated.color, "#000000");
    assert_eq!(updated.name, "Drawing d1");
    assert_eq!(updated.series.len(), 2);
    assert_eq!(updated.metadata, Some(json!({ "locked": false })));

    // 6. 替换序列
    let updated = store
        .update(
            "d1",
            DrawingPatch {
                series: Some(vec![Series {
                    id: "only".to_string(),
                    name: None,
                    style: None,
                    points: vec![point(1.0, 2.0)],
                }]),
                is_incomplete: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.series.len(), 1);
    assert_eq!(updated.series[0].id, "only");
    assert_eq!(updated.series[0].points.len(), 1);
    assert!(updated.is_incomplete);

    // 7. 更新不存在的图形
    assert!(
        store
            .update("missing", DrawingPatch::default())
            .await
            .unwrap()
            .is_none()
    );

    // 8. 删除单个与按交易对批量删除
    assert!(store.delete("d2").await.unwrap());
    assert!(!store.delete("d2").await.unwrap());
    assert!(store.get("d2").await.unwrap().is_none());

    assert_eq!(store.delete_all(Some("eurusd")).await.unwrap(), 2);
    assert!(store.list(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_drawing_is_rejected_atomically() {
    let tmp_dir = tempdir().unwrap();
    let store = SqliteDrawingStore::new(tmp_dir.path()).await.unwrap();

    let mut bad = new_drawing("bad", "EURUSD");
    bad.series[1].id = "upper".to_string();
    let err = store.create(bad).await.unwrap_err();
    assert!(matches!(err, StoreError::InvalidArgument(_)));

    let mut unnamed = new_drawing("unnamed", "EURUSD");
    unnamed.name = "  ".to_string();
    assert!(matches!(
        store.create(unnamed).await,
        Err(StoreError::InvalidArgument(_))
    ));

    assert!(store.list(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_store_reopens_existing_database() {
    let tmp_dir = tempdir().unwrap();
    {
        let store = SqliteDrawingStore::new(tmp_dir.path()).await.unwrap();
        store.create(new_drawing("persisted", "EURUSD")).await.unwrap();
    }

    let store = SqliteDrawingStore::new(tmp_dir.path()).await.unwrap();
    let drawing = store.get("persisted").await.unwrap().unwrap();
    assert_eq!(drawing.series.len(), 2);
    assert_eq!(store.delete_all(None).await.unwrap(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creates_with_distinct_ids_all_succeed() {
    let tmp_dir = tempdir().unwrap();
    let store = Arc::new(SqliteDrawingStore::new(tmp_dir.path()).await.unwrap());

    let handles: Vec<_> = (0..16)
        .map(|n| {
            let store = store.clone();
            tokio::spawn(async move { store.create(new_drawing(&format!("d{}", n), "EURUSD")).await })
        })
        .collect();

    for handle in handles {
        let created = handle.await.unwrap();
        assert!(created.is_ok(), "concurrent create failed: {:?}", created.err());
    }

    let all = store.list(Some("EURUSD")).await.unwrap();
    assert_eq!(all.len(), 16);
    assert!(all.iter().all(|d| d.series.len() == 2));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creates_with_same_id_yield_one_winner() {
    let tmp_dir = tempdir().unwrap();
    let store = Arc::new(SqliteDrawingStore::new(tmp_dir.path()).await.unwrap());

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let store = store.clone();
            tokio::spawn(async move { store.create(new_drawing("same", "EURUSD")).await })
        })
        .collect();

    let mut ok = 0;
    let mut conflict = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => ok += 1,
            Err(StoreError::Conflict(_)) => conflict += 1,
            Err(other) => panic!("unexpected error: {:?}", other),
        }
    }
    assert_eq!(ok, 1);
    assert_eq!(conflict, 15);
    assert_eq!(store.list(None).await.unwrap().len(), 1);
}
