//! ProductRepository 統合テスト
//!
//! インメモリ SQLite を使用したテスト。テストごとに新しい DB を作成する。
//! 同時実行のテストのみ、複数接続を張れる一時ファイルの DB を使用する。
//!
//! 実行方法:
//! ```bash
//! cargo test -p catalog-infra --test product_repository_test
//! ```

mod common;

use std::sync::Arc;

use catalog_domain::product::{
    Price,
    PriceFloor,
    ProductFilter,
    ProductId,
    ProductName,
    ProductPatch,
    Quantity,
};
use catalog_infra::{
    InfraErrorKind,
    SqliteTransactionManager,
    TransactionManager,
    repository::{ProductRepository, SqliteProductRepository},
};
use common::{new_product, setup_file_pool, setup_pool};
use pretty_assertions::assert_eq;
use rstest::rstest;
use sqlx::SqlitePool;

// =============================================================================
// ヘルパー
// =============================================================================

/// 1 件をコミットまで行う
async fn insert_committed(
    pool: &SqlitePool,
    name: &str,
    price: f64,
    quantity: i64,
) -> catalog_domain::product::Product {
    let repo = SqliteProductRepository::new(pool.clone());
    let mut tx = SqliteTransactionManager::new(pool.clone())
        .begin()
        .await
        .unwrap();
    let product = repo
        .insert(&mut tx, &new_product(name, price, quantity))
        .await
        .unwrap();
    tx.commit().await.unwrap();
    product
}

// =============================================================================
// insert
// =============================================================================

#[tokio::test]
async fn test_insert_idは1から順に採番される() {
    // Arrange
    let pool = setup_pool().await;

    // Act
    let widget = insert_committed(&pool, "Widget", 9.99, 100).await;
    let gadget = insert_committed(&pool, "Gadget", 24.5, 10).await;

    // Assert
    assert_eq!(widget.id(), ProductId::new(1));
    assert_eq!(gadget.id(), ProductId::new(2));
    assert_eq!(widget.name().as_str(), "Widget");
    assert_eq!(widget.price().value(), 9.99);
    assert_eq!(widget.quantity().value(), 100);
    assert_eq!(widget.description(), None);
}

#[tokio::test]
async fn test_insert_任意項目を保存できる() {
    // Arrange
    let pool = setup_pool().await;
    let sut = SqliteProductRepository::new(pool.clone());
    let mut product = new_product("Widget", 9.99, 100);
    product.description = Some("小型の部品".to_string());
    product.category = Some("parts".to_string());

    // Act
    let mut tx = SqliteTransactionManager::new(pool.clone())
        .begin()
        .await
        .unwrap();
    let created = sut.insert(&mut tx, &product).await.unwrap();
    tx.commit().await.unwrap();

    // Assert
    let found = sut.find_by_id(created.id()).await.unwrap().unwrap();
    assert_eq!(found.description(), Some("小型の部品"));
    assert_eq!(found.category(), Some("parts"));
}

#[tokio::test]
async fn test_insert_重複名はduplicateエラーになり件数は変わらない() {
    // Arrange
    let pool = setup_pool().await;
    insert_committed(&pool, "Widget", 9.99, 100).await;
    let sut = SqliteProductRepository::new(pool.clone());

    // Act
    let mut tx = SqliteTransactionManager::new(pool.clone())
        .begin()
        .await
        .unwrap();
    let result = sut.insert(&mut tx, &new_product("Widget", 1.0, 1)).await;
    drop(tx);

    // Assert
    let err = result.unwrap_err();
    assert!(matches!(
        err.kind(),
        InfraErrorKind::Duplicate { entity, key } if entity == "Product" && key == "Widget"
    ));
    let all = sut.find_all(&ProductFilter::all()).await.unwrap();
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn test_insert_大文字小文字が異なる名前は別商品として扱う() {
    let pool = setup_pool().await;
    insert_committed(&pool, "Widget", 9.99, 100).await;

    let other = insert_committed(&pool, "widget", 9.99, 100).await;

    assert_eq!(other.id(), ProductId::new(2));
}

#[tokio::test]
async fn test_insert_削除済みのidは再利用されない() {
    // Arrange
    let pool = setup_pool().await;
    let sut = SqliteProductRepository::new(pool.clone());
    let tx_manager = SqliteTransactionManager::new(pool.clone());
    let first = insert_committed(&pool, "Widget", 9.99, 100).await;

    let mut tx = tx_manager.begin().await.unwrap();
    assert!(sut.delete(&mut tx, first.id()).await.unwrap());
    tx.commit().await.unwrap();

    // Act
    let second = insert_committed(&pool, "Widget", 9.99, 100).await;

    // Assert
    assert_eq!(second.id(), ProductId::new(2));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_insert_同名の同時登録はちょうど1件だけ成功する() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();
    let pool = setup_file_pool(&dir).await;
    let sut = Arc::new(SqliteProductRepository::new(pool.clone()));
    let tx_manager = Arc::new(SqliteTransactionManager::new(pool.clone()));

    // Act
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let sut = Arc::clone(&sut);
            let tx_manager = Arc::clone(&tx_manager);
            tokio::spawn(async move {
                let mut tx = tx_manager.begin().await?;
                let product = sut.insert(&mut tx, &new_product("Widget", 9.99, 1)).await?;
                tx.commit().await?;
                Ok::<_, catalog_infra::InfraError>(product)
            })
        })
        .collect();

    let mut succeeded = 0;
    let mut duplicated = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => succeeded += 1,
            Err(e) if e.is_duplicate() => duplicated += 1,
            Err(e) => panic!("想定外のエラー: {e}"),
        }
    }

    // Assert
    assert_eq!(succeeded, 1);
    assert_eq!(duplicated, 7);
    let all = sut.find_all(&ProductFilter::all()).await.unwrap();
    assert_eq!(all.len(), 1);
}

// =============================================================================
// find_by_id / find_all
// =============================================================================

#[tokio::test]
async fn test_find_by_id_存在しないidはnoneを返す() {
    let pool = setup_pool().await;
    let sut = SqliteProductRepository::new(pool);

    let found = sut.find_by_id(ProductId::new(999)).await.unwrap();

    assert_eq!(found, None);
}

#[tokio::test]
async fn test_find_all_空の場合は空配列を返す() {
    let pool = setup_pool().await;
    let sut = SqliteProductRepository::new(pool);

    let found = sut.find_all(&ProductFilter::all()).await.unwrap();

    assert!(found.is_empty());
}

#[rstest]
#[case(None, vec!["Widget", "Gadget", "Gizmo"])]
#[case(Some(0.0), vec!["Widget", "Gadget", "Gizmo"])]
#[case(Some(35.0), vec!["Gadget", "Gizmo"])]
#[case(Some(35.01), vec!["Gizmo"])]
#[case(Some(1000.0), vec![])]
#[tokio::test]
async fn test_find_all_最低価格で絞り込み登録順で返す(
    #[case] price_gte: Option<f64>,
    #[case] expected: Vec<&str>,
) {
    // Arrange
    let pool = setup_pool().await;
    insert_committed(&pool, "Widget", 10.0, 1).await;
    insert_committed(&pool, "Gadget", 35.0, 1).await;
    insert_committed(&pool, "Gizmo", 99.0, 1).await;
    let sut = SqliteProductRepository::new(pool);
    let filter = match price_gte {
        Some(v) => ProductFilter::price_gte(PriceFloor::new(v).unwrap()),
        None => ProductFilter::all(),
    };

    // Act
    let found = sut.find_all(&filter).await.unwrap();

    // Assert
    let names: Vec<&str> = found.iter().map(|p| p.name().as_str()).collect();
    assert_eq!(names, expected);
}

// =============================================================================
// update
// =============================================================================

#[tokio::test]
async fn test_update_指定したフィールドのみ変更される() {
    // Arrange
    let pool = setup_pool().await;
    let sut = SqliteProductRepository::new(pool.clone());
    let current = insert_committed(&pool, "Gadget", 24.5, 10).await;
    let patch = ProductPatch {
        quantity: Some(Quantity::new(50).unwrap()),
        description: Some(Some("更新後".to_string())),
        ..Default::default()
    };

    // Act
    let mut tx = SqliteTransactionManager::new(pool.clone())
        .begin()
        .await
        .unwrap();
    let updated = sut
        .update(&mut tx, current.id(), &patch)
        .await
        .unwrap()
        .unwrap();
    tx.commit().await.unwrap();

    // Assert
    assert_eq!(updated, current.clone().apply(patch));
    assert_eq!(updated.quantity().value(), 50);
    assert_eq!(updated.price().value(), 24.5);
    assert_eq!(updated.name().as_str(), "Gadget");
    assert_eq!(updated.description(), Some("更新後"));
    let found = sut.find_by_id(current.id()).await.unwrap();
    assert_eq!(found, Some(updated));
}

#[tokio::test]
async fn test_update_some_noneで任意項目をクリアし未指定の項目は維持する() {
    // Arrange
    let pool = setup_pool().await;
    let sut = SqliteProductRepository::new(pool.clone());
    let tx_manager = SqliteTransactionManager::new(pool.clone());
    let mut product = new_product("Widget", 9.99, 100);
    product.description = Some("小型の部品".to_string());
    product.category = Some("parts".to_string());
    let mut tx = tx_manager.begin().await.unwrap();
    let created = sut.insert(&mut tx, &product).await.unwrap();
    tx.commit().await.unwrap();

    // Act
    let patch = ProductPatch {
        description: Some(None),
        ..Default::default()
    };
    let mut tx = tx_manager.begin().await.unwrap();
    let updated = sut
        .update(&mut tx, created.id(), &patch)
        .await
        .unwrap()
        .unwrap();
    tx.commit().await.unwrap();

    // Assert
    assert_eq!(updated.description(), None);
    assert_eq!(updated.category(), Some("parts"));
}

#[tokio::test]
async fn test_update_パッチ作成後に他の列が変更されても上書きしない() {
    // Arrange
    let pool = setup_pool().await;
    let sut = SqliteProductRepository::new(pool.clone());
    let tx_manager = SqliteTransactionManager::new(pool.clone());
    let widget = insert_committed(&pool, "Widget", 9.99, 100).await;
    let price_patch = ProductPatch {
        price: Some(Price::new(12.5).unwrap()),
        ..Default::default()
    };

    // Act: 価格のパッチを書き込む前に、別の書き込みが在庫数を変更する
    let mut tx = tx_manager.begin().await.unwrap();
    let quantity_patch = ProductPatch {
        quantity: Some(Quantity::new(0).unwrap()),
        ..Default::default()
    };
    sut.update(&mut tx, widget.id(), &quantity_patch)
        .await
        .unwrap();
    tx.commit().await.unwrap();

    let mut tx = tx_manager.begin().await.unwrap();
    sut.update(&mut tx, widget.id(), &price_patch)
        .await
        .unwrap();
    tx.commit().await.unwrap();

    // Assert
    let found = sut.find_by_id(widget.id()).await.unwrap().unwrap();
    assert_eq!(found.price().value(), 12.5);
    assert_eq!(found.quantity().value(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_update_別々のフィールドへの同時更新はすべて反映される() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();
    let pool = setup_file_pool(&dir).await;
    let widget = insert_committed(&pool, "Widget", 9.99, 100).await;
    let sut = Arc::new(SqliteProductRepository::new(pool.clone()));
    let tx_manager = Arc::new(SqliteTransactionManager::new(pool.clone()));
    let patches = [
        ProductPatch {
            price: Some(Price::new(12.5).unwrap()),
            ..Default::default()
        },
        ProductPatch {
            quantity: Some(Quantity::new(0).unwrap()),
            ..Default::default()
        },
        ProductPatch {
            description: Some(Some("小型の部品".to_string())),
            ..Default::default()
        },
        ProductPatch {
            category: Some(Some("parts".to_string())),
            ..Default::default()
        },
    ];

    // Act
    let handles: Vec<_> = patches
        .into_iter()
        .map(|patch| {
            let sut = Arc::clone(&sut);
            let tx_manager = Arc::clone(&tx_manager);
            let id = widget.id();
            tokio::spawn(async move {
                let mut tx = tx_manager.begin().await?;
                let updated = sut.update(&mut tx, id, &patch).await?;
                tx.commit().await?;
                Ok::<_, catalog_infra::InfraError>(updated)
            })
        })
        .collect();
    for handle in handles {
        assert!(handle.await.unwrap().unwrap().is_some());
    }

    // Assert
    let found = sut.find_by_id(widget.id()).await.unwrap().unwrap();
    assert_eq!(found.name().as_str(), "Widget");
    assert_eq!(found.price().value(), 12.5);
    assert_eq!(found.quantity().value(), 0);
    assert_eq!(found.description(), Some("小型の部品"));
    assert_eq!(found.category(), Some("parts"));
}

#[tokio::test]
async fn test_update_存在しない商品はnoneを返す() {
    // Arrange
    let pool = setup_pool().await;
    let sut = SqliteProductRepository::new(pool.clone());
    let patch = ProductPatch {
        price: Some(Price::new(1.0).unwrap()),
        ..Default::default()
    };

    // Act
    let mut tx = SqliteTransactionManager::new(pool.clone())
        .begin()
        .await
        .unwrap();
    let result = sut.update(&mut tx, ProductId::new(42), &patch).await.unwrap();

    // Assert
    assert_eq!(result, None);
}

#[tokio::test]
async fn test_update_他商品と同じ名前への変更はduplicateエラーになる() {
    // Arrange
    let pool = setup_pool().await;
    let sut = SqliteProductRepository::new(pool.clone());
    insert_committed(&pool, "Widget", 9.99, 100).await;
    let gadget = insert_committed(&pool, "Gadget", 24.5, 10).await;
    let patch = ProductPatch {
        name: Some(ProductName::new("Widget").unwrap()),
        price: Some(Price::new(1.0).unwrap()),
        ..Default::default()
    };

    // Act
    let mut tx = SqliteTransactionManager::new(pool.clone())
        .begin()
        .await
        .unwrap();
    let result = sut.update(&mut tx, gadget.id(), &patch).await;
    drop(tx);

    // Assert
    let err = result.unwrap_err();
    assert!(matches!(
        err.kind(),
        InfraErrorKind::Duplicate { key, .. } if key == "Widget"
    ));
    let found = sut.find_by_id(gadget.id()).await.unwrap();
    assert_eq!(found, Some(gadget));
}

#[tokio::test]
async fn test_update_自身と同じ名前のままなら成功する() {
    let pool = setup_pool().await;
    let sut = SqliteProductRepository::new(pool.clone());
    let widget = insert_committed(&pool, "Widget", 9.99, 100).await;
    let patch = ProductPatch {
        name: Some(ProductName::new("Widget").unwrap()),
        ..Default::default()
    };

    let mut tx = SqliteTransactionManager::new(pool.clone())
        .begin()
        .await
        .unwrap();
    let result = sut.update(&mut tx, widget.id(), &patch).await.unwrap();
    tx.commit().await.unwrap();

    assert_eq!(result, Some(widget));
}

// =============================================================================
// delete
// =============================================================================

#[tokio::test]
async fn test_delete_削除後は取得できない() {
    // Arrange
    let pool = setup_pool().await;
    let sut = SqliteProductRepository::new(pool.clone());
    let tx_manager = SqliteTransactionManager::new(pool.clone());
    let widget = insert_committed(&pool, "Widget", 9.99, 100).await;

    // Act
    let mut tx = tx_manager.begin().await.unwrap();
    let deleted = sut.delete(&mut tx, widget.id()).await.unwrap();
    tx.commit().await.unwrap();

    // Assert
    assert!(deleted);
    assert_eq!(sut.find_by_id(widget.id()).await.unwrap(), None);

    let mut tx = tx_manager.begin().await.unwrap();
    let deleted_again = sut.delete(&mut tx, widget.id()).await.unwrap();
    assert!(!deleted_again);
}
