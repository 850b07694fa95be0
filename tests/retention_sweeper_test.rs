use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use chrono::Utc;
use futures::stream;

use voxrelay::application::ports::StagingStore;
use voxrelay::application::services::RetentionSweeper;
use voxrelay::domain::StoragePath;
use voxrelay::infrastructure::storage::ObjectStagingStore;

async fn store_artifact(store: &ObjectStagingStore) -> StoragePath {
    let path = StoragePath::generate("file");
    store
        .store(&path, Box::pin(stream::iter(vec![Ok(Bytes::from("webm"))])))
        .await
        .unwrap();
    path
}

#[tokio::test]
async fn given_artifact_older_than_max_age_when_sweeping_then_it_is_evicted() {
    let store = Arc::new(ObjectStagingStore::in_memory());
    let path = store_artifact(&store).await;
    let sweeper = RetentionSweeper::new(store.clone(), Duration::from_secs(60));

    let evicted = sweeper
        .sweep_once(Utc::now() + chrono::Duration::seconds(120))
        .await
        .unwrap();

    assert_eq!(evicted, 1);
    assert!(store.fetch(&path).await.is_err());
}

#[tokio::test]
async fn given_fresh_artifact_when_sweeping_then_it_is_kept() {
    let store = Arc::new(ObjectStagingStore::in_memory());
    let path = store_artifact(&store).await;
    let sweeper = RetentionSweeper::new(store.clone(), Duration::from_secs(3600));

    let evicted = sweeper.sweep_once(Utc::now()).await.unwrap();

    assert_eq!(evicted, 0);
    assert_eq!(store.fetch(&path).await.unwrap(), b"webm");
}

#[tokio::test]
async fn given_local_store_with_expired_files_when_sweeping_then_directory_is_emptied() {
    let dir = tempfile::TempDir::new().unwrap();
    let store = Arc::new(ObjectStagingStore::local(dir.path().to_path_buf()).unwrap());
    store_artifact(&store).await;
    store_artifact(&store).await;
    let sweeper = RetentionSweeper::new(store.clone(), Duration::ZERO);

    let evicted = sweeper
        .sweep_once(Utc::now() + chrono::Duration::seconds(1))
        .await
        .unwrap();

    assert_eq!(evicted, 2);
    assert!(store.list().await.unwrap().is_empty());
}
