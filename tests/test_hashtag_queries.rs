// Integration tests for trending and search-by-hashtag queries
use hoshi_pipeline::application::services::{HashtagQueryService, HashtagService};
use hoshi_pipeline::domain::ports::entity_validator::{AcceptAllValidator, EntityValidator};
use hoshi_pipeline::domain::ports::hashtag_repository::HashtagRepository;
use hoshi_pipeline::domain::ports::post_directory::PostDirectory;
use hoshi_pipeline::infrastructure::http::middleware::ApiError;
use hoshi_pipeline::infrastructure::persistence::Database;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

mod helpers;
use helpers::*;

fn query_service(db: &Database, directory: Arc<FakePostDirectory>) -> HashtagQueryService {
    HashtagQueryService::new(
        Arc::new(db.clone()) as Arc<dyn HashtagRepository>,
        directory as Arc<dyn PostDirectory>,
        Duration::from_secs(5),
    )
}

async fn tag(db: &Database, post_id: i64, names: &[&str]) {
    let service = HashtagService::new(
        Arc::new(db.clone()) as Arc<dyn HashtagRepository>,
        Arc::new(AcceptAllValidator) as Arc<dyn EntityValidator>,
    );
    let names: Vec<String> = names.iter().map(|s| s.to_string()).collect();
    service
        .add_hashtags_to_post(post_id, &names)
        .await
        .expect("Failed to tag post");
}

#[tokio::test]
async fn test_trending_orders_by_post_count() {
    let test_db = setup_test_db().await;
    let db = test_db.db();

    for post_id in 1..=5 {
        tag(&db, post_id, &["five"]).await;
    }
    for post_id in 1..=3 {
        tag(&db, post_id, &["three"]).await;
    }
    for post_id in 1..=8 {
        tag(&db, post_id, &["eight"]).await;
    }

    let service = query_service(&db, Arc::new(FakePostDirectory::new()));

    let trending = service.get_trending_hashtags(10).await.unwrap();
    let summary: Vec<(&str, i64)> = trending
        .iter()
        .map(|h| (h.name.as_str(), h.post_count))
        .collect();
    assert_eq!(summary, vec![("eight", 8), ("five", 5), ("three", 3)]);

    let top_two = service.get_trending_hashtags(2).await.unwrap();
    assert_eq!(top_two.len(), 2);
    assert_eq!(top_two[0].name, "eight");
    assert_eq!(top_two[1].name, "five");
}

#[tokio::test]
async fn test_trending_on_empty_store() {
    let test_db = setup_test_db().await;
    let db = test_db.db();
    let service = query_service(&db, Arc::new(FakePostDirectory::new()));

    assert!(service.get_trending_hashtags(10).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_search_pages_newest_first_with_one_lookup() {
    let test_db = setup_test_db().await;
    let db = test_db.db();

    for post_id in 1..=10 {
        tag(&db, post_id, &["rust"]).await;
    }

    let directory = Arc::new(FakePostDirectory::new());
    let service = query_service(&db, directory.clone());

    let page = service.search_by_hashtag("rust", 3, 3).await.unwrap();
    let ids: Vec<i64> = page.posts.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![7, 6, 5]);
    assert_eq!(page.total_post_count, 10);

    // One batched call for the whole page
    assert_eq!(directory.call_count(), 1);
    assert_eq!(directory.calls.lock().unwrap()[0], vec![7, 6, 5]);

    // Post service fields are passed through untouched
    assert_eq!(page.posts[0].fields["caption"], "post 7");
}

#[tokio::test]
async fn test_search_unknown_hashtag_is_empty() {
    let test_db = setup_test_db().await;
    let db = test_db.db();
    let directory = Arc::new(FakePostDirectory::new());
    let service = query_service(&db, directory.clone());

    let page = service.search_by_hashtag("nope", 10, 0).await.unwrap();
    assert!(page.posts.is_empty());
    assert_eq!(page.total_post_count, 0);
    assert_eq!(directory.call_count(), 0);
}

#[tokio::test]
async fn test_search_past_last_page_keeps_total() {
    let test_db = setup_test_db().await;
    let db = test_db.db();
    for post_id in 1..=4 {
        tag(&db, post_id, &["rust"]).await;
    }

    let directory = Arc::new(FakePostDirectory::new());
    let service = query_service(&db, directory.clone());

    let page = service.search_by_hashtag("rust", 10, 50).await.unwrap();
    assert!(page.posts.is_empty());
    assert_eq!(page.total_post_count, 4);
    assert_eq!(directory.call_count(), 0);
}

#[tokio::test]
async fn test_search_skips_posts_the_directory_does_not_return() {
    let test_db = setup_test_db().await;
    let db = test_db.db();
    for post_id in 1..=3 {
        tag(&db, post_id, &["rust"]).await;
    }

    let directory = Arc::new(FakePostDirectory {
        missing: HashSet::from([2]),
        ..FakePostDirectory::default()
    });
    let service = query_service(&db, directory);

    let page = service.search_by_hashtag("rust", 10, 0).await.unwrap();
    let ids: Vec<i64> = page.posts.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![3, 1]);
    assert_eq!(page.total_post_count, 3);
}

#[tokio::test]
async fn test_search_fails_when_directory_fails() {
    let test_db = setup_test_db().await;
    let db = test_db.db();
    tag(&db, 1, &["rust"]).await;

    let service = query_service(&db, Arc::new(FakePostDirectory::failing()));

    let result = service.search_by_hashtag("rust", 10, 0).await;
    match result {
        Err(ApiError::Internal(msg)) => {
            assert_eq!(msg, "Failed to get posts from post service")
        }
        other => panic!("Expected internal error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_search_respects_deadline() {
    let test_db = setup_test_db().await;
    let db = test_db.db();
    tag(&db, 1, &["rust"]).await;

    let service = HashtagQueryService::new(
        Arc::new(db.clone()) as Arc<dyn HashtagRepository>,
        Arc::new(FakePostDirectory::slow(Duration::from_secs(5))) as Arc<dyn PostDirectory>,
        Duration::from_millis(50),
    );

    let result = service.search_by_hashtag("rust", 10, 0).await;
    assert!(matches!(result, Err(ApiError::Internal(_))));
}

#[tokio::test]
async fn test_invalid_arguments_are_rejected() {
    let test_db = setup_test_db().await;
    let db = test_db.db();
    let service = query_service(&db, Arc::new(FakePostDirectory::new()));

    assert!(matches!(
        service.get_trending_hashtags(0).await,
        Err(ApiError::BadRequest(_))
    ));
    assert!(matches!(
        service.get_trending_hashtags(101).await,
        Err(ApiError::BadRequest(_))
    ));
    assert!(matches!(
        service.search_by_hashtag("rust", 0, 0).await,
        Err(ApiError::BadRequest(_))
    ));
    assert!(matches!(
        service.search_by_hashtag("rust", 10, -1).await,
        Err(ApiError::BadRequest(_))
    ));
}
