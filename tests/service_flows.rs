//! Service-level flows against an in-memory SQLite database.

use std::sync::Arc;

use soapbox::application::{
    comments::CommentService,
    error::AppError,
    feed::FeedService,
    follows::FollowService,
    forms::PostInput,
    posts::PostService,
    repos::{FollowsRepo, GroupsRepo, NewGroup, NewPost, PostFilter, PostsRepo, UsersRepo},
};
use soapbox::domain::entities::{GroupRecord, UserRecord};
use soapbox::infra::db::SqliteRepositories;
use uuid::Uuid;

async fn repositories() -> Arc<SqliteRepositories> {
    let pool = SqliteRepositories::connect_in_memory().await.expect("pool");
    SqliteRepositories::run_migrations(&pool)
        .await
        .expect("migrations");
    Arc::new(SqliteRepositories::new(pool))
}

fn feed_service(repos: &Arc<SqliteRepositories>, page_size: u32) -> FeedService {
    FeedService::new(
        repos.clone(),
        repos.clone(),
        repos.clone(),
        repos.clone(),
        page_size,
    )
}

async fn seed_user(repos: &SqliteRepositories, username: &str) -> UserRecord {
    repos.create_user(username).await.expect("user")
}

async fn seed_group(repos: &SqliteRepositories, title: &str, slug: &str) -> GroupRecord {
    repos
        .create_group(NewGroup {
            title: title.to_string(),
            slug: slug.to_string(),
            description: format!("About {title}"),
        })
        .await
        .expect("group")
}

async fn seed_post(
    repos: &SqliteRepositories,
    author: Uuid,
    group: Option<Uuid>,
    text: &str,
) -> Uuid {
    repos
        .create_post(NewPost {
            text: text.to_string(),
            author_id: author,
            group_id: group,
            image: None,
        })
        .await
        .expect("post")
        .id
}

#[tokio::test]
async fn group_listing_only_contains_that_group() {
    let repos = repositories().await;
    let author = seed_user(&repos, "leo").await;
    let cats = seed_group(&repos, "Cats", "cats").await;
    let dogs = seed_group(&repos, "Dogs", "dogs").await;

    seed_post(&repos, author.id, Some(cats.id), "about cats").await;
    seed_post(&repos, author.id, Some(dogs.id), "about dogs").await;
    seed_post(&repos, author.id, None, "no group at all").await;

    let feed = feed_service(&repos, 10);
    let (group, page) = feed.list_by_group("cats", None).await.expect("listing");

    assert_eq!(group.title, "Cats");
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].text, "about cats");
    assert_eq!(
        page.items[0].group.as_ref().map(|g| g.slug.as_str()),
        Some("cats")
    );
}

#[tokio::test]
async fn unknown_group_slug_is_not_found() {
    let repos = repositories().await;
    let feed = feed_service(&repos, 10);
    assert!(matches!(
        feed.list_by_group("missing", None).await,
        Err(AppError::NotFound)
    ));
}

#[tokio::test]
async fn fifteen_posts_split_into_ten_and_five() {
    let repos = repositories().await;
    let author = seed_user(&repos, "leo").await;
    for n in 0..15 {
        seed_post(&repos, author.id, None, &format!("post {n}")).await;
    }

    let feed = feed_service(&repos, 10);

    let first = feed.list_all(None).await.expect("first page");
    assert_eq!(first.items.len(), 10);
    assert_eq!(first.page, 1);
    assert_eq!(first.total_pages, 2);
    assert_eq!(first.total_items, 15);

    let second = feed.list_all(Some("2")).await.expect("second page");
    assert_eq!(second.items.len(), 5);
    assert_eq!(second.page, 2);

    // Newest first: the seeded sequence comes back reversed across the pages.
    let texts: Vec<&str> = first
        .items
        .iter()
        .chain(second.items.iter())
        .map(|post| post.text.as_str())
        .collect();
    let expected: Vec<String> = (0..15).rev().map(|n| format!("post {n}")).collect();
    assert_eq!(texts, expected);
}

#[tokio::test]
async fn out_of_range_page_values_are_clamped() {
    let repos = repositories().await;
    let author = seed_user(&repos, "leo").await;
    for n in 0..15 {
        seed_post(&repos, author.id, None, &format!("post {n}")).await;
    }

    let feed = feed_service(&repos, 10);

    let overflow = feed.list_all(Some("99")).await.expect("clamped high");
    assert_eq!(overflow.page, 2);
    assert_eq!(overflow.items.len(), 5);

    let garbage = feed.list_all(Some("abc")).await.expect("clamped low");
    assert_eq!(garbage.page, 1);
    assert_eq!(garbage.items.len(), 10);

    // Numeric but below one still names a page, so it resolves to the last.
    let negative = feed.list_all(Some("-3")).await.expect("clamped negative");
    assert_eq!(negative.page, 2);
    assert_eq!(negative.items.len(), 5);
}

#[tokio::test]
async fn empty_collection_still_has_one_page() {
    let repos = repositories().await;
    let feed = feed_service(&repos, 10);

    let page = feed.list_all(None).await.expect("empty page");
    assert!(page.items.is_empty());
    assert_eq!(page.page, 1);
    assert_eq!(page.total_pages, 1);
}

#[tokio::test]
async fn blank_post_text_is_rejected_and_nothing_is_stored() {
    let repos = repositories().await;
    let author = seed_user(&repos, "leo").await;
    let service = PostService::new(repos.clone(), repos.clone());

    let input = PostInput {
        text: "   ".to_string(),
        group: None,
    };
    let result = service.create(author.id, &input, None).await;
    assert!(matches!(result, Err(AppError::Validation(_))));

    let count = repos.count_posts(PostFilter::default()).await.expect("count");
    assert_eq!(count, 0);
}

#[tokio::test]
async fn unknown_group_id_is_a_validation_error() {
    let repos = repositories().await;
    let author = seed_user(&repos, "leo").await;
    let service = PostService::new(repos.clone(), repos.clone());

    let input = PostInput {
        text: "hello".to_string(),
        group: Some(Uuid::new_v4().to_string()),
    };
    let result = service.create(author.id, &input, None).await;
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn only_the_author_may_edit() {
    let repos = repositories().await;
    let author = seed_user(&repos, "leo").await;
    let other = seed_user(&repos, "mila").await;
    let post_id = seed_post(&repos, author.id, None, "original").await;

    let service = PostService::new(repos.clone(), repos.clone());
    let input = PostInput {
        text: "hijacked".to_string(),
        group: None,
    };

    let result = service.edit(post_id, other.id, &input, None).await;
    assert!(matches!(result, Err(AppError::Forbidden)));

    let stored = repos.get_post(post_id).await.expect("get").expect("post");
    assert_eq!(stored.text, "original");
}

#[tokio::test]
async fn editing_keeps_pub_date_and_author() {
    let repos = repositories().await;
    let author = seed_user(&repos, "leo").await;
    let group = seed_group(&repos, "Cats", "cats").await;
    let post_id = seed_post(&repos, author.id, None, "original").await;
    let before = repos.get_post(post_id).await.expect("get").expect("post");

    let service = PostService::new(repos.clone(), repos.clone());
    let input = PostInput {
        text: "updated".to_string(),
        group: Some(group.id.to_string()),
    };
    let updated = service
        .edit(post_id, author.id, &input, None)
        .await
        .expect("edit");

    assert_eq!(updated.text, "updated");
    assert_eq!(updated.pub_date, before.pub_date);
    assert_eq!(updated.author_id, author.id);
    assert_eq!(updated.group.map(|g| g.slug), Some("cats".to_string()));
}

#[tokio::test]
async fn following_twice_keeps_a_single_relation() {
    let repos = repositories().await;
    let follower = seed_user(&repos, "leo").await;
    let author = seed_user(&repos, "mila").await;
    let service = FollowService::new(repos.clone(), repos.clone());

    service.follow(follower.id, "mila").await.expect("first");
    service.follow(follower.id, "mila").await.expect("second");

    let count = repos.count_follows_of(author.id).await.expect("count");
    assert_eq!(count, 1);
}

#[tokio::test]
async fn self_follow_is_a_noop() {
    let repos = repositories().await;
    let user = seed_user(&repos, "leo").await;
    let service = FollowService::new(repos.clone(), repos.clone());

    service.follow(user.id, "leo").await.expect("noop");

    let count = repos.count_follows_of(user.id).await.expect("count");
    assert_eq!(count, 0);
}

#[tokio::test]
async fn unfollow_removes_only_that_pair() {
    let repos = repositories().await;
    let first = seed_user(&repos, "leo").await;
    let second = seed_user(&repos, "mila").await;
    let author = seed_user(&repos, "sasha").await;
    let service = FollowService::new(repos.clone(), repos.clone());

    service.follow(first.id, "sasha").await.expect("follow");
    service.follow(second.id, "sasha").await.expect("follow");

    service.unfollow(first.id, "sasha").await.expect("unfollow");

    assert!(!repos.follow_exists(first.id, author.id).await.expect("check"));
    assert!(repos.follow_exists(second.id, author.id).await.expect("check"));
}

#[tokio::test]
async fn unfollowing_without_a_relation_is_not_found() {
    let repos = repositories().await;
    let follower = seed_user(&repos, "leo").await;
    seed_user(&repos, "mila").await;
    let service = FollowService::new(repos.clone(), repos.clone());

    assert!(matches!(
        service.unfollow(follower.id, "mila").await,
        Err(AppError::NotFound)
    ));
}

#[tokio::test]
async fn followed_feed_only_lists_followed_authors() {
    let repos = repositories().await;
    let reader = seed_user(&repos, "leo").await;
    let followed = seed_user(&repos, "mila").await;
    let stranger = seed_user(&repos, "sasha").await;
    seed_post(&repos, followed.id, None, "from mila").await;
    seed_post(&repos, stranger.id, None, "from sasha").await;

    let follows = FollowService::new(repos.clone(), repos.clone());
    follows.follow(reader.id, "mila").await.expect("follow");

    let feed = feed_service(&repos, 10);
    let page = feed.list_followed(reader.id, None).await.expect("feed");
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].text, "from mila");
}

#[tokio::test]
async fn comment_on_missing_post_is_not_found() {
    let repos = repositories().await;
    let user = seed_user(&repos, "leo").await;
    let service = CommentService::new(repos.clone(), repos.clone());

    assert!(matches!(
        service.add(Uuid::new_v4(), user.id, "hello").await,
        Err(AppError::NotFound)
    ));
}

#[tokio::test]
async fn comments_appear_newest_first_on_the_detail() {
    let repos = repositories().await;
    let author = seed_user(&repos, "leo").await;
    let post_id = seed_post(&repos, author.id, None, "post").await;
    let service = CommentService::new(repos.clone(), repos.clone());

    service.add(post_id, author.id, "first").await.expect("add");
    service.add(post_id, author.id, "second").await.expect("add");

    let feed = feed_service(&repos, 10);
    let detail = feed.post_detail(post_id).await.expect("detail");
    assert_eq!(detail.comments.len(), 2);
    assert_eq!(detail.comments[0].text, "second");
    assert_eq!(detail.comments[1].text, "first");
    assert_eq!(detail.author_post_count, 1);
}

#[tokio::test]
async fn deleting_a_group_keeps_its_posts() {
    let repos = repositories().await;
    let author = seed_user(&repos, "leo").await;
    let group = seed_group(&repos, "Cats", "cats").await;
    let post_id = seed_post(&repos, author.id, Some(group.id), "in group").await;

    repos.delete_group(group.id).await.expect("delete group");

    let post = repos.get_post(post_id).await.expect("get").expect("post");
    assert!(post.group.is_none());
}

#[tokio::test]
async fn deleting_a_user_cascades_content() {
    let repos = repositories().await;
    let author = seed_user(&repos, "leo").await;
    let reader = seed_user(&repos, "mila").await;
    let post_id = seed_post(&repos, author.id, None, "post").await;

    let comments = CommentService::new(repos.clone(), repos.clone());
    comments.add(post_id, reader.id, "nice").await.expect("comment");
    let follows = FollowService::new(repos.clone(), repos.clone());
    follows.follow(reader.id, "leo").await.expect("follow");

    repos.delete_user(author.id).await.expect("delete user");

    assert!(repos.get_post(post_id).await.expect("get").is_none());
    assert_eq!(repos.count_follows_of(author.id).await.expect("count"), 0);
    assert_eq!(repos.count_posts(PostFilter::default()).await.expect("count"), 0);
}
