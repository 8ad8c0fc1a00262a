use std::{process, sync::Arc};

use soapbox::{
    application::{
        comments::CommentService,
        error::AppError,
        feed::FeedService,
        follows::FollowService,
        posts::PostService,
        repos::{CommentsRepo, FollowsRepo, GroupsRepo, NewGroup, PostsRepo, UsersRepo},
    },
    cache::{CacheState, PageCache},
    config,
    domain::{error::DomainError, slugs::derive_slug},
    infra::{
        db::SqliteRepositories,
        error::InfraError,
        http::{self, HttpState, SessionStore},
        telemetry,
        uploads::UploadStorage,
    },
};
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli().map_err(|err| {
        AppError::from(InfraError::configuration(format!(
            "failed to load configuration: {err}"
        )))
    })?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::User(args) => match args.command {
            config::UserCommand::Add(add) => run_user_add(settings, add).await,
        },
        config::Command::Group(args) => match args.command {
            config::GroupCommand::Add(add) => run_group_add(settings, add).await,
        },
    }
}

async fn init_repositories(settings: &config::Settings) -> Result<Arc<SqliteRepositories>, AppError> {
    let pool = SqliteRepositories::connect(
        &settings.database.url,
        settings.database.max_connections.get(),
    )
    .await
    .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    SqliteRepositories::run_migrations(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    Ok(Arc::new(SqliteRepositories::new(pool)))
}

fn build_http_state(
    repositories: Arc<SqliteRepositories>,
    settings: &config::Settings,
) -> Result<HttpState, AppError> {
    let posts_repo: Arc<dyn PostsRepo> = repositories.clone();
    let groups_repo: Arc<dyn GroupsRepo> = repositories.clone();
    let users_repo: Arc<dyn UsersRepo> = repositories.clone();
    let comments_repo: Arc<dyn CommentsRepo> = repositories.clone();
    let follows_repo: Arc<dyn FollowsRepo> = repositories.clone();

    let feed = Arc::new(FeedService::new(
        posts_repo.clone(),
        groups_repo.clone(),
        users_repo.clone(),
        comments_repo.clone(),
        settings.pagination.page_size.get(),
    ));
    let posts = Arc::new(PostService::new(posts_repo.clone(), groups_repo));
    let comments = Arc::new(CommentService::new(posts_repo, comments_repo));
    let follows = Arc::new(FollowService::new(users_repo, follows_repo));

    let uploads = Arc::new(
        UploadStorage::new(settings.uploads.directory.clone())
            .map_err(|err| AppError::from(InfraError::Io(err)))?,
    );

    let cache = settings.cache.enabled.then(|| CacheState {
        config: settings.cache.clone(),
        store: Arc::new(PageCache::new(&settings.cache)),
    });

    Ok(HttpState {
        feed,
        posts,
        comments,
        follows,
        sessions: Arc::new(SessionStore::new()),
        uploads,
        cache,
    })
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;
    let state = build_http_state(repositories, &settings)?;
    let router = http::build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.server.bind)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(addr = %settings.server.bind, "listening");

    axum::serve(listener, router.into_make_service())
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    Ok(())
}

async fn run_user_add(
    settings: config::Settings,
    args: config::UserAddArgs,
) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;
    let user = repositories.create_user(&args.username).await?;
    info!(user_id = %user.id, username = %user.username, "user created");
    Ok(())
}

async fn run_group_add(
    settings: config::Settings,
    args: config::GroupAddArgs,
) -> Result<(), AppError> {
    let slug = derive_slug(&args.title)
        .map_err(|err| AppError::from(DomainError::validation(err.to_string())))?;

    let repositories = init_repositories(&settings).await?;
    let group = repositories
        .create_group(NewGroup {
            title: args.title,
            slug,
            description: args.description,
        })
        .await?;

    info!(group_id = %group.id, slug = %group.slug, "group created");
    Ok(())
}
