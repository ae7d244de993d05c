use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use dotenvy::dotenv;
use sqlx::sqlite::SqlitePoolOptions;
use tower_http::catch_panic::CatchPanicLayer;

use tastebook::web::middleware::auth as auth_middleware;
use tastebook::web::routes::{auth, friends, posts, users};
use tastebook::{database, AppConfig, AppState};

#[tokio::main]
async fn main() {
    dotenv().ok();

    tracing_subscriber::fmt::init();

    let db_url = env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite::memory:".to_string());
    tracing::info!("connecting to database: {}", db_url);

    let pool = SqlitePoolOptions::new()
        .connect(&db_url)
        .await
        .expect("cannot connect to database");

    database::init_db(&pool).await.expect("schema init failed");

    let state = AppState {
        pool,
        config: Arc::new(AppConfig::from_env()),
    };

    let protected_routes = Router::new()
        // Identity
        .route(
            "/users/me",
            get(users::me_handler)
                .patch(users::update_me_handler)
                .delete(users::delete_me_handler),
        )
        .route("/users/:user_id", get(users::get_user_handler))
        .route("/users", get(users::search_users_handler))
        // Friendship graph
        .route(
            "/friends/request/:user_id",
            post(friends::send_request_handler),
        )
        .route("/friends/requests/sent", get(friends::sent_requests_handler))
        .route(
            "/friends/requests/received",
            get(friends::received_requests_handler),
        )
        .route(
            "/friends/requests/:request_id/accept",
            put(friends::accept_request_handler),
        )
        .route(
            "/friends/requests/:request_id/decline",
            put(friends::decline_request_handler),
        )
        .route(
            "/friends/requests/:request_id",
            delete(friends::cancel_request_handler),
        )
        .route("/friends", get(friends::my_friends_handler))
        .route("/friends/blocked", get(friends::blocked_users_handler))
        .route("/friends/suggestions", get(friends::suggestions_handler))
        .route("/friends/explore", get(friends::explore_handler))
        .route(
            "/friends/mutual/:user_id",
            get(friends::mutual_friends_handler),
        )
        .route("/friends/status/:user_id", get(friends::status_handler))
        .route(
            "/friends/block/:user_id",
            post(friends::block_handler).delete(friends::unblock_handler),
        )
        .route(
            "/friends/:user_id",
            get(friends::user_friends_handler).delete(friends::unfriend_handler),
        )
        // Recipe posts
        .route("/posts", post(posts::create_post_handler))
        .route("/posts/:post_id", get(posts::get_post_handler))
        .route("/posts/:post_id/publish", put(posts::publish_post_handler))
        .route("/posts/:post_id/archive", put(posts::archive_post_handler))
        .route(
            "/posts/:post_id/unarchive",
            put(posts::unarchive_post_handler),
        )
        .route("/posts/user/:user_id", get(posts::user_posts_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware::require_auth,
        ));

    let app = Router::new()
        // Public routes
        .route("/auth/register", post(auth::register_handler))
        .route("/auth/login", post(auth::login_handler))
        // Protected routes
        .merge(protected_routes)
        .layer(CatchPanicLayer::new())
        .with_state(state);

    let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .expect("cannot parse host/port");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("cannot bind listener");

    let bound_addr = listener.local_addr().expect("no local addr");
    tracing::info!("server listening on http://{}", bound_addr);

    axum::serve(listener, app).await.expect("server error");
}
