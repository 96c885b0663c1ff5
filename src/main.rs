use std::env;
use std::net::SocketAddr;

use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    extract::{ConnectInfo, State},
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderName, HeaderValue, Method, StatusCode,
    },
    middleware,
    response::{Html, IntoResponse},
    routing::{get, post},
    Extension, Router,
};
use dotenvy::dotenv;
use sea_orm::Database;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use warden::auth::{optional_auth_middleware, AuthenticatedUser, JwtService};
use warden::graphql::{create_schema, ApiSchema, ClientIp, DataLoaderContext};
use warden::services::{
    AssignmentService, AuditService, CatalogService, IdentityService, UserAdminService,
};

#[derive(Clone)]
struct AppState {
    schema: ApiSchema,
    jwt_service: JwtService,
}

async fn graphql_handler(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Extension(user): Extension<Option<AuthenticatedUser>>,
    req: GraphQLRequest,
) -> GraphQLResponse {
    let mut request = req.into_inner();

    if let Some(user) = user {
        request = request.data(user);
    }

    // Peer address travels with the request so mutations can audit it
    request = request.data(ClientIp(addr.ip().to_string()));

    state.schema.execute(request).await.into()
}

async fn graphql_playground() -> impl IntoResponse {
    Html(
        r#"
    <!DOCTYPE html>
    <html>
    <head>
        <title>Warden GraphQL Playground</title>
        <link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/graphql-playground-react/build/static/css/index.css" />
    </head>
    <body>
        <div id="root"></div>
        <script src="https://cdn.jsdelivr.net/npm/graphql-playground-react/build/static/js/middleware.js"></script>
        <script>
            GraphQLPlayground.init(document.getElementById('root'), {
                endpoint: '/graphql'
            })
        </script>
    </body>
    </html>
    "#,
    )
}

async fn health() -> impl IntoResponse {
    "OK"
}

async fn graphql_schema(State(state): State<AppState>) -> impl IntoResponse {
    // Only expose schema in development environment
    let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "production".to_string());

    if environment != "development" {
        return (StatusCode::NOT_FOUND, "Schema not available in production").into_response();
    }

    let sdl = state.schema.sdl();

    ([(axum::http::header::CONTENT_TYPE, "application/graphql")], sdl).into_response()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warden=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Get configuration from environment
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
        warn!("JWT_SECRET not set, using default (not secure for production)");
        "default-secret-change-in-production".to_string()
    });
    let jwt_expiration_hours = env::var("JWT_EXPIRATION_HOURS")
        .unwrap_or_else(|_| "24".to_string())
        .parse::<i64>()
        .unwrap_or(24);
    let cors_origins = env::var("CORS_ALLOWED_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:3000,http://localhost:5173".to_string());
    let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = env::var("PORT").unwrap_or_else(|_| "8080".to_string());
    let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

    info!("🚀 Starting Warden in {} environment", environment);

    // Connect to database
    info!("Connecting to database...");
    let db = Database::connect(&database_url).await?;
    info!("Database connected successfully");

    // Initialize services
    let jwt_service = JwtService::new(&jwt_secret, jwt_expiration_hours);
    let identity_service = IdentityService::new(db.clone(), jwt_service.clone());
    let catalog_service = CatalogService::new(db.clone());
    let audit_service = AuditService::new(db.clone());
    let assignment_service = AssignmentService::new(
        db.clone(),
        identity_service.clone(),
        catalog_service.clone(),
    );
    let user_admin_service =
        UserAdminService::new(db, identity_service.clone(), audit_service.clone());

    // DataLoader context for batched role lookups
    let dataloader_context = DataLoaderContext::new(identity_service.clone());

    // Create GraphQL schema with the services attached
    let schema = create_schema(
        identity_service,
        catalog_service,
        assignment_service,
        user_admin_service,
        audit_service,
        dataloader_context,
    );

    // Application state
    let app_state = AppState {
        schema,
        jwt_service: jwt_service.clone(),
    };

    // Setup CORS
    let cors = if cors_origins.trim() == "*" {
        warn!("🚨 CORS set to accept ANY origin (*) - only use in development!");
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = cors_origins
            .split(',')
            .filter_map(|origin| origin.trim().parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::OPTIONS,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
            ])
            .allow_headers([
                CONTENT_TYPE,
                AUTHORIZATION,
                HeaderName::from_static("x-apollo-tracing"),
                HeaderName::from_static("apollo-require-preflight"),
                HeaderName::from_static("x-requested-with"),
            ])
            .allow_credentials(true)
    };

    // Create router
    let app = Router::new()
        .route("/graphql", post(graphql_handler))
        .route("/playground", get(graphql_playground))
        .route("/health", get(health))
        .route("/schema.graphql", get(graphql_schema))
        .layer(cors)
        .layer(middleware::from_fn_with_state(
            jwt_service,
            optional_auth_middleware,
        ))
        .with_state(app_state);

    // Start server
    let addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&addr).await?;

    info!("🚀 Server starting on http://{}", addr);
    info!(
        "📊 GraphQL Playground available at http://{}/playground",
        addr
    );
    info!("🏥 Health check available at http://{}/health", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
