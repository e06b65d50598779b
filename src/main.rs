mod models;
mod service;
mod config;
mod dtos;
mod error;
mod db;
mod utils;
mod middleware;
mod mail;
mod handler;
mod routes;

use std::sync::Arc;

use axum::http::{header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE}, HeaderValue, Method};
use config::Config;
use crate::db::db::DBClient;
use dotenv::dotenv;
use routes::create_router;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing_subscriber::filter::LevelFilter;

use service::{
    effects::EffectDispatcher,
    goal_service::GoalService,
    job_service::JobService,
    matching_service::MatchingService,
    notification_service::NotificationService,
    payment_provider::PaymentGatewayService,
    payment_service::PaymentService,
};

#[derive(Debug, Clone)]
pub struct AppState {
    pub env: Config,
    pub db_client: Arc<DBClient>,
    // Services
    pub job_service: Arc<JobService>,
    pub matching_service: Arc<MatchingService>,
    pub payment_service: Arc<PaymentService>,
    pub payment_gateway: Arc<PaymentGatewayService>,
    pub notification_service: Arc<NotificationService>,
    pub goal_service: Arc<GoalService>,
}

impl AppState {
    pub fn new(db_client: DBClient, config: Config) -> Self {
        let db_client_arc = Arc::new(db_client);

        let notification_service = Arc::new(NotificationService::new(
            db_client_arc.clone(),
            config.clone(),
        ));
        let goal_service = Arc::new(GoalService::new(db_client_arc.clone()));
        let effects = Arc::new(EffectDispatcher::new(
            notification_service.clone(),
            goal_service.clone(),
        ));

        let matching_service = Arc::new(MatchingService::new(db_client_arc.clone()));
        let job_service = Arc::new(JobService::new(db_client_arc.clone(), effects.clone()));

        let payment_gateway = Arc::new(PaymentGatewayService::new(&config));
        let payment_service = Arc::new(PaymentService::new(
            db_client_arc.clone(),
            payment_gateway.clone(),
            job_service.clone(),
            effects,
        ));

        Self {
            env: config,
            db_client: db_client_arc,
            job_service,
            matching_service,
            payment_service,
            payment_gateway,
            notification_service,
            goal_service,
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::DEBUG)
        .init();

    dotenv().ok();

    let config = Config::init();

    let pool = match PgPoolOptions::new()
        .max_connections(20)
        .min_connections(5)
        .connect(&config.database_url)
        .await
    {
        Ok(pool) => {
            println!("✅ Connection to the database is successful!");
            pool
        }
        Err(err) => {
            println!("🔥 Failed to connect to the database: {:?}", err);
            std::process::exit(1);
        }
    };

    let db_client = DBClient::new(pool);

    let allowed_origins = vec![
        "https://hanapbuhay.ph".parse::<HeaderValue>().unwrap(),
        "http://localhost:5173".parse::<HeaderValue>().unwrap(),
        "http://localhost:8000".parse::<HeaderValue>().unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE])
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::PATCH]);

    let app_state = Arc::new(AppState::new(db_client, config.clone()));

    let app = create_router(app_state.clone()).layer(cors);

    println!("🚀 Server is running on http://localhost:{}", config.port);

    // Catches gateway settlements whose webhook never arrived.
    let app_state_clone = app_state.clone();
    tokio::spawn(async move {
        service::background_jobs::start_payment_reconciliation_job(app_state_clone).await;
    });

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", &config.port))
        .await
        .unwrap();

    axum::serve(listener, app).await.unwrap();
}
