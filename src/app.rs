use crate::{
    config::Config,
    error::Result,
    routes::{api_routes, not_found},
    services::{RecommendationService, RestaurantStore},
};
use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use std::net::TcpListener;
use tracing::info;

pub struct Application {
    port: u16,
    host: String,
    config: Config,
}

impl Application {
    /// Create a new application instance
    pub fn new(config: &Config) -> Self {
        Self {
            port: config.port,
            host: config.host.clone(),
            config: config.clone(),
        }
    }

    /// Build and run the server
    pub async fn run(&self) -> Result<()> {
        let bind_address = format!("{}:{}", self.host, self.port);
        let listener = TcpListener::bind(&bind_address)?;
        info!("Starting server at http://{}", bind_address);

        self.run_with_listener(listener).await
    }

    /// Run the server on an already bound listener
    pub async fn run_with_listener(&self, listener: TcpListener) -> Result<()> {
        let store = RestaurantStore::connect(&self.config.database_url).await?;
        store.init_schema().await?;
        let (restaurants, items) = store.counts().await?;
        info!("Store holds {} restaurants and {} menu items", restaurants, items);

        let recommendation_service =
            web::Data::new(RecommendationService::from_config(&self.config, store)?);

        HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header();

            App::new()
                .wrap(cors)
                .wrap(Logger::default())
                .app_data(recommendation_service.clone())
                .service(api_routes())
                .default_service(web::route().to(not_found))
        })
        .listen(listener)?
        .run()
        .await?;

        Ok(())
    }
}
