use actix_web::{
    HttpServer,
    dev::Server,
    middleware::Logger,
    web::{self, Data},
};
use anyhow::Context;
use std::{net::TcpListener, sync::Arc};
use weather_core::{Config, config::ServerConfig, provider_from_config, store_from_config};

use crate::{AppState, routes};

pub struct App {
    server: Server,
    port: u16,
}

impl App {
    /// Construct the provider and storage backend from `config` and bind the listener.
    pub fn build(config: &Config) -> anyhow::Result<Self> {
        let provider = provider_from_config(config).context("Failed to build upstream client")?;
        let store = store_from_config(&config.storage).context("Failed to open storage backend")?;

        Self::with_state(&config.server, AppState::new(Arc::new(provider), store))
    }

    /// Bind the listener for an already-assembled state. Port 0 picks a free port.
    pub fn with_state(config: &ServerConfig, state: AppState) -> anyhow::Result<Self> {
        let address = config.listener_address();
        let listener =
            TcpListener::bind(&address).with_context(|| format!("Failed to bind {address}"))?;
        let port = listener.local_addr()?.port();

        let server = create_server(state, listener, config.workers)?;

        Ok(App { server, port })
    }

    pub async fn run(self) -> Result<(), std::io::Error> {
        self.server.await
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

fn create_server(
    state: AppState,
    listener: TcpListener,
    workers: Option<usize>,
) -> Result<Server, std::io::Error> {
    let state = Data::new(state);

    let mut server = HttpServer::new(move || {
        actix_web::App::new()
            .app_data(state.clone())
            .wrap(Logger::default())
            .service(
                web::resource("/store-weather-data")
                    .route(web::post().to(routes::store_weather_data))
                    .default_service(web::to(routes::method_not_allowed)),
            )
            .service(
                web::resource("/list-weather-files")
                    .route(web::get().to(routes::list_weather_files))
                    .route(web::head().to(routes::list_weather_files))
                    .default_service(web::to(routes::method_not_allowed)),
            )
            .service(
                web::resource("/weather-file-content/{filename}")
                    .route(web::get().to(routes::weather_file_content))
                    .route(web::head().to(routes::weather_file_content))
                    .default_service(web::to(routes::method_not_allowed)),
            )
            .service(
                web::resource("/health")
                    .route(web::get().to(routes::health))
                    .route(web::head().to(routes::health))
                    .default_service(web::to(routes::method_not_allowed)),
            )
            .default_service(web::to(routes::not_found))
    })
    .listen(listener)?;

    if let Some(workers) = workers {
        server = server.workers(workers);
    }

    Ok(server.run())
}
