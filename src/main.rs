use std::{env, io::Result};

use actix_governor::{Governor, GovernorConfigBuilder};
use actix_web::{App, HttpServer};
use dotenv::dotenv;
use tracing::info;
use tracing_subscriber::EnvFilter;

use dlx_sudoku_be::controller;

#[actix_web::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mode = env::var("MODE").unwrap_or_else(|_| "testing".to_owned());
    let host = if mode == "prod" {
        "0.0.0.0"
    } else {
        "127.0.0.1"
    };
    let port = env::var("PORT")
        .unwrap_or_else(|_| "8080".to_owned())
        .parse::<u16>()
        .expect("Failed to parse the host port number");

    info!(host, port, "starting a listener");

    let governor_conf = GovernorConfigBuilder::default()
        .per_second(2)
        .burst_size(5)
        .finish()
        .expect("Failed to build the rate limiter configuration");

    // Only panics if no socket addresses were successfully bound or if no Tokio runtime is set up
    HttpServer::new(move || {
        App::new()
            .wrap(Governor::new(&governor_conf))
            .service(controller::solve)
    })
    .bind((host, port))?
    .run()
    .await
}
