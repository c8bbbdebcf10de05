#![deny(missing_docs)]

//! # Apidriven Web Binary
//!
//! Entry point for the Actix Web server.

use actix_web::{App, HttpServer};
use apidriven_core::RoutesConfig;
use apidriven_web::UsersService;
use std::net::TcpListener;
use tracing_subscriber::EnvFilter;

fn build_server(listener: TcpListener, service: UsersService) -> std::io::Result<actix_web::dev::Server> {
    Ok(HttpServer::new(move || {
        let service = service.clone();
        App::new().configure(move |cfg| service.configure(cfg))
    })
    .listen(listener)?
    .run())
}

fn resolve_bind_addr() -> String {
    std::env::var("APIDRIVEN_WEB_BIND").unwrap_or_else(|_| "127.0.0.1:8080".to_string())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    init_tracing();

    let service = UsersService::new(RoutesConfig::default())
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()))?;

    let bind_addr = resolve_bind_addr();
    let listener = TcpListener::bind(&bind_addr)?;
    tracing::info!(addr = %bind_addr, "listening");
    let server = build_server(listener, service)?;

    if std::env::var("APIDRIVEN_WEB_ONESHOT").is_ok() {
        server.handle().stop(true).await;
    }

    server.await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_main_oneshot() {
        std::env::set_var("APIDRIVEN_WEB_BIND", "127.0.0.1:0");
        std::env::set_var("APIDRIVEN_WEB_ONESHOT", "1");

        let res = main();

        std::env::remove_var("APIDRIVEN_WEB_BIND");
        std::env::remove_var("APIDRIVEN_WEB_ONESHOT");

        assert!(res.is_ok());
    }

    #[actix_web::test]
    async fn test_build_server_start_stop() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let service = UsersService::new(RoutesConfig::default()).unwrap();
        let server = build_server(listener, service).unwrap();
        let handle = server.handle();
        actix_web::rt::spawn(server);
        handle.stop(true).await;
    }
}
