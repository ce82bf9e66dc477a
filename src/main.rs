use std::io;
use std::sync::Arc;
use std::time::Duration;

use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;
use log::{error, info};

use shuttle_router::config::AppConfig;
use shuttle_router::services::osrm::HttpRoadService;
use shuttle_router::services::vrp_solver::SubprocessVrpSolver;
use shuttle_router::Orchestrator;

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("failed to load configuration: {}", e);
            return Err(io::Error::new(io::ErrorKind::Other, e));
        }
    };

    info!("starting shuttle-router on {}:{}", config.server.host, config.server.port);

    let road = Arc::new(HttpRoadService::new(config.osrm.clone()));
    let solver = Arc::new(SubprocessVrpSolver::new(
        config.solver.executable.clone(),
        config.solver.args.clone(),
        Duration::from_secs(config.solver.spawn_timeout_seconds),
    ));
    let orchestrator = Arc::new(Orchestrator::new(road, solver));

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(web::Data::new(orchestrator.clone()))
            .configure(shuttle_router::api::configure_routes)
    })
    .bind((config.server.host.clone(), config.server.port))?
    .workers(config.server.workers)
    .run()
    .await
}
