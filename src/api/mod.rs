pub mod routes;

pub use routes::configure_routes;
