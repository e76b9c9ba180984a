//! HTTP surface: thin handlers over the service layer

mod debug;
mod health;
mod products;
mod submission;

pub use debug::debug_routes;
pub use health::health_routes;
pub use products::product_routes;
pub use submission::submission_routes;
