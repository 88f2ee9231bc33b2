mod generate;
mod health;
mod metrics;
mod update;

pub use generate::{client_identifier, generate_handler};
pub use health::{health_handler, root_handler};
pub use metrics::metrics_handler;
pub use update::check_update_handler;
