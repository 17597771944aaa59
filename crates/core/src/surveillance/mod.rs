pub mod domain;
pub mod infrastructure;
pub mod session;
pub mod surveillance_logger;
