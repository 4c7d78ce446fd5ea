mod admin;
mod check_config;
mod room;

pub use admin::cmd_create_admin;
pub use check_config::cmd_check_config;
pub use room::{cmd_add_room, parse_price_cents};
