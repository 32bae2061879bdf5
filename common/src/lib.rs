pub mod common_env;
pub mod consts;
pub mod graceful;
pub mod logging;
