//! Data models: remote configuration, server catalogue entries, ranking
//! stages and final results

pub mod config;
pub mod results;
pub mod server;

pub use config::{ClientInfo, Configuration};
pub use results::{Results, ServerReport};
pub use server::{ProbedServer, RankedServer, Server};
