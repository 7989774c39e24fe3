pub mod config;
pub mod error;
pub mod node;
pub mod operator;

pub use config::Config;
pub use error::*;
pub use node::*;
pub use operator::*;
