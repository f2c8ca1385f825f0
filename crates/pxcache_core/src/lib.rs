pub mod master;
pub mod worker;

pub use master::Master;
pub use worker::{HandlerOutcome, ProxyHandler, Reply};
