pub mod dispatcher;
pub mod gateway;

pub use dispatcher::ExecutionDispatcher;
pub use gateway::UnconfiguredGateway;
