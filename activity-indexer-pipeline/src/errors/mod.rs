mod consumer;
mod enrichment;
mod orchestrator;

pub use consumer::ConsumerError;
pub use enrichment::FetcherError;
pub use orchestrator::OrchestratorError;
