mod simulated_gateway;

pub use simulated_gateway::SimulatedNfseGateway;
