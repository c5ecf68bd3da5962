mod emission_worker;

pub use emission_worker::EmissionWorker;
