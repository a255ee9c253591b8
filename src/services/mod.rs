pub mod enrichment;
pub mod weeklys_service;
