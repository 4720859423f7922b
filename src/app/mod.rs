// Application layer: wires configuration, adapters and the report engine together.

pub mod report;

pub use report::run_report;
