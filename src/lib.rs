//
// rctl_exporter
//
// An exporter for Prometheus, exporting resource usage of processes, users,
// jails and login classes as reported by rctl(8).
//
pub mod errors;
pub mod exporter;
pub mod httpd;
pub mod preflight;
pub mod rctl;
pub mod rctlstate;

pub use errors::ExporterError;
pub use exporter::Exporter;
