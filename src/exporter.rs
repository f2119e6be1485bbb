//! Exposes the resource snapshot as Prometheus metrics.
//!
//! Every scrape refreshes the [`ResourceManager`] and renders one gauge per
//! raw accounting key of every record, named `rctl_usage_<subject>_<key>`
//! and labelled with the record's identity. `rctl_up` tells whether that
//! refresh worked; when it didn't the last good snapshot is served.
#![forbid(unsafe_code)]
use crate::errors::ExporterError;
use crate::httpd::{
    Collector,
    HttpdError,
};
use crate::rctl::{
    Identity,
    Resource,
    ResourceManager,
    Subject,
};
use parking_lot::Mutex;
use prometheus_client::collector::Collector as MetricsCollector;
use prometheus_client::encoding::text::encode;
use prometheus_client::encoding::{
    DescriptorEncoder,
    EncodeMetric,
};
use prometheus_client::metrics::MetricType;
use prometheus_client::metrics::gauge::{
    ConstGauge,
    Gauge,
};
use prometheus_client::metrics::info::Info;
use prometheus_client::registry::Registry;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{
    debug,
    warn,
};

/// Label name and value pairs identifying one record.
type Labels = Vec<(String, String)>;

/// Series grouped into families by subject and accounting key.
type Families = BTreeMap<(Subject, String), BTreeMap<Labels, f64>>;

/// Holds the registry and the manager feeding it.
#[derive(Debug)]
pub struct Exporter {
    registry: Registry,
    manager:  Arc<Mutex<ResourceManager>>,

    // Held for a whole scrape so refresh and encoding happen as one.
    scrape: Mutex<()>,

    // Metrics this library generates
    up: Gauge,
}

impl Exporter {
    /// Return a new Exporter around the given manager.
    pub fn new(manager: ResourceManager) -> Self {
        let mut registry = Registry::default();
        let manager = Arc::new(Mutex::new(manager));

        let up = Gauge::default();
        registry.register(
            "rctl_up",
            "Whether the last refresh of rctl resources was successful",
            up.clone(),
        );

        let build_info = Info::new(vec![
            ("rustc_version".to_owned(), env!("RUSTC_VERSION").to_owned()),
            ("version".to_owned(), env!("CARGO_PKG_VERSION").to_owned()),
        ]);
        registry.register(
            "rctl_exporter_build",
            "A metric with a constant '1' value labelled by version from \
             which rctl_exporter was built",
            build_info,
        );

        registry.register_collector(Box::new(ResourceCollector {
            manager: Arc::clone(&manager),
        }));

        Self {
            registry,
            manager,
            scrape: Mutex::new(()),
            up,
        }
    }

    /// Refreshes the resources and renders the registry in the OpenMetrics
    /// text format.
    ///
    /// A failed refresh is not an error here. It sets `rctl_up` to 0 and the
    /// previous snapshot is rendered.
    pub fn export(&self) -> Result<String, ExporterError> {
        let _scrape = self.scrape.lock();

        let refreshed = self.manager.lock().refresh();

        match refreshed {
            Ok(()) => {
                self.up.set(1);
            },
            Err(e) => {
                warn!("Failed to refresh rctl resources: {e}");
                self.up.set(0);
            },
        }

        let mut buffer = String::new();
        encode(&mut buffer, &self.registry)?;

        Ok(buffer)
    }
}

/// Implements the Collector trait used by the HTTPd component.
impl Collector for Exporter {
    fn collect(&self) -> Result<Vec<u8>, HttpdError> {
        self.export()
            .map(String::into_bytes)
            .map_err(|e| HttpdError::CollectorError(e.to_string()))
    }
}

// Renders the manager's snapshot when the registry is encoded.
#[derive(Debug)]
struct ResourceCollector {
    manager: Arc<Mutex<ResourceManager>>,
}

impl MetricsCollector for ResourceCollector {
    fn encode(&self, mut encoder: DescriptorEncoder) -> Result<(), fmt::Error> {
        let families = families(self.manager.lock().resources());

        for ((subject, key), series) in &families {
            let name = format!("rctl_usage_{subject}_{key}");
            let help = format!("{key} used per {subject}, see rctl(8)");

            let mut family_encoder = encoder.encode_descriptor(
                &name,
                &help,
                None,
                MetricType::Gauge,
            )?;

            for (labels, value) in series {
                let gauge = ConstGauge::new(*value);
                gauge.encode(family_encoder.encode_family(labels)?)?;
            }
        }

        Ok(())
    }
}

// Groups every raw key=value of every record into families. A record picked
// up by more than one rule only shows up once.
fn families(resources: &[Resource]) -> Families {
    let mut families = Families::new();

    for resource in resources {
        let labels = labels(resource.identity());

        for (key, value) in raw_series(resource.raw()) {
            families
                .entry((resource.subject(), key.to_owned()))
                .or_default()
                .entry(labels.clone())
                .or_insert(value);
        }
    }

    debug!("Rendering {} metric families", families.len());

    families
}

// Yields the numeric key=value pairs of a raw accounting string, stopping
// at the first malformed segment like the record parser does.
fn raw_series(raw: &str) -> impl Iterator<Item = (&str, f64)> {
    raw.split(',')
        .map_while(|segment| segment.split_once('='))
        .filter(|(key, _)| is_valid_key(key))
        .filter_map(|(key, value)| {
            value.parse::<f64>().ok().map(|value| (key, value))
        })
}

// Keys end up in metric names.
fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn labels(identity: &Identity) -> Labels {
    let labels: Vec<(&str, String)> = match identity {
        Identity::Process { pid, ppid, exe, cmdline } => vec![
            ("pid", pid.to_string()),
            ("ppid", ppid.map(|ppid| ppid.to_string()).unwrap_or_default()),
            ("exe", exe.clone()),
            ("cmdline", cmdline.clone()),
        ],
        Identity::User { uid, name } => vec![
            ("uid", uid.to_string()),
            ("user", name.clone()),
        ],
        Identity::Jail { jid, name } => vec![
            ("jid", jid.to_string()),
            ("name", name.clone()),
        ],
        Identity::LoginClass { name } => vec![
            ("class", name.clone()),
        ],
    };

    labels.into_iter()
        .map(|(name, value)| (name.to_owned(), value))
        .collect()
}
