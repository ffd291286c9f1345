//! Container-name to client-name mapping for the secondary discovery signal.

/// Infrastructure containers irrelevant to devnet client analysis.
const EXCLUDED_CONTAINERS: &[&str] = &[
    "unknown",
    "cadvisor",
    "prometheus",
    "promtail",
    "node-exporter",
    "node_exporter",
    "grafana",
];

/// Map a workload container name to its client name.
///
/// Workload containers are named `<client>_<index>` (e.g. `lantern_0`);
/// anything without the suffix, or on the infrastructure list, is skipped.
pub fn extract_client_name(container: &str) -> Option<String> {
    if container.is_empty() || container == "POD" {
        return None;
    }
    if EXCLUDED_CONTAINERS.contains(&container) {
        return None;
    }
    let (client, _index) = container.rsplit_once('_')?;
    Some(client.to_string())
}
