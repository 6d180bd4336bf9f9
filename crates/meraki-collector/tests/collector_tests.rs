//! End-to-end collection tests against in-memory source and push services.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use meraki_collector::push::PushService;
use meraki_collector::resource::{
    self, ConfigurationChange, Device, DeviceClient, Network, Organization,
};
use meraki_collector::source::{DashboardApi, TopologyLinkLayerResponse};
use meraki_collector::{CollectError, ColumnValue, Collector, Record, Result, SyncType, Table};
use serde_json::json;
use tokio::sync::watch;

const ALL_TABLES: [&str; 6] = [
    "meraki_organizations",
    "meraki_networks",
    "meraki_configuration_changes",
    "meraki_devices",
    "meraki_topology_link_layers",
    "meraki_device_client",
];

fn org(id: &str, name: &str) -> Organization {
    serde_json::from_value(json!({
        "id": id,
        "name": name,
        "url": format!("https://dashboard.meraki.com/o/{id}"),
    }))
    .unwrap()
}

fn network(id: &str, organization_id: &str) -> Network {
    serde_json::from_value(json!({
        "id": id,
        "organizationId": organization_id,
        "name": format!("net {id}"),
        "productTypes": ["switch", "wireless"],
        "timeZone": "America/Los_Angeles",
    }))
    .unwrap()
}

fn device(serial: &str, network_id: &str) -> Device {
    serde_json::from_value(json!({
        "serial": serial,
        "name": format!("sw-{serial}"),
        "mac": "00:18:0a:aa:bb:01",
        "networkId": network_id,
        "model": "MS120-8",
        "lanIp": "10.0.0.2",
        "lat": 47.6062,
        "lng": -122.3321,
    }))
    .unwrap()
}

fn client(id: &str) -> DeviceClient {
    serde_json::from_value(json!({
        "id": id,
        "description": "printer",
        "mac": "f4:5c:89:11:22:33",
        "ip": "10.0.0.31",
        "vlan": 20,
    }))
    .unwrap()
}

fn change() -> ConfigurationChange {
    serde_json::from_value(json!({
        "ts": "2024-06-01T08:30:00Z",
        "adminName": "Root Admin",
        "page": "Switch settings",
        "label": "RADIUS secret",
    }))
    .unwrap()
}

/// Two organizations; only the first has networks. Network n1 has two
/// devices, n2 none; device d1 has two clients, d2 none.
#[derive(Default)]
struct MockApi {
    fail_clients_for: Option<String>,
}

#[async_trait]
impl DashboardApi for MockApi {
    async fn organizations(&self) -> Result<Vec<Organization>> {
        Ok(vec![org("o1", "Acme East"), org("o2", "Acme West")])
    }

    async fn organization_networks(&self, organization_id: &str) -> Result<Vec<Network>> {
        Ok(match organization_id {
            "o1" => vec![network("n1", "o1"), network("n2", "o1")],
            _ => Vec::new(),
        })
    }

    async fn organization_configuration_changes(
        &self,
        organization_id: &str,
    ) -> Result<Vec<ConfigurationChange>> {
        Ok(match organization_id {
            "o1" => vec![change()],
            _ => Vec::new(),
        })
    }

    async fn network_devices(&self, network_id: &str) -> Result<Vec<Device>> {
        Ok(match network_id {
            "n1" => vec![device("d1", "n1"), device("d2", "n1")],
            _ => Vec::new(),
        })
    }

    async fn network_topology_link_layer(
        &self,
        network_id: &str,
    ) -> Result<TopologyLinkLayerResponse> {
        let _ = network_id;
        Ok(TopologyLinkLayerResponse {
            errors: Vec::new(),
            links: Some(json!([])),
            nodes: Some(json!([])),
        })
    }

    async fn device_clients(&self, serial: &str) -> Result<Vec<DeviceClient>> {
        if self.fail_clients_for.as_deref() == Some(serial) {
            return Err(CollectError::Source(format!(
                "500 from clients endpoint for {serial}"
            )));
        }
        Ok(match serial {
            "d1" => vec![client("c1"), client("c2")],
            _ => Vec::new(),
        })
    }
}

#[derive(Default)]
struct PushCalls {
    get_table: Vec<String>,
    create_table: Vec<String>,
    upserts: Vec<Vec<Record>>,
}

#[derive(Default)]
struct RecordingPush {
    existing: HashSet<String>,
    calls: Mutex<PushCalls>,
}

impl RecordingPush {
    fn with_existing(names: &[&str]) -> Self {
        Self {
            existing: names.iter().map(|n| n.to_string()).collect(),
            ..Self::default()
        }
    }
}

#[async_trait]
impl PushService for RecordingPush {
    async fn get_table(&self, name: &str) -> Result<Option<Table>> {
        self.calls.lock().unwrap().get_table.push(name.to_string());
        Ok(self.existing.contains(name).then(|| Table {
            name: name.to_string(),
            sync_type: SyncType::Append,
            columns: Vec::new(),
        }))
    }

    async fn create_table(&self, table: &Table) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .create_table
            .push(table.name.clone());
        Ok(())
    }

    async fn upsert_records(&self, records: &[Record]) -> Result<()> {
        self.calls.lock().unwrap().upserts.push(records.to_vec());
        Ok(())
    }
}

async fn run_collection(
    api: MockApi,
    push: Arc<RecordingPush>,
    dry_run: bool,
    cancelled: bool,
) -> Result<()> {
    let (_cancel_tx, cancel) = watch::channel(cancelled);
    let mut collector = Collector::new(Arc::new(api), push).with_dry_run(dry_run);
    collector.collect(&resource::organizations(), cancel).await
}

#[tokio::test]
async fn test_full_run_upserts_every_node_invocation() {
    let push = Arc::new(RecordingPush::default());
    run_collection(MockApi::default(), push.clone(), false, false)
        .await
        .unwrap();

    let calls = push.calls.lock().unwrap();

    // Each distinct table is checked and created exactly once.
    let expected: HashSet<&str> = ALL_TABLES.into_iter().collect();
    assert_eq!(calls.get_table.len(), expected.len());
    let checked: HashSet<&str> = calls.get_table.iter().map(String::as_str).collect();
    assert_eq!(checked, expected);
    let created: HashSet<&str> = calls.create_table.iter().map(String::as_str).collect();
    assert_eq!(created, expected);

    // One upsert per node invocation, including invocations whose listing
    // was empty: 1 organizations + per-o1 (networks, changes) + per-o2
    // (networks, changes) + per-n1 (devices, topology) + per-n2 (devices,
    // topology) + per-d1 clients + per-d2 clients.
    assert_eq!(calls.upserts.len(), 11);

    // 2 orgs + 2 networks + 1 change + 2 devices + 2 topology snapshots
    // + 2 clients.
    let total_records: usize = calls.upserts.iter().map(Vec::len).sum();
    assert_eq!(total_records, 11);

    let empty_batches = calls.upserts.iter().filter(|b| b.is_empty()).count();
    assert_eq!(empty_batches, 4);

    // Depth-first: the deepest node finishes first, the root last.
    let first = &calls.upserts[0];
    assert_eq!(first.len(), 2);
    assert_eq!(first[0].table_name, "meraki_device_client");

    let last = calls.upserts.last().unwrap();
    assert_eq!(last.len(), 2);
    assert_eq!(last[0].table_name, "meraki_organizations");
    assert_eq!(last[0].columns[0], ColumnValue::Text("o1".to_string()));
    assert_eq!(last[1].columns[0], ColumnValue::Text("o2".to_string()));
}

#[tokio::test]
async fn test_existing_tables_are_not_recreated() {
    let push = Arc::new(RecordingPush::with_existing(&ALL_TABLES));
    run_collection(MockApi::default(), push.clone(), false, false)
        .await
        .unwrap();

    let calls = push.calls.lock().unwrap();
    assert_eq!(calls.get_table.len(), ALL_TABLES.len());
    assert!(calls.create_table.is_empty());
    assert_eq!(calls.upserts.len(), 11);
}

#[tokio::test]
async fn test_resolver_error_aborts_before_any_upsert() {
    let api = MockApi {
        fail_clients_for: Some("d1".to_string()),
    };
    let push = Arc::new(RecordingPush::default());
    let err = run_collection(api, push.clone(), false, false)
        .await
        .unwrap_err();

    match err {
        CollectError::Resolve { table, .. } => assert_eq!(table, "meraki_device_client"),
        other => panic!("expected resolve error, got {other:?}"),
    }

    // d1's clients node is the first to reach its upsert; the failure there
    // means every buffered ancestor batch is discarded with the run.
    let calls = push.calls.lock().unwrap();
    assert!(calls.upserts.is_empty());
}

#[tokio::test]
async fn test_dry_run_suppresses_destination_writes() {
    let push = Arc::new(RecordingPush::default());
    run_collection(MockApi::default(), push.clone(), true, false)
        .await
        .unwrap();

    let calls = push.calls.lock().unwrap();
    assert_eq!(calls.get_table.len(), ALL_TABLES.len());
    assert!(calls.create_table.is_empty());
    assert!(calls.upserts.is_empty());
}

#[tokio::test]
async fn test_cancellation_stops_the_run() {
    let push = Arc::new(RecordingPush::default());
    let err = run_collection(MockApi::default(), push.clone(), false, true)
        .await
        .unwrap_err();

    assert!(matches!(err, CollectError::Cancelled));

    let calls = push.calls.lock().unwrap();
    assert!(calls.get_table.is_empty());
    assert!(calls.upserts.is_empty());
}
