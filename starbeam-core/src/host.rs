//! Host metadata model.
//!
//! A [`HostRecord`] is an in-memory mirror of one discovered streaming
//! host. It is mutated in place as discovery and pairing results arrive,
//! and its changes are pushed back into the longer-lived [`PersistedHost`]
//! owned by the application's persistence layer. The record itself is a
//! transient, UI-facing projection and is never stored directly.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ── PairState ────────────────────────────────────────────────────

/// Pairing status of a host as last reported by the pairing flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PairState {
    /// Never queried, or the host has not answered yet.
    #[default]
    Unknown,
    /// The host answered and we are not paired.
    Unpaired,
    /// Pairing completed and the host accepts our certificate.
    Paired,
    /// The last pairing attempt was rejected (wrong PIN).
    Failed,
}

// ── AppEntry ─────────────────────────────────────────────────────

/// One remote application advertised by a host.
///
/// Ordered by name, then id, so an app set iterates in a stable order
/// suitable for direct display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppEntry {
    /// Host-assigned application identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Whether the host can stream this app in HDR.
    pub hdr_supported: bool,
}

impl Ord for AppEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name
            .cmp(&other.name)
            .then_with(|| self.id.cmp(&other.id))
            .then_with(|| self.hdr_supported.cmp(&other.hdr_supported))
    }
}

impl PartialOrd for AppEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// ── PersistedHost ────────────────────────────────────────────────

/// The canonical, durably-stored record for one host.
///
/// Owned by the application's persistence layer; this crate only writes
/// to it through [`HostRecord::propagate_to_parent`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedHost {
    /// Unique identifier — host identity is by uuid, never by address.
    pub uuid: String,
    /// Display name.
    pub name: String,
    /// Hardware (MAC) address, used for wake-on-LAN.
    pub mac: String,
    /// Preferred address.
    pub address: String,
    /// Address on the local network.
    pub local_address: String,
    /// Address reachable from outside the local network.
    pub external_address: String,
    /// Last known pairing state.
    pub pair_state: PairState,
    /// Applications advertised by the host.
    pub app_list: BTreeSet<AppEntry>,
}

// ── HostRecord ───────────────────────────────────────────────────

/// Mutable, comparably-ordered snapshot of one discovered host.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HostRecord {
    /// Unique identifier. Two records are the same host iff their
    /// uuids match; addresses may change across discovery events.
    pub uuid: String,
    /// Display name.
    pub name: String,
    /// Hardware (MAC) address.
    pub mac: String,
    /// Preferred address.
    pub address: String,
    /// Address on the local network.
    pub local_address: String,
    /// Address reachable from outside the local network.
    pub external_address: String,
    /// The address the host was last reached on, if any.
    pub active_address: Option<String>,
    /// Whether the host currently answers discovery.
    pub online: bool,
    /// Pairing state.
    pub pair_state: PairState,
    /// Applications advertised by the host.
    pub app_list: BTreeSet<AppEntry>,
}

impl HostRecord {
    /// Build the transient projection from a persisted record.
    ///
    /// Reachability (`online`, `active_address`) is runtime state and
    /// starts out pessimistic.
    pub fn from_parent(parent: &PersistedHost) -> Self {
        Self {
            uuid: parent.uuid.clone(),
            name: parent.name.clone(),
            mac: parent.mac.clone(),
            address: parent.address.clone(),
            local_address: parent.local_address.clone(),
            external_address: parent.external_address.clone(),
            active_address: None,
            online: false,
            pair_state: parent.pair_state,
            app_list: parent.app_list.clone(),
        }
    }

    /// Case-insensitive lexical comparison of display names, used to
    /// keep the host list sorted. Ties are broken by uuid so the order
    /// is total and stable across repeated sorts.
    pub fn compare_name(&self, other: &HostRecord) -> Ordering {
        let a = self.name.to_lowercase();
        let b = other.name.to_lowercase();
        a.cmp(&b).then_with(|| self.uuid.cmp(&other.uuid))
    }

    /// Copy every mutable field back onto the canonical persisted
    /// record and request exactly one save from the store.
    ///
    /// This is the only write path to durable storage from this entity.
    pub async fn propagate_to_parent(
        &self,
        parent: &mut PersistedHost,
        store: &dyn HostStore,
    ) -> Result<(), CoreError> {
        if self.uuid.is_empty() {
            return Err(CoreError::MissingUuid);
        }
        if !parent.uuid.is_empty() && parent.uuid != self.uuid {
            return Err(CoreError::UuidMismatch {
                record: self.uuid.clone(),
                parent: parent.uuid.clone(),
            });
        }

        parent.uuid = self.uuid.clone();
        parent.name = self.name.clone();
        parent.mac = self.mac.clone();
        parent.address = self.address.clone();
        parent.local_address = self.local_address.clone();
        parent.external_address = self.external_address.clone();
        parent.pair_state = self.pair_state;
        parent.app_list = self.app_list.clone();

        store.save(parent).await
    }
}

// ── HostStore ────────────────────────────────────────────────────

/// External persistence seam. The application's storage layer
/// implements this; the core only ever asks it to save.
#[async_trait]
pub trait HostStore: Send + Sync {
    /// Persist the given record, replacing any existing record with
    /// the same uuid.
    async fn save(&self, host: &PersistedHost) -> Result<(), CoreError>;
}

/// In-memory store used by tests and headless tooling.
#[derive(Debug, Default)]
pub struct MemoryHostStore {
    hosts: std::sync::Mutex<Vec<PersistedHost>>,
    save_count: std::sync::atomic::AtomicU64,
}

impl MemoryHostStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of save requests received since construction.
    pub fn save_count(&self) -> u64 {
        self.save_count.load(std::sync::atomic::Ordering::SeqCst)
    }

    /// Snapshot of all stored hosts.
    pub fn hosts(&self) -> Vec<PersistedHost> {
        self.hosts.lock().map(|h| h.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl HostStore for MemoryHostStore {
    async fn save(&self, host: &PersistedHost) -> Result<(), CoreError> {
        self.save_count
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        let mut hosts = self
            .hosts
            .lock()
            .map_err(|_| CoreError::Store("store mutex poisoned".into()))?;
        match hosts.iter_mut().find(|h| h.uuid == host.uuid) {
            Some(existing) => *existing = host.clone(),
            None => hosts.push(host.clone()),
        }
        Ok(())
    }
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn record(uuid: &str, name: &str) -> HostRecord {
        HostRecord {
            uuid: uuid.into(),
            name: name.into(),
            ..HostRecord::default()
        }
    }

    #[test]
    fn compare_name_is_case_insensitive() {
        let a = record("1", "alpha");
        let b = record("2", "ALPHA");
        // Same name modulo case — falls through to the uuid tiebreak.
        assert_eq!(a.compare_name(&b), Ordering::Less);
        assert_eq!(b.compare_name(&a), Ordering::Greater);

        let c = record("3", "beta");
        assert_eq!(a.compare_name(&c), Ordering::Less);
        assert_eq!(c.compare_name(&a), Ordering::Greater);
    }

    #[test]
    fn sort_by_compare_name_is_stable_across_repeats() {
        let mut hosts = vec![
            record("b", "Workstation"),
            record("a", "workstation"),
            record("c", "Laptop"),
            record("d", "desk"),
        ];
        hosts.sort_by(|x, y| x.compare_name(y));
        let first: Vec<String> = hosts.iter().map(|h| h.uuid.clone()).collect();

        hosts.sort_by(|x, y| x.compare_name(y));
        let second: Vec<String> = hosts.iter().map(|h| h.uuid.clone()).collect();

        assert_eq!(first, second);
        assert_eq!(first, vec!["d", "c", "a", "b"]);
    }

    proptest! {
        #[test]
        fn compare_name_is_antisymmetric(
            name_a in ".{0,24}", name_b in ".{0,24}",
            uuid_a in "[a-f0-9]{8}", uuid_b in "[a-f0-9]{8}",
        ) {
            let a = record(&uuid_a, &name_a);
            let b = record(&uuid_b, &name_b);
            prop_assert_eq!(a.compare_name(&b), b.compare_name(&a).reverse());
        }

        #[test]
        fn compare_name_is_total(
            name_a in ".{0,24}",
            uuid_a in "[a-f0-9]{8}", uuid_b in "[a-f0-9]{8}",
        ) {
            // Equal only when both name and uuid agree.
            let a = record(&uuid_a, &name_a);
            let b = record(&uuid_b, &name_a);
            if uuid_a == uuid_b {
                prop_assert_eq!(a.compare_name(&b), Ordering::Equal);
            } else {
                prop_assert_ne!(a.compare_name(&b), Ordering::Equal);
            }
        }
    }

    #[tokio::test]
    async fn propagate_writes_every_field_and_saves_once() {
        let store = MemoryHostStore::new();
        let mut parent = PersistedHost {
            uuid: "u-1".into(),
            ..PersistedHost::default()
        };

        let mut apps = BTreeSet::new();
        apps.insert(AppEntry {
            id: "100".into(),
            name: "Steam".into(),
            hdr_supported: true,
        });

        let rec = HostRecord {
            uuid: "u-1".into(),
            name: "Gaming PC".into(),
            mac: "aa:bb:cc:dd:ee:ff".into(),
            address: "10.0.0.5".into(),
            local_address: "10.0.0.5".into(),
            external_address: "203.0.113.9".into(),
            active_address: Some("10.0.0.5".into()),
            online: true,
            pair_state: PairState::Paired,
            app_list: apps.clone(),
        };

        rec.propagate_to_parent(&mut parent, &store).await.unwrap();

        assert_eq!(parent.name, "Gaming PC");
        assert_eq!(parent.mac, "aa:bb:cc:dd:ee:ff");
        assert_eq!(parent.address, "10.0.0.5");
        assert_eq!(parent.local_address, "10.0.0.5");
        assert_eq!(parent.external_address, "203.0.113.9");
        assert_eq!(parent.pair_state, PairState::Paired);
        assert_eq!(parent.app_list, apps);
        assert_eq!(store.save_count(), 1);

        // A second propagation issues a second save — one per call.
        rec.propagate_to_parent(&mut parent, &store).await.unwrap();
        assert_eq!(store.save_count(), 2);
        assert_eq!(store.hosts().len(), 1);
    }

    #[tokio::test]
    async fn propagate_rejects_uuid_mismatch() {
        let store = MemoryHostStore::new();
        let mut parent = PersistedHost {
            uuid: "u-other".into(),
            ..PersistedHost::default()
        };
        let rec = record("u-1", "Gaming PC");

        let err = rec.propagate_to_parent(&mut parent, &store).await;
        assert!(matches!(err, Err(CoreError::UuidMismatch { .. })));
        assert_eq!(store.save_count(), 0);
    }

    #[tokio::test]
    async fn propagate_rejects_missing_uuid() {
        let store = MemoryHostStore::new();
        let mut parent = PersistedHost::default();
        let rec = record("", "Nameless");

        let err = rec.propagate_to_parent(&mut parent, &store).await;
        assert!(matches!(err, Err(CoreError::MissingUuid)));
    }

    #[test]
    fn from_parent_resets_reachability() {
        let parent = PersistedHost {
            uuid: "u-1".into(),
            name: "Gaming PC".into(),
            pair_state: PairState::Paired,
            ..PersistedHost::default()
        };
        let rec = HostRecord::from_parent(&parent);
        assert!(!rec.online);
        assert_eq!(rec.active_address, None);
        assert_eq!(rec.pair_state, PairState::Paired);
        assert_eq!(rec.uuid, "u-1");
    }

    #[test]
    fn app_entries_order_by_name_then_id() {
        let mut set = BTreeSet::new();
        set.insert(AppEntry { id: "2".into(), name: "B".into(), hdr_supported: false });
        set.insert(AppEntry { id: "1".into(), name: "A".into(), hdr_supported: false });
        set.insert(AppEntry { id: "0".into(), name: "B".into(), hdr_supported: true });

        let names: Vec<(String, String)> =
            set.iter().map(|a| (a.name.clone(), a.id.clone())).collect();
        assert_eq!(
            names,
            vec![
                ("A".to_string(), "1".to_string()),
                ("B".to_string(), "0".to_string()),
                ("B".to_string(), "2".to_string()),
            ]
        );
    }
}
