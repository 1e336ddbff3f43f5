use crate::farm::RawDeviceType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceTypeStatus {
    pub name: String,
    pub total: u64,
    pub busy: u64,
    pub idle: u64,
    pub offline: u64,
    pub queue_depth: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub taken_at_unix: i64,
    pub entries: Vec<DeviceTypeStatus>,
}

// total is always recomputed from the three state counts; some scheduler
// versions report a stale total of their own and it is never trusted.
pub fn build(
    inventory: &[RawDeviceType],
    queue_depths: &HashMap<String, u64>,
    taken_at_unix: i64,
) -> Snapshot {
    let entries = inventory
        .iter()
        .map(|raw| DeviceTypeStatus {
            name: raw.name.clone(),
            total: raw.busy + raw.idle + raw.offline,
            busy: raw.busy,
            idle: raw.idle,
            offline: raw.offline,
            queue_depth: queue_depths.get(&raw.name).copied().unwrap_or(0),
        })
        .collect();

    Snapshot {
        taken_at_unix,
        entries,
    }
}
