use crate::snapshot::{DeviceTypeStatus, Snapshot};
use std::collections::HashMap;

/// Numeric direction of a metric relative to the previous snapshot. Whether
/// "greater" is good or bad for a given metric is left to the report layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Improved,
    Worsened,
    Unchanged,
    NoBaseline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricTrends {
    pub total: Trend,
    pub busy: Trend,
    pub idle: Trend,
    pub offline: Trend,
    pub queue_depth: Trend,
}

impl MetricTrends {
    pub const NO_BASELINE: MetricTrends = MetricTrends {
        total: Trend::NoBaseline,
        busy: Trend::NoBaseline,
        idle: Trend::NoBaseline,
        offline: Trend::NoBaseline,
        queue_depth: Trend::NoBaseline,
    };
}

#[derive(Debug, Clone)]
pub struct Comparison {
    pub devices: HashMap<String, MetricTrends>,
    pub totals: MetricTrends,
}

pub fn compare(current: &Snapshot, previous: Option<&Snapshot>) -> Comparison {
    let Some(previous) = previous else {
        let devices = current
            .entries
            .iter()
            .map(|entry| (entry.name.clone(), MetricTrends::NO_BASELINE))
            .collect();
        return Comparison {
            devices,
            totals: MetricTrends::NO_BASELINE,
        };
    };

    let previous_by_name: HashMap<&str, &DeviceTypeStatus> = previous
        .entries
        .iter()
        .map(|entry| (entry.name.as_str(), entry))
        .collect();

    let devices = current
        .entries
        .iter()
        .map(|entry| {
            let trends = match previous_by_name.get(entry.name.as_str()) {
                Some(prev) => entry_trends(entry, prev),
                None => MetricTrends::NO_BASELINE,
            };
            (entry.name.clone(), trends)
        })
        .collect();

    Comparison {
        devices,
        totals: entry_trends(&sum_entries(current), &sum_entries(previous)),
    }
}

fn entry_trends(current: &DeviceTypeStatus, previous: &DeviceTypeStatus) -> MetricTrends {
    MetricTrends {
        total: direction(current.total, previous.total),
        busy: direction(current.busy, previous.busy),
        idle: direction(current.idle, previous.idle),
        offline: direction(current.offline, previous.offline),
        queue_depth: direction(current.queue_depth, previous.queue_depth),
    }
}

fn direction(current: u64, previous: u64) -> Trend {
    match current.cmp(&previous) {
        std::cmp::Ordering::Greater => Trend::Improved,
        std::cmp::Ordering::Less => Trend::Worsened,
        std::cmp::Ordering::Equal => Trend::Unchanged,
    }
}

pub fn sum_entries(snapshot: &Snapshot) -> DeviceTypeStatus {
    let mut totals = DeviceTypeStatus {
        name: "Totals".to_string(),
        total: 0,
        busy: 0,
        idle: 0,
        offline: 0,
        queue_depth: 0,
    };
    for entry in &snapshot.entries {
        totals.total += entry.total;
        totals.busy += entry.busy;
        totals.idle += entry.idle;
        totals.offline += entry.offline;
        totals.queue_depth += entry.queue_depth;
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, busy: u64, idle: u64, offline: u64, queue_depth: u64) -> DeviceTypeStatus {
        DeviceTypeStatus {
            name: name.to_string(),
            total: busy + idle + offline,
            busy,
            idle,
            offline,
            queue_depth,
        }
    }

    fn snapshot(entries: Vec<DeviceTypeStatus>) -> Snapshot {
        Snapshot {
            taken_at_unix: 0,
            entries,
        }
    }

    #[test]
    fn no_previous_snapshot_yields_no_baseline_everywhere() {
        let current = snapshot(vec![entry("rpi3", 4, 6, 0, 2), entry("juno", 1, 0, 2, 0)]);
        let result = compare(&current, None);

        assert_eq!(result.devices.len(), 2);
        for trends in result.devices.values() {
            assert_eq!(*trends, MetricTrends::NO_BASELINE);
        }
        assert_eq!(result.totals, MetricTrends::NO_BASELINE);
    }

    #[test]
    fn identical_snapshots_compare_unchanged_everywhere() {
        let current = snapshot(vec![entry("rpi3", 4, 6, 0, 2), entry("juno", 1, 0, 2, 3)]);
        let result = compare(&current, Some(&current));

        for trends in result.devices.values() {
            assert_eq!(trends.total, Trend::Unchanged);
            assert_eq!(trends.busy, Trend::Unchanged);
            assert_eq!(trends.idle, Trend::Unchanged);
            assert_eq!(trends.offline, Trend::Unchanged);
            assert_eq!(trends.queue_depth, Trend::Unchanged);
        }
        assert_eq!(result.totals.busy, Trend::Unchanged);
        assert_eq!(result.totals.queue_depth, Trend::Unchanged);
    }

    #[test]
    fn direction_is_numeric_only() {
        let previous = snapshot(vec![entry("rpi3", 4, 6, 0, 2)]);
        let current = snapshot(vec![entry("rpi3", 7, 3, 0, 0)]);
        let result = compare(&current, Some(&previous));

        let trends = result.devices.get("rpi3").expect("rpi3 must be compared");
        assert_eq!(trends.busy, Trend::Improved);
        assert_eq!(trends.idle, Trend::Worsened);
        // queue went 2 -> 0; numerically less, so Worsened even though fewer
        // queued jobs reads as good on the report.
        assert_eq!(trends.queue_depth, Trend::Worsened);
        assert_eq!(trends.total, Trend::Unchanged);
    }

    #[test]
    fn device_gone_from_current_is_omitted() {
        let previous = snapshot(vec![entry("rpi3", 4, 6, 0, 2), entry("juno", 1, 0, 2, 0)]);
        let current = snapshot(vec![entry("rpi3", 4, 6, 0, 2)]);
        let result = compare(&current, Some(&previous));

        assert_eq!(result.devices.len(), 1);
        assert!(!result.devices.contains_key("juno"));
    }

    #[test]
    fn device_new_in_current_has_no_baseline() {
        let previous = snapshot(vec![entry("rpi3", 4, 6, 0, 2)]);
        let current = snapshot(vec![entry("rpi3", 4, 6, 0, 2), entry("dragonboard", 0, 1, 0, 0)]);
        let result = compare(&current, Some(&previous));

        assert_eq!(
            *result.devices.get("dragonboard").expect("new device compared"),
            MetricTrends::NO_BASELINE
        );
        assert_eq!(result.devices.get("rpi3").expect("rpi3").busy, Trend::Unchanged);
    }

    #[test]
    fn totals_aggregate_independently_of_per_device_results() {
        // rpi3 busy drops, juno busy rises more; the aggregate goes up.
        let previous = snapshot(vec![entry("rpi3", 4, 6, 0, 0), entry("juno", 1, 2, 0, 0)]);
        let current = snapshot(vec![entry("rpi3", 2, 8, 0, 0), entry("juno", 5, 0, 0, 0)]);
        let result = compare(&current, Some(&previous));

        assert_eq!(result.devices.get("rpi3").expect("rpi3").busy, Trend::Worsened);
        assert_eq!(result.devices.get("juno").expect("juno").busy, Trend::Improved);
        assert_eq!(result.totals.busy, Trend::Improved);
        assert_eq!(result.totals.total, Trend::Improved);
    }
}
