/// Builds the grouped, ordered view of one window's tabs

use std::collections::HashMap;

use futures::future::join_all;
use log::{debug, error};

use crate::host::{HostError, TabHost};
use crate::operations::{order_groups, partition_tabs, sort_by_index};
use crate::tab_data::{Snapshot, Tab, TabGroup};

/// Groups the user has not toggled yet start collapsed.
pub const DEFAULT_COLLAPSED: bool = true;

/// Query the host for `window_id` and assemble a fresh snapshot.
///
/// Only the tab query can fail the build. A group whose metadata cannot be
/// fetched is logged and left out, together with its tabs.
pub async fn build_snapshot<H: TabHost + ?Sized>(
    host: &H,
    window_id: i32,
    collapsed: &HashMap<i32, bool>,
) -> Result<Snapshot, HostError> {
    let tabs: Vec<Tab> = host
        .query_tabs(window_id)
        .await?
        .into_iter()
        .filter_map(Tab::from_raw)
        .collect();

    let partition = partition_tabs(tabs);

    let lookups = partition.grouped.into_iter().map(|(group_id, mut members)| async move {
        match host.get_group(group_id).await {
            Ok(raw) => {
                sort_by_index(&mut members);
                let is_collapsed = collapsed.get(&group_id).copied().unwrap_or(DEFAULT_COLLAPSED);
                Some(TabGroup::from_raw(raw, is_collapsed, members))
            }
            Err(e) => {
                error!("Failed to get group {}: {}", group_id, e);
                None
            }
        }
    });

    let mut groups: Vec<TabGroup> = join_all(lookups).await.into_iter().flatten().collect();
    order_groups(&mut groups);

    let mut ungrouped = partition.ungrouped;
    sort_by_index(&mut ungrouped);

    debug!(
        "Snapshot for window {}: {} groups, {} ungrouped tabs",
        window_id,
        groups.len(),
        ungrouped.len()
    );

    Ok(Snapshot { groups, ungrouped })
}
