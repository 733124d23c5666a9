/// Tab operations: grouping and ordering

use crate::tab_data::{Tab, TabGroup};

/// Tabs split by group membership. Groups keep the order in which the host
/// first reported one of their members.
#[derive(Debug, Default, PartialEq)]
pub struct Partition {
    pub grouped: Vec<(i32, Vec<Tab>)>,
    pub ungrouped: Vec<Tab>,
}

/// Split tabs into per-group buckets and the ungrouped rest
pub fn partition_tabs(tabs: Vec<Tab>) -> Partition {
    let mut partition = Partition::default();

    for tab in tabs {
        match tab.group_id {
            Some(group_id) => {
                match partition.grouped.iter_mut().find(|(id, _)| *id == group_id) {
                    Some((_, members)) => members.push(tab),
                    None => partition.grouped.push((group_id, vec![tab])),
                }
            }
            None => partition.ungrouped.push(tab),
        }
    }

    partition
}

/// Sort tabs by position index (stable)
pub fn sort_by_index(tabs: &mut [Tab]) {
    tabs.sort_by_key(|tab| tab.index);
}

/// Sort groups by the index of their earliest tab (stable, so groups that
/// tie keep the host's order)
pub fn order_groups(groups: &mut [TabGroup]) {
    groups.sort_by_key(|group| group.lead_index());
}
