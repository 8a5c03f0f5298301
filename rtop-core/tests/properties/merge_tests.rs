//! Property tests for merging interface address and counter tables

use std::collections::{BTreeSet, HashMap};

use proptest::prelude::*;
use rtop_core::monitoring::{NetDevInfo, NetIpAddr, merge_net_interfaces};

fn addr_table() -> impl Strategy<Value = HashMap<String, NetIpAddr>> {
    prop::collection::hash_map(
        "[a-z]{2,5}[0-9]",
        ("10\\.0\\.[0-9]{1,3}\\.[0-9]{1,3}/24", "(fe80::[0-9a-f]{1,4}/64)?").prop_map(|(v4, v6)| {
            NetIpAddr { ipv4: v4, ipv6: v6 }
        }),
        0..8,
    )
}

fn dev_table() -> impl Strategy<Value = HashMap<String, NetDevInfo>> {
    prop::collection::hash_map(
        "[a-z]{2,5}[0-9]",
        (any::<u64>(), any::<u64>()).prop_map(|(rx, tx)| NetDevInfo { rx, tx }),
        0..8,
    )
}

proptest! {
    /// Property: the merged key set is exactly the address table's key set
    #[test]
    fn merged_keys_equal_address_keys(addrs in addr_table(), devs in dev_table()) {
        let merged = merge_net_interfaces(&addrs, &devs);

        let merged_keys: BTreeSet<_> = merged.keys().cloned().collect();
        let addr_keys: BTreeSet<_> = addrs.keys().cloned().collect();
        prop_assert_eq!(merged_keys, addr_keys);

        for name in devs.keys().filter(|k| !addrs.contains_key(*k)) {
            prop_assert!(!merged.contains_key(name));
        }
    }

    /// Property: counters are attached where present and zero otherwise
    #[test]
    fn merged_counters(addrs in addr_table(), devs in dev_table()) {
        let merged = merge_net_interfaces(&addrs, &devs);

        for (name, iface) in &merged {
            prop_assert_eq!(&iface.addr, &addrs[name]);
            let expected = devs.get(name).copied().unwrap_or_default();
            prop_assert_eq!(iface.dev, expected);
        }
    }
}
