//! Property tests for `[user@]host[:port]` targets

use proptest::prelude::*;
use rtop_core::config::AliasTable;
use rtop_core::target::{ResolveOptions, Target};

proptest! {
    /// Property: every valid target round-trips its parts
    #[test]
    fn parse_valid_targets(
        user in proptest::option::of("[a-z_][a-z0-9_-]{0,15}"),
        host in "[a-z][a-z0-9.-]{0,30}",
        port in proptest::option::of(1u16..=65535),
    ) {
        let mut text = String::new();
        if let Some(user) = &user {
            text.push_str(user);
            text.push('@');
        }
        text.push_str(&host);
        if let Some(port) = port {
            text.push_str(&format!(":{port}"));
        }

        let target: Target = text.parse().unwrap();
        prop_assert_eq!(target.user, user);
        prop_assert_eq!(target.host, host);
        prop_assert_eq!(target.port, port);
    }

    /// Property: ports outside 1..=65535 are rejected
    #[test]
    fn parse_rejects_out_of_range(host in "[a-z]{1,10}", port in 65536u32..10_000_000) {
        let too_big = format!("{host}:{port}");
        let zero = format!("{host}:0");
        prop_assert!(too_big.parse::<Target>().is_err());
        prop_assert!(zero.parse::<Target>().is_err());
    }

    /// Property: a port written in the target beats the alias table
    #[test]
    fn target_port_wins(host in "[a-z]{3,10}", target_port in 1u16..=65535, alias_port in 1u16..=65535) {
        let table = AliasTable::parse(&format!("Host {host}\n  Port {alias_port}\n"));
        let target: Target = format!("root@{host}:{target_port}").parse().unwrap();

        let resolved = target.resolve(&table, &ResolveOptions::default()).unwrap();
        prop_assert_eq!(resolved.port, target_port);
    }
}
