//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::net::IpAddr;
use std::sync::Arc;

use switch_rib::af::Ipv4;
use switch_rib::error::Error;
use switch_rib::interface::{Interface, InterfaceMap};
use switch_rib::nexthop::{ClientId, MultiClientNextHops, NextHop, NextHopSet};
use switch_rib::route::Route;
use switch_rib::table::{RouteEntry, RouteTableMap};
use switch_rib::updater::RouteUpdater;

const CLIENT_A: ClientId = ClientId(1001);
const CLIENT_B: ClientId = ClientId(1002);
const CLIENT_C: ClientId = ClientId(1003);

fn numbered_nexthops(n: u32, prefix: &str) -> NextHopSet {
    (0..n)
        .map(|i| {
            let addr = format!("{}{}", prefix, i + 10);
            NextHop::from(addr.parse::<IpAddr>().unwrap())
        })
        .collect()
}

#[test]
fn serialize_multi_client_nexthops() {
    let mut nhm = MultiClientNextHops::default();
    nhm.update(CLIENT_A, numbered_nexthops(3, "1.1.1.")).unwrap();
    nhm.update(CLIENT_B, numbered_nexthops(1, "2.2.2.")).unwrap();
    nhm.update(CLIENT_C, numbered_nexthops(4, "3.3.3.")).unwrap();

    let encoded = serde_json::to_value(&nhm).unwrap();
    // Clients come out as an ordered list, highest priority first.
    assert_eq!(1001, encoded[0]["clientId"]);
    assert_eq!("1.1.1.10", encoded[0]["nexthops"][0]["ip"]);
    assert!(encoded[0]["nexthops"][0].get("ifName").is_none());

    let decoded: MultiClientNextHops =
        serde_json::from_value(encoded).unwrap();
    assert_eq!(nhm, decoded);
}

#[test]
fn serialize_route() {
    let mut route: Route<Ipv4> = Route::new("1.2.3.4/32".parse().unwrap());
    let nexthops: NextHopSet = ["10.10.10.10", "11.11.11.11"]
        .iter()
        .map(|addr| NextHop::from(addr.parse::<IpAddr>().unwrap()))
        .collect();
    route.update(CLIENT_A, nexthops.clone()).unwrap();

    let encoded = serde_json::to_string(&route).unwrap();
    let decoded: Route<Ipv4> = serde_json::from_str(&encoded).unwrap();
    assert!(decoded.is_same(CLIENT_A, &nexthops));
    assert_eq!(route, decoded);
}

#[test]
fn serialize_scoped_nexthop() {
    let nexthop =
        NextHop::new("fe80::1".parse().unwrap(), Some(4)).unwrap();
    let encoded = serde_json::to_value(nexthop).unwrap();
    assert_eq!("fe80::1", encoded["ip"]);
    assert_eq!(4, encoded["ifName"]);

    let decoded: NextHop = serde_json::from_value(encoded).unwrap();
    assert_eq!(nexthop, decoded);
}

#[test]
fn nexthop_scope_constraints() {
    // Global addresses never carry a scope.
    assert!(NextHop::new("10.0.0.1".parse().unwrap(), None).is_ok());
    assert!(NextHop::new("face:b00c::1".parse().unwrap(), None).is_ok());
    assert_eq!(
        Err(Error::InvalidNextHopScope("10.0.0.1".parse().unwrap())),
        NextHop::new("10.0.0.1".parse().unwrap(), Some(10))
    );
    assert_eq!(
        Err(Error::InvalidNextHopScope("face::1".parse().unwrap())),
        NextHop::new("face::1".parse().unwrap(), Some(10))
    );

    // IPv4 link-local addresses may carry one.
    assert!(NextHop::new("169.254.0.1".parse().unwrap(), None).is_ok());
    assert!(NextHop::new("169.254.0.2".parse().unwrap(), Some(2)).is_ok());

    // IPv6 link-local addresses must.
    assert!(NextHop::new("fe80::1".parse().unwrap(), Some(4)).is_ok());
    assert_eq!(
        Err(Error::InvalidNextHopScope("fe80::1".parse().unwrap())),
        NextHop::new("fe80::1".parse().unwrap(), None)
    );

    // The same constraints hold on decode.
    assert!(serde_json::from_str::<NextHop>(
        r#"{"ip": "10.0.0.1", "ifName": 10}"#
    )
    .is_err());
    assert!(serde_json::from_str::<NextHop>(r#"{"ip": "fe80::1"}"#).is_err());
    assert!(serde_json::from_str::<NextHop>(
        r#"{"ip": "fe80::1", "ifName": 4}"#
    )
    .is_ok());
}

#[test]
fn decode_rejects_empty_client_entry() {
    assert!(serde_json::from_str::<MultiClientNextHops>(
        r#"[{"clientId": 7, "nexthops": []}]"#
    )
    .is_err());
}

#[test]
fn iterate_published_routes() {
    let mut interfaces = InterfaceMap::new();
    interfaces.insert(Interface::new(
        1,
        0,
        [0, 0, 0, 0, 0, 0x11],
        vec!["1.1.1.1/24".parse().unwrap(), "1::1/48".parse().unwrap()],
    ));
    let tables = Arc::new(RouteTableMap::new());
    let mut updater = RouteUpdater::new(&tables);
    updater
        .add_interface_and_link_local_routes(&interfaces)
        .unwrap();
    let tables = updater.update_done().unwrap();

    let table = tables.get_route_table(0).unwrap();
    let routes: Vec<RouteEntry> = table.iter_routes().collect();
    assert_eq!(3, routes.len());
    assert!(routes[0].as_v4().is_some());
    assert_eq!(
        2,
        routes.iter().filter(|entry| entry.as_v6().is_some()).count()
    );
}
