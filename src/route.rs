//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::BTreeSet;
use std::net::IpAddr;

use bitflags::bitflags;
use derive_new::new;
use serde::{Deserialize, Serialize};

use crate::af::AddressFamily;
use crate::error::Error;
use crate::ip::IpNetworkKind;
use crate::nexthop::{ClientId, MultiClientNextHops, NextHopSet};
use crate::InterfaceId;

// How packets matching a route are forwarded.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ForwardAction {
    NextHops,
    Drop,
    ToCpu,
}

// A fully resolved egress: the interface to send out of and the address of
// the directly reachable neighbor.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, new)]
#[derive(Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForwardNextHop {
    pub intf: InterfaceId,
    pub addr: IpAddr,
}

// Resolved forwarding information of a route.
//
// `Drop` and `ToCpu` carry no egress set.
#[derive(Clone, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct ForwardInfo {
    action: ForwardAction,
    nexthops: BTreeSet<ForwardNextHop>,
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    #[derive(Deserialize, Serialize)]
    #[serde(transparent)]
    pub struct RouteFlags: u8 {
        const CONNECTED = 0x01;
        const RESOLVED = 0x02;
        const UNRESOLVABLE = 0x04;
        const PROCESSING = 0x08;
        const NEED_RESOLVE = 0x10;
    }
}

// One route: a destination prefix with its per-client contributions and the
// forwarding information computed by the resolution pass.
//
// A route carries either client next-hop entries or a single action
// override (a client-less DROP/TO_CPU contribution), never both.
#[derive(Clone, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
#[serde(bound(serialize = "A: AddressFamily", deserialize = "A: AddressFamily"))]
pub struct Route<A: AddressFamily> {
    prefix: A::IpNetwork,
    nexthops_multi: MultiClientNextHops,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    action: Option<ForwardAction>,
    fwd: ForwardInfo,
    flags: RouteFlags,
    generation: u64,
}

// ===== impl ForwardAction =====

impl std::fmt::Display for ForwardAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ForwardAction::NextHops => write!(f, "nexthops"),
            ForwardAction::Drop => write!(f, "drop"),
            ForwardAction::ToCpu => write!(f, "to-cpu"),
        }
    }
}

// ===== impl ForwardInfo =====

impl ForwardInfo {
    pub fn from_action(action: ForwardAction) -> ForwardInfo {
        ForwardInfo {
            action,
            nexthops: Default::default(),
        }
    }

    pub fn from_nexthops(nexthops: BTreeSet<ForwardNextHop>) -> ForwardInfo {
        ForwardInfo {
            action: ForwardAction::NextHops,
            nexthops,
        }
    }

    pub fn action(&self) -> ForwardAction {
        self.action
    }

    pub fn nexthops(&self) -> &BTreeSet<ForwardNextHop> {
        &self.nexthops
    }

    // Whether the egress set requires ECMP spreading.
    pub fn is_ecmp(&self) -> bool {
        self.nexthops.len() > 1
    }
}

impl Default for ForwardInfo {
    fn default() -> ForwardInfo {
        ForwardInfo::from_action(ForwardAction::Drop)
    }
}

// ===== impl Route =====

impl<A: AddressFamily> Route<A> {
    pub fn new(prefix: A::IpNetwork) -> Route<A> {
        Route {
            prefix: prefix.apply_mask(),
            nexthops_multi: Default::default(),
            action: None,
            fwd: Default::default(),
            flags: RouteFlags::NEED_RESOLVE,
            generation: 0,
        }
    }

    pub fn prefix(&self) -> &A::IpNetwork {
        &self.prefix
    }

    // Structural read-only view of the per-client contributions.
    pub fn entries(&self) -> &MultiClientNextHops {
        &self.nexthops_multi
    }

    pub fn forward_info(&self) -> &ForwardInfo {
        &self.fwd
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    // Sets the contribution of the given client, dropping any action
    // override and invalidating prior resolution results.
    pub fn update(
        &mut self,
        client: ClientId,
        nexthops: NextHopSet,
    ) -> Result<(), Error> {
        self.nexthops_multi.update(client, nexthops)?;
        self.action = None;
        self.clear_resolution();
        Ok(())
    }

    // Turns the route into a client-less DROP/TO_CPU route.
    pub fn update_action(&mut self, action: ForwardAction) {
        debug_assert!(action != ForwardAction::NextHops);
        self.nexthops_multi = Default::default();
        self.action = Some(action);
        self.clear_resolution();
    }

    // Removes the contribution of the given client, if any.
    pub fn delete_for_client(&mut self, client: ClientId) {
        if self.nexthops_multi.has_nexthops_for_client(client) {
            self.nexthops_multi.delete_for_client(client);
            self.clear_resolution();
        }
    }

    pub fn best_nexthop_list(&self) -> Result<&NextHopSet, Error> {
        self.nexthops_multi.best_nexthop_list()
    }

    pub fn is_same(&self, client: ClientId, nexthops: &NextHopSet) -> bool {
        self.nexthops_multi.is_same(client, nexthops)
    }

    pub fn is_same_action(&self, action: ForwardAction) -> bool {
        self.fwd.action() == action
    }

    pub fn has_nexthops_for_client(&self, client: ClientId) -> bool {
        self.nexthops_multi.has_nexthops_for_client(client)
    }

    pub fn is_with_nexthops(&self) -> bool {
        self.nexthops_multi.has_entries()
    }

    pub fn is_connected(&self) -> bool {
        self.flags.contains(RouteFlags::CONNECTED)
    }

    pub fn is_resolved(&self) -> bool {
        self.flags.contains(RouteFlags::RESOLVED)
    }

    pub fn is_unresolvable(&self) -> bool {
        self.flags.contains(RouteFlags::UNRESOLVABLE)
    }

    pub fn is_processing(&self) -> bool {
        self.flags.contains(RouteFlags::PROCESSING)
    }

    pub fn need_resolve(&self) -> bool {
        self.flags.contains(RouteFlags::NEED_RESOLVE)
    }

    pub fn is_drop(&self) -> bool {
        self.is_resolved() && self.fwd.action() == ForwardAction::Drop
    }

    pub fn is_to_cpu(&self) -> bool {
        self.is_resolved() && self.fwd.action() == ForwardAction::ToCpu
    }

    pub fn is_host_route(&self) -> bool {
        self.prefix.is_host_prefix()
    }

    pub fn flags(&self) -> RouteFlags {
        self.flags
    }

    // Marks the route as derived from the given interface address. The
    // forwarding information of a connected route is fixed at derivation
    // time.
    pub(crate) fn set_connected(&mut self, intf: InterfaceId, addr: IpAddr) {
        self.action = None;
        self.fwd = ForwardInfo::from_nexthops(BTreeSet::from([
            ForwardNextHop::new(intf, addr),
        ]));
        self.flags.insert(RouteFlags::CONNECTED);
        self.flags.remove(RouteFlags::RESOLVED | RouteFlags::UNRESOLVABLE);
        self.flags.insert(RouteFlags::NEED_RESOLVE);
    }

    pub(crate) fn clear_connected(&mut self) {
        self.flags.remove(RouteFlags::CONNECTED);
        self.clear_resolution();
    }

    pub(crate) fn action_override(&self) -> Option<ForwardAction> {
        self.action
    }

    // Resets the resolution state ahead of a resolution pass. Connected
    // routes keep their derived forwarding information.
    pub(crate) fn prepare_resolve(&mut self) {
        self.flags.remove(
            RouteFlags::RESOLVED
                | RouteFlags::UNRESOLVABLE
                | RouteFlags::PROCESSING,
        );
        self.flags.insert(RouteFlags::NEED_RESOLVE);
        if !self.is_connected() {
            self.fwd = Default::default();
        }
    }

    pub(crate) fn set_processing(&mut self) {
        self.flags.insert(RouteFlags::PROCESSING);
    }

    pub(crate) fn set_resolved(&mut self, fwd: ForwardInfo) {
        self.fwd = fwd;
        self.flags.insert(RouteFlags::RESOLVED);
        self.flags.remove(
            RouteFlags::UNRESOLVABLE
                | RouteFlags::PROCESSING
                | RouteFlags::NEED_RESOLVE,
        );
    }

    // Marks the route resolved without touching its forwarding information.
    pub(crate) fn set_resolved_as_is(&mut self) {
        self.flags.insert(RouteFlags::RESOLVED);
        self.flags.remove(
            RouteFlags::UNRESOLVABLE
                | RouteFlags::PROCESSING
                | RouteFlags::NEED_RESOLVE,
        );
    }

    pub(crate) fn set_unresolvable(&mut self) {
        self.fwd = Default::default();
        self.flags.insert(RouteFlags::UNRESOLVABLE);
        self.flags.remove(
            RouteFlags::RESOLVED
                | RouteFlags::PROCESSING
                | RouteFlags::NEED_RESOLVE,
        );
    }

    pub(crate) fn set_generation(&mut self, generation: u64) {
        self.generation = generation;
    }

    // Content equality, disregarding the version counter.
    pub(crate) fn same_content(&self, other: &Route<A>) -> bool {
        self.prefix == other.prefix
            && self.nexthops_multi == other.nexthops_multi
            && self.action == other.action
            && self.fwd == other.fwd
            && self.flags == other.flags
    }

    fn clear_resolution(&mut self) {
        self.flags.remove(RouteFlags::RESOLVED | RouteFlags::UNRESOLVABLE);
        self.flags.insert(RouteFlags::NEED_RESOLVE);
    }
}
