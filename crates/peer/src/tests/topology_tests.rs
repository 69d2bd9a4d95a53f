use super::*;

fn s(n: u64) -> ElementId {
    ElementId::new(format!("of:{n:016x}"))
}

#[test]
fn ports_exclude_logical_ports() {
    let topology = Topology::demo();
    let ports = topology.ports_for(&s(1)).expect("ports");
    assert_eq!(ports.len(), 6);
    assert_eq!(ports[0].id.as_str(), "1");
    assert_eq!(ports[0].speed, Some(10_000));
    assert!(ports.iter().all(|p| p.id.as_str() != LOCAL_PORT.to_string()));
}

#[test]
fn port_lookup_distinguishes_unknown_ids_from_hosts() {
    let topology = Topology::demo();
    let missing = ElementId::new("of:missing");
    let err = topology.ports_for(&missing).expect_err("must fail");
    assert_eq!(err, TopologyError::UnknownDevice(missing));
    assert_eq!(ApiError::from(err).code, ErrorCode::NotFound);

    let host_id = topology.hosts[0].id.clone();
    let err = topology.ports_for(&host_id).expect_err("hosts have no ports");
    assert_eq!(err, TopologyError::NotADevice(host_id));
    assert_eq!(ApiError::from(err).code, ErrorCode::Validation);
}

#[test]
fn resolve_prefers_hosts_then_devices() {
    let topology = Topology::demo();
    let host_id = topology.hosts[0].id.clone();
    assert!(matches!(topology.resolve(&host_id), Some(Element::Host(_))));
    assert!(matches!(topology.resolve(&s(2)), Some(Element::Device(_))));
    assert_eq!(topology.resolve(&ElementId::new("nothing")), None);
}

#[test]
fn both_directions_share_a_bi_link_id() {
    let forward = Link::new(ConnectPoint::new("b", 1), ConnectPoint::new("a", 2));
    let reverse = Link::new(ConnectPoint::new("a", 2), ConnectPoint::new("b", 1));
    assert_eq!(forward.bi_link_id(), reverse.bi_link_id());
    assert_eq!(forward.bi_link_id().as_str(), "a/2-b/1");
}

#[test]
fn egress_links_follow_source_device() {
    let topology = Topology::demo();
    assert_eq!(topology.egress_links(&s(1)).len(), 5);
    assert_eq!(topology.egress_links(&s(2)).len(), 2);
}

#[test]
fn loads_topology_from_toml() {
    let raw = r#"
        [[devices]]
        id = "of:a"
        ports = [{ number = 1, speed = 1000 }, { number = 4294967294, logical = true }]

        [[links]]
        src = { element = "of:a", port = 1 }
        dst = { element = "of:b", port = 1 }
    "#;
    let path = std::env::temp_dir().join(format!("peer_topology_{}.toml", std::process::id()));
    fs::write(&path, raw).expect("write");

    let topology = Topology::load(&path).expect("load");
    fs::remove_file(&path).expect("cleanup");

    assert_eq!(topology.devices.len(), 1);
    assert_eq!(topology.devices[0].ports[0].kind, "COPPER");
    assert_eq!(topology.ports_for(&ElementId::new("of:a")).expect("ports").len(), 1);
    assert!(topology.hosts.is_empty());
}
