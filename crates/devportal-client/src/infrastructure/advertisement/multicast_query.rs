//! Secondary advertisement backend: one DNS-SD query, answers collected
//! until the window closes.
//!
//! The query is sent from an ephemeral port with the "unicast response"
//! bit set, so responders reply directly to us and nothing has to join the
//! multicast group or bind 5353.

use std::collections::HashMap;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;

use async_trait::async_trait;
use devportal_core::{instance_name, AdvertisedService};
use simple_dns::{rdata::RData, Name, Packet, Question, CLASS, TYPE};
use tokio::net::UdpSocket;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, trace};

use super::{AdvertisementBackend, AdvertisementError};

const BACKEND: &str = "multicast-query";

/// mDNS group and port.
const MDNS_GROUP: SocketAddr = SocketAddr::new(
    std::net::IpAddr::V4(Ipv4Addr::new(224, 0, 0, 251)),
    5353,
);

/// Largest datagram mDNS allows without fragmentation tricks.
const MAX_DATAGRAM: usize = 9000;

#[derive(Debug, Default, Clone, Copy)]
pub struct MulticastQueryBackend;

impl MulticastQueryBackend {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AdvertisementBackend for MulticastQueryBackend {
    fn name(&self) -> &'static str {
        BACKEND
    }

    async fn browse(
        &self,
        service_type: &str,
        window: Duration,
    ) -> Result<Vec<AdvertisedService>, AdvertisementError> {
        let query = build_query(service_type)?;
        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))
            .await
            .map_err(|e| AdvertisementError::unavailable(BACKEND, e))?;
        socket
            .send_to(&query, MDNS_GROUP)
            .await
            .map_err(|e| AdvertisementError::unavailable(BACKEND, e))?;
        debug!("sent PTR query for {service_type}");

        let deadline = Instant::now() + window;
        let mut records = RecordSet::new(service_type);
        let mut buf = vec![0u8; MAX_DATAGRAM];

        loop {
            match timeout_at(deadline, socket.recv_from(&mut buf)).await {
                Ok(Ok((len, from))) => match Packet::parse(&buf[..len]) {
                    Ok(packet) => records.absorb(&packet),
                    Err(e) => trace!("ignoring undecodable datagram from {from}: {e}"),
                },
                Ok(Err(e)) => {
                    trace!("receive failed: {e}");
                    break;
                }
                Err(_) => break,
            }
        }

        Ok(records.into_services())
    }
}

fn build_query(service_type: &str) -> Result<Vec<u8>, AdvertisementError> {
    let name = Name::new(service_type.trim_end_matches('.'))
        .map_err(|e| AdvertisementError::unavailable(BACKEND, e))?;
    let mut packet = Packet::new_query(0);
    packet
        .questions
        .push(Question::new(name, TYPE::PTR.into(), CLASS::IN.into(), true));
    packet
        .build_bytes_vec()
        .map_err(|e| AdvertisementError::unavailable(BACKEND, e))
}

/// Name without its trailing dot, as the responder spelled it.
fn spelled(name: &Name<'_>) -> String {
    name.to_string().trim_end_matches('.').to_string()
}

/// Lookup key: DNS names compare case-insensitively.
fn key(name: &Name<'_>) -> String {
    spelled(name).to_ascii_lowercase()
}

/// Records accumulated across every response of one browse.
#[derive(Debug)]
struct RecordSet {
    /// Lowercased, without the trailing dot.
    service_type: String,
    /// Instance keys in the order first seen.
    instances: Vec<String>,
    /// Instance key → name as first spelled by a responder.
    spellings: HashMap<String, String>,
    /// Instance → (target host, port).
    srv: HashMap<String, (String, u16)>,
    /// Host → addresses in the order received.
    addrs: HashMap<String, Vec<String>>,
}

impl RecordSet {
    fn new(service_type: &str) -> Self {
        Self {
            service_type: service_type.trim_end_matches('.').to_ascii_lowercase(),
            instances: Vec::new(),
            spellings: HashMap::new(),
            srv: HashMap::new(),
            addrs: HashMap::new(),
        }
    }

    fn note_instance(&mut self, name: &Name<'_>) {
        let instance = key(name);
        if !self.instances.contains(&instance) {
            self.spellings.insert(instance.clone(), spelled(name));
            self.instances.push(instance);
        }
    }

    fn note_addr(&mut self, host: String, addr: String) {
        let entry = self.addrs.entry(host).or_default();
        if !entry.contains(&addr) {
            entry.push(addr);
        }
    }

    fn absorb(&mut self, packet: &Packet<'_>) {
        for record in packet.answers.iter().chain(packet.additional_records.iter()) {
            let owner = key(&record.name);
            match &record.rdata {
                RData::PTR(ptr) if owner == self.service_type => {
                    self.note_instance(&ptr.0);
                }
                RData::SRV(srv) => {
                    if owner.ends_with(&format!(".{}", self.service_type)) {
                        self.note_instance(&record.name);
                    }
                    self.srv.insert(owner, (key(&srv.target), srv.port));
                }
                RData::A(a) => {
                    self.note_addr(owner, Ipv4Addr::from(a.address).to_string());
                }
                RData::AAAA(aaaa) => {
                    self.note_addr(owner, Ipv6Addr::from(aaaa.address).to_string());
                }
                _ => {}
            }
        }
    }

    /// Instances with an SRV record become services; the rest have no port
    /// and are dropped.
    fn into_services(mut self) -> Vec<AdvertisedService> {
        let mut services = Vec::new();
        for instance in std::mem::take(&mut self.instances) {
            let Some((target, port)) = self.srv.get(&instance).cloned() else {
                trace!("no SRV record for {instance}");
                continue;
            };
            let addresses = self.addrs.get(&target).cloned().unwrap_or_default();
            let full_name = self.spellings.get(&instance).unwrap_or(&instance);
            services.push(AdvertisedService {
                name: instance_name(full_name, &self.service_type),
                host_name: Some(format!("{target}.")),
                addresses,
                port,
            });
        }
        services
    }
}
