// crates/meridian-core/src/endpoint.rs
//
// Endpoint records and their packed integer form.
//
// Packed layout (one u64 per word):
//   [0]       uid
//   [1..9]    hotkey, up to 64 UTF-8 bytes, zero padded, big-endian words
//   [9]       ip_type (4 or 6)
//   [10..12]  ip as u128 (high word, low word)
//   [12]      port
//   [13]      modality
//   [14..22]  coldkey, same encoding as hotkey

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use crate::error::MeridianError;
use crate::neuron::NeuronRecord;

/// Maximum byte length of a hotkey or coldkey.
pub const KEY_BYTES: usize = 64;

const KEY_WORDS: usize = KEY_BYTES / 8;

/// Number of words in a packed endpoint row.
pub const PACKED_ENDPOINT_WORDS: usize = 6 + 2 * KEY_WORDS;

/// An endpoint packed into a fixed-width integer row.
pub type PackedEndpoint = [u64; PACKED_ENDPOINT_WORDS];

const UID: usize = 0;
const HOTKEY: usize = 1;
const IP_TYPE: usize = HOTKEY + KEY_WORDS;
const IP_HI: usize = IP_TYPE + 1;
const IP_LO: usize = IP_HI + 1;
const PORT: usize = IP_LO + 1;
const MODALITY: usize = PORT + 1;
const COLDKEY: usize = MODALITY + 1;

/// Network identity and location of a single neuron.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub uid: u64,
    /// Identity (hot) key.
    pub hotkey: String,
    /// Address family tag: 4 or 6. Must agree with `ip`.
    pub ip_type: u8,
    pub ip: IpAddr,
    pub port: u16,
    pub modality: u8,
    /// Owner (cold) key.
    pub coldkey: String,
}

impl Endpoint {
    /// Build an endpoint from a ledger record.
    ///
    /// # Errors
    /// Returns `MeridianError::Encoding` if the IP string does not parse or
    /// its family disagrees with `ip_type`.
    pub fn from_neuron(neuron: &NeuronRecord) -> Result<Self, MeridianError> {
        let ip: IpAddr = neuron.ip.parse().map_err(|_| {
            MeridianError::Encoding(format!(
                "uid {}: invalid IP address '{}'",
                neuron.uid, neuron.ip
            ))
        })?;
        check_family(neuron.ip_type, &ip)?;

        Ok(Self {
            uid: neuron.uid,
            hotkey: neuron.hotkey.clone(),
            ip_type: neuron.ip_type,
            ip,
            port: neuron.port,
            modality: neuron.modality,
            coldkey: neuron.coldkey.clone(),
        })
    }

    /// Address string in `/ipv{family}/{ip}:{port}` form.
    pub fn address(&self) -> String {
        format!("/ipv{}/{}:{}", self.ip_type, self.ip, self.port)
    }

    /// Pack this endpoint into a fixed-width row.
    ///
    /// # Errors
    /// Returns `MeridianError::Encoding` if a key is longer than
    /// [`KEY_BYTES`], contains a NUL byte, or the address family is invalid.
    pub fn encode(&self) -> Result<PackedEndpoint, MeridianError> {
        check_family(self.ip_type, &self.ip)?;

        let ip = match self.ip {
            IpAddr::V4(addr) => u128::from(u32::from(addr)),
            IpAddr::V6(addr) => u128::from(addr),
        };

        let mut row = [0u64; PACKED_ENDPOINT_WORDS];
        row[UID] = self.uid;
        row[HOTKEY..IP_TYPE].copy_from_slice(&pack_key(&self.hotkey, "hotkey")?);
        row[IP_TYPE] = u64::from(self.ip_type);
        row[IP_HI] = (ip >> 64) as u64;
        row[IP_LO] = ip as u64;
        row[PORT] = u64::from(self.port);
        row[MODALITY] = u64::from(self.modality);
        row[COLDKEY..].copy_from_slice(&pack_key(&self.coldkey, "coldkey")?);
        Ok(row)
    }

    /// Unpack a row produced by [`Endpoint::encode`].
    ///
    /// # Errors
    /// Returns `MeridianError::Encoding` for rows no endpoint encodes to.
    pub fn decode(row: &PackedEndpoint) -> Result<Self, MeridianError> {
        let ip_type = match row[IP_TYPE] {
            4 => 4u8,
            6 => 6u8,
            other => {
                return Err(MeridianError::Encoding(format!(
                    "unknown address family tag {}",
                    other
                )))
            }
        };

        let raw_ip = (u128::from(row[IP_HI]) << 64) | u128::from(row[IP_LO]);
        let ip = if ip_type == 4 {
            let v4 = u32::try_from(raw_ip).map_err(|_| {
                MeridianError::Encoding(format!("IPv4 value {} exceeds 32 bits", raw_ip))
            })?;
            IpAddr::V4(Ipv4Addr::from(v4))
        } else {
            IpAddr::V6(Ipv6Addr::from(raw_ip))
        };

        let port = u16::try_from(row[PORT])
            .map_err(|_| MeridianError::Encoding(format!("port {} out of range", row[PORT])))?;
        let modality = u8::try_from(row[MODALITY]).map_err(|_| {
            MeridianError::Encoding(format!("modality {} out of range", row[MODALITY]))
        })?;

        Ok(Self {
            uid: row[UID],
            hotkey: unpack_key(&row[HOTKEY..IP_TYPE], "hotkey")?,
            ip_type,
            ip,
            port,
            modality,
            coldkey: unpack_key(&row[COLDKEY..], "coldkey")?,
        })
    }
}

fn check_family(ip_type: u8, ip: &IpAddr) -> Result<(), MeridianError> {
    match (ip_type, ip) {
        (4, IpAddr::V4(_)) | (6, IpAddr::V6(_)) => Ok(()),
        (4, _) | (6, _) => Err(MeridianError::Encoding(format!(
            "address {} does not match family tag {}",
            ip, ip_type
        ))),
        _ => Err(MeridianError::Encoding(format!(
            "unknown address family tag {}",
            ip_type
        ))),
    }
}

fn pack_key(key: &str, field: &str) -> Result<[u64; KEY_WORDS], MeridianError> {
    let bytes = key.as_bytes();
    if bytes.len() > KEY_BYTES {
        return Err(MeridianError::Encoding(format!(
            "{} is {} bytes, limit is {}",
            field,
            bytes.len(),
            KEY_BYTES
        )));
    }
    if bytes.contains(&0) {
        return Err(MeridianError::Encoding(format!("{} contains a NUL byte", field)));
    }

    let mut buf = [0u8; KEY_BYTES];
    buf[..bytes.len()].copy_from_slice(bytes);

    let mut words = [0u64; KEY_WORDS];
    for (word, chunk) in words.iter_mut().zip(buf.chunks_exact(8)) {
        let mut be = [0u8; 8];
        be.copy_from_slice(chunk);
        *word = u64::from_be_bytes(be);
    }
    Ok(words)
}

fn unpack_key(words: &[u64], field: &str) -> Result<String, MeridianError> {
    let mut buf: Vec<u8> = words.iter().flat_map(|w| w.to_be_bytes()).collect();

    let len = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    if buf[len..].iter().any(|&b| b != 0) {
        return Err(MeridianError::Encoding(format!(
            "{} has data after its terminator",
            field
        )));
    }
    buf.truncate(len);

    String::from_utf8(buf)
        .map_err(|e| MeridianError::Encoding(format!("{} is not valid UTF-8: {}", field, e)))
}
