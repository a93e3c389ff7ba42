//! Oracle consensus: registration, status requests and quorum resolution.
//!
//! ```text
//! fetch ──→ [OPEN] ──submit (responses[s] < quorum)──→ [OPEN]
//!              │
//!              └──submit (responses[s] >= quorum)──→ [RESOLVED] ──→ PolicyBook::resolve
//! ```
//!
//! Index assignment is pseudo-random, not cryptographic. Oracles are vetted
//! participants; the draw only has to be uniform over the index range and
//! hard to steer for a caller who does not control the entropy source.

use crate::domain::policy::{Credit, PolicyBook};
use crate::error::{LedgerError, LedgerResult};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use shared_types::{Address, FlightKey, FlightStatus, Wei};
use std::collections::{BTreeMap, BTreeSet};

/// Indexes assigned to every oracle
pub const INDEXES_PER_ORACLE: usize = 3;

/// Draws before `draw_indexes` gives up on finding distinct values
const MAX_INDEX_DRAWS: u64 = 256;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Oracle {
    pub address: Address,
    pub indexes: [u8; INDEXES_PER_ORACLE],
}

impl Oracle {
    pub fn holds(&self, index: u8) -> bool {
        self.indexes.contains(&index)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestKey {
    pub flight: FlightKey,
    pub index: u8,
}

impl RequestKey {
    pub fn new(flight: FlightKey, index: u8) -> Self {
        Self { flight, index }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusRequest {
    pub requester: Address,
    /// Oracles that reported each status. One oracle may appear under
    /// several statuses.
    pub responses: BTreeMap<FlightStatus, BTreeSet<Address>>,
    pub resolution: Option<FlightStatus>,
}

impl StatusRequest {
    fn open(requester: Address) -> Self {
        Self {
            requester,
            responses: BTreeMap::new(),
            resolution: None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.resolution.is_some()
    }
}

/// Read-only view of a status request
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRequestSummary {
    pub requester: Address,
    pub response_counts: BTreeMap<FlightStatus, usize>,
    pub resolution: Option<FlightStatus>,
}

impl From<&StatusRequest> for StatusRequestSummary {
    fn from(request: &StatusRequest) -> Self {
        Self {
            requester: request.requester,
            response_counts: request
                .responses
                .iter()
                .map(|(status, oracles)| (*status, oracles.len()))
                .collect(),
            resolution: request.resolution,
        }
    }
}

/// A validated registration waiting for its fee to clear
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OracleAdmission {
    pub oracle: Oracle,
    next_nonce: u64,
}

/// Outcome of `fetch`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OpenedRequest {
    pub index: u8,
    /// False when an open request already existed under the drawn key
    pub created: bool,
}

/// Outcome of an accepted response
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmitOutcome {
    /// Oracles now backing the submitted status
    pub matching: usize,
    /// Set when this response reached quorum
    pub resolved: Option<FlightStatus>,
    /// Credits produced by the resolution, if any
    pub credits: Vec<Credit>,
}

/// Uniform draw from `0..range`, seeded by keccak256(address ‖ nonce ‖ entropy).
pub fn draw_index(address: &Address, nonce: u64, entropy: &[u8; 32], range: u8) -> u8 {
    let mut hasher = Keccak256::new();
    hasher.update(address.as_bytes());
    hasher.update(nonce.to_be_bytes());
    hasher.update(entropy);
    let seed: [u8; 32] = hasher.finalize().into();
    StdRng::from_seed(seed).gen_range(0..range)
}

#[derive(Clone, Debug)]
pub struct OracleConsensus {
    min_consensus: usize,
    index_count: u8,
    /// Bumped on every index draw
    nonce: u64,
    oracles: BTreeMap<Address, Oracle>,
    requests: BTreeMap<RequestKey, StatusRequest>,
    /// Most recent resolution per flight
    flight_statuses: BTreeMap<FlightKey, FlightStatus>,
}

impl OracleConsensus {
    pub fn new(min_consensus: usize, index_count: u8) -> Self {
        Self {
            min_consensus,
            index_count,
            nonce: 0,
            oracles: BTreeMap::new(),
            requests: BTreeMap::new(),
            flight_statuses: BTreeMap::new(),
        }
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn oracle(&self, address: &Address) -> Option<&Oracle> {
        self.oracles.get(address)
    }

    pub fn request(&self, flight: &FlightKey, index: u8) -> Option<&StatusRequest> {
        self.requests.get(&RequestKey::new(flight.clone(), index))
    }

    pub fn flight_status(&self, flight: &FlightKey) -> Option<FlightStatus> {
        self.flight_statuses.get(flight).copied()
    }

    /// Three distinct indexes for `address`, drawn from consecutive nonces
    /// starting at the current one. Returns them with the next free nonce.
    fn draw_indexes(
        &self,
        address: &Address,
        entropy: &[u8; 32],
    ) -> LedgerResult<([u8; INDEXES_PER_ORACLE], u64)> {
        let mut nonce = self.nonce;
        let mut drawn: Vec<u8> = Vec::with_capacity(INDEXES_PER_ORACLE);

        while drawn.len() < INDEXES_PER_ORACLE {
            if nonce - self.nonce >= MAX_INDEX_DRAWS {
                return Err(LedgerError::InvalidState {
                    reason: "could not draw distinct oracle indexes".to_string(),
                });
            }
            let index = draw_index(address, nonce, entropy, self.index_count);
            nonce += 1;
            if !drawn.contains(&index) {
                drawn.push(index);
            }
        }

        let indexes = [drawn[0], drawn[1], drawn[2]];
        Ok((indexes, nonce))
    }

    /// Check a registration and draw its indexes. Mutates nothing; the
    /// result is committed with `register` once the fee is in custody.
    pub fn admit(
        &self,
        address: Address,
        fee: Wei,
        required_fee: Wei,
        entropy: &[u8; 32],
    ) -> LedgerResult<OracleAdmission> {
        if self.oracles.contains_key(&address) {
            return Err(LedgerError::AlreadyExists {
                what: "oracle",
                address,
            });
        }
        if fee < required_fee {
            return Err(LedgerError::out_of_range(format!(
                "registration fee {fee} below required {required_fee}"
            )));
        }
        let (indexes, next_nonce) = self.draw_indexes(&address, entropy)?;
        Ok(OracleAdmission {
            oracle: Oracle { address, indexes },
            next_nonce,
        })
    }

    pub fn register(&mut self, admission: OracleAdmission) -> Oracle {
        let OracleAdmission { oracle, next_nonce } = admission;
        self.nonce = self.nonce.max(next_nonce);
        self.oracles.insert(oracle.address, oracle.clone());
        tracing::debug!(oracle = %oracle.address, indexes = ?oracle.indexes, "Oracle indexes assigned");
        oracle
    }

    /// Open a status request for `flight` at a freshly drawn index.
    ///
    /// An open request under the same key is kept with its responses. A
    /// resolved one starts a fresh round; policies it already settled stay
    /// settled. Every call advances the nonce.
    pub fn fetch(&mut self, requester: Address, flight: FlightKey, entropy: &[u8; 32]) -> OpenedRequest {
        let index = draw_index(&requester, self.nonce, entropy, self.index_count);
        self.nonce += 1;

        let key = RequestKey::new(flight, index);
        let created = match self.requests.get(&key) {
            Some(existing) => existing.is_resolved(),
            None => true,
        };
        if created {
            self.requests.insert(key, StatusRequest::open(requester));
        }
        OpenedRequest { index, created }
    }

    /// Record one oracle's report. On quorum the request resolves and every
    /// open policy on the flight is settled within this same call.
    pub fn submit(
        &mut self,
        oracle: Address,
        index: u8,
        flight: &FlightKey,
        status: FlightStatus,
        policies: &mut PolicyBook,
        payout_for: impl Fn(Wei) -> Wei,
    ) -> LedgerResult<SubmitOutcome> {
        if !self.oracles.get(&oracle).is_some_and(|o| o.holds(index)) {
            return Err(LedgerError::InvalidOracleIndex { oracle, index });
        }

        let key = RequestKey::new(flight.clone(), index);
        let Some(request) = self.requests.get_mut(&key) else {
            return Err(LedgerError::RequestNotFound {
                flight: key.flight,
                index,
            });
        };
        if request.is_resolved() {
            return Err(LedgerError::AlreadyResolved { flight: key.flight });
        }

        let backers = request.responses.entry(status).or_default();
        backers.insert(oracle);
        let matching = backers.len();

        if matching < self.min_consensus {
            return Ok(SubmitOutcome {
                matching,
                resolved: None,
                credits: Vec::new(),
            });
        }

        request.resolution = Some(status);
        self.flight_statuses.insert(flight.clone(), status);
        let credits = policies.resolve(flight, status, payout_for);
        tracing::info!(
            flight = %flight,
            index,
            status = %status,
            credited = credits.len(),
            "Flight status resolved"
        );

        Ok(SubmitOutcome {
            matching,
            resolved: Some(status),
            credits,
        })
    }
}
