//! Identity Store
//!
//! Holds the simulated externally visible network identity and rotates it.
//!
//! An identity is always replaced as one value: address, hardware id and
//! rotation time come from the same `rotate` call.

pub mod generator;

pub use generator::{generate_address, generate_hardware_id};

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::constants::{SEED_ADDRESS, SEED_HARDWARE_ID};

/// Simulated network identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub address: String,
    pub hardware_id: String,
    pub last_rotation: DateTime<Utc>,
}

impl Identity {
    /// Boot identity, before any rotation
    pub fn seed(now: DateTime<Utc>) -> Self {
        Self {
            address: SEED_ADDRESS.to_string(),
            hardware_id: SEED_HARDWARE_ID.to_string(),
            last_rotation: now,
        }
    }

    /// Same address and hardware id (rotation time ignored)
    pub fn same_endpoint(&self, other: &Identity) -> bool {
        self.address == other.address && self.hardware_id == other.hardware_id
    }
}

/// Identity store state
pub struct IdentityStore {
    current: Identity,
    rng: StdRng,
    rotations: u64,
    /// MAC spoofing; when off, rotations keep the hardware id
    rotate_hardware_id: bool,
}

impl IdentityStore {
    /// Create a store holding the seed identity
    pub fn new(now: DateTime<Utc>) -> Self {
        Self::with_rng(Identity::seed(now), StdRng::from_entropy())
    }

    /// Deterministic generation, for tests and replays
    pub fn with_seed(now: DateTime<Utc>, seed: u64) -> Self {
        Self::with_rng(Identity::seed(now), StdRng::seed_from_u64(seed))
    }

    fn with_rng(current: Identity, rng: StdRng) -> Self {
        Self {
            current,
            rng,
            rotations: 0,
            rotate_hardware_id: true,
        }
    }

    pub fn with_hardware_id_rotation(mut self, enabled: bool) -> Self {
        self.rotate_hardware_id = enabled;
        self
    }

    pub fn set_rotate_hardware_id(&mut self, enabled: bool) {
        self.rotate_hardware_id = enabled;
    }

    pub fn rotates_hardware_id(&self) -> bool {
        self.rotate_hardware_id
    }

    pub fn current(&self) -> &Identity {
        &self.current
    }

    /// Rotations performed since creation
    pub fn rotations(&self) -> u64 {
        self.rotations
    }

    /// Replace the identity with a freshly generated one.
    ///
    /// The new value is built completely before it is assigned.
    pub fn rotate(&mut self, now: DateTime<Utc>) -> Identity {
        let mut next = self.generate(now);
        if next.same_endpoint(&self.current) {
            log::debug!("[Identity] Generated identity collided with current one, regenerating");
            next = self.generate(now);
        }

        let previous = std::mem::replace(&mut self.current, next);
        self.rotations += 1;

        log::info!(
            "[Identity] Rotated {} / {} -> {} / {}",
            previous.address, previous.hardware_id, self.current.address, self.current.hardware_id
        );

        self.current.clone()
    }

    fn generate(&mut self, now: DateTime<Utc>) -> Identity {
        let address = generate_address(&mut self.rng);
        let hardware_id = if self.rotate_hardware_id {
            generate_hardware_id(&mut self.rng)
        } else {
            self.current.hardware_id.clone()
        };

        Identity {
            address,
            hardware_id,
            last_rotation: now,
        }
    }
}

impl std::fmt::Debug for IdentityStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityStore")
            .field("current", &self.current)
            .field("rotations", &self.rotations)
            .field("rotate_hardware_id", &self.rotate_hardware_id)
            .finish()
    }
}
