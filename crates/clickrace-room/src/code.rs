//! Room code generation.
//!
//! The registry asks a [`CodeSource`] for candidates and redraws when a
//! candidate belongs to a live room.

use std::collections::VecDeque;

use clickrace_protocol::RoomCode;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Produces candidate room codes.
///
/// The registry owning it is shared across connection tasks, hence the
/// `Send + Sync` bound.
pub trait CodeSource: Send + Sync + 'static {
    /// Returns the next candidate. Uniqueness is the registry's job.
    fn next_code(&mut self) -> RoomCode;
}

impl CodeSource for Box<dyn CodeSource> {
    fn next_code(&mut self) -> RoomCode {
        (**self).next_code()
    }
}

/// Draws [`RoomCode::LENGTH`] characters uniformly from
/// [`RoomCode::ALPHABET`].
pub fn generate_code<R: Rng + ?Sized>(rng: &mut R) -> RoomCode {
    let code: String = (0..RoomCode::LENGTH)
        .map(|_| {
            let idx = rng.random_range(0..RoomCode::ALPHABET.len());
            char::from(RoomCode::ALPHABET[idx])
        })
        .collect();
    RoomCode::new(code)
}

// ---------------------------------------------------------------------------
// RandomCodes
// ---------------------------------------------------------------------------

/// The production code source: uniformly random codes.
pub struct RandomCodes {
    rng: StdRng,
}

impl RandomCodes {
    /// Seeds from the operating system.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Deterministic sequence for a given seed.
    #[cfg(test)]
    fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomCodes {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeSource for RandomCodes {
    fn next_code(&mut self) -> RoomCode {
        generate_code(&mut self.rng)
    }
}

// ---------------------------------------------------------------------------
// FixedCodes
// ---------------------------------------------------------------------------

/// Hands out a fixed list of codes in order, then falls back to random
/// ones. Lets tests and demos know a room's code in advance.
pub struct FixedCodes {
    queue: VecDeque<RoomCode>,
    fallback: RandomCodes,
}

impl FixedCodes {
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            queue: codes.into_iter().map(RoomCode::new).collect(),
            fallback: RandomCodes::new(),
        }
    }
}

impl CodeSource for FixedCodes {
    fn next_code(&mut self) -> RoomCode {
        self.queue
            .pop_front()
            .unwrap_or_else(|| self.fallback.next_code())
    }
}
