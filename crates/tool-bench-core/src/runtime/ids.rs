// crates/tool-bench-core/src/runtime/ids.rs
// ============================================================================
// Module: Experiment Identifier Generation
// Description: Default random experiment identifier source.
// Purpose: Issue short opaque identifiers from the OS random number generator.
// Dependencies: crate::{core, interfaces}, rand
// ============================================================================

//! ## Overview
//! Identifiers are eight lowercase hex characters drawn from four bytes of OS
//! randomness. Collisions are possible at scale; stores reject them with
//! [`crate::StoreError::DuplicateId`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use rand::RngCore;
use rand::rngs::OsRng;

use crate::core::ExperimentId;
use crate::interfaces::ExperimentIdSource;

// ============================================================================
// SECTION: Random Identifiers
// ============================================================================

/// Random identifier source backed by the OS RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomExperimentIds;

impl ExperimentIdSource for RandomExperimentIds {
    fn next_id(&self) -> ExperimentId {
        let mut bytes = [0u8; 4];
        OsRng.fill_bytes(&mut bytes);
        ExperimentId::new(format!("{:08x}", u32::from_be_bytes(bytes)))
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
