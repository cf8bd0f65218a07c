// Copyright 2021 Nir H. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

#![deny(missing_docs)]
#![cfg_attr(not(feature = "std"), no_std)]
//! This library provides emulation of the gameboy's Z80-like CPU (the SM83) and
//! a flat 64KB address space for it, as described in the publicly available
//! "Game Boy CPU Manual".
//!
//! The processor owns its memory for its entire lifetime and is driven by an
//! external loop calling [`cpu::Cpu::execute`].

#[cfg(all(test, not(feature = "std")))]
#[macro_use]
extern crate std;

use thiserror::Error;

pub mod bus;
pub mod cpu;
pub mod config;

/// Errors reported by the emulation core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GameboyError {
	/// The fetched opcode doesn't encode any instruction.
	#[error("bad opcode {0:#04x}")]
	BadOpcode(u8),
}
