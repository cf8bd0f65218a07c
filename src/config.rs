// Copyright 2021 Nir H. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

#![deny(missing_docs)]
//! Emulator hardware emulation configuration and preferences.

/// The hardware specification for the different models differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HardwareModel {
	/// Original GameBoy
	GB,
	/// Gameboy Color
	GBC,
	/// GameBoy Pocket
	GBP,
	/// Super GameBoy
	SGB,
}

/// Emulation settings and preferences goes here.
#[derive(Debug, Clone)]
pub struct Config {
	/// The model of the emulated machine
	pub model: HardwareModel,
	/// Whether opcodes that don't encode an instruction are reported as errors.
	///
	/// When disabled, such opcodes are skipped as if they were a `nop`.
	pub strict_opcodes: bool,
}

impl Default for Config {
	fn default() -> Self {
		Config {
			model: HardwareModel::GB,
			strict_opcodes: true,
		}
	}
}
