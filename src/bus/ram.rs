// Copyright 2021 Nir H. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! A flat, unbanked RAM covering the whole address space.

use super::Memory;
use super::consts::*;

/// 64KB of independently addressable bytes, zeroed on creation.
///
/// No region has side effects: banking, echo RAM and I/O registers are left
/// to the surrounding emulator's own `Memory` implementation.
#[derive(Clone)]
pub struct FlatMemory {
	data: [u8; ADDRESS_SPACE_SIZE],
}

impl FlatMemory {
	/// Initialize a zeroed memory.
	pub fn new() -> Self {
		FlatMemory {
			data: [0_u8; ADDRESS_SPACE_SIZE],
		}
	}

	/// Initialize a memory holding the given image at address 0.
	///
	/// Bytes that don't fit in the address space are ignored.
	pub fn from_bytes(image: &[u8]) -> Self {
		let mut mem = FlatMemory::new();
		let len = image.len().min(ADDRESS_SPACE_SIZE);

		mem.data[..len].copy_from_slice(&image[..len]);

		mem
	}
}

impl Default for FlatMemory {
	fn default() -> Self {
		FlatMemory::new()
	}
}

impl Memory for FlatMemory {
	fn write(&mut self, address: u16, value: u8) {
		self.data[address as usize] = value;
	}

	fn read(&self, address: u16) -> u8 {
		self.data[address as usize]
	}
}
