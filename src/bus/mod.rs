// Copyright 2021 Nir H. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

#![deny(missing_docs)]
//! Emulate the gameboy's address space and bus access.

pub mod ram;

pub use ram::FlatMemory;

/// Bus locations-related constants.
#[allow(missing_docs)]
pub mod consts {
	/// The number of addressable bytes.
	pub const ADDRESS_SPACE_SIZE: usize = 0x10000;
	/// The base address of the `ldh` instructions' high page.
	pub const HIGH_PAGE: u16 = 0xFF00;
}

/// A peripheral that can be written and read by the cpu.
///
/// Both operations are total over the 16-bit address space, so none of them
/// can fail. Words are stored in little-endian, and the address of a word's
/// high byte wraps around at the top of the address space.
pub trait Memory {
	/// Write a 8-bit value to the peripheral.
	///
	/// * `address` - The absolute memory address to write into.
	/// * `value` - The value to write.
	fn write(&mut self, address: u16, value: u8);

	/// Read a 8-bit value from this peripheral.
	///
	/// * `address` - The absolute memory address to read from.
	fn read(&self, address: u16) -> u8;

	/// Read a little-endian 16-bit value.
	fn read_word(&self, address: u16) -> u16 {
		let low = self.read(address) as u16;
		let high = self.read(address.wrapping_add(1)) as u16;

		(high << 8) | low
	}

	/// Write a little-endian 16-bit value.
	fn write_word(&mut self, address: u16, value: u16) {
		self.write(address, (value & 0xFF) as u8);
		self.write(address.wrapping_add(1), ((value >> 8) & 0xFF) as u8);
	}

	/// Writes the complete array's bytes starting at the given address.
	fn write_all(&mut self, address: u16, array: &[u8]) {
		for (index, value) in array.iter().enumerate() {
			self.write(address.wrapping_add(index as u16), *value);
		}
	}
}
