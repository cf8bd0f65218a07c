// Copyright 2021 Nir H. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Gameboy's processor state.

use crate::config::{Config, HardwareModel};
use registers::*;

#[allow(missing_docs)]
pub mod registers {
	/// The number of 8-bit registers.
	pub const NUM_REGS: usize = 8;

	/// The 8-bit registers are stored independently, in `A F B C D E H L` order.
	/// Wide registers (except SP and PC) are views over two adjacent entries.
	pub type RegisterFile = [u8; NUM_REGS];

	/// The flag register's lower nibble is hardwired to zero.
	pub const FLAGS_MASK: u8 = 0xF0;

	#[derive(Debug, PartialEq, Eq, Clone, Copy)]
	pub enum Register {
		/// Accumulator and Flag registers
		A, F, AF,
		B, C, BC,
		D, E, DE,
		/// Indirect access register
		H, L, HL,
		/// Stack pointer
		SP,
		/// Program counter
		PC,
	}

	/// The register's "type" is essentially the internal representation
	/// of the virtual register within the register file.
	#[derive(Debug, PartialEq, Eq)]
	pub enum RegisterType {
		Wide,
		Low8,
		High8,
	}

	pub fn get_type(reg: &Register) -> RegisterType {
		match reg {
			Register::A |
			Register::B |
			Register::D |
			Register::H => RegisterType::High8,

			Register::F |
			Register::C |
			Register::E |
			Register::L => RegisterType::Low8,

			Register::AF |
			Register::BC |
			Register::DE |
			Register::HL |
			Register::SP |
			Register::PC => RegisterType::Wide,
		}
	}

	/// Get the index of the high and low halves of a given register within
	/// the register file. SP and PC are stored separately.
	pub fn get_index(reg: &Register) -> Option<(usize, usize)> {
		match reg {
			Register::A | Register::F | Register::AF => Some((0, 1)),
			Register::B | Register::C | Register::BC => Some((2, 3)),
			Register::D | Register::E | Register::DE => Some((4, 5)),
			Register::H | Register::L | Register::HL => Some((6, 7)),
			Register::SP | Register::PC => None,
		}
	}

	/// The flag register encodes the following flags within
	/// the register's bits.
	#[derive(Debug, PartialEq, Eq, Clone, Copy)]
	pub enum Flag {
		/// Carry flag
		C = 4,
		/// Half-Carry flag
		H = 5,
		/// Subtract flag
		N = 6,
		/// Zero flag
		Z = 7,
	}
}

/// Whether the processor is currently fetching instructions.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum PowerState {
	/// Executing instructions normally.
	Running,
	/// Suspended by `halt` until an interrupt wakes the cpu.
	Halted,
	/// Suspended by `stop` until a joypad interrupt wakes the cpu.
	Stopped,
}

/// Structure holding the current processor state.
#[derive(Debug, Clone)]
pub struct CpuState {
	regs: RegisterFile,
	sp: u16,
	pc: u16,
	/// Interrupt master enable.
	pub(crate) ime: bool,
	/// Set by `ei`, which takes effect only after the following instruction.
	pub(crate) ime_pending: bool,
	pub(crate) power: PowerState,
}

impl CpuState {
	/// Initializes a new cpu state
	pub fn new(config: &Config) -> Self {
		let mut state = CpuState {
			regs: [0; NUM_REGS],
			sp: 0,
			pc: 0,
			ime: false,
			ime_pending: false,
			power: PowerState::Running,
		};

		// Reset the registers.
		state.reset(config);

		state
	}

	/// Reset registers to their initial boot state.
	pub fn reset(&mut self, config: &Config) {
		self.set(Register::F, 0xB0);
		self.set(Register::BC, 0x0013);
		self.set(Register::DE, 0x00D8);
		self.set(Register::HL, 0x014D);
		self.set(Register::SP, 0xFFFE);
		self.set(Register::PC, 0x0100);

		match config.model {
			HardwareModel::GB | HardwareModel::SGB => {
				self.set(Register::A, 0x01);
			},
			HardwareModel::GBC => {
				self.set(Register::A, 0x11);
			},
			HardwareModel::GBP => {
				self.set(Register::A, 0xFF);
			},
		}

		self.ime = false;
		self.ime_pending = false;
		self.power = PowerState::Running;
	}

	/// Writes a value to a given register.
	///
	/// * `reg` - The register file identifier to write into.
	/// * `value` - The value to write. In cases of 8-bit register,
	///     the higher 8 bits will be discarded.
	///
	/// The lower nibble of the flag register always reads as zero,
	/// whether it's written through F or AF.
	pub fn set(&mut self, reg: Register, value: u16) {
		let mask = |index: usize, byte: u8| -> u8 {
			if index == 1 { byte & FLAGS_MASK } else { byte }
		};

		match (get_index(&reg), get_type(&reg)) {
			(None, _) => {
				if reg == Register::SP {
					self.sp = value;
				} else {
					self.pc = value;
				}
			},
			(Some((high, low)), RegisterType::Wide) => {
				self.regs[high] = mask(high, (value >> 8) as u8);
				self.regs[low] = mask(low, (value & 0xFF) as u8);
			},
			(Some((high, _)), RegisterType::High8) => {
				self.regs[high] = mask(high, (value & 0xFF) as u8);
			},
			(Some((_, low)), RegisterType::Low8) => {
				self.regs[low] = mask(low, (value & 0xFF) as u8);
			},
		}
	}

	/// Reads the given register.
	pub fn get(&self, reg: Register) -> u16 {
		match (get_index(&reg), get_type(&reg)) {
			(None, _) => {
				if reg == Register::SP { self.sp } else { self.pc }
			},
			(Some((high, low)), RegisterType::Wide) => {
				((self.regs[high] as u16) << 8) | (self.regs[low] as u16)
			},
			(Some((high, _)), RegisterType::High8) => self.regs[high] as u16,
			(Some((_, low)), RegisterType::Low8) => self.regs[low] as u16,
		}
	}

	/// Returns the state of the given cpu flag, as stored in
	/// the 'F' register.
	pub fn flag(&self, flag: Flag) -> bool {
		let flags_value: u16 = self.get(Register::F);

		// Check whether the relevant bit is on
		((flags_value >> flag as u8) & 1) == 1
	}

	/// Sets the state of the given cpu flag, as stored in
	/// the 'F' register.
	pub fn set_flag(&mut self, flag: Flag, value: bool) {
		let old_flags: u16 = self.get(Register::F);

		let new_flags = if value {
			// Turn on the relevant bit
			old_flags | (1 << (flag as u8))
		} else {
			// Turn off the relevant bit
			old_flags & !(1 << (flag as u8))
		};

		self.set(Register::F, new_flags);
	}

	/// Overwrites all four flags at once.
	pub fn set_flags(&mut self, z: bool, n: bool, h: bool, c: bool) {
		let value = ((z as u16) << Flag::Z as u8) |
					((n as u16) << Flag::N as u8) |
					((h as u16) << Flag::H as u8) |
					((c as u16) << Flag::C as u8);

		self.set(Register::F, value);
	}

	/// Whether the interrupt master enable flag is set.
	pub fn interrupts_enabled(&self) -> bool {
		self.ime
	}

	/// The processor's power state.
	pub fn power_state(&self) -> PowerState {
		self.power
	}
}
