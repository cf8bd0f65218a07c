// Copyright 2021 Nir H. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

#![deny(missing_docs)]
//! Gameboy's processor emulation.

pub mod state;
pub mod decode;
pub mod instructions;
pub mod alu;

use num::{PrimInt, Unsigned};
use core::mem::size_of;

use state::*;
use state::registers::*;
use decode::Instruction;

use crate::bus::*;
use crate::GameboyError;
use crate::config::Config;

/// The number of cycles that pass on every step while the cpu is suspended.
const IDLE_CYCLES: usize = 4;

/// The gameboy's processor.
///
/// The processor owns the memory it's bound to for its entire lifetime.
pub struct Cpu<'a, M: Memory> {
	/// The cpu's registers.
	registers: CpuState,
	/// The devices' memory mapping
	pub mmap: M,
	/// The emulator's configuration
	pub config: &'a Config,
}

impl<'a, M: Memory> Cpu<'a, M> {
	/// Initializes a new virtual cpu, in its boot state.
	#[inline(always)]
	pub fn new(config: &'a Config, mmap: M) -> Self {
		Cpu {
			registers: CpuState::new(config),
			mmap,
			config,
		}
	}

	/// Resets the processor to the model's boot state.
	///
	/// The memory is left untouched.
	pub fn reset(&mut self) {
		self.registers.reset(self.config);

		log::debug!("cpu reset, model: {:?}", self.config.model);
	}

	/// The processor's registers.
	pub fn registers(&self) -> &CpuState {
		&self.registers
	}

	/// Mutable access to the processor's registers.
	pub fn registers_mut(&mut self) -> &mut CpuState {
		&mut self.registers
	}

	/// The memory the processor is bound to.
	pub fn memory(&self) -> &M {
		&self.mmap
	}

	/// Mutable access to the bound memory.
	pub fn memory_mut(&mut self) -> &mut M {
		&mut self.mmap
	}

	/// Whether `halt` or `stop` suspended the processor.
	pub fn power_state(&self) -> PowerState {
		self.registers.power_state()
	}

	/// The interrupt master enable flag.
	pub fn interrupts_enabled(&self) -> bool {
		self.registers.interrupts_enabled()
	}

	/// Whether the cpu is waiting for an interrupt after `halt` or `stop`.
	pub fn is_halted(&self) -> bool {
		self.registers.power != PowerState::Running
	}

	/// Resumes execution after `halt` or `stop`.
	///
	/// This is the hook for the interrupt controller, which should call it once
	/// an enabled interrupt is requested (regardless of the master enable flag).
	pub fn wake(&mut self) {
		if self.is_halted() {
			log::debug!("cpu woken from {:?}", self.registers.power);
			self.registers.power = PowerState::Running;
		}
	}

	/// Reads the next instruction bytes and increments the program counter appropriately.
	///
	/// The function works in little-endian, that is, when reading 2 bytes,
	/// the first byte will be the least-significant one.
	pub fn fetch<T: PrimInt + Unsigned + From<u8>>(&mut self) -> T {
		let mut result: T = T::zero();

		for i in 0..size_of::<T>() {
			// Read the next byte.
			let pc: u16 = self.registers.get(Register::PC);
			let data: T = <T as From<u8>>::from(self.mmap.read(pc));

			// We're using little-endianity.
			result = result | (data << (8 * i));

			// Move the PC forward.
			self.registers.set(Register::PC, pc.wrapping_add(1));
		}

		result
	}

	/// Emulates the execution of a single instruction.
	///
	/// Returns the number of clock cycles the instruction has taken. While the
	/// cpu is halted nothing is fetched, and the idle cycles are returned.
	///
	/// On error, the processor's state is left unchanged.
	pub fn execute(&mut self) -> Result<usize, GameboyError> {
		if self.is_halted() {
			return Ok(IDLE_CYCLES);
		}

		// An `ei` executed by the previous instruction takes effect after this one.
		let enable_interrupts = self.registers.ime_pending;
		let pc: u16 = self.registers.get(Register::PC);

		// Fetch the opcode from the memory.
		let opcode: u8 = self.fetch();

		// Decode the given opcode.
		let insn: Instruction = match self.decode(opcode) {
			Ok(insn) => insn,
			Err(err) => {
				self.registers.set(Register::PC, pc);
				return Err(err);
			},
		};

		log::trace!("{:04x}: {:?}", pc, insn);

		// Execute and return the number of cycles taken.
		let num_cycles = self.execute_instruction(insn);

		if enable_interrupts && self.registers.ime_pending {
			self.registers.ime = true;
			self.registers.ime_pending = false;
		}

		Ok(num_cycles)
	}

	/// Places a 16-bit value on the stack.
	pub fn push(&mut self, value: u16) {
		let address = self.registers.get(Register::SP).wrapping_sub(2);

		self.registers.set(Register::SP, address);
		self.mmap.write_word(address, value);
	}

	/// Pops a 16-bit value from the stack.
	pub fn pop(&mut self) -> u16 {
		let address = self.registers.get(Register::SP);
		let value = self.mmap.read_word(address);

		self.registers.set(Register::SP, address.wrapping_add(2));

		value
	}
}
