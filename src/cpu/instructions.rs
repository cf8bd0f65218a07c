// Copyright 2021 Nir H. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

#![deny(missing_docs)]
//! Implementation of the Z80-like cpu's instructions.

use super::Cpu;
use super::alu::*;
use super::decode::*;
use super::state::PowerState;
use super::state::registers::*;

use crate::bus::Memory;
use crate::bus::consts::HIGH_PAGE;

/// The number of clock cycles an instruction has taken.
pub type Cycles = usize;

/// Internal utilities for implementing repeating logic once.
mod util {
	use super::*;

	/// Reads an 8-bit operand. Immediates are fetched from the instruction stream.
	pub fn read_operand<M: Memory>(cpu: &mut Cpu<M>, operand: Operand8) -> u8 {
		match operand {
			Operand8::Reg(reg) => {
				debug_assert!(get_type(&reg) != RegisterType::Wide);
				cpu.registers.get(reg) as u8
			},
			Operand8::MemHL => {
				let address = cpu.registers.get(Register::HL);
				cpu.mmap.read(address)
			},
			Operand8::Imm => cpu.fetch(),
		}
	}

	/// Writes an 8-bit operand.
	pub fn write_operand<M: Memory>(cpu: &mut Cpu<M>, operand: Operand8, value: u8) {
		match operand {
			Operand8::Reg(reg) => {
				debug_assert!(get_type(&reg) != RegisterType::Wide);
				cpu.registers.set(reg, value as u16);
			},
			Operand8::MemHL => {
				let address = cpu.registers.get(Register::HL);
				cpu.mmap.write(address, value);
			},
			Operand8::Imm => debug_assert!(false, "an immediate can't be written"),
		}
	}

	/// The extra cycles an 8-bit operand costs on top of a register access.
	pub fn operand_cycles(operand: Operand8) -> Cycles {
		match operand {
			Operand8::Reg(_) => 0,
			Operand8::MemHL | Operand8::Imm => 4,
		}
	}

	/// `ldh` with an immediate offset takes an extra fetch.
	pub fn operand_cycles_high(offset: HighOffset) -> Cycles {
		match offset {
			HighOffset::Imm => 4,
			HighOffset::C => 0,
		}
	}

	/// Returns the address an indirect access refers to, and applies
	/// the post increment/decrement of HL.
	pub fn indirect_address<M: Memory>(cpu: &mut Cpu<M>, indirect: Indirect) -> u16 {
		match indirect {
			Indirect::BC => cpu.registers.get(Register::BC),
			Indirect::DE => cpu.registers.get(Register::DE),
			Indirect::HLInc => {
				let address = cpu.registers.get(Register::HL);
				cpu.registers.set(Register::HL, address.wrapping_add(1));
				address
			},
			Indirect::HLDec => {
				let address = cpu.registers.get(Register::HL);
				cpu.registers.set(Register::HL, address.wrapping_sub(1));
				address
			},
		}
	}

	/// Returns the address of a high page access.
	pub fn high_address<M: Memory>(cpu: &mut Cpu<M>, offset: HighOffset) -> u16 {
		let low_byte: u16 = match offset {
			HighOffset::Imm => cpu.fetch::<u8>() as u16,
			HighOffset::C => cpu.registers.get(Register::C),
		};

		HIGH_PAGE | low_byte
	}

	/// Reads a signed 8-bit displacement from the instruction stream.
	pub fn fetch_offset<M: Memory>(cpu: &mut Cpu<M>) -> i8 {
		cpu.fetch::<u8>() as i8
	}

	/// Relative jump. The displacement is consumed even when the
	/// condition doesn't hold.
	pub fn jump_relative<M: Memory>(cpu: &mut Cpu<M>, condition: Condition) -> Cycles {
		let offset: i8 = fetch_offset(cpu);
		let address: u16 = cpu.registers.get(Register::PC);

		if condition.holds(&cpu.registers) {
			// Add the offset to the program counter (preserving the offset's sign)
			cpu.registers.set(Register::PC, address.wrapping_add((offset as i16) as u16));
			12
		} else {
			8
		}
	}

	/// Absolute jump. Both address bytes are always consumed.
	pub fn jump_absolute<M: Memory>(cpu: &mut Cpu<M>, condition: Condition) -> Cycles {
		let dest: u16 = cpu.fetch();

		if condition.holds(&cpu.registers) {
			cpu.registers.set(Register::PC, dest);
			16
		} else {
			12
		}
	}

	/// Pushes the address of the next instruction and jumps to the given one.
	pub fn call<M: Memory>(cpu: &mut Cpu<M>, condition: Condition) -> Cycles {
		let dest: u16 = cpu.fetch();

		if condition.holds(&cpu.registers) {
			let return_address = cpu.registers.get(Register::PC);
			cpu.push(return_address);
			cpu.registers.set(Register::PC, dest);
			24
		} else {
			12
		}
	}

	/// Pops the program counter if the condition holds.
	pub fn ret<M: Memory>(cpu: &mut Cpu<M>, condition: Condition) -> Cycles {
		if condition.holds(&cpu.registers) {
			let address = cpu.pop();
			cpu.registers.set(Register::PC, address);

			// Unconditional returns skip the condition check.
			if condition == Condition::Always { 16 } else { 20 }
		} else {
			8
		}
	}

	/// Places a 16-bit register on the stack.
	pub fn push_nn<M: Memory>(cpu: &mut Cpu<M>, reg: Register) -> Cycles {
		debug_assert!(get_type(&reg) == RegisterType::Wide);

		let value: u16 = cpu.registers.get(reg);
		cpu.push(value);

		16
	}

	/// Pops a 16-bit register from the stack. Popping into AF drops the
	/// flag register's lower nibble.
	pub fn pop_nn<M: Memory>(cpu: &mut Cpu<M>, reg: Register) -> Cycles {
		debug_assert!(get_type(&reg) == RegisterType::Wide);

		let value = cpu.pop();
		cpu.registers.set(reg, value);

		12
	}

	/// Applies a 0xCB-prefixed rotate or shift to the given value.
	pub fn shift<M: Memory>(cpu: &mut Cpu<M>, op: ShiftOp, value: u8) -> u8 {
		let state = &mut cpu.registers;

		match op {
			ShiftOp::Rlc => alu8::rotate_left(state, value, false),
			ShiftOp::Rrc => alu8::rotate_right(state, value, false),
			ShiftOp::Rl => alu8::rotate_left(state, value, true),
			ShiftOp::Rr => alu8::rotate_right(state, value, true),
			ShiftOp::Sla => alu8::shift_left(state, value),
			ShiftOp::Sra => alu8::shift_right(state, value, false),
			ShiftOp::Swap => alu8::swap(state, value),
			ShiftOp::Srl => alu8::shift_right(state, value, true),
		}
	}

	/// Rotates the accumulator. Unlike the 0xCB-prefixed rotates,
	/// the zero flag is always cleared.
	pub fn rotate_a<M: Memory>(cpu: &mut Cpu<M>, left: bool, carry: bool) -> Cycles {
		let value = cpu.registers.get(Register::A) as u8;

		let result = if left {
			alu8::rotate_left(&mut cpu.registers, value, carry)
		} else {
			alu8::rotate_right(&mut cpu.registers, value, carry)
		};

		cpu.registers.set(Register::A, result as u16);
		cpu.registers.set_flag(Flag::Z, false);

		4
	}
}

use util::*;

impl<'a, M: Memory> Cpu<'a, M> {
	/// Executes a decoded instruction, whose opcode was already fetched.
	///
	/// Returns the number of clock cycles taken.
	pub fn execute_instruction(&mut self, insn: Instruction) -> Cycles {
		match insn {
			Instruction::Nop => 4,

			Instruction::Stop => {
				// The opcode is followed by a padding byte.
				let _: u8 = self.fetch();
				self.registers.power = PowerState::Stopped;
				log::debug!("cpu stopped");
				4
			},

			Instruction::Halt => {
				self.registers.power = PowerState::Halted;
				log::debug!("cpu halted");
				4
			},

			Instruction::Ld8 { dst, src } => {
				let value = read_operand(self, src);
				write_operand(self, dst, value);

				4 + operand_cycles(src) + operand_cycles(dst)
			},

			Instruction::Ld16Imm(reg) => {
				let value: u16 = self.fetch();
				self.registers.set(reg, value);
				12
			},

			Instruction::StoreIndirect(indirect) => {
				let value = self.registers.get(Register::A) as u8;
				let address = indirect_address(self, indirect);
				self.mmap.write(address, value);
				8
			},

			Instruction::LoadIndirect(indirect) => {
				let address = indirect_address(self, indirect);
				let value = self.mmap.read(address);
				self.registers.set(Register::A, value as u16);
				8
			},

			Instruction::StoreSp => {
				let address: u16 = self.fetch();
				let value = self.registers.get(Register::SP);
				self.mmap.write_word(address, value);
				20
			},

			Instruction::LdSpHl => {
				let value = self.registers.get(Register::HL);
				self.registers.set(Register::SP, value);
				8
			},

			Instruction::LdHlSpOffset => {
				let offset = fetch_offset(self);
				let sp = self.registers.get(Register::SP);
				let result = alu16::add_sp_offset(&mut self.registers, sp, offset);
				self.registers.set(Register::HL, result);
				12
			},

			Instruction::StoreAbsolute => {
				let address: u16 = self.fetch();
				let value = self.registers.get(Register::A) as u8;
				self.mmap.write(address, value);
				16
			},

			Instruction::LoadAbsolute => {
				let address: u16 = self.fetch();
				let value = self.mmap.read(address);
				self.registers.set(Register::A, value as u16);
				16
			},

			Instruction::StoreHigh(offset) => {
				let address = high_address(self, offset);
				let value = self.registers.get(Register::A) as u8;
				self.mmap.write(address, value);
				8 + operand_cycles_high(offset)
			},

			Instruction::LoadHigh(offset) => {
				let address = high_address(self, offset);
				let value = self.mmap.read(address);
				self.registers.set(Register::A, value as u16);
				8 + operand_cycles_high(offset)
			},

			Instruction::Inc8(operand) => {
				let value = read_operand(self, operand);
				let result = alu8::inc(&mut self.registers, value);
				write_operand(self, operand, result);
				4 + 2 * operand_cycles(operand)
			},

			Instruction::Dec8(operand) => {
				let value = read_operand(self, operand);
				let result = alu8::dec(&mut self.registers, value);
				write_operand(self, operand, result);
				4 + 2 * operand_cycles(operand)
			},

			Instruction::Inc16(reg) => {
				let value = self.registers.get(reg);
				self.registers.set(reg, value.wrapping_add(1));
				8
			},

			Instruction::Dec16(reg) => {
				let value = self.registers.get(reg);
				self.registers.set(reg, value.wrapping_sub(1));
				8
			},

			Instruction::AddHl(reg) => {
				let left = self.registers.get(Register::HL);
				let right = self.registers.get(reg);
				let result = alu16::add_hl(&mut self.registers, left, right);
				self.registers.set(Register::HL, result);
				8
			},

			Instruction::AddSpOffset => {
				let offset = fetch_offset(self);
				let sp = self.registers.get(Register::SP);
				let result = alu16::add_sp_offset(&mut self.registers, sp, offset);
				self.registers.set(Register::SP, result);
				16
			},

			Instruction::Alu(op, operand) => {
				let left = self.registers.get(Register::A) as u8;
				let right = read_operand(self, operand);
				let result = op.apply(&mut self.registers, left, right);

				if op.stores_result() {
					self.registers.set(Register::A, result as u16);
				}

				4 + operand_cycles(operand)
			},

			Instruction::Rlca => rotate_a(self, true, false),
			Instruction::Rrca => rotate_a(self, false, false),
			Instruction::Rla => rotate_a(self, true, true),
			Instruction::Rra => rotate_a(self, false, true),

			Instruction::Daa => {
				let value = self.registers.get(Register::A) as u8;
				let result = alu8::daa(&mut self.registers, value);
				self.registers.set(Register::A, result as u16);
				4
			},

			Instruction::Cpl => {
				let value = self.registers.get(Register::A) as u8;
				self.registers.set(Register::A, !value as u16);
				self.registers.set_flag(Flag::N, true);
				self.registers.set_flag(Flag::H, true);
				4
			},

			Instruction::Scf => {
				self.registers.set_flag(Flag::N, false);
				self.registers.set_flag(Flag::H, false);
				self.registers.set_flag(Flag::C, true);
				4
			},

			Instruction::Ccf => {
				let carry = self.registers.flag(Flag::C);
				self.registers.set_flag(Flag::N, false);
				self.registers.set_flag(Flag::H, false);
				self.registers.set_flag(Flag::C, !carry);
				4
			},

			Instruction::Jr(condition) => jump_relative(self, condition),
			Instruction::Jp(condition) => jump_absolute(self, condition),

			Instruction::JpHl => {
				let dest = self.registers.get(Register::HL);
				self.registers.set(Register::PC, dest);
				4
			},

			Instruction::Call(condition) => call(self, condition),
			Instruction::Ret(condition) => ret(self, condition),

			Instruction::Reti => {
				let cycles = ret(self, Condition::Always);
				self.registers.ime = true;
				self.registers.ime_pending = false;
				cycles
			},

			Instruction::Rst(target) => {
				let return_address = self.registers.get(Register::PC);
				self.push(return_address);
				self.registers.set(Register::PC, target);
				16
			},

			Instruction::Push(reg) => push_nn(self, reg),
			Instruction::Pop(reg) => pop_nn(self, reg),

			Instruction::Di => {
				self.registers.ime = false;
				self.registers.ime_pending = false;
				4
			},

			Instruction::Ei => {
				self.registers.ime_pending = true;
				4
			},

			Instruction::Shift(op, operand) => {
				let value = read_operand(self, operand);
				let result = shift(self, op, value);
				write_operand(self, operand, result);
				8 + 2 * operand_cycles(operand)
			},

			Instruction::Bit(bit, operand) => {
				let value = read_operand(self, operand);
				alu8::bit(&mut self.registers, bit, value);
				8 + operand_cycles(operand)
			},

			Instruction::Res(bit, operand) => {
				let value = read_operand(self, operand);
				write_operand(self, operand, value & !(1 << bit));
				8 + 2 * operand_cycles(operand)
			},

			Instruction::Set(bit, operand) => {
				let value = read_operand(self, operand);
				write_operand(self, operand, value | (1 << bit));
				8 + 2 * operand_cycles(operand)
			},
		}
	}
}
