// Copyright 2021 Nir H. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

#![deny(missing_docs)]
//! Gameboy cpu's arithmetic and logic unit.
//!
//! Every operation computes its result from the given operands and updates
//! the flags in the given state. Writing the result back is the caller's job.

use super::state::CpuState;
use super::state::registers::*;

/// Implementation of 8-bit arithmetic operations.
pub mod alu8 {
	use super::*;

	/// The accumulator operations encoded by the `0x80-0xBF` opcode block
	/// and their immediate forms.
	#[derive(Debug, PartialEq, Eq, Clone, Copy)]
	#[allow(missing_docs)]
	pub enum AluOp {
		Add,
		Adc,
		Sub,
		Sbc,
		And,
		Xor,
		Or,
		Cp,
	}

	impl AluOp {
		/// Get the operation encoded by bits 3-5 of an opcode.
		pub fn from_index(index: u8) -> Self {
			match index & 7 {
				0 => AluOp::Add,
				1 => AluOp::Adc,
				2 => AluOp::Sub,
				3 => AluOp::Sbc,
				4 => AluOp::And,
				5 => AluOp::Xor,
				6 => AluOp::Or,
				_ => AluOp::Cp,
			}
		}

		/// Compare operations does not affect the lhs.
		pub fn stores_result(&self) -> bool {
			*self != AluOp::Cp
		}

		/// Applies the operation, updating the flags.
		pub fn apply(&self, state: &mut CpuState, lhs: u8, rhs: u8) -> u8 {
			match self {
				AluOp::Add => add(state, lhs, rhs),
				AluOp::Adc => adc(state, lhs, rhs),
				AluOp::Sub => sub(state, lhs, rhs),
				AluOp::Sbc => sbc(state, lhs, rhs),
				AluOp::And => and(state, lhs, rhs),
				AluOp::Xor => xor(state, lhs, rhs),
				AluOp::Or => or(state, lhs, rhs),
				AluOp::Cp => cp(state, lhs, rhs),
			}
		}
	}

	/// Adds the given arguments, sets the relevant flags accordinately and returns the result.
	pub fn add(state: &mut CpuState, lhs: u8, rhs: u8) -> u8 {
		let result_16 = (lhs as u16).wrapping_add(rhs as u16);
		let result_8 = (lhs & 0x0F).wrapping_add(rhs & 0x0F);

		let result: u8 = (result_16 & 0xFF) as u8;

		state.set_flags(result == 0, false, result_8 > 0x0F, result_16 > 0xFF);

		result
	}

	/// Adds the given arguments and the carry flag, if set.
	/// The function sets the relevant flags accordinately and returns the result.
	pub fn adc(state: &mut CpuState, lhs: u8, rhs: u8) -> u8 {
		let carry = state.flag(Flag::C) as u8;

		let result_16 = (lhs as u16).wrapping_add(rhs as u16).wrapping_add(carry as u16);
		let result_8 = (lhs & 0x0F).wrapping_add(rhs & 0x0F).wrapping_add(carry);

		let result: u8 = (result_16 & 0xFF) as u8;

		state.set_flags(result == 0, false, result_8 > 0x0F, result_16 > 0xFF);

		result
	}

	/// Subtracts the given arguments, sets the relevant flags accordinately and returns the result.
	pub fn sub(state: &mut CpuState, lhs: u8, rhs: u8) -> u8 {
		let result: u8 = lhs.wrapping_sub(rhs);

		state.set_flags(result == 0, true, (lhs & 0x0F) < (rhs & 0x0F), lhs < rhs);

		result
	}

	/// Subtracts with carry, sets the relevant flags accordinately and returns the result.
	pub fn sbc(state: &mut CpuState, lhs: u8, rhs: u8) -> u8 {
		let carry = state.flag(Flag::C) as u16;

		let result_16 = (lhs as u16).wrapping_sub(rhs as u16).wrapping_sub(carry);
		let result: u8 = (result_16 & 0xFF) as u8;

		let half = ((lhs & 0x0F) as u16) < ((rhs & 0x0F) as u16) + carry;
		let full = (lhs as u16) < (rhs as u16) + carry;

		state.set_flags(result == 0, true, half, full);

		result
	}

	/// Performs logical AND between the given arguments,
	/// sets the relevant flags accordinately and returns the result.
	///
	/// The half-carry flag is always set by this operation.
	pub fn and(state: &mut CpuState, lhs: u8, rhs: u8) -> u8 {
		let result: u8 = lhs & rhs;

		state.set_flags(result == 0, false, true, false);

		result
	}

	/// Performs logical OR between the given arguments,
	/// sets the relevant flags accordinately and returns the result.
	pub fn or(state: &mut CpuState, lhs: u8, rhs: u8) -> u8 {
		let result: u8 = lhs | rhs;

		state.set_flags(result == 0, false, false, false);

		result
	}

	/// Performs xor, sets the relevant flags accordinately and returns the result.
	pub fn xor(state: &mut CpuState, lhs: u8, rhs: u8) -> u8 {
		let result: u8 = lhs ^ rhs;

		state.set_flags(result == 0, false, false, false);

		result
	}

	/// Compares the given arguments and sets the relevant flags accordinately.
	pub fn cp(state: &mut CpuState, lhs: u8, rhs: u8) -> u8 {
		// Compare is basically subtraction.
		sub(state, lhs, rhs)
	}

	/// Increments the given value. The carry flag is not affected.
	pub fn inc(state: &mut CpuState, value: u8) -> u8 {
		// Save the current carry flag.
		let old_carry = state.flag(Flag::C);

		let result = add(state, value, 1);

		// Restore carry because inc shouldn't affect it.
		state.set_flag(Flag::C, old_carry);

		result
	}

	/// Decrements the given value. The carry flag is not affected.
	pub fn dec(state: &mut CpuState, value: u8) -> u8 {
		let old_carry = state.flag(Flag::C);

		let result = sub(state, value, 1);

		state.set_flag(Flag::C, old_carry);

		result
	}

	/// Swaps the lower and highr nibble of the given value,
	/// and sets the relevant flags accordinately.
	pub fn swap(state: &mut CpuState, value: u8) -> u8 {
		let result: u8 = ((value & 0x0F) << 4) |
						 ((value & 0xF0) >> 4);

		state.set_flags(result == 0, false, false, false);

		result
	}

	/// Rotates right the given register, possibly rotates the carry
	/// flag too (if !carry, the carry flag will hold bit 0's result, but
	/// bit 0 will move also to bit 7).
	pub fn rotate_right(state: &mut CpuState, value: u8, carry: bool) -> u8 {
		let old_carry = state.flag(Flag::C);
		let new_carry = (value & 1) == 1;

		let mut result = value >> 1;

		if carry {
			result |= if old_carry { 0x80 } else { 0 };
		} else {
			result |= if new_carry { 0x80 } else { 0 };
		}

		state.set_flags(result == 0, false, false, new_carry);

		result
	}

	/// Rotates left the given register, possibly rotates the carry
	/// flag too (if !carry, the carry flag will hold bit 7's result, but
	/// bit 7 will move also to bit 0).
	pub fn rotate_left(state: &mut CpuState, value: u8, carry: bool) -> u8 {
		let old_carry = state.flag(Flag::C);
		let new_carry = (value & 0x80) != 0;

		let mut result = value << 1;

		if carry {
			result |= if old_carry { 1 } else { 0 };
		} else {
			result |= if new_carry { 1 } else { 0 };
		}

		state.set_flags(result == 0, false, false, new_carry);

		result
	}

	/// Shifts right the given register. If logic (not arithmetic),
	/// the MSB shifts too, otherwise, the MSB stays the same.
	pub fn shift_right(state: &mut CpuState, value: u8, logic: bool) -> u8 {
		let old_msb = value & 0x80;
		let new_carry = (value & 1) == 1;

		let mut result: u8 = value >> 1;

		if !logic {
			result |= old_msb;
		}

		state.set_flags(result == 0, false, false, new_carry);

		result
	}

	/// Shifts left the given register.
	pub fn shift_left(state: &mut CpuState, value: u8) -> u8 {
		let new_carry = (value & 0x80) != 0;

		let result = value << 1;

		state.set_flags(result == 0, false, false, new_carry);

		result
	}

	/// Tests a single bit of the given value. The carry flag is not affected.
	pub fn bit(state: &mut CpuState, bit: u8, value: u8) {
		state.set_flag(Flag::Z, (value >> (bit & 7)) & 1 == 0);
		state.set_flag(Flag::N, false);
		state.set_flag(Flag::H, true);
	}

	/// Adjusts the accumulator to a valid packed BCD value after
	/// an addition or a subtraction.
	pub fn daa(state: &mut CpuState, value: u8) -> u8 {
		let subtract = state.flag(Flag::N);
		let half = state.flag(Flag::H);
		let mut carry = state.flag(Flag::C);

		let mut result = value;

		if !subtract {
			if carry || result > 0x99 {
				result = result.wrapping_add(0x60);
				carry = true;
			}
			if half || (result & 0x0F) > 0x09 {
				result = result.wrapping_add(0x06);
			}
		} else {
			if carry {
				result = result.wrapping_sub(0x60);
			}
			if half {
				result = result.wrapping_sub(0x06);
			}
		}

		state.set_flags(result == 0, subtract, false, carry);

		result
	}

}

/// Implementation of 16-bit arithmetic operations.
pub mod alu16 {
	use super::*;

	/// Adds the given arguments, sets the relevant flags accordinately and returns the result.
	/// In this operation, the zero flag is not affected.
	pub fn add_hl(state: &mut CpuState, lhs: u16, rhs: u16) -> u16 {
		let result_32 = (lhs as u32).wrapping_add(rhs as u32);
		let result_16 = (lhs & 0x0FFF).wrapping_add(rhs & 0x0FFF);

		let result: u16 = (result_32 & 0xFFFF) as u16;

		// Set the relevant flags (the zero flag is not affected)
		state.set_flag(Flag::N, false);
		state.set_flag(Flag::H, result_16 > 0x0FFF);
		state.set_flag(Flag::C, result_32 > 0xFFFF);

		result
	}

	/// Adds a signed 8-bit offset to the stack pointer's value.
	///
	/// The half-carry and carry flags are computed on the unsigned addition
	/// of the low byte, while the zero and subtract flags are cleared.
	pub fn add_sp_offset(state: &mut CpuState, sp: u16, offset: i8) -> u16 {
		let unsigned = offset as u8 as u16;

		let half = (sp & 0x000F) + (unsigned & 0x000F) > 0x000F;
		let carry = (sp & 0x00FF) + unsigned > 0x00FF;

		state.set_flags(false, false, half, carry);

		sp.wrapping_add(offset as i16 as u16)
	}

	#[cfg(test)]
	mod tests {
		use super::*;
		use crate::config::Config;

		#[test]
		fn test_add_hl_keeps_zero() {
			let mut s = CpuState::new(&Config::default());
			s.set_flags(true, true, false, false);

			assert_eq!(0x1000, add_hl(&mut s, 0x0FFF, 0x0001));
			assert!(s.flag(Flag::Z));
			assert!(!s.flag(Flag::N));
			assert!(s.flag(Flag::H));
			assert!(!s.flag(Flag::C));

			assert_eq!(0x0000, add_hl(&mut s, 0x8000, 0x8000));
			assert!(s.flag(Flag::C));
			assert!(!s.flag(Flag::H));
		}

		#[test]
		fn test_add_sp_offset() {
			let mut s = CpuState::new(&Config::default());

			assert_eq!(0xFFFD, add_sp_offset(&mut s, 0xFFFE, -1));
			// 0xFE + 0xFF carries out of both the nibble and the byte.
			assert!(s.flag(Flag::H));
			assert!(s.flag(Flag::C));
			assert!(!s.flag(Flag::Z));

			assert_eq!(0x0010, add_sp_offset(&mut s, 0x0008, 8));
			assert!(s.flag(Flag::H));
			assert!(!s.flag(Flag::C));
		}
	}
}
