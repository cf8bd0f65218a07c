// Copyright 2021 Nir H. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

#![deny(missing_docs)]
//! Gameboy cpu's opcode decoder.
//!
//! Opcodes are decoded into an [`Instruction`], a plain descriptor naming the
//! operation and the registers it works on. Most of the instruction set is
//! laid out in regular blocks, where bits 0-2 and 3-5 of the opcode select
//! an 8-bit operand in `B C D E H L (HL) A` order.

use super::Cpu;
use super::alu::alu8::AluOp;
use super::state::CpuState;
use super::state::registers::*;

use crate::bus::Memory;
use crate::GameboyError;

/// An 8-bit operand.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Operand8 {
	/// One of the 8-bit registers.
	Reg(Register),
	/// The byte pointed by HL.
	MemHL,
	/// The byte that follows the opcode.
	Imm,
}

impl Operand8 {
	/// Get the operand encoded by a 3-bit opcode field.
	pub fn from_index(index: u8) -> Self {
		match index & 7 {
			0 => Operand8::Reg(Register::B),
			1 => Operand8::Reg(Register::C),
			2 => Operand8::Reg(Register::D),
			3 => Operand8::Reg(Register::E),
			4 => Operand8::Reg(Register::H),
			5 => Operand8::Reg(Register::L),
			6 => Operand8::MemHL,
			_ => Operand8::Reg(Register::A),
		}
	}
}

/// Memory addressed through a register pair, as used by `ld (rr), A`
/// and `ld A, (rr)`.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Indirect {
	/// (BC)
	BC,
	/// (DE)
	DE,
	/// (HL+), incrementing HL after the access.
	HLInc,
	/// (HL-), decrementing HL after the access.
	HLDec,
}

/// The address of an `ldh` access, relative to the high page (0xFF00).
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum HighOffset {
	/// Offset given by the byte following the opcode.
	Imm,
	/// Offset held by the C register.
	C,
}

/// A branch condition.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[allow(missing_docs)]
pub enum Condition {
	Always,
	NZ,
	Z,
	NC,
	C,
}

impl Condition {
	fn from_index(index: u8) -> Self {
		match index & 3 {
			0 => Condition::NZ,
			1 => Condition::Z,
			2 => Condition::NC,
			_ => Condition::C,
		}
	}

	/// Checks the condition against the current flags.
	pub fn holds(&self, state: &CpuState) -> bool {
		match self {
			Condition::Always => true,
			Condition::NZ => !state.flag(Flag::Z),
			Condition::Z => state.flag(Flag::Z),
			Condition::NC => !state.flag(Flag::C),
			Condition::C => state.flag(Flag::C),
		}
	}
}

/// The rotate and shift operations of the 0xCB-prefixed block.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[allow(missing_docs)]
pub enum ShiftOp {
	Rlc,
	Rrc,
	Rl,
	Rr,
	Sla,
	Sra,
	Swap,
	Srl,
}

impl ShiftOp {
	fn from_index(index: u8) -> Self {
		match index & 7 {
			0 => ShiftOp::Rlc,
			1 => ShiftOp::Rrc,
			2 => ShiftOp::Rl,
			3 => ShiftOp::Rr,
			4 => ShiftOp::Sla,
			5 => ShiftOp::Sra,
			6 => ShiftOp::Swap,
			_ => ShiftOp::Srl,
		}
	}
}

/// A decoded instruction.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Instruction {
	/// nop
	Nop,
	/// stop
	Stop,
	/// halt
	Halt,
	/// ld r, r' / ld r, n / ld r, (HL) / ld (HL), r / ld (HL), n
	Ld8 {
		/// Destination, never `Imm`.
		dst: Operand8,
		/// Source.
		src: Operand8,
	},
	/// ld rr, nn
	Ld16Imm(Register),
	/// ld (rr), A
	StoreIndirect(Indirect),
	/// ld A, (rr)
	LoadIndirect(Indirect),
	/// ld (nn), SP
	StoreSp,
	/// ld SP, HL
	LdSpHl,
	/// ld HL, SP+e
	LdHlSpOffset,
	/// ld (nn), A
	StoreAbsolute,
	/// ld A, (nn)
	LoadAbsolute,
	/// ldh (n), A / ld (C), A
	StoreHigh(HighOffset),
	/// ldh A, (n) / ld A, (C)
	LoadHigh(HighOffset),
	/// inc r / inc (HL)
	Inc8(Operand8),
	/// dec r / dec (HL)
	Dec8(Operand8),
	/// inc rr
	Inc16(Register),
	/// dec rr
	Dec16(Register),
	/// add HL, rr
	AddHl(Register),
	/// add SP, e
	AddSpOffset,
	/// add/adc/sub/sbc/and/xor/or/cp A, operand
	Alu(AluOp, Operand8),
	/// rlca
	Rlca,
	/// rrca
	Rrca,
	/// rla
	Rla,
	/// rra
	Rra,
	/// daa
	Daa,
	/// cpl
	Cpl,
	/// scf
	Scf,
	/// ccf
	Ccf,
	/// jr cc, e
	Jr(Condition),
	/// jp cc, nn
	Jp(Condition),
	/// jp HL
	JpHl,
	/// call cc, nn
	Call(Condition),
	/// ret cc
	Ret(Condition),
	/// reti
	Reti,
	/// rst n, holding the target address.
	Rst(u16),
	/// push rr
	Push(Register),
	/// pop rr
	Pop(Register),
	/// di
	Di,
	/// ei
	Ei,
	/// rlc/rrc/rl/rr/sla/sra/swap/srl operand
	Shift(ShiftOp, Operand8),
	/// bit b, operand
	Bit(u8, Operand8),
	/// res b, operand
	Res(u8, Operand8),
	/// set b, operand
	Set(u8, Operand8),
}

/// Opcodes that don't encode any instruction.
pub const ILLEGAL_OPCODES: [u8; 11] = [
	0xd3, 0xdb, 0xdd, 0xe3, 0xe4, 0xeb, 0xec, 0xed, 0xf4, 0xfc, 0xfd,
];

/// The register pair encoded by bits 4-5 of `ld rr, nn`, `inc rr`, `add HL, rr`
/// and similar opcodes.
fn pair(opcode: u8) -> Register {
	match (opcode >> 4) & 3 {
		0 => Register::BC,
		1 => Register::DE,
		2 => Register::HL,
		_ => Register::SP,
	}
}

/// Same as `pair`, but AF takes the place of SP for `push` and `pop`.
fn stack_pair(opcode: u8) -> Register {
	match (opcode >> 4) & 3 {
		0 => Register::BC,
		1 => Register::DE,
		2 => Register::HL,
		_ => Register::AF,
	}
}

fn indirect(opcode: u8) -> Indirect {
	match (opcode >> 4) & 3 {
		0 => Indirect::BC,
		1 => Indirect::DE,
		2 => Indirect::HLInc,
		_ => Indirect::HLDec,
	}
}

/// Decodes a single-byte opcode.
///
/// The 0xCB prefix isn't handled here, since its instructions are
/// selected by the following byte.
pub fn decode_opcode(opcode: u8) -> Option<Instruction> {
	let insn = match opcode {
		0x00 => Instruction::Nop,
		0x10 => Instruction::Stop,
		0x76 => Instruction::Halt,
		0x08 => Instruction::StoreSp,

		0x07 => Instruction::Rlca,
		0x0f => Instruction::Rrca,
		0x17 => Instruction::Rla,
		0x1f => Instruction::Rra,
		0x27 => Instruction::Daa,
		0x2f => Instruction::Cpl,
		0x37 => Instruction::Scf,
		0x3f => Instruction::Ccf,

		0x18 => Instruction::Jr(Condition::Always),
		0x20 | 0x28 | 0x30 | 0x38 => Instruction::Jr(Condition::from_index(opcode >> 3)),

		op if op & 0xcf == 0x01 => Instruction::Ld16Imm(pair(op)),
		op if op & 0xcf == 0x02 => Instruction::StoreIndirect(indirect(op)),
		op if op & 0xcf == 0x03 => Instruction::Inc16(pair(op)),
		op if op & 0xcf == 0x09 => Instruction::AddHl(pair(op)),
		op if op & 0xcf == 0x0a => Instruction::LoadIndirect(indirect(op)),
		op if op & 0xcf == 0x0b => Instruction::Dec16(pair(op)),

		op if op & 0xc7 == 0x04 => Instruction::Inc8(Operand8::from_index(op >> 3)),
		op if op & 0xc7 == 0x05 => Instruction::Dec8(Operand8::from_index(op >> 3)),
		op if op & 0xc7 == 0x06 => Instruction::Ld8 {
			dst: Operand8::from_index(op >> 3),
			src: Operand8::Imm,
		},

		0x40..=0x7f => Instruction::Ld8 {
			dst: Operand8::from_index(opcode >> 3),
			src: Operand8::from_index(opcode),
		},

		0x80..=0xbf => Instruction::Alu(AluOp::from_index(opcode >> 3), Operand8::from_index(opcode)),

		0xc9 => Instruction::Ret(Condition::Always),
		0xd9 => Instruction::Reti,
		0xc3 => Instruction::Jp(Condition::Always),
		0xcd => Instruction::Call(Condition::Always),
		0xe9 => Instruction::JpHl,

		0xc0 | 0xc8 | 0xd0 | 0xd8 => Instruction::Ret(Condition::from_index(opcode >> 3)),
		0xc2 | 0xca | 0xd2 | 0xda => Instruction::Jp(Condition::from_index(opcode >> 3)),
		0xc4 | 0xcc | 0xd4 | 0xdc => Instruction::Call(Condition::from_index(opcode >> 3)),

		op if op & 0xcf == 0xc1 => Instruction::Pop(stack_pair(op)),
		op if op & 0xcf == 0xc5 => Instruction::Push(stack_pair(op)),
		op if op & 0xc7 == 0xc6 => Instruction::Alu(AluOp::from_index(op >> 3), Operand8::Imm),
		op if op & 0xc7 == 0xc7 => Instruction::Rst((op & 0x38) as u16),

		0xe0 => Instruction::StoreHigh(HighOffset::Imm),
		0xf0 => Instruction::LoadHigh(HighOffset::Imm),
		0xe2 => Instruction::StoreHigh(HighOffset::C),
		0xf2 => Instruction::LoadHigh(HighOffset::C),
		0xe8 => Instruction::AddSpOffset,
		0xf8 => Instruction::LdHlSpOffset,
		0xf9 => Instruction::LdSpHl,
		0xea => Instruction::StoreAbsolute,
		0xfa => Instruction::LoadAbsolute,
		0xf3 => Instruction::Di,
		0xfb => Instruction::Ei,

		// 0xcb and the illegal opcodes.
		_ => return None,
	};

	Some(insn)
}

/// Decodes the byte that follows the 0xCB prefix.
pub fn decode_cb_opcode(opcode: u8) -> Instruction {
	let operand = Operand8::from_index(opcode);
	let bit = (opcode >> 3) & 7;

	match opcode >> 6 {
		0 => Instruction::Shift(ShiftOp::from_index(bit), operand),
		1 => Instruction::Bit(bit, operand),
		2 => Instruction::Res(bit, operand),
		_ => Instruction::Set(bit, operand),
	}
}

impl<'a, M: Memory> Cpu<'a, M> {

	/// Returns the instruction that matches the given opcode.
	///
	/// Reads the second byte of 0xCB-prefixed instructions. Opcodes that don't
	/// encode an instruction are reported as `BadOpcode` without consuming
	/// anything, unless the configuration tolerates them.
	pub fn decode(&mut self, opcode: u8) -> Result<Instruction, GameboyError> {
		if opcode == 0xcb {
			let next_byte: u8 = self.fetch();
			return Ok(decode_cb_opcode(next_byte));
		}

		match decode_opcode(opcode) {
			Some(insn) => Ok(insn),
			None if self.config.strict_opcodes => Err(GameboyError::BadOpcode(opcode)),
			None => {
				log::warn!("skipping bad opcode {:#04x}", opcode);
				Ok(Instruction::Nop)
			},
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_coverage() {
		for opcode in 0..=0xff_u8 {
			let decoded = decode_opcode(opcode);

			if opcode == 0xcb || ILLEGAL_OPCODES.contains(&opcode) {
				assert_eq!(None, decoded, "opcode {:#04x}", opcode);
			} else {
				assert!(decoded.is_some(), "opcode {:#04x}", opcode);
			}
		}
	}

	#[test]
	fn test_regular_blocks() {
		assert_eq!(Some(Instruction::Ld8 {
			dst: Operand8::Reg(Register::B),
			src: Operand8::Reg(Register::C),
		}), decode_opcode(0x41));

		assert_eq!(Some(Instruction::Ld8 {
			dst: Operand8::MemHL,
			src: Operand8::Reg(Register::A),
		}), decode_opcode(0x77));

		assert_eq!(Some(Instruction::Ld8 {
			dst: Operand8::Reg(Register::A),
			src: Operand8::Imm,
		}), decode_opcode(0x3e));

		assert_eq!(Some(Instruction::Alu(AluOp::Cp, Operand8::MemHL)), decode_opcode(0xbe));
		assert_eq!(Some(Instruction::Alu(AluOp::Xor, Operand8::Imm)), decode_opcode(0xee));
		assert_eq!(Some(Instruction::Inc8(Operand8::MemHL)), decode_opcode(0x34));
		assert_eq!(Some(Instruction::Dec8(Operand8::Reg(Register::A))), decode_opcode(0x3d));
	}

	#[test]
	fn test_pairs_and_conditions() {
		assert_eq!(Some(Instruction::Ld16Imm(Register::SP)), decode_opcode(0x31));
		assert_eq!(Some(Instruction::AddHl(Register::DE)), decode_opcode(0x19));
		assert_eq!(Some(Instruction::Dec16(Register::HL)), decode_opcode(0x2b));
		assert_eq!(Some(Instruction::Push(Register::AF)), decode_opcode(0xf5));
		assert_eq!(Some(Instruction::Pop(Register::BC)), decode_opcode(0xc1));
		assert_eq!(Some(Instruction::StoreIndirect(Indirect::HLDec)), decode_opcode(0x32));
		assert_eq!(Some(Instruction::LoadIndirect(Indirect::HLInc)), decode_opcode(0x2a));
		assert_eq!(Some(Instruction::Jr(Condition::NC)), decode_opcode(0x30));
		assert_eq!(Some(Instruction::Call(Condition::Z)), decode_opcode(0xcc));
		assert_eq!(Some(Instruction::Ret(Condition::C)), decode_opcode(0xd8));
		assert_eq!(Some(Instruction::Rst(0x38)), decode_opcode(0xff));
		assert_eq!(Some(Instruction::Rst(0x00)), decode_opcode(0xc7));
	}

	#[test]
	fn test_cb_block() {
		assert_eq!(Instruction::Shift(ShiftOp::Rlc, Operand8::Reg(Register::B)), decode_cb_opcode(0x00));
		assert_eq!(Instruction::Shift(ShiftOp::Swap, Operand8::MemHL), decode_cb_opcode(0x36));
		assert_eq!(Instruction::Bit(7, Operand8::Reg(Register::H)), decode_cb_opcode(0x7c));
		assert_eq!(Instruction::Res(0, Operand8::Reg(Register::A)), decode_cb_opcode(0x87));
		assert_eq!(Instruction::Set(3, Operand8::MemHL), decode_cb_opcode(0xde));
	}
}
