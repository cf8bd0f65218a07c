//! Runs small programs from the boot entry point, the way an emulator loop
//! drives the processor.

use gameboy_cpu::bus::{FlatMemory, Memory};
use gameboy_cpu::config::{Config, HardwareModel};
use gameboy_cpu::cpu::Cpu;
use gameboy_cpu::cpu::state::PowerState;
use gameboy_cpu::cpu::state::registers::{Flag, Register};
use gameboy_cpu::GameboyError;

/// Loads a program at the cartridge entry point (0x0100).
fn boot<'a>(config: &'a Config, program: &[u8]) -> Cpu<'a, FlatMemory> {
	let mut image = vec![0_u8; 0x0100];
	image.extend_from_slice(program);

	Cpu::new(config, FlatMemory::from_bytes(&image))
}

/// Steps until the cpu halts, returning the total number of cycles.
fn run_until_halt(cpu: &mut Cpu<FlatMemory>, max_steps: usize) -> Result<usize, GameboyError> {
	let mut total = 0;

	for _ in 0..max_steps {
		total += cpu.execute()?;

		if cpu.is_halted() {
			return Ok(total);
		}
	}

	panic!("the program didn't halt within {} steps", max_steps);
}

#[test]
fn boot_state() {
	let config = Config::default();
	let cpu = boot(&config, &[]);
	let regs = cpu.registers();

	assert_eq!(0x01B0, regs.get(Register::AF));
	assert_eq!(0x0013, regs.get(Register::BC));
	assert_eq!(0x00D8, regs.get(Register::DE));
	assert_eq!(0x014D, regs.get(Register::HL));
	assert_eq!(0xFFFE, regs.get(Register::SP));
	assert_eq!(0x0100, regs.get(Register::PC));
	assert!(regs.flag(Flag::Z));
	assert!(!regs.flag(Flag::N));
	assert!(regs.flag(Flag::H));
	assert!(regs.flag(Flag::C));
	assert!(!regs.interrupts_enabled());
	assert_eq!(PowerState::Running, regs.power_state());
	assert!(!cpu.interrupts_enabled());
	assert_eq!(PowerState::Running, cpu.power_state());
}

#[test]
fn boot_state_per_model() {
	let pocket = Config { model: HardwareModel::GBP, ..Config::default() };
	assert_eq!(0xFFB0, boot(&pocket, &[]).registers().get(Register::AF));

	let color = Config { model: HardwareModel::GBC, ..Config::default() };
	assert_eq!(0x11B0, boot(&color, &[]).registers().get(Register::AF));
}

#[test]
fn cartridge_style_entry_jump() {
	let config = Config::default();
	// nop ; jp 0x0150 ... 0x0150: halt
	let mut cpu = boot(&config, &[0x00, 0xc3, 0x50, 0x01]);
	cpu.memory_mut().write(0x0150, 0x76);

	let cycles = run_until_halt(&mut cpu, 8).unwrap();
	assert_eq!(4 + 16 + 4, cycles);
	assert_eq!(0x0151, cpu.registers().get(Register::PC));
}

#[test]
fn counting_loop() {
	let config = Config::default();
	let program = [
		0x06, 0x05, // ld B, 5
		0xaf,       // xor A
		0x80,       // loop: add A, B
		0x05,       // dec B
		0x20, 0xfc, // jr NZ, loop
		0x76,       // halt
	];
	let mut cpu = boot(&config, &program);

	run_until_halt(&mut cpu, 64).unwrap();

	assert_eq!(15, cpu.registers().get(Register::A));
	assert_eq!(0, cpu.registers().get(Register::B));
	assert!(cpu.registers().flag(Flag::Z));
}

#[test]
fn subroutine_with_stack() {
	let config = Config::default();
	let program = [
		0x21, 0x00, 0xc0, // ld HL, 0xC000
		0x01, 0xef, 0xbe, // ld BC, 0xBEEF
		0xc5,             // push BC
		0xcd, 0x10, 0x01, // call 0x0110
		0xd1,             // pop DE
		0x76,             // halt
	];
	let mut cpu = boot(&config, &program);
	// 0x0110: ld (HL+), A ; ld (HL), B ; ret
	cpu.memory_mut().write_all(0x0110, &[0x22, 0x70, 0xc9]);

	run_until_halt(&mut cpu, 16).unwrap();

	let regs = cpu.registers();
	assert_eq!(0xBEEF, regs.get(Register::DE));
	assert_eq!(0xFFFE, regs.get(Register::SP));
	assert_eq!(0xC001, regs.get(Register::HL));
	assert_eq!(0x01, cpu.memory().read(0xC000));
	assert_eq!(0xBE, cpu.memory().read(0xC001));
}

#[test]
fn bcd_addition() {
	let config = Config::default();
	let program = [
		0x3e, 0x38, // ld A, 0x38
		0xc6, 0x45, // add A, 0x45
		0x27,       // daa
		0x76,       // halt
	];
	let mut cpu = boot(&config, &program);

	run_until_halt(&mut cpu, 8).unwrap();

	assert_eq!(0x83, cpu.registers().get(Register::A));
	assert!(!cpu.registers().flag(Flag::C));
}

#[test]
fn bad_opcode_stops_the_loop() {
	let config = Config::default();
	// inc A ; illegal
	let mut cpu = boot(&config, &[0x3c, 0xdd]);

	assert_eq!(Err(GameboyError::BadOpcode(0xdd)), run_until_halt(&mut cpu, 8));
	assert_eq!(0x0101, cpu.registers().get(Register::PC));
	assert_eq!(0x02, cpu.registers().get(Register::A));

	// The error is reported again, since nothing was consumed.
	assert_eq!(Err(GameboyError::BadOpcode(0xdd)), cpu.execute());
	assert_eq!("bad opcode 0xdd", format!("{}", GameboyError::BadOpcode(0xdd)));
}

#[test]
fn woken_after_halt() {
	let config = Config::default();
	// halt ; inc B
	let mut cpu = boot(&config, &[0x76, 0x04]);

	run_until_halt(&mut cpu, 4).unwrap();
	assert_eq!(PowerState::Halted, cpu.power_state());
	assert_eq!(4, cpu.execute().unwrap());
	assert_eq!(0x13, cpu.registers().get(Register::C));

	cpu.wake();
	assert_eq!(PowerState::Running, cpu.power_state());
	cpu.execute().unwrap();
	assert_eq!(0x01, cpu.registers().get(Register::B));
}
