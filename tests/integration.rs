// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! Testing methods on chip8vm's public API
use chip8vm::*;
use rand::rngs::mock::StepRng;
use std::{collections::hash_map::DefaultHasher, hash::Hash};

fn lit(screen: &Screen) -> usize {
    screen.as_slice().iter().filter(|&&p| p == 1).count()
}

mod cpu {
    use super::*;

    #[test]
    fn fresh_state() {
        let mut cpu = CPU::default();
        cpu.load_program_bytes(&[0x12, 0x00]).unwrap();
        assert_eq!(0x200, cpu.pc());
        assert_eq!(0, cpu.sp());
        assert_eq!(0, cpu.i());
        assert_eq!(&[0; 16], cpu.v());
        assert_eq!((0, 0), (cpu.delay(), cpu.sound()));
        assert_eq!(&[false; 16], cpu.keys());
        assert_eq!(0, lit(cpu.screen()));
        assert!(!cpu.redraw());
        assert_eq!(&FONT[..], &cpu.mem().as_slice()[..FONT.len()]);
    }

    #[test]
    fn load_too_large() {
        let mut cpu = CPU::default();
        let err = cpu.load_program_bytes(&vec![0; 3585]).unwrap_err();
        assert!(matches!(err, Error::ProgramTooLarge { size: 3585, .. }));
        assert!(err.is_fatal());
        // The failed load still leaves a clean machine behind
        assert_eq!(0x200, cpu.pc());
        assert_eq!(0, cpu.mem().read_word(0x200usize));
    }

    #[test]
    fn load_missing_file() {
        let mut cpu = CPU::default();
        let err = cpu
            .load_program("this/rom/does/not/exist.ch8")
            .unwrap_err();
        assert!(matches!(err, Error::IoError(_)));
    }

    #[test]
    fn press_invalid_key() {
        let mut cpu = CPU::default();
        cpu.press(0x21345134)
            .expect_err("This should produce an Error::InvalidKey");
        // no change has been made, everything is safe.
        assert_eq!(&[false; 16], cpu.keys());
    }

    #[test]
    fn release_invalid_key() {
        let mut cpu = CPU::default();
        cpu.release(0x21345134)
            .expect_err("This should produce an Error::InvalidKey");
        assert_eq!(&[false; 16], cpu.keys());
    }

    #[test]
    fn set_keys() {
        let mut cpu = CPU::default();
        let mut keys = [false; 16];
        keys[0xa] = true;
        cpu.set_keys(&keys);
        assert_eq!(&keys, cpu.keys());
        assert!(cpu.release(0xa).unwrap());
    }

    #[test]
    fn set_invalid_reg() {
        let mut cpu = CPU::default();
        cpu.set_v(0x21345134, 0xff)
            .expect_err("This should produce an Error::InvalidRegister");
        // no change has been made
        assert_eq!(&[0; 16], cpu.v());
    }

    #[test]
    fn debug() {
        println!("{:?}", CPU::default());
    }

    #[test]
    fn dump() {
        let mut cpu = CPU::default();
        cpu.set_v(0xa, 0x5a).unwrap();
        cpu.dump();
    }
}

mod programs {
    use super::*;

    fn run(program: &[u8], steps: usize) -> CPU {
        let mut cpu = CPU::with_rng(Flags::default(), StepRng::new(0xa5, 0));
        cpu.load_program_bytes(program).unwrap();
        cpu.multistep(steps).unwrap();
        cpu
    }

    /// Draws the glyph for `8` in the top left corner
    #[test]
    fn draw_glyph() {
        let cpu = run(
            &[
                0x60, 0x08, // 200: mov #08, v0
                0xf0, 0x29, // 202: font v0, I
                0x61, 0x00, // 204: mov #00, v1
                0xd1, 0x15, // 206: draw #5, v1, v1
                0x12, 0x08, // 208: jmp 208
            ],
            5,
        );
        assert_eq!(0x28, cpu.i());
        // 0xF0, 0x90, 0xF0, 0x90, 0xF0
        assert_eq!(4 + 2 + 4 + 2 + 4, lit(cpu.screen()));
        assert_eq!(Some(1), cpu.screen().pixel(0, 1));
        assert_eq!(Some(0), cpu.screen().pixel(1, 1));
        assert_eq!(0, cpu.v()[0xf]);
        assert!(cpu.redraw());
    }

    /// Counts v0 up to 10 in a loop
    #[test]
    fn count_loop() {
        let cpu = run(
            &[
                0x70, 0x01, // 200: add #01, v0
                0x30, 0x0a, // 202: se #0a, v0
                0x12, 0x00, // 204: jmp 200
                0x12, 0x06, // 206: jmp 206
            ],
            100,
        );
        assert_eq!(10, cpu.v()[0]);
        assert_eq!(0x206, cpu.pc());
    }

    /// Spins on the delay timer until it runs out
    #[test]
    fn delay_loop() {
        let cpu = run(
            &[
                0x60, 0x20, // 200: mov #20, v0
                0xf0, 0x15, // 202: mov v0, DT
                0xf1, 0x07, // 204: mov DT, v1
                0x31, 0x00, // 206: se #00, v1
                0x12, 0x04, // 208: jmp 204
                0x12, 0x0a, // 20a: jmp 20a
            ],
            200,
        );
        assert_eq!(0, cpu.delay());
        assert_eq!(0x20a, cpu.pc());
    }

    /// Converts a random byte to decimal
    #[test]
    fn rand_bcd() {
        let cpu = run(
            &[
                0xc3, 0xff, // 200: rand #ff, v3
                0xa4, 0x00, // 202: mov $400, I
                0xf3, 0x33, // 204: bcd v3, &I
            ],
            3,
        );
        assert_eq!(0xa5, cpu.v()[3]);
        assert_eq!([1, 6, 5], cpu.mem().as_slice()[0x400..0x403]);
    }

    /// Runaway recursion stops at the 17th call
    #[test]
    fn runaway_recursion() {
        let mut cpu = CPU::default();
        cpu.load_program_bytes(&[0x22, 0x00]).unwrap();
        let err = cpu.multistep(100).unwrap_err();
        assert!(matches!(err, Error::StackOverflow { pc: 0x200 }));
        assert_eq!(17, cpu.cycle());
        assert_eq!(16, cpu.sp());
    }

    /// The same seed gives the same random bytes
    #[test]
    fn seeded_rng() {
        use rand::{rngs::StdRng, SeedableRng};
        let program = [0xc0, 0xff, 0xc1, 0xff, 0xc2, 0xff];
        let mut a = CPU::with_rng(Flags::default(), StdRng::seed_from_u64(1234));
        let mut b = CPU::with_rng(Flags::default(), StdRng::seed_from_u64(1234));
        a.load_program_bytes(&program).unwrap().multistep(3).unwrap();
        b.load_program_bytes(&program).unwrap().multistep(3).unwrap();
        assert_eq!(a.v(), b.v());
    }
}

mod flags {
    use super::*;
    #[test]
    fn default() {
        assert_eq!(
            Flags::default(),
            Flags {
                debug: false,
                pause: false,
                keypause: false,
                quirks: Quirks { screen_wrap: false },
            }
        )
    }
    #[test]
    fn toggles() {
        let mut flags = Flags::default();
        flags.debug();
        flags.pause();
        assert!(flags.debug && flags.pause);
        flags.debug();
        flags.pause();
        assert_eq!(Flags::default(), flags);
    }
    #[test]
    fn hash() {
        let mut hasher = DefaultHasher::new();
        Flags::default().hash(&mut hasher);
        println!("{hasher:?}");
    }
}

mod quirks {
    use super::*;

    #[test]
    fn from_bool() {
        assert_eq!(Quirks { screen_wrap: true }, Quirks::from(true));
        assert_eq!(Quirks::default(), Quirks::from(false));
    }

    #[test]
    fn ord() {
        assert!(Quirks::from(false) < Quirks::from(true));
    }
}

mod insn {
    use super::*;
    use imperative_rs::InstructionSet;

    #[test]
    fn display() {
        let (_, insn) = Insn::decode(&[0xd1, 0x25]).unwrap();
        assert_eq!(Insn::draw { x: 1, y: 2, n: 5 }, insn);
        assert_eq!("draw   #5, v1, v2", insn.to_string());
    }
    #[test]
    fn rejects_unknown() {
        for word in [0x0000u16, 0x0123, 0x5121, 0x812f, 0xe19f, 0xf1ff] {
            assert!(Insn::decode(&word.to_be_bytes()).is_err(), "{word:04x}");
        }
    }
}

#[test]
fn error() {
    let error = Error::UnimplementedInstruction { word: 0xffff };
    // Print it with Display and Debug
    println!("{error} {error:?}");
    assert_eq!("opcode ffff not recognized", error.to_string());
}

#[test]
fn screen_display() {
    let mut screen = Screen::default();
    screen.draw_sprite(0, 0, &[0xff, 0xff], false);
    let shown = screen.to_string();
    assert_eq!(16, shown.lines().count());
}
