// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! Contains implementations for each Chip-8 [Insn]
//!
//! Every instruction moves the program counter itself: most by 2,
//! skips by 4, and jumps, calls and returns by replacing it outright.

use super::*;
use rand::Rng;

impl CPU {
    /// Executes a single [Insn]
    #[rustfmt::skip]
    #[inline(always)]
    pub(super) fn execute(&mut self, instruction: Insn) -> Result<()> {
        match instruction {
            Insn::cls               => self.clear_screen(),
            Insn::ret               => self.ret()?,
            Insn::jmp   {       A } => self.jump(A),
            Insn::call  {       A } => self.call(A)?,
            Insn::seb   {    x, B } => self.skip_equals_immediate(x, B),
            Insn::sneb  {    x, B } => self.skip_not_equals_immediate(x, B),
            Insn::se    { y, x    } => self.skip_equals(x, y),
            Insn::movb  {    x, B } => self.load_immediate(x, B),
            Insn::addb  {    x, B } => self.add_immediate(x, B),
            Insn::mov   { y, x    } => self.load(x, y),
            Insn::or    { y, x    } => self.or(x, y),
            Insn::and   { y, x    } => self.and(x, y),
            Insn::xor   { y, x    } => self.xor(x, y),
            Insn::add   { y, x    } => self.add(x, y),
            Insn::sub   { y, x    } => self.sub(x, y),
            Insn::shr   { y, x    } => self.shift_right(x, y),
            Insn::bsub  { y, x    } => self.backwards_sub(x, y),
            Insn::shl   { y, x    } => self.shift_left(x, y),
            Insn::sne   { y, x    } => self.skip_not_equals(x, y),
            Insn::movI  {       A } => self.load_i_immediate(A),
            Insn::jmpr  {       A } => self.jump_indexed(A),
            Insn::rand  {    x, B } => self.rand(x, B),
            Insn::draw  { y, x, n } => self.draw(x, y, n),
            Insn::sek   {    x    } => self.skip_key_equals(x),
            Insn::snek  {    x    } => self.skip_key_not_equals(x),
            Insn::getdt {    x    } => self.load_delay_timer(x),
            Insn::waitk {    x    } => self.wait_for_key(x),
            Insn::setdt {    x    } => self.store_delay_timer(x),
            Insn::movst {    x    } => self.store_sound_timer(x),
            Insn::addI  {    x    } => self.add_i(x),
            Insn::font  {    x    } => self.load_sprite(x),
            Insn::bcd   {    x    } => self.bcd_convert(x),
            Insn::dmao  {    x    } => self.store_dma(x),
            Insn::dmai  {    x    } => self.load_dma(x),
        }
        Ok(())
    }

    /// Moves on to the next instruction
    #[inline(always)]
    fn next(&mut self) {
        self.pc = self.pc.wrapping_add(2);
    }

    /// Skips the next instruction if `cond` holds, otherwise moves on to it
    #[inline(always)]
    fn skip_if(&mut self, cond: bool) {
        self.pc = self.pc.wrapping_add(if cond { 4 } else { 2 });
    }
}

/// |opcode| effect                             |
/// |------|------------------------------------|
/// |`00e0`| Clear screen memory to all 0       |
/// |`00ee`| Return from subroutine             |
impl CPU {
    /// |`00e0`| Clears the screen memory to 0
    #[inline(always)]
    pub(super) fn clear_screen(&mut self) {
        self.screen.clear();
        self.redraw = true;
        self.next();
    }
    /// |`00ee`| Returns from subroutine
    ///
    /// The stack holds the address of the call, so execution resumes just after it.
    #[inline(always)]
    pub(super) fn ret(&mut self) -> Result<()> {
        let sp = self
            .sp
            .checked_sub(1)
            .ok_or(Error::StackUnderflow { pc: self.pc })?;
        self.sp = sp;
        self.pc = self.stack[sp];
        self.next();
        Ok(())
    }
}

/// |`1aaa`| Sets pc to an absolute address
impl CPU {
    /// |`1aaa`| Sets the program counter to an absolute address
    #[inline(always)]
    pub(super) fn jump(&mut self, a: Adr) {
        self.pc = a;
    }
}

/// |`2aaa`| Pushes pc onto the stack, then jumps to a
impl CPU {
    /// |`2aaa`| Pushes pc onto the stack, then jumps to a
    #[inline(always)]
    pub(super) fn call(&mut self, a: Adr) -> Result<()> {
        let slot = self
            .stack
            .get_mut(self.sp)
            .ok_or(Error::StackOverflow { pc: self.pc })?;
        *slot = self.pc;
        self.sp += 1;
        self.pc = a;
        Ok(())
    }
}

/// |`3xbb`| Skips next instruction if register X == b
impl CPU {
    /// |`3xbb`| Skips the next instruction if register X == b
    #[inline(always)]
    pub(super) fn skip_equals_immediate(&mut self, x: Reg, b: u8) {
        self.skip_if(self.v[x] == b);
    }
}

/// |`4xbb`| Skips next instruction if register X != b
impl CPU {
    /// |`4xbb`| Skips the next instruction if register X != b
    #[inline(always)]
    pub(super) fn skip_not_equals_immediate(&mut self, x: Reg, b: u8) {
        self.skip_if(self.v[x] != b);
    }
}

/// |`5xy0`| Skip next instruction if vX == vY
impl CPU {
    /// |`5xy0`| Skips the next instruction if register X == register Y
    #[inline(always)]
    pub(super) fn skip_equals(&mut self, x: Reg, y: Reg) {
        self.skip_if(self.v[x] == self.v[y]);
    }
}

/// |`6xbb`| Loads immediate byte b into register vX
impl CPU {
    /// |`6xbb`| Loads immediate byte b into register vX
    #[inline(always)]
    pub(super) fn load_immediate(&mut self, x: Reg, b: u8) {
        self.v[x] = b;
        self.next();
    }
}

/// |`7xbb`| Adds immediate byte b to register vX
impl CPU {
    /// |`7xbb`| Adds immediate byte b to register vX. Does not touch vF.
    #[inline(always)]
    pub(super) fn add_immediate(&mut self, x: Reg, b: u8) {
        self.v[x] = self.v[x].wrapping_add(b);
        self.next();
    }
}

/// |`8xyn`| Performs ALU operation
///
/// |opcode| effect                             |
/// |------|------------------------------------|
/// |`8xy0`| X = Y                              |
/// |`8xy1`| X = X | Y                          |
/// |`8xy2`| X = X & Y                          |
/// |`8xy3`| X = X ^ Y                          |
/// |`8xy4`| X = X + Y; Set vF=carry            |
/// |`8xy5`| X = X - Y; Set vF=!borrow          |
/// |`8xy6`| X = X >> 1; Set vF=shifted-out bit |
/// |`8xy7`| X = Y - X; Set vF=!borrow          |
/// |`8xyE`| X = X << 1; Set vF=shifted-out bit |
///
/// The result is stored before vF, so when X is vF the flag wins.
/// This holds for `8xy5`, `8xy6` and `8xy7` too, even though some
/// interpreters write vF first there and let the result win.
impl CPU {
    /// |`8xy0`| Loads the value of y into x
    #[inline(always)]
    pub(super) fn load(&mut self, x: Reg, y: Reg) {
        self.v[x] = self.v[y];
        self.next();
    }
    /// |`8xy1`| Performs bitwise or of vX and vY, and stores the result in vX
    #[inline(always)]
    pub(super) fn or(&mut self, x: Reg, y: Reg) {
        self.v[x] |= self.v[y];
        self.next();
    }
    /// |`8xy2`| Performs bitwise and of vX and vY, and stores the result in vX
    #[inline(always)]
    pub(super) fn and(&mut self, x: Reg, y: Reg) {
        self.v[x] &= self.v[y];
        self.next();
    }
    /// |`8xy3`| Performs bitwise xor of vX and vY, and stores the result in vX
    #[inline(always)]
    pub(super) fn xor(&mut self, x: Reg, y: Reg) {
        self.v[x] ^= self.v[y];
        self.next();
    }
    /// |`8xy4`| Performs addition of vX and vY, and stores the result in vX
    #[inline(always)]
    pub(super) fn add(&mut self, x: Reg, y: Reg) {
        let carry;
        (self.v[x], carry) = self.v[x].overflowing_add(self.v[y]);
        self.v[0xf] = carry.into();
        self.next();
    }
    /// |`8xy5`| Performs subtraction of vX and vY, and stores the result in vX
    ///
    /// vF is set to 1 when vX >= vY (no borrow)
    #[inline(always)]
    pub(super) fn sub(&mut self, x: Reg, y: Reg) {
        let borrow;
        (self.v[x], borrow) = self.v[x].overflowing_sub(self.v[y]);
        self.v[0xf] = (!borrow).into();
        self.next();
    }
    /// |`8xy6`| Performs bitwise right shift of vX
    #[inline(always)]
    pub(super) fn shift_right(&mut self, x: Reg, _y: Reg) {
        let shift_out = self.v[x] & 1;
        self.v[x] >>= 1;
        self.v[0xf] = shift_out;
        self.next();
    }
    /// |`8xy7`| Performs subtraction of vY and vX, and stores the result in vX
    ///
    /// vF is set to 0 when vX > vY, and 1 otherwise
    #[inline(always)]
    pub(super) fn backwards_sub(&mut self, x: Reg, y: Reg) {
        let borrow;
        (self.v[x], borrow) = self.v[y].overflowing_sub(self.v[x]);
        self.v[0xf] = (!borrow).into();
        self.next();
    }
    /// |`8xyE`| Performs bitwise left shift of vX
    #[inline(always)]
    pub(super) fn shift_left(&mut self, x: Reg, _y: Reg) {
        let shift_out = self.v[x] >> 7;
        self.v[x] <<= 1;
        self.v[0xf] = shift_out;
        self.next();
    }
}

/// |`9xy0`| Skip next instruction if vX != vY
impl CPU {
    /// |`9xy0`| Skip next instruction if X != y
    #[inline(always)]
    pub(super) fn skip_not_equals(&mut self, x: Reg, y: Reg) {
        self.skip_if(self.v[x] != self.v[y]);
    }
}

/// |`Aaaa`| Load address #a into register I
impl CPU {
    /// |`Aadr`| Load address #adr into register I
    #[inline(always)]
    pub(super) fn load_i_immediate(&mut self, a: Adr) {
        self.i = a;
        self.next();
    }
}

/// |`Baaa`| Jump to &adr + v0
impl CPU {
    /// |`Badr`| Jump to &adr + v0
    #[inline(always)]
    pub(super) fn jump_indexed(&mut self, a: Adr) {
        self.pc = a.wrapping_add(self.v[0] as Adr);
    }
}

/// |`Cxbb`| Stores a random number & the provided byte into vX
impl CPU {
    /// |`Cxbb`| Stores a random number & the provided byte into vX
    #[inline(always)]
    pub(super) fn rand(&mut self, x: Reg, b: u8) {
        self.v[x] = self.rng.gen::<u8>() & b;
        self.next();
    }
}

/// |`Dxyn`| Draws n-byte sprite to the screen at coordinates (vX, vY)
impl CPU {
    /// |`Dxyn`| Draws n-byte sprite to the screen at coordinates (vX, vY)
    ///
    /// # Quirk
    /// Pixels that fall off the edge of the screen are clipped, unless
    /// [Quirks::screen_wrap] is set.
    #[inline(always)]
    pub(super) fn draw(&mut self, x: Reg, y: Reg, n: Nib) {
        let mut sprite = [0u8; 16];
        let sprite = &mut sprite[..n as usize];
        for (line, byte) in sprite.iter_mut().enumerate() {
            *byte = self.mem.read(self.i as usize + line);
        }
        let collision = self.screen.draw_sprite(
            self.v[x] as usize,
            self.v[y] as usize,
            sprite,
            self.flags.quirks.screen_wrap,
        );
        self.v[0xf] = collision.into();
        self.redraw = true;
        self.next();
    }
}

/// |`Ex9E`| Skip next instruction if key == vX
///
/// |opcode| effect                             |
/// |------|------------------------------------|
/// |`eX9e`| Skip next instruction if key == vX |
/// |`eXa1`| Skip next instruction if key != vX |
///
/// Only the low nibble of vX selects a key.
impl CPU {
    /// |`Ex9E`| Skip next instruction if key == vX
    #[inline(always)]
    pub(super) fn skip_key_equals(&mut self, x: Reg) {
        self.skip_if(self.keys[self.v[x] as usize & 0xf]);
    }
    /// |`ExaE`| Skip next instruction if key != vX
    #[inline(always)]
    pub(super) fn skip_key_not_equals(&mut self, x: Reg) {
        self.skip_if(!self.keys[self.v[x] as usize & 0xf]);
    }
}

/// |`Fxbb`| Performs IO
///
/// |opcode| effect                             |
/// |------|------------------------------------|
/// |`fX07`| Set vX to value in delay timer     |
/// |`fX0a`| Wait for input, store key in vX    |
/// |`fX15`| Set delay timer to the value in vX |
/// |`fX18`| Set sound timer to the value in vX |
/// |`fX1e`| Add vX to I                        |
/// |`fX29`| Load sprite for character x into I |
/// |`fX33`| BCD convert X into I[0..3]         |
/// |`fX55`| DMA Stor from I to registers 0..X  |
/// |`fX65`| DMA Load from I to registers 0..X  |
impl CPU {
    /// |`Fx07`| Get the current DT, and put it in vX
    /// ```py
    /// vX = DT
    /// ```
    #[inline(always)]
    pub(super) fn load_delay_timer(&mut self, x: Reg) {
        self.v[x] = self.delay;
        self.next();
    }
    /// |`Fx0A`| Wait for key, then vX = K
    ///
    /// Doesn't move the program counter until a key is held, so the
    /// instruction runs again on every tick until one is.
    /// If several keys are held, the highest-numbered one wins.
    #[inline(always)]
    pub(super) fn wait_for_key(&mut self, x: Reg) {
        match self.keys.iter().rposition(|&held| held) {
            Some(key) => {
                self.v[x] = key as u8;
                self.flags.keypause = false;
                self.next();
            }
            None => self.flags.keypause = true,
        }
    }
    /// |`Fx15`| Load vX into DT
    /// ```py
    /// DT = vX
    /// ```
    #[inline(always)]
    pub(super) fn store_delay_timer(&mut self, x: Reg) {
        self.delay = self.v[x];
        self.next();
    }
    /// |`Fx18`| Load vX into ST
    /// ```py
    /// ST = vX;
    /// ```
    #[inline(always)]
    pub(super) fn store_sound_timer(&mut self, x: Reg) {
        self.sound = self.v[x];
        self.next();
    }
    /// |`Fx1e`| Add vX to I
    /// ```py
    /// I += vX;
    /// vF = I > 0xfff
    /// ```
    #[inline(always)]
    pub(super) fn add_i(&mut self, x: Reg) {
        let vx = self.v[x] as Adr;
        self.v[0xf] = (self.i as usize + vx as usize > 0xfff).into();
        self.i = self.i.wrapping_add(vx);
        self.next();
    }
    /// |`Fx29`| Load sprite for character vX into I
    /// ```py
    /// I = sprite(X);
    /// ```
    #[inline(always)]
    pub(super) fn load_sprite(&mut self, x: Reg) {
        self.i = mem::FONT_ADDR as Adr + self.v[x] as Adr * mem::GLYPH_SIZE;
        self.next();
    }
    /// |`Fx33`| BCD convert X into I`[0..3]`
    #[inline(always)]
    pub(super) fn bcd_convert(&mut self, x: Reg) {
        let (i, vx) = (self.i as usize, self.v[x]);
        self.mem.write(i, vx / 100);
        self.mem.write(i + 1, vx / 10 % 10);
        self.mem.write(i + 2, vx % 10);
        self.next();
    }
    /// |`Fx55`| DMA Stor from I to registers 0..=X
    ///
    /// I is left pointing just past the last byte written
    /// ```py
    /// for n in range(0, X + 1):
    ///     *(I + n) = vN
    /// I += X + 1
    /// ```
    #[inline(always)]
    pub(super) fn store_dma(&mut self, x: Reg) {
        for n in 0..=x {
            self.mem.write(self.i as usize + n, self.v[n]);
        }
        self.i = self.i.wrapping_add(x as Adr + 1);
        self.next();
    }
    /// |`Fx65`| DMA Load from I to registers 0..=X
    ///
    /// I is left pointing just past the last byte read
    /// ```py
    /// for n in range(0, X + 1):
    ///     vN = *(I + n)
    /// I += X + 1
    /// ```
    #[inline(always)]
    pub(super) fn load_dma(&mut self, x: Reg) {
        for n in 0..=x {
            self.v[n] = self.mem.read(self.i as usize + n);
        }
        self.i = self.i.wrapping_add(x as Adr + 1);
        self.next();
    }
}
