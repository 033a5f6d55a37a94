use std::convert::TryFrom;
use std::iter::FromIterator;
use byteorder::{ByteOrder, LittleEndian};
use super::consts::{MAGIC, HEADER_LEN};
use super::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct SpirvBinary(Vec<u32>);
impl From<Vec<u32>> for SpirvBinary {
    fn from(x: Vec<u32>) -> Self { SpirvBinary(x) }
}
impl FromIterator<u32> for SpirvBinary {
    fn from_iter<I: IntoIterator<Item=u32>>(iter: I) -> Self { SpirvBinary(iter.into_iter().collect::<Vec<u32>>()) }
}
/// Decode a little-endian SPIR-V file.
impl TryFrom<&[u8]> for SpirvBinary {
    type Error = Error;
    fn try_from(buf: &[u8]) -> Result<SpirvBinary> {
        if buf.len() % 4 != 0 || buf.len() < HEADER_LEN * 4 {
            return Err(Error::CorruptedSpirv);
        }
        let mut words = vec![0; buf.len() / 4];
        LittleEndian::read_u32_into(buf, &mut words);
        if words[0] != MAGIC { return Err(Error::CorruptedSpirv); }
        Ok(SpirvBinary(words))
    }
}

impl SpirvBinary {
    pub fn words(&self) -> &[u32] { &self.0 }
    pub fn into_words(self) -> Vec<u32> { self.0 }
    pub fn instrs<'a>(&'a self) -> Result<Instrs<'a>> {
        if self.0.len() < HEADER_LEN || self.0[0] != MAGIC {
            return Err(Error::CorruptedSpirv);
        }
        Ok(Instrs(&self.0[HEADER_LEN..]))
    }
}

/// Instruction iterator. A truncated instruction yields an error and ends
/// the iteration.
pub struct Instrs<'a>(&'a [u32]);
impl<'a> Iterator for Instrs<'a> {
    type Item = Result<Instr<'a>>;
    fn next(&mut self) -> Option<Self::Item> {
        let head = *self.0.first()?;
        let len = (head >> 16) as usize;
        if len == 0 || len > self.0.len() {
            self.0 = &[];
            return Some(Err(Error::CorruptedSpirv));
        }
        let instr = Instr {
            opcode: head & 0xFFFF,
            operands: &self.0[1..len],
        };
        self.0 = &self.0[len..];
        Some(Ok(instr))
    }
}

pub struct Instr<'a> {
    opcode: u32,
    operands: &'a [u32],
}
impl<'a> Instr<'a> {
    /// Get the opcode of the instruction.
    pub fn opcode(&self) -> u32 { self.opcode }
    /// Get the word count of the instruction, including the first word
    /// containing the word count and opcode.
    pub fn word_count(&self) -> usize { self.operands.len() + 1 }
    pub fn operands(&self) -> Operands<'a> {
        Operands(self.operands)
    }
}

pub struct Operands<'a>(&'a [u32]);
impl<'a> Operands<'a> {
    pub fn read_bool(&mut self) -> Result<bool> { self.read_u32().map(|x| x != 0) }
    pub fn read_u32(&mut self) -> Result<u32> {
        if let Some(x) = self.0.first() {
            self.0 = &self.0[1..];
            Ok(*x)
        } else { Err(Error::CorruptedSpirv) }
    }
    /// Read a nul-terminated UTF-8 literal string packed into words.
    pub fn read_str(&mut self) -> Result<String> {
        let mut buf = vec![0u8; self.0.len() * 4];
        LittleEndian::write_u32_into(self.0, &mut buf);
        let nul_pos = buf.iter()
            .position(|x| *x == 0)
            .ok_or(Error::CorruptedSpirv)?;
        buf.truncate(nul_pos);
        self.0 = &self.0[nul_pos / 4 + 1..];
        String::from_utf8(buf).map_err(|_| Error::CorruptedSpirv)
    }
    pub fn read_list(&mut self) -> Result<&'a [u32]> {
        let rv = self.0;
        self.0 = &[];
        Ok(rv)
    }
}
