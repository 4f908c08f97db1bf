use anyhow::Result;
use serde::{Deserialize, Serialize};

pub trait Bus {
    fn read_u8(&mut self, addr: u32) -> Result<u8>;
    fn read_u32(&mut self, addr: u32) -> Result<u32>;
    fn write_u8(&mut self, addr: u32, val: u8) -> Result<()>;
    fn write_u32(&mut self, addr: u32, val: u32) -> Result<()>;
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("address {addr:#010x} (+{width}) outside {size:#x}-byte memory")]
pub struct OutOfRange {
    pub addr: u32,
    pub width: u32,
    pub size: usize,
}

/// Word-addressed storage with a byte view whose lanes are big-endian:
/// byte `A` is lane `A % 4` of word `A / 4`, lane 0 being the most
/// significant byte. Aligned word accesses see the stored word unchanged.
#[derive(Clone, Serialize, Deserialize)]
pub struct WordMemory {
    pub words: Vec<u32>,
}

impl WordMemory {
    pub fn new(words: usize) -> Self {
        Self {
            words: vec![0; words],
        }
    }

    pub fn size_bytes(&self) -> usize {
        self.words.len() * 4
    }

    /// Copies a raw image into memory from word 0. Each word is stored
    /// little-endian on disk; a short trailing word is zero-padded.
    pub fn load_image(&mut self, bytes: &[u8]) -> Result<()> {
        anyhow::ensure!(
            bytes.len() <= self.size_bytes(),
            "image of {} bytes does not fit in {} bytes of memory",
            bytes.len(),
            self.size_bytes()
        );
        for (slot, chunk) in self.words.iter_mut().zip(bytes.chunks(4)) {
            let mut w = [0u8; 4];
            w[..chunk.len()].copy_from_slice(chunk);
            *slot = u32::from_le_bytes(w);
        }
        Ok(())
    }

    /// Non-zero words with their byte addresses, in address order.
    pub fn nonzero(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.words
            .iter()
            .enumerate()
            .filter(|(_, w)| **w != 0)
            .map(|(i, w)| ((i * 4) as u32, *w))
    }

    fn check(&self, addr: u32, width: u32) -> Result<()> {
        if addr as usize + width as usize > self.size_bytes() {
            return Err(OutOfRange {
                addr,
                width,
                size: self.size_bytes(),
            }
            .into());
        }
        Ok(())
    }

    fn lane_shift(addr: u32) -> u32 {
        24 - 8 * (addr % 4)
    }

    fn byte(&self, addr: u32) -> u8 {
        (self.words[(addr / 4) as usize] >> Self::lane_shift(addr)) as u8
    }

    fn set_byte(&mut self, addr: u32, val: u8) {
        let shift = Self::lane_shift(addr);
        let w = &mut self.words[(addr / 4) as usize];
        *w = (*w & !(0xFF << shift)) | ((val as u32) << shift);
    }
}

impl Bus for WordMemory {
    fn read_u8(&mut self, addr: u32) -> Result<u8> {
        self.check(addr, 1)?;
        Ok(self.byte(addr))
    }

    fn read_u32(&mut self, addr: u32) -> Result<u32> {
        self.check(addr, 4)?;
        Ok((0..4).fold(0u32, |acc, i| (acc << 8) | self.byte(addr + i) as u32))
    }

    fn write_u8(&mut self, addr: u32, val: u8) -> Result<()> {
        self.check(addr, 1)?;
        self.set_byte(addr, val);
        Ok(())
    }

    fn write_u32(&mut self, addr: u32, val: u32) -> Result<()> {
        self.check(addr, 4)?;
        for (i, b) in val.to_be_bytes().into_iter().enumerate() {
            self.set_byte(addr + i as u32, b);
        }
        Ok(())
    }
}
