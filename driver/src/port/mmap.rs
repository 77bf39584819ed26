use crate::port::IoPort;
use crate::LcdResult;
use log::debug;
use memmap2::{MmapOptions, MmapRaw};
use std::fmt::{Debug, Formatter};
use std::fs::OpenOptions;
use std::path::Path;

/// An [IoPort] over one byte of a memory-mapped physical page, for hosted Linux targets
/// that expose their I/O registers through `/dev/mem` or `/dev/gpiomem`.
pub struct MmapPort {
    mmap: MmapRaw,
    offset: usize,
    address: u64,
}

impl MmapPort {
    const PAGE_SIZE: u64 = 4096;

    /// Maps the page containing `address` from the device (or file) at `path`.
    pub fn create(path: impl AsRef<Path>, address: u64) -> LcdResult<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path.as_ref())?;

        let page = address & !(Self::PAGE_SIZE - 1);
        let mmap = MmapOptions::new()
            .offset(page)
            .len(Self::PAGE_SIZE as usize)
            .map_raw(&file)?;

        debug!("Mapped {} page {:#x} for register {:#x}", path.as_ref().display(), page, address);

        Ok(MmapPort {
            mmap,
            offset: (address - page) as usize,
            address,
        })
    }

    /// Maps the register at physical `address` through `/dev/mem` (needs root).
    pub fn new_mem(address: u64) -> LcdResult<Self> {
        Self::create("/dev/mem", address)
    }

    /// Maps the register at `offset` inside the GPIO block exposed by `/dev/gpiomem`.
    pub fn new_gpiomem(offset: u64) -> LcdResult<Self> {
        Self::create("/dev/gpiomem", offset)
    }

    pub fn address(&self) -> u64 {
        self.address
    }
}

impl Debug for MmapPort {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "MmapPort({:#x})", self.address)
    }
}

impl IoPort for MmapPort {
    #[inline(always)]
    fn read(&self) -> u8 {
        // SAFETY: offset < PAGE_SIZE, the mapping lives as long as self.
        unsafe { self.mmap.as_ptr().add(self.offset).read_volatile() }
    }

    #[inline(always)]
    fn write(&self, value: u8) {
        // SAFETY: offset < PAGE_SIZE, the mapping lives as long as self.
        unsafe { self.mmap.as_mut_ptr().add(self.offset).write_volatile(value) }
    }
}
