//! File access for the editing session: memory-mapped reads and atomic writes.

pub mod atomic;
pub mod mmap;
