//! Per-register access policies
//!
//! Every register index has exactly one write policy and one read policy.
//! Tables are built once per generation from the offset lists in `scu-raw`
//! and never change afterwards.

use scu_raw::to_reg;

/// What a bus write does to the register file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WritePolicy {
    /// cell := value
    #[default]
    Plain,
    /// Dropped with a guest-error report
    ReadOnly,
    /// cell := 1 if value is the protection key, else 0
    ProtectionKey,
    /// cell |= value
    SetBits,
    /// regs[target] &= !value, own cell untouched
    ClearBits { target: usize },
    /// Dropped while regs[protect] is non-zero, else cell |= value
    ProtectedSetBits { protect: usize },
}

/// What a bus read returns and does
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReadPolicy {
    #[default]
    Plain,
    /// Refill the cell from the random source and return the new value
    Random,
    /// Return the shadow value with a guest-error report
    WriteOnly,
    /// Return the cell with the PLL lock bit forced on
    PllLocked,
}

#[derive(Debug, Clone)]
pub struct PolicyTable {
    write: Vec<WritePolicy>,
    read: Vec<ReadPolicy>,
}

impl PolicyTable {
    pub fn builder(nr_regs: usize) -> PolicyTableBuilder {
        PolicyTableBuilder {
            table: PolicyTable {
                write: vec![WritePolicy::Plain; nr_regs],
                read: vec![ReadPolicy::Plain; nr_regs],
            },
        }
    }

    pub fn len(&self) -> usize {
        self.write.len()
    }

    pub fn is_empty(&self) -> bool {
        self.write.is_empty()
    }

    /// Write policy of register `reg`; `Plain` past the end of the file
    pub fn write_policy(&self, reg: usize) -> WritePolicy {
        self.write.get(reg).copied().unwrap_or_default()
    }

    /// Read policy of register `reg`; `Plain` past the end of the file
    pub fn read_policy(&self, reg: usize) -> ReadPolicy {
        self.read.get(reg).copied().unwrap_or_default()
    }

    /// Register cleared by writes to `reg`, if `reg` is a clear register
    pub fn clear_target(&self, reg: usize) -> Option<usize> {
        match self.write_policy(reg) {
            WritePolicy::ClearBits { target } => Some(target),
            _ => None,
        }
    }

    /// Registers with a non-plain write policy, in index order
    pub fn special_writes(&self) -> impl Iterator<Item = (usize, WritePolicy)> + '_ {
        self.write
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, policy)| *policy != WritePolicy::Plain)
    }
}

/// Assembles a [`PolicyTable`] from byte offsets
///
/// Offsets past the register file are a bug in the static tables and panic
/// when the table is first built.
pub struct PolicyTableBuilder {
    table: PolicyTable,
}

impl PolicyTableBuilder {
    pub fn write(mut self, offset: u32, policy: WritePolicy) -> Self {
        let reg = self.index(offset);
        self.table.write[reg] = policy;
        self
    }

    pub fn read(mut self, offset: u32, policy: ReadPolicy) -> Self {
        let reg = self.index(offset);
        self.table.read[reg] = policy;
        self
    }

    pub fn read_only(self, offsets: &[u32]) -> Self {
        offsets
            .iter()
            .fold(self, |b, &off| b.write(off, WritePolicy::ReadOnly))
    }

    pub fn set_bits(self, offsets: &[u32]) -> Self {
        offsets
            .iter()
            .fold(self, |b, &off| b.write(off, WritePolicy::SetBits))
    }

    /// `(clear register, target register)` pairs
    pub fn clear_pairs(self, pairs: &[(u32, u32)]) -> Self {
        pairs.iter().fold(self, |b, &(clear, target)| {
            b.write(
                clear,
                WritePolicy::ClearBits {
                    target: to_reg(target),
                },
            )
        })
    }

    /// `(strap register, protect register)` pairs
    pub fn protected_straps(self, pairs: &[(u32, u32)]) -> Self {
        pairs.iter().fold(self, |b, &(strap, protect)| {
            b.write(
                strap,
                WritePolicy::ProtectedSetBits {
                    protect: to_reg(protect),
                },
            )
        })
    }

    pub fn build(self) -> PolicyTable {
        self.table
    }

    fn index(&self, offset: u32) -> usize {
        let reg = to_reg(offset);
        assert!(
            reg < self.table.len(),
            "offset 0x{offset:X} outside a {}-register file",
            self.table.len()
        );
        reg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_plain() {
        let table = PolicyTable::builder(4).build();
        assert_eq!(table.len(), 4);
        assert_eq!(table.write_policy(3), WritePolicy::Plain);
        assert_eq!(table.read_policy(3), ReadPolicy::Plain);
        assert_eq!(table.special_writes().count(), 0);
    }

    #[test]
    fn test_out_of_range_lookup_is_plain() {
        let table = PolicyTable::builder(4).read_only(&[0x0]).build();
        assert_eq!(table.write_policy(100), WritePolicy::Plain);
        assert_eq!(table.read_policy(100), ReadPolicy::Plain);
    }

    #[test]
    fn test_clear_pairs_point_at_target() {
        let table = PolicyTable::builder(8).clear_pairs(&[(0x14, 0x10)]).build();
        assert_eq!(table.clear_target(5), Some(4));
        assert_eq!(table.clear_target(4), None);
    }

    #[test]
    fn test_protected_straps() {
        let table = PolicyTable::builder(8)
            .protected_straps(&[(0x00, 0x08)])
            .build();
        assert_eq!(
            table.write_policy(0),
            WritePolicy::ProtectedSetBits { protect: 2 }
        );
    }

    #[test]
    fn test_later_entries_override() {
        let table = PolicyTable::builder(4)
            .read_only(&[0x4])
            .write(0x4, WritePolicy::SetBits)
            .build();
        assert_eq!(table.write_policy(1), WritePolicy::SetBits);
    }

    #[test]
    #[should_panic(expected = "outside")]
    fn test_builder_rejects_offset_past_file() {
        let _ = PolicyTable::builder(2).read_only(&[0x8]);
    }
}
