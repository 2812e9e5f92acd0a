use std::sync::OnceLock;

use regex::Regex;

/// Number of integer registers; FP register `fN` is logged as `x(N + 32)`.
pub const FP_REG_OFFSET: u32 = 32;

/// Register file named by a Spike register write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegFile {
    Int,
    Float,
}

/// Architectural effect of one committed instruction, as logged by Spike.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect<'a> {
    /// Store with address and data.
    Store { addr: &'a str, data: &'a str },
    /// Integer or FP register write.
    RegWrite {
        file: RegFile,
        index: u32,
        value: &'a str,
    },
    /// Nothing the golden log records (branches, loads without data, CSR-only
    /// updates).
    None,
}

/// A parsed `--log-commits` line.
///
/// Hex fields borrow the original spelling so widths survive conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpikeCommit<'a> {
    pub pc: &'a str,
    pub pc_value: u64,
    pub insn: &'a str,
    pub effect: Effect<'a>,
}

impl<'a> SpikeCommit<'a> {
    /// Parse a Spike commit line.
    ///
    /// Handles lines of the form
    /// `core   0: 3 0x<PC> (0x<INSN>) [x<N>|f<N> 0x<VALUE>] [mem 0x<ADDR> [0x<DATA>]]`.
    /// Lines without a privilege level (plain instruction logging) or without
    /// a PC/instruction pair are rejected.
    pub fn parse(line: &'a str) -> Option<Self> {
        let caps = base_pattern().captures(line)?;
        let pc = caps.get(1)?.as_str();
        let insn = caps.get(2)?.as_str();
        let pc_value = u64::from_str_radix(&pc[2..], 16).ok()?;

        Some(Self {
            pc,
            pc_value,
            insn,
            effect: parse_effect(line),
        })
    }

    /// Unified register index: `xN` stays `N`, `fN` becomes `N + 32`.
    #[must_use]
    pub const fn unified_reg(&self) -> Option<u32> {
        match self.effect {
            Effect::RegWrite {
                file: RegFile::Int,
                index,
                ..
            } => Some(index),
            Effect::RegWrite {
                file: RegFile::Float,
                index,
                ..
            } => Some(index.saturating_add(FP_REG_OFFSET)),
            _ => None,
        }
    }
}

fn parse_effect(line: &str) -> Effect<'_> {
    // A store carries both address and data; a load only logs the address and
    // is described by its register write instead.
    if let Some(caps) = mem_pattern().captures(line) {
        if let (Some(addr), Some(data)) = (caps.get(1), caps.get(2)) {
            return Effect::Store {
                addr: addr.as_str(),
                data: data.as_str(),
            };
        }
    }

    if let Some(caps) = reg_pattern().captures(line) {
        let file = match caps.get(1).map(|m| m.as_str()) {
            Some("f") => RegFile::Float,
            _ => RegFile::Int,
        };
        let index = caps.get(2).and_then(|m| m.as_str().parse::<u32>().ok());
        if let (Some(index), Some(value)) = (index, caps.get(3)) {
            return Effect::RegWrite {
                file,
                index,
                value: value.as_str(),
            };
        }
    }

    Effect::None
}

fn base_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"core\s+\d+:\s+\d\s+(0x[0-9a-fA-F]+)\s+\((0x[0-9a-fA-F]+)\)")
            .expect("valid commit pattern")
    })
}

fn reg_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\s+([xf])(\d+)\s+(0x[0-9a-fA-F]+)").expect("valid register pattern")
    })
}

fn mem_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"mem\s+(0x[0-9a-fA-F]+)(?:\s+(0x[0-9a-fA-F]+))?")
            .expect("valid memory pattern")
    })
}
