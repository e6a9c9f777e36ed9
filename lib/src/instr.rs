use crate::instr::Instr::{AnyGroup, Literal, Match, Negate, Quantify};

/// Instructions supported by the simplex VM.
///
/// The compiled form is a flat byte sequence. Literal data is always 7-bit
/// (the pattern alphabet is restricted to ASCII), so the high bit of every
/// opcode is what tells operators apart from data.
pub(crate) enum Instr<'a> {
    /// The program is exhausted, the match has succeeded.
    Match,

    /// Invert the verdict of the next matching unit. One-shot: the flag
    /// scopes over exactly one unit.
    Negate,

    /// Match a single literal byte.
    Literal(u8),

    /// Greedily match the unit that follows between `min` and `max` times.
    /// A `max` of [`Instr::QUANTIFY_INF`] means no upper bound.
    Quantify { min: u8, max: u8 },

    /// Match a single byte against a character class.
    AnyGroup(AnyGroupEntries<'a>),
}

impl<'a> Instr<'a> {
    /// Largest encodable quantifier bound.
    pub const QUANTIFY_MAX: u8 = 0xFE;
    /// Sentinel for an unbounded upper bound. Distinct from every value a
    /// finite bound can take.
    pub const QUANTIFY_INF: u8 = 0xFF;

    pub const MATCH: u8 = 0x80;
    pub const NEGATE: u8 = 0x81;
    pub const QUANTIFY: u8 = 0x82;
    pub const ANY_START: u8 = 0x83;
    pub const RANGE: u8 = 0x84;
    pub const ANY_END: u8 = 0x85;
}

/// The entries of a compiled character class: the bytes found between
/// `ANY_START` and `ANY_END` in the code. Zero or more `RANGE lo hi`
/// triples followed by zero or more literal entry bytes.
#[derive(Clone, Copy)]
pub(crate) struct AnyGroupEntries<'a> {
    entries: &'a [u8],
}

impl<'a> AnyGroupEntries<'a> {
    /// Returns true if `byte` matches some range or literal entry. Entries
    /// are tested in encoded order, first hit wins.
    pub fn contains(&self, byte: u8) -> bool {
        let mut entries = self.entries;
        while let [Instr::RANGE, lo, hi, rest @ ..] = entries {
            if *lo <= byte && byte <= *hi {
                return true;
            }
            entries = rest;
        }
        // Whatever remains after the ranges are plain literal entries.
        memchr::memchr(byte, entries).is_some()
    }

    pub fn iter(&self) -> EntriesIter<'a> {
        EntriesIter { entries: self.entries }
    }
}

/// An entry in a character class, in decoded form.
pub(crate) enum ClassEntry {
    Range(u8, u8),
    Literal(u8),
}

pub(crate) struct EntriesIter<'a> {
    entries: &'a [u8],
}

impl Iterator for EntriesIter<'_> {
    type Item = ClassEntry;

    fn next(&mut self) -> Option<Self::Item> {
        match self.entries {
            [] => None,
            [Instr::RANGE, lo, hi, rest @ ..] => {
                let entry = ClassEntry::Range(*lo, *hi);
                self.entries = rest;
                Some(entry)
            }
            [byte, rest @ ..] => {
                let entry = ClassEntry::Literal(*byte);
                self.entries = rest;
                Some(entry)
            }
        }
    }
}

/// Parses a slice of bytes that contains simplex VM instructions, returning
/// individual instructions and the address they were decoded from.
pub(crate) struct InstrParser<'a> {
    code: &'a [u8],
    addr: usize,
}

impl<'a> InstrParser<'a> {
    pub fn new(code: &'a [u8]) -> Self {
        Self { code, addr: 0 }
    }

    /// Decodes the instruction at the start of `code`, returning it together
    /// with its encoded size. The code is trusted: it can only come from a
    /// successful compilation, so malformed code is a bug, not an error.
    #[inline(always)]
    pub(crate) fn decode_instr(code: &[u8]) -> (Instr, usize) {
        match code[..] {
            [byte, ..] if byte & 0x80 == 0 => (Literal(byte), 1),
            [Instr::MATCH, ..] => (Match, 1),
            [Instr::NEGATE, ..] => (Negate, 1),
            [Instr::QUANTIFY, min, max, ..] => (Quantify { min, max }, 3),
            [Instr::ANY_START, ..] => {
                match memchr::memchr(Instr::ANY_END, &code[1..]) {
                    Some(len) => (
                        AnyGroup(AnyGroupEntries {
                            entries: &code[1..1 + len],
                        }),
                        // ANY_START + entries + ANY_END.
                        1 + len + 1,
                    ),
                    None => {
                        unreachable!("class without ANY_END terminator")
                    }
                }
            }
            [opcode, ..] => {
                unreachable!("unknown opcode for SimplexVM: {:#04x}", opcode)
            }
            _ => unreachable!(),
        }
    }
}

impl<'a> Iterator for InstrParser<'a> {
    type Item = (Instr<'a>, usize);

    fn next(&mut self) -> Option<Self::Item> {
        if self.code.is_empty() {
            return None;
        }
        let (instr, size) = InstrParser::decode_instr(self.code);
        let addr = self.addr;
        self.code = &self.code[size..];
        self.addr += size;
        Some((instr, addr))
    }
}
