use crate::instr::Instr;
use crate::{Error, Simplex};

/// A compiler that takes simplex pattern text and produces code for
/// [`crate::vm::SimplexVM`].
///
/// The compiler is a single-pass state machine with one byte of lookahead.
/// It never produces a partial program: any syntax error aborts the
/// compilation and the pattern text is not retained.
pub struct Compiler {
    size_limit: Option<usize>,
}

impl Compiler {
    /// Creates a new compiler.
    pub fn new() -> Self {
        Self { size_limit: None }
    }

    /// Specifies the maximum size, in bytes, of the compiled program.
    ///
    /// Compilation fails with [`Error::TooLarge`] when the code emitted for
    /// a pattern exceeds this limit. By default there is no limit.
    pub fn size_limit(mut self, limit: usize) -> Self {
        self.size_limit = Some(limit);
        self
    }

    /// Compiles `pattern` into a [`Simplex`] program.
    ///
    /// Compilation is deterministic: the same pattern always compiles to a
    /// byte-identical program.
    pub fn compile(self, pattern: &[u8]) -> Result<Simplex, Error> {
        let mut seq = InstrSeq::new(pattern.len());

        // `negate_pending` tracks a NEGATE waiting for its unit, both for
        // collapsing `!!` into a single NEGATE and for rejecting a dangling
        // `!` at the end of the pattern. `quantifier_pending` tracks a
        // quantifier waiting for the unit it wraps.
        let mut negate_pending = false;
        let mut quantifier_pending = false;

        let mut i = 0;
        while i < pattern.len() {
            match pattern[i] {
                b'\\' => {
                    seq.emit_literal(Self::escaped_byte(pattern, i)?);
                    negate_pending = false;
                    quantifier_pending = false;
                    i += 2;
                }
                b'!' => {
                    // The negate flag is a boolean, not a toggle counter:
                    // `!!` emits one NEGATE.
                    if !negate_pending {
                        seq.emit_negate();
                        negate_pending = true;
                    }
                    i += 1;
                }
                shorthand @ (b'*' | b'+' | b'?') => {
                    if quantifier_pending {
                        return Err(Error::NestedQuantifier(i));
                    }
                    let (min, max) = match shorthand {
                        b'*' => (0, Instr::QUANTIFY_INF),
                        b'+' => (1, Instr::QUANTIFY_INF),
                        _ => (0, 1),
                    };
                    seq.emit_quantifier(min, max);
                    quantifier_pending = true;
                    // A `!` inside the quantified unit is a fresh scope.
                    negate_pending = false;
                    i += 1;
                }
                b'{' => {
                    if quantifier_pending {
                        return Err(Error::NestedQuantifier(i));
                    }
                    i = Self::parse_bounded_quantifier(pattern, i, &mut seq)?;
                    quantifier_pending = true;
                    negate_pending = false;
                }
                b'[' => {
                    i = Self::parse_any_group(pattern, i, &mut seq)?;
                    negate_pending = false;
                    quantifier_pending = false;
                }
                byte => {
                    seq.emit_literal(Self::ascii_byte(byte, i)?);
                    negate_pending = false;
                    quantifier_pending = false;
                    i += 1;
                }
            }
        }

        if negate_pending || quantifier_pending {
            return Err(Error::UnterminatedOperator(pattern.len()));
        }

        seq.emit_match();

        let code = seq.into_inner();

        if let Some(limit) = self.size_limit {
            if code.len() > limit {
                return Err(Error::TooLarge);
            }
        }

        Ok(Simplex::from_code(code))
    }

    /// Parses a `{m,n}` quantifier with `i` at the opening brace, emits the
    /// instruction, and returns the position right after the closing brace.
    /// A missing `m` defaults to 0, a missing `n` to unbounded.
    fn parse_bounded_quantifier(
        pattern: &[u8],
        i: usize,
        seq: &mut InstrSeq,
    ) -> Result<usize, Error> {
        let mut j = i + 1;

        let min = Self::quantifier_bound(pattern, &mut j)?;
        if pattern.get(j) != Some(&b',') {
            return Err(Error::MalformedQuantifier(j));
        }
        j += 1;

        let max = Self::quantifier_bound(pattern, &mut j)?;
        if pattern.get(j) != Some(&b'}') {
            return Err(Error::MalformedQuantifier(j));
        }

        seq.emit_quantifier(
            min.unwrap_or(0),
            max.unwrap_or(Instr::QUANTIFY_INF),
        );

        Ok(j + 1)
    }

    /// Reads one quantifier bound: up to 3 ASCII digits with a value of at
    /// most [`Instr::QUANTIFY_MAX`]. Returns `None` when no digits are
    /// present, leaving `j` untouched.
    fn quantifier_bound(
        pattern: &[u8],
        j: &mut usize,
    ) -> Result<Option<u8>, Error> {
        let start = *j;
        let mut value: u16 = 0;
        while let Some(&digit) = pattern.get(*j) {
            if !digit.is_ascii_digit() {
                break;
            }
            if *j - start == 3 {
                return Err(Error::MalformedQuantifier(*j));
            }
            value = value * 10 + u16::from(digit - b'0');
            *j += 1;
        }
        if *j == start {
            return Ok(None);
        }
        if value > u16::from(Instr::QUANTIFY_MAX) {
            return Err(Error::MalformedQuantifier(start));
        }
        Ok(Some(value as u8))
    }

    /// Parses a `[...]` character class with `i` at the opening bracket,
    /// emits the group, and returns the position right after the closing
    /// bracket. Ranges (`-AB`) must come first; every other byte is a
    /// literal entry. An unescaped `]` closes the group.
    fn parse_any_group(
        pattern: &[u8],
        i: usize,
        seq: &mut InstrSeq,
    ) -> Result<usize, Error> {
        seq.emit_any_start();

        let mut j = i + 1;
        let mut entries = 0;

        while pattern.get(j) == Some(&b'-') {
            let (lo, next) = Self::range_bound(pattern, j + 1)?;
            let (hi, next) = Self::range_bound(pattern, next)?;
            seq.emit_range(lo, hi);
            entries += 1;
            j = next;
        }

        loop {
            match pattern.get(j) {
                None => {
                    return Err(Error::UnterminatedOperator(pattern.len()))
                }
                Some(&b']') => break,
                Some(&b'\\') => {
                    seq.emit_literal(Self::escaped_byte(pattern, j)?);
                    entries += 1;
                    j += 2;
                }
                Some(&byte) => {
                    seq.emit_literal(Self::ascii_byte(byte, j)?);
                    entries += 1;
                    j += 1;
                }
            }
        }

        if entries == 0 {
            // The group was closed before any content.
            return Err(Error::MalformedRange(j));
        }

        seq.emit_any_end();

        Ok(j + 1)
    }

    /// Reads one bound of a range inside a class. The bound may be escaped;
    /// an unescaped `]` here is an error, as a range is always two bytes.
    fn range_bound(pattern: &[u8], j: usize) -> Result<(u8, usize), Error> {
        match pattern.get(j) {
            None => Err(Error::UnterminatedOperator(pattern.len())),
            Some(&b']') => Err(Error::MalformedRange(j)),
            Some(&b'\\') => Ok((Self::escaped_byte(pattern, j)?, j + 2)),
            Some(&byte) => Ok((Self::ascii_byte(byte, j)?, j + 1)),
        }
    }

    /// Returns the byte escaped by the backslash at `i`. The escape strips
    /// any syntactic meaning from the byte that follows.
    fn escaped_byte(pattern: &[u8], i: usize) -> Result<u8, Error> {
        match pattern.get(i + 1) {
            Some(&byte) => Self::ascii_byte(byte, i + 1),
            None => Err(Error::UnterminatedOperator(pattern.len())),
        }
    }

    /// The instruction encoding reserves the high bit for operators, so the
    /// pattern alphabet is 7-bit ASCII only.
    fn ascii_byte(byte: u8, offset: usize) -> Result<u8, Error> {
        if byte & 0x80 != 0 {
            return Err(Error::UnsupportedByte(offset));
        }
        Ok(byte)
    }
}

/// Helper type for emitting a sequence of instructions for
/// [`crate::vm::SimplexVM`].
struct InstrSeq {
    seq: Vec<u8>,
}

impl InstrSeq {
    /// Creates an [`InstrSeq`] sized for the worst-case expansion of a
    /// pattern of `pattern_len` bytes. A one-byte shorthand quantifier
    /// expands to a three-byte instruction, no other token grows, and the
    /// terminating MATCH adds one byte, so no reallocation can happen
    /// while emitting.
    fn new(pattern_len: usize) -> Self {
        Self { seq: Vec::with_capacity(3 * pattern_len + 1) }
    }

    /// Consumes the [`InstrSeq`] and returns the inner vector that contains
    /// the code.
    fn into_inner(self) -> Vec<u8> {
        self.seq
    }

    fn emit_match(&mut self) {
        self.seq.push(Instr::MATCH);
    }

    fn emit_negate(&mut self) {
        self.seq.push(Instr::NEGATE);
    }

    fn emit_literal(&mut self, byte: u8) {
        self.seq.push(byte);
    }

    fn emit_quantifier(&mut self, min: u8, max: u8) {
        self.seq.extend_from_slice(&[Instr::QUANTIFY, min, max]);
    }

    fn emit_any_start(&mut self) {
        self.seq.push(Instr::ANY_START);
    }

    fn emit_range(&mut self, lo: u8, hi: u8) {
        self.seq.extend_from_slice(&[Instr::RANGE, lo, hi]);
    }

    fn emit_any_end(&mut self) {
        self.seq.push(Instr::ANY_END);
    }
}
