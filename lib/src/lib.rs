/*! This crate compiles and executes simplex expressions.

A simplex expression is a small pattern-matching language: a restricted,
single-lookahead alternative to regular expressions for validating and
tokenizing byte streams. A pattern is compiled once into a compact
instruction sequence, and a tiny virtual machine evaluates that sequence
against an input source one element at a time.

The supported syntax:

- A plain byte matches itself; `\X` matches `X` for any byte `X`, stripping
  any syntactic meaning it would otherwise have.

- `!` inverts the verdict of the unit that follows it.

- `*`, `+` and `?` greedily match the unit that follows zero or more, one
  or more, and zero or one times. `{m,n}` matches between `m` and `n` times
  with each bound up to 254; a missing `m` means 0, a missing `n` means
  unbounded.

- `[...]` matches one byte against a character class. Inside the brackets,
  `-AB` declares the inclusive range `A` to `B` (ranges come first), any
  other byte is a literal entry, and an unescaped `]` closes the class.

Two deliberate departures from regular expressions:

- **No backtracking.** A quantifier commits to the count its greedy scan
  produced. `*aa` can never match: the quantified `a` swallows every `a`,
  leaving none for the literal that follows. Matching cost is linear in
  the input consumed, always.

- **Prefix matching.** A match succeeds as soon as the program is
  exhausted; trailing unconsumed input is not examined, which is what makes
  the engine usable for tokenizing a stream in place.

Patterns are 7-bit ASCII: the compiled form reserves the high bit of each
byte to tell operators apart from literal data.

# Example

```
use simplex::Simplex;

let expr = Simplex::new("foo+ bar")?;

assert!(expr.matches(b"foo bar"));
assert!(expr.matches(b"foo bar and beyond")); // prefix match
assert!(!expr.matches(b"foobar"));

// Any peekable byte iterator works as an input source.
let expr = Simplex::new("a{1,3}[-09]")?;
let mut stream = "a15 rest".bytes().peekable();
assert!(expr.matches_input(&mut stream));
# Ok::<(), simplex::Error>(())
```
*/

pub use crate::compiler::Compiler;
pub use crate::input::Input;

mod compiler;
mod input;
mod instr;
mod vm;

#[cfg(test)]
mod tests;

use std::fmt::{Display, Formatter};

use thiserror::Error;

use crate::instr::{ClassEntry, Instr, InstrParser};
use crate::vm::SimplexVM;

/// Errors returned while compiling a pattern.
///
/// All of them are fail-fast: no partial program is produced or retained.
/// Matching itself has no error channel, it trusts the program that a
/// successful compilation produced. Offsets point into the pattern text.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    /// A quantifier bound has more than 3 digits or a value above 254, or
    /// the `,`/`}` that was expected next is missing.
    #[error("malformed quantifier at offset {0}")]
    MalformedQuantifier(usize),

    /// A quantifier was applied to another quantifier.
    #[error("nested quantifier at offset {0}")]
    NestedQuantifier(usize),

    /// An unescaped `]` where a range bound was expected, or a class with
    /// no content at all.
    #[error("malformed range at offset {0}")]
    MalformedRange(usize),

    /// The pattern ended while `!`, a quantifier or a class still expected
    /// more input.
    #[error("unterminated simplex operator at offset {0}")]
    UnterminatedOperator(usize),

    /// Patterns are restricted to 7-bit ASCII; the instruction encoding
    /// reserves the high bit.
    #[error("unsupported non-ascii byte at offset {0}")]
    UnsupportedByte(usize),

    /// The compiled program exceeds the limit set with
    /// [`Compiler::size_limit`].
    #[error("pattern too large")]
    TooLarge,
}

/// A compiled simplex expression.
///
/// Produced once per pattern by [`Simplex::new`] or [`Compiler::compile`],
/// then reused across arbitrarily many match calls. The compiled program is
/// immutable and self-contained, so a `Simplex` can be shared freely across
/// threads; every match call gets its own ephemeral state.
///
/// The `Display` implementation renders the compiled instructions, which is
/// handy when a pattern does not do what you expect:
///
/// ```
/// # use simplex::Simplex;
/// let expr = Simplex::new("!a")?;
/// assert_eq!(
///     expr.to_string(),
///     "\n00000: NEGATE\n00001: LIT 0x61\n00002: MATCH\n",
/// );
/// # Ok::<(), simplex::Error>(())
/// ```
#[derive(Clone, Debug)]
pub struct Simplex {
    code: Vec<u8>,
}

impl Simplex {
    /// Compiles `pattern` with the default compiler settings.
    pub fn new<P: AsRef<[u8]>>(pattern: P) -> Result<Self, Error> {
        Compiler::new().compile(pattern.as_ref())
    }

    /// Returns true if some prefix of `data` matches the expression.
    pub fn matches(&self, data: &[u8]) -> bool {
        self.matches_input(&mut data.iter().copied().peekable())
    }

    /// Returns true if some prefix of `input` matches the expression,
    /// reading the input one element at a time.
    ///
    /// Elements the match looked at are consumed from the source, including
    /// the elements of a failed match; callers that want to retry at
    /// another position must arrange that themselves.
    pub fn matches_input<I: Input>(&self, input: &mut I) -> bool {
        SimplexVM::new(&self.code).try_match(input)
    }

    pub(crate) fn from_code(code: Vec<u8>) -> Self {
        Self { code }
    }

    #[cfg(test)]
    pub(crate) fn code(&self) -> &[u8] {
        &self.code
    }
}

impl Display for Simplex {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f)?;

        for (instr, addr) in InstrParser::new(&self.code) {
            match instr {
                Instr::Literal(byte) => {
                    writeln!(f, "{:05x}: LIT {:#04x}", addr, byte)?;
                }
                Instr::Negate => {
                    writeln!(f, "{:05x}: NEGATE", addr)?;
                }
                Instr::Quantify { min, max } => {
                    if max == Instr::QUANTIFY_INF {
                        writeln!(f, "{:05x}: QUANTIFY {},INF", addr, min)?;
                    } else {
                        writeln!(
                            f,
                            "{:05x}: QUANTIFY {},{}",
                            addr, min, max
                        )?;
                    }
                }
                Instr::AnyGroup(class) => {
                    write!(f, "{:05x}: ANY", addr)?;
                    for entry in class.iter() {
                        match entry {
                            ClassEntry::Range(lo, hi) => {
                                write!(f, " [{:#04x}-{:#04x}]", lo, hi)?;
                            }
                            ClassEntry::Literal(byte) => {
                                write!(f, " {:#04x}", byte)?;
                            }
                        }
                    }
                    writeln!(f)?;
                }
                Instr::Match => {
                    writeln!(f, "{:05x}: MATCH", addr)?;
                    break;
                }
            }
        }

        Ok(())
    }
}
