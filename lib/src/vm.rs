use crate::input::Input;
use crate::instr::{Instr, InstrParser};

/// A virtual machine that executes compiled simplex code against an input
/// source.
///
/// Execution is a single forward scan over the instructions, with no
/// backtracking: every instruction gets exactly one chance to match, and a
/// quantifier commits to the count its greedy scan produced. The first
/// failing instruction aborts the match; decoding the terminating MATCH
/// means the whole program was satisfied by some prefix of the input.
pub(crate) struct SimplexVM<'r> {
    /// The code for the VM. Produced by [`crate::compiler::Compiler`].
    code: &'r [u8],
}

impl<'r> SimplexVM<'r> {
    /// Creates a new [`SimplexVM`].
    pub fn new(code: &'r [u8]) -> Self {
        Self { code }
    }

    /// Executes the program, returning true if some prefix of `input`
    /// matches it. Trailing unconsumed input is not examined.
    pub fn try_match<I>(&self, input: &mut I) -> bool
    where
        I: Input,
    {
        let mut ip = 0;

        // One-shot flag set by NEGATE. It inverts the verdict of the next
        // unit, never what the unit consumes.
        let mut negate = false;

        loop {
            let (instr, size) = InstrParser::decode_instr(&self.code[ip..]);
            ip += size;

            let verdict = match instr {
                Instr::Match => return true,
                Instr::Negate => {
                    negate = true;
                    continue;
                }
                Instr::Literal(byte) => {
                    let cur = match input.peek() {
                        Some(cur) => cur,
                        None => return false,
                    };
                    input.advance();
                    cur == byte
                }
                Instr::AnyGroup(class) => {
                    let cur = match input.peek() {
                        Some(cur) => cur,
                        None => return false,
                    };
                    input.advance();
                    class.contains(cur)
                }
                Instr::Quantify { min, max } => {
                    let (count, limit) = self.quantify(&mut ip, input, max);
                    count >= min as usize && count <= limit
                }
            };

            if verdict == negate {
                // verdict XOR negate is false: the unit failed.
                return false;
            }

            negate = false;
        }
    }

    /// Greedily applies the unit that follows a QUANTIFY to the input,
    /// returning how many elements it matched and the effective upper
    /// bound. `ip` is left pointing past the unit.
    ///
    /// The scan admits one element beyond the bound on purpose: a unit that
    /// would match more than `max` times makes the quantifier fail, it does
    /// not settle for `max` and hand the extra element to the next
    /// instruction. The element that stops the scan is left unconsumed.
    fn quantify<I>(
        &self,
        ip: &mut usize,
        input: &mut I,
        max: u8,
    ) -> (usize, usize)
    where
        I: Input,
    {
        let (mut unit, mut size) =
            InstrParser::decode_instr(&self.code[*ip..]);

        // A NEGATE encoded after the quantifier scopes over the per-element
        // test, not over the final count verdict.
        let negate = matches!(unit, Instr::Negate);
        if negate {
            *ip += size;
            (unit, size) = InstrParser::decode_instr(&self.code[*ip..]);
        }
        *ip += size;

        let limit = if max == Instr::QUANTIFY_INF {
            usize::MAX
        } else {
            max as usize
        };

        let mut count = 0_usize;
        while count <= limit {
            let cur = match input.peek() {
                Some(cur) => cur,
                None => break,
            };
            let hit = match &unit {
                Instr::Literal(byte) => cur == *byte,
                Instr::AnyGroup(class) => class.contains(cur),
                // The compiler only ever puts a literal or a class after a
                // quantifier.
                _ => unreachable!("quantified unit is not a matching unit"),
            };
            if hit == negate {
                break;
            }
            input.advance();
            count += 1;
        }

        (count, limit)
    }
}
