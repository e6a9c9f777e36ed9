use pretty_assertions::assert_eq;

use crate::{Compiler, Error, Simplex};

macro_rules! assert_code {
    ($pattern:expr, $code:expr) => {{
        let expr = Simplex::new($pattern).unwrap();
        assert_eq!($code, expr.to_string());
    }};
}

macro_rules! assert_match {
    ($pattern:expr, $input:expr) => {{
        let expr = Simplex::new($pattern).unwrap();
        assert!(
            expr.matches($input),
            "`{}` should match {:?}",
            $pattern,
            $input
        );
    }};
}

macro_rules! assert_no_match {
    ($pattern:expr, $input:expr) => {{
        let expr = Simplex::new($pattern).unwrap();
        assert!(
            !expr.matches($input),
            "`{}` should not match {:?}",
            $pattern,
            $input
        );
    }};
}

macro_rules! assert_error {
    ($pattern:expr, $err:expr) => {{
        assert_eq!($err, Simplex::new($pattern).unwrap_err());
    }};
}

#[test]
fn code_literals() {
    assert_code!(
        "ab",
        r#"
00000: LIT 0x61
00001: LIT 0x62
00002: MATCH
"#
    );
}

#[test]
fn code_quantifiers() {
    assert_code!(
        "a* b",
        r#"
00000: LIT 0x61
00001: QUANTIFY 0,INF
00004: LIT 0x20
00005: LIT 0x62
00006: MATCH
"#
    );

    assert_code!(
        "!\\*+x",
        r#"
00000: NEGATE
00001: LIT 0x2a
00002: QUANTIFY 1,INF
00005: LIT 0x78
00006: MATCH
"#
    );

    // Both bounds of `{m,n}` may be omitted.
    assert_code!(
        "{,}a",
        r#"
00000: QUANTIFY 0,INF
00003: LIT 0x61
00004: MATCH
"#
    );

    assert_code!(
        "{2,14}a",
        r#"
00000: QUANTIFY 2,14
00004: LIT 0x61
00005: MATCH
"#
    );
}

#[test]
fn code_classes() {
    assert_code!(
        "a{1,3}[-az-AZ-09_ ]",
        r#"
00000: LIT 0x61
00001: QUANTIFY 1,3
00004: ANY [0x61-0x7a] [0x41-0x5a] [0x30-0x39] 0x5f 0x20
00011: MATCH
"#
    );

    assert_code!(
        "*![ab]c",
        r#"
00000: QUANTIFY 0,INF
00003: NEGATE
00004: ANY 0x61 0x62
00008: LIT 0x63
00009: MATCH
"#
    );
}

#[test]
fn code_double_negation_collapses() {
    assert_code!(
        "!!!a",
        r#"
00000: NEGATE
00001: LIT 0x61
00002: MATCH
"#
    );
}

#[test]
fn compilation_is_deterministic() {
    let pattern = "a{1,3}[-az-AZ-09_ ]!x+y";
    let a = Simplex::new(pattern).unwrap();
    let b = Simplex::new(pattern).unwrap();
    assert_eq!(a.code(), b.code());
}

#[test]
fn literals_and_escapes() {
    assert_match!("abc", b"abc");
    assert_no_match!("abc", b"abd");
    assert_match!(r"a\*b", b"a*b");
    assert_no_match!(r"a\*b", b"ab");
    assert_match!(r"\!\[\{", b"![{");
}

#[test]
fn prefix_semantics() {
    assert_match!("abc", b"abcdef");
    assert_match!("", b"");
    assert_match!("", b"whatever");
}

#[test]
fn end_of_input() {
    assert_no_match!("abc", b"ab");
    assert_no_match!("!a", b"");
    // A quantifier scan just stops at the end of the input, the count it
    // reached decides.
    assert_match!("a*b", b"a");
    assert_no_match!("a+b", b"a");
    assert_match!("a{,3}b", b"a");
}

#[test]
fn zero_or_more() {
    assert_match!("foo* bar", b"foobar");
    assert_match!("foo* bar", b"foo bar");
    assert_match!("foo* bar", b"foo            bar");
}

#[test]
fn one_or_more() {
    assert_no_match!("foo+ bar", b"foobar");
    assert_match!("foo+ bar", b"foo bar");
    assert_match!("foo+ bar", b"foo    bar");
}

#[test]
fn zero_or_one() {
    assert_match!("foo? bar", b"foobar");
    assert_match!("foo? bar", b"foo bar");
    assert_no_match!("foo? bar", b"foo            bar");
}

#[test]
fn bounded_quantifiers() {
    assert_no_match!("foo{1,3} bar", b"foobar");
    assert_match!("foo{1,3} bar", b"foo bar");
    assert_match!("foo{1,3} bar", b"foo   bar");
    assert_no_match!("foo{1,3} bar", b"foo            bar");

    assert_match!("foo{0,0} bar", b"foobar");
    assert_no_match!("foo{0,0} bar", b"foo bar");
    assert_match!("foo{0,3} bar", b"foo bar");

    // An empty range like {5,0} is accepted and simply never holds.
    assert_no_match!("foo{5,0} bar", b"foo   bar");
}

#[test]
fn greedy_scans_never_backtrack() {
    // The quantified `a` swallows every `a`, starving the literal `a`
    // that follows; a shorter count is never retried.
    assert_no_match!("*aa", b"aa");
    assert_no_match!("*aa", b"aaaa");
    assert_no_match!("{0,2}aa", b"aa");
    assert_match!("*ab", b"aaab");
}

#[test]
fn classes() {
    assert_match!("[abc]", b"b");
    assert_no_match!("[abc]", b"d");

    // Range bounds are inclusive.
    assert_match!("[-az]", b"a");
    assert_match!("[-az]", b"z");
    assert_no_match!("[-az]", b"A");

    // Ranges only open the class; a dash after a literal entry is itself
    // a literal entry.
    assert_match!("[a-b]", b"-");

    assert_match!("a{1,3}[-az-AZ-09_ ]", b"a_aZ");
    assert_match!("a{1,3}[-az-AZ-09_ ]", b"a0 5");
    assert_no_match!("a{1,3}[-az-AZ-09_ ]", b"a_ ab6");
}

#[test]
fn classes_with_escapes() {
    assert_match!(r"[\]\\]", b"]");
    assert_match!(r"[\]\\]", b"\\");
    assert_no_match!(r"[\]\\]", b"x");

    // An escaped `]` can be a range bound.
    assert_match!(r"[-\]a]", b"^");
}

#[test]
fn negation() {
    assert_match!("!a", b"b");
    assert_match!("!a", b"Z");
    assert_no_match!("!a", b"a");

    // Negating twice is the same as negating once.
    assert_match!("!!a", b"b");
    assert_no_match!("!!a", b"a");

    assert_match!("!\\!", b"x");
    assert_no_match!("!\\!", b"!");

    assert_match!("foo![@#%^jnm,]bar", b"foobbar");
    assert_match!("foo![@#%^jnm,]bar", b"foo bar");
}

#[test]
fn negated_quantifier_verdict() {
    // `!` before the quantifier inverts the count verdict of the whole
    // quantified unit.
    assert_no_match!("foo!*[@#%^jnm,]bar", b"foobbar");
    assert_match!("foo!? bar", b"foo  bar");
}

#[test]
fn negated_quantified_unit() {
    // `!` after the quantifier inverts the per-element test instead.
    assert_match!("*!xyes", b"abcxyes");
    assert_match!("*!xyes", b"xyes");
    assert_match!("+![abc]a", b"xyza");
    assert_no_match!("+![abc]a", b"axyz");
}

#[test]
fn counters_run_past_encodable_bounds() {
    let expr = Simplex::new("a{250,}b").unwrap();
    let mut input = vec![b'a'; 1000];
    input.push(b'b');
    assert!(expr.matches(&input));

    let expr = Simplex::new("a{,254}b").unwrap();
    let input = vec![b'a'; 300];
    assert!(!expr.matches(&input));
}

#[test]
fn input_sources() {
    let expr = Simplex::new("ab").unwrap();
    let mut input = b"abc".iter().copied().peekable();
    assert!(expr.matches_input(&mut input));
    // Whatever the match did not consume is still in the source.
    assert_eq!(Some(b'c'), input.next());

    let expr = Simplex::new("a{1,3}[-09]").unwrap();
    let mut stream = "a15 rest".bytes().peekable();
    assert!(expr.matches_input(&mut stream));
}

#[test]
fn malformed_quantifiers() {
    assert_error!("foo{999,1}", Error::MalformedQuantifier(4));
    assert_error!("foo{1234,}", Error::MalformedQuantifier(7));
    assert_error!("a{1;2}b", Error::MalformedQuantifier(3));
    assert_error!("a{1,2", Error::MalformedQuantifier(5));
}

#[test]
fn nested_quantifiers() {
    assert_error!("**a", Error::NestedQuantifier(1));
    assert_error!("?{1,2}a", Error::NestedQuantifier(1));
    assert_error!("+*a", Error::NestedQuantifier(1));
}

#[test]
fn malformed_ranges() {
    assert_error!("[]", Error::MalformedRange(1));
    assert_error!("[-a]", Error::MalformedRange(3));
    assert_error!("[-]z]", Error::MalformedRange(2));
}

#[test]
fn unterminated_operators() {
    assert_error!("foo!", Error::UnterminatedOperator(4));
    assert_error!("foo*", Error::UnterminatedOperator(4));
    assert_error!("a{2,}", Error::UnterminatedOperator(5));
    assert_error!("[abc", Error::UnterminatedOperator(4));
    assert_error!(r"ab\", Error::UnterminatedOperator(3));
}

#[test]
fn non_ascii_bytes() {
    assert_error!([0x80], Error::UnsupportedByte(0));
    assert_error!([b'a', b'\\', 0xc3], Error::UnsupportedByte(2));
    assert_error!([b'[', b'x', 0xff, b']'], Error::UnsupportedByte(2));
}

#[test]
fn size_limit() {
    assert_eq!(
        Error::TooLarge,
        Compiler::new().size_limit(4).compile(b"abcdef").unwrap_err()
    );
    assert!(Compiler::new().size_limit(7).compile(b"abcdef").is_ok());
}
