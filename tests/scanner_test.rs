/// This file contains tests of the scan loop and of the editing operations available in actions.
/// Each test builds a small automaton by hand with `DenseTables`.
use std::cell::Cell;
use std::io::Read;
use std::rc::Rc;

use lexrt::{
    DenseTables, Flow, LexErrorKind, Result, RuleActions, ScanStatus, Scanner, ScannerBuilder,
    StartCondition, TableSet,
};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn tokens_of(tables: &TableSet, input: &str) -> Vec<(usize, String)> {
    let mut tokens = Vec::new();
    let mut scanner = ScannerBuilder::new(tables)
        .build(input.as_bytes(), Vec::new())
        .unwrap();
    scanner
        .scan_with(|rule, s| {
            tokens.push((rule, s.text_str().unwrap().to_string()));
            Ok(Flow::Continue)
        })
        .unwrap();
    tokens
}

fn tok(rule: usize, text: &str) -> (usize, String) {
    (rule, text.to_string())
}

// rule 1: [a-z]+
// rule 2: [ ]+
fn words() -> TableSet {
    let mut dense = DenseTables::new();
    let start = dense.add_state(&[]);
    let word = dense.add_state(&[1]);
    let space = dense.add_state(&[2]);
    dense.add_range(start, b'a'..=b'z', word);
    dense.add_range(word, b'a'..=b'z', word);
    dense.add_transition(start, b' ', space);
    dense.add_transition(space, b' ', space);
    dense.set_initial(StartCondition::new(0, 0));
    dense.build().unwrap()
}

#[test]
fn test_longest_match_and_priority() {
    init();
    // rule 1: "if"
    // rule 2: [a-z]+
    // rule 3: " "
    let mut dense = DenseTables::new();
    let start = dense.add_state(&[]);
    let i = dense.add_state(&[2]);
    let kw_if = dense.add_state(&[1, 2]);
    let ident = dense.add_state(&[2]);
    let space = dense.add_state(&[3]);
    dense.add_range(start, b'a'..=b'z', ident);
    dense.add_transition(start, b'i', i);
    dense.add_range(i, b'a'..=b'z', ident);
    dense.add_transition(i, b'f', kw_if);
    dense.add_range(kw_if, b'a'..=b'z', ident);
    dense.add_range(ident, b'a'..=b'z', ident);
    dense.add_transition(start, b' ', space);
    dense.set_initial(StartCondition::new(0, 0));
    let tables = dense.build().unwrap();

    assert_eq!(
        vec![tok(1, "if"), tok(3, " "), tok(2, "iffy"), tok(3, " "), tok(2, "i")],
        tokens_of(&tables, "if iffy i")
    );
}

#[test]
fn test_less_rescans_the_returned_bytes() {
    init();
    let tables = words();
    let mut tokens = Vec::new();
    let mut truncated = false;
    let mut scanner = ScannerBuilder::new(&tables)
        .build("hello world".as_bytes(), Vec::new())
        .unwrap();
    scanner
        .scan_with(|rule, s| {
            if !truncated {
                truncated = true;
                s.less(2)?;
                assert_eq!(2, s.length());
            }
            tokens.push((rule, s.text_str().unwrap().to_string()));
            Ok(Flow::Continue)
        })
        .unwrap();
    assert_eq!(tok(1, "he"), tokens[0]);
    // The rest is scanned as if the first two bytes had been the whole input.
    assert_eq!(tokens_of(&tables, "llo world"), tokens[1..]);
}

#[test]
fn test_less_with_full_length_changes_nothing() {
    init();
    let tables = words();
    let mut tokens = Vec::new();
    let mut scanner = ScannerBuilder::new(&tables)
        .build("ab cd".as_bytes(), Vec::new())
        .unwrap();
    scanner
        .scan_with(|rule, s| {
            let length = s.length();
            s.less(length)?;
            tokens.push((rule, s.text_str().unwrap().to_string()));
            Ok(Flow::Continue)
        })
        .unwrap();
    assert_eq!(vec![tok(1, "ab"), tok(2, " "), tok(1, "cd")], tokens);
}

#[test]
fn test_unput_then_input_round_trip() {
    init();
    let tables = words();
    let mut tokens = Vec::new();
    let mut scanner = ScannerBuilder::new(&tables)
        .build("ab cd".as_bytes(), Vec::new())
        .unwrap();
    scanner
        .scan_with(|rule, s| {
            if s.text() == b"ab" {
                s.unput(b'z')?;
                assert_eq!(b"ab", s.text());
                assert_eq!(Some(b'z'), s.input()?);
                assert_eq!(b"ab", s.text());
            }
            tokens.push((rule, s.text_str().unwrap().to_string()));
            Ok(Flow::Continue)
        })
        .unwrap();
    assert_eq!(vec![tok(1, "ab"), tok(2, " "), tok(1, "cd")], tokens);
}

#[test]
fn test_unput_bytes_are_scanned_next() {
    init();
    let tables = words();
    let mut tokens = Vec::new();
    let mut scanner = ScannerBuilder::new(&tables)
        .build("ab cd".as_bytes(), Vec::new())
        .unwrap();
    scanner
        .scan_with(|rule, s| {
            if s.text() == b"ab" {
                s.unput(b'q')?;
                s.unput(b' ')?;
            }
            tokens.push((rule, s.text_str().unwrap().to_string()));
            Ok(Flow::Continue)
        })
        .unwrap();
    // The last byte pushed back is the first one read.
    assert_eq!(
        vec![tok(1, "ab"), tok(2, " "), tok(1, "q"), tok(2, " "), tok(1, "cd")],
        tokens
    );
}

#[test]
fn test_input_consumes_bytes_outside_of_matches() {
    init();
    let tables = words();
    let mut tokens = Vec::new();
    let mut scanner = ScannerBuilder::new(&tables)
        .build("ab xyz cd".as_bytes(), Vec::new())
        .unwrap();
    scanner
        .scan_with(|rule, s| {
            if s.text() == b"ab" {
                // Skip " xyz".
                for _ in 0..4 {
                    s.input()?;
                }
            }
            tokens.push((rule, s.text_str().unwrap().to_string()));
            Ok(Flow::Continue)
        })
        .unwrap();
    assert_eq!(vec![tok(1, "ab"), tok(2, " "), tok(1, "cd")], tokens);
}

// rule 1: "foo" / "bar"
// rule 2: "foo"
// rule 3: "bar"
// rule 4: "baz"
fn foo_bar() -> TableSet {
    let mut dense = DenseTables::new();
    let s0 = dense.add_state(&[]);
    let f = dense.add_state(&[]);
    let fo = dense.add_state(&[]);
    let foo = dense.add_state(&[1, 2]);
    let b = dense.add_state(&[]);
    let ba = dense.add_state(&[]);
    let bar = dense.add_state(&[3]);
    let baz = dense.add_state(&[4]);
    dense.add_transition(s0, b'f', f);
    dense.add_transition(f, b'o', fo);
    dense.add_transition(fo, b'o', foo);
    dense.add_transition(s0, b'b', b);
    dense.add_transition(b, b'a', ba);
    dense.add_transition(ba, b'r', bar);
    dense.add_transition(ba, b'z', baz);
    let t0 = dense.add_state(&[]);
    let tb = dense.add_state(&[]);
    let tba = dense.add_state(&[]);
    let tbar = dense.add_state(&[1]);
    dense.add_transition(t0, b'b', tb);
    dense.add_transition(tb, b'a', tba);
    dense.add_transition(tba, b'r', tbar);
    dense.set_trailing_context(1, t0);
    dense.set_initial(StartCondition::new(s0 as u32, s0 as u32));
    dense.build().unwrap()
}

#[test]
fn test_trailing_context_only_matches_when_followed() {
    init();
    let tables = foo_bar();
    assert_eq!(
        vec![tok(2, "foo"), tok(4, "baz")],
        tokens_of(&tables, "foobaz")
    );
    assert_eq!(
        vec![tok(1, "foo"), tok(3, "bar")],
        tokens_of(&tables, "foobar")
    );
    assert_eq!(vec![tok(2, "foo")], tokens_of(&tables, "foo"));
}

#[test]
fn test_beginning_of_line_rules() {
    init();
    // rule 1: ^"a"
    // rule 2: "a"
    // rule 3: \n
    // rule 4: [bc]+
    let mut dense = DenseTables::new();
    let start = dense.add_state(&[]);
    let bol_start = dense.add_state(&[]);
    let a = dense.add_state(&[2]);
    let bol_a = dense.add_state(&[1]);
    let newline = dense.add_state(&[3]);
    let bc = dense.add_state(&[4]);
    dense.add_transition(start, b'a', a);
    dense.add_transition(bol_start, b'a', bol_a);
    for s in [start, bol_start] {
        dense.add_transition(s, b'\n', newline);
        dense.add_range(s, b'b'..=b'c', bc);
    }
    dense.add_range(bc, b'b'..=b'c', bc);
    dense.set_initial(StartCondition::new(start as u32, bol_start as u32));
    let tables = dense.build().unwrap();

    assert_eq!(
        vec![tok(1, "a"), tok(3, "\n"), tok(1, "a"), tok(4, "bc"), tok(2, "a")],
        tokens_of(&tables, "a\nabca")
    );
}

#[test]
fn test_buffer_growth_keeps_the_match_window() {
    init();
    let tables = words();
    let mut scanner = ScannerBuilder::new(&tables)
        .read_size(4)
        .initial_capacity(8)
        .build("abc def".as_bytes(), Vec::new())
        .unwrap();
    let mut pushed = 0;
    let mut tokens = Vec::new();
    scanner
        .scan_with(|rule, s| {
            if s.text() == b"abc" {
                let mut reallocations = 0;
                let mut capacity = s.buffer_capacity();
                while reallocations < 3 {
                    s.unput(b'.')?;
                    pushed += 1;
                    assert_eq!(b"abc", s.text());
                    if s.buffer_capacity() != capacity {
                        reallocations += 1;
                        capacity = s.buffer_capacity();
                    }
                }
            }
            tokens.push((rule, s.text_str().unwrap().to_string()));
            Ok(Flow::Continue)
        })
        .unwrap();
    assert!(scanner.buffer_capacity() >= 64);
    assert_eq!(vec![tok(1, "abc"), tok(2, " "), tok(1, "def")], tokens);
    // The pushed back bytes match no rule and are copied to the output.
    assert_eq!(".".repeat(pushed).as_bytes(), scanner.output().as_slice());
}

#[test]
fn test_buffer_limit_is_reported() {
    init();
    let tables = words();
    let mut scanner = ScannerBuilder::new(&tables)
        .read_size(4)
        .initial_capacity(8)
        .max_buffer_size(16)
        .build("abc def".as_bytes(), Vec::new())
        .unwrap();
    let err = scanner
        .scan_with(|_, s| loop {
            s.unput(b'.')?;
        })
        .unwrap_err();
    assert!(matches!(
        err.kind(),
        LexErrorKind::AllocationFailure { requested: 17 }
    ));
}

#[test]
fn test_long_unmatched_input_fits_a_small_buffer() {
    init();
    let tables = words();
    let input = "?".repeat(100);
    let mut scanner = ScannerBuilder::new(&tables)
        .read_size(4)
        .initial_capacity(8)
        .max_buffer_size(16)
        .build(input.as_bytes(), Vec::new())
        .unwrap();
    let status = scanner.scan_with(|_, _| Ok(Flow::Continue)).unwrap();
    assert_eq!(ScanStatus::InputExhausted, status);
    assert!(scanner.buffer_capacity() <= 16);
    assert_eq!(input.as_bytes(), scanner.output().as_slice());
}

#[test]
fn test_exhausted_input_ends_the_scan() {
    init();
    let tables = words();
    let mut calls = 0;
    let mut scanner = ScannerBuilder::new(&tables)
        .build("".as_bytes(), Vec::new())
        .unwrap();
    let status = scanner
        .scan_with(|_, _| {
            calls += 1;
            Ok(Flow::Continue)
        })
        .unwrap();
    assert_eq!(ScanStatus::InputExhausted, status);
    assert_eq!(0, calls);

    let mut scanner = ScannerBuilder::new(&tables)
        .build("ab".as_bytes(), Vec::new())
        .unwrap();
    let mut actions = |_: usize, _: &mut Scanner<&[u8], Vec<u8>>| -> Result<Flow> {
        Ok(Flow::Continue)
    };
    assert_eq!(ScanStatus::InputExhausted, scanner.scan(&mut actions).unwrap());
    // The final attempt discarded the text of the last match.
    assert!(scanner.text().is_empty());
    assert_eq!(ScanStatus::InputExhausted, scanner.scan(&mut actions).unwrap());
}

#[test]
fn test_unmatched_bytes_are_echoed() {
    init();
    let tables = words();
    let mut scanner = ScannerBuilder::new(&tables)
        .build("ab, cd!?".as_bytes(), Vec::new())
        .unwrap();
    scanner
        .scan_with(|rule, s| {
            if rule == 1 {
                s.output_mut().extend_from_slice(b"<");
                s.echo()?;
                s.output_mut().extend_from_slice(b">");
            }
            Ok(Flow::Continue)
        })
        .unwrap();
    assert_eq!(b"<ab>,<cd>!?", scanner.into_output().as_slice());
}

#[test]
fn test_more_prepends_the_match() {
    init();
    // rule 1: [a-z]+
    // rule 2: "-"
    let mut dense = DenseTables::new();
    let start = dense.add_state(&[]);
    let word = dense.add_state(&[1]);
    let dash = dense.add_state(&[2]);
    dense.add_range(start, b'a'..=b'z', word);
    dense.add_range(word, b'a'..=b'z', word);
    dense.add_transition(start, b'-', dash);
    dense.set_initial(StartCondition::new(0, 0));
    let tables = dense.build().unwrap();

    let mut tokens = Vec::new();
    let mut scanner = ScannerBuilder::new(&tables)
        .build("mega-kludge".as_bytes(), Vec::new())
        .unwrap();
    scanner
        .scan_with(|rule, s| {
            if s.text() == b"mega" {
                s.more();
            }
            tokens.push((rule, s.text_str().unwrap().to_string(), s.length()));
            Ok(Flow::Continue)
        })
        .unwrap();
    assert_eq!(
        vec![
            (1, "mega".to_string(), 4),
            (2, "mega-".to_string(), 5),
            (1, "kludge".to_string(), 6)
        ],
        tokens
    );
}

#[test]
fn test_line_numbers() {
    init();
    let tables = words();
    let mut lines = Vec::new();
    let mut scanner = ScannerBuilder::new(&tables)
        .build("a\nb\n\nc d".as_bytes(), Vec::new())
        .unwrap();
    scanner
        .scan_with(|rule, s| {
            if rule == 1 {
                lines.push((s.text_str().unwrap().to_string(), s.line_number()));
            }
            Ok(Flow::Continue)
        })
        .unwrap();
    assert_eq!(
        vec![
            ("a".to_string(), 1),
            ("b".to_string(), 2),
            ("c".to_string(), 4),
            ("d".to_string(), 4)
        ],
        lines
    );
    assert_eq!(4, scanner.line_number());
}

#[test]
fn test_returned_tokens_resume_the_scan() {
    init();
    let tables = words();
    let mut scanner = ScannerBuilder::new(&tables)
        .build("one two  three".as_bytes(), Vec::new())
        .unwrap();
    let mut actions = |rule: usize, _: &mut Scanner<&[u8], Vec<u8>>| -> Result<Flow> {
        match rule {
            1 => Ok(Flow::Return(100)),
            _ => Ok(Flow::Continue),
        }
    };
    let mut words = Vec::new();
    while let ScanStatus::Terminated(token) = scanner.scan(&mut actions).unwrap() {
        assert_eq!(100, token);
        words.push(scanner.text_str().unwrap().to_string());
    }
    assert_eq!(vec!["one", "two", "three"], words);
}

// Scans a list of inputs one after another.
struct MultiFile<'a> {
    inputs: Vec<&'a [u8]>,
    tokens: Vec<String>,
}

impl<'t, 'a> RuleActions<'t, &'a [u8], Vec<u8>> for MultiFile<'a> {
    fn on_match(
        &mut self,
        rule: usize,
        scanner: &mut Scanner<'t, &'a [u8], Vec<u8>>,
    ) -> Result<Flow> {
        if rule == 1 {
            self.tokens.push(scanner.text_str().unwrap().to_string());
        }
        Ok(Flow::Continue)
    }

    fn wrap(&mut self, scanner: &mut Scanner<'t, &'a [u8], Vec<u8>>) -> Result<bool> {
        match self.inputs.pop() {
            Some(input) => {
                scanner.restart(input)?;
                Ok(false)
            }
            None => Ok(true),
        }
    }
}

#[test]
fn test_wrap_continues_with_a_new_source() {
    init();
    let tables = words();
    let mut scanner = ScannerBuilder::new(&tables)
        .start_condition(StartCondition::new(0, 0))
        .build("ab cd".as_bytes(), Vec::new())
        .unwrap();
    let mut actions = MultiFile {
        inputs: vec!["gh".as_bytes(), "ef".as_bytes()],
        tokens: Vec::new(),
    };
    assert_eq!(ScanStatus::InputExhausted, scanner.scan(&mut actions).unwrap());
    assert_eq!(vec!["ab", "cd", "ef", "gh"], actions.tokens);
}

#[test]
fn test_start_conditions() {
    init();
    // INITIAL: rule 1: "<", rule 2: [a-z]+
    // TAG:     rule 3: ">", rule 4: [a-z]+
    let mut dense = DenseTables::new();
    let initial = dense.add_state(&[]);
    let tag = dense.add_state(&[]);
    let lt = dense.add_state(&[1]);
    let text = dense.add_state(&[2]);
    let gt = dense.add_state(&[3]);
    let name = dense.add_state(&[4]);
    dense.add_transition(initial, b'<', lt);
    dense.add_range(initial, b'a'..=b'z', text);
    dense.add_range(text, b'a'..=b'z', text);
    dense.add_transition(tag, b'>', gt);
    dense.add_range(tag, b'a'..=b'z', name);
    dense.add_range(name, b'a'..=b'z', name);
    let initial_sc = StartCondition::new(initial as u32, initial as u32);
    dense.add_start_condition("INITIAL", initial_sc);
    dense.add_start_condition("TAG", StartCondition::new(tag as u32, tag as u32));
    dense.set_initial(initial_sc);
    let tables = dense.build().unwrap();

    let mut tokens = Vec::new();
    let mut scanner = ScannerBuilder::new(&tables)
        .build("ab<cd>ef".as_bytes(), Vec::new())
        .unwrap();
    scanner
        .scan_with(|rule, s| {
            match rule {
                1 => s.begin_named("TAG")?,
                3 => s.begin_named("INITIAL")?,
                _ => {}
            }
            tokens.push((rule, s.text_str().unwrap().to_string()));
            Ok(Flow::Continue)
        })
        .unwrap();
    assert_eq!(
        vec![tok(2, "ab"), tok(1, "<"), tok(4, "cd"), tok(3, ">"), tok(2, "ef")],
        tokens
    );
    assert_eq!(initial_sc, scanner.start_condition());
}

// A source that counts the bytes handed out.
struct CountingSource {
    data: &'static [u8],
    consumed: Rc<Cell<usize>>,
}

impl Read for CountingSource {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.data.read(buf)?;
        self.consumed.set(self.consumed.get() + n);
        Ok(n)
    }
}

#[test]
fn test_interactive_sources_are_read_line_by_line() {
    init();
    let tables = words();
    for (interactive, expected) in [(true, 3), (false, 6)] {
        let consumed = Rc::new(Cell::new(0));
        let source = CountingSource {
            data: b"ab\ncd\n",
            consumed: consumed.clone(),
        };
        let mut seen = Vec::new();
        let mut scanner = ScannerBuilder::new(&tables)
            .interactive(interactive)
            .build(source, Vec::new())
            .unwrap();
        scanner
            .scan_with(|_, s| {
                seen.push((s.text_str().unwrap().to_string(), consumed.get()));
                Ok(Flow::Continue)
            })
            .unwrap();
        assert_eq!(("ab".to_string(), expected), seen[0]);
        assert_eq!(("cd".to_string(), 6), seen[1]);
    }
}
