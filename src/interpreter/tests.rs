use super::*;
use crate::{error::Diagnostics, parser::parse, scanner::scan};
use pretty_assertions::assert_eq;
use std::cell::RefCell;

#[derive(Clone, Default)]
struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SharedBuffer {
    fn lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.0.borrow())
            .lines()
            .map(String::from)
            .collect()
    }
}

fn program(source: &str) -> Vec<Stmt> {
    let mut diagnostics = Diagnostics::silent();
    let tokens = scan(source, &mut diagnostics);
    let statements = parse(&tokens, &mut diagnostics);
    assert!(!diagnostics.had_error(), "{:?}", diagnostics.reported());
    statements
}

fn run(source: &str) -> (Vec<String>, RuntimeResult<()>) {
    let output = SharedBuffer::default();
    let mut interpreter = Interpreter::with_output(Box::new(output.clone()));
    let result = interpreter.interpret(&program(source));
    (output.lines(), result)
}

fn output_of(source: &str) -> Vec<String> {
    let (lines, result) = run(source);
    if let Err(err) = result {
        panic!("unexpected runtime error: {err}");
    }
    lines
}

#[test]
fn block_shadowing_restores_outer_binding() {
    assert_eq!(
        output_of("var a = 1; { var a = 2; print a; } print a;"),
        vec!["2", "1"]
    );
}

#[test]
fn assignment_in_block_writes_outer_binding() {
    assert_eq!(
        output_of("var a = 1; { a = a + 1; } print a;"),
        vec!["2"]
    );
}

#[test]
fn closures_share_captured_state() {
    let source = "
        fun makeCounter() {
            var i = 0;
            fun inc() { i = i + 1; return i; }
            return inc;
        }
        var c = makeCounter();
        c();
        print c();
    ";
    assert_eq!(output_of(source), vec!["2"]);
}

#[test]
fn closures_over_the_same_frame_see_each_others_writes() {
    let source = "
        var get; var set;
        fun pair() {
            var shared = 0;
            fun g() { return shared; }
            fun s(v) { shared = v; }
            get = g; set = s;
        }
        pair();
        set(41);
        print get() + 1;
    ";
    assert_eq!(output_of(source), vec!["42"]);
}

#[test]
fn plus_adds_or_concatenates() {
    assert_eq!(
        output_of("print \"a\" + 1; print 1 + 1; print 1.5 + \"\"; print \"t\" + true;"),
        vec!["a1", "2", "1.5", "ttrue"]
    );
}

#[test]
fn division_by_zero_stops_the_run() {
    let (lines, result) = run("print 1; print 5/0; print 2;");
    assert_eq!(lines, vec!["1"]);
    match result {
        Err(RuntimeError::DivisionByZero { token }) => assert_eq!(token.lexeme, "/"),
        other => panic!("expected division by zero, got {:?}", other),
    }
}

#[test]
fn for_with_continue_and_break() {
    let source = "for (var i = 0; i < 5; i = i + 1) { if (i == 2) continue; if (i == 4) break; print i; }";
    assert_eq!(output_of(source), vec!["0", "1", "3"]);
}

#[test]
fn while_with_continue_and_break() {
    let source = "
        var i = 0;
        while (true) {
            i = i + 1;
            if (i == 2) continue;
            if (i > 4) break;
            print i;
        }
        print \"done\";
    ";
    assert_eq!(output_of(source), vec!["1", "3", "4", "done"]);
}

#[test]
fn break_only_leaves_the_innermost_loop() {
    let source = "
        for (var i = 0; i < 2; i = i + 1) {
            for (var j = 0; j < 10; j = j + 1) {
                if (j == 1) break;
                print i + j;
            }
        }
    ";
    assert_eq!(output_of(source), vec!["0", "1"]);
}

#[test]
fn return_unwinds_out_of_loops() {
    let source = "
        fun find() {
            for (var i = 0; ; i = i + 1) {
                while (true) { if (i == 3) return i; break; }
            }
        }
        print find();
    ";
    assert_eq!(output_of(source), vec!["3"]);
}

#[test]
fn missing_return_value_is_nil() {
    assert_eq!(
        output_of("fun f() { return; } fun g() {} print f(); print g();"),
        vec!["nil", "nil"]
    );
}

#[test]
fn arity_mismatch_names_counts() {
    let (_, result) = run("fun add(a, b) { return a + b; }\nadd(1);");
    match result {
        Err(err @ RuntimeError::ArityMismatch { .. }) => {
            assert_eq!(err.to_string(), "Expected 2 arguments but got 1.");
            assert_eq!(err.token().line, 2);
        }
        other => panic!("expected arity mismatch, got {:?}", other),
    }
}

#[test]
fn undefined_variable_reports_its_line() {
    let (_, result) = run("var a = 1;\n\nprint b;");
    match result {
        Err(err @ RuntimeError::UndefinedVariable { .. }) => {
            assert_eq!(err.to_string(), "Undefined variable 'b'.");
            assert_eq!(err.token().line, 3);
        }
        other => panic!("expected undefined variable, got {:?}", other),
    }

    let (_, result) = run("ghost = 1;");
    assert!(matches!(result, Err(RuntimeError::UndefinedVariable { .. })));
}

#[test]
fn calling_a_non_callable() {
    let (_, result) = run("\"text\"();");
    assert!(matches!(result, Err(RuntimeError::NotCallable { .. })));
}

#[test]
fn operand_type_errors() {
    let (_, result) = run("print -\"x\";");
    assert!(matches!(result, Err(RuntimeError::OperandNotNumber { .. })));

    let (_, result) = run("print 1 < \"2\";");
    assert!(matches!(result, Err(RuntimeError::OperandsNotNumbers { .. })));

    let (_, result) = run("print nil + true;");
    assert!(matches!(result, Err(RuntimeError::InvalidOperands { .. })));
}

#[test]
fn logical_operators_short_circuit() {
    let source = "
        var calls = 0;
        fun touch() { calls = calls + 1; return true; }
        print nil or \"right\";
        print \"left\" or touch();
        print false and touch();
        print 1 and 2;
        print calls;
    ";
    assert_eq!(output_of(source), vec!["right", "left", "false", "2", "0"]);
}

#[test]
fn equality_and_truthiness() {
    assert_eq!(
        output_of("print 1 == \"1\"; print nil == nil; print nil == false; print !0; print !nil; print clock == clock;"),
        vec!["false", "true", "false", "false", "true", "true"]
    );
}

#[test]
fn recursion_through_the_enclosing_scope() {
    let source = "
        fun fib(n) { if (n < 2) return n; return fib(n - 1) + fib(n - 2); }
        print fib(15);
    ";
    assert_eq!(output_of(source), vec!["610"]);
}

#[test]
fn local_shadowing_a_function_name_wins_at_call_time() {
    let (_, result) = run("fun f() { var f = 1; return f(); } f();");
    assert!(matches!(result, Err(RuntimeError::NotCallable { .. })));
}

#[test]
fn unbounded_recursion_overflows_the_call_stack() {
    let (lines, result) = run("print \"in\";\nfun f() { f(); } f();");
    assert_eq!(lines, vec!["in"]);
    match result {
        Err(err @ RuntimeError::StackOverflow { .. }) => {
            assert_eq!(err.to_string(), "Stack overflow.");
            assert_eq!(err.token().lexeme, ")");
            assert_eq!(err.token().line, 2);
        }
        other => panic!("expected stack overflow, got {:?}", other),
    }
}

#[test]
fn call_depth_unwinds_after_an_overflow() {
    let output = SharedBuffer::default();
    let mut interpreter = Interpreter::with_output(Box::new(output.clone()));
    let result = interpreter.interpret(&program("fun f() { f(); } f();"));
    assert!(matches!(result, Err(RuntimeError::StackOverflow { .. })));

    let depth = MAX_CALL_DEPTH - 1;
    let source = format!(
        "fun down(n) {{ if (n == 0) return \"bottom\"; return down(n - 1); }} print down({depth});"
    );
    assert!(interpreter.interpret(&program(&source)).is_ok());
    assert_eq!(output.lines(), vec!["bottom"]);
}

#[test]
fn functions_print_with_their_name() {
    assert_eq!(
        output_of("fun hello() {} print hello; print clock;"),
        vec!["<fn hello>", "<native fn clock>"]
    );
}

#[test]
fn sleep_blocks_for_the_duration() {
    let started = std::time::Instant::now();
    assert_eq!(output_of("sleep 20; sleep -5; print \"awake\";"), vec!["awake"]);
    assert!(started.elapsed() >= Duration::from_millis(20));

    let (_, result) = run("sleep \"long\";");
    assert!(matches!(
        result,
        Err(RuntimeError::SleepDurationNotNumber { .. })
    ));
}

#[test]
fn clock_is_a_number() {
    assert_eq!(output_of("print clock() > 0;"), vec!["true"]);
}

#[test]
fn globals_survive_between_programs() {
    let output = SharedBuffer::default();
    let mut interpreter = Interpreter::with_output(Box::new(output.clone()));
    assert!(interpreter.interpret(&program("var total = 40;")).is_ok());
    assert!(interpreter
        .interpret(&program("total = total + 2; print total;"))
        .is_ok());
    assert_eq!(output.lines(), vec!["42"]);

    let total = Token::new(TokenKind::Identifier, "total", None, 1);
    assert_eq!(
        interpreter.globals().borrow().get(&total).ok(),
        Some(RuntimeValue::Number(42.0))
    );
}

#[test]
fn source_rendering_round_trips_literal_expressions() {
    for source in [
        "1 + 2 * 3",
        "-(4.5 - 1) / 2",
        "!(1 < 2) == false",
        "\"a\" + \"b\" + 3",
        "((7))",
        "- -1",
    ] {
        let statements = program(&format!("print {source};"));
        let Stmt::Print { expression, .. } = &statements[0] else {
            panic!("expected print statement");
        };

        let rendered = expression.to_string();
        let reparsed = program(&format!("print {rendered};"));
        let Stmt::Print {
            expression: again, ..
        } = &reparsed[0]
        else {
            panic!("expected print statement");
        };
        assert_eq!(again, expression, "rendered as {rendered}");

        let globals = Environment::new().into_ref();
        let mut interpreter = Interpreter::with_output(Box::new(io::sink()));
        let first = interpreter.evaluate(expression, &globals).ok();
        let second = interpreter.evaluate(again, &globals).ok();
        assert_eq!(first, second);
    }
}
