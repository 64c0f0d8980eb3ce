//! End-to-end checks of the reader, the environment chain and the
//! continuation stack through the public API.

use reglisp::{
    parse, read, tokenize, EnvError, Environment, Label, List, Machine, ParseError, Register,
    StackStats, Value,
};

fn names(ns: &[&str]) -> List {
    ns.iter().map(|n| Value::name(n)).collect()
}

fn nums(ns: &[i64]) -> List {
    ns.iter().map(|n| Value::Number(*n)).collect()
}

#[test]
fn test_read_round_trips_through_printer() {
    let sources = [
        "x",
        "42",
        "()",
        "(add 3 4)",
        "(quote ())",
        "(add ((addn 3) 4) 7 (mul 5 6))",
        "(define triangular (lambda (n) (if (zero? n) 0 (+ n (triangular (sub1 n))))))",
    ];
    for source in sources {
        let parsed = read(source).unwrap();
        assert_eq!(parsed.to_string(), source, "round trip of {}", source);
    }
}

#[test]
fn test_round_trip_ignores_whitespace() {
    let spaced = "(  define\n  loop\t( lambda (count total)\n    (loop (sub1 count) total) ) )";
    let compact = "(define loop (lambda (count total) (loop (sub1 count) total)))";
    assert_eq!(read(spaced).unwrap(), read(compact).unwrap());
    assert_eq!(read(spaced).unwrap().to_string(), compact);
}

#[test]
fn test_nested_arithmetic_structure() {
    let parsed = read("(+ 1 (* 2 3))").unwrap();
    let items = parsed.as_list().unwrap();
    assert_eq!(items.len(), 3);
    assert_eq!(items.get(0), Some(&Value::name("+")));
    assert_eq!(items.get(1), Some(&Value::Number(1)));

    let inner = items.get(2).and_then(Value::as_list).unwrap();
    let inner: Vec<_> = inner.iter().cloned().collect();
    assert_eq!(
        inner,
        vec![Value::name("*"), Value::Number(2), Value::Number(3)]
    );
}

#[test]
fn test_empty_source_has_no_value() {
    let tokens = tokenize("");
    assert!(tokens.is_empty());
    assert_eq!(parse(tokens), Err(ParseError::NoTokens));
}

#[test]
fn test_redefinition_shadows() {
    let env = Environment::base();
    env.define_var("x", Value::Number(1));
    env.define_var("x", Value::Number(2));
    assert_eq!(env.lookup("x"), Some(Value::Number(2)));
}

#[test]
fn test_set_var_hits_nearest_frame() {
    let global = Environment::base();
    global.define_var("x", Value::Number(0));
    let outer = global.extend(&names(&["x"]), &nums(&[1])).unwrap();
    let inner = outer.extend(&names(&["y"]), &nums(&[2])).unwrap();

    inner.set_var("x", Value::Number(10)).unwrap();

    assert_eq!(inner.lookup("x"), Some(Value::Number(10)));
    assert_eq!(global.lookup("x"), Some(Value::Number(0)));
}

#[test]
fn test_set_var_on_unbound_is_soft() {
    let env = Environment::base();
    let result = env.set_var("ghost", Value::Number(1));
    assert_eq!(result, Err(EnvError::Unbound("ghost".to_string())));
    assert_eq!(env.lookup("ghost"), None);
}

#[test]
fn test_extend_falls_through_to_base() {
    let base = Environment::base();
    base.define_var("g", Value::Number(7));
    let env = base.extend(&names(&["a", "b"]), &nums(&[1, 2])).unwrap();

    assert_eq!(env.lookup("a"), Some(Value::Number(1)));
    assert_eq!(env.lookup("b"), Some(Value::Number(2)));
    assert_eq!(env.lookup("g"), Some(Value::Number(7)));
    assert_eq!(env.lookup("missing"), None);
    assert_eq!(env.depth(), 2);
}

#[test]
fn test_lambda_parameters_from_parsed_source() {
    let lambda = read("(lambda (count total) total)").unwrap();
    let params = lambda.as_list().and_then(|l| l.get(1)).and_then(Value::as_list).unwrap();
    let args = read("(5 1)").unwrap();

    let base = Environment::base();
    let env = base.extend(params, args.as_list().unwrap()).unwrap();
    assert_eq!(env.lookup("count"), Some(Value::Number(5)));
    assert_eq!(env.lookup("total"), Some(Value::Number(1)));

    let short = read("(5)").unwrap();
    assert!(matches!(
        base.extend(params, short.as_list().unwrap()),
        Err(EnvError::ArityMismatch { expected: 2, got: 1 })
    ));
}

#[test]
fn test_stack_save_restore_statistics() {
    let mut machine = Machine::new();
    machine.stack_mut().save(Value::name("A"));
    machine.stack_mut().save(Value::name("B"));
    assert_eq!(machine.stack_mut().restore(), Some(Value::name("B")));
    assert_eq!(machine.stack_mut().restore(), Some(Value::name("A")));
    assert_eq!(
        machine.stats(),
        StackStats {
            pushes: 2,
            depth: 0,
            max_depth: 2
        }
    );
}

#[test]
fn test_register_discipline_around_nested_evaluation() {
    let mut machine = Machine::new();
    machine.read("(+ 1 2)").unwrap();

    // Entering the operator evaluation: keep the continuation, environment
    // and unevaluated operands safe.
    machine.set(Register::Cont, Value::Label(Label::DidFunc));
    machine.set(Register::Unev, Value::List(nums(&[1, 2])));
    for register in [Register::Cont, Register::Env, Register::Unev] {
        machine.save(register);
    }

    // The nested evaluation clobbers everything.
    machine.set(Register::Cont, Value::Label(Label::Done));
    machine.set(Register::Env, Value::Uninitialized);
    machine.set(Register::Unev, Value::Unbound);

    for register in [Register::Unev, Register::Env, Register::Cont] {
        assert!(machine.restore(register));
    }

    assert_eq!(machine.get(Register::Cont), &Value::Label(Label::DidFunc));
    assert_eq!(machine.get(Register::Unev), &Value::List(nums(&[1, 2])));
    let env = machine.get(Register::Env).as_env().unwrap();
    assert!(env.same_as(machine.base_env()));
    assert_eq!(machine.stats().max_depth, 3);
    assert!(machine.stack().is_empty());
}

#[test]
fn test_malformed_input_is_rejected() {
    assert!(matches!(read("(a (b"), Err(ParseError::Unbalanced { .. })));
    assert!(matches!(read(") a"), Err(ParseError::UnexpectedClose { offset: 0 })));
    assert!(matches!(read("(a) (b)"), Err(ParseError::TrailingTokens { .. })));
}
