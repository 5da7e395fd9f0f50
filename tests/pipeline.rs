use kaleido_asm::{
    backend::asm_backend::{AsmContext, BackendError},
    compile_src,
    frontend::lexer::decode_source,
    generate_assembly, CompileError,
};

#[test]
fn session_resolves_names_across_sources() {
    let mut context = AsmContext::new();

    let first = compile_src("def foo(a b) a+b\nextern floor(x)", &mut context);
    assert!(first.is_ok());

    // A later source sees names from the earlier one
    let second = compile_src("def bar(c d) foo(c,d) + floor(d)\nfoo(3,5) + bar(3,5);", &mut context);
    assert!(second.is_ok(), "{:?}", second.errors);

    assert!(second.listing.contains("\tbl\t_foo\n"));
    assert!(second.listing.contains("\tbl\t_floor\n"));
    assert!(second.listing.contains("___anonymous_expr_0:\n"));

    let third = compile_src("baz(1)", &mut context);
    assert_eq!(
        third.errors,
        vec![CompileError::Backend(BackendError::UnresolvedFunction("baz"))]
    );
    assert!(third.listing.is_empty());
}

#[test]
fn listing_layout_per_function() {
    let listing = generate_assembly("def foo(x y) x - y # subtract\n\ndef bar(x y) x * y").unwrap();
    let body = &listing[AsmContext::preamble().len()..];

    let functions = body.split("\n\n").filter(|f| !f.is_empty()).collect::<Vec<_>>();
    assert_eq!(functions.len(), 2);

    for (function, name) in functions.iter().zip(["_foo", "_bar"]) {
        let lines = function.lines().collect::<Vec<_>>();

        assert_eq!(lines[0], format!("\t.globl\t{name}"));
        assert_eq!(lines[1], "\t.p2align\t2");
        assert_eq!(lines[2], format!("{name}:"));
        assert_eq!(lines[3], "\tstp\tx29, x30, [sp, #-16]!");
        assert_eq!(lines.last(), Some(&"\tret"));
    }
}

#[test]
fn comments_do_not_change_output() {
    let plain = generate_assembly("def foo(x) x").unwrap();
    let commented = generate_assembly("def foo(x) # comment\n x").unwrap();

    assert_eq!(plain, commented);
}

#[test]
fn invalid_utf8_input_still_compiles() {
    let mut context = AsmContext::new();

    let bytes = b"1 # \xe9\ndef g(x) x # caf\xe9";
    let src = decode_source(bytes);
    let compilation = compile_src(&src, &mut context);

    assert!(compilation.is_ok(), "{:?}", compilation.errors);
    assert!(compilation.listing.contains("___anonymous_expr_0:\n"));
    assert!(compilation.listing.contains("_g:\n"));
}

#[test]
fn broken_extern_emits_nothing() {
    let mut context = AsmContext::new();
    let compilation = compile_src("extern 5(1)\nextern sin(x)", &mut context);

    assert_eq!(compilation.errors.len(), 1);
    assert!(compilation.listing.is_empty());
    assert!(context.registry().contains("sin"));
    assert_eq!(context.registry().arity("sin"), Some(1));
}
