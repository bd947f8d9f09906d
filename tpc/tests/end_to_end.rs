//! End-to-end scenarios from §8: a whole source string in, a whole `.asm`
//! text (or a specific failure) out, through the public `tpc::compile_source`
//! entry point.

use tpc::{compile_source, CompileError, ErrorKind};

fn compile_ok(source: &str) -> String {
    compile_source(source).unwrap_or_else(|err| panic!("expected successful compilation, got: {}", err))
}

fn compile_err(source: &str) -> CompileError {
    compile_source(source).expect_err("expected compilation to fail")
}

#[test]
fn hello_integer() {
    let asm = compile_ok("int main(void) { putInt(42); return 0; }");
    assert!(asm.contains("mov rax, 42"), "{}", asm);
    assert!(asm.contains("call putInt"), "{}", asm);
    assert!(asm.contains("and rsp, -16"), "{}", asm);
    assert!(asm.contains("mov rax, 60"));
    assert!(asm.contains("mov rdi, rax"));
    assert!(asm.contains("syscall"));
}

#[test]
fn global_indexed_store_and_load() {
    let asm = compile_ok("int a[3]; int main(void){ a[0]=7; putInt(a[0]); return 0;}");
    assert!(asm.contains("a: resd 3"), "{}", asm);
    assert!(asm.contains("mov [a + rbx], eax"), "{}", asm);
    assert!(asm.contains("movsx rax, dword [a + rbx]"), "{}", asm);
}

#[test]
fn void_addition_is_rejected() {
    let err = compile_err("void f(void){} int main(void){ putInt(f()+1); return 0; }");
    match err {
        CompileError::Semantic(e) => {
            assert_eq!(e.kind(), ErrorKind::VoidAddsub);
            assert_eq!(e.exit_code(), 2);
        }
        CompileError::Syntax(e) => panic!("expected a semantic error, got a syntax error: {}", e),
    }
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn unary_minus_is_rewritten_as_zero_minus_x() {
    let asm = compile_ok("int main(void){ putInt(-5); return 0;}");
    assert!(asm.contains("mov rax, 0"), "{}", asm);
    assert!(asm.contains("mov rax, 5"), "{}", asm);
    assert!(asm.contains("pop rcx"), "{}", asm);
    assert!(asm.contains("pop rax"), "{}", asm);
    assert!(asm.contains("sub rax, rcx"), "{}", asm);
}

#[test]
fn while_with_bare_identifier_condition_compares_against_zero() {
    let asm = compile_ok("int main(void){ int x; x=3; while(x){ x = x-1; } return 0; }");
    assert!(asm.contains(".loop0:"), "{}", asm);
    assert!(asm.contains("je .endloop0"), "{}", asm);
    assert!(asm.contains(".endloop0:"), "{}", asm);
}

#[test]
fn arity_error_reports_too_few_arguments() {
    let err = compile_err("void g(int a){} int main(void){ g(); return 0;}");
    match err {
        CompileError::Semantic(e) => {
            assert_eq!(e.kind(), ErrorKind::TooFewArgument);
            assert_eq!(e.exit_code(), 2);
        }
        CompileError::Syntax(e) => panic!("expected a semantic error, got a syntax error: {}", e),
    }
}

#[test]
fn missing_main_is_a_semantic_error() {
    let err = compile_err("int f(void){ return 0; }");
    match err {
        CompileError::Semantic(e) => assert_eq!(e.kind(), ErrorKind::NoMainFunction),
        CompileError::Syntax(e) => panic!("expected a semantic error, got a syntax error: {}", e),
    }
}

#[test]
fn malformed_source_is_a_syntax_error_with_exit_code_one() {
    let err = compile_err("int main(void) { putInt(42) return 0; }");
    assert!(matches!(err, CompileError::Syntax(_)));
    assert_eq!(err.exit_code(), 1);
}
