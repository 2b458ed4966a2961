//! Performance benchmarks for the chonky build pipeline.
//!
//! This benchmark suite measures:
//! - Code generation alone, over programs of increasing size
//! - Assembly alone, over the text those programs produce
//! - The full `Unit::build` pipeline
//!
//! ## Profiling with Puffin
//!
//! Run with the `profile-with-puffin` feature to record scopes for the
//! annotated entry points:
//!
//! ```bash
//! cargo bench --features profile-with-puffin
//! ```

use bumpalo::Bump;
use chonky::{Assembler, CompilerConfig, Unit};
use chonky_ast::{AstBuilder, BinaryOp, Comparison, Stmt};
use chonky_codegen::compile;
use chonky_core::ScalarType;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;

#[cfg(feature = "profile-with-puffin")]
static FRAME_VIEW: std::sync::OnceLock<puffin::GlobalFrameView> = std::sync::OnceLock::new();

/// Initialize puffin profiler.
#[cfg(feature = "profile-with-puffin")]
fn setup_profiler() {
    puffin::set_scopes_on(true);
    FRAME_VIEW.get_or_init(puffin::GlobalFrameView::default);
}

#[cfg(not(feature = "profile-with-puffin"))]
fn setup_profiler() {}

/// Call at the end of each benchmark iteration to flush profiling data.
#[cfg(feature = "profile-with-puffin")]
fn end_profiling_frame() {
    puffin::GlobalProfiler::lock().new_frame();
}

#[cfg(not(feature = "profile-with-puffin"))]
fn end_profiling_frame() {}

/// A program with `blocks` repetitions of a declaration, a counting loop,
/// a conditional and a function call.
fn workload<'ast>(ast: &AstBuilder<'ast>, blocks: u32) -> &'ast [Stmt<'ast>] {
    let mut stmts = Vec::new();
    for i in 0..blocks {
        let line = i * 10;
        let counter = format!("i{i}");
        let total = format!("t{i}");
        let step = ast.binary(BinaryOp::Add, ast.ident(&counter), ast.int(1));
        let sum = ast.binary(BinaryOp::Add, ast.ident(&total), ast.ident(&counter));
        let function = format!("f{i}");

        stmts.push(ast.var_decl(line + 1, ScalarType::Int, &counter, ast.int(0)));
        stmts.push(ast.var_decl(line + 2, ScalarType::Int, &total, ast.int(0)));
        stmts.push(ast.while_stmt(
            line + 3,
            ast.cond(Comparison::Less, ast.ident(&counter), ast.int(10)),
            &[ast.reassign(line + 4, &total, sum), ast.reassign(line + 5, &counter, step)],
        ));
        stmts.push(ast.if_stmt(
            line + 6,
            ast.cond(Comparison::Greater, ast.ident(&total), ast.int(40)),
            &[ast.call(line + 7, "putchar", &[ast.char(b'!')])],
            None,
        ));
        stmts.push(ast.function(
            line + 8,
            &function,
            &[ast.param("x", ScalarType::Int)],
            &[ast.reassign(line + 9, "x", ast.int(0))],
        ));
        stmts.push(ast.call(line + 9, &function, &[ast.ident(&total)]));
    }
    ast.program(&stmts)
}

fn codegen_benchmarks(c: &mut Criterion) {
    setup_profiler();
    let mut group = c.benchmark_group("codegen");

    for blocks in [1, 10, 100, 500] {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let program = workload(&ast, blocks);

        group.throughput(Throughput::Elements(program.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(blocks), &program, |b, program| {
            b.iter(|| {
                let compiled = compile(black_box(program), CompilerConfig::default()).unwrap();
                end_profiling_frame();
                black_box(compiled.warnings())
            });
        });
    }

    group.finish();
}

fn assembler_benchmarks(c: &mut Criterion) {
    setup_profiler();
    let mut group = c.benchmark_group("assembler");

    for blocks in [1, 10, 100, 500] {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let mut unit = Unit::new();
        let assembly = unit
            .build(workload(&ast, blocks))
            .unwrap()
            .assembly()
            .to_string();

        group.throughput(Throughput::Bytes(assembly.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(blocks), &assembly, |b, text| {
            b.iter(|| {
                let object = Assembler.assemble(black_box(text)).unwrap();
                end_profiling_frame();
                black_box(object.len())
            });
        });
    }

    group.finish();
}

fn pipeline_benchmarks(c: &mut Criterion) {
    setup_profiler();
    let mut group = c.benchmark_group("unit/build");

    for blocks in [1, 100] {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let program = workload(&ast, blocks);

        group.bench_with_input(BenchmarkId::from_parameter(blocks), &program, |b, program| {
            b.iter(|| {
                let mut unit = Unit::new();
                let size = unit.build(black_box(program)).unwrap().bytes().len();
                end_profiling_frame();
                black_box(size)
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    codegen_benchmarks,
    assembler_benchmarks,
    pipeline_benchmarks
);

criterion_main!(benches);
