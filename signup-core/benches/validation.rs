//! Benchmark: schema evaluation and memoized form validity

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use signup_core::{FormController, Registration, Schema};

fn benchmark_schema_validate(c: &mut Criterion) {
    let schema = Schema::registration();
    let sample = Registration::sample();
    let empty = Registration::empty();

    c.bench_function("validate_sample", |b| {
        b.iter(|| schema.validate(black_box(&sample)))
    });

    c.bench_function("validate_empty", |b| {
        b.iter(|| schema.validate(black_box(&empty)))
    });
}

fn benchmark_controller(c: &mut Criterion) {
    let mut form = FormController::new();
    form.fill_sample();

    // A single edit only recomputes the memo for the edited field.
    c.bench_function("set_field_round_trip", |b| {
        let mut flip = false;
        b.iter(|| {
            flip = !flip;
            let changes = form.set_username(if flip { "jo" } else { "johndoe" });
            black_box(form.is_valid());
            changes
        })
    });

    c.bench_function("is_valid_cached", |b| b.iter(|| black_box(form.is_valid())));
}

criterion_group!(benches, benchmark_schema_validate, benchmark_controller);
criterion_main!(benches);
