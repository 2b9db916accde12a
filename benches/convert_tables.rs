//! This bench converts a test plan holding large wide test case tables into
//! stacked tables, and builds the traceability mapping from the result.

#![allow(missing_docs)]

use std::fmt::Write;

use criterion::{Criterion, criterion_group, criterion_main};
use docsmith::{
    TableOptions,
    domain::{RequirementPattern, convert_test_tables, traceability::extract_test_references},
};

/// Generates a test plan with `tables` wide tables of `rows` test cases each.
fn synthetic_plan(tables: usize, rows: usize) -> String {
    let mut plan = String::from("= Test Plan\n\n");
    for table in 0..tables {
        writeln!(plan, "== Section {table}\n").unwrap();
        plan.push_str("[cols=\"1,2,4,3\", options=\"header\"]\n|===\n");
        plan.push_str(
            "^.^| Test Case ID ^.^| Requirement ^.^| Test Steps ^.^| Expected Result\n\n",
        );
        for row in 0..rows {
            let id = table * rows + row;
            writeln!(plan, "| **T-{id:04}** | FR-{table}.{row}/{table}.{} a|", row + 1).unwrap();
            plan.push_str("1. open the application\n2. load the sample book\n");
            writeln!(plan, "3. check case {id} | **AC: case {id} passes**").unwrap();
        }
        plan.push_str("|===\n\n");
    }
    plan
}

fn convert_tables(c: &mut Criterion) {
    let plan = synthetic_plan(20, 50);
    let options = TableOptions::default();

    c.bench_function("convert test tables", |b| {
        b.iter(|| convert_test_tables(&plan, &options));
    });

    let converted = convert_test_tables(&plan, &options).text;
    let pattern = RequirementPattern::default();
    c.bench_function("extract test references", |b| {
        b.iter(|| extract_test_references(&converted, &options, &pattern));
    });
}

criterion_group!(benches, convert_tables);
criterion_main!(benches);
