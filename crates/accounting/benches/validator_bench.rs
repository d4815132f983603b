use criterion::{Criterion, black_box, criterion_group, criterion_main};

use ledgerbook_accounting::{
    JournalEntryInput, JournalLineInput, RawAmount, validate_journal_entry,
};

fn entry_with_lines(pairs: usize) -> JournalEntryInput {
    let mut lines = Vec::with_capacity(pairs * 2);
    for i in 0..pairs {
        lines.push(JournalLineInput {
            account_id: format!("debit-{i}"),
            debit: RawAmount::Number(125.50),
            credit: RawAmount::Number(0.0),
        });
        lines.push(JournalLineInput {
            account_id: format!("credit-{i}"),
            debit: RawAmount::Number(0.0),
            credit: RawAmount::Text("125.50".to_string()),
        });
    }
    JournalEntryInput {
        date: "2024-03-01".to_string(),
        memo: Some("bench".to_string()),
        lines,
    }
}

fn bench_validate_journal_entry(c: &mut Criterion) {
    let small = entry_with_lines(1);
    let large = entry_with_lines(50);

    c.bench_function("validate_journal_entry/2_lines", |b| {
        b.iter(|| validate_journal_entry(black_box(&small)))
    });
    c.bench_function("validate_journal_entry/100_lines", |b| {
        b.iter(|| validate_journal_entry(black_box(&large)))
    });
}

criterion_group!(benches, bench_validate_journal_entry);
criterion_main!(benches);
