use blockmark_engine::{Action, BlockChanges, BlockStore};
use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
mod common;

fn bench_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("store_dispatch");
    group.sample_size(20);

    group.bench_function("update_block", |b| {
        b.iter_batched(
            || BlockStore::new(common::generate_paragraphs(500)),
            |mut store| {
                let id = store.blocks()[250].id.clone();
                store.update_block(&id, BlockChanges::content("edited"));
                black_box(store);
            },
            BatchSize::SmallInput,
        );
    });

    group.bench_function("move_block", |b| {
        b.iter_batched(
            || BlockStore::new(common::generate_paragraphs(500)),
            |mut store| {
                let id = store.blocks()[0].id.clone();
                store.move_block(&id, 499);
                black_box(store);
            },
            BatchSize::SmallInput,
        );
    });

    group.bench_function("transaction_undo", |b| {
        b.iter_batched(
            || BlockStore::new(common::generate_paragraphs(500)),
            |mut store| {
                let ids: Vec<_> = store.blocks()[..10].iter().map(|b| b.id.clone()).collect();
                store.dispatch(Action::Transaction(
                    ids.into_iter().map(Action::DeleteBlock).collect(),
                ));
                store.undo();
                black_box(store);
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

criterion_group!(benches, bench_dispatch);
criterion_main!(benches);
