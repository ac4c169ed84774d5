use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use docgraph::{helpers, DocConfig};
use docgraph_reflect_api::{MemoryProvider, ObjectId};

/// A package of `modules` modules, each holding a chain of `depth` classes
/// deriving from the previous module's last class.
fn generated_package(modules: usize, depth: usize) -> MemoryProvider {
    let mut provider = MemoryProvider::new();
    provider.add_package("bench");

    let mut previous: Option<ObjectId> = None;
    for m in 0..modules {
        let module = provider.add_module(&format!("bench.mod_{m}"));
        for d in 0..depth {
            let bases: Vec<ObjectId> = previous.into_iter().collect();
            let class = provider.add_class(module, &format!("Class{d}"), &bases, "A class.");
            provider.add_method(class, &format!("method_{d}"), "Does something.");
            provider.add_method(class, "shared", "");
            previous = Some(class);
        }
        provider.add_function(module, "helper", "A helper.");
    }

    provider
}

fn bench_document(c: &mut Criterion) {
    let mut group = c.benchmark_group("document");
    let config = DocConfig::default();

    for size in [5, 20, 50].iter() {
        let provider = generated_package(*size, 5);
        group.bench_with_input(BenchmarkId::new("build_and_link", size), size, |b, _| {
            b.iter(|| {
                black_box(helpers::document(&provider, "bench", &config).unwrap());
            });
        });
    }

    group.finish();
}

fn bench_urls(c: &mut Criterion) {
    let mut group = c.benchmark_group("urls");
    let config = DocConfig::default();
    let provider = generated_package(20, 5);
    let (ctx, root) = helpers::document(&provider, "bench", &config).unwrap();
    let refnames: Vec<(&str, docgraph::EntityId)> = ctx.refnames().collect();

    group.bench_function("relative_to_root", |b| {
        b.iter(|| {
            for (_, id) in &refnames {
                black_box(ctx.url(*id, Some(root), "", true));
            }
        });
    });

    group.finish();
}

criterion_group!(benches, bench_document, bench_urls);
criterion_main!(benches);
