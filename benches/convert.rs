//! Benchmarks for the ChEBI mapper and turtle rendering.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use chebi_rdf::graph::turtle;
use chebi_rdf::mapping::chebi::ChebiTables;
use chebi_rdf::model::{
    CasEntry, Compound, CompoundId, CompoundStatus, Inchi, Name, Relationship, RelationshipType,
    StarRating,
};

fn synthetic_tables(n: u64) -> ChebiTables {
    let id = |raw: u64| CompoundId::new(raw).unwrap();
    let star = StarRating::new(3).unwrap();
    let mut tables = ChebiTables::default();
    for raw in 1..=n {
        tables
            .compounds
            .push(Compound::new(id(raw), format!("compound {raw}"), CompoundStatus::Checked, star));
        for k in 0..3 {
            tables.names.push(Name {
                compound_id: id(raw),
                name: format!("synonym {raw}-{k}"),
                name_type: "SYNONYM".into(),
            });
        }
        tables.inchis.push(Inchi {
            compound_id: id(raw),
            inchi: format!("InChI=1S/C{raw}"),
        });
        tables.cas_entries.push(CasEntry {
            compound_id: id(raw),
            registry_number: format!("{raw}-00-0"),
        });
        if raw > 1 {
            let t = RelationshipType::ALL[(raw as usize) % RelationshipType::ALL.len()];
            tables
                .relationships
                .push(Relationship::new(id(raw), id(raw - 1), t.as_str()));
        }
    }
    tables
}

fn bench_convert(c: &mut Criterion) {
    let tables = synthetic_tables(10_000);
    c.bench_function("convert_10k_compounds", |bench| {
        bench.iter(|| black_box(tables.convert().unwrap()))
    });
}

fn bench_turtle(c: &mut Criterion) {
    let triples = synthetic_tables(10_000).convert().unwrap();
    c.bench_function("turtle_10k_compounds", |bench| {
        bench.iter(|| black_box(turtle::to_turtle(&triples).unwrap()))
    });
}

criterion_group!(benches, bench_convert, bench_turtle);
criterion_main!(benches);
