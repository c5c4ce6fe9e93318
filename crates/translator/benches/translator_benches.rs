use criterion::{Criterion, criterion_group, criterion_main};
use efx_core::{SymbolCatalog, contextualize};
use efx_translator::{XPathScriptGenerator, translate_expression};
use std::hint::black_box;

fn symbols() -> SymbolCatalog {
    SymbolCatalog::new("bench")
        .with_node("ND-Root", "/*")
        .with_node("ND-Lot", "/*/cac:ProcurementProjectLot[cbc:ID/@schemeName='Lot']")
        .with_field("BT-00-Text", "/*/PathNode/TextField", "text")
        .with_field("BT-00-Number", "/*/PathNode/NumberField", "number")
        .with_field("BT-00-StartDate", "/*/PathNode/StartDateField", "date")
        .with_code_field("BT-00-Code", "/*/PathNode/CodeField", "accessibility")
        .with_field(
            "BT-137-Lot",
            "/*/cac:ProcurementProjectLot[cbc:ID/@schemeName='Lot']/cbc:ID",
            "id",
        )
        .with_codelist("accessibility", None, &["inclus", "n-inclus", "n-inclu-just"])
}

fn sample_expressions() -> Vec<(&'static str, &'static str)> {
    vec![
        ("ND-Root", "BT-00-Text is not present and BT-00-Number is not present"),
        ("BT-00-Text", "count(ND-Root::BT-00-Code) == 1"),
        ("ND-Root", "BT-00-Text[BT-00-Code in #accessibility] is present"),
        ("BT-00-Text", "BT-00-StartDate + P3M > 2020-01-01Z"),
        ("ND-Root", "every text:$x in BT-00-Text satisfies $x like '[A-Z]+'"),
        ("BT-137-Lot", "ND-Root::BT-00-Number * 2 > 10"),
    ]
}

fn benchmark_contextualize(c: &mut Criterion) {
    let pairs = [
        ("/*/PathNode/TextField", "/*/PathNode/CodeField"),
        ("/*/cac:ProcurementProjectLot[cbc:ID/@schemeName='Lot']/cbc:ID", "/*/cac:ProcurementProjectLot[cbc:ID/@schemeName='Lot']"),
        ("/*/a/b/c/d", "/*/x/y/@z"),
    ];
    c.bench_function("path/contextualize", |b| {
        b.iter(|| {
            for (context, target) in &pairs {
                let path = contextualize(black_box(context), black_box(target)).expect("contextualize failure");
                black_box(path);
            }
        })
    });
}

fn benchmark_translate(c: &mut Criterion) {
    let symbols = symbols();
    let generator = XPathScriptGenerator::new();
    let expressions = sample_expressions();
    c.bench_function("translator/translate_expression", |b| {
        b.iter(|| {
            for (context, expression) in &expressions {
                let xpath = translate_expression(&symbols, &generator, black_box(context), black_box(expression))
                    .expect("translation failure");
                black_box(xpath);
            }
        })
    });
}

criterion_group!(benches, benchmark_contextualize, benchmark_translate);
criterion_main!(benches);
