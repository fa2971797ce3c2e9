use criterion::{black_box, criterion_group, criterion_main, Criterion};
use dmtx_codec::EncodeScheme;
use dmtx_core::{ImageBuffer, Payload};
use dmtx_engine::{DataMatrixEngine, DecodeEngine, DecodeRequest, EngineConfig};

/// A 1280x960 white frame with four tags spread over it.
fn make_scene(engine: &DataMatrixEngine) -> ImageBuffer {
    let tags: Vec<(ImageBuffer, usize, usize)> = ["ALPHA-1", "BRAVO-22", "CHARLIE-333", "DELTA-4444"]
        .iter()
        .zip([(40, 60), (700, 80), (120, 600), (900, 700)])
        .filter_map(|(text, (x, y))| {
            engine
                .generate_tag(&Payload::from(*text))
                .ok()
                .map(|img| (img, x, y))
        })
        .collect();
    ImageBuffer::from_fn(1280, 960, |x, y| {
        for (img, ox, oy) in &tags {
            if x >= *ox && y >= *oy {
                if let Some(p) = img.pixel(x - ox, y - oy) {
                    return p;
                }
            }
        }
        0xFFFFFF
    })
    .unwrap()
}

fn bench_decode(c: &mut Criterion) {
    let engine = DataMatrixEngine::default();
    let single = engine.generate_tag(&Payload::from("BENCH 0001")).unwrap();
    let scene = make_scene(&engine);
    let request = DecodeRequest::default();

    c.bench_function("decode_single_tag", |b| {
        b.iter(|| {
            let tags = engine.decode(black_box(&single), black_box(&request)).unwrap();
            black_box(tags.len())
        })
    });

    c.bench_function("decode_1280x960_four_tags", |b| {
        b.iter(|| {
            let tags = engine.decode(black_box(&scene), black_box(&request)).unwrap();
            black_box(tags.len())
        })
    });

    let mut cfg = EngineConfig::default();
    cfg.detect.shrink = 2;
    let shrunk = DataMatrixEngine::new(cfg).unwrap();
    c.bench_function("decode_1280x960_four_tags_shrink2", |b| {
        b.iter(|| {
            let tags = shrunk.decode(black_box(&scene), black_box(&request)).unwrap();
            black_box(tags.len())
        })
    });
}

fn bench_generate(c: &mut Criterion) {
    let mut cfg = EngineConfig::default();
    cfg.render.scheme = EncodeScheme::AutoBest;
    let engine = DataMatrixEngine::new(cfg).unwrap();
    let payload = Payload::Text("LOT 2024-11-05 SERIAL 000123456789".repeat(4));

    c.bench_function("generate_auto_best", |b| {
        b.iter(|| {
            let img = engine.generate_tag(black_box(&payload)).unwrap();
            black_box(img.width())
        })
    });
}

criterion_group!(decode, bench_decode, bench_generate);
criterion_main!(decode);
