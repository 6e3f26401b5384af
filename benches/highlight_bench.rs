use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use threatlens::classifier::{from_fn, ClassifierError, Prediction};
use threatlens::sentence_detector::SentenceDetector;
use threatlens::{HighlightConfig, HighlightEngine};

const EMAIL: &str = "Dear customer,\n\nYour account has been suspended due to unusual activity. \
Click the link below to verify your identity. Failure to verify within 24 hours will result in \
permanent closure. Dr. Smith from our security team is available for questions. \
Thank you for banking with us.\n\nRegards,\nCustomer Support";

// WHY: keyword stub keeps the bench focused on engine overhead, not model latency
fn keyword_classifier(text: &str) -> Result<Prediction, ClassifierError> {
    let lowered = text.to_lowercase();
    if lowered.contains("verify") || lowered.contains("suspended") {
        Prediction::new("LABEL_1", 0.93)
    } else {
        Prediction::new("LABEL_0", 0.81)
    }
}

fn bench_segmentation(c: &mut Criterion) {
    let detector = SentenceDetector::new().unwrap();
    let text = EMAIL.repeat(50);

    let mut group = c.benchmark_group("segmentation");
    group.throughput(Throughput::Bytes(text.len() as u64));
    group.bench_function("email_x50", |b| {
        b.iter(|| detector.detect_sentences_borrowed(black_box(&text)))
    });
    group.finish();
}

fn bench_highlight(c: &mut Criterion) {
    let engine = HighlightEngine::new(from_fn(keyword_classifier), HighlightConfig::default()).unwrap();
    let text = EMAIL.repeat(50);

    let mut group = c.benchmark_group("highlight");
    group.throughput(Throughput::Bytes(text.len() as u64));
    group.bench_function("single_email", |b| b.iter(|| engine.highlight(black_box(EMAIL))));
    group.bench_function("email_x50", |b| b.iter(|| engine.highlight(black_box(&text))));
    group.finish();
}

criterion_group!(benches, bench_segmentation, bench_highlight);
criterion_main!(benches);
