use criterion::{Criterion, black_box, criterion_group, criterion_main};
use traffic_core::{BoundingBox, Detection, Frame};
use traffic_counter::{FrameProcessor, ZoneConfig};

/// A frame of `n` vehicles spread across the reference 1280x720 view
fn busy_frame(index: u64, n: u64) -> Frame {
    let detections = (0..n)
        .map(|i| {
            let x = (i * 97 + index * 13) % 1260;
            let y = (i * 53 + index * 7) % 700;
            Detection::new(i, BoundingBox::new(x as f64, y as f64, x as f64 + 20.0, y as f64 + 20.0))
        })
        .collect();
    Frame::new(index, detections)
}

fn bench_process_frame(c: &mut Criterion) {
    let zones = ZoneConfig::reference();
    let frames: Vec<Frame> = (0..100).map(|i| busy_frame(i, 60)).collect();

    c.bench_function("process_frame_reference_60", |b| {
        let mut processor = FrameProcessor::new(zones.build_zone_set().unwrap());
        let mut i = 0;
        b.iter(|| {
            let outcome = processor.process_frame(black_box(&frames[i % frames.len()]));
            i += 1;
            outcome
        })
    });
}

criterion_group!(benches, bench_process_frame);
criterion_main!(benches);
