use checkin_kiosk::capture::{Frame, StillConfig, StillFormat, RGB_CHANNELS};
use checkin_kiosk::session::StillFrame;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn frame(width: u32, height: u32) -> Frame {
    let pixels = (0..(width * height) as usize * RGB_CHANNELS)
        .map(|i| (i % 253) as u8)
        .collect();
    Frame::new(pixels, width, height, 1)
}

fn bench_encode(c: &mut Criterion) {
    let vga = frame(640, 480);
    let png = StillConfig::default();
    let jpeg = StillConfig {
        format: StillFormat::Jpeg,
        jpeg_quality: 90,
    };

    c.bench_function("still_png_640x480", |b| {
        b.iter(|| StillFrame::encode(black_box(&vga), &png).unwrap())
    });
    c.bench_function("still_jpeg_640x480", |b| {
        b.iter(|| StillFrame::encode(black_box(&vga), &jpeg).unwrap())
    });
}

criterion_group!(benches, bench_encode);
criterion_main!(benches);
