//! Criterion benchmarks for DBC parsing and signal coding
//!
//! Run with: cargo bench --bench codec_benchmark

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use dbc_codec::{Message, MessageId, Schema, Signal};

/// Build DBC text with `num_messages` messages of eight byte-sized signals each
fn generate_dbc(num_messages: u32) -> String {
    let mut text = String::from("VERSION \"bench\"\n\nBU_: ECM Dash\n\n");
    for m in 0..num_messages {
        text.push_str(&format!("BO_ {} Message_{}: 8 ECM\n", 0x100 + m, m));
        for s in 0..8 {
            text.push_str(&format!(
                " SG_ Signal_{m}_{s} : {}|8@1+ (0.5,-10) [-10|117.5] \"unit\" Dash\n",
                s * 8
            ));
        }
        text.push('\n');
    }
    for m in 0..num_messages {
        text.push_str(&format!("BA_ \"GenMsgCycleTime\" BO_ {} 100;\n", 0x100 + m));
    }
    text
}

fn mixed_message() -> Message {
    Message::new(MessageId::Standard(0x200), "Mixed", 8)
        .with_signal(Signal::new("Speed", 0, 16).with_scale(0.01))
        .with_signal(Signal::new("Torque", 23, 12).big_endian().signed().with_scale(0.5))
        .with_signal(Signal::new("Temp", 32, 8).with_offset(-40.0).with_limits(-40.0, 215.0))
        .with_signal(Signal::new("Odometer", 40, 24).with_scale(0.1))
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    for num_messages in [10u32, 100, 500] {
        let text = generate_dbc(num_messages);
        group.bench_with_input(BenchmarkId::from_parameter(num_messages), &text, |b, text| {
            b.iter(|| Schema::parse(black_box(text)).unwrap());
        });
    }
    group.finish();
}

fn bench_encode(c: &mut Criterion) {
    let message = mixed_message();
    let values = [
        ("Speed", 88.5),
        ("Torque", -120.0),
        ("Temp", 92.0),
        ("Odometer", 123_456.7),
    ];

    c.bench_function("encode_new_frame", |b| {
        b.iter(|| message.encode(black_box(values)).unwrap());
    });

    let mut frame = [0u8; 8];
    c.bench_function("encode_in_place", |b| {
        b.iter(|| {
            message
                .encode_into(black_box(&mut frame), black_box([("Temp", 21.0)]))
                .unwrap();
        });
    });
}

fn bench_decode(c: &mut Criterion) {
    let message = mixed_message();
    let frame = message
        .encode([
            ("Speed", 88.5),
            ("Torque", -120.0),
            ("Temp", 92.0),
            ("Odometer", 123_456.7),
        ])
        .unwrap();

    c.bench_function("decode_to_map", |b| {
        b.iter(|| black_box(message.decode(black_box(&frame)).unwrap()));
    });

    c.bench_function("decode_detailed", |b| {
        b.iter(|| black_box(message.decode_detailed(black_box(&frame)).unwrap().len()));
    });

    let speed = message.signal("Speed").unwrap();
    c.bench_function("decode_single_signal", |b| {
        b.iter(|| black_box(speed.decode(black_box(&frame)).unwrap()));
    });
}

criterion_group!(benches, bench_parse, bench_encode, bench_decode);
criterion_main!(benches);
