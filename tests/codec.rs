use dbc_codec::codec::bits::{extract_raw, insert_raw};
use dbc_codec::{ByteOrder, Error, Message, MessageId, RawValue, Result, Schema, Signal};

const ENGINE_DBC: &str = r#"BU_: ECM TCU Dash

BO_ 256 EngineData: 8 ECM
 SG_ EngineSpeed : 0|16@1+ (0.25,0) [0|16383.75] "rpm" Dash,TCU
 SG_ CoolantTemp : 16|8@1+ (1,-40) [-40|215] "degC" Dash
 SG_ Torque : 31|12@0- (0.5,0) [-1024|1023.5] "Nm" TCU
"#;

fn engine_schema() -> Schema {
    Schema::parse(ENGINE_DBC).unwrap()
}

#[test]
fn byte_order_examples() {
    let le = Signal::new("LE", 0, 16);
    let raw = le.decode_raw(&[0x34, 0x12, 0, 0, 0, 0, 0, 0]).unwrap();
    assert_eq!(raw, RawValue::Unsigned(0x1234));

    let be = Signal::new("BE", 7, 16).big_endian();
    let raw = be.decode_raw(&[0x12, 0x34, 0, 0, 0, 0, 0, 0]).unwrap();
    assert_eq!(raw, RawValue::Unsigned(0x1234));

    assert_eq!(
        extract_raw(&[0x12, 0x34], 7, 16, ByteOrder::BigEndian),
        Some(0x1234)
    );
}

#[test]
fn encode_and_decode_engine_frame() -> Result<()> {
    let schema = engine_schema();
    let id = MessageId::Standard(256);

    let frame = schema.encode(
        id,
        [("EngineSpeed", 3000.0), ("CoolantTemp", 85.0), ("Torque", -100.0)],
    )?;
    assert_eq!(frame, [0xE0, 0x2E, 0x7D, 0xF3, 0x80, 0, 0, 0]);

    let values = schema.decode(id, &frame)?;
    assert_eq!(values.len(), 3);
    assert_eq!(values["EngineSpeed"], 3000.0);
    assert_eq!(values["CoolantTemp"], 85.0);
    assert_eq!(values["Torque"], -100.0);
    Ok(())
}

#[test]
fn encode_accepts_owned_names_and_borrowed_values() -> Result<()> {
    let schema = engine_schema();
    let engine = schema.message_by_name("EngineData").unwrap();

    let values = vec![(String::from("CoolantTemp"), 20.0)];
    let frame = engine.encode(values.iter().map(|(k, v)| (k, v)))?;
    assert_eq!(frame[2], 60);
    Ok(())
}

#[test]
fn clamping_applies_on_encode_only() -> Result<()> {
    let msg = Message::new(MessageId::Standard(1), "Level", 1)
        .with_signal(Signal::new("Percent", 0, 8).with_limits(0.0, 100.0));

    assert_eq!(msg.encode([("Percent", 150.0)])?, msg.encode([("Percent", 100.0)])?);
    assert_eq!(msg.encode([("Percent", -5.0)])?, [0]);

    // A faulted sensor reading above the declared range is reported as is
    let values = msg.decode(&[200])?;
    assert_eq!(values["Percent"], 200.0);
    Ok(())
}

#[test]
fn unknown_signal_keeps_untouched_bits() {
    let schema = engine_schema();
    let engine = schema.message(MessageId::Standard(256)).unwrap();

    let mut frame = [0xAA; 8];
    let err = engine
        .encode_into(&mut frame, [("CoolantTemp", 0.0), ("Boost", 1.5)])
        .unwrap_err();

    match err {
        Error::UnknownSignal { message, signal } => {
            assert_eq!(message, "EngineData");
            assert_eq!(signal, "Boost");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    // CoolantTemp was applied; every other byte is untouched
    assert_eq!(frame, [0xAA, 0xAA, 40, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA]);
}

#[test]
fn encode_reports_first_error_of_batch() {
    let schema = engine_schema();
    let result = schema.encode(
        MessageId::Standard(256),
        [("First", 1.0), ("Second", 2.0)],
    );
    assert!(matches!(
        result,
        Err(Error::UnknownSignal { ref signal, .. }) if signal == "First"
    ));
}

#[test]
fn overlapping_signals_decode_independently() -> Result<()> {
    let msg = Message::new(MessageId::Standard(0x300), "Overlap", 2)
        .with_signal(Signal::new("Word", 0, 16))
        .with_signal(Signal::new("LowByte", 0, 8))
        .with_signal(Signal::new("Nibble", 4, 4));

    let values = msg.decode(&[0xAB, 0xCD])?;
    assert_eq!(values["Word"], 0xCDAB as f64);
    assert_eq!(values["LowByte"], 0xAB as f64);
    assert_eq!(values["Nibble"], 0xA as f64);
    Ok(())
}

#[test]
fn short_frames_are_rejected() {
    let schema = engine_schema();
    let id = MessageId::Standard(256);

    assert!(matches!(
        schema.decode(id, &[0u8; 7]),
        Err(Error::FrameTooShort {
            actual: 7,
            expected: 8
        })
    ));
    assert!(matches!(schema.decode(id, &[]), Err(Error::FrameTooShort { .. })));
}

#[test]
fn longer_frames_are_accepted() -> Result<()> {
    let schema = engine_schema();
    let mut frame = [0u8; 12];
    frame[2] = 100;
    let values = schema.decode(MessageId::Standard(256), &frame)?;
    assert_eq!(values["CoolantTemp"], 60.0);
    Ok(())
}

#[test]
fn signals_past_the_dlc_overflow() {
    // Fits in 8 bytes but the message only declares 4
    let msg = Message::new(MessageId::Standard(0x10), "Short", 4)
        .with_signal(Signal::new("Ok", 0, 8))
        .with_signal(Signal::new("Tail", 32, 8));

    match msg.decode(&[0u8; 8]) {
        Err(Error::BitRangeOverflow {
            signal,
            start_bit,
            length,
            frame_bits,
        }) => {
            assert_eq!(signal, "Tail");
            assert_eq!((start_bit, length, frame_bits), (32, 8, 32));
        }
        other => panic!("unexpected result: {other:?}"),
    }

    let mut frame = [0u8; 4];
    assert!(matches!(
        msg.encode_into(&mut frame, [("Tail", 1.0), ("Ok", 7.0)]),
        Err(Error::BitRangeOverflow { .. })
    ));
    assert_eq!(frame, [7, 0, 0, 0]);
}

#[test]
fn big_endian_signal_running_off_the_end_overflows() {
    // MSB at bit 7 of the last byte, 16 bits would need one more byte
    let signal = Signal::new("Late", 15, 16).big_endian();
    assert!(matches!(
        signal.decode(&[0u8; 2]),
        Err(Error::BitRangeOverflow { frame_bits: 16, .. })
    ));
    assert!(insert_raw(&mut [0u8; 2], 15, 16, ByteOrder::BigEndian, 1).is_none());
}

#[test]
fn zero_scale_cannot_encode() {
    let msg = Message::new(MessageId::Standard(0x20), "Broken", 1)
        .with_signal(Signal::new("Flat", 0, 8).with_scale(0.0).with_offset(3.0));

    assert!(matches!(
        msg.encode([("Flat", 3.0)]),
        Err(Error::DivisionByZeroScale { ref signal }) if signal == "Flat"
    ));
    // Decoding only multiplies, so it still works
    assert_eq!(msg.decode(&[9]).unwrap()["Flat"], 3.0);
}

#[test]
fn unknown_message_id() {
    let schema = engine_schema();
    assert!(matches!(
        schema.decode(MessageId::Extended(0x100), &[0u8; 8]),
        Err(Error::UnknownMessage(0x8000_0100))
    ));
}

#[test]
fn decode_detailed_keeps_declaration_order() -> Result<()> {
    let schema = engine_schema();
    let engine = schema.message(MessageId::Standard(256)).unwrap();

    let frame = engine.encode([("Torque", 10.5)])?;
    let decoded = engine.decode_detailed(&frame)?;

    let names: Vec<_> = decoded.iter().map(|d| d.name).collect();
    assert_eq!(names, ["EngineSpeed", "CoolantTemp", "Torque"]);
    assert_eq!(decoded[1].raw, RawValue::Unsigned(0));
    assert_eq!(decoded[1].value, -40.0);
    assert_eq!(decoded[1].unit, "degC");
    assert_eq!(decoded[2].raw, RawValue::Signed(21));
    assert_eq!(decoded[2].value, 10.5);
    Ok(())
}

#[test]
fn schema_is_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Schema>();

    let schema = std::sync::Arc::new(engine_schema());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let schema = std::sync::Arc::clone(&schema);
            std::thread::spawn(move || {
                let id = MessageId::Standard(256);
                let frame = schema.encode(id, [("CoolantTemp", i as f64)]).unwrap();
                schema.decode(id, &frame).unwrap()["CoolantTemp"]
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.join().unwrap(), i as f64);
    }
}
