use super::*;

#[test]
fn integers_are_big_endian() {
    let mut buf = Vec::new();
    buf.write_u8(b"a", 0x01).unwrap();
    buf.write_u16(b"b", 0x0203).unwrap();
    buf.write_u32(b"c", 0x0405_0607).unwrap();
    buf.write_u64(b"d", 0x0809_0a0b_0c0d_0e0f).unwrap();
    assert_eq!(
        buf,
        vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15]
    );

    let mut r = &buf[..];
    assert_eq!(r.read_u8(), Ok(0x01));
    assert_eq!(r.read_u16(), Ok(0x0203));
    assert_eq!(r.read_u32(), Ok(0x0405_0607));
    assert_eq!(r.read_u64(), Ok(0x0809_0a0b_0c0d_0e0f));
    assert_eq!(r.remaining_bytes(), 0);
}

#[test]
fn short_read_consumes_nothing() {
    let bytes = [1u8, 2, 3];
    let mut r = &bytes[..];
    assert_eq!(r.read_u32(), Err(ReadError::InsufficientBytes));
    assert_eq!(r.remaining_bytes(), 3);
    assert_eq!(r.read_vec(4), Err(ReadError::InsufficientBytes));
    assert_eq!(r.read_vec(2), Ok(vec![1, 2]));
}

#[test]
fn parse_rejects_trailing_bytes() {
    let bytes = [0u8, 7, 9];
    let mut r = &bytes[..];
    let res: Result<u16, ReadError> = r.parse(|r| r.read_u16());
    assert_eq!(res, Err(ReadError::TrailingBytes));

    let mut r = &bytes[..];
    let res: Result<u16, ReadError> = r.parse(|r| {
        let x = r.read_u16()?;
        assert_eq!(r.skip_trailing_bytes(), 1);
        Ok(x)
    });
    assert_eq!(res, Ok(7));
}

#[test]
fn slice_writer_respects_capacity() {
    let mut storage = [0u8; 3];
    let mut w = &mut storage[..];
    assert!(w.write_u16(b"x", 0xabcd).is_ok());
    assert_eq!(w.write_u16(b"y", 1), Err(WriteError::InsufficientCapacity));
    assert_eq!(w.remaining_capacity(), 1);
    assert_eq!(storage, [0xab, 0xcd, 0]);
}

#[test]
fn prefixed_strings() {
    let mut buf = Vec::new();
    buf.write_u16_prefixed(b"data", b"abc").unwrap();
    buf.write_u16_prefixed(b"empty", &[]).unwrap();
    assert_eq!(buf, vec![0, 3, b'a', b'b', b'c', 0, 0]);
    assert_eq!(
        buf.write_u16_prefixed(b"big", &vec![0u8; 65536]),
        Err(WriteError::TooLong(65536))
    );
    assert_eq!(buf.len(), 7);

    let mut r = &buf[..];
    assert_eq!(r.read_u16_prefixed(), Ok(b"abc".to_vec()));
    assert_eq!(r.read_u16_prefixed(), Ok(Vec::new()));

    let truncated = [0u8, 4, 1, 2];
    assert_eq!(
        (&truncated[..]).read_u16_prefixed(),
        Err(ReadError::InsufficientBytes)
    );

    let mut storage = [0u8; 4];
    let mut w = &mut storage[..];
    assert_eq!(
        w.write_u16_prefixed(b"x", b"abc"),
        Err(WriteError::InsufficientCapacity)
    );
    assert_eq!(w.remaining_capacity(), 4);
}
