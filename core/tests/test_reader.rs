#[cfg(test)]
mod tests {
    use std::io::{self, Cursor};

    use proptest::prelude::*;
    use datastream_core::prelude::*;
    use datastream_core::reader::ReaderState;

    const CONTENT: &str = "The quick brown fox jumps over the lazy dog";

    #[test]
    fn test_memory_reader_reads_in_fragments() {
        let mut reader = InMemoryDataReader::from(CONTENT);
        assert_eq!(reader.total_length_if_known(), CONTENT.len() as i64);
        assert!(reader.seekable());

        let mut buf = [0u8; 10];
        assert_eq!(reader.read_to_buffer(&mut buf), 10);
        assert_eq!(&buf, b"The quick ");
        assert_eq!(reader.offset(), 10);
        assert!(!reader.done());

        assert_eq!(reader.remainder_to_string(), &CONTENT[10..]);
        assert!(reader.done());
        assert!(reader.ok());
        assert_eq!(reader.offset(), CONTENT.len() as i64);
    }

    #[test]
    fn test_empty_reader_is_done_immediately() {
        let mut reader = InMemoryDataReader::from("");
        assert_eq!(reader.total_length_if_known(), 0);
        assert!(reader.done());
        assert!(reader.remainder_to_vec().is_empty());
        assert_eq!(reader.set_offset(0), 0);
        assert!(reader.ok());
    }

    #[test]
    fn test_read_to_vec_respects_max() {
        let mut reader = InMemoryDataReader::from(CONTENT);
        let mut out = b"prefix:".to_vec();
        assert_eq!(reader.read_to_vec(3, &mut out), 3);
        assert_eq!(out, b"prefix:The");
        assert_eq!(reader.offset(), 3);
    }

    #[test]
    fn test_negative_offset_is_invalid_argument() {
        let mut reader = InMemoryDataReader::from(CONTENT);
        assert_eq!(reader.set_offset(-1), -1);
        assert!(reader.error());
        assert!(reader.done());
        assert_eq!(reader.offset(), -1);
        assert_eq!(reader.status().unwrap_err().code(), ErrorCode::InvalidArgument);

        // A later valid seek recovers.
        assert_eq!(reader.set_offset(4), 4);
        assert!(reader.ok());
        assert!(!reader.done());
        assert_eq!(reader.remainder_to_string(), &CONTENT[4..]);
    }

    #[test]
    fn test_reset_after_drain_reproduces_content() {
        let mut reader = InMemoryDataReader::from(CONTENT);
        let first = reader.remainder_to_vec();
        assert!(reader.done());

        assert!(reader.reset());
        assert_eq!(reader.offset(), 0);
        assert!(!reader.done());
        assert_eq!(reader.remainder_to_vec(), first);

        assert!(reader.reset());
        assert_eq!(reader.remainder_to_vec(), first);
    }

    #[test]
    fn test_seek_past_end_clamps() {
        let mut reader = InMemoryDataReader::from(CONTENT);
        let len = CONTENT.len() as i64;
        assert_eq!(reader.set_offset(len + 100), len);
        assert!(reader.remainder_to_vec().is_empty());
        assert!(reader.done());
    }

    #[test]
    fn test_memory_pattern_search() {
        let mut reader = InMemoryDataReader::from("key: value\r\nnext: line\r\n");
        let mut consumed = Vec::new();

        assert!(reader.read_until_pattern_inclusive(b"\r\n", &mut consumed));
        assert_eq!(consumed, b"key: value\r\n");
        assert_eq!(reader.offset(), 12);

        assert!(reader.read_until_pattern_inclusive(b"\r\n", &mut consumed));
        assert_eq!(consumed, b"next: line\r\n");

        assert!(!reader.read_until_pattern_inclusive(b"\r\n", &mut consumed));
        assert!(consumed.is_empty());
        assert!(reader.done());
    }

    #[test]
    fn test_pattern_not_found_consumes_rest() {
        let mut reader = InMemoryDataReader::from("abcdef");
        let mut consumed = Vec::new();
        assert!(!reader.read_until_pattern_inclusive(b"xyz", &mut consumed));
        assert_eq!(consumed, b"abcdef");
        assert_eq!(reader.offset(), 6);
        assert!(reader.done());
    }

    #[test]
    fn test_stream_pattern_search_matches_memory() {
        let text = b"key: value\r\nnext: line\r\ntail";
        let mut reader = IoDataReader::new(Cursor::new(text.to_vec()));
        let mut consumed = Vec::new();

        assert!(reader.read_until_pattern_inclusive(b"\r\n", &mut consumed));
        assert_eq!(consumed, b"key: value\r\n");
        assert_eq!(reader.offset(), 12);

        assert!(reader.read_until_pattern_inclusive(b"\r\n", &mut consumed));
        assert_eq!(consumed, b"next: line\r\n");
        assert_eq!(reader.offset(), 24);

        assert!(!reader.read_until_pattern_inclusive(b"\r\n", &mut consumed));
        assert_eq!(consumed, b"tail");
        assert_eq!(reader.offset(), 28);
        assert!(reader.done());
    }

    #[test]
    fn test_forward_only_stream_cannot_seek() {
        let mut reader = IoDataReader::new(Cursor::new(CONTENT.as_bytes().to_vec()));
        assert!(!reader.seekable());
        assert_eq!(reader.total_length_if_known(), -1);

        let mut buf = [0u8; 3];
        reader.read_to_buffer(&mut buf);
        assert_eq!(reader.set_offset(0), -1);
        assert!(reader.error());
        assert!(reader.done());
        assert_eq!(reader.status().unwrap_err().code(), ErrorCode::Unimplemented);
    }

    #[test]
    fn test_stream_with_declared_length() {
        let mut reader = IoDataReader::with_length(Cursor::new(CONTENT.as_bytes().to_vec()), CONTENT.len() as u64);
        assert_eq!(reader.total_length_if_known(), CONTENT.len() as i64);
        assert_eq!(reader.remainder_to_string(), CONTENT);
    }

    #[test]
    fn test_seekable_stream() {
        let mut reader = IoDataReader::new_seekable(Cursor::new(CONTENT.as_bytes().to_vec()));
        assert!(reader.seekable());
        assert!(reader.ok());

        assert_eq!(reader.set_offset(16), 16);
        assert_eq!(reader.remainder_to_string(), &CONTENT[16..]);

        assert_eq!(reader.set_offset(4), 4);
        assert!(!reader.done());
        let mut buf = [0u8; 5];
        assert_eq!(reader.read_to_buffer(&mut buf), 5);
        assert_eq!(&buf, b"quick");

        let len = CONTENT.len() as i64;
        assert_eq!(reader.set_offset(len + 7), len);
    }

    #[test]
    fn test_seekable_stream_must_start_at_zero() {
        let mut cursor = Cursor::new(CONTENT.as_bytes().to_vec());
        cursor.set_position(3);
        let reader = IoDataReader::new_seekable(cursor);
        assert!(reader.error());
        assert!(reader.done());
        assert_eq!(reader.status().unwrap_err().code(), ErrorCode::InvalidArgument);
    }

    #[test]
    fn test_stream_read_error_is_sticky() {
        struct Broken;
        impl io::Read for Broken {
            fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::Other, "device unplugged"))
            }
        }

        let mut reader = IoDataReader::new(Broken);
        let mut buf = [0u8; 4];
        assert_eq!(reader.read_to_buffer(&mut buf), 0);
        assert!(reader.error());
        assert!(reader.done());
        let err = reader.status().unwrap_err();
        assert_eq!(err.code(), ErrorCode::Unknown);
        assert!(err.message().contains("device unplugged"));

        // Still failed on the next attempt.
        assert_eq!(reader.read_to_buffer(&mut buf), 0);
        assert!(reader.error());
    }

    #[test]
    fn test_invalid_reader_reasserts_error() {
        let err = StreamError::DataLoss("gone".into());
        let mut reader = new_invalid_reader(err.clone());
        assert!(reader.error());
        assert!(reader.done());
        assert!(reader.remainder_to_vec().is_empty());

        assert_eq!(reader.set_offset(0), -1);
        assert_eq!(reader.status(), Err(err));
        assert!(reader.done());
    }

    #[test]
    fn test_reader_state_total_length_is_fixed() {
        let mut state = ReaderState::new();
        assert_eq!(state.total_length(), -1);
        state.set_total_length(10);
        state.set_total_length(20);
        assert_eq!(state.total_length(), 10);
        assert!(!state.done());

        let mut empty = ReaderState::new();
        empty.set_total_length(0);
        assert!(empty.done());
    }

    #[test]
    fn test_clearing_status_keeps_done() {
        let mut state = ReaderState::new();
        state.fail(StreamError::Unknown("boom".into()));
        assert!(state.done());
        state.set_status(Ok(()));
        assert!(state.is_ok());
        assert!(state.done());
    }

    #[test]
    fn test_borrowed_reader_shares_state() {
        let mut inner = InMemoryDataReader::from(CONTENT);
        {
            let mut borrowed: &mut InMemoryDataReader = &mut inner;
            let mut buf = [0u8; 4];
            DataReader::read_to_buffer(&mut borrowed, &mut buf);
        }
        assert_eq!(inner.offset(), 4);
    }

    #[test]
    fn test_error_codes_round_trip_through_u16() {
        for code in [
            ErrorCode::InvalidArgument,
            ErrorCode::FailedPrecondition,
            ErrorCode::ResourceExhausted,
            ErrorCode::Unimplemented,
            ErrorCode::Internal,
            ErrorCode::DataLoss,
            ErrorCode::Unknown,
        ] {
            assert_eq!(ErrorCode::try_from(code as u16).unwrap(), code);
        }
        assert!(ErrorCode::try_from(999u16).is_err());
    }

    #[test]
    fn test_io_errors_map_onto_codes() {
        let cases = [
            (io::ErrorKind::InvalidInput, ErrorCode::InvalidArgument),
            (io::ErrorKind::Unsupported, ErrorCode::Unimplemented),
            (io::ErrorKind::UnexpectedEof, ErrorCode::DataLoss),
            (io::ErrorKind::PermissionDenied, ErrorCode::Unknown),
        ];
        for (kind, code) in cases {
            let err: StreamError = io::Error::new(kind, "x").into();
            assert_eq!(err.code(), code);
        }
    }

    proptest! {
        #[test]
        fn prop_memory_seek_then_read(
            data in proptest::collection::vec(any::<u8>(), 0..256),
            k in 0usize..300,
        ) {
            let mut reader = InMemoryDataReader::new(data.clone());
            let expect = k.min(data.len());
            prop_assert_eq!(reader.set_offset(k as i64), expect as i64);
            prop_assert_eq!(reader.remainder_to_vec(), data[expect..].to_vec());
            prop_assert!(reader.ok());
        }

        #[test]
        fn prop_fragmented_reads_reassemble(
            data in proptest::collection::vec(any::<u8>(), 0..512),
            step in 1usize..64,
        ) {
            let mut reader = InMemoryDataReader::new(data.clone());
            let mut out = Vec::new();
            let mut buf = vec![0u8; step];
            while !reader.done() {
                let n = reader.read_to_buffer(&mut buf);
                out.extend_from_slice(&buf[..n]);
            }
            prop_assert_eq!(out, data);
        }
    }
}
