#[cfg(test)]
mod tests {
    use datastream_core::prelude::*;

    #[test]
    fn test_counters_accumulate() {
        let mut counters = TransformCounters::default();
        counters.add_chunk(3, 4);
        counters.add_chunk(1, 4);
        counters.add_replay();

        assert_eq!(counters.chunks_transformed, 2);
        assert_eq!(counters.bytes_consumed, 4);
        assert_eq!(counters.bytes_produced, 8);
        assert_eq!(counters.replays, 1);
    }

    #[test]
    fn test_merge_and_add_assign_agree() {
        let mut a = TransformCounters { chunks_transformed: 1, bytes_consumed: 10, bytes_produced: 12, replays: 0 };
        let b = TransformCounters { chunks_transformed: 2, bytes_consumed: 5, bytes_produced: 8, replays: 3 };

        let mut merged = a.clone();
        merged.merge(&b);
        a += b;
        assert_eq!(a, merged);
        assert_eq!(a.chunks_transformed, 3);
        assert_eq!(a.bytes_consumed, 15);
        assert_eq!(a.bytes_produced, 20);
        assert_eq!(a.replays, 3);
    }

    #[test]
    fn test_aggregate_across_readers() {
        let codec = Base64Codec::new(Base64Config::new(3, false));
        let mut total = TransformCounters::default();
        for text in ["abc", "abcdef"] {
            let mut reader = codec.encoding_reader(InMemoryDataReader::from(text)).unwrap();
            reader.remainder_to_vec();
            total += reader.counters().clone();
        }
        // In-memory sources report done on the read that drains them.
        assert_eq!(total.chunks_transformed, 3);
        assert_eq!(total.bytes_consumed, 9);
        assert_eq!(total.bytes_produced, 12);
    }
}
