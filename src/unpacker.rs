//! 입력 버퍼 해석
//!
//! 레코드를 순서대로 디코딩해서 수신 큐 / 요청 큐로 보냄.
//! 레코드가 잘려 있으면 그 버퍼의 나머지는 버림 (앞서 처리한 레코드는 유지)

use bytes::Bytes;
use tracing::{debug, trace};

use crate::codec::Record;
use crate::state::{Insert, SessionState};
use crate::stats::SessionStats;
use crate::{Message, Result};

/// 입력 버퍼 하나를 해석하고 처리한 레코드 수를 반환
pub fn unpack(state: &mut SessionState, stats: &mut SessionStats, mut data: Bytes) -> Result<usize> {
    let mut records = 0;

    while !data.is_empty() {
        match Record::decode(&mut data)? {
            Record::Heartbeat => {
                trace!("heartbeat 수신");
            }
            Record::Request(id) => {
                if state.insert_request(id) {
                    stats.requests_received += 1;
                }
            }
            Record::Data { id, payload } => match state.insert_message(Message::received(id, payload)) {
                Insert::Inserted => stats.messages_received += 1,
                Insert::Duplicate => {
                    debug!("중복 메시지 무시: id={}", id);
                    stats.duplicates_dropped += 1;
                }
                Insert::Stale => {
                    debug!("이미 전달된 메시지 무시: id={}, recv_id_min={}", id, state.recv_id_min);
                    stats.stale_dropped += 1;
                }
            },
        }
        records += 1;
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn unpack_bytes(state: &mut SessionState, bytes: &'static [u8]) -> Result<usize> {
        let mut stats = SessionStats::new();
        unpack(state, &mut stats, Bytes::from_static(bytes))
    }

    #[test]
    fn test_mixed_records() {
        let mut state = SessionState::new();
        // heartbeat, 요청 id=3, 데이터 id=0 "ab", 데이터 id=2 "c"
        let n = unpack_bytes(
            &mut state,
            &[0x00, 0x01, 0x00, 0x03, 0x04, 0x00, 0x00, b'a', b'b', 0x03, 0x00, 0x02, b'c'],
        )
        .unwrap();

        assert_eq!(n, 4);
        assert_eq!(state.request_queue.iter().copied().collect::<Vec<_>>(), vec![3]);
        assert_eq!(state.recv_queue.keys().copied().collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(&state.recv_queue[&0].payload[..], b"ab");
        assert_eq!(state.recv_id_max, 2);
    }

    #[test]
    fn test_truncated_aborts_rest() {
        let mut state = SessionState::new();
        // 데이터 id=1 "x", 이후 payload 8바이트 선언인데 2바이트뿐
        let err = unpack_bytes(&mut state, &[0x03, 0x00, 0x01, b'x', 0x0a, 0x00, 0x02, 1, 2]).unwrap_err();

        assert!(matches!(err, Error::MalformedFrame { .. }));
        // 잘리기 전 레코드는 반영됨, 잘린 레코드는 반영 안 됨
        assert_eq!(state.recv_queue.keys().copied().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_duplicate_across_buffers() {
        let mut state = SessionState::new();
        let mut stats = SessionStats::new();
        let record = Bytes::from_static(&[0x03, 0x00, 0x05, b'z']);

        unpack(&mut state, &mut stats, record.clone()).unwrap();
        unpack(&mut state, &mut stats, record).unwrap();

        assert_eq!(state.recv_queue.len(), 1);
        assert_eq!(stats.messages_received, 1);
        assert_eq!(stats.duplicates_dropped, 1);
    }
}
