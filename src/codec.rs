//! 와이어 코덱
//!
//! 레코드 하나 = 길이 헤더 + (id) + (payload)
//!
//! | 필드 | 인코딩 |
//! |---|---|
//! | 길이 값 `v` | `v < 128`이면 1바이트, 아니면 2바이트 (첫 바이트 최상위 비트 1, 나머지 15비트가 값) |
//! | id | 2바이트 big-endian (`v != 0`일 때만) |
//! | payload | `v - 2` 바이트 (`v >= 2`일 때만) |
//!
//! `v == 0`은 heartbeat, `v == 1`은 재전송 요청, `v >= 2`는 데이터

use bytes::{Buf, BufMut, Bytes};

use crate::{Error, MessageId, Result, MAX_HEADER_VALUE, TYPE_DATA, TYPE_HEARTBEAT, TYPE_REQUEST};

/// 2바이트 헤더 플래그
const LONG_HEADER_FLAG: u8 = 0x80;

/// 1바이트 헤더로 표현 가능한 값의 상한 (미포함)
const SHORT_HEADER_LIMIT: usize = 128;

/// id 필드 크기
pub const ID_LEN: usize = 2;

/// 와이어 레코드
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    /// 생존 신호 (0x00 한 바이트)
    Heartbeat,

    /// 재전송 요청 (NACK)
    Request(MessageId),

    /// 데이터
    Data { id: MessageId, payload: Bytes },
}

impl Record {
    /// 헤더에 기록되는 길이/타입 값
    pub fn header_value(&self) -> usize {
        match self {
            Record::Heartbeat => TYPE_HEARTBEAT as usize,
            Record::Request(_) => TYPE_REQUEST as usize,
            Record::Data { payload, .. } => payload.len() + TYPE_DATA as usize,
        }
    }

    /// 직렬화 크기 (헤더 + id + payload)
    pub fn encoded_len(&self) -> usize {
        match self {
            Record::Heartbeat => 1,
            Record::Request(_) => 1 + ID_LEN,
            Record::Data { payload, .. } => data_len(payload.len()),
        }
    }

    /// 버퍼 끝에 레코드 기록
    ///
    /// 데이터 payload는 `MAX_PAYLOAD_LEN` 이하여야 함
    pub fn encode<B: BufMut>(&self, buf: &mut B) {
        put_header(buf, self.header_value());
        match self {
            Record::Heartbeat => {}
            Record::Request(id) => buf.put_u16(*id),
            Record::Data { id, payload } => {
                buf.put_u16(*id);
                buf.put_slice(payload);
            }
        }
    }

    /// 버퍼 앞에서 레코드 하나를 읽음
    ///
    /// 실패 시 `buf`의 읽기 위치는 정의되지 않으므로 호출자는 남은 바이트를 버려야 함
    pub fn decode(buf: &mut Bytes) -> Result<Self> {
        let value = get_header(buf)?;
        match value {
            v if v == TYPE_HEARTBEAT as usize => Ok(Record::Heartbeat),
            v if v == TYPE_REQUEST as usize => {
                ensure_remaining(buf.remaining(), ID_LEN)?;
                Ok(Record::Request(buf.get_u16()))
            }
            v => {
                let payload_len = v - TYPE_DATA as usize;
                ensure_remaining(buf.remaining(), ID_LEN + payload_len)?;
                let id = buf.get_u16();
                let payload = buf.split_to(payload_len);
                Ok(Record::Data { id, payload })
            }
        }
    }
}

/// 길이 값 `value`의 헤더 크기
pub fn header_len(value: usize) -> usize {
    if value < SHORT_HEADER_LIMIT {
        1
    } else {
        2
    }
}

/// payload 길이가 `payload_len`인 데이터 레코드의 직렬화 크기
pub fn data_len(payload_len: usize) -> usize {
    header_len(payload_len + TYPE_DATA as usize) + ID_LEN + payload_len
}

/// 길이 헤더 기록 (15비트로 잘림)
pub fn put_header<B: BufMut>(buf: &mut B, value: usize) {
    debug_assert!(value <= MAX_HEADER_VALUE, "header value {value} exceeds 15 bits");
    if value < SHORT_HEADER_LIMIT {
        buf.put_u8(value as u8);
    } else {
        buf.put_u8(LONG_HEADER_FLAG | ((value >> 8) & 0x7f) as u8);
        buf.put_u8((value & 0xff) as u8);
    }
}

/// 길이 헤더 읽기
pub fn get_header<B: Buf>(buf: &mut B) -> Result<usize> {
    ensure_remaining(buf.remaining(), 1)?;
    let first = buf.get_u8();
    if first & LONG_HEADER_FLAG == 0 {
        return Ok(first as usize);
    }

    ensure_remaining(buf.remaining(), 1)?;
    let second = buf.get_u8();
    Ok((((first as usize) << 8) | second as usize) & MAX_HEADER_VALUE)
}

fn ensure_remaining(remaining: usize, declared: usize) -> Result<()> {
    if remaining < declared {
        return Err(Error::MalformedFrame { declared, remaining });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MAX_PAYLOAD_LEN;

    fn encode(record: &Record) -> Bytes {
        let mut buf = Vec::new();
        record.encode(&mut buf);
        Bytes::from(buf)
    }

    #[test]
    fn test_short_header() {
        let mut buf = Vec::new();
        put_header(&mut buf, 127);
        assert_eq!(buf, vec![0x7f]);
    }

    #[test]
    fn test_long_header() {
        let mut buf = Vec::new();
        put_header(&mut buf, 128);
        assert_eq!(buf, vec![0x80, 0x80]);

        let mut buf = Vec::new();
        put_header(&mut buf, 0x7fff);
        assert_eq!(buf, vec![0xff, 0xff]);
        assert_eq!(get_header(&mut &buf[..]).unwrap(), 0x7fff);
    }

    #[test]
    fn test_data_record_layout() {
        let record = Record::Data {
            id: 0,
            payload: Bytes::from_static(b"hi"),
        };
        assert_eq!(&encode(&record)[..], &[0x04, 0x00, 0x00, b'h', b'i']);
        assert_eq!(record.encoded_len(), 5);
    }

    #[test]
    fn test_request_record_layout() {
        let record = Record::Request(0x0102);
        assert_eq!(&encode(&record)[..], &[0x01, 0x01, 0x02]);
    }

    #[test]
    fn test_heartbeat_is_single_zero() {
        assert_eq!(&encode(&Record::Heartbeat)[..], &[0x00]);
    }

    #[test]
    fn test_roundtrip_boundaries() {
        for len in [0usize, 125, 126, 127, 300, MAX_PAYLOAD_LEN] {
            let record = Record::Data {
                id: 0xbeef,
                payload: Bytes::from(vec![0xab; len]),
            };
            let mut bytes = encode(&record);
            assert_eq!(bytes.len(), record.encoded_len(), "len {len}");
            assert_eq!(Record::decode(&mut bytes).unwrap(), record);
            assert!(bytes.is_empty());
        }
    }

    #[test]
    fn test_truncated_payload() {
        // 길이 값 10 => payload 8바이트 선언, 실제 3바이트
        let mut bytes = Bytes::from_static(&[0x0a, 0x00, 0x01, 1, 2, 3]);
        let err = Record::decode(&mut bytes).unwrap_err();
        assert_eq!(
            err,
            Error::MalformedFrame {
                declared: 10,
                remaining: 5
            }
        );
    }

    #[test]
    fn test_truncated_long_header() {
        let mut bytes = Bytes::from_static(&[0x81]);
        assert!(matches!(
            Record::decode(&mut bytes),
            Err(Error::MalformedFrame { .. })
        ));
    }

    #[test]
    fn test_truncated_request() {
        let mut bytes = Bytes::from_static(&[0x01, 0x00]);
        assert!(matches!(
            Record::decode(&mut bytes),
            Err(Error::MalformedFrame {
                declared: 2,
                remaining: 1
            })
        ));
    }
}
