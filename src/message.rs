//! 애플리케이션 메시지 정의

use bytes::Bytes;

/// 메시지 id (와이어에서 16비트 big-endian)
pub type MessageId = u16;

/// 애플리케이션 데이터 단위
///
/// 한 번에 하나의 큐에만 존재하며 큐 사이를 move로 이동함
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// 순서 번호
    pub id: MessageId,

    /// 실제 데이터
    pub payload: Bytes,

    /// 처음 송신 큐에 들어간 tick (이력 만료 판단용, 수신 메시지는 0)
    pub sent_tick: u64,
}

impl Message {
    /// 새 메시지 생성
    pub fn new(id: MessageId, payload: Bytes, sent_tick: u64) -> Self {
        Self {
            id,
            payload,
            sent_tick,
        }
    }

    /// 수신 측 메시지 생성
    pub fn received(id: MessageId, payload: Bytes) -> Self {
        Self::new(id, payload, 0)
    }

    /// 이 tick에 만료되었는지 여부
    pub fn is_expired(&self, expired_interval: u64, curr_tick: u64) -> bool {
        self.sent_tick + expired_interval < curr_tick
    }
}
