//! 재전송 엔진
//!
//! - 수신 큐의 빈틈 감지 → 재전송 요청 생성
//! - 상대의 요청 → 이력에서 찾아 재전송
//! - 오래된 이력 만료
//! - 송신 큐 flush

use tracing::{debug, warn};

use crate::packer::Packer;
use crate::state::SessionState;
use crate::stats::SessionStats;
use crate::MessageId;

/// 수신 큐에서 빠진 id마다 재전송 요청 기록
///
/// `recv_id_min`부터 시작해서, 큐에 있는 id 사이의 빈 id를 모두 요청함
pub fn request_missing(state: &SessionState, packer: &mut Packer, stats: &mut SessionStats) {
    let mut next = state.recv_id_min;
    for &id in state.recv_queue.keys() {
        let id = u32::from(id);
        if id > next {
            debug!("빈틈 감지: id {}..{} 요청", next, id);
            for missing in next..id {
                // recv_queue의 id가 u16이므로 missing도 u16 범위 안에 있음
                packer.push_request(missing as MessageId);
                stats.requests_sent += 1;
            }
        }
        next = id + 1;
    }
}

/// 상대가 요청한 id를 이력에서 찾아 재전송하고 요청 큐를 비움
///
/// 이력에 없는 id(만료되었거나 보낸 적 없는 id)는 조용히 무시함
pub fn reply_request(state: &mut SessionState, packer: &mut Packer, stats: &mut SessionStats) {
    let requests = std::mem::take(&mut state.request_queue);
    for id in requests {
        match state.find_history(id) {
            Some(message) => match packer.push_data(message.id, &message.payload) {
                Ok(()) => stats.messages_retransmitted += 1,
                Err(e) => warn!("재전송 생략: id={} ({})", id, e),
            },
            None => {
                match state.oldest_history_id() {
                    Some(oldest) if id < oldest => {
                        debug!("재전송 불가: id={} 이미 만료 (가장 오래된 이력 {})", id, oldest);
                    }
                    _ => debug!("재전송 불가: id={} 이력에 없음", id),
                }
                stats.unfulfilled_requests += 1;
            }
        }
    }
}

/// 만료된 이력을 앞에서부터 제거하고 제거한 개수를 반환
///
/// 이력은 `sent_tick` 오름차순이므로 첫 유효 항목에서 멈춤
pub fn clear_expired(state: &mut SessionState, expired_interval: u64, stats: &mut SessionStats) -> usize {
    let mut evicted = 0;
    while let Some(front) = state.history_queue.front() {
        if !front.is_expired(expired_interval, state.curr_tick) {
            break;
        }
        state.history_queue.pop_front();
        evicted += 1;
    }

    if evicted > 0 {
        debug!("이력 만료: {}개 제거, 남은 이력 {}개", evicted, state.history_queue.len());
        stats.messages_evicted += evicted as u64;
    }
    evicted
}

/// 송신 큐의 메시지를 모두 기록하고 순서대로 이력으로 옮김
///
/// 버퍼에 들어가지 않는 메시지는 이력에 남기지 않고 버림
pub fn send_message(state: &mut SessionState, packer: &mut Packer, stats: &mut SessionStats) {
    while let Some(message) = state.send_queue.pop_front() {
        if let Err(e) = packer.push_data(message.id, &message.payload) {
            warn!("송신 생략: id={} ({})", message.id, e);
            continue;
        }
        stats.messages_sent += 1;
        state.history_queue.push_back(message);
    }
}
