//! 세션 상태: 카운터와 네 개의 정렬된 큐
//!
//! 메시지는 항상 하나의 큐에만 있음
//! - `send_queue` → `history_queue` (송신 시)
//! - 디코딩 → `recv_queue` → 애플리케이션 (`recv` 시)
//! - `history_queue` → 폐기 (만료 시)

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::{Message, MessageId};

/// 수신 메시지 삽입 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insert {
    /// 새로 삽입됨
    Inserted,

    /// 이미 애플리케이션에 전달된 id
    Stale,

    /// 수신 큐에 이미 있는 id
    Duplicate,
}

/// 세션 내부 상태
#[derive(Debug, Default)]
pub struct SessionState {
    /// 현재 tick (`update`마다 1 증가)
    pub(crate) curr_tick: u64,

    /// 다음 송신 메시지에 할당할 id
    pub(crate) send_id: u32,

    /// 애플리케이션이 다음에 받을 id
    pub(crate) recv_id_min: u32,

    /// 상대에게서 관측한 가장 큰 id
    pub(crate) recv_id_max: u32,

    /// 아직 전송하지 않은 메시지 (id 순)
    pub(crate) send_queue: VecDeque<Message>,

    /// 전달 대기 중인 수신 메시지 (id 오름차순, 모두 `recv_id_min` 이상)
    pub(crate) recv_queue: BTreeMap<MessageId, Message>,

    /// 재전송용으로 보관 중인 송신 메시지 (id, sent_tick 모두 오름차순)
    pub(crate) history_queue: VecDeque<Message>,

    /// 상대가 요청한 재전송 id (오름차순, 중복 없음)
    pub(crate) request_queue: BTreeSet<MessageId>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 수신 메시지를 id 순서를 유지하며 삽입
    pub fn insert_message(&mut self, message: Message) -> Insert {
        let id = u32::from(message.id);
        if id < self.recv_id_min {
            return Insert::Stale;
        }
        if self.recv_queue.contains_key(&message.id) {
            return Insert::Duplicate;
        }

        self.recv_id_max = self.recv_id_max.max(id);
        self.recv_queue.insert(message.id, message);
        Insert::Inserted
    }

    /// 재전송 요청 id 삽입 (중복 시 false)
    pub fn insert_request(&mut self, id: MessageId) -> bool {
        self.request_queue.insert(id)
    }

    /// 순서상 다음 메시지가 도착해 있으면 꺼냄
    pub fn pop_in_order(&mut self) -> Option<Message> {
        let entry = self.recv_queue.first_entry()?;
        if u32::from(*entry.key()) != self.recv_id_min {
            return None;
        }

        let message = entry.remove();
        self.recv_id_min += 1;
        Some(message)
    }

    /// 이력에서 id로 메시지 검색 (이진 탐색)
    pub fn find_history(&self, id: MessageId) -> Option<&Message> {
        self.history_queue
            .binary_search_by_key(&id, |m| m.id)
            .ok()
            .and_then(|idx| self.history_queue.get(idx))
    }

    /// 이력에 남아 있는 가장 오래된 id
    pub fn oldest_history_id(&self) -> Option<MessageId> {
        self.history_queue.front().map(|m| m.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn msg(id: MessageId) -> Message {
        Message::received(id, Bytes::from(vec![id as u8]))
    }

    #[test]
    fn test_insert_keeps_order() {
        let mut state = SessionState::new();
        for id in [5, 1, 3, 2] {
            assert_eq!(state.insert_message(msg(id)), Insert::Inserted);
        }
        let ids: Vec<_> = state.recv_queue.keys().copied().collect();
        assert_eq!(ids, vec![1, 2, 3, 5]);
        assert_eq!(state.recv_id_max, 5);
    }

    #[test]
    fn test_insert_duplicate_and_stale() {
        let mut state = SessionState::new();
        assert_eq!(state.insert_message(msg(0)), Insert::Inserted);
        assert_eq!(state.insert_message(msg(0)), Insert::Duplicate);
        assert_eq!(state.recv_queue.len(), 1);

        assert!(state.pop_in_order().is_some());
        assert_eq!(state.insert_message(msg(0)), Insert::Stale);
        assert!(state.recv_queue.is_empty());
    }

    #[test]
    fn test_pop_waits_for_gap() {
        let mut state = SessionState::new();
        state.insert_message(msg(1));
        assert!(state.pop_in_order().is_none());

        state.insert_message(msg(0));
        assert_eq!(state.pop_in_order().unwrap().id, 0);
        assert_eq!(state.pop_in_order().unwrap().id, 1);
        assert_eq!(state.recv_id_min, 2);
    }

    #[test]
    fn test_request_dedup() {
        let mut state = SessionState::new();
        assert!(state.insert_request(4));
        assert!(state.insert_request(2));
        assert!(!state.insert_request(4));
        let ids: Vec<_> = state.request_queue.iter().copied().collect();
        assert_eq!(ids, vec![2, 4]);
    }

    #[test]
    fn test_find_history() {
        let mut state = SessionState::new();
        for id in 3..8 {
            state.history_queue.push_back(Message::new(id, Bytes::new(), id as u64));
        }
        assert_eq!(state.find_history(5).unwrap().id, 5);
        assert!(state.find_history(2).is_none());
        assert!(state.find_history(8).is_none());
        assert_eq!(state.oldest_history_id(), Some(3));
    }
}
