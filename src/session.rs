//! 세션 컨트롤러
//!
//! 외부 계약은 세 가지뿐
//! - `send`: 송신 큐에 추가 (즉시 전송하지 않음)
//! - `recv`: 순서상 다음 메시지만 꺼냄
//! - `update`: tick 하나 진행. 입력 해석 → 빈틈 요청 → 재전송 → flush → 이력 만료
//!
//! 내부 잠금은 없음. 모든 변경 연산이 `&mut self`이므로 여러 태스크에서
//! 공유하려면 호출자가 `Mutex` 등으로 감싸야 함

use bytes::Bytes;
use tracing::{trace, warn};

use crate::packer::Packer;
use crate::retransmit;
use crate::state::SessionState;
use crate::stats::SessionStats;
use crate::unpacker;
use crate::{Config, Error, Message, MessageId, Result, ID_SPACE};

/// RUDP 세션 (상대 하나와의 연결 상태)
#[derive(Debug)]
pub struct Session {
    config: Config,
    state: SessionState,
    stats: SessionStats,

    /// 마지막으로 입력을 받은 tick
    last_heard_tick: u64,

    /// 직전 `update`의 진단 에러 (잘린 입력 버퍼 등)
    last_error: Option<Error>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// 기본 설정으로 세션 생성
    pub fn new() -> Self {
        Self::from_parts(Config::default())
    }

    /// 설정을 검증하고 세션 생성
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_parts(config))
    }

    fn from_parts(config: Config) -> Self {
        Self {
            config,
            state: SessionState::new(),
            stats: SessionStats::new(),
            last_heard_tick: 0,
            last_error: None,
        }
    }

    /// 메시지 송신 예약
    ///
    /// 다음 `update`에서 전송됨. 할당된 id를 반환
    pub fn send(&mut self, payload: impl Into<Bytes>) -> Result<MessageId> {
        let payload = payload.into();
        let max = self.config.max_payload_len();
        if payload.len() > max {
            return Err(Error::PayloadTooLarge {
                len: payload.len(),
                max,
            });
        }
        if self.state.send_id >= ID_SPACE {
            return Err(Error::IdSpaceExhausted(ID_SPACE));
        }

        // ID_SPACE 검사를 통과했으므로 u16 범위 안
        let id = self.state.send_id as MessageId;
        self.state.send_id += 1;
        self.state
            .send_queue
            .push_back(Message::new(id, payload, self.state.curr_tick));
        Ok(id)
    }

    /// 순서상 다음 메시지 수신
    ///
    /// 더 뒤의 id가 도착해 있어도 `recv_id_min`이 비어 있으면 `None`
    pub fn recv(&mut self) -> Option<Bytes> {
        self.state.pop_in_order().map(|m| m.payload)
    }

    /// tick 하나 진행
    ///
    /// `inbound`는 상대에게서 받은 데이터그램 하나 (없으면 빈 슬라이스).
    /// 전송할 버퍼 목록을 반환하며 각 버퍼는 `package_len` 이하이고,
    /// 보낼 것이 없으면 heartbeat 하나짜리 버퍼를 반환함
    pub fn update(&mut self, inbound: &[u8]) -> Vec<Bytes> {
        self.last_error = None;
        self.state.curr_tick += 1;
        self.stats.ticks += 1;

        if !inbound.is_empty() {
            self.last_heard_tick = self.state.curr_tick;
            self.ingest(Bytes::copy_from_slice(inbound));
        }

        let mut packer = Packer::with_len(self.config.package_len);
        retransmit::request_missing(&self.state, &mut packer, &mut self.stats);
        retransmit::reply_request(&mut self.state, &mut packer, &mut self.stats);
        retransmit::send_message(&mut self.state, &mut packer, &mut self.stats);
        if packer.is_empty() {
            packer.push_heartbeat();
            self.stats.heartbeats_sent += 1;
        }
        retransmit::clear_expired(&mut self.state, self.config.expired_interval, &mut self.stats);

        let packages = packer.finish();
        self.stats.packages_sent += packages.len() as u64;
        self.stats.bytes_sent += packages.iter().map(|p| p.len() as u64).sum::<u64>();
        trace!(
            "tick {}: {} packages, history {}",
            self.state.curr_tick,
            packages.len(),
            self.state.history_queue.len()
        );
        packages
    }

    fn ingest(&mut self, data: Bytes) {
        let len = data.len();
        if let Err(e) = unpacker::unpack(&mut self.state, &mut self.stats, data) {
            warn!("입력 버퍼 해석 중단 ({} bytes): {}", len, e);
            self.stats.malformed_frames += 1;
            self.last_error = Some(e);
        }
    }

    /// 현재 tick
    pub fn curr_tick(&self) -> u64 {
        self.state.curr_tick
    }

    /// 다음 송신 id
    pub fn send_id(&self) -> u32 {
        self.state.send_id
    }

    /// 애플리케이션이 다음에 받을 id
    pub fn recv_id_min(&self) -> u32 {
        self.state.recv_id_min
    }

    /// 상대에게서 관측한 가장 큰 id
    pub fn recv_id_max(&self) -> u32 {
        self.state.recv_id_max
    }

    /// 아직 전송하지 않은 메시지 수
    pub fn pending_send(&self) -> usize {
        self.state.send_queue.len()
    }

    /// 전달 대기 중인 수신 메시지 수 (순서가 안 맞는 것 포함)
    pub fn pending_recv(&self) -> usize {
        self.state.recv_queue.len()
    }

    /// 재전송용으로 보관 중인 id 목록
    pub fn history_ids(&self) -> Vec<MessageId> {
        self.state.history_queue.iter().map(|m| m.id).collect()
    }

    /// 처리 대기 중인 재전송 요청 id 목록
    pub fn request_ids(&self) -> Vec<MessageId> {
        self.state.request_queue.iter().copied().collect()
    }

    /// 마지막 입력 이후 지난 tick 수
    pub fn idle_ticks(&self) -> u64 {
        self.state.curr_tick - self.last_heard_tick
    }

    /// 직전 `update`에서 생긴 진단 에러
    ///
    /// `update`마다 초기화되므로 누적 횟수는 `SessionStats::malformed_frames`를 볼 것
    pub fn last_error(&self) -> Option<&Error> {
        self.last_error.as_ref()
    }

    /// 통계
    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// 설정
    pub fn config(&self) -> &Config {
        &self.config
    }
}
