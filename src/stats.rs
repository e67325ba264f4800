//! 세션 통계

/// 세션 누적 통계
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// 진행한 tick 수
    pub ticks: u64,

    /// 생성한 출력 버퍼 수
    pub packages_sent: u64,

    /// 생성한 출력 바이트
    pub bytes_sent: u64,

    /// 처음 송신한 메시지 수
    pub messages_sent: u64,

    /// 재전송한 메시지 수
    pub messages_retransmitted: u64,

    /// 보낸 재전송 요청 수
    pub requests_sent: u64,

    /// 받은 재전송 요청 수 (중복 제외)
    pub requests_received: u64,

    /// 보낸 heartbeat 수
    pub heartbeats_sent: u64,

    /// 수신 큐에 들어간 메시지 수
    pub messages_received: u64,

    /// 수신 큐에 이미 있어 버린 메시지 수
    pub duplicates_dropped: u64,

    /// 이미 전달된 id라서 버린 메시지 수
    pub stale_dropped: u64,

    /// 디코딩을 중단한 입력 버퍼 수
    pub malformed_frames: u64,

    /// 이력에 없어 응답하지 못한 요청 수
    pub unfulfilled_requests: u64,

    /// 이력에서 만료된 메시지 수
    pub messages_evicted: u64,
}

impl SessionStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// 손실 추정치: 수신한 메시지 대비 요청한 재전송 비율
    pub fn loss_ratio(&self) -> f64 {
        let total = self.messages_received + self.requests_sent;
        if total == 0 {
            return 0.0;
        }
        self.requests_sent as f64 / total as f64
    }

    /// 통계 요약 문자열
    pub fn summary(&self) -> String {
        format!(
            "Ticks: {} | Packages: {} ({} bytes) | Sent: {} (+{} retransmitted) | Received: {} | NACKs: {} sent / {} received | Dropped: {} dup, {} stale | Malformed: {} | Evicted: {} | Loss: {:.2}%",
            self.ticks,
            self.packages_sent,
            self.bytes_sent,
            self.messages_sent,
            self.messages_retransmitted,
            self.messages_received,
            self.requests_sent,
            self.requests_received,
            self.duplicates_dropped,
            self.stale_dropped,
            self.malformed_frames,
            self.messages_evicted,
            self.loss_ratio() * 100.0,
        )
    }

    /// 통계 리셋
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loss_ratio() {
        let mut stats = SessionStats::new();
        assert_eq!(stats.loss_ratio(), 0.0);

        stats.messages_received = 9;
        stats.requests_sent = 1;
        assert!((stats.loss_ratio() - 0.1).abs() < f64::EPSILON);

        stats.reset();
        assert_eq!(stats, SessionStats::default());
    }
}
