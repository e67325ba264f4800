//! 프로토콜 설정

use serde::{Deserialize, Serialize};

use crate::{Error, Result, MAX_HEADER_VALUE, MAX_PAYLOAD_LEN, MIN_PACKAGE_LEN, PACKAGE_LEN, TYPE_DATA};

/// 가장 큰 데이터 레코드 헤더 (2바이트 길이 + 2바이트 id)
const DATA_OVERHEAD: usize = 4;

/// RUDP 세션 설정
///
/// 필드가 공개되어 있고 역직렬화도 검증을 거치지 않으므로,
/// 파일 등에서 읽은 설정은 `Session::with_config`(내부에서 `validate` 호출)로만 세션에 넘겨야 함
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 보낸 메시지를 재전송용으로 보관하는 tick 수
    pub expired_interval: u64,

    /// 출력 버퍼 하나의 크기 (바이트)
    /// 레코드는 버퍼 경계를 넘지 않음
    pub package_len: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            expired_interval: 10,
            package_len: PACKAGE_LEN,
        }
    }
}

impl Config {
    /// 새 설정 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 짧은 이력 (빠른 tick, 안정적인 링크)
    pub fn low_latency() -> Self {
        Self {
            expired_interval: 5,
            package_len: PACKAGE_LEN,
        }
    }

    /// 긴 이력 (손실이 많은 링크)
    pub fn lossy_network() -> Self {
        Self {
            expired_interval: 40,
            package_len: PACKAGE_LEN,
        }
    }

    /// 설정 검증
    pub fn validate(&self) -> Result<()> {
        let min = MIN_PACKAGE_LEN;
        let max = MAX_HEADER_VALUE + TYPE_DATA as usize;
        if self.package_len < min || self.package_len > max {
            return Err(Error::InvalidConfig(format!(
                "package_len {} (허용 범위 {}..={})",
                self.package_len, min, max
            )));
        }
        Ok(())
    }

    /// 한 번의 `send`로 보낼 수 있는 최대 payload 길이
    ///
    /// 데이터 레코드는 출력 버퍼 하나에 통째로 들어가야 하므로
    /// 코덱 한계와 버퍼 크기 중 작은 쪽을 따름
    pub fn max_payload_len(&self) -> usize {
        MAX_PAYLOAD_LEN.min(self.package_len.saturating_sub(DATA_OVERHEAD))
    }
}
