//! 에러 타입 정의

use thiserror::Error;

/// RUDP 에러 타입
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("IO 에러: {0}")]
    Io(String),

    #[error("잘못된 프레임: 선언된 길이 {declared}, 남은 바이트 {remaining}")]
    MalformedFrame { declared: usize, remaining: usize },

    #[error("payload 크기 초과: {len} bytes (최대 {max})")]
    PayloadTooLarge { len: usize, max: usize },

    #[error("레코드가 출력 버퍼보다 큼: {size} bytes (버퍼 {package_len})")]
    RecordTooLarge { size: usize, package_len: usize },

    #[error("id 공간 소진: 세션당 최대 {0}개 메시지")]
    IdSpaceExhausted(u32),

    #[error("유효하지 않은 설정: {0}")]
    InvalidConfig(String),
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e.to_string())
    }
}

/// Result 타입 별칭
pub type Result<T> = std::result::Result<T, Error>;
