//! # RUDP (Reduced UDP)
//!
//! 신뢰성 없는 데이터그램 채널 위의 NACK 기반 순서 보장 전송 계층
//!
//! ## 핵심 특징
//! - **순서 보장**: `recv`는 id 순서대로, 빈틈 없이만 데이터를 돌려줌
//! - **NACK 기반**: ACK 없이 빠진 id만 요청
//! - **재전송 이력**: 일정 tick 동안 보낸 메시지를 보관하고 요청 시 재전송
//! - **Heartbeat**: 보낼 것이 없는 tick에도 생존 신호 1바이트 전송
//! - **Sans-IO**: 소켓을 직접 다루지 않고 바이트 버퍼만 주고받음
//!
//! ```
//! use rudp::Session;
//!
//! let mut a = Session::new();
//! let mut b = Session::new();
//!
//! a.send(&b"hello"[..]).unwrap();
//! for package in a.update(&[]) {
//!     b.update(&package);
//! }
//! assert_eq!(b.recv().as_deref(), Some(&b"hello"[..]));
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod message;
pub mod packer;
pub mod retransmit;
pub mod session;
pub mod state;
pub mod stats;
pub mod unpacker;

pub use codec::Record;
pub use config::Config;
pub use error::{Error, Result};
pub use message::{Message, MessageId};
pub use packer::Packer;
pub use session::Session;
pub use stats::SessionStats;

/// 출력 버퍼 기본 크기 (바이트)
pub const PACKAGE_LEN: usize = 512;

/// 출력 버퍼 최소 크기 (2바이트 데이터 헤더 + 1바이트 payload)
pub const MIN_PACKAGE_LEN: usize = 5;

/// 헤더가 표현할 수 있는 최대 길이 값 (15비트, 최상위 비트는 2바이트 형식 플래그)
pub const MAX_HEADER_VALUE: usize = 0x7fff;

/// 데이터 레코드 하나의 최대 payload 길이 (코덱 기준)
pub const MAX_PAYLOAD_LEN: usize = MAX_HEADER_VALUE - TYPE_DATA as usize;

/// 한 세션이 할당할 수 있는 id 개수 (와이어 id는 16비트)
pub const ID_SPACE: u32 = 1 << 16;

/// 레코드 타입: heartbeat
pub const TYPE_HEARTBEAT: u16 = 0;

/// 레코드 타입: 재전송 요청
pub const TYPE_REQUEST: u16 = 1;

/// 레코드 타입: 데이터 (길이 값 = payload 길이 + 2)
pub const TYPE_DATA: u16 = 2;
