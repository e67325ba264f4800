//! 프레임 패커
//!
//! 레코드를 고정 크기 출력 버퍼에 차곡차곡 채우고,
//! 다음 레코드가 들어가지 않으면 현재 버퍼를 봉인하고 새 버퍼를 시작함.
//! 레코드 하나가 두 버퍼에 걸치는 일은 없음

use bytes::{BufMut, Bytes, BytesMut};

use crate::codec::{self, Record, ID_LEN};
use crate::{Error, MessageId, Result, MIN_PACKAGE_LEN, TYPE_DATA, TYPE_HEARTBEAT, TYPE_REQUEST};

/// 출력 버퍼 묶음 생성기
#[derive(Debug)]
pub struct Packer {
    /// 버퍼 하나의 크기
    package_len: usize,

    /// 채우는 중인 버퍼
    current: BytesMut,

    /// 봉인된 버퍼들 (전송 순서)
    sealed: Vec<Bytes>,

    /// 기록된 레코드 수
    records: usize,
}

impl Packer {
    /// 새 패커 생성
    ///
    /// 요청과 heartbeat가 항상 들어가도록 `MIN_PACKAGE_LEN` 이상이어야 함
    pub fn new(package_len: usize) -> Result<Self> {
        if package_len < MIN_PACKAGE_LEN {
            return Err(Error::InvalidConfig(format!(
                "package_len {} (최소 {})",
                package_len, MIN_PACKAGE_LEN
            )));
        }
        Ok(Self::with_len(package_len))
    }

    /// 검증된 버퍼 크기로 생성 (`Config::validate`를 통과한 값)
    pub(crate) fn with_len(package_len: usize) -> Self {
        Self {
            package_len,
            current: BytesMut::with_capacity(package_len),
            sealed: Vec::new(),
            records: 0,
        }
    }

    /// 아무 레코드도 기록되지 않았는지 여부
    pub fn is_empty(&self) -> bool {
        self.records == 0
    }

    /// 기록된 레코드 수
    pub fn records(&self) -> usize {
        self.records
    }

    /// 레코드 추가
    ///
    /// 버퍼 하나보다 큰 레코드는 `RecordTooLarge`로 거부하며 아무것도 기록하지 않음
    pub fn push(&mut self, record: &Record) -> Result<()> {
        self.reserve(record.encoded_len())?;
        record.encode(&mut self.current);
        self.records += 1;
        Ok(())
    }

    /// 데이터 레코드 추가 (payload 복사 없이)
    pub fn push_data(&mut self, id: MessageId, payload: &[u8]) -> Result<()> {
        self.reserve(codec::data_len(payload.len()))?;
        codec::put_header(&mut self.current, payload.len() + TYPE_DATA as usize);
        self.current.put_u16(id);
        self.current.put_slice(payload);
        self.records += 1;
        Ok(())
    }

    /// 재전송 요청 레코드 추가
    pub fn push_request(&mut self, id: MessageId) {
        self.make_room(1 + ID_LEN);
        codec::put_header(&mut self.current, TYPE_REQUEST as usize);
        self.current.put_u16(id);
        self.records += 1;
    }

    /// heartbeat 추가 (1바이트만 남아도 현재 버퍼에 들어감)
    pub fn push_heartbeat(&mut self) {
        self.make_room(1);
        codec::put_header(&mut self.current, TYPE_HEARTBEAT as usize);
        self.records += 1;
    }

    /// 현재 버퍼까지 봉인하고 전송할 버퍼 목록 반환
    pub fn finish(mut self) -> Vec<Bytes> {
        self.seal();
        self.sealed
    }

    fn reserve(&mut self, size: usize) -> Result<()> {
        if size > self.package_len {
            return Err(Error::RecordTooLarge {
                size,
                package_len: self.package_len,
            });
        }
        self.make_room(size);
        Ok(())
    }

    // size <= package_len
    fn make_room(&mut self, size: usize) {
        if self.current.len() + size > self.package_len {
            self.seal();
        }
    }

    fn seal(&mut self) {
        if self.current.is_empty() {
            return;
        }
        let full = std::mem::replace(&mut self.current, BytesMut::with_capacity(self.package_len));
        self.sealed.push(full.freeze());
    }
}
