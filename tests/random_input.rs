//! 임의 바이트 입력에 대한 세션 견고성 테스트
//!
//! seed 고정 RNG로 만든 쓰레기 데이터그램을 `update`에 넣어도
//! 패닉 없이 tick이 진행되고, 출력 버퍼가 크기 제한과 레코드 경계를 지키는지 확인함

use bytes::Bytes;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rudp::{Config, Record, Session};

fn assert_well_formed(packages: &[Bytes], package_len: usize) {
    assert!(!packages.is_empty());
    for package in packages {
        assert!(package.len() <= package_len, "{} bytes", package.len());
        let mut buf = package.clone();
        while !buf.is_empty() {
            Record::decode(&mut buf).unwrap();
        }
    }
}

fn random_datagram(rng: &mut StdRng) -> Vec<u8> {
    let len = rng.gen_range(0..64);
    (0..len).map(|_| rng.gen()).collect()
}

#[test]
fn test_random_input_never_breaks_session() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let mut session = Session::new();
    let package_len = session.config().package_len;

    for tick in 0..300 {
        if tick % 7 == 0 {
            session.send(vec![tick as u8; 40]).unwrap();
        }
        let inbound = random_datagram(&mut rng);
        let packages = session.update(&inbound);
        assert_well_formed(&packages, package_len);
        while session.recv().is_some() {}
    }

    assert_eq!(session.curr_tick(), 300);
    assert!(session.stats().malformed_frames > 0);
    assert!(session.stats().malformed_frames <= 300);
}

#[test]
fn test_random_input_small_packages() {
    let mut rng = StdRng::seed_from_u64(7);
    let config = Config {
        package_len: 16,
        ..Config::default()
    };
    let mut session = Session::with_config(config).unwrap();

    for _ in 0..200 {
        let inbound = random_datagram(&mut rng);
        let packages = session.update(&inbound);
        assert_well_formed(&packages, 16);
    }
}

#[test]
fn test_send_still_delivers_after_garbage() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut sender = Session::new();
    for _ in 0..100 {
        let inbound = random_datagram(&mut rng);
        sender.update(&inbound);
    }

    let mut receiver = Session::new();
    sender.send(&b"after"[..]).unwrap();
    for package in sender.update(&[]) {
        receiver.update(&package);
    }
    assert_eq!(receiver.recv().as_deref(), Some(&b"after"[..]));
}
