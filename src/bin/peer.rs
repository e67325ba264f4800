//! RUDP 데모 피어
//!
//! UDP 소켓 하나로 상대 피어와 세션을 돌리면서 메시지를 주고받음.
//! 손실 시뮬레이션으로 NACK 재전송을 눈으로 확인할 수 있음
//!
//! 사용법:
//!   cargo run --release --bin rudp-peer -- [OPTIONS]
//!
//! 예시:
//!   # 터미널 1
//!   cargo run --bin rudp-peer -- --bind 127.0.0.1:9000 --peer 127.0.0.1:9001 --count 100 --loss 0.2
//!   # 터미널 2
//!   cargo run --bin rudp-peer -- --bind 127.0.0.1:9001 --peer 127.0.0.1:9000 -m hello

use std::net::SocketAddr;
use std::time::Duration;

use rand::Rng;
use tokio::net::UdpSocket;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use rudp::{Config, Session};

/// 피어 설정
struct PeerConfig {
    bind_addr: SocketAddr,
    peer_addr: SocketAddr,
    messages: Vec<String>,
    count: usize,
    tick_ms: u64,
    ticks: u64,
    loss: f64,
    config: Config,
}

impl Default for PeerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 9000)),
            peer_addr: SocketAddr::from(([127, 0, 0, 1], 9001)),
            messages: Vec::new(),
            count: 0,
            tick_ms: 20,
            ticks: 500,
            loss: 0.0,
            config: Config::default(),
        }
    }
}

fn parse_value<T: std::str::FromStr>(args: &[String], i: usize, what: &str) -> T {
    match args.get(i).map(|s| s.parse()) {
        Some(Ok(value)) => value,
        _ => {
            eprintln!("{} 값이 필요합니다", what);
            std::process::exit(2);
        }
    }
}

fn parse_args() -> PeerConfig {
    let args: Vec<String> = std::env::args().collect();
    let mut config = PeerConfig::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--bind" | "-b" => {
                config.bind_addr = parse_value(&args, i + 1, "유효한 주소");
                i += 1;
            }
            "--peer" | "-p" => {
                config.peer_addr = parse_value(&args, i + 1, "유효한 주소");
                i += 1;
            }
            "--message" | "-m" => {
                config.messages.push(parse_value(&args, i + 1, "메시지"));
                i += 1;
            }
            "--count" | "-c" => {
                config.count = parse_value(&args, i + 1, "유효한 숫자");
                i += 1;
            }
            "--tick-ms" => {
                config.tick_ms = parse_value(&args, i + 1, "유효한 숫자");
                i += 1;
            }
            "--ticks" => {
                config.ticks = parse_value(&args, i + 1, "유효한 숫자");
                i += 1;
            }
            "--loss" | "-l" => {
                config.loss = parse_value::<f64>(&args, i + 1, "0.0 ~ 1.0 비율").clamp(0.0, 1.0);
                i += 1;
            }
            "--expired-interval" => {
                config.config.expired_interval = parse_value(&args, i + 1, "유효한 숫자");
                i += 1;
            }
            "--help" | "-h" => {
                println!(
                    r#"RUDP Peer - NACK 기반 순서 보장 전송 데모

사용법:
  cargo run --release --bin rudp-peer -- [OPTIONS]

옵션:
  -b, --bind <ADDR>            로컬 바인드 주소 (기본: 127.0.0.1:9000)
  -p, --peer <ADDR>            상대 주소 (기본: 127.0.0.1:9001)
  -m, --message <TEXT>         보낼 메시지 (여러 번 지정 가능)
  -c, --count <N>              자동 생성 메시지 수 (기본: 0)
  --tick-ms <MS>               tick 간격 (기본: 20)
  --ticks <N>                  실행할 tick 수 (기본: 500)
  -l, --loss <RATIO>           송신 데이터그램 손실 비율 (기본: 0.0)
  --expired-interval <TICKS>   재전송 이력 보관 tick 수 (기본: 10)
  -h, --help                   이 도움말 출력
"#
                );
                std::process::exit(0);
            }
            other => warn!("알 수 없는 옵션: {}", other),
        }
        i += 1;
    }

    config
}

/// `RUST_LOG`가 있으면 그대로 쓰고, 없거나 해석할 수 없으면 info
fn env_filter(rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

async fn transmit(socket: &UdpSocket, peer: SocketAddr, packages: Vec<bytes::Bytes>, loss: f64) {
    let mut rng = rand::thread_rng();
    for package in packages {
        if rng.gen_bool(loss) {
            debug!("시뮬레이션 손실: {} bytes", package.len());
            continue;
        }
        if let Err(e) = socket.send_to(&package, peer).await {
            warn!("송신 실패: {}", e);
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 로깅 설정 (RUST_LOG로 세부 조정 가능)
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let peer_config = parse_args();
    let mut session = Session::with_config(peer_config.config.clone())?;

    let socket = UdpSocket::bind(peer_config.bind_addr).await?;
    info!(
        "RUDP peer {} -> {} (tick {}ms, loss {:.1}%)",
        peer_config.bind_addr,
        peer_config.peer_addr,
        peer_config.tick_ms,
        peer_config.loss * 100.0
    );

    for message in &peer_config.messages {
        session.send(message.clone().into_bytes())?;
    }
    for i in 0..peer_config.count {
        session.send(format!("message {i}").into_bytes())?;
    }

    let mut interval = tokio::time::interval(Duration::from_millis(peer_config.tick_ms));
    let mut buf = vec![0u8; 65535];
    let mut delivered = 0u64;

    for _ in 0..peer_config.ticks {
        interval.tick().await;

        // 도착한 데이터그램마다 tick 하나, 없으면 빈 tick
        let mut received_any = false;
        loop {
            match socket.try_recv_from(&mut buf) {
                Ok((len, addr)) if addr == peer_config.peer_addr => {
                    received_any = true;
                    let packages = session.update(&buf[..len]);
                    transmit(&socket, peer_config.peer_addr, packages, peer_config.loss).await;
                }
                Ok((_, addr)) => warn!("모르는 주소에서 수신: {}", addr),
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => break,
                Err(e) => {
                    warn!("수신 에러: {}", e);
                    break;
                }
            }
        }
        if !received_any {
            let packages = session.update(&[]);
            transmit(&socket, peer_config.peer_addr, packages, peer_config.loss).await;
        }

        while let Some(data) = session.recv() {
            delivered += 1;
            info!("수신 #{}: {}", delivered, String::from_utf8_lossy(&data));
        }

        if session.idle_ticks() == 50 {
            warn!("상대 응답 없음: {} ticks", session.idle_ticks());
        }
    }

    info!("{}", session.stats().summary());
    Ok(())
}
