//! Screen-art UART receive task
//!
//! Receives screen-art commands from the host, either binary frames or text
//! lines, forwards them to the mode task and tracks whether a session is
//! active. A session starts with the first valid command and ends after the
//! configured time without one.

use defmt::*;
use embassy_rp::uart::BufferedUartRx;
use embassy_time::{with_timeout, Duration, Instant};
use embedded_io_async::Read;

use hourglass_protocol::ScreenDecoder;

use crate::channels::{SCREEN_COMMANDS, SCREEN_SESSION};

/// Buffer size for UART receive
const RX_BUF_SIZE: usize = 64;

/// Upper bound on one read wait, so session expiry is noticed while idle
const POLL_MS: u64 = 100;

/// Screen RX task - decodes commands and manages the session
#[embassy_executor::task]
pub async fn screen_rx_task(mut rx: BufferedUartRx, session_timeout_ms: u32) {
    info!("Screen RX task started");

    let mut decoder = ScreenDecoder::new();
    let mut buf = [0u8; RX_BUF_SIZE];
    let timeout = Duration::from_millis(u64::from(session_timeout_ms));
    let mut last_command: Option<Instant> = None;

    loop {
        match with_timeout(Duration::from_millis(POLL_MS), rx.read(&mut buf)).await {
            Ok(Ok(n)) if n > 0 => {
                trace!("RX: {} bytes", n);

                for &byte in &buf[..n] {
                    match decoder.feed(byte) {
                        Ok(Some(command)) => {
                            if last_command.is_none() {
                                SCREEN_SESSION.signal(true);
                            }
                            last_command = Some(Instant::now());

                            if SCREEN_COMMANDS.try_send(command).is_err() {
                                warn!("Screen channel full, dropping command");
                            }
                        }
                        Ok(None) => {
                            // Need more bytes
                        }
                        Err(e) => {
                            warn!("Screen command error: {:?}", e);
                        }
                    }
                }
            }
            Ok(Ok(_)) => {
                // No bytes read, continue
            }
            Ok(Err(e)) => {
                warn!("UART read error: {:?}", e);
            }
            Err(_) => {
                // Poll interval elapsed
            }
        }

        if let Some(at) = last_command {
            if at.elapsed() > timeout {
                last_command = None;
                decoder.reset();
                SCREEN_SESSION.signal(false);
            }
        }
    }
}
